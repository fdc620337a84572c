//! POS-terminal registration integration.
//!
//! Registers a delivered terminal in the bank's terminal-management service
//! and returns the TMS business key that the OTP flow later uses. The TMS
//! treats every string field as required, so the adapter validates the full
//! request before touching the network.

pub mod client;

use crate::ClientError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

pub use client::PosTerminalClient;

/// Errors raised by the POS-terminal registration adapter.
#[derive(Debug, Error)]
pub enum PosTerminalError {
	/// A required field of the registration request was empty.
	#[error("{0}")]
	Validation(String),
	/// The TMS rejected the request or could not be reached.
	#[error("{0}")]
	BadRequest(String),
}

/// Registration request for one POS terminal.
#[derive(Debug, Clone, Serialize)]
pub struct RegistratePosTerminal {
	pub serial_number: String,
	pub model: String,
	pub merchant_id: String,
	pub terminal_id: String,
	pub receiver_iin: String,
	pub store_name: String,
	pub store_address: String,
	pub branch_name: String,
	pub oked_code: String,
	pub mcc_code: String,
	pub receiver_phone_number: String,
	pub receiver_full_name: String,
	pub courier_full_name: String,
	pub is_installment_enabled: bool,
	pub request_number_ref: Option<String>,
	pub inventory_number: Option<String>,
	pub sum: Option<Decimal>,
}

impl RegistratePosTerminal {
	fn validate(&self) -> Result<(), PosTerminalError> {
		let required = [
			("serial_number", &self.serial_number),
			("model", &self.model),
			("merchant_id", &self.merchant_id),
			("terminal_id", &self.terminal_id),
			("receiver_iin", &self.receiver_iin),
			("store_name", &self.store_name),
			("store_address", &self.store_address),
			("branch_name", &self.branch_name),
			("oked_code", &self.oked_code),
			("mcc_code", &self.mcc_code),
			("receiver_phone_number", &self.receiver_phone_number),
			("receiver_full_name", &self.receiver_full_name),
			("courier_full_name", &self.courier_full_name),
		];
		for (name, value) in required {
			if value.trim().is_empty() {
				return Err(PosTerminalError::Validation(format!("{name} is required")));
			}
		}
		Ok(())
	}
}

/// Raw POS-terminal registration API surface.
#[async_trait]
pub trait PosTerminalApi: Send + Sync {
	async fn registrate_pos_terminal(
		&self,
		request: &RegistratePosTerminal,
	) -> Result<RegistrationResponse, ClientError>;
}

/// Response body of the registration call.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RegistrationResponse {
	#[serde(rename = "businessKey")]
	#[serde(default)]
	pub business_key: Option<String>,
}

/// Adapter between the registration handler and the TMS.
pub struct PosTerminalAdapter {
	client: Arc<dyn PosTerminalApi>,
}

impl PosTerminalAdapter {
	pub fn new(client: Arc<dyn PosTerminalApi>) -> Self {
		Self { client }
	}

	/// Registers the terminal, returning the TMS business key.
	pub async fn registrate_pos_terminal(
		&self,
		request: &RegistratePosTerminal,
	) -> Result<String, PosTerminalError> {
		request.validate()?;

		let response = self
			.client
			.registrate_pos_terminal(request)
			.await
			.map_err(|_| {
				PosTerminalError::BadRequest(
					"can not registrate pos terminal, bad request".into(),
				)
			})?;

		response.business_key.ok_or_else(|| {
			PosTerminalError::BadRequest(
				"can not registrate pos terminal, bad request".into(),
			)
		})
	}
}
