//! POS-terminal one-time-password integration.
//!
//! Unlike the bank's OTP service this one keys requests by the terminal's
//! TMS business key, and the verify call completes a user task on the TMS
//! side, which is why it also carries the courier's full name. Business
//! failures come back as a bare JSON string in a 200 response: `NOT_FOUND`
//! means the phone number is unknown, `FAILURE` means the code was wrong.

pub mod client;

use crate::ClientError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub use client::PosTerminalOtpClient;

/// Errors raised by the POS-terminal OTP adapter.
#[derive(Debug, Error)]
pub enum OtpError {
	/// Caller-supplied arguments were empty/malformed; no network call made.
	#[error("{0}")]
	Validation(String),
	/// The TMS rejected the request or could not be reached.
	#[error("{0}")]
	BadRequest(String),
	/// The supplied OTP code was wrong.
	#[error("{0}")]
	InvalidOtpCode(String),
}

/// Raw POS-terminal OTP API surface.
#[async_trait]
pub trait PosTerminalOtpApi: Send + Sync {
	async fn send(&self, business_key: &str, phone_number: &str) -> Result<(), ClientError>;

	async fn verify(
		&self,
		business_key: &str,
		phone_number: &str,
		otp_code: &str,
		courier_full_name: &str,
	) -> Result<String, ClientError>;
}

/// Adapter between the OTP handlers and the terminal-management service.
pub struct PosTerminalOtpAdapter {
	client: Arc<dyn PosTerminalOtpApi>,
}

impl PosTerminalOtpAdapter {
	pub fn new(client: Arc<dyn PosTerminalOtpApi>) -> Self {
		Self { client }
	}

	pub async fn send(&self, business_key: &str, phone_number: &str) -> Result<(), OtpError> {
		if business_key.is_empty() {
			return Err(OtpError::Validation("business_key is required".into()));
		}
		if phone_number.is_empty() {
			return Err(OtpError::Validation("phone_number is required".into()));
		}

		self.client
			.send(business_key, phone_number)
			.await
			.map_err(|_| OtpError::BadRequest("can not send otp, bad request".into()))
	}

	pub async fn verify(
		&self,
		business_key: &str,
		phone_number: &str,
		otp_code: &str,
		courier_full_name: &str,
	) -> Result<(), OtpError> {
		if business_key.is_empty() {
			return Err(OtpError::Validation("business_key is required".into()));
		}
		if phone_number.is_empty() {
			return Err(OtpError::Validation("phone_number is required".into()));
		}
		if courier_full_name.is_empty() {
			return Err(OtpError::Validation("courier_full_name is required".into()));
		}
		if otp_code.is_empty() {
			return Err(OtpError::Validation("otp_code is required".into()));
		}

		let body = self
			.client
			.verify(business_key, phone_number, otp_code, courier_full_name)
			.await
			.map_err(|_| OtpError::BadRequest("can not verify otp, bad request".into()))?;

		match body.as_str() {
			"NOT_FOUND" => Err(OtpError::BadRequest(
				"invalid phone_number in client side".into(),
			)),
			"FAILURE" => Err(OtpError::InvalidOtpCode(
				"invalid OTP, error OTP code verification in client side".into(),
			)),
			_ => Ok(()),
		}
	}
}
