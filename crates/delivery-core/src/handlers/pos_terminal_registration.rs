//! Handler for the `pos_terminal_registration` status.
//!
//! Drives the vendor-side registration workflow of a delivered POS
//! terminal. The product's `registration_status` attribute is the state:
//! absent means registration has never been started, `CANCELED` and
//! `TIMEOUT_ERROR` mean the status poll should be rescheduled, `STARTED`
//! and `COMPLETED` forbid another attempt. The status itself is repeatable,
//! so couriers can retry after vendor-side failures.

use super::{HandlerError, StatusHandler};
use async_trait::async_trait;
use delivery_partners::pos_terminal::{PosTerminalAdapter, RegistratePosTerminal};
use delivery_storage::OrderStore;
use delivery_types::{Order, Product, ProductType, RegistrationStatus, Status};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

/// Largest accepted registration sum (one billion, exclusive).
const MAX_SUM: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Terminal models the vendor accepts.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub enum PosTerminalModel {
	#[serde(rename = "PAX")]
	Pax,
	#[serde(rename = "SUNMI")]
	Sunmi,
}

impl PosTerminalModel {
	fn as_str(&self) -> &'static str {
		match self {
			Self::Pax => "PAX",
			Self::Sunmi => "SUNMI",
		}
	}
}

/// Payload of a POS-terminal registration transition.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PosTerminalRegistrationPayload {
	pub model: PosTerminalModel,
	pub serial_number: String,
	#[serde(default)]
	pub inventory_number: Option<String>,
	#[serde(default)]
	pub sum: Option<Decimal>,
}

impl PosTerminalRegistrationPayload {
	fn validate(&self) -> Result<(), HandlerError> {
		if self.serial_number.is_empty() || self.serial_number.len() > 20 {
			return Err(HandlerError::Validation(
				"serial_number must be 1 to 20 characters".into(),
			));
		}
		if let Some(inventory_number) = &self.inventory_number {
			if inventory_number.is_empty() || inventory_number.len() > 50 {
				return Err(HandlerError::Validation(
					"inventory_number must be 1 to 50 characters".into(),
				));
			}
		}
		if let Some(sum) = self.sum {
			if sum >= MAX_SUM {
				return Err(HandlerError::Validation("sum is too large".into()));
			}
		}
		Ok(())
	}
}

/// Failure to schedule the registration-status poll.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SyncError(pub String);

/// Scheduling hook for the background task that polls the vendor for the
/// registration outcome. The queue behind it is deployment plumbing; the
/// handler only needs the scheduling capability.
#[async_trait]
pub trait RegistrationStatusSync: Send + Sync {
	async fn schedule(&self, business_key: &str) -> Result<(), SyncError>;
}

/// Default sync hook that only records the request.
#[derive(Default)]
pub struct LoggingRegistrationStatusSync;

#[async_trait]
impl RegistrationStatusSync for LoggingRegistrationStatusSync {
	async fn schedule(&self, business_key: &str) -> Result<(), SyncError> {
		tracing::info!(business_key, "Scheduled registration status sync");
		Ok(())
	}
}

pub struct PosTerminalRegistrationHandler {
	store: Arc<dyn OrderStore>,
	adapter: Arc<PosTerminalAdapter>,
	sync: Arc<dyn RegistrationStatusSync>,
}

impl PosTerminalRegistrationHandler {
	pub fn new(
		store: Arc<dyn OrderStore>,
		adapter: Arc<PosTerminalAdapter>,
		sync: Arc<dyn RegistrationStatusSync>,
	) -> Self {
		Self {
			store,
			adapter,
			sync,
		}
	}

	async fn first_registration(
		&self,
		order: &Order,
		product: &mut Product,
		payload: &PosTerminalRegistrationPayload,
	) -> Result<(), HandlerError> {
		product.set_attribute("model", payload.model.as_str().into());
		product.set_attribute("serial_number", payload.serial_number.clone().into());

		let request = RegistratePosTerminal {
			serial_number: payload.serial_number.clone(),
			model: payload.model.as_str().to_string(),
			merchant_id: product.attribute_str("merchant_id").unwrap_or_default().to_string(),
			terminal_id: product.attribute_str("terminal_id").unwrap_or_default().to_string(),
			receiver_iin: order.receiver_iin.clone(),
			store_name: product.attribute_str("store_name").unwrap_or_default().to_string(),
			store_address: order.delivery_point_address.clone().unwrap_or_default(),
			branch_name: product.attribute_str("branch_name").unwrap_or_default().to_string(),
			oked_code: product.attribute_str("oked_code").unwrap_or_default().to_string(),
			mcc_code: product.attribute_str("mcc_code").unwrap_or_default().to_string(),
			receiver_phone_number: order.receiver_phone_number.clone(),
			receiver_full_name: order.receiver_name.clone(),
			courier_full_name: order.courier_full_name.clone().unwrap_or_default(),
			is_installment_enabled: product
				.attributes
				.get("is_installment_enabled")
				.and_then(|v| v.as_bool())
				.unwrap_or(false),
			request_number_ref: product
				.attribute_str("request_number_ref")
				.map(str::to_string),
			inventory_number: payload.inventory_number.clone(),
			sum: payload.sum,
		};

		let business_key = self
			.adapter
			.registrate_pos_terminal(&request)
			.await
			.map_err(|e| HandlerError::Registration(e.to_string()))?;

		product.set_attribute("business_key", business_key.clone().into());
		product.set_attribute(
			"registration_status",
			RegistrationStatus::Started.as_str().into(),
		);
		self.store.save_product(product).await?;

		self.sync
			.schedule(&business_key)
			.await
			.map_err(|e| HandlerError::Registration(e.to_string()))?;

		Ok(())
	}
}

#[async_trait]
impl StatusHandler for PosTerminalRegistrationHandler {
	async fn handle(
		&self,
		order: &mut Order,
		_status: &Status,
		payload: Option<&serde_json::Value>,
	) -> Result<(), HandlerError> {
		let payload = payload.ok_or_else(|| HandlerError::Validation("data is required".into()))?;
		let payload: PosTerminalRegistrationPayload = serde_json::from_value(payload.clone())
			.map_err(|e| HandlerError::Validation(e.to_string()))?;
		payload.validate()?;

		let mut product = self.store.get_product(order.id).await?;
		if product.kind != ProductType::PosTerminal {
			return Err(HandlerError::Validation(format!(
				"product has wrong type: {}, required type: {}",
				product.kind,
				ProductType::PosTerminal
			)));
		}

		match product.registration_status() {
			None => self.first_registration(order, &mut product, &payload).await,
			Some(RegistrationStatus::Canceled) | Some(RegistrationStatus::TimeoutError) => {
				let business_key = product.business_key().unwrap_or_default().to_string();
				self.sync
					.schedule(&business_key)
					.await
					.map_err(|e| HandlerError::Registration(e.to_string()))
			},
			Some(current @ RegistrationStatus::Started)
			| Some(current @ RegistrationStatus::Completed) => {
				Err(HandlerError::NotAllowRegistration(current.to_string()))
			},
		}
	}

	fn writes_own_history(&self) -> bool {
		true
	}
}
