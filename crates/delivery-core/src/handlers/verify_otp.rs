//! Handler for the `verify_otp` status.
//!
//! Checks the receiver's code against the partner's OTP backend. A wrong
//! code is its own error kind so callers can re-prompt instead of failing
//! the delivery. On success the order jumps straight to `photo_capturing`
//! and the handler commits the order save and history row together.

use super::send_otp::Coordinates;
use super::{HandlerError, StatusHandler};
use async_trait::async_trait;
use chrono::Utc;
use delivery_partners::freedom_bank_otp::OtpError as FreedomBankOtpError;
use delivery_partners::pos_terminal_otp::OtpError as PosTerminalOtpError;
use delivery_partners::{OtpAdapter, PartnerAdapterRegistry};
use delivery_storage::OrderStore;
use delivery_types::{status::codes, Order, Status, StatusHistoryRecord};
use serde::Deserialize;
use std::sync::Arc;

/// Payload of a verify-OTP transition.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyOtpPayload {
	pub code: String,
	#[serde(default)]
	pub code_sent_point: Option<Coordinates>,
}

pub struct VerifyOtpHandler {
	store: Arc<dyn OrderStore>,
	adapters: Arc<PartnerAdapterRegistry>,
}

impl VerifyOtpHandler {
	pub fn new(store: Arc<dyn OrderStore>, adapters: Arc<PartnerAdapterRegistry>) -> Self {
		Self { store, adapters }
	}
}

#[async_trait]
impl StatusHandler for VerifyOtpHandler {
	async fn handle(
		&self,
		order: &mut Order,
		_status: &Status,
		payload: Option<&serde_json::Value>,
	) -> Result<(), HandlerError> {
		let payload = payload.ok_or_else(|| HandlerError::Validation("data is required".into()))?;
		let payload: VerifyOtpPayload = serde_json::from_value(payload.clone())
			.map_err(|_| HandlerError::Validation("invalid data provided".into()))?;

		let adapter = self
			.adapters
			.verify_otp(order.partner_id)
			.ok_or(HandlerError::PartnerNotFound(order.partner_id))?;

		match adapter {
			OtpAdapter::FreedomBank(bank) => {
				bank.verify(&order.partner_order_id, &payload.code)
					.await
					.map_err(|e| match e {
						FreedomBankOtpError::WrongOtpCode(_) => HandlerError::WrongOtpCode,
						other => HandlerError::VerifyOtp(other.to_string()),
					})?;
			},
			OtpAdapter::PosTerminal(terminal) => {
				let product = self.store.get_product(order.id).await?;
				terminal
					.verify(
						product.business_key().unwrap_or_default(),
						&order.receiver_phone_number,
						&payload.code,
						order.courier_full_name.as_deref().unwrap_or_default(),
					)
					.await
					.map_err(|e| match e {
						PosTerminalOtpError::InvalidOtpCode(_) => HandlerError::WrongOtpCode,
						other => HandlerError::VerifyOtp(other.to_string()),
					})?;
			},
		}

		if let Some(point) = payload.code_sent_point {
			if self.store.get_geolocation(order.id).await?.is_some() {
				self.store
					.set_code_sent_point(order.id, point.to_point())
					.await?;
			}
		}

		// The verified order skips ahead to photo capturing.
		let next = self.store.get_status_by_code(codes::PHOTO_CAPTURING).await?;
		order.current_status_id = next.id;
		self.store
			.commit_status_change(
				order,
				StatusHistoryRecord {
					order_id: order.id,
					status_id: next.id,
					created_at: Utc::now(),
				},
			)
			.await?;

		Ok(())
	}

	fn writes_own_history(&self) -> bool {
		true
	}
}
