//! Handler for the `send_otp` status.
//!
//! Asks the partner's OTP backend to send a code to the receiver and, on
//! success, records where the courier stood when the code went out. The
//! order's `current_status_id` is deliberately left untouched: existing
//! callers depend on it lagging behind until the code is verified, so the
//! controller's history row is the only trace of this step.

use super::{HandlerError, StatusHandler};
use async_trait::async_trait;
use chrono::Utc;
use delivery_partners::{OtpAdapter, PartnerAdapterRegistry};
use delivery_storage::OrderStore;
use delivery_types::{GeoPoint, Order, OrderGeolocation, Status};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;

/// Courier coordinates attached to an OTP request.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Coordinates {
	pub latitude: Decimal,
	pub longitude: Decimal,
}

impl Coordinates {
	pub fn to_point(self) -> GeoPoint {
		GeoPoint {
			latitude: self.latitude,
			longitude: self.longitude,
		}
	}
}

pub struct SendOtpHandler {
	store: Arc<dyn OrderStore>,
	adapters: Arc<PartnerAdapterRegistry>,
}

impl SendOtpHandler {
	pub fn new(store: Arc<dyn OrderStore>, adapters: Arc<PartnerAdapterRegistry>) -> Self {
		Self { store, adapters }
	}
}

#[async_trait]
impl StatusHandler for SendOtpHandler {
	async fn handle(
		&self,
		order: &mut Order,
		_status: &Status,
		payload: Option<&serde_json::Value>,
	) -> Result<(), HandlerError> {
		let coordinates = match payload {
			Some(value) => Some(
				serde_json::from_value::<Coordinates>(value.clone()).map_err(|_| {
					HandlerError::Validation("invalid coordinates provided".into())
				})?,
			),
			None => None,
		};

		let adapter = self
			.adapters
			.send_otp(order.partner_id)
			.ok_or(HandlerError::PartnerNotFound(order.partner_id))?;

		match adapter {
			OtpAdapter::FreedomBank(bank) => {
				bank.send(&order.partner_order_id)
					.await
					.map_err(|e| HandlerError::SendOtp(e.to_string()))?;
			},
			OtpAdapter::PosTerminal(terminal) => {
				let product = self.store.get_product(order.id).await?;
				terminal
					.send(
						product.business_key().unwrap_or_default(),
						&order.receiver_phone_number,
					)
					.await
					.map_err(|e| HandlerError::SendOtp(e.to_string()))?;
			},
		}

		if let Some(courier_id) = order.courier_id {
			if self.store.get_geolocation(order.id).await?.is_none() {
				self.store
					.create_geolocation(OrderGeolocation {
						order_id: order.id,
						courier_id,
						at_client_point: coordinates.map(Coordinates::to_point),
						code_sent_point: None,
						created_at: Utc::now(),
					})
					.await?;
			}
		}

		Ok(())
	}
}
