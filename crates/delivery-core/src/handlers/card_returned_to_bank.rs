//! Handler for the `card_returned_to_bank` status.
//!
//! Pure field reset: the card went back to the bank, so the free-form
//! delivery status returns to its neutral shape and the order points at the
//! new status. No partner calls, no payload.

use super::{HandlerError, StatusHandler};
use async_trait::async_trait;
use delivery_types::{DeliveryStatus, Order, Status};

#[derive(Default)]
pub struct CardReturnedToBankHandler;

impl CardReturnedToBankHandler {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl StatusHandler for CardReturnedToBankHandler {
	async fn handle(
		&self,
		order: &mut Order,
		status: &Status,
		_payload: Option<&serde_json::Value>,
	) -> Result<(), HandlerError> {
		order.delivery_status = DeliveryStatus::empty();
		order.current_status_id = status.id;
		Ok(())
	}
}
