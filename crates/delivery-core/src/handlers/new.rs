//! Handler for the `new` status.
//!
//! `new` is the recovery status: re-entering it wipes the order's previous
//! history so the delivery can start over, and drops any SMS-postcontrol
//! bookkeeping left from an earlier attempt. Repeat calls are safe; each
//! leaves exactly one `new` history row.

use super::{HandlerError, StatusHandler};
use async_trait::async_trait;
use chrono::Utc;
use delivery_storage::OrderStore;
use delivery_types::{DeliveryStatus, Order, Status, StatusHistoryRecord};
use std::sync::Arc;

pub struct NewHandler {
	store: Arc<dyn OrderStore>,
}

impl NewHandler {
	pub fn new(store: Arc<dyn OrderStore>) -> Self {
		Self { store }
	}
}

#[async_trait]
impl StatusHandler for NewHandler {
	async fn handle(
		&self,
		order: &mut Order,
		status: &Status,
		_payload: Option<&serde_json::Value>,
	) -> Result<(), HandlerError> {
		order.delivery_status = DeliveryStatus::empty();
		order.current_status_id = status.id;

		self.store
			.reset_status_history(
				order.id,
				StatusHistoryRecord {
					order_id: order.id,
					status_id: status.id,
					created_at: Utc::now(),
				},
			)
			.await?;
		self.store.clear_sms_postcontrol(order.id).await?;

		Ok(())
	}

	fn writes_own_history(&self) -> bool {
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use delivery_storage::implementations::memory::MemoryStore;
	use delivery_types::status::codes;

	fn order() -> Order {
		Order {
			id: 1,
			partner_id: 1,
			partner_order_id: "p-1".into(),
			current_status_id: 5,
			delivery_graph_id: 1,
			delivery_status: DeliveryStatus {
				status: Some("some_old_status".into()),
				..DeliveryStatus::default()
			},
			track_number: None,
			courier_service: None,
			receiver_name: "Receiver R.".into(),
			receiver_phone_number: "87071112233".into(),
			receiver_iin: "900101300123".into(),
			courier_id: None,
			courier_full_name: None,
			delivery_point_address: None,
		}
	}

	fn new_status() -> Status {
		Status {
			id: 1,
			slug: codes::NEW.into(),
			code: codes::NEW.into(),
			name: "New".into(),
			is_optional: false,
			partner_id: None,
		}
	}

	#[tokio::test]
	async fn test_resets_delivery_status_and_history() {
		let store = Arc::new(MemoryStore::new());
		store
			.append_status_history(StatusHistoryRecord {
				order_id: 1,
				status_id: 5,
				created_at: Utc::now(),
			})
			.await
			.unwrap();
		store.seed_sms_postcontrol(1, vec!["code-1".into()]).await;

		let handler = NewHandler::new(store.clone());
		let mut order = order();
		handler.handle(&mut order, &new_status(), None).await.unwrap();

		assert_eq!(order.delivery_status, DeliveryStatus::empty());
		assert_eq!(order.current_status_id, 1);
		let history = store.status_history(1).await.unwrap();
		assert_eq!(history.len(), 1);
		assert_eq!(history[0].status_id, 1);
		assert!(store.sms_postcontrol(1).await.is_empty());
	}

	#[tokio::test]
	async fn test_repeat_call_keeps_single_history_row() {
		let store = Arc::new(MemoryStore::new());
		let handler = NewHandler::new(store.clone());
		let mut order = order();

		handler.handle(&mut order, &new_status(), None).await.unwrap();
		handler.handle(&mut order, &new_status(), None).await.unwrap();

		assert_eq!(store.status_history(1).await.unwrap().len(), 1);
	}
}
