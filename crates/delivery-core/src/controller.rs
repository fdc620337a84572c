//! Transition controller.
//!
//! Orchestrates a single status transition: loads the order and statuses,
//! checks legality against the order's compiled delivery graph, dispatches
//! the handler for the requested status, then persists the outcome and the
//! audit trail. Requesting the status the order is already in skips the
//! legality check, which is what makes repeatable statuses (POS-terminal
//! registration retries) work.

use crate::handlers::{HandlerError, StatusHandler};
use chrono::Utc;
use delivery_order::{
	DeliveryGraph, DeliveryGraphError, OrderStateMachine, OrderTransitionError,
	OrderValidationError,
};
use delivery_storage::{OrderStore, StorageError};
use delivery_types::{Initiator, StatusHistoryRecord, TransitionAudit};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by [`TransitionController::transition_order_status`].
#[derive(Debug, Error)]
pub enum TransitionError {
	#[error("Order with given ID: {0} was not found")]
	OrderNotFound(i64),
	#[error("Status with given ID: {0} was not found")]
	StatusNotFound(i64),
	#[error("no handler registered for status: {0}")]
	HandlerNotRegistered(String),
	#[error(transparent)]
	Graph(#[from] DeliveryGraphError),
	#[error(transparent)]
	Validation(#[from] OrderValidationError),
	#[error(transparent)]
	Transition(#[from] OrderTransitionError),
	#[error(transparent)]
	Handler(#[from] HandlerError),
	#[error(transparent)]
	Storage(#[from] StorageError),
}

/// Entry point for moving an order into a new status.
pub struct TransitionController {
	store: Arc<dyn OrderStore>,
	handlers: HashMap<String, Arc<dyn StatusHandler>>,
}

impl std::fmt::Debug for TransitionController {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TransitionController")
			.field("handlers", &self.handlers.keys().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}

impl TransitionController {
	pub fn new(
		store: Arc<dyn OrderStore>,
		handlers: HashMap<String, Arc<dyn StatusHandler>>,
	) -> Self {
		Self { store, handlers }
	}

	/// Moves the order into the status identified by `status_id`.
	///
	/// On success the order is saved, an audit record is written, and a
	/// status-history row is appended unless the handler manages its own
	/// history.
	pub async fn transition_order_status(
		&self,
		order_id: i64,
		status_id: i64,
		initiator: Initiator,
		payload: Option<serde_json::Value>,
	) -> Result<(), TransitionError> {
		let mut order = self
			.store
			.get_order(order_id)
			.await
			.map_err(|e| not_found(e, TransitionError::OrderNotFound(order_id)))?;

		let current_status = self
			.store
			.get_status(order.current_status_id)
			.await
			.map_err(|e| not_found(e, TransitionError::StatusNotFound(order.current_status_id)))?;
		let next_status = self
			.store
			.get_status(status_id)
			.await
			.map_err(|e| not_found(e, TransitionError::StatusNotFound(status_id)))?;

		// Re-entering the current status is a repeat call; the graph only
		// governs movement between distinct statuses.
		if next_status.code != current_status.code {
			let graph_json = self.store.get_delivery_graph(order.delivery_graph_id).await?;
			let graph = DeliveryGraph::compile(&graph_json)?;
			let mut machine = OrderStateMachine::new(&graph, &current_status.code)?;
			machine.transition_to(&next_status.code)?;
		}

		let handler = self
			.handlers
			.get(&next_status.code)
			.ok_or_else(|| TransitionError::HandlerNotRegistered(next_status.code.clone()))?;

		handler
			.handle(&mut order, &next_status, payload.as_ref())
			.await?;

		self.store.save_order(&order).await?;

		let now = Utc::now();
		self.store
			.record_audit(TransitionAudit {
				order_id,
				from_code: current_status.code.clone(),
				to_code: next_status.code.clone(),
				initiator,
				created_at: now,
			})
			.await?;

		if !handler.writes_own_history() {
			self.store
				.append_status_history(StatusHistoryRecord {
					order_id,
					status_id: next_status.id,
					created_at: now,
				})
				.await?;
		}

		tracing::info!(
			order_id,
			from = %current_status.code,
			to = %next_status.code,
			"Order status transitioned"
		);

		Ok(())
	}
}

fn not_found(err: StorageError, replacement: TransitionError) -> TransitionError {
	match err {
		StorageError::NotFound(_) => replacement,
		other => TransitionError::Storage(other),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::handlers::{CardReturnedToBankHandler, NewHandler};
	use delivery_storage::implementations::memory::MemoryStore;
	use delivery_types::{status::codes, DeliveryStatus, Order, Status};
	use serde_json::json;

	fn status(id: i64, code: &str) -> Status {
		Status {
			id,
			slug: code.into(),
			code: code.into(),
			name: code.into(),
			is_optional: false,
			partner_id: None,
		}
	}

	fn order(current_status_id: i64) -> Order {
		Order {
			id: 1,
			partner_id: 1,
			partner_order_id: "p-1".into(),
			current_status_id,
			delivery_graph_id: 1,
			delivery_status: DeliveryStatus {
				status: Some("stale".into()),
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

	fn step(id: i64, code: &str, transitions: serde_json::Value) -> serde_json::Value {
		json!({
			"id": id,
			"status": code,
			"icon": code,
			"slug": code.replace('_', "-"),
			"name_en": code,
			"name_ru": code,
			"transitions": transitions,
		})
	}

	fn graph() -> serde_json::Value {
		json!([
			step(
				1,
				codes::NEW,
				json!([{
					"trigger": codes::CARD_RETURNED_TO_BANK,
					"source": codes::NEW,
					"dest": codes::CARD_RETURNED_TO_BANK,
				}]),
			),
			step(2, codes::CARD_RETURNED_TO_BANK, json!([])),
		])
	}

	async fn controller_with(store: Arc<MemoryStore>) -> TransitionController {
		store.seed_status(status(1, codes::NEW)).await;
		store.seed_status(status(2, codes::CARD_RETURNED_TO_BANK)).await;
		store.seed_graph(1, graph()).await;

		let mut handlers: HashMap<String, Arc<dyn StatusHandler>> = HashMap::new();
		handlers.insert(codes::NEW.into(), Arc::new(NewHandler::new(store.clone())));
		handlers.insert(
			codes::CARD_RETURNED_TO_BANK.into(),
			Arc::new(CardReturnedToBankHandler::new()),
		);
		TransitionController::new(store, handlers)
	}

	fn initiator() -> Initiator {
		Initiator {
			user_id: 7,
			profile: "bank_manager".into(),
		}
	}

	#[tokio::test]
	async fn test_unknown_order_fails() {
		let store = Arc::new(MemoryStore::new());
		let controller = controller_with(store).await;

		let err = controller
			.transition_order_status(99, 2, initiator(), None)
			.await
			.unwrap_err();
		assert_eq!(err.to_string(), "Order with given ID: 99 was not found");
	}

	#[tokio::test]
	async fn test_unknown_status_fails() {
		let store = Arc::new(MemoryStore::new());
		store.seed_order(order(1)).await;
		let controller = controller_with(store).await;

		let err = controller
			.transition_order_status(1, 99, initiator(), None)
			.await
			.unwrap_err();
		assert!(matches!(err, TransitionError::StatusNotFound(99)));
	}

	#[tokio::test]
	async fn test_legal_transition_updates_order_audit_and_history() {
		let store = Arc::new(MemoryStore::new());
		store.seed_order(order(1)).await;
		let controller = controller_with(store.clone()).await;

		controller
			.transition_order_status(1, 2, initiator(), None)
			.await
			.unwrap();

		let saved = store.get_order(1).await.unwrap();
		assert_eq!(saved.current_status_id, 2);
		assert_eq!(saved.delivery_status, DeliveryStatus::empty());

		let history = store.status_history(1).await.unwrap();
		assert_eq!(history.len(), 1);
		assert_eq!(history[0].status_id, 2);

		let audits = store.audits().await;
		assert_eq!(audits.len(), 1);
		assert_eq!(audits[0].from_code, codes::NEW);
		assert_eq!(audits[0].to_code, codes::CARD_RETURNED_TO_BANK);
		assert_eq!(audits[0].initiator.user_id, 7);
	}

	#[tokio::test]
	async fn test_illegal_transition_rejected_without_side_effects() {
		let store = Arc::new(MemoryStore::new());
		store.seed_order(order(2)).await;
		let controller = controller_with(store.clone()).await;

		// card_returned_to_bank is terminal; going back to new is not in
		// the graph.
		let err = controller
			.transition_order_status(1, 1, initiator(), None)
			.await
			.unwrap_err();
		assert_eq!(
			err.to_string(),
			"Not allow transition from card_returned_to_bank to new"
		);
		assert!(store.status_history(1).await.unwrap().is_empty());
		assert!(store.audits().await.is_empty());
	}

	#[tokio::test]
	async fn test_repeat_call_skips_legality_check() {
		let store = Arc::new(MemoryStore::new());
		store.seed_order(order(2)).await;
		let controller = controller_with(store.clone()).await;

		// Terminal status requested again: no graph edge needed.
		controller
			.transition_order_status(1, 2, initiator(), None)
			.await
			.unwrap();
		assert_eq!(store.audits().await.len(), 1);
	}

	#[tokio::test]
	async fn test_unregistered_handler_fails() {
		let store = Arc::new(MemoryStore::new());
		store.seed_order(order(1)).await;
		store.seed_status(status(1, codes::NEW)).await;
		store.seed_status(status(2, codes::CARD_RETURNED_TO_BANK)).await;
		store.seed_graph(1, graph()).await;
		let controller = TransitionController::new(store, HashMap::new());

		let err = controller
			.transition_order_status(1, 2, initiator(), None)
			.await
			.unwrap_err();
		assert!(matches!(err, TransitionError::HandlerNotRegistered(_)));
	}

	#[tokio::test]
	async fn test_new_handler_resets_history_through_controller() {
		let store = Arc::new(MemoryStore::new());
		store.seed_order(order(1)).await;
		let controller = controller_with(store.clone()).await;

		controller
			.transition_order_status(1, 1, initiator(), None)
			.await
			.unwrap();
		controller
			.transition_order_status(1, 1, initiator(), None)
			.await
			.unwrap();

		// Repeatable recovery: exactly one `new` row regardless of repeats.
		let history = store.status_history(1).await.unwrap();
		assert_eq!(history.len(), 1);
		assert_eq!(history[0].status_id, 1);
		assert_eq!(store.audits().await.len(), 2);
	}
}
