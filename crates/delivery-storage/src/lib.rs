//! Storage module for the delivery order system.
//!
//! This module defines the persistence collaborator contract the transition
//! engine depends on. The relational layout behind it is out of scope; the
//! engine only needs the narrow read/write operations below, called
//! synchronously within one transition. An in-memory backend is provided for
//! tests and development.

use async_trait::async_trait;
use delivery_types::{
	GeoPoint, Order, OrderGeolocation, Product, Status, StatusHistoryRecord, TransitionAudit,
};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// A referenced entity does not exist.
	#[error("{0} was not found")]
	NotFound(String),
	/// The storage backend failed.
	#[error("Backend error: {0}")]
	Backend(String),
}

/// Persistence collaborator contract consumed by the controller and the
/// status handlers.
///
/// Two operations are atomic by contract, covering the only transactional
/// scopes the handlers request: [`commit_status_change`] (order save plus
/// history insert) and [`reset_status_history`] (delete-all plus
/// insert-one). [`set_code_sent_point`] must serialize its read-modify-write
/// against concurrent updates to the same geolocation row.
///
/// [`commit_status_change`]: OrderStore::commit_status_change
/// [`reset_status_history`]: OrderStore::reset_status_history
/// [`set_code_sent_point`]: OrderStore::set_code_sent_point
#[async_trait]
pub trait OrderStore: Send + Sync {
	async fn get_order(&self, id: i64) -> Result<Order, StorageError>;

	async fn save_order(&self, order: &Order) -> Result<(), StorageError>;

	async fn get_status(&self, id: i64) -> Result<Status, StorageError>;

	async fn get_status_by_code(&self, code: &str) -> Result<Status, StorageError>;

	/// Raw graph JSON for the given delivery graph id.
	async fn get_delivery_graph(&self, id: i64) -> Result<serde_json::Value, StorageError>;

	/// History rows for one order, oldest first.
	async fn status_history(&self, order_id: i64)
		-> Result<Vec<StatusHistoryRecord>, StorageError>;

	async fn append_status_history(
		&self,
		record: StatusHistoryRecord,
	) -> Result<(), StorageError>;

	/// Deletes every history row of the order and inserts `record` as the
	/// single remaining row, atomically.
	async fn reset_status_history(
		&self,
		order_id: i64,
		record: StatusHistoryRecord,
	) -> Result<(), StorageError>;

	/// Saves the order and appends the history row in one transactional
	/// scope.
	async fn commit_status_change(
		&self,
		order: &Order,
		record: StatusHistoryRecord,
	) -> Result<(), StorageError>;

	async fn record_audit(&self, audit: TransitionAudit) -> Result<(), StorageError>;

	async fn get_product(&self, order_id: i64) -> Result<Product, StorageError>;

	async fn save_product(&self, product: &Product) -> Result<(), StorageError>;

	async fn get_geolocation(
		&self,
		order_id: i64,
	) -> Result<Option<OrderGeolocation>, StorageError>;

	async fn create_geolocation(
		&self,
		geolocation: OrderGeolocation,
	) -> Result<(), StorageError>;

	/// Updates `code_sent_point` on the order's geolocation row. The
	/// read-modify-write is serialized against concurrent callers; a missing
	/// row is an error.
	async fn set_code_sent_point(
		&self,
		order_id: i64,
		point: GeoPoint,
	) -> Result<(), StorageError>;

	/// Drops any outstanding SMS-postcontrol bookkeeping for the order.
	async fn clear_sms_postcontrol(&self, order_id: i64) -> Result<(), StorageError>;
}
