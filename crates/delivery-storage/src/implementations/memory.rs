//! In-memory storage backend.
//!
//! Keeps all entities in HashMaps behind a single read-write lock, which
//! also gives the atomic operations of the contract their transactional
//! behavior for free. Used by handler and controller tests and for local
//! development; there is no persistence across restarts.

use crate::{OrderStore, StorageError};
use async_trait::async_trait;
use delivery_types::{
	GeoPoint, Order, OrderGeolocation, Product, Status, StatusHistoryRecord, TransitionAudit,
};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
	orders: HashMap<i64, Order>,
	statuses: HashMap<i64, Status>,
	graphs: HashMap<i64, serde_json::Value>,
	history: Vec<StatusHistoryRecord>,
	audits: Vec<TransitionAudit>,
	products: HashMap<i64, Product>,
	geolocations: HashMap<i64, OrderGeolocation>,
	sms_postcontrol: HashMap<i64, Vec<String>>,
}

/// In-memory implementation of [`OrderStore`].
#[derive(Default)]
pub struct MemoryStore {
	state: RwLock<State>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	// Seeding helpers for tests and fixtures.

	pub async fn seed_order(&self, order: Order) {
		self.state.write().await.orders.insert(order.id, order);
	}

	pub async fn seed_status(&self, status: Status) {
		self.state.write().await.statuses.insert(status.id, status);
	}

	pub async fn seed_graph(&self, id: i64, graph: serde_json::Value) {
		self.state.write().await.graphs.insert(id, graph);
	}

	pub async fn seed_product(&self, product: Product) {
		self.state
			.write()
			.await
			.products
			.insert(product.order_id, product);
	}

	pub async fn seed_sms_postcontrol(&self, order_id: i64, entries: Vec<String>) {
		self.state
			.write()
			.await
			.sms_postcontrol
			.insert(order_id, entries);
	}

	pub async fn audits(&self) -> Vec<TransitionAudit> {
		self.state.read().await.audits.clone()
	}

	pub async fn sms_postcontrol(&self, order_id: i64) -> Vec<String> {
		self.state
			.read()
			.await
			.sms_postcontrol
			.get(&order_id)
			.cloned()
			.unwrap_or_default()
	}
}

#[async_trait]
impl OrderStore for MemoryStore {
	async fn get_order(&self, id: i64) -> Result<Order, StorageError> {
		self.state
			.read()
			.await
			.orders
			.get(&id)
			.cloned()
			.ok_or_else(|| StorageError::NotFound(format!("Order with given ID: {id}")))
	}

	async fn save_order(&self, order: &Order) -> Result<(), StorageError> {
		self.state
			.write()
			.await
			.orders
			.insert(order.id, order.clone());
		Ok(())
	}

	async fn get_status(&self, id: i64) -> Result<Status, StorageError> {
		self.state
			.read()
			.await
			.statuses
			.get(&id)
			.cloned()
			.ok_or_else(|| StorageError::NotFound(format!("Status with given ID: {id}")))
	}

	async fn get_status_by_code(&self, code: &str) -> Result<Status, StorageError> {
		self.state
			.read()
			.await
			.statuses
			.values()
			.find(|s| s.code == code)
			.cloned()
			.ok_or_else(|| StorageError::NotFound(format!("Status with given code: {code}")))
	}

	async fn get_delivery_graph(&self, id: i64) -> Result<serde_json::Value, StorageError> {
		self.state
			.read()
			.await
			.graphs
			.get(&id)
			.cloned()
			.ok_or_else(|| StorageError::NotFound(format!("DeliveryGraph with given ID: {id}")))
	}

	async fn status_history(
		&self,
		order_id: i64,
	) -> Result<Vec<StatusHistoryRecord>, StorageError> {
		Ok(self
			.state
			.read()
			.await
			.history
			.iter()
			.filter(|r| r.order_id == order_id)
			.cloned()
			.collect())
	}

	async fn append_status_history(
		&self,
		record: StatusHistoryRecord,
	) -> Result<(), StorageError> {
		self.state.write().await.history.push(record);
		Ok(())
	}

	async fn reset_status_history(
		&self,
		order_id: i64,
		record: StatusHistoryRecord,
	) -> Result<(), StorageError> {
		let mut state = self.state.write().await;
		state.history.retain(|r| r.order_id != order_id);
		state.history.push(record);
		Ok(())
	}

	async fn commit_status_change(
		&self,
		order: &Order,
		record: StatusHistoryRecord,
	) -> Result<(), StorageError> {
		let mut state = self.state.write().await;
		state.orders.insert(order.id, order.clone());
		state.history.push(record);
		Ok(())
	}

	async fn record_audit(&self, audit: TransitionAudit) -> Result<(), StorageError> {
		self.state.write().await.audits.push(audit);
		Ok(())
	}

	async fn get_product(&self, order_id: i64) -> Result<Product, StorageError> {
		self.state
			.read()
			.await
			.products
			.get(&order_id)
			.cloned()
			.ok_or_else(|| {
				StorageError::NotFound(format!("product with given order_id: {order_id}"))
			})
	}

	async fn save_product(&self, product: &Product) -> Result<(), StorageError> {
		self.state
			.write()
			.await
			.products
			.insert(product.order_id, product.clone());
		Ok(())
	}

	async fn get_geolocation(
		&self,
		order_id: i64,
	) -> Result<Option<OrderGeolocation>, StorageError> {
		Ok(self.state.read().await.geolocations.get(&order_id).cloned())
	}

	async fn create_geolocation(
		&self,
		geolocation: OrderGeolocation,
	) -> Result<(), StorageError> {
		self.state
			.write()
			.await
			.geolocations
			.insert(geolocation.order_id, geolocation);
		Ok(())
	}

	async fn set_code_sent_point(
		&self,
		order_id: i64,
		point: GeoPoint,
	) -> Result<(), StorageError> {
		// The write lock spans the whole read-modify-write, so concurrent
		// updates to the same row are serialized.
		let mut state = self.state.write().await;
		let geolocation = state.geolocations.get_mut(&order_id).ok_or_else(|| {
			StorageError::NotFound(format!("geolocation with given order_id: {order_id}"))
		})?;
		geolocation.code_sent_point = Some(point);
		Ok(())
	}

	async fn clear_sms_postcontrol(&self, order_id: i64) -> Result<(), StorageError> {
		self.state.write().await.sms_postcontrol.remove(&order_id);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;
	use delivery_types::DeliveryStatus;

	fn order(id: i64) -> Order {
		Order {
			id,
			partner_id: 1,
			partner_order_id: format!("p-{id}"),
			current_status_id: 1,
			delivery_graph_id: 1,
			delivery_status: DeliveryStatus::empty(),
			track_number: None,
			courier_service: None,
			receiver_name: "Receiver".into(),
			receiver_phone_number: "+70000000000".into(),
			receiver_iin: "000000000000".into(),
			courier_id: None,
			courier_full_name: None,
			delivery_point_address: None,
		}
	}

	fn record(order_id: i64, status_id: i64) -> StatusHistoryRecord {
		StatusHistoryRecord {
			order_id,
			status_id,
			created_at: Utc::now(),
		}
	}

	#[tokio::test]
	async fn test_get_missing_order_is_not_found() {
		let store = MemoryStore::new();
		assert!(matches!(
			store.get_order(7).await,
			Err(StorageError::NotFound(_))
		));
	}

	#[tokio::test]
	async fn test_reset_status_history_leaves_single_row() {
		let store = MemoryStore::new();
		store.append_status_history(record(1, 1)).await.unwrap();
		store.append_status_history(record(1, 2)).await.unwrap();
		store.append_status_history(record(2, 1)).await.unwrap();

		store.reset_status_history(1, record(1, 1)).await.unwrap();

		let history = store.status_history(1).await.unwrap();
		assert_eq!(history.len(), 1);
		assert_eq!(history[0].status_id, 1);
		// Other orders' history is untouched.
		assert_eq!(store.status_history(2).await.unwrap().len(), 1);
	}

	#[tokio::test]
	async fn test_commit_status_change_writes_both() {
		let store = MemoryStore::new();
		let mut order = order(5);
		store.seed_order(order.clone()).await;

		order.current_status_id = 9;
		store
			.commit_status_change(&order, record(5, 9))
			.await
			.unwrap();

		assert_eq!(store.get_order(5).await.unwrap().current_status_id, 9);
		assert_eq!(store.status_history(5).await.unwrap().len(), 1);
	}

	#[tokio::test]
	async fn test_set_code_sent_point_requires_row() {
		let store = MemoryStore::new();
		let point = GeoPoint {
			latitude: "45.0".parse().unwrap(),
			longitude: "-122.0".parse().unwrap(),
		};
		assert!(matches!(
			store.set_code_sent_point(1, point).await,
			Err(StorageError::NotFound(_))
		));

		store
			.create_geolocation(OrderGeolocation {
				order_id: 1,
				courier_id: 2,
				at_client_point: None,
				code_sent_point: None,
				created_at: Utc::now(),
			})
			.await
			.unwrap();
		store.set_code_sent_point(1, point).await.unwrap();

		let geolocation = store.get_geolocation(1).await.unwrap().unwrap();
		assert_eq!(geolocation.code_sent_point, Some(point));
	}
}
