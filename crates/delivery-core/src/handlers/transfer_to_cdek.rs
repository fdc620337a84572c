//! Handler for the `transfer_to_cdek` status.
//!
//! Hands the order off to the CDEK courier service: creates the shipment
//! through the adapter and stamps the returned track number on the order.

use super::{HandlerError, StatusHandler};
use async_trait::async_trait;
use delivery_partners::cdek::{CdekAdapter, CdekOrderCreate};
use delivery_types::{CourierService, DeliveryStatus, Order, Status};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;

/// Payload of a transfer-to-CDEK transition.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CdekOrderPayload {
	pub latitude: Decimal,
	pub longitude: Decimal,
	pub address: String,
	/// CDEK warehouse code the package is dropped at.
	pub warehouse_id: String,
}

pub struct TransferToCdekHandler {
	adapter: Arc<CdekAdapter>,
}

impl TransferToCdekHandler {
	pub fn new(adapter: Arc<CdekAdapter>) -> Self {
		Self { adapter }
	}
}

#[async_trait]
impl StatusHandler for TransferToCdekHandler {
	async fn handle(
		&self,
		order: &mut Order,
		status: &Status,
		payload: Option<&serde_json::Value>,
	) -> Result<(), HandlerError> {
		let payload: CdekOrderPayload = payload
			.and_then(|value| serde_json::from_value(value.clone()).ok())
			.ok_or_else(|| HandlerError::Validation("invalid body for CDEK order".into()))?;

		let track_number = self
			.adapter
			.order_create(CdekOrderCreate {
				shipment_point: payload.warehouse_id,
				recipient_name: order.receiver_name.clone(),
				recipient_phone: order.receiver_phone_number.clone(),
				latitude: payload.latitude,
				longitude: payload.longitude,
				address: payload.address,
				package_number: order.id.to_string(),
			})
			.await?;

		order.track_number = Some(track_number);
		order.delivery_status = DeliveryStatus::transfer_to_cdek();
		order.courier_service = Some(CourierService::Cdek);
		order.current_status_id = status.id;

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use delivery_partners::cdek::schemas::{
		CreateOrderRequest, CreateOrderResponse, Entity, LocationResponse,
	};
	use delivery_partners::cdek::CdekApi;
	use delivery_partners::ClientError;
	use delivery_types::status::codes;
	use serde_json::json;

	struct MockCdekApi;

	#[async_trait]
	impl CdekApi for MockCdekApi {
		async fn get_location(
			&self,
			_latitude: f64,
			_longitude: f64,
		) -> Result<LocationResponse, ClientError> {
			Ok(LocationResponse {
				code: 270,
				city: "Novosibirsk".into(),
				fias_guid: "8dea00e3-9aab-4d8e-887c-ef2aaa546456".into(),
			})
		}

		async fn create_order(
			&self,
			_request: &CreateOrderRequest,
		) -> Result<CreateOrderResponse, ClientError> {
			Ok(CreateOrderResponse {
				entity: Entity {
					uuid: "72753031-1c8f-4d72-9a1c-b2ff5e03dba4".parse().unwrap(),
				},
			})
		}
	}

	fn handler() -> TransferToCdekHandler {
		TransferToCdekHandler::new(Arc::new(CdekAdapter::new(Arc::new(MockCdekApi))))
	}

	fn order() -> Order {
		Order {
			id: 42,
			partner_id: 1,
			partner_order_id: "p-42".into(),
			current_status_id: 1,
			delivery_graph_id: 1,
			delivery_status: DeliveryStatus::empty(),
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

	fn status() -> Status {
		Status {
			id: 9,
			slug: codes::TRANSFER_TO_CDEK.into(),
			code: codes::TRANSFER_TO_CDEK.into(),
			name: "Transfer to CDEK".into(),
			is_optional: false,
			partner_id: None,
		}
	}

	#[tokio::test]
	async fn test_missing_warehouse_id_is_validation_error() {
		let mut order = order();
		let payload = json!({"latitude": 55.0, "longitude": 82.9, "address": "Lenina 1"});

		let err = handler()
			.handle(&mut order, &status(), Some(&payload))
			.await
			.unwrap_err();
		assert_eq!(err.to_string(), "invalid body for CDEK order");
		assert!(order.track_number.is_none());
	}

	#[tokio::test]
	async fn test_success_stamps_track_number_and_courier_service() {
		let mut order = order();
		let payload = json!({
			"latitude": 55.0,
			"longitude": 82.9,
			"address": "Lenina 1",
			"warehouse_id": "NSK1"
		});

		handler()
			.handle(&mut order, &status(), Some(&payload))
			.await
			.unwrap();

		assert_eq!(
			order.track_number.as_deref(),
			Some("72753031-1c8f-4d72-9a1c-b2ff5e03dba4")
		);
		assert_eq!(order.courier_service, Some(CourierService::Cdek));
		assert_eq!(
			order.delivery_status.status.as_deref(),
			Some(codes::TRANSFER_TO_CDEK)
		);
		assert_eq!(order.current_status_id, 9);
	}
}
