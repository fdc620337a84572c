//! CDEK courier service integration.
//!
//! The adapter turns our flat order-creation parameters into CDEK's
//! two-step flow: resolve the drop-off location from coordinates, then
//! create the shipment. Each step fails with its own error kind so callers
//! can tell a location lookup problem from a rejected order.

pub mod client;
pub mod schemas;

use crate::ClientError;
use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use schemas::{CreateOrderRequest, CreateOrderResponse, LocationResponse};
use std::sync::Arc;
use thiserror::Error;

pub use client::CdekClient;

/// Errors raised by the CDEK adapter.
#[derive(Debug, Error)]
pub enum CdekError {
	/// Caller-supplied arguments failed validation; no network call was made.
	#[error("invalid body for CDEK order: {0}")]
	Validation(String),
	/// The location lookup by coordinates failed.
	#[error("CDEK get location failed: {0}")]
	GetLocation(String),
	/// The order-creation call failed.
	#[error("CDEK create order failed: {0}")]
	CreateOrder(String),
}

/// Raw CDEK API surface the adapter depends on.
#[async_trait]
pub trait CdekApi: Send + Sync {
	async fn get_location(
		&self,
		latitude: f64,
		longitude: f64,
	) -> Result<LocationResponse, ClientError>;

	async fn create_order(
		&self,
		request: &CreateOrderRequest,
	) -> Result<CreateOrderResponse, ClientError>;
}

/// Flat argument set for creating one CDEK shipment.
#[derive(Debug, Clone)]
pub struct CdekOrderCreate {
	/// CDEK warehouse code in the destination city.
	pub shipment_point: String,
	pub recipient_name: String,
	pub recipient_phone: String,
	pub latitude: Decimal,
	pub longitude: Decimal,
	pub address: String,
	/// Package identifier; our order id.
	pub package_number: String,
}

impl CdekOrderCreate {
	fn validate(&self) -> Result<(), CdekError> {
		let required = [
			("shipment_point", &self.shipment_point),
			("recipient_name", &self.recipient_name),
			("recipient_phone", &self.recipient_phone),
			("address", &self.address),
			("package_number", &self.package_number),
		];
		for (name, value) in required {
			if value.trim().is_empty() {
				return Err(CdekError::Validation(format!("{name} is required")));
			}
		}
		for (name, value) in [("latitude", self.latitude), ("longitude", self.longitude)] {
			if value <= Decimal::ZERO {
				return Err(CdekError::Validation(format!(
					"{name} must be strictly positive"
				)));
			}
		}
		Ok(())
	}
}

/// Translation layer between the transfer-to-CDEK handler and the raw CDEK
/// client.
pub struct CdekAdapter {
	client: Arc<dyn CdekApi>,
}

impl CdekAdapter {
	pub fn new(client: Arc<dyn CdekApi>) -> Self {
		Self { client }
	}

	/// Creates a shipment and returns CDEK's track identifier for it.
	pub async fn order_create(&self, params: CdekOrderCreate) -> Result<String, CdekError> {
		params.validate()?;

		let latitude = decimal_to_f64("latitude", params.latitude)?;
		let longitude = decimal_to_f64("longitude", params.longitude)?;

		let location = self
			.client
			.get_location(latitude, longitude)
			.await
			.map_err(|e| CdekError::GetLocation(e.to_string()))?;

		let request = CreateOrderRequest::new(
			&params.shipment_point,
			&params.recipient_name,
			&params.recipient_phone,
			location.code,
			&location.city,
			&location.fias_guid,
			latitude,
			longitude,
			&params.address,
			&params.package_number,
		);

		let response = self
			.client
			.create_order(&request)
			.await
			.map_err(|e| CdekError::CreateOrder(e.to_string()))?;

		Ok(response.entity.uuid.to_string())
	}
}

fn decimal_to_f64(name: &str, value: Decimal) -> Result<f64, CdekError> {
	value
		.to_f64()
		.ok_or_else(|| CdekError::Validation(format!("{name} is not representable")))
}

#[cfg(test)]
mod tests {
	use super::*;
	use schemas::Entity;
	use std::sync::Mutex;

	struct MockCdekApi {
		location: Result<LocationResponse, ClientError>,
		order: Result<CreateOrderResponse, ClientError>,
		requests: Mutex<Vec<CreateOrderRequest>>,
	}

	impl MockCdekApi {
		fn ok() -> Self {
			Self {
				location: Ok(LocationResponse {
					code: 44,
					city: "Москва".into(),
					fias_guid: "0c5b2444-70a0-4932-980c-b4dc0d3f02b5".into(),
				}),
				order: Ok(CreateOrderResponse {
					entity: Entity {
						uuid: "549b1ab8-518c-42d0-a14f-57569e3e5d65".parse().unwrap(),
					},
				}),
				requests: Mutex::new(Vec::new()),
			}
		}
	}

	#[async_trait]
	impl CdekApi for MockCdekApi {
		async fn get_location(
			&self,
			_latitude: f64,
			_longitude: f64,
		) -> Result<LocationResponse, ClientError> {
			match &self.location {
				Ok(response) => Ok(response.clone()),
				Err(_) => Err(ClientError::Transport("connect timeout".into())),
			}
		}

		async fn create_order(
			&self,
			request: &CreateOrderRequest,
		) -> Result<CreateOrderResponse, ClientError> {
			self.requests.lock().unwrap().push(request.clone());
			match &self.order {
				Ok(response) => Ok(response.clone()),
				Err(_) => Err(ClientError::Status {
					status: 500,
					body: "oops".into(),
				}),
			}
		}
	}

	fn params() -> CdekOrderCreate {
		CdekOrderCreate {
			shipment_point: "MSK67".into(),
			recipient_name: "Иванов Иван".into(),
			recipient_phone: "+79990000000".into(),
			latitude: Decimal::new(55751, 3),
			longitude: Decimal::new(37617, 3),
			address: "ул. Ленина, 1".into(),
			package_number: "123".into(),
		}
	}

	#[tokio::test]
	async fn test_order_create_returns_entity_uuid() {
		let adapter = CdekAdapter::new(Arc::new(MockCdekApi::ok()));
		let track = adapter.order_create(params()).await.unwrap();
		assert_eq!(track, "549b1ab8-518c-42d0-a14f-57569e3e5d65");
	}

	#[tokio::test]
	async fn test_request_carries_location_data() {
		let mock = Arc::new(MockCdekApi::ok());
		let adapter = CdekAdapter::new(mock.clone());
		adapter.order_create(params()).await.unwrap();

		let requests = mock.requests.lock().unwrap();
		assert_eq!(requests.len(), 1);
		assert_eq!(requests[0].to_location.code, 44);
		assert_eq!(requests[0].to_location.city, "Москва");
		assert_eq!(requests[0].packages[0].number, "123");
		assert_eq!(requests[0].recipient.phones[0].number, "+79990000000");
	}

	#[tokio::test]
	async fn test_zero_coordinates_fail_validation_before_any_call() {
		let mock = Arc::new(MockCdekApi::ok());
		let adapter = CdekAdapter::new(mock.clone());

		let mut bad = params();
		bad.latitude = Decimal::ZERO;
		let err = adapter.order_create(bad).await.unwrap_err();
		assert!(matches!(err, CdekError::Validation(_)));
		assert!(mock.requests.lock().unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_empty_string_argument_fails_validation() {
		let adapter = CdekAdapter::new(Arc::new(MockCdekApi::ok()));
		let mut bad = params();
		bad.address = "  ".into();
		assert!(matches!(
			adapter.order_create(bad).await,
			Err(CdekError::Validation(_))
		));
	}

	#[tokio::test]
	async fn test_location_failure_maps_to_get_location_error() {
		let mut mock = MockCdekApi::ok();
		mock.location = Err(ClientError::Transport("connect timeout".into()));
		let adapter = CdekAdapter::new(Arc::new(mock));

		assert!(matches!(
			adapter.order_create(params()).await,
			Err(CdekError::GetLocation(_))
		));
	}

	#[tokio::test]
	async fn test_create_failure_maps_to_create_order_error() {
		let mut mock = MockCdekApi::ok();
		mock.order = Err(ClientError::Status {
			status: 500,
			body: "oops".into(),
		});
		let adapter = CdekAdapter::new(Arc::new(mock));

		assert!(matches!(
			adapter.order_create(params()).await,
			Err(CdekError::CreateOrder(_))
		));
	}
}
