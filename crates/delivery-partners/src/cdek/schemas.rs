//! Wire schemas for the CDEK API.
//!
//! The create-order request carries a fixed sender profile and package
//! shape: everything we ship through CDEK is a single card-sized package
//! sent on behalf of the bank.

use serde::{Deserialize, Serialize};

/// Response of `GET /location/coordinates`.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationResponse {
	pub code: i64,
	pub city: String,
	pub fias_guid: String,
}

/// Response of `POST /orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderResponse {
	pub entity: Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Entity {
	/// CDEK's track identifier for the created shipment.
	pub uuid: uuid::Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Phone {
	pub number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sender {
	pub company: String,
	pub name: String,
	pub contragent_type: String,
	/// Call-center number.
	pub phones: Vec<Phone>,
}

impl Default for Sender {
	fn default() -> Self {
		Self {
			company: "Freedom Bank".to_string(),
			name: "Freedom Bank".to_string(),
			contragent_type: "LEGAL_ENTITY".to_string(),
			phones: vec![Phone {
				number: "87071234567".to_string(),
			}],
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipient {
	pub name: String,
	pub phones: Vec<Phone>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToLocation {
	pub code: i64,
	pub city: String,
	pub fias_guid: String,
	pub longitude: f64,
	pub latitude: f64,
	pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Package {
	/// Our order id.
	pub number: String,
	pub weight: f64,
	pub length: i32,
	pub width: i32,
	pub height: i32,
	pub comment: String,
}

impl Package {
	fn card(number: &str) -> Self {
		Self {
			number: number.to_string(),
			weight: 0.1,
			length: 1,
			width: 1,
			height: 1,
			comment: "Карта".to_string(),
		}
	}
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateOrderRequest {
	#[serde(rename = "type")]
	pub kind: i32,
	pub tariff_code: i32,
	pub shipment_point: String,
	pub sender: Sender,
	pub recipient: Recipient,
	pub to_location: ToLocation,
	pub packages: Vec<Package>,
	pub is_client_return: bool,
	pub has_reverse_order: bool,
	pub developer_key: String,
}

impl CreateOrderRequest {
	/// Builds the full request from flat arguments, hiding the fixed parts
	/// of the schema.
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		shipment_point: &str,
		recipient_name: &str,
		recipient_phone: &str,
		location_code: i64,
		city: &str,
		fias_guid: &str,
		latitude: f64,
		longitude: f64,
		address: &str,
		package_number: &str,
	) -> Self {
		Self {
			kind: 2,
			tariff_code: 482,
			shipment_point: shipment_point.to_string(),
			sender: Sender::default(),
			recipient: Recipient {
				name: recipient_name.to_string(),
				phones: vec![Phone {
					number: recipient_phone.to_string(),
				}],
			},
			to_location: ToLocation {
				code: location_code,
				city: city.to_string(),
				fias_guid: fias_guid.to_string(),
				longitude,
				latitude,
				address: address.to_string(),
			},
			packages: vec![Package::card(package_number)],
			is_client_return: false,
			has_reverse_order: false,
			developer_key: "freedom-loggy".to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_request_serializes_with_fixed_fields() {
		let request = CreateOrderRequest::new(
			"MSK67",
			"Иванов Иван",
			"+79990000000",
			44,
			"Москва",
			"0c5b2444-70a0-4932-980c-b4dc0d3f02b5",
			55.751,
			37.617,
			"ул. Ленина, 1",
			"123",
		);

		let value = serde_json::to_value(&request).unwrap();
		assert_eq!(value["type"], 2);
		assert_eq!(value["tariff_code"], 482);
		assert_eq!(value["developer_key"], "freedom-loggy");
		assert_eq!(value["sender"]["contragent_type"], "LEGAL_ENTITY");
		assert_eq!(value["packages"][0]["comment"], "Карта");
		assert_eq!(value["packages"][0]["weight"], 0.1);
	}
}
