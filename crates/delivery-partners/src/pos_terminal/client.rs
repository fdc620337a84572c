//! Raw POS-terminal registration HTTP client.
//!
//! `POST /process/startBts` starts the TMS registration process. The body is
//! the TMS's own camelCase shape; the courier goes into the `manager` query
//! parameter rather than the body, and `requestNumRef` is only sent when the
//! order actually references a prior request.

use super::{PosTerminalApi, RegistratePosTerminal, RegistrationResponse};
use crate::{check_status, ClientError};
use async_trait::async_trait;
use delivery_types::SecretString;
use rust_decimal::Decimal;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartBtsBody<'a> {
	serial_no: &'a str,
	manufacturer: &'a str,
	mid: &'a str,
	tid: &'a str,
	iin_bin: &'a str,
	delivery_point_name: &'a str,
	delivery_point_address: &'a str,
	branch_code: &'a str,
	oked: &'a str,
	mcc_code: &'a str,
	phone_number: &'a str,
	client_fio: &'a str,
	is_cl: bool,
	inventory_number: Option<&'a str>,
	sum: Option<Decimal>,
	#[serde(skip_serializing_if = "Option::is_none")]
	request_num_ref: Option<&'a str>,
}

pub struct PosTerminalClient {
	http: reqwest::Client,
	base_url: String,
	auth_header: SecretString,
}

impl PosTerminalClient {
	pub fn new(base_url: String, auth_header: SecretString) -> Self {
		let http = reqwest::Client::builder()
			.timeout(Duration::from_secs(15))
			.build()
			.unwrap_or_default();
		Self {
			http,
			base_url,
			auth_header,
		}
	}
}

#[async_trait]
impl PosTerminalApi for PosTerminalClient {
	async fn registrate_pos_terminal(
		&self,
		request: &RegistratePosTerminal,
	) -> Result<RegistrationResponse, ClientError> {
		let body = StartBtsBody {
			serial_no: &request.serial_number,
			manufacturer: &request.model,
			mid: &request.merchant_id,
			tid: &request.terminal_id,
			iin_bin: &request.receiver_iin,
			delivery_point_name: &request.store_name,
			delivery_point_address: &request.store_address,
			branch_code: &request.branch_name,
			oked: &request.oked_code,
			mcc_code: &request.mcc_code,
			phone_number: &request.receiver_phone_number,
			client_fio: &request.receiver_full_name,
			is_cl: request.is_installment_enabled,
			inventory_number: request.inventory_number.as_deref(),
			sum: request.sum,
			request_num_ref: request.request_number_ref.as_deref(),
		};

		let response = self
			.http
			.post(format!("{}/process/startBts", self.base_url))
			.query(&[("manager", request.courier_full_name.as_str())])
			.header("Authorization", self.auth_header.expose())
			.json(&body)
			.send()
			.await?;

		let response = check_status("pos_terminal", "POST", "/process/startBts", response).await?;
		response
			.json()
			.await
			.map_err(|e| ClientError::Transport(e.to_string()))
	}
}
