//! Raw POS-terminal OTP HTTP client.
//!
//! The TMS authenticates with a static `Authorization` header value handed
//! out per environment. Both calls address the terminal by its business key
//! in the path; the verify call completes the TMS user task, so it carries
//! the courier's name as `managerFio`.

use super::PosTerminalOtpApi;
use crate::{check_status, ClientError};
use async_trait::async_trait;
use delivery_types::SecretString;
use std::time::Duration;

pub struct PosTerminalOtpClient {
	http: reqwest::Client,
	base_url: String,
	auth_header: SecretString,
}

impl PosTerminalOtpClient {
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
impl PosTerminalOtpApi for PosTerminalOtpClient {
	async fn send(&self, business_key: &str, phone_number: &str) -> Result<(), ClientError> {
		let response = self
			.http
			.post(format!("{}/tms/send-otp/{}", self.base_url, business_key))
			.query(&[("phoneNumber", phone_number)])
			.header("Authorization", self.auth_header.expose())
			.send()
			.await?;

		check_status("pos_terminal_otp", "POST", "/tms/send-otp", response).await?;
		Ok(())
	}

	async fn verify(
		&self,
		business_key: &str,
		phone_number: &str,
		otp_code: &str,
		courier_full_name: &str,
	) -> Result<String, ClientError> {
		let response = self
			.http
			.post(format!(
				"{}/tms/user-task/complete/{}",
				self.base_url, business_key
			))
			.query(&[
				("phoneNumber", phone_number),
				("otpCode", otp_code),
				("managerFio", courier_full_name),
			])
			.header("Authorization", self.auth_header.expose())
			.send()
			.await?;

		let response =
			check_status("pos_terminal_otp", "POST", "/tms/user-task/complete", response).await?;
		// The body is a bare JSON string such as "SUCCESS" or "FAILURE".
		response
			.json()
			.await
			.map_err(|e| ClientError::Transport(e.to_string()))
	}
}
