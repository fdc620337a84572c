//! Raw Freedom-Bank OTP HTTP client.
//!
//! Basic-auth protected; requests identify the order with the partner's
//! `requestId` query parameter. A 200 response to `send` can still carry
//! `errorCode = "ERROR"`, which is treated as a failed request here because
//! the body has no other signal.

use super::{FreedomBankOtpApi, VerifyResponse};
use crate::{check_status, ClientError};
use async_trait::async_trait;
use delivery_types::SecretString;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SendResponse {
	#[serde(rename = "errorCode")]
	#[serde(default)]
	error_code: Option<String>,
}

pub struct FreedomBankOtpClient {
	http: reqwest::Client,
	base_url: String,
	username: String,
	password: SecretString,
}

impl FreedomBankOtpClient {
	pub fn new(base_url: String, username: String, password: SecretString) -> Self {
		let http = reqwest::Client::builder()
			.timeout(Duration::from_secs(15))
			.build()
			.unwrap_or_default();
		Self {
			http,
			base_url,
			username,
			password,
		}
	}
}

#[async_trait]
impl FreedomBankOtpApi for FreedomBankOtpClient {
	async fn send(&self, request_id: &str) -> Result<(), ClientError> {
		let response = self
			.http
			.post(format!("{}/send", self.base_url))
			.query(&[("requestId", request_id)])
			.basic_auth(&self.username, Some(self.password.expose()))
			.send()
			.await?;

		let response = check_status("freedom_bank_otp", "POST", "/send", response).await?;
		let body: SendResponse = response
			.json()
			.await
			.map_err(|e| ClientError::Transport(e.to_string()))?;

		if body.error_code.as_deref() == Some("ERROR") {
			return Err(ClientError::Status {
				status: 200,
				body: "bad response, errorCode: ERROR".into(),
			});
		}
		Ok(())
	}

	async fn verify(
		&self,
		request_id: &str,
		otp_code: &str,
	) -> Result<VerifyResponse, ClientError> {
		let response = self
			.http
			.post(format!("{}/verify", self.base_url))
			.query(&[("requestId", request_id), ("otp", otp_code)])
			.basic_auth(&self.username, Some(self.password.expose()))
			.send()
			.await?;

		let response = check_status("freedom_bank_otp", "POST", "/verify", response).await?;
		response
			.json()
			.await
			.map_err(|e| ClientError::Transport(e.to_string()))
	}
}

