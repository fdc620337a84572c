//! Raw CDEK HTTP client with reactive token lifecycle.
//!
//! A bearer token is acquired lazily through the client-credentials grant
//! before the first call. When a wrapped call comes back with HTTP 401, the
//! client fetches exactly one fresh token and retries the call exactly once;
//! any other status, or a second 401, propagates unmodified. There is no
//! proactive expiry check.

use super::schemas::{CreateOrderRequest, CreateOrderResponse, LocationResponse};
use super::CdekApi;
use crate::{check_status, ClientError};
use async_trait::async_trait;
use delivery_types::SecretString;
use serde::Deserialize;
use std::future::Future;
use tokio::sync::Mutex;

/// Cached bearer token plus the refresh-and-retry-once policy.
pub(crate) struct TokenCell {
	token: Mutex<Option<String>>,
}

impl TokenCell {
	pub(crate) fn new() -> Self {
		Self {
			token: Mutex::new(None),
		}
	}

	/// Runs `call` with a token, fetching one lazily via `fetch` and
	/// retrying exactly once on 401 with a fresh token.
	pub(crate) async fn authenticated<T, FetchFn, FetchFut, CallFn, CallFut>(
		&self,
		fetch: FetchFn,
		call: CallFn,
	) -> Result<T, ClientError>
	where
		FetchFn: Fn() -> FetchFut,
		FetchFut: Future<Output = Result<String, ClientError>>,
		CallFn: Fn(String) -> CallFut,
		CallFut: Future<Output = Result<T, ClientError>>,
	{
		let token = {
			let mut guard = self.token.lock().await;
			match guard.as_ref() {
				Some(token) => token.clone(),
				None => {
					let token = fetch().await?;
					*guard = Some(token.clone());
					token
				}
			}
		};

		match call(token).await {
			Err(err) if err.is_unauthorized() => {
				let token = fetch().await?;
				*self.token.lock().await = Some(token.clone());
				call(token).await
			}
			other => other,
		}
	}
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
	access_token: String,
}

/// Reqwest-backed CDEK client.
pub struct CdekClient {
	http: reqwest::Client,
	base_url: String,
	client_id: String,
	client_secret: SecretString,
	tokens: TokenCell,
}

impl CdekClient {
	pub fn new(base_url: String, client_id: String, client_secret: SecretString) -> Self {
		Self {
			http: reqwest::Client::new(),
			base_url,
			client_id,
			client_secret,
			tokens: TokenCell::new(),
		}
	}

	async fn fetch_token(&self) -> Result<String, ClientError> {
		let response = self
			.http
			.post(format!("{}/oauth/token", self.base_url))
			.form(&[
				("grant_type", "client_credentials"),
				("client_id", self.client_id.as_str()),
				("client_secret", self.client_secret.expose()),
			])
			.send()
			.await?;

		let response = check_status("cdek", "POST", "/oauth/token", response).await?;
		let body: TokenResponse = response
			.json()
			.await
			.map_err(|e| ClientError::Transport(e.to_string()))?;
		Ok(body.access_token)
	}

	async fn do_get_location(
		&self,
		token: &str,
		latitude: f64,
		longitude: f64,
	) -> Result<LocationResponse, ClientError> {
		let response = self
			.http
			.get(format!("{}/location/coordinates", self.base_url))
			.query(&[("latitude", latitude), ("longitude", longitude)])
			.bearer_auth(token)
			.send()
			.await?;

		let response = check_status("cdek", "GET", "/location/coordinates", response).await?;
		response
			.json()
			.await
			.map_err(|e| ClientError::Transport(e.to_string()))
	}

	async fn do_create_order(
		&self,
		token: &str,
		request: &CreateOrderRequest,
	) -> Result<CreateOrderResponse, ClientError> {
		let response = self
			.http
			.post(format!("{}/orders", self.base_url))
			.json(request)
			.bearer_auth(token)
			.send()
			.await?;

		let response = check_status("cdek", "POST", "/orders", response).await?;
		response
			.json()
			.await
			.map_err(|e| ClientError::Transport(e.to_string()))
	}
}

#[async_trait]
impl CdekApi for CdekClient {
	async fn get_location(
		&self,
		latitude: f64,
		longitude: f64,
	) -> Result<LocationResponse, ClientError> {
		self.tokens
			.authenticated(
				|| self.fetch_token(),
				|token| async move { self.do_get_location(&token, latitude, longitude).await },
			)
			.await
	}

	async fn create_order(
		&self,
		request: &CreateOrderRequest,
	) -> Result<CreateOrderResponse, ClientError> {
		self.tokens
			.authenticated(
				|| self.fetch_token(),
				|token| async move { self.do_create_order(&token, request).await },
			)
			.await
	}
}
