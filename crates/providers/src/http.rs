//! Request helpers shared by the adapters.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use status::Credentials;

use crate::ProviderError;

/// Adds `Authorization: token {token}` when a token is present.
///
/// GitHub and Travis CI share this scheme; Jenkins uses Basic auth instead.
pub(crate) fn with_token(request: RequestBuilder, credentials: &Credentials) -> RequestBuilder {
    match credentials.as_token() {
        Some(token) => request.header(reqwest::header::AUTHORIZATION, format!("token {token}")),
        None => request,
    }
}

/// Sends `request` and decodes a successful JSON body.
///
/// Non-success statuses and undecodable bodies are errors; nothing is retried.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return Err(ProviderError::status(status, &String::from_utf8_lossy(&body)));
    }
    Ok(serde_json::from_slice(&body)?)
}
