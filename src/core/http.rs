use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::config::Config;
use crate::core::error::{ServerDlError, ServerDlResult};

pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(default_headers)
        .build()
}

/// GET `url` and decode the body as JSON. Anything but `200 OK` is an error.
pub async fn fetch_json<T: DeserializeOwned>(client: &Client, url: &str) -> ServerDlResult<T> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(ServerDlError::UnexpectedStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// GET `url` and return the body as text. Anything but `200 OK` is an error.
pub async fn fetch_text(client: &Client, url: &str) -> ServerDlResult<String> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(ServerDlError::UnexpectedStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(response.text().await?)
}

/// Top-level keys of a JSON object, in document order.
pub fn json_object_keys(value: &Value, url: &str) -> ServerDlResult<Vec<String>> {
    let object = value.as_object().ok_or_else(|| ServerDlError::Manifest {
        url: url.to_string(),
        reason: "expected a JSON object".into(),
    })?;
    Ok(object.keys().cloned().collect())
}
