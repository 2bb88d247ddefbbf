//! Infrastructure implementation of the `MarathonApi` port over HTTP.
//!
//! Talks to the Marathon REST API (`/v2/apps`) with reqwest. Connection
//! settings come from the immutable `ConnectionConfig` resolved at startup.

use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;

use crate::application::ports::MarathonApi;
use crate::domain::app::AppEnvelope;
use crate::domain::{AppDescriptor, AppInfo, ConnectionConfig, MarathonError};

/// Marathon HTTP client.
pub struct MarathonClient {
    http: reqwest::Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl MarathonClient {
    /// Build a client from connection settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the proxy URL is invalid or the TLS backend
    /// cannot be initialised.
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("kitchen-marathon/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(!config.verify_ssl);

        if let Some(proxy) = &config.proxy {
            let url = proxy.url();
            let mut p = reqwest::Proxy::all(&url)
                .with_context(|| format!("invalid Marathon proxy {url}"))?;
            if let Some(user) = &proxy.username {
                p = p.basic_auth(user, proxy.password.as_deref().unwrap_or_default());
            }
            builder = builder.proxy(p);
        }

        Ok(Self {
            http: builder.build().context("building Marathon HTTP client")?,
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    fn apps_url(&self) -> String {
        format!("{}/v2/apps", self.base_url)
    }

    fn app_url(&self, app_id: &str) -> String {
        format!("{}/v2/apps/{}", self.base_url, app_id.trim_start_matches('/'))
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let req = self.http.request(method, url);
        match &self.username {
            Some(user) => req.basic_auth(user, self.password.as_ref()),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder, app_id: &str) -> Result<Response, MarathonError> {
        let resp = req.send().await.map_err(transport_error)?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(classify_status(status.as_u16(), app_id, &body))
    }
}

impl MarathonApi for MarathonClient {
    async fn create_app(&self, descriptor: &AppDescriptor) -> Result<Option<String>, MarathonError> {
        let req = self.request(Method::POST, self.apps_url()).json(descriptor);
        let resp = self.send(req, descriptor.id()).await?;
        let body: Option<Value> = resp.json().await.ok();
        Ok(body
            .as_ref()
            .and_then(|b| b.get("id"))
            .and_then(Value::as_str)
            .map(String::from))
    }

    async fn get_app(&self, app_id: &str) -> Result<AppInfo, MarathonError> {
        let req = self.request(Method::GET, self.app_url(app_id));
        let resp = self.send(req, app_id).await?;
        let envelope: AppEnvelope = resp
            .json()
            .await
            .map_err(|e| MarathonError::Decode(e.to_string()))?;
        Ok(envelope.app)
    }

    async fn delete_app(&self, app_id: &str) -> Result<(), MarathonError> {
        let req = self.request(Method::DELETE, self.app_url(app_id));
        self.send(req, app_id).await?;
        Ok(())
    }
}

/// Map a non-success HTTP status onto a Marathon error kind.
///
/// 503 and 504 are treated like request timeouts: Marathon returns them while
/// a leader election or a long deployment is in progress.
#[must_use]
pub fn classify_status(status: u16, app_id: &str, body: &str) -> MarathonError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| body.trim().to_string());
    match status {
        404 => MarathonError::NotFound(app_id.to_string()),
        401 | 403 => MarathonError::Unauthorized { status },
        503 | 504 => MarathonError::Timeout(format!("HTTP {status}: {message}")),
        400..=499 => MarathonError::Client { status, message },
        _ => MarathonError::Server { status, message },
    }
}

fn transport_error(e: reqwest::Error) -> MarathonError {
    if e.is_timeout() {
        MarathonError::Timeout(e.to_string())
    } else if e.is_decode() {
        MarathonError::Decode(e.to_string())
    } else {
        MarathonError::Transport(e.to_string())
    }
}
