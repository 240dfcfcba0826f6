//! Bounded-timeout HTTP GET used by every network probe.
//!
//! Checkers talk to `HttpProbe`, not to reqwest, so tests can count calls and
//! script responses without a network.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("aether-sweep/", env!("CARGO_PKG_VERSION"));

/// Status code plus the body, parsed as JSON when it is JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Option<Value>,
}

impl HttpReply {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Look up a field in a JSON object body.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.body.as_ref().and_then(|body| body.get(key))
    }
}

pub trait HttpProbe: Send + Sync {
    /// Issue one GET. `Err` means the call itself failed (timeout, DNS,
    /// refusal); any HTTP status, including 5xx, is an `Ok` reply.
    fn get(&self, url: &str, bearer: Option<&str>) -> Result<HttpReply>;
}

/// Blocking reqwest client with a per-request timeout.
pub struct ReqwestProbe {
    client: Client,
}

impl ReqwestProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| {
                Error::internal_io(e.to_string(), Some("create HTTP client".to_string()))
            })?;

        Ok(Self { client })
    }
}

impl HttpProbe for ReqwestProbe {
    fn get(&self, url: &str, bearer: Option<&str>) -> Result<HttpReply> {
        let mut request = self.client.get(url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| Error::http_transport(url, e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .map_err(|e| Error::http_transport(url, e.to_string()))?;

        Ok(HttpReply {
            status,
            body: parse_body(&text),
        })
    }
}

fn parse_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    serde_json::from_str(text).ok()
}
