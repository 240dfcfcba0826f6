//! Render, Vercel and the backend `/healthz` endpoint.

use serde_json::Value;

use super::{error_details, Probe};
use crate::config::SweepConfig;
use crate::http::{HttpProbe, HttpReply};
use crate::report::Details;
use crate::status::DeploymentStatus;

pub struct DeploymentChecker<'a> {
    config: &'a SweepConfig,
    http: &'a dyn HttpProbe,
}

impl<'a> DeploymentChecker<'a> {
    pub fn new(config: &'a SweepConfig, http: &'a dyn HttpProbe) -> Self {
        Self { config, http }
    }

    /// Render service status. Unconfigured without a network call when the
    /// API key or service id is missing.
    pub fn check_render(&self) -> Probe<DeploymentStatus> {
        let (Some(api_key), Some(service_id)) =
            (self.config.render_api_key(), self.config.render_service_id())
        else {
            return (
                DeploymentStatus::Unconfigured,
                error_details("Missing RENDER_API_KEY or RENDER_SERVICE_ID"),
            );
        };

        let mut details = Details::new();
        details.insert("configured".to_string(), Value::Bool(true));
        details.insert("api_accessible".to_string(), Value::Bool(false));

        let url = format!(
            "{}/services/{}",
            self.config.defaults.render_api_base.trim_end_matches('/'),
            service_id
        );

        let reply = match self.http.get(&url, Some(api_key)) {
            Ok(reply) => reply,
            Err(err) => {
                details.insert("error".to_string(), Value::String(err.message));
                return (DeploymentStatus::TransportError, details);
            }
        };

        if !reply.is_ok() {
            details.insert(
                "error".to_string(),
                Value::String(format!("API returned {}", reply.status)),
            );
            return (DeploymentStatus::Unhealthy, details);
        }

        // Render nests the service under `service` on some endpoints.
        let service = reply
            .field("service")
            .filter(|v| v.is_object())
            .or(reply.body.as_ref())
            .cloned()
            .unwrap_or(Value::Null);

        let suspended = is_suspended(service.get("suspended"));
        details.insert("api_accessible".to_string(), Value::Bool(true));
        details.insert("service_name".to_string(), field_or_null(&service, "name"));
        details.insert("service_type".to_string(), field_or_null(&service, "type"));
        details.insert("suspended".to_string(), Value::Bool(suspended));

        if suspended {
            details.insert(
                "error".to_string(),
                Value::String("Service is suspended".to_string()),
            );
            (DeploymentStatus::Suspended, details)
        } else {
            (DeploymentStatus::Healthy, details)
        }
    }

    /// Backend `/healthz`. `None` when `BACKEND_URL` is not configured.
    pub fn check_backend_healthz(&self) -> Option<Probe<DeploymentStatus>> {
        let base = self.config.backend_url()?;
        let url = format!("{}/healthz", base);

        let mut details = Details::new();
        details.insert("url".to_string(), Value::String(url.clone()));

        let reply = match self.http.get(&url, None) {
            Ok(reply) => reply,
            Err(err) => {
                details.insert("error".to_string(), Value::String(err.message));
                return Some((DeploymentStatus::TransportError, details));
            }
        };

        Some(classify_healthz(reply, details))
    }

    /// Vercel project status. Unconfigured without a network call when the
    /// token or project id is missing.
    pub fn check_vercel(&self) -> Probe<DeploymentStatus> {
        let (Some(token), Some(project_id)) =
            (self.config.vercel_token(), self.config.vercel_project_id())
        else {
            return (
                DeploymentStatus::Unconfigured,
                error_details("Missing VERCEL_TOKEN or VERCEL_PROJECT_ID"),
            );
        };

        let mut details = Details::new();
        details.insert("configured".to_string(), Value::Bool(true));

        let url = format!(
            "{}/projects/{}",
            self.config.defaults.vercel_api_base.trim_end_matches('/'),
            project_id
        );

        match self.http.get(&url, Some(token)) {
            Ok(reply) if reply.is_ok() => {
                details.insert("project_name".to_string(), reply_field(&reply, "name"));
                details.insert("framework".to_string(), reply_field(&reply, "framework"));
                (DeploymentStatus::Healthy, details)
            }
            Ok(reply) => {
                details.insert(
                    "error".to_string(),
                    Value::String(format!("API returned {}", reply.status)),
                );
                (DeploymentStatus::Unhealthy, details)
            }
            Err(err) => {
                details.insert("error".to_string(), Value::String(err.message));
                (DeploymentStatus::TransportError, details)
            }
        }
    }
}

fn classify_healthz(reply: HttpReply, mut details: Details) -> Probe<DeploymentStatus> {
    if !reply.is_ok() {
        details.insert("status_code".to_string(), Value::from(reply.status));
        details.insert(
            "error".to_string(),
            Value::String(format!("Health endpoint returned {}", reply.status)),
        );
        return (DeploymentStatus::Unhealthy, details);
    }

    let ok = reply.field("ok").and_then(Value::as_bool).unwrap_or(false);
    details.insert("ok".to_string(), Value::Bool(ok));
    details.insert(
        "response".to_string(),
        reply.body.clone().unwrap_or(Value::Null),
    );

    if ok {
        (DeploymentStatus::Healthy, details)
    } else {
        details.insert(
            "error".to_string(),
            Value::String("Health endpoint did not report ok".to_string()),
        );
        (DeploymentStatus::Unhealthy, details)
    }
}

/// Render reports `suspended` as either a boolean or `"suspended"`/`"not_suspended"`.
fn is_suspended(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(state)) => state == "suspended",
        _ => false,
    }
}

fn field_or_null(value: &Value, key: &str) -> Value {
    value.get(key).cloned().unwrap_or(Value::Null)
}

fn reply_field(reply: &HttpReply, key: &str) -> Value {
    reply.field(key).cloned().unwrap_or(Value::Null)
}
