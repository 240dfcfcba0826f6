//! PayPal and Stripe credential checks. Format only; no provider is called.

use serde_json::Value;

use super::{error_details, Probe};
use crate::config::SweepConfig;
use crate::report::Details;
use crate::status::PaymentStatus;

const MIN_PAYPAL_CREDENTIAL_LEN: usize = 11;
const STRIPE_KEY_PREFIXES: &[&str] = &["sk_", "rk_"];

pub struct PaymentChecker<'a> {
    config: &'a SweepConfig,
}

impl<'a> PaymentChecker<'a> {
    pub fn new(config: &'a SweepConfig) -> Self {
        Self { config }
    }

    pub fn check_paypal(&self) -> Probe<PaymentStatus> {
        let mode = self.config.paypal_mode();
        let (Some(client_id), Some(secret)) =
            (self.config.paypal_client_id(), self.config.paypal_secret())
        else {
            let mut details = error_details("Missing PAYPAL_CLIENT_ID or PAYPAL_SECRET");
            details.insert("mode".to_string(), Value::String(mode.to_string()));
            return (PaymentStatus::Unconfigured, details);
        };

        let mut details = Details::new();
        details.insert("configured".to_string(), Value::Bool(true));
        details.insert("mode".to_string(), Value::String(mode.to_string()));
        details.insert("client_id_present".to_string(), Value::Bool(true));

        if client_id.len() >= MIN_PAYPAL_CREDENTIAL_LEN && secret.len() >= MIN_PAYPAL_CREDENTIAL_LEN {
            details.insert("credentials_format".to_string(), Value::from("valid"));
            (PaymentStatus::Configured, details)
        } else {
            details.insert("credentials_format".to_string(), Value::from("invalid"));
            details.insert(
                "error".to_string(),
                Value::from("PAYPAL_CLIENT_ID or PAYPAL_SECRET is too short"),
            );
            (PaymentStatus::Warning, details)
        }
    }

    pub fn check_stripe(&self) -> Probe<PaymentStatus> {
        let Some(api_key) = self.config.stripe_api_key() else {
            return (PaymentStatus::Unconfigured, error_details("STRIPE_API_KEY not set"));
        };

        let mut details = Details::new();
        details.insert("configured".to_string(), Value::Bool(true));

        if STRIPE_KEY_PREFIXES.iter().any(|prefix| api_key.starts_with(prefix)) {
            details.insert("key_format".to_string(), Value::from("valid"));
            (PaymentStatus::Configured, details)
        } else {
            details.insert("key_format".to_string(), Value::from("invalid"));
            details.insert(
                "error".to_string(),
                Value::from("STRIPE_API_KEY does not start with sk_ or rk_"),
            );
            (PaymentStatus::Warning, details)
        }
    }
}
