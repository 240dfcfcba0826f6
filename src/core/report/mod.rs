//! Sweep report aggregate.
//!
//! One `SweepReport` per sweep invocation. The orchestrator is the only
//! writer; renderers (`to_value`, `to_json`, `to_markdown`) take `&self` and
//! never change state, so rendering twice yields the same content.

mod markdown;

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::status::{CheckCategory, CheckStatus};

/// Open key/value diagnostics attached to one check.
pub type Details = Map<String, Value>;

/// Status and diagnostics for one probe invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub category: CheckCategory,
    pub name: String,
    pub status: CheckStatus,
    pub details: Details,
    pub checked_at: DateTime<Utc>,
}

impl CheckOutcome {
    pub fn new(
        category: CheckCategory,
        name: impl Into<String>,
        status: CheckStatus,
        details: Details,
    ) -> Self {
        Self {
            category,
            name: name.into(),
            status,
            details,
            checked_at: Utc::now(),
        }
    }
}

/// Probe-name keyed outcomes, kept in insertion order.
///
/// Serialized as a JSON object so the persisted layout is a plain map, while
/// the listing order stays the checker invocation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckMap {
    entries: Vec<CheckOutcome>,
}

impl CheckMap {
    /// Insert an outcome; a second insert for the same name replaces the first in place.
    pub fn insert(&mut self, outcome: CheckOutcome) {
        match self.entries.iter_mut().find(|e| e.name == outcome.name) {
            Some(existing) => *existing = outcome,
            None => self.entries.push(outcome),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CheckOutcome> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for CheckMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, entry)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CheckMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct CheckMapVisitor;

        impl<'de> Visitor<'de> for CheckMapVisitor {
            type Value = CheckMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of probe name to check outcome")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<CheckMap, A::Error> {
                let mut map = CheckMap::default();
                while let Some((name, mut outcome)) = access.next_entry::<String, CheckOutcome>()? {
                    outcome.name = name;
                    map.insert(outcome);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(CheckMapVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportError {
    pub message: String,
    pub can_auto_fix: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportWarning {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of one attempted remediation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixRecord {
    pub description: String,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_errors: usize,
    pub auto_fixable_errors: usize,
    pub warnings: usize,
    pub fixes_applied: usize,
    pub successful_fixes: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
    pub timestamp: DateTime<Utc>,
    pub deployment_status: CheckMap,
    pub connection_health: CheckMap,
    pub ai_agent_status: CheckMap,
    pub database_status: Option<CheckOutcome>,
    pub payment_status: CheckMap,
    pub ui_status: CheckMap,
    pub errors: Vec<ReportError>,
    pub warnings: Vec<ReportWarning>,
    pub fixes_applied: Vec<FixRecord>,
}

impl Default for SweepReport {
    fn default() -> Self {
        Self::new()
    }
}

impl SweepReport {
    pub fn new() -> Self {
        Self {
            timestamp: Utc::now(),
            deployment_status: CheckMap::default(),
            connection_health: CheckMap::default(),
            ai_agent_status: CheckMap::default(),
            database_status: None,
            payment_status: CheckMap::default(),
            ui_status: CheckMap::default(),
            errors: Vec::new(),
            warnings: Vec::new(),
            fixes_applied: Vec::new(),
        }
    }

    pub fn add_deployment_check(&mut self, name: &str, status: CheckStatus, details: Details) {
        self.deployment_status
            .insert(CheckOutcome::new(CheckCategory::Deployment, name, status, details));
    }

    pub fn add_connection_check(&mut self, name: &str, status: CheckStatus, details: Details) {
        self.connection_health
            .insert(CheckOutcome::new(CheckCategory::Connection, name, status, details));
    }

    pub fn add_ai_agent_check(&mut self, name: &str, status: CheckStatus, details: Details) {
        self.ai_agent_status
            .insert(CheckOutcome::new(CheckCategory::AiAgentStatus, name, status, details));
    }

    /// The database is a single probe; a second call replaces the first.
    pub fn add_database_check(&mut self, status: CheckStatus, details: Details) {
        self.database_status = Some(CheckOutcome::new(
            CheckCategory::Database,
            "database",
            status,
            details,
        ));
    }

    pub fn add_payment_check(&mut self, name: &str, status: CheckStatus, details: Details) {
        self.payment_status
            .insert(CheckOutcome::new(CheckCategory::Payment, name, status, details));
    }

    pub fn add_ui_check(&mut self, name: &str, status: CheckStatus, details: Details) {
        self.ui_status
            .insert(CheckOutcome::new(CheckCategory::Ui, name, status, details));
    }

    pub fn add_error(&mut self, message: impl Into<String>, can_auto_fix: bool) {
        self.errors.push(ReportError {
            message: message.into(),
            can_auto_fix,
            timestamp: Utc::now(),
        });
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(ReportWarning {
            message: message.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn add_fix(&mut self, description: impl Into<String>, success: bool) {
        self.fixes_applied.push(FixRecord {
            description: description.into(),
            success,
            timestamp: Utc::now(),
        });
    }

    pub fn summary(&self) -> Summary {
        Summary {
            total_errors: self.errors.len(),
            auto_fixable_errors: self.errors.iter().filter(|e| e.can_auto_fix).count(),
            warnings: self.warnings.len(),
            fixes_applied: self.fixes_applied.len(),
            successful_fixes: self.fixes_applied.iter().filter(|f| f.success).count(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Structured form: the report fields plus a computed `summary` block.
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| {
            Error::internal_json(e.to_string(), Some("serialize sweep report".to_string()))
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            Error::internal_json(e.to_string(), Some("serialize sweep report".to_string()))
        })
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| {
            Error::internal_json(e.to_string(), Some("parse sweep report".to_string()))
        })
    }
}

pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// `None` renders as `{}`, matching a database probe that never ran.
struct DatabaseView<'a>(Option<&'a CheckOutcome>);

impl Serialize for DatabaseView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            Some(outcome) => outcome.serialize(serializer),
            None => serializer.serialize_map(Some(0))?.end(),
        }
    }
}

#[derive(Serialize)]
struct StructuredReport<'a> {
    timestamp: &'a DateTime<Utc>,
    summary: Summary,
    deployment_status: &'a CheckMap,
    connection_health: &'a CheckMap,
    ai_agent_status: &'a CheckMap,
    database_status: DatabaseView<'a>,
    payment_status: &'a CheckMap,
    ui_status: &'a CheckMap,
    errors: &'a [ReportError],
    warnings: &'a [ReportWarning],
    fixes_applied: &'a [FixRecord],
}

impl Serialize for SweepReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        StructuredReport {
            timestamp: &self.timestamp,
            summary: self.summary(),
            deployment_status: &self.deployment_status,
            connection_health: &self.connection_health,
            ai_agent_status: &self.ai_agent_status,
            database_status: DatabaseView(self.database_status.as_ref()),
            payment_status: &self.payment_status,
            ui_status: &self.ui_status,
            errors: &self.errors,
            warnings: &self.warnings,
            fixes_applied: &self.fixes_applied,
        }
        .serialize(serializer)
    }
}

// `summary` is derived, so it is ignored on the way back in.
#[derive(Deserialize)]
struct PersistedReport {
    timestamp: DateTime<Utc>,
    #[serde(default)]
    deployment_status: CheckMap,
    #[serde(default)]
    connection_health: CheckMap,
    #[serde(default)]
    ai_agent_status: CheckMap,
    #[serde(default, deserialize_with = "empty_object_as_none")]
    database_status: Option<CheckOutcome>,
    #[serde(default)]
    payment_status: CheckMap,
    #[serde(default)]
    ui_status: CheckMap,
    #[serde(default)]
    errors: Vec<ReportError>,
    #[serde(default)]
    warnings: Vec<ReportWarning>,
    #[serde(default)]
    fixes_applied: Vec<FixRecord>,
}

fn empty_object_as_none<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<CheckOutcome>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Null => Ok(None),
        Value::Object(map) if map.is_empty() => Ok(None),
        _ => serde_json::from_value(value).map(Some).map_err(de::Error::custom),
    }
}

impl<'de> Deserialize<'de> for SweepReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let persisted = PersistedReport::deserialize(deserializer)?;
        Ok(Self {
            timestamp: persisted.timestamp,
            deployment_status: persisted.deployment_status,
            connection_health: persisted.connection_health,
            ai_agent_status: persisted.ai_agent_status,
            database_status: persisted.database_status,
            payment_status: persisted.payment_status,
            ui_status: persisted.ui_status,
            errors: persisted.errors,
            warnings: persisted.warnings,
            fixes_applied: persisted.fixes_applied,
        })
    }
}
