use std::fmt::Display;

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;

/// Raw field map of one stored record.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Collection {
    VisitorRequests,
    Notices,
    SosAlerts,
    Users,
    Other(String),
}

impl Collection {
    pub fn as_str(&self) -> &str {
        match self {
            Collection::VisitorRequests => "visitorRequests",
            Collection::Notices => "notices",
            Collection::SosAlerts => "sosAlerts",
            Collection::Users => "users",
            Collection::Other(name) => name,
        }
    }
}

impl From<&str> for Collection {
    fn from(name: &str) -> Self {
        match name {
            "visitorRequests" => Collection::VisitorRequests,
            "notices" => Collection::Notices,
            "sosAlerts" => Collection::SosAlerts,
            "users" => Collection::Users,
            other => Collection::Other(other.to_string()),
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
}

impl Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeKind::Create => write!(f, "create"),
            ChangeKind::Update => write!(f, "update"),
            ChangeKind::Delete => write!(f, "delete"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Created { data: Record },
    Updated { before: Record, after: Record },
    Deleted { before: Record },
}

impl Change {
    pub fn kind(&self) -> ChangeKind {
        match self {
            Change::Created { .. } => ChangeKind::Create,
            Change::Updated { .. } => ChangeKind::Update,
            Change::Deleted { .. } => ChangeKind::Delete,
        }
    }
}

/// A single record-change notification from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub collection: Collection,
    pub record_id: String,
    pub change: Change,
}

impl Event {
    pub fn created(collection: Collection, record_id: impl Into<String>, data: Record) -> Self {
        Self {
            collection,
            record_id: record_id.into(),
            change: Change::Created { data },
        }
    }

    pub fn updated(
        collection: Collection,
        record_id: impl Into<String>,
        before: Record,
        after: Record,
    ) -> Self {
        Self {
            collection,
            record_id: record_id.into(),
            change: Change::Updated { before, after },
        }
    }

    pub fn kind(&self) -> ChangeKind {
        self.change.kind()
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("{kind} record is malformed: {source}")]
    Malformed {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind} change arrived without the {image} image")]
    MissingImage {
        kind: ChangeKind,
        image: &'static str,
    },
}

/// Typed view over a raw [`Record`].
pub trait FromRecord: DeserializeOwned {
    const KIND: &'static str;

    fn from_record(record: &Record) -> Result<Self, RecordError> {
        serde_json::from_value(Value::Object(record.clone())).map_err(|source| {
            RecordError::Malformed {
                kind: Self::KIND,
                source,
            }
        })
    }
}

/// Lifecycle of a visitor request. Anything the store holds that is not one
/// of the known values, strings or otherwise, decodes to `Unrecognized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitorStatus {
    Pending,
    Approved,
    Rejected,
    Unrecognized,
}

impl VisitorStatus {
    /// Terminal states a resident can move a request into.
    pub fn is_decision(&self) -> bool {
        matches!(self, VisitorStatus::Approved | VisitorStatus::Rejected)
    }

    pub fn label(&self) -> &'static str {
        match self {
            VisitorStatus::Pending => "PENDING",
            VisitorStatus::Approved => "APPROVED",
            VisitorStatus::Rejected => "REJECTED",
            VisitorStatus::Unrecognized => "UNRECOGNIZED",
        }
    }
}

impl From<&str> for VisitorStatus {
    fn from(s: &str) -> Self {
        match s {
            "pending" => VisitorStatus::Pending,
            "approved" => VisitorStatus::Approved,
            "rejected" => VisitorStatus::Rejected,
            _ => VisitorStatus::Unrecognized,
        }
    }
}

impl<'de> Deserialize<'de> for VisitorStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(raw) => raw.as_str().into(),
            _ => VisitorStatus::Unrecognized,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorRequest {
    #[serde(default, deserialize_with = "non_empty_text")]
    pub resident_id: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub visitor_name: String,
    #[serde(default, deserialize_with = "text")]
    pub purpose: String,
    #[serde(default, deserialize_with = "text")]
    pub wing: String,
    #[serde(default, deserialize_with = "text")]
    pub flat_number: String,
    #[serde(default)]
    pub status: Option<VisitorStatus>,
}

impl FromRecord for VisitorRequest {
    const KIND: &'static str = "visitor request";
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Notice {
    #[serde(default, deserialize_with = "text")]
    pub title: String,
    #[serde(default, deserialize_with = "text")]
    pub description: String,
}

impl FromRecord for Notice {
    const KIND: &'static str = "notice";
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SosAlert {
    #[serde(default, deserialize_with = "text")]
    pub flat_number: String,
}

impl FromRecord for SosAlert {
    const KIND: &'static str = "SOS alert";
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, deserialize_with = "non_empty_text")]
    pub fcm_token: Option<String>,
}

impl FromRecord for UserProfile {
    const KIND: &'static str = "user profile";
}

// Flat numbers and similar fields are written as numbers by some clients.
fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Falsy values (`""`, `false`, `0`, `null`) count as absent.
fn non_empty_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}
