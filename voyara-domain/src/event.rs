use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use voyara_shared::ids::{EventId, FlightId, HotelId, TransferId};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// HIGH and CRITICAL events block searches into the affected city.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Severity::High | Severity::Critical)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Severity::Low),
            "MEDIUM" => Ok(Severity::Medium),
            "HIGH" => Ok(Severity::High),
            "CRITICAL" => Ok(Severity::Critical),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// The type-specific target of a disruption event, resolved once at feed
/// ingestion. Each variant carries only the reference that its matching
/// rule needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Weather { city: String },
    Security { city: String },
    Hotel { hotel_id: HotelId },
    Flight { flight_id: FlightId },
    Transfer { transfer_id: TransferId },
}

impl EventKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            EventKind::Weather { .. } => "WEATHER",
            EventKind::Security { .. } => "SECURITY",
            EventKind::Hotel { .. } => "HOTEL",
            EventKind::Flight { .. } => "FLIGHT",
            EventKind::Transfer { .. } => "TRANSFER",
        }
    }

    /// City-scoped events are the ones mirrored locally for alert display.
    pub fn city(&self) -> Option<&str> {
        match self {
            EventKind::Weather { city } | EventKind::Security { city } => Some(city),
            _ => None,
        }
    }
}

/// A disruption signal from the external feed. Events are append-only and
/// identified by a strictly increasing id, which doubles as the poll cursor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisruptionEvent {
    pub id: EventId,
    #[serde(flatten)]
    pub kind: EventKind,
    pub severity: Severity,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub message: String,
}

/// The durable mirror of a WEATHER/SECURITY event, kept for later alert
/// display after the feed has moved on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub kind: String,
    pub severity: Severity,
    pub city: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl EventRecord {
    /// Mirror a city-scoped event. Returns `None` for event types that are
    /// not persisted locally.
    pub fn mirror(event: &DisruptionEvent) -> Option<Self> {
        let city = event.kind.city()?.to_string();
        Some(Self {
            id: event.id,
            kind: event.kind.type_name().to_string(),
            severity: event.severity,
            city,
            date_from: event.date_from,
            date_to: event.date_to,
            message: event.message.clone(),
            created_at: Utc::now(),
        })
    }
}
