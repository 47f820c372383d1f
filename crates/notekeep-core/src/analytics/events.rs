//! Analytics event types and payload validation

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{NotekeepError, Result};

/// Owner sentinel for events and notes without an authenticated user
pub const ANONYMOUS_USER: &str = "anonymous";

/// Provenance fallback when neither the payload nor the request carry one
pub const UNKNOWN_PROVENANCE: &str = "unknown";

/// Closed set of event categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    NoteCreated,
    NoteUpdated,
    NoteDeleted,
    NoteViewed,
    VoiceRecordingStarted,
    VoiceRecordingCompleted,
    NoteExported,
    NoteShared,
    SearchPerformed,
    LanguageChanged,
    PageView,
    UserSignup,
    UserSignin,
}

impl EventType {
    /// Every accepted event type, in declaration order
    pub const ALL: [EventType; 13] = [
        Self::NoteCreated,
        Self::NoteUpdated,
        Self::NoteDeleted,
        Self::NoteViewed,
        Self::VoiceRecordingStarted,
        Self::VoiceRecordingCompleted,
        Self::NoteExported,
        Self::NoteShared,
        Self::SearchPerformed,
        Self::LanguageChanged,
        Self::PageView,
        Self::UserSignup,
        Self::UserSignin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoteCreated => "note_created",
            Self::NoteUpdated => "note_updated",
            Self::NoteDeleted => "note_deleted",
            Self::NoteViewed => "note_viewed",
            Self::VoiceRecordingStarted => "voice_recording_started",
            Self::VoiceRecordingCompleted => "voice_recording_completed",
            Self::NoteExported => "note_exported",
            Self::NoteShared => "note_shared",
            Self::SearchPerformed => "search_performed",
            Self::LanguageChanged => "language_changed",
            Self::PageView => "page_view",
            Self::UserSignup => "user_signup",
            Self::UserSignin => "user_signin",
        }
    }

    fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = NotekeepError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                NotekeepError::validation(
                    "event_type",
                    format!("'{}' is not one of: {}", s, Self::supported_list()),
                )
            })
    }
}

/// Coarse client location attached to an event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub timezone: String,
}

/// A normalized, stored analytics event. Every field is populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub id: String,
    pub event_type: EventType,
    pub event_data: Map<String, Value>,
    pub user_id: String,
    pub session_id: String,
    pub user_agent: String,
    pub ip_address: String,
    pub location: Location,
    pub created_at: DateTime<Utc>,
}

/// Provenance captured from the transport when the payload omits it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// A validated ingestion payload. Only `event_type` is required.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRequest {
    pub event_type: EventType,
    pub event_data: Option<Map<String, Value>>,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub location: Option<Location>,
}

impl TrackRequest {
    /// A request carrying only an event type
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            event_data: None,
            user_id: None,
            session_id: None,
            user_agent: None,
            ip_address: None,
            location: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.event_data = Some(data);
        self
    }

    /// Validate a raw JSON payload, naming the first failing field
    pub fn from_json(payload: &Value) -> Result<Self> {
        let object = payload
            .as_object()
            .ok_or_else(|| NotekeepError::validation("body", "must be a JSON object"))?;

        let event_type = match object.get("event_type") {
            None | Some(Value::Null) => {
                return Err(NotekeepError::validation("event_type", "is required"))
            }
            Some(Value::String(s)) => s.parse::<EventType>()?,
            Some(_) => return Err(NotekeepError::validation("event_type", "must be a string")),
        };

        let event_data = match object.get("event_data") {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(map.clone()),
            Some(_) => return Err(NotekeepError::validation("event_data", "must be an object")),
        };

        let location = match object.get("location") {
            None | Some(Value::Null) => None,
            Some(value @ Value::Object(_)) => Some(
                serde_json::from_value::<Location>(value.clone())
                    .map_err(|e| NotekeepError::validation("location", e))?,
            ),
            Some(_) => return Err(NotekeepError::validation("location", "must be an object")),
        };

        Ok(Self {
            event_type,
            event_data,
            user_id: optional_string(object, "user_id")?,
            session_id: optional_string(object, "session_id")?,
            user_agent: optional_string(object, "user_agent")?,
            ip_address: optional_string(object, "ip_address")?,
            location,
        })
    }
}

/// Read an optional string field; empty strings count as absent
fn optional_string(object: &Map<String, Value>, field: &str) -> Result<Option<String>> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(NotekeepError::validation(field, "must be a string")),
    }
}

impl AnalyticsEvent {
    /// Build the stored form of a request, applying every default
    pub fn normalize(request: TrackRequest, context: &RequestContext, now: DateTime<Utc>) -> Self {
        let user_agent = request
            .user_agent
            .or_else(|| context.user_agent.clone())
            .unwrap_or_else(|| UNKNOWN_PROVENANCE.to_string());
        let ip_address = request
            .ip_address
            .or_else(|| context.ip_address.clone())
            .unwrap_or_else(|| UNKNOWN_PROVENANCE.to_string());

        Self {
            id: ulid::Ulid::new().to_string(),
            event_type: request.event_type,
            event_data: request.event_data.unwrap_or_default(),
            user_id: request
                .user_id
                .unwrap_or_else(|| ANONYMOUS_USER.to_string()),
            session_id: request
                .session_id
                .unwrap_or_else(|| ulid::Ulid::new().to_string()),
            user_agent,
            ip_address,
            location: request.location.unwrap_or_default(),
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_type_wire_names_roundtrip() {
        for event_type in EventType::ALL {
            let parsed: EventType = event_type.as_str().parse().unwrap();
            assert_eq!(parsed, event_type);

            let json = serde_json::to_value(event_type).unwrap();
            assert_eq!(json, json!(event_type.as_str()));
        }
    }

    #[test]
    fn test_unknown_event_type_names_field() {
        let err = "note_teleported".parse::<EventType>().unwrap_err();
        assert_eq!(err.field(), Some("event_type"));
        assert!(err.to_string().contains("note_teleported"));
    }

    #[test]
    fn test_from_json_requires_event_type() {
        let err = TrackRequest::from_json(&json!({"user_id": "u1"})).unwrap_err();
        assert_eq!(err.field(), Some("event_type"));

        let err = TrackRequest::from_json(&json!({"event_type": 7})).unwrap_err();
        assert_eq!(err.field(), Some("event_type"));
    }

    #[test]
    fn test_from_json_rejects_bad_optional_shapes() {
        let err =
            TrackRequest::from_json(&json!({"event_type": "page_view", "event_data": [1, 2]}))
                .unwrap_err();
        assert_eq!(err.field(), Some("event_data"));

        let err = TrackRequest::from_json(&json!({"event_type": "page_view", "user_id": 42}))
            .unwrap_err();
        assert_eq!(err.field(), Some("user_id"));

        let err = TrackRequest::from_json(&json!({"event_type": "page_view", "location": "NL"}))
            .unwrap_err();
        assert_eq!(err.field(), Some("location"));

        let err = TrackRequest::from_json(&json!("page_view")).unwrap_err();
        assert_eq!(err.field(), Some("body"));
    }

    #[test]
    fn test_from_json_full_payload() {
        let request = TrackRequest::from_json(&json!({
            "event_type": "note_shared",
            "event_data": {"note_id": "n1", "channel": "email"},
            "user_id": "u1",
            "session_id": "s1",
            "location": {"country": "NL"}
        }))
        .unwrap();

        assert_eq!(request.event_type, EventType::NoteShared);
        assert_eq!(request.user_id.as_deref(), Some("u1"));
        let location = request.location.unwrap();
        assert_eq!(location.country, "NL");
        assert_eq!(location.city, "");
    }

    #[test]
    fn test_normalize_applies_defaults() {
        let now = Utc::now();
        let event = AnalyticsEvent::normalize(
            TrackRequest::new(EventType::PageView),
            &RequestContext::default(),
            now,
        );

        assert_eq!(event.user_id, ANONYMOUS_USER);
        assert_eq!(event.location, Location::default());
        assert_eq!(event.location.timezone, "");
        assert!(event.event_data.is_empty());
        assert!(!event.session_id.is_empty());
        assert!(!event.id.is_empty());
        assert_eq!(event.user_agent, UNKNOWN_PROVENANCE);
        assert_eq!(event.created_at, now);
    }

    #[test]
    fn test_normalize_prefers_payload_over_context() {
        let context = RequestContext {
            user_agent: Some("curl/8.0".to_string()),
            ip_address: Some("10.0.0.1".to_string()),
        };
        let mut request = TrackRequest::new(EventType::SearchPerformed);
        request.ip_address = Some("192.168.1.5".to_string());

        let event = AnalyticsEvent::normalize(request, &context, Utc::now());
        assert_eq!(event.user_agent, "curl/8.0");
        assert_eq!(event.ip_address, "192.168.1.5");
    }

    #[test]
    fn test_blank_user_id_defaults_to_anonymous() {
        let request =
            TrackRequest::from_json(&json!({"event_type": "user_signin", "user_id": "  "}))
                .unwrap();
        let event = AnalyticsEvent::normalize(request, &RequestContext::default(), Utc::now());
        assert_eq!(event.user_id, ANONYMOUS_USER);
    }
}
