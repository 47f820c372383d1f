//! Event ingestion with fault-isolated writes
//!
//! Validation failures are the only errors a caller ever sees. Once a
//! payload is valid, the write is attempted and its result is folded into
//! an [`IngestOutcome`] instead of being propagated.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::events::{AnalyticsEvent, RequestContext, TrackRequest};
use crate::error::Result;
use crate::store::Store;

/// Result of attempting to record a valid event
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// The store confirmed the write
    Delivered(AnalyticsEvent),
    /// The write failed or faulted; the event is lost
    Unconfirmed {
        event: AnalyticsEvent,
        reason: String,
    },
}

impl IngestOutcome {
    pub fn event(&self) -> &AnalyticsEvent {
        match self {
            Self::Delivered(event) => event,
            Self::Unconfirmed { event, .. } => event,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }

    /// Non-fatal warning for the caller, if the write was not confirmed
    pub fn warning(&self) -> Option<String> {
        match self {
            Self::Delivered(_) => None,
            Self::Unconfirmed { reason, .. } => {
                Some(format!("event accepted but not persisted: {}", reason))
            }
        }
    }
}

/// Validate a raw payload and build the normalized event. Nothing is written.
pub fn prepare_event(
    payload: &Value,
    context: &RequestContext,
    now: DateTime<Utc>,
) -> Result<AnalyticsEvent> {
    let request = TrackRequest::from_json(payload)?;
    Ok(AnalyticsEvent::normalize(request, context, now))
}

/// Attempt the durable write, converting any failure into a soft outcome
pub fn deliver(store: &dyn Store, event: AnalyticsEvent) -> IngestOutcome {
    match store.insert_event(&event) {
        Ok(()) => {
            tracing::debug!(
                event_id = %event.id,
                event_type = %event.event_type,
                user_id = %event.user_id,
                "analytics event recorded"
            );
            IngestOutcome::Delivered(event)
        }
        Err(e) => unconfirmed(event, e.to_string()),
    }
}

/// Outcome for an event whose write could not be confirmed
pub fn unconfirmed(event: AnalyticsEvent, reason: String) -> IngestOutcome {
    tracing::warn!(
        event_id = %event.id,
        event_type = %event.event_type,
        error = %reason,
        "failed to persist analytics event"
    );
    IngestOutcome::Unconfirmed { event, reason }
}

/// Validate, normalize and record an event in one step
pub fn track_event(
    store: &dyn Store,
    payload: &Value,
    context: &RequestContext,
    now: DateTime<Utc>,
) -> Result<IngestOutcome> {
    let event = prepare_event(payload, context, now)?;
    Ok(deliver(store, event))
}
