//! Pipeline Event Logger
//!
//! Structured events for each stage of the idea → search → analysis
//! pipeline, written through `tracing` so they land in the NDJSON log.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum PipelineEvent {
    SearchPromptGenerated {
        idea: String,
        search_prompt: String,
    },
    ImagesFound {
        search_prompt: String,
        count: usize,
    },
    ImageFetchFallback {
        image_url: String,
        reason: String,
    },
    DesignAnalyzed {
        image_url: String,
        color_count: usize,
    },
    DocumentRendered {
        color_count: usize,
    },
    UpstreamFailed {
        operation: String,
        error_msg: String,
    },
}

impl PipelineEvent {
    fn is_failure(&self) -> bool {
        matches!(
            self,
            PipelineEvent::UpstreamFailed { .. } | PipelineEvent::ImageFetchFallback { .. }
        )
    }
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: PipelineEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redacts free-text fields and emits the event under the
    /// `pipeline_events` target. Returns the entry that was logged.
    pub fn log_event(request_id: Uuid, mut event: PipelineEvent) -> EventLogEntry {
        match &mut event {
            PipelineEvent::SearchPromptGenerated { idea, search_prompt } => {
                *idea = redact_sensitive_data(idea);
                *search_prompt = redact_sensitive_data(search_prompt);
            }
            PipelineEvent::ImagesFound { search_prompt, .. } => {
                *search_prompt = redact_sensitive_data(search_prompt);
            }
            PipelineEvent::ImageFetchFallback { image_url, reason } => {
                *image_url = redact_sensitive_data(image_url);
                *reason = redact_sensitive_data(reason);
            }
            PipelineEvent::DesignAnalyzed { image_url, .. } => {
                *image_url = redact_sensitive_data(image_url);
            }
            PipelineEvent::UpstreamFailed { error_msg, .. } => {
                *error_msg = redact_sensitive_data(error_msg);
            }
            PipelineEvent::DocumentRendered { .. } => {}
        }

        let entry = EventLogEntry {
            request_id,
            timestamp: Utc::now(),
            event,
        };

        if entry.event.is_failure() {
            warn!(target: "pipeline_events", event = ?entry, "Pipeline event");
        } else {
            info!(target: "pipeline_events", event = ?entry, "Pipeline event");
        }
        entry
    }
}
