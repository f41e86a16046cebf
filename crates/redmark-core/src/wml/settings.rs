use crate::error::{RedmarkError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Settings for the WordprocessingML comparer.
#[derive(Clone, Serialize, Deserialize)]
pub struct WmlComparerSettings {
    /// Author recorded on every generated revision.
    pub author: String,

    /// Timestamp recorded on every generated revision (serialized as
    /// ISO-8601 UTC).
    pub date_time: DateTime<Utc>,

    /// Minimum relative anchor length for paragraph alignment; 0 accepts
    /// any anchor.
    pub detail_threshold: f64,

    /// Optional sink for phase-boundary progress messages.
    #[serde(skip)]
    pub log_callback: Option<Arc<dyn Fn(&str) + Send + Sync>>,
}

impl Default for WmlComparerSettings {
    fn default() -> Self {
        Self {
            author: "redline".to_string(),
            date_time: Utc::now(),
            detail_threshold: 0.0,
            log_callback: None,
        }
    }
}

impl WmlComparerSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_author(mut self, author: &str) -> Self {
        self.author = author.to_string();
        self
    }

    pub fn with_date_time(mut self, date_time: DateTime<Utc>) -> Self {
        self.date_time = date_time;
        self
    }

    pub fn with_detail_threshold(mut self, threshold: f64) -> Self {
        self.detail_threshold = threshold;
        self
    }

    /// Revision timestamp in the `w:date` wire form.
    pub fn date_string(&self) -> String {
        self.date_time.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn log(&self, message: &str) {
        if let Some(callback) = &self.log_callback {
            callback(message);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.detail_threshold) {
            return Err(RedmarkError::invalid_setting(format!(
                "detail_threshold must be within [0, 1], got {}",
                self.detail_threshold
            )));
        }
        if self.author.is_empty() {
            return Err(RedmarkError::invalid_setting("author must not be empty"));
        }
        Ok(())
    }
}
