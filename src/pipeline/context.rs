//! Evaluation context.
//!
//! One context per request or dashboard render: an id for log correlation,
//! the instant every age computation uses, and the viewer.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::actions::ViewerContext;
use crate::config::EngineConfig;
use crate::logging::structured::LogContext;

#[derive(Debug, Clone)]
pub struct EvaluationContext {
    pub eval_id: String,
    pub now: DateTime<Utc>,
    pub viewer: ViewerContext,
    pub config: EngineConfig,
}

impl EvaluationContext {
    pub fn new(now: DateTime<Utc>, viewer: ViewerContext, config: EngineConfig) -> Self {
        let eval_id = format!("eval-{}", &Uuid::new_v4().simple().to_string()[..8]);
        Self {
            eval_id,
            now,
            viewer,
            config,
        }
    }

    /// Context from an RFC 3339 timestamp. Unparseable or absent input uses
    /// the current time.
    pub fn from_timestamp(now: Option<&str>, viewer: ViewerContext, config: EngineConfig) -> Self {
        let now = now
            .and_then(|ts| DateTime::parse_from_rfc3339(ts.trim()).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);
        Self::new(now, viewer, config)
    }

    /// Log prefix carrying the eval id and the viewer's tier.
    pub fn log_context(&self) -> LogContext {
        LogContext::new(&self.eval_id).with_tier(self.viewer.tier)
    }
}
