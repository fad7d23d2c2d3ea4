//! Log line prefixes.
//!
//! Every engine event is prefixed with the evaluation id, and once known the
//! machine being looked at and the disclosure tier it is looked at through:
//! `[eval=eval-1a2b3c4d] [registry=ER-REG-001] [tier=private]`.

use std::fmt;

use crate::passport::types::DisclosureTier;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogContext {
    pub eval_id: String,
    pub registry_id: Option<String>,
    pub tier: Option<DisclosureTier>,
}

impl LogContext {
    pub fn new(eval_id: &str) -> Self {
        Self {
            eval_id: eval_id.to_string(),
            ..Default::default()
        }
    }

    /// Scope to one machine. Blank ids (not yet validated input) leave the
    /// context unscoped.
    pub fn with_registry(&self, registry_id: &str) -> Self {
        let registry_id = registry_id.trim();
        Self {
            registry_id: (!registry_id.is_empty()).then(|| registry_id.to_string()),
            ..self.clone()
        }
    }

    pub fn with_tier(&self, tier: DisclosureTier) -> Self {
        Self {
            tier: Some(tier),
            ..self.clone()
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[eval={}]", self.eval_id)?;
        if let Some(rid) = &self.registry_id {
            write!(f, " [registry={}]", rid)?;
        }
        if let Some(tier) = self.tier {
            write!(f, " [tier={}]", tier.as_str())?;
        }
        Ok(())
    }
}
