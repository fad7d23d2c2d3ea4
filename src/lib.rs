//! EquipRegistry Core - equipment registry decision engine
//!
//! Given a machine record and a viewer, this crate decides the canonical
//! status, the passport fields the viewer may see, the actions offered, and,
//! over a whole portfolio, the alert list and aggregate risk score. It is
//! exposed to the host application via PyO3 (feature `python`).
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `status` - status normalization (the ingestion boundary) and presentation
//! - `passport` - tiered disclosure and signed export
//! - `actions` - call-to-action resolution and the login gate
//! - `risk` - alert tagging, priority, risk score, snapshots
//! - `storage` - record models, repository, demo seed, portfolio queries
//! - `sighting` - public sighting report intake
//! - `security` - free-text scanning and credentials
//! - `pipeline` - view-model assembly for passport pages and dashboards
//! - `logging` - structured logging with evaluation context

pub mod actions;
pub mod config;
pub mod error;
pub mod logging;
pub mod passport;
pub mod pipeline;
pub mod risk;
pub mod security;
pub mod sighting;
pub mod status;
pub mod storage;

/// Initialize the module-level logger. Safe to call repeatedly.
pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_millis()
        .try_init();
}

#[cfg(feature = "python")]
mod bindings {
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;
    use pyo3::types::PyDict;

    use crate::actions::{resolve_actions_logged, ViewerContext};
    use crate::config::EngineConfig;
    use crate::init_logger;
    use crate::logging::structured::LogContext;
    use crate::passport::disclosure::DisclosureEngine;
    use crate::passport::types::DisclosureTier;
    use crate::pipeline::context::EvaluationContext;
    use crate::pipeline::dashboard::build_dashboard;
    use crate::risk::snapshot::{PortfolioSnapshot, SnapshotStore};
    use crate::security::credentials::{self, Role};
    use crate::sighting::report::{self, SightingReport};
    use crate::status::{normalize_status as canonical_status, StatusBadge};
    use crate::storage::repository::{LayeredRepository, MachineRepository};

    fn value_error<E: std::fmt::Display>(e: E) -> PyErr {
        PyValueError::new_err(e.to_string())
    }

    fn load_config(config_json: Option<&str>) -> PyResult<EngineConfig> {
        match config_json {
            Some(json) => EngineConfig::from_json_str(json).map_err(value_error),
            None => Ok(EngineConfig::default()),
        }
    }

    /// Demo seed, replaced by `records_json` when given.
    fn load_repository(records_json: Option<&str>) -> PyResult<LayeredRepository> {
        let repo = LayeredRepository::with_demo_seed();
        if let Some(json) = records_json {
            repo.load_persisted_json(json).map_err(value_error)?;
        }
        Ok(repo)
    }

    fn to_json<T: serde::Serialize>(value: &T) -> PyResult<String> {
        serde_json::to_string(value).map_err(value_error)
    }

    /// Normalize a raw status string to its canonical token.
    #[pyfunction]
    #[pyo3(signature = (raw=None))]
    fn normalize_status(raw: Option<String>) -> String {
        canonical_status(raw.as_deref()).as_str().to_string()
    }

    /// Badge for a raw status: dict with `status`, `label` and `tone`.
    #[pyfunction]
    #[pyo3(signature = (raw=None))]
    fn status_badge(py: Python<'_>, raw: Option<String>) -> PyResult<Py<PyAny>> {
        let badge = StatusBadge::from(canonical_status(raw.as_deref()));

        let py_result = PyDict::new(py);
        py_result.set_item("status", badge.status.as_str())?;
        py_result.set_item("label", badge.label)?;
        py_result.set_item("tone", badge.tone.as_str())?;
        Ok(py_result.into())
    }

    /// Build a passport as JSON.
    ///
    /// # Arguments
    /// * `registry_id` - Registry id to look up
    /// * `tier` - "public" or "private"; the caller has already authorized private access
    /// * `records_json` - Optional persisted record set replacing the demo seed
    #[pyfunction]
    #[pyo3(signature = (registry_id, tier="public".to_string(), records_json=None, config_json=None))]
    fn build_passport(
        registry_id: String,
        tier: String,
        records_json: Option<String>,
        config_json: Option<String>,
    ) -> PyResult<String> {
        init_logger();

        let config = load_config(config_json.as_deref())?;
        let repo = load_repository(records_json.as_deref())?;
        let record = repo.find(&registry_id);
        let tier = DisclosureTier::parse(&tier);
        let ctx = LogContext::new("py")
            .with_registry(&registry_id)
            .with_tier(tier);

        let passport = DisclosureEngine::new(&config).build(&registry_id, record.as_ref(), tier, &ctx);
        to_json(&passport)
    }

    /// Resolve the action list for a status and viewer, as JSON.
    #[pyfunction]
    #[pyo3(signature = (registry_id, status, is_authenticated=false, role="guest".to_string(), tier="public".to_string(), case_id=None))]
    fn resolve_actions(
        registry_id: String,
        status: String,
        is_authenticated: bool,
        role: String,
        tier: String,
        case_id: Option<String>,
    ) -> PyResult<String> {
        init_logger();

        let viewer = ViewerContext {
            is_authenticated,
            role: Role::parse(&role),
            tier: DisclosureTier::parse(&tier),
        };
        let actions = resolve_actions_logged(
            &registry_id,
            canonical_status(Some(&status)),
            &viewer,
            case_id.as_deref(),
            &LogContext::new("py").with_registry(&registry_id),
        );
        to_json(&actions)
    }

    /// Evaluate a portfolio for the insurer dashboard, as JSON.
    ///
    /// # Arguments
    /// * `records_json` - Optional record set; the demo seed otherwise
    /// * `now` - RFC 3339 evaluation instant; current time if absent or invalid
    /// * `snapshot_json` - Previously saved snapshot to compute deltas against
    #[pyfunction]
    #[pyo3(signature = (records_json=None, now=None, snapshot_json=None, config_json=None))]
    fn evaluate_portfolio(
        records_json: Option<String>,
        now: Option<String>,
        snapshot_json: Option<String>,
        config_json: Option<String>,
    ) -> PyResult<String> {
        init_logger();

        let config = load_config(config_json.as_deref())?;
        let repo = load_repository(records_json.as_deref())?;
        let ctx = EvaluationContext::from_timestamp(
            now.as_deref(),
            ViewerContext::anonymous(),
            config,
        );

        let snapshots = SnapshotStore::new();
        if let Some(json) = snapshot_json {
            let snapshot: PortfolioSnapshot = serde_json::from_str(&json).map_err(value_error)?;
            snapshots.restore(snapshot);
        }

        let dashboard = build_dashboard(&ctx, &repo, &snapshots);
        to_json(&dashboard)
    }

    /// Accept a sighting report (JSON) and return the receipt as JSON.
    #[pyfunction]
    #[pyo3(signature = (report_json, now=None))]
    fn submit_sighting(report_json: String, now: Option<String>) -> PyResult<String> {
        init_logger();

        let sighting: SightingReport = serde_json::from_str(&report_json).map_err(value_error)?;
        let ctx = EvaluationContext::from_timestamp(
            now.as_deref(),
            ViewerContext::anonymous(),
            EngineConfig::default(),
        );

        let receipt = report::submit_sighting(sighting, ctx.now, &ctx.config, &ctx.log_context())
            .map_err(value_error)?;
        to_json(&receipt)
    }

    /// Hash a password for storage.
    #[pyfunction]
    #[pyo3(signature = (password, iterations=None))]
    fn hash_password(password: String, iterations: Option<u32>) -> String {
        let iterations = iterations.unwrap_or(EngineConfig::default().credential_iterations);
        credentials::hash_password(&password, iterations)
    }

    /// Check a password against a stored hash.
    #[pyfunction]
    fn verify_password(password: String, stored: String) -> PyResult<bool> {
        credentials::verify_password(&password, &stored).map_err(value_error)
    }

    /// Python module definition
    #[pymodule]
    fn equipregistry_core(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(normalize_status, m)?)?;
        m.add_function(wrap_pyfunction!(status_badge, m)?)?;
        m.add_function(wrap_pyfunction!(build_passport, m)?)?;
        m.add_function(wrap_pyfunction!(resolve_actions, m)?)?;
        m.add_function(wrap_pyfunction!(evaluate_portfolio, m)?)?;
        m.add_function(wrap_pyfunction!(submit_sighting, m)?)?;
        m.add_function(wrap_pyfunction!(hash_password, m)?)?;
        m.add_function(wrap_pyfunction!(verify_password, m)?)?;
        Ok(())
    }
}
