//! Structured observability hooks for the export lifecycle.
//!
//! Emission functions log at `info!` level with an `event` field suitable
//! for log aggregation. [`init_tracing`] configures the global subscriber;
//! set `RUST_LOG` for fine-grained filtering.

use tracing::{info, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

/// Initialise the global tracing subscriber.
///
/// * `json` — when `true`, emit newline-delimited JSON log lines.
/// * `level` — default verbosity when `RUST_LOG` is not set.
///
/// Safe to call multiple times; only the first call takes effect.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}

/// Emit event: export request accepted.
pub fn emit_export_started(version_id: Uuid, requested_by: &str, include_diff: bool) {
    info!(
        event = "export.started",
        version_id = %version_id,
        requested_by = %requested_by,
        include_diff = include_diff,
    );
}

/// Emit event: export bundle stored and record created.
pub fn emit_export_completed(
    export_id: Uuid,
    snapshot_hash_short: &str,
    file_size: u64,
    completeness_score: f64,
) {
    info!(
        event = "export.completed",
        export_id = %export_id,
        snapshot_hash = %snapshot_hash_short,
        file_size = file_size,
        completeness_score = completeness_score,
    );
}

/// Emit event: version moved between workflow states.
pub fn emit_version_transition(version_id: Uuid, from: &str, to: &str) {
    info!(
        event = "version.status_changed",
        version_id = %version_id,
        from = %from,
        to = %to,
    );
}
