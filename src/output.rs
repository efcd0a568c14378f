//! Quiet mode for the catalog CLI.
//!
//! `MLCATALOG_QUIET` silences progress chatter: the setup banner, seed phase
//! lines, per-table load reports and success/status lines. Report tables,
//! section titles, JSON documents, warnings and errors are always printed,
//! so scripted `report` runs keep their data.

use std::sync::OnceLock;

pub const QUIET_VAR: &str = "MLCATALOG_QUIET";

static QUIET: OnceLock<bool> = OnceLock::new();

/// Whether a `MLCATALOG_QUIET` value turns quiet mode on
pub fn quiet_requested(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

/// Read once per process; later changes to the variable are ignored
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var(QUIET_VAR)
            .map(|v| quiet_requested(&v))
            .unwrap_or(false)
    })
}
