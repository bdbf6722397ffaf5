//! File-backed ledger state.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use credibil_status::local::{LedgerState, LocalLedger};

/// Restore the ledger saved at `path`, or start an empty one.
pub fn load(path: &Path) -> Result<LocalLedger> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("no ledger at {}, starting empty", path.display());
            return Ok(LocalLedger::new());
        }
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };

    let state: LedgerState =
        serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))?;
    Ok(LocalLedger::from_state(state))
}

/// Save the ledger's confirmed state to `path`.
pub fn save(path: &Path, ledger: &LocalLedger) -> Result<()> {
    let state = ledger.state()?;
    let json = serde_json::to_string_pretty(&state)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}
