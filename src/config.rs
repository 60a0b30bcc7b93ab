//! In-process configuration for the differencing engine.
//!
//! Loading these from a file or the environment is a caller concern (see
//! `DESIGN.md`'s note on why this crate stops at a plain struct); this type
//! only validates the combinations the engine itself cares about.

use crate::error::DiffError;

/// Parameters recognized by [`crate::differ::diff`] (§6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffConfig {
    /// Number of child segments per recursion level. Must be `>= 2` and
    /// `< bisection_threshold`.
    pub bisection_factor: usize,
    /// Row-count cutoff below which the leaf materialization path is used.
    pub bisection_threshold: u64,
    /// Whether fan-outs run concurrently.
    pub threaded: bool,
    /// Per-fan-out worker cap. `None` means the executor picks a bound
    /// equal to the fan-out width.
    pub max_pool_size: Option<usize>,
    /// Enables verbose diagnostics beyond the advisory warnings that are
    /// always emitted (slow checksum, sparse keys).
    pub debug: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        DiffConfig {
            bisection_factor: 32,
            bisection_threshold: 16_384,
            threaded: true,
            max_pool_size: None,
            debug: false,
        }
    }
}

impl DiffConfig {
    /// Validate `bisection_factor` / `bisection_threshold`, per §6/§7:
    /// `2 <= bisection_factor < bisection_threshold`.
    pub fn validate(&self) -> Result<(), DiffError> {
        if self.bisection_factor < 2 {
            return Err(DiffError::Configuration(
                "bisection_factor must be at least 2".into(),
            ));
        }
        if self.bisection_factor as u64 >= self.bisection_threshold {
            return Err(DiffError::Configuration(
                "bisection_factor must be lower than bisection_threshold".into(),
            ));
        }
        Ok(())
    }
}
