//! Structural self-checks for published mesh data.

use crate::mesh_error::MeshError;

/// Types whose structural invariants can be re-verified after construction.
pub trait DebugInvariants {
    /// Panic on the first violated invariant, but only in debug builds or when
    /// one of the invariant-checking features is enabled.
    fn debug_assert_invariants(&self);
    /// Re-check all invariants and return the first violation.
    fn validate_invariants(&self) -> Result<(), MeshError>;
}

/// Run a fallible invariant check and panic with `context` when it fails.
/// Compiles to nothing unless invariant checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($check:expr, $context:literal) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(err) = $check {
            panic!("[invariants] {}: {}", $context, err);
        }
    };
}
