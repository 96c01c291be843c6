//! Primitives shared by both solvers: canonical ordering and the fixed
//! tolerance discipline named in the spec's design notes as a single,
//! never-duplicated constant.

pub mod prelude {
    pub use super::index::CanonicalIndex;
    pub use super::verify::{approx_eq, ge_neg_eps, le_eps, tight, EPSILON};
    pub use super::CoreError;
}

pub mod index;
pub mod verify;

/// The only error variants that produce a nonzero exit and no output
/// document. Structural unsolvability and constraint infeasibility are
/// *not* errors, they are well-formed `Infeasible` output documents.
#[derive(Debug)]
pub enum CoreError {
    /// The input document violated the wire schema or a structural
    /// invariant (unknown reference, negative quantity, `hi < lo`, ...).
    Malformed(anyhow::Error),
    /// The LP or max-flow engine returned a non-terminal status.
    NumericFailure(anyhow::Error),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreError::Malformed(err) => write!(f, "malformed input: {err}"),
            CoreError::NumericFailure(err) => write!(f, "solver numerical failure: {err}"),
        }
    }
}

impl std::error::Error for CoreError {}
