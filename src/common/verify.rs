//! The single named tolerance constant, passed explicitly to every
//! comparison rather than left to drift per module (spec design notes).

/// Fixed tolerance used by every feasibility check, slack computation and
/// bottleneck classification in both solvers.
pub const EPSILON: f64 = 1e-9;

/// `a == b` within `EPSILON`.
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}

/// `a <= b` within `EPSILON`, i.e. `a` is allowed to overshoot `b` by at
/// most the tolerance. Used for every `<=` capacity/bound check.
pub fn le_eps(a: f64, b: f64) -> bool {
    a <= b + EPSILON
}

/// `a >= -EPSILON`, used for the non-negativity invariant on decision
/// variables (`x_r >= -eps`, `f(e) >= lo(e) - eps`, ...).
pub fn ge_neg_eps(a: f64) -> bool {
    a >= -EPSILON
}

/// Whether a constraint with the given slack (`rhs - usage`, always
/// evaluated so that 0 means exactly binding) is tight at the optimum,
/// scaled by the magnitude of its right-hand side as the spec requires
/// (`slack <= EPSILON * max(1, |rhs|)`).
pub fn tight(slack: f64, rhs: f64) -> bool {
    slack <= EPSILON * rhs.abs().max(1.0)
}
