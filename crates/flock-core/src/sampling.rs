//! Small shared sampling primitives for the KMC engine.
//!
//! Every stochastic decision in the engine reduces to one of two draws:
//! a unit draw on the half-open interval `(0, 1]`, and a cumulative walk
//! of that draw along a weight sequence. Both live here so each policy
//! advances the shared RNG stream exactly once per logical draw.

use rand::Rng;

/// Draw a uniform real in `(0, 1]`.
///
/// The upper bound must be inclusive and the lower bound exclusive so a
/// cumulative walk over weights that sum to 1.0 can always land, and so
/// `-ln(u)` stays finite for KMC waiting times.
pub(crate) fn unit_draw_not0(rng: &mut impl Rng) -> f64 {
    1.0 - rng.random::<f64>()
}

/// Walk `weights` with an already-drawn value, returning the landing index.
///
/// The draw is interpreted against the raw weight sequence (no
/// normalization); callers that need normalized weights scale them first.
/// Returns `None` when the walk exhausts the sequence, which happens when
/// the draw exceeds the total weight or floating-point residue starves
/// the final step. Callers treat `None` as a retryable non-event.
pub(crate) fn cumulative_walk(weights: &[f64], mut draw: f64) -> Option<usize> {
    for (index, weight) in weights.iter().enumerate() {
        if draw <= *weight {
            return Some(index);
        }
        draw -= weight;
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
