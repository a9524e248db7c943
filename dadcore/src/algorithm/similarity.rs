use std::cmp::Reverse;

use nalgebra::DVector;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Similarity threshold used for compound identification unless the caller overrides it.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.999;

/// Name assigned to peaks that match no reference spectrum.
pub const UNKNOWN_COMPOUND: &str = "Unknown";

/// Scale a profile to unit Euclidean norm; all-zero profiles are returned unchanged.
pub fn normalize_profile(profile: &[f64]) -> DVector<f64> {
    let v = DVector::from_column_slice(profile);
    let norm = v.norm();
    if norm > 0.0 { v / norm } else { v }
}

/// Spectral similarity of two wavelength profiles.
///
/// Both profiles are normalized to unit norm, then compared by Pearson
/// correlation, so pure amplitude differences do not lower the score.
///
/// Arguments:
///
/// * `a` - first profile
/// * `b` - second profile
///
/// Returns:
///
/// * `f64` - correlation in [-1, 1]; 0.0 if the lengths differ, fewer than two
///   channels are given, or either profile is flat
///
/// # Examples
///
/// ```
/// use dadcore::algorithm::similarity::spectral_similarity;
///
/// let s = spectral_similarity(&[1.0, 2.0, 3.0], &[10.0, 20.0, 30.0]);
/// assert!((s - 1.0).abs() < 1e-12);
/// ```
pub fn spectral_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.len() < 2 {
        return 0.0;
    }
    let a = normalize_profile(a);
    let b = normalize_profile(b);

    let a_centered = a.add_scalar(-a.mean());
    let b_centered = b.add_scalar(-b.mean());
    let denom = a_centered.norm() * b_centered.norm();
    if denom <= f64::EPSILON * f64::EPSILON {
        return 0.0;
    }
    (a_centered.dot(&b_centered) / denom).clamp(-1.0, 1.0)
}

/// A reference spectrum that scored at or above the identification threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompoundMatch {
    pub name: String,
    pub similarity: f64,
}

/// Score every candidate fingerprint against `query` and keep those reaching `threshold`.
///
/// The result is sorted best first; candidates with equal scores keep their input order.
pub fn rank_matches<'n, I>(query: &[f64], candidates: I, threshold: f64) -> Vec<CompoundMatch>
where
    I: IntoIterator<Item = (&'n str, &'n [f64])>,
{
    let mut matches: Vec<CompoundMatch> = candidates
        .into_iter()
        .map(|(name, fingerprint)| CompoundMatch {
            name: name.to_string(),
            similarity: spectral_similarity(query, fingerprint),
        })
        .filter(|m| m.similarity >= threshold)
        .collect();

    // stable sort, ties stay in insertion order
    matches.sort_by_key(|m| Reverse(OrderedFloat(m.similarity)));
    matches
}

/// Best-scoring candidate at or above `threshold`, if any.
pub fn best_match<'n, I>(query: &[f64], candidates: I, threshold: f64) -> Option<CompoundMatch>
where
    I: IntoIterator<Item = (&'n str, &'n [f64])>,
{
    rank_matches(query, candidates, threshold).into_iter().next()
}
