//! Similarity scoring: raw distance in, bounded score out.
//!
//! Search ranks by raw squared-L2 distance; the scorer only converts that
//! distance into a presentable similarity in `[0, 1]` (higher is more
//! similar) using `1 - min(distance / scale, 1)`.
//!
//! The `scale` is configuration, not a constant, because the right value
//! depends on the embedding space: a model producing unit-normalized
//! vectors tops out near distance 2.0, while unnormalized spaces can run
//! into the thousands. The default of [`DEFAULT_SCALE`] suits the
//! unnormalized 768-dimension space this store was first used with.
//!
//! [`ScoringMode::Adaptive`] instead derives the scale from the largest
//! distance in each result set, so the furthest hit scores near 0.0 and
//! the closest near 1.0. A search uses exactly one mode; the two are
//! never mixed within one result set.

use serde::{Deserialize, Serialize};

/// Default divisor for [`ScoringMode::Fixed`].
pub const DEFAULT_SCALE: f32 = 100.0;

/// How the scorer picks the normalization scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScoringMode {
    /// A configured divisor, the same for every search.
    Fixed {
        /// The distance at which similarity bottoms out at 0.0.
        scale: f32,
    },
    /// Scale to the maximum distance observed in each result set.
    Adaptive,
}

impl Default for ScoringMode {
    fn default() -> Self {
        Self::Fixed {
            scale: DEFAULT_SCALE,
        }
    }
}

/// Converts raw distances into `[0, 1]` similarity scores.
#[derive(Debug, Clone, Copy)]
pub struct SimilarityScorer {
    mode: ScoringMode,
}

impl SimilarityScorer {
    /// Build a scorer for the given mode.
    pub fn new(mode: ScoringMode) -> Self {
        Self { mode }
    }

    /// The mode this scorer runs in.
    pub fn mode(&self) -> ScoringMode {
        self.mode
    }

    /// Score a whole result set's distances at once.
    ///
    /// Batch scoring keeps adaptive mode honest: the scale is resolved
    /// once per set, from the maximum distance in it, never per-element.
    /// Output order matches input order.
    pub fn score_batch(&self, distances: &[f32]) -> Vec<f32> {
        let scale = match self.mode {
            ScoringMode::Fixed { scale } => scale,
            ScoringMode::Adaptive => distances.iter().copied().fold(0.0_f32, f32::max),
        };
        distances.iter().map(|&d| score(d, scale)).collect()
    }
}

/// `1 - min(distance / scale, 1)`, clamped to `[0, 1]`.
///
/// A non-positive scale is degenerate (an all-exact-match adaptive set, or
/// a nonsensical config): an exact match still scores 1.0, anything else
/// bottoms out at 0.0.
#[inline]
fn score(distance: f32, scale: f32) -> f32 {
    if scale <= 0.0 {
        return if distance <= 0.0 { 1.0 } else { 0.0 };
    }
    (1.0 - (distance / scale).min(1.0)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_mode_applies_configured_scale() {
        let scorer = SimilarityScorer::new(ScoringMode::Fixed { scale: 100.0 });
        let scores = scorer.score_batch(&[0.0, 25.0, 50.0, 100.0, 250.0]);
        assert_eq!(scores, vec![1.0, 0.75, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn exact_match_scores_one() {
        let scorer = SimilarityScorer::new(ScoringMode::default());
        assert_eq!(scorer.score_batch(&[0.0]), vec![1.0]);
    }

    #[test]
    fn adaptive_mode_scales_to_furthest_hit() {
        let scorer = SimilarityScorer::new(ScoringMode::Adaptive);
        let scores = scorer.score_batch(&[0.0, 10.0, 40.0]);
        assert_eq!(scores[0], 1.0);
        assert_eq!(scores[1], 0.75);
        assert_eq!(scores[2], 0.0);
    }

    #[test]
    fn adaptive_all_exact_matches() {
        let scorer = SimilarityScorer::new(ScoringMode::Adaptive);
        // Max distance is 0.0; every hit is an exact match.
        assert_eq!(scorer.score_batch(&[0.0, 0.0]), vec![1.0, 1.0]);
    }

    #[test]
    fn scores_never_leave_unit_interval() {
        let scorer = SimilarityScorer::new(ScoringMode::Fixed { scale: 10.0 });
        for s in scorer.score_batch(&[0.0, 5.0, 10.0, 1e9]) {
            assert!((0.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn empty_batch_is_fine() {
        let scorer = SimilarityScorer::new(ScoringMode::Adaptive);
        assert!(scorer.score_batch(&[]).is_empty());
    }
}
