//! Personality-weighted candidate scoring.

use skyhop_core::{Flight, Personality, SECS_PER_HOUR};

/// Weight tuple applied to the four scoring terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersonalityWeights {
    pub novelty: f64,
    pub shortness: f64,
    pub longness: f64,
    pub jitter: f64,
}

impl PersonalityWeights {
    pub const CHAOTIC: Self = Self {
        novelty: 0.8,
        shortness: 0.1,
        longness: 0.1,
        jitter: 0.25,
    };
    pub const BUDGET: Self = Self {
        novelty: 0.5,
        shortness: 0.6,
        longness: 0.0,
        jitter: 0.08,
    };
    pub const SCENIC: Self = Self {
        novelty: 0.5,
        shortness: 0.0,
        longness: 0.7,
        jitter: 0.08,
    };
    pub const BALANCED: Self = Self {
        novelty: 0.6,
        shortness: 0.2,
        longness: 0.2,
        jitter: 0.1,
    };

    pub fn for_personality(personality: Personality) -> Self {
        match personality {
            Personality::Chaotic => Self::CHAOTIC,
            Personality::Budget => Self::BUDGET,
            Personality::Scenic => Self::SCENIC,
            Personality::Balanced => Self::BALANCED,
        }
    }
}

impl From<Personality> for PersonalityWeights {
    fn from(personality: Personality) -> Self {
        Self::for_personality(personality)
    }
}

/// +1 for a destination outside the recency buffer, -0.5 otherwise.
pub fn novelty_term(novel: bool) -> f64 {
    if novel {
        1.0
    } else {
        -0.5
    }
}

/// Decays from 1 with a two-hour scale.
pub fn shortness_term(duration_secs: i64) -> f64 {
    let hours = duration_secs.max(0) as f64 / SECS_PER_HOUR as f64;
    (-hours / 2.0).exp()
}

/// Climbs linearly to 1 at six hours, then saturates.
pub fn longness_term(duration_secs: i64) -> f64 {
    let hours = duration_secs.max(0) as f64 / SECS_PER_HOUR as f64;
    (hours / 6.0).min(1.0)
}

/// Weighted sum of the four terms. `jitter` is the raw random sample.
pub fn score_flight(
    weights: &PersonalityWeights,
    novel: bool,
    duration_secs: i64,
    jitter: f64,
) -> f64 {
    weights.novelty * novelty_term(novel)
        + weights.shortness * shortness_term(duration_secs)
        + weights.longness * longness_term(duration_secs)
        + weights.jitter * jitter
}

/// A candidate with its score.
#[derive(Debug, Clone)]
pub struct ScoredFlight {
    pub flight: Flight,
    pub score: f64,
}

/// Sort by score descending. The sort is stable, so equal scores keep their fetch order.
pub fn rank(scored: &mut [ScoredFlight]) {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
}
