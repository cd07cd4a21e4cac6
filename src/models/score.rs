//! Go-Now score model and ranked search results

use super::{TimeBlock, VenueRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Highest possible Go-Now score
pub const MAX_SCORE: u8 = 10;

/// Tri-state recommendation derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// score >= 7
    Go,
    /// 4 <= score < 7
    Caution,
    /// score < 4
    Avoid,
}

impl Status {
    /// Map a score to its status. Monotone: a higher score never yields a
    /// worse status.
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        match score {
            7.. => Status::Go,
            4..=6 => Status::Caution,
            _ => Status::Avoid,
        }
    }

    #[must_use]
    pub fn headline(self) -> &'static str {
        match self {
            Status::Go => "Go now!",
            Status::Caution => "Go with care.",
            Status::Avoid => "Best to skip it for now.",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Go => "Go",
            Status::Caution => "Caution",
            Status::Avoid => "Avoid",
        };
        f.write_str(label)
    }
}

/// Scoring factors, in priority order. Ties between equal penalties go to
/// the factor declared first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Uv,
    Heat,
    Cold,
    Wind,
    RainOrStorm,
    HotMetal,
}

/// One nonzero deduction from the baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Penalty {
    pub factor: Factor,
    pub points: u8,
}

/// A better time later today
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternateWindow {
    pub time_block: TimeBlock,
    pub score: u8,
    pub status: Status,
    pub message: String,
}

/// Explainable suitability verdict for one venue under one set of conditions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoNowScore {
    /// 0..=10
    pub score: u8,
    pub status: Status,
    pub message: String,
    /// At most three, highest priority first
    pub tips: Vec<String>,
    /// Applied penalties in priority order
    pub penalties: Vec<Penalty>,
    /// Factor with the largest single penalty
    pub leading_factor: Option<Factor>,
    /// Present only when a later time block strictly beats `score`
    pub alternate: Option<AlternateWindow>,
}

impl GoNowScore {
    /// Attach a suggested alternate window; ignored unless it strictly improves
    #[must_use]
    pub fn with_alternate(mut self, time_block: TimeBlock, later: &GoNowScore) -> Self {
        if later.score > self.score {
            self.alternate = Some(AlternateWindow {
                time_block,
                score: later.score,
                status: later.status,
                message: format!(
                    "Conditions look better this {time_block} ({}/{MAX_SCORE}).",
                    later.score
                ),
            });
        }
        self
    }

    #[must_use]
    pub fn total_penalty(&self) -> u32 {
        self.penalties.iter().map(|p| u32::from(p.points)).sum()
    }
}

/// A catalog venue ranked for one search
#[derive(Debug, Clone, Serialize)]
pub struct VenueWithScore {
    pub venue: Arc<VenueRecord>,
    pub distance_km: f64,
    pub go_now: GoNowScore,
}
