//! Cursor edge jumping between displays.
//!
//! When the cursor reaches the edge of a display, it is warped onto the
//! neighbouring display that best matches where it is and where it is heading.
//! This smooths over monitors whose edges don't line up, have different
//! heights, or sit with a gap between them.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐   displays   ┌────────────────────┐
//! │ topology           │ ───────────▶ │ zones              │
//! │ build_topology()   │              │ compute_zones()    │
//! └────────────────────┘              └─────────┬──────────┘
//!                                               │ Topology
//!                                               ▼
//! ┌────────────────────┐  sample     ┌────────────────────┐
//! │ controller         │ ──────────▶ │ scorer             │
//! │ CursorController   │ ◀────────── │ find_target()      │
//! └────────────────────┘  Target     └────────────────────┘
//! ```
//!
//! The topology is rebuilt wholesale on every display change; zones are never
//! patched in place.

pub mod controller;
pub mod scorer;
pub mod topology;
pub mod zones;

pub use controller::{CursorController, CursorState, Decision, TickOutcome};
pub use scorer::{Candidate, Target, find_target, score_candidates};
pub use topology::{Display, DisplayId, build_topology, displays_from_rects};
pub use zones::{EdgeZones, JumpZone, Topology, ZoneList, compute_zones};

use std::time::Duration;

use crate::config::CursorConfig;
use crate::constants::{geometry, scoring, timing};

/// Resolved tuning values for zone compilation, scoring and the controller.
///
/// Built from [`CursorConfig`]; the defaults are the values in
/// [`crate::constants`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    /// Distance from an edge at which the cursor counts as at the edge (px).
    pub edge_threshold: f64,
    /// Slack when testing whether a display lies beyond an edge (px).
    pub adjacency_tolerance: f64,
    /// Widening of the target span for the source-side range (px).
    pub zone_margin: f64,
    /// Distance a landing point is pushed inside the target (px).
    pub landing_inset: f64,
    /// Shared-axis speed above which direction counts (px/tick).
    pub direction_threshold: f64,
    /// Bonus for zones in the direction of travel.
    pub direction_bonus: f64,
    /// Score for a zone whose target span contains the cursor.
    pub containment_score: f64,
    /// Starting score for a miss, before the distance is subtracted.
    pub base_score: f64,
    /// Minimum winning score.
    pub acceptance_threshold: f64,
    /// Minimum time between jumps (seconds).
    pub cooldown_secs: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            edge_threshold: geometry::EDGE_THRESHOLD_PX,
            adjacency_tolerance: geometry::ADJACENCY_TOLERANCE_PX,
            zone_margin: geometry::ZONE_MARGIN_PX,
            landing_inset: geometry::LANDING_INSET_PX,
            direction_threshold: scoring::DIRECTION_THRESHOLD,
            direction_bonus: scoring::DIRECTION_BONUS,
            containment_score: scoring::CONTAINMENT_SCORE,
            base_score: scoring::BASE_SCORE,
            acceptance_threshold: scoring::ACCEPTANCE_THRESHOLD,
            cooldown_secs: Duration::from_millis(timing::JUMP_COOLDOWN_MS).as_secs_f64(),
        }
    }
}

impl From<&CursorConfig> for Tuning {
    fn from(config: &CursorConfig) -> Self {
        Self {
            edge_threshold: config.edge_threshold,
            adjacency_tolerance: config.adjacency_tolerance,
            zone_margin: config.zone_margin,
            landing_inset: config.landing_inset,
            direction_threshold: config.direction_threshold,
            direction_bonus: config.direction_bonus,
            containment_score: config.containment_score,
            base_score: config.base_score,
            acceptance_threshold: config.acceptance_threshold,
            cooldown_secs: Duration::from_millis(config.cooldown_ms).as_secs_f64(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning_matches_default_config() {
        let from_config = Tuning::from(&CursorConfig::default());
        assert_eq!(from_config, Tuning::default());
    }

    #[test]
    fn test_cooldown_is_in_seconds() {
        let config = CursorConfig { cooldown_ms: 250, ..Default::default() };
        let tuning = Tuning::from(&config);
        assert!((tuning.cooldown_secs - 0.25).abs() < f64::EPSILON);
    }
}
