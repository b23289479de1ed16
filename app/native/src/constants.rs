//! Default tuning constants for the edge-jump and window-fill subsystems.
//!
//! These are the values the configuration falls back to. The scoring
//! constants were calibrated by hand against real monitor arrangements; the
//! relative sizes matter more than the absolute values, so change them
//! together.
//!
//! # Organization
//!
//! - `timing` - Poll interval, cooldown and settle delays
//! - `geometry` - Pixel distances used to detect edges and build zones
//! - `scoring` - Weights used to rank candidate zones

/// Timing constants.
pub mod timing {
    /// Interval between cursor samples (ms).
    pub const POLL_INTERVAL_MS: u64 = 20;

    /// Minimum time between two jumps (ms).
    ///
    /// A warp usually lands a few pixels from another edge; without this the
    /// next sample could bounce the cursor straight back.
    pub const JUMP_COOLDOWN_MS: u64 = 50;

    /// Delay between a window changing display and the fill resize (ms).
    ///
    /// Lets move animations and the user's drag finish first.
    pub const FILL_SETTLE_DELAY_MS: u64 = 300;

    /// Interval between scans for newly launched applications to observe (ms).
    pub const APP_RESCAN_INTERVAL_MS: u64 = 2000;
}

/// Pixel distances.
pub mod geometry {
    /// Distance from a display edge at which the cursor counts as "at" the edge.
    pub const EDGE_THRESHOLD_PX: f64 = 3.0;

    /// Slack allowed when deciding that a display lies beyond another's edge.
    pub const ADJACENCY_TOLERANCE_PX: f64 = 10.0;

    /// Widening applied to a target's span when computing the source-side range.
    pub const ZONE_MARGIN_PX: f64 = 100.0;

    /// Distance a landing point is pushed inside the target display.
    pub const LANDING_INSET_PX: f64 = 10.0;
}

/// Candidate scoring weights.
pub mod scoring {
    /// Score for a zone whose target span already contains the cursor.
    pub const CONTAINMENT_SCORE: f64 = 1000.0;

    /// Starting score for a zone that misses; the miss distance is subtracted.
    pub const BASE_SCORE: f64 = 500.0;

    /// Velocity (px/tick) on the shared axis above which direction counts.
    pub const DIRECTION_THRESHOLD: f64 = 10.0;

    /// Bonus for a zone lying in the direction the cursor is moving.
    pub const DIRECTION_BONUS: f64 = 800.0;

    /// Minimum winning score for a jump to happen.
    pub const ACCEPTANCE_THRESHOLD: f64 = 200.0;
}

// ============================================================================
// Tests
// ============================================================================
