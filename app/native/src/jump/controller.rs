//! Poll-driven cursor controller.
//!
//! The controller owns the compiled [`Topology`] and the per-tick
//! [`CursorState`]. It is driven by the service's poll timer; each call to
//! [`CursorController::tick`] samples the cursor once and warps it at most
//! once.

use serde::Serialize;

use super::Tuning;
use super::scorer::{Target, find_target};
use super::topology::{DisplayId, build_topology};
use super::zones::{Topology, compute_zones};
use crate::geometry::{Edge, Point, Vector};
use crate::host::{Clock, CursorDevice, DisplayProvider, HostError};

/// Mutable state carried between ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CursorState {
    /// Position seen on the previous tick, or the landing point after a jump.
    pub last_position: Option<Point>,
    /// Clock reading of the most recent jump.
    pub last_jump: Option<f64>,
    /// Number of ticks processed.
    pub ticks: u64,
}

/// Result of evaluating a cursor sample against the topology.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Decision {
    /// No display to resolve the cursor against.
    NoDisplay,
    /// The cursor is on a display but not near any edge.
    Inside { display: DisplayId },
    /// The cursor is at an edge with no acceptable target.
    AtEdge { display: DisplayId, edge: Edge },
    /// The cursor should be warped.
    Jump { display: DisplayId, target: Target },
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Nothing to do.
    Idle,
    /// A jump happened too recently; scoring was skipped.
    CoolingDown,
    /// At an edge but no zone was good enough.
    AtEdge(Edge),
    /// The cursor was warped.
    Jumped(Target),
}

/// Drives edge jumps for one topology at a time.
#[derive(Debug, Clone)]
pub struct CursorController {
    topology: Topology,
    state: CursorState,
    tuning: Tuning,
}

impl CursorController {
    /// Creates a controller over an already compiled topology.
    #[must_use]
    pub fn new(topology: Topology, tuning: Tuning) -> Self {
        Self { topology, state: CursorState::default(), tuning }
    }

    /// Creates a controller from the host's current displays.
    pub fn from_host<P: DisplayProvider + ?Sized>(host: &P, tuning: Tuning) -> Self {
        Self::new(compute_zones(build_topology(host), &tuning), tuning)
    }

    /// Recomputes the topology from the host.
    ///
    /// The cooldown and last position survive the rebuild.
    pub fn rebuild<P: DisplayProvider + ?Sized>(&mut self, host: &P) {
        self.topology = compute_zones(build_topology(host), &self.tuning);
        tracing::info!(
            displays = self.topology.displays().len(),
            zones = self.topology.zone_count(),
            "jump: topology rebuilt"
        );
    }

    #[must_use]
    pub const fn topology(&self) -> &Topology { &self.topology }

    #[must_use]
    pub const fn state(&self) -> &CursorState { &self.state }

    #[must_use]
    pub const fn tuning(&self) -> &Tuning { &self.tuning }

    /// Decides what to do with a cursor sample, without touching any state.
    #[must_use]
    pub fn evaluate(&self, position: Point, velocity: Vector) -> Decision {
        let Some(display) = self.topology.resolve_display(position) else {
            return Decision::NoDisplay;
        };

        let Some(edge) = Edge::detect(&display.frame, position, self.tuning.edge_threshold) else {
            return Decision::Inside { display: display.id };
        };

        match find_target(&self.topology, display.id, edge, position, velocity, &self.tuning) {
            Some(target) => Decision::Jump { display: display.id, target },
            None => Decision::AtEdge { display: display.id, edge },
        }
    }

    fn cooling_down(&self, now: f64) -> bool {
        self.state.last_jump.is_some_and(|at| now - at < self.tuning.cooldown_secs)
    }

    /// Runs one poll step.
    ///
    /// # Errors
    ///
    /// Returns the host error if the cursor cannot be read or warped. A failed
    /// read leaves the state untouched; a failed warp records neither the jump
    /// nor the position.
    pub fn tick<H>(&mut self, host: &H) -> Result<TickOutcome, HostError>
    where
        H: CursorDevice + Clock + ?Sized,
    {
        let position = host.cursor_position()?;
        let velocity = self.state.last_position.map_or(Vector::ZERO, |last| position.delta_from(last));
        self.state.ticks += 1;

        let now = host.now_seconds();
        if self.cooling_down(now) {
            self.state.last_position = Some(position);
            return Ok(TickOutcome::CoolingDown);
        }

        match self.evaluate(position, velocity) {
            Decision::Jump { display: source_id, target } => {
                host.warp_cursor(target.point)?;
                tracing::debug!(
                    from = source_id,
                    to = target.display,
                    edge = %target.edge,
                    %position,
                    landing = %target.point,
                    score = target.score,
                    "jump: warped cursor"
                );
                self.state.last_jump = Some(now);
                self.state.last_position = Some(target.point);
                Ok(TickOutcome::Jumped(target))
            }
            Decision::AtEdge { edge, .. } => {
                self.state.last_position = Some(position);
                Ok(TickOutcome::AtEdge(edge))
            }
            Decision::Inside { .. } | Decision::NoDisplay => {
                self.state.last_position = Some(position);
                Ok(TickOutcome::Idle)
            }
        }
    }
}
