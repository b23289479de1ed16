//! Edge/velocity scoring.
//!
//! Every zone leaving the edge the cursor sits on is scored on the edge's
//! shared axis:
//!
//! | Situation                               | Score                       |
//! |-----------------------------------------|-----------------------------|
//! | cursor inside the target span           | containment (1000)          |
//! | cursor outside, `d` px from the span    | base − d (500 − d)          |
//! | moving fast towards the span's center   | + direction bonus (800)     |
//!
//! The best zone wins if it clears the acceptance threshold. Containment
//! normally wins, but a fast movement towards a neighbouring target can
//! overtake it.

use serde::Serialize;

use super::Tuning;
use super::topology::DisplayId;
use super::zones::{JumpZone, Topology};
use crate::geometry::{Edge, Point, Vector};

/// Score breakdown for one zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The zone being scored.
    pub zone: JumpZone,
    /// Containment or distance score.
    pub base: f64,
    /// Direction bonus, zero when not applied.
    pub bonus: f64,
    /// `base + bonus`.
    pub total: f64,
}

/// Where the cursor should land.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    /// Destination display.
    pub display: DisplayId,
    /// Edge of the source display that was crossed.
    pub edge: Edge,
    /// Landing point in global coordinates.
    pub point: Point,
    /// Winning score.
    pub score: f64,
}

fn score_zone(zone: &JumpZone, coordinate: f64, speed: f64, tuning: &Tuning) -> Candidate {
    let span = zone.target_span;
    let base = if span.contains(coordinate) {
        tuning.containment_score
    } else {
        tuning.base_score - span.distance_to(coordinate)
    };

    let center = span.center();
    let heading_there = (speed < 0.0 && center < coordinate) || (speed > 0.0 && center > coordinate);
    let bonus = if speed.abs() > tuning.direction_threshold && heading_there {
        tuning.direction_bonus
    } else {
        0.0
    };

    Candidate { zone: *zone, base, bonus, total: base + bonus }
}

/// Scores every zone leaving `edge` of `display_id`, in zone order.
#[must_use]
pub fn score_candidates(
    topology: &Topology,
    display_id: DisplayId,
    edge: Edge,
    position: Point,
    velocity: Vector,
    tuning: &Tuning,
) -> Vec<Candidate> {
    let axis = edge.shared_axis();
    let coordinate = position.along(axis);
    let speed = velocity.along(axis);

    topology
        .zones(display_id, edge)
        .iter()
        .map(|zone| score_zone(zone, coordinate, speed, tuning))
        .collect()
}

/// Picks the jump target for a cursor at `edge` of `display_id`.
///
/// Returns `None` when the edge has no zones or the best score is below the
/// acceptance threshold. The first zone to reach the best score wins.
#[must_use]
pub fn find_target(
    topology: &Topology,
    display_id: DisplayId,
    edge: Edge,
    position: Point,
    velocity: Vector,
    tuning: &Tuning,
) -> Option<Target> {
    let candidates = score_candidates(topology, display_id, edge, position, velocity, tuning);

    let mut best: Option<&Candidate> = None;
    for candidate in &candidates {
        if best.is_none_or(|b| candidate.total > b.total) {
            best = Some(candidate);
        }
    }
    let best = best?;

    if best.total < tuning.acceptance_threshold {
        tracing::trace!(
            display = display_id,
            %edge,
            score = best.total,
            "jump: best candidate below threshold"
        );
        return None;
    }

    let zone = &best.zone;
    let shared = edge.shared_axis();
    let along = zone.target_span.clamp_inset(position.along(shared), tuning.landing_inset);

    Some(Target {
        display: zone.target,
        edge,
        point: Point::from_axes(shared, along, zone.landing),
        score: best.total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::jump::topology::displays_from_rects;
    use crate::jump::zones::compute_zones;

    fn compile(frames: Vec<Rect>) -> Topology {
        compute_zones(displays_from_rects(frames), &Tuning::default())
    }

    /// A wide display with two half-height displays stacked to its right.
    fn split_right() -> Topology {
        compile(vec![
            Rect::new(0.0, 0.0, 1920.0, 1080.0),
            Rect::new(1920.0, 0.0, 1920.0, 540.0),
            Rect::new(1920.0, 570.0, 1920.0, 540.0),
        ])
    }

    #[test]
    fn test_containment_wins_at_rest() {
        let topology = split_right();
        let tuning = Tuning::default();
        let target =
            find_target(&topology, 1, Edge::Right, Point::new(1919.0, 300.0), Vector::ZERO, &tuning)
                .unwrap();
        assert_eq!(target.display, 2);
        assert_eq!(target.score, 1000.0);
        assert_eq!(target.point, Point::new(1930.0, 300.0));
    }

    #[test]
    fn test_direction_overrides_containment() {
        let topology = split_right();
        let tuning = Tuning::default();
        let position = Point::new(1919.0, 520.0);
        let velocity = Vector::new(5.0, 20.0);

        let candidates = score_candidates(&topology, 1, Edge::Right, position, velocity, &tuning);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].total, 1000.0);
        assert_eq!(candidates[1].base, 450.0);
        assert_eq!(candidates[1].bonus, 800.0);
        assert_eq!(candidates[1].total, 1250.0);

        let target = find_target(&topology, 1, Edge::Right, position, velocity, &tuning).unwrap();
        assert_eq!(target.display, 3);
        assert_eq!(target.score, 1250.0);
        // Clamped to the top inset of the lower display
        assert_eq!(target.point, Point::new(1930.0, 580.0));
    }

    #[test]
    fn test_direction_threshold_is_strict() {
        let topology = split_right();
        let tuning = Tuning::default();
        let candidates = score_candidates(
            &topology,
            1,
            Edge::Right,
            Point::new(1919.0, 520.0),
            Vector::new(0.0, 10.0),
            &tuning,
        );
        assert_eq!(candidates[1].bonus, 0.0);
    }

    #[test]
    fn test_far_target_is_rejected() {
        let topology = compile(vec![
            Rect::new(0.0, 0.0, 1920.0, 1080.0),
            Rect::new(1920.0, 0.0, 1920.0, 400.0),
        ]);
        let tuning = Tuning::default();
        let candidates = score_candidates(
            &topology,
            1,
            Edge::Right,
            Point::new(1919.0, 800.0),
            Vector::ZERO,
            &tuning,
        );
        assert_eq!(candidates[0].total, 100.0);
        assert!(
            find_target(&topology, 1, Edge::Right, Point::new(1919.0, 800.0), Vector::ZERO, &tuning)
                .is_none()
        );
    }

    #[test]
    fn test_no_zones_means_no_target() {
        let topology = compile(vec![Rect::new(0.0, 0.0, 1920.0, 1080.0)]);
        let tuning = Tuning::default();
        for edge in Edge::ALL {
            assert!(
                find_target(&topology, 1, edge, Point::new(0.0, 0.0), Vector::new(-30.0, 0.0), &tuning)
                    .is_none()
            );
        }
    }

    #[test]
    fn test_first_zone_wins_ties() {
        // Both targets are 100px away from y = 1000
        let topology = compile(vec![
            Rect::new(0.0, 0.0, 1920.0, 2000.0),
            Rect::new(1920.0, 0.0, 1920.0, 900.0),
            Rect::new(1920.0, 1100.0, 1920.0, 900.0),
        ]);
        let target = find_target(
            &topology,
            1,
            Edge::Right,
            Point::new(1919.0, 1000.0),
            Vector::ZERO,
            &Tuning::default(),
        )
        .unwrap();
        assert_eq!(target.display, 2);
        assert_eq!(target.score, 400.0);
        assert_eq!(target.point, Point::new(1930.0, 890.0));
    }

    #[test]
    fn test_landing_on_top_edge() {
        let topology = compile(vec![
            Rect::new(0.0, 1080.0, 1920.0, 1080.0),
            Rect::new(0.0, 0.0, 2560.0, 1080.0),
        ]);
        let target = find_target(
            &topology,
            1,
            Edge::Top,
            Point::new(5.0, 1080.0),
            Vector::new(0.0, -12.0),
            &Tuning::default(),
        )
        .unwrap();
        assert_eq!(target.display, 2);
        assert_eq!(target.point, Point::new(10.0, 1070.0));
    }
}
