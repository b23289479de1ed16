//! Jump zone compilation.
//!
//! For each display and each of its edges, every other display lying beyond
//! that edge becomes a [`JumpZone`]. Zones are compiled once per display
//! configuration and looked up on every tick, so lookups are a `BTreeMap`
//! probe followed by an inline `SmallVec` scan.

use std::collections::BTreeMap;

use serde::Serialize;
use smallvec::SmallVec;

use super::Tuning;
use super::topology::{Display, DisplayId, locate, nearest};
use crate::geometry::{Edge, Point, Span};

/// Zones leaving one edge. Most edges have at most a couple of neighbours.
pub type ZoneList = SmallVec<[JumpZone; 4]>;

/// A directed crossing from one display edge onto a neighbouring display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JumpZone {
    /// Display the cursor leaves.
    pub source: DisplayId,
    /// Edge of the source display.
    pub edge: Edge,
    /// Display the cursor lands on.
    pub target: DisplayId,
    /// Range on the shared axis, on the source side. May be empty.
    pub source_span: Span,
    /// Valid range on the shared axis, on the target side.
    pub target_span: Span,
    /// Perpendicular coordinate to land on, inset into the target.
    pub landing: f64,
}

/// Zones for the four edges of one display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EdgeZones {
    pub left: ZoneList,
    pub right: ZoneList,
    pub top: ZoneList,
    pub bottom: ZoneList,
}

impl EdgeZones {
    /// Returns the zones leaving `edge`.
    #[must_use]
    pub fn get(&self, edge: Edge) -> &[JumpZone] {
        match edge {
            Edge::Left => &self.left,
            Edge::Right => &self.right,
            Edge::Top => &self.top,
            Edge::Bottom => &self.bottom,
        }
    }

    fn get_mut(&mut self, edge: Edge) -> &mut ZoneList {
        match edge {
            Edge::Left => &mut self.left,
            Edge::Right => &mut self.right,
            Edge::Top => &mut self.top,
            Edge::Bottom => &mut self.bottom,
        }
    }

    /// Total number of zones across all edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.left.len() + self.right.len() + self.top.len() + self.bottom.len()
    }

    /// Returns `true` if no edge has a zone.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Iterates over every zone, edge by edge in [`Edge::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = &JumpZone> {
        Edge::ALL.into_iter().flat_map(move |edge| self.get(edge).iter())
    }
}

/// A display snapshot together with its compiled zones.
///
/// Replaced as a whole on every display change.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Topology {
    displays: Vec<Display>,
    zones: BTreeMap<DisplayId, EdgeZones>,
}

impl Topology {
    /// Displays in host order.
    #[must_use]
    pub fn displays(&self) -> &[Display] { &self.displays }

    /// Looks up a display by id.
    #[must_use]
    pub fn display(&self, id: DisplayId) -> Option<&Display> {
        self.displays.iter().find(|d| d.id == id)
    }

    /// Returns the display whose frame contains `point` (half-open).
    #[must_use]
    pub fn display_at(&self, point: Point) -> Option<&Display> {
        self.displays.iter().find(|d| d.frame.contains(point))
    }

    /// Returns the display closest to `point`; the first one wins ties.
    #[must_use]
    pub fn nearest_display(&self, point: Point) -> Option<&Display> {
        nearest(&self.displays, point)
    }

    /// Containing display, or the nearest one when `point` is outside all.
    #[must_use]
    pub fn resolve_display(&self, point: Point) -> Option<&Display> {
        locate(&self.displays, point)
    }

    /// Zones leaving `edge` of display `id`. Empty for unknown displays.
    #[must_use]
    pub fn zones(&self, id: DisplayId, edge: Edge) -> &[JumpZone] {
        self.zones.get(&id).map_or(&[], |zones| zones.get(edge))
    }

    /// All zones of display `id`.
    #[must_use]
    pub fn edge_zones(&self, id: DisplayId) -> Option<&EdgeZones> { self.zones.get(&id) }

    /// Total number of zones.
    #[must_use]
    pub fn zone_count(&self) -> usize { self.zones.values().map(EdgeZones::len).sum() }

    /// Returns `true` if there is nowhere to jump.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.zone_count() == 0 }
}

/// Returns whether `target` lies beyond `edge` of `source`, with `tolerance`.
fn is_beyond(edge: Edge, source: &Display, target: &Display, tolerance: f64) -> bool {
    let (s, t) = (&source.frame, &target.frame);
    match edge {
        Edge::Right => t.x >= s.right() - tolerance,
        Edge::Left => t.right() <= s.x + tolerance,
        Edge::Bottom => t.y >= s.bottom() - tolerance,
        Edge::Top => t.bottom() <= s.y + tolerance,
    }
}

/// Perpendicular coordinate to land on when entering `target` through `edge`.
fn landing_for(edge: Edge, target: &Display, inset: f64) -> f64 {
    let t = &target.frame;
    match edge {
        Edge::Right => t.x + inset,
        Edge::Left => t.right() - inset,
        Edge::Bottom => t.y + inset,
        Edge::Top => t.bottom() - inset,
    }
}

fn zone_between(edge: Edge, source: &Display, target: &Display, tuning: &Tuning) -> JumpZone {
    let axis = edge.shared_axis();
    let target_span = target.frame.span(axis);
    let source_span =
        target_span.widened(tuning.zone_margin).clipped_to(&source.frame.span(axis));

    JumpZone {
        source: source.id,
        edge,
        target: target.id,
        source_span,
        target_span,
        landing: landing_for(edge, target, tuning.landing_inset),
    }
}

/// Compiles the jump zones for a display set.
///
/// Targets are visited in display order, so zones on each edge keep that
/// order. A display with no neighbours gets no entry.
#[must_use]
pub fn compute_zones(displays: Vec<Display>, tuning: &Tuning) -> Topology {
    let mut zones = BTreeMap::new();

    for source in &displays {
        let mut edges = EdgeZones::default();
        for target in displays.iter().filter(|t| t.id != source.id) {
            for edge in Edge::ALL {
                if is_beyond(edge, source, target, tuning.adjacency_tolerance) {
                    edges.get_mut(edge).push(zone_between(edge, source, target, tuning));
                }
            }
        }
        if !edges.is_empty() {
            zones.insert(source.id, edges);
        }
    }

    let topology = Topology { displays, zones };
    tracing::debug!(
        displays = topology.displays.len(),
        zones = topology.zone_count(),
        "jump: zones compiled"
    );
    topology
}
