//! Edge-jump scenarios on common monitor arrangements.
//!
//! Each test drives a [`CursorController`] against an in-memory host, one poll
//! tick at a time, the way the service does.

use edgehop_lib::geometry::{Edge, Point, Rect};
use edgehop_lib::host::virtual_host::VirtualHost;
use edgehop_lib::jump::{CursorController, TickOutcome, Tuning};

// ============================================================================
// Helpers
// ============================================================================

fn controller_for(host: &VirtualHost) -> CursorController {
    CursorController::from_host(host, Tuning::default())
}

/// Moves the cursor and runs one tick.
fn step(controller: &mut CursorController, host: &VirtualHost, x: f64, y: f64) -> TickOutcome {
    host.move_cursor(Point::new(x, y));
    controller.tick(host).unwrap()
}

fn jumped_to(outcome: &TickOutcome) -> Option<(u32, Point)> {
    match outcome {
        TickOutcome::Jumped(target) => Some((target.display, target.point)),
        _ => None,
    }
}

// ============================================================================
// Arrangements
// ============================================================================

#[test]
fn test_offset_display_lands_inside_its_span() {
    // External display sits 200px lower than the main one.
    let host = VirtualHost::new(vec![
        Rect::new(0.0, 0.0, 2560.0, 1440.0),
        Rect::new(2560.0, 200.0, 1920.0, 1080.0),
    ]);
    let mut controller = controller_for(&host);

    let outcome = step(&mut controller, &host, 2558.0, 100.0);
    assert_eq!(jumped_to(&outcome), Some((2, Point::new(2570.0, 210.0))));
    assert_eq!(host.cursor(), Point::new(2570.0, 210.0));
}

#[test]
fn test_far_corner_needs_movement_towards_target() {
    let displays = vec![
        Rect::new(0.0, 0.0, 2560.0, 1440.0),
        Rect::new(2560.0, 500.0, 1920.0, 1080.0),
    ];

    // Resting 400px above the neighbour: too far to jump.
    let host = VirtualHost::new(displays.clone());
    let mut controller = controller_for(&host);
    assert!(matches!(step(&mut controller, &host, 2558.0, 100.0), TickOutcome::AtEdge(Edge::Right)));
    assert!(host.warps().is_empty());

    // Sliding down into the same spot earns the direction bonus.
    let host = VirtualHost::new(displays);
    let mut controller = controller_for(&host);
    assert!(matches!(step(&mut controller, &host, 2540.0, 60.0), TickOutcome::Idle));
    let outcome = step(&mut controller, &host, 2558.0, 100.0);
    assert_eq!(jumped_to(&outcome), Some((2, Point::new(2570.0, 510.0))));
}

#[test]
fn test_stacked_displays_both_ways() {
    let host = VirtualHost::new(vec![
        Rect::new(0.0, 0.0, 1920.0, 1080.0),
        Rect::new(-320.0, -1440.0, 2560.0, 1440.0),
    ]);
    let mut controller = controller_for(&host);

    let up = step(&mut controller, &host, 960.0, 1.0);
    assert_eq!(jumped_to(&up), Some((2, Point::new(960.0, -10.0))));

    // Still cooling down from the first jump.
    assert!(matches!(step(&mut controller, &host, 960.0, -2.0), TickOutcome::CoolingDown));

    host.advance(0.1);
    let down = step(&mut controller, &host, 960.0, -2.0);
    assert_eq!(jumped_to(&down), Some((1, Point::new(960.0, 10.0))));
    assert_eq!(host.warps().len(), 2);
}

#[test]
fn test_small_gap_still_connects_and_first_display_wins_ties() {
    let host = VirtualHost::new(vec![
        Rect::new(0.0, 0.0, 1920.0, 1080.0),
        Rect::new(1925.0, 0.0, 1920.0, 1080.0),
        Rect::new(3845.0, 0.0, 1920.0, 1080.0),
    ]);
    let mut controller = controller_for(&host);

    // Both displays to the right contain the cursor's height.
    assert_eq!(controller.topology().zones(1, Edge::Right).len(), 2);

    let outcome = step(&mut controller, &host, 1918.0, 540.0);
    assert_eq!(jumped_to(&outcome), Some((2, Point::new(1935.0, 540.0))));
}

#[test]
fn test_unplugged_display_stops_jumps() {
    let host = VirtualHost::new(vec![
        Rect::new(0.0, 0.0, 1920.0, 1080.0),
        Rect::new(1920.0, 0.0, 1920.0, 1080.0),
    ]);
    let mut controller = controller_for(&host);

    host.set_displays(vec![Rect::new(0.0, 0.0, 1920.0, 1080.0)]);
    controller.rebuild(&host);

    assert!(matches!(step(&mut controller, &host, 1918.0, 540.0), TickOutcome::AtEdge(Edge::Right)));
    assert!(host.warps().is_empty());
}

#[test]
fn test_cursor_between_displays_resolves_to_nearest() {
    // Diagonal arrangement leaves dead space the cursor can report.
    let host = VirtualHost::new(vec![
        Rect::new(0.0, 0.0, 1920.0, 1080.0),
        Rect::new(1920.0, 1080.0, 1920.0, 1080.0),
    ]);
    let mut controller = controller_for(&host);

    let outcome = step(&mut controller, &host, 1000.0, 1500.0);
    assert!(jumped_to(&outcome).is_none());
    assert_eq!(controller.state().ticks, 1);
}
