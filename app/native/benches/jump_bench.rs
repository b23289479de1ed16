//! Benchmarks for the edge-jump hot paths.
//!
//! Run with: `cargo bench -p edgehop`
//!
//! Results are saved to `target/criterion/` with HTML reports.
//!
//! ## Benchmark Groups
//!
//! - `zones`: Zone compilation for growing display counts
//! - `scoring`: Target selection on a single edge
//! - `controller`: A full poll tick against an in-memory host

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use edgehop_lib::config::DisplayLayout;
use edgehop_lib::geometry::{Edge, Point, Rect, Vector};
use edgehop_lib::host::virtual_host::VirtualHost;
use edgehop_lib::jump::{CursorController, Tuning, compute_zones, displays_from_rects, find_target};

// ============================================================================
// Test Data
// ============================================================================

/// A row of `count` 1080p displays, each one 40px lower than the last.
fn staggered_row(count: usize) -> Vec<Rect> {
    (0..count)
        .map(|i| {
            let i = i as f64;
            Rect::new(i * 1920.0, i * 40.0, 1920.0, 1080.0)
        })
        .collect()
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_zones(c: &mut Criterion) {
    let mut group = c.benchmark_group("zones");
    let tuning = Tuning::default();

    for count in [2, 4, 8, 16] {
        let frames = staggered_row(count);
        group.bench_with_input(BenchmarkId::new("compute_zones", count), &frames, |b, frames| {
            b.iter(|| compute_zones(displays_from_rects(black_box(frames.clone())), &tuning));
        });
    }

    group.finish();
}

fn bench_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("scoring");
    let tuning = Tuning::default();

    let pair = compute_zones(displays_from_rects(DisplayLayout::side_by_side().displays), &tuning);
    group.bench_function("find_target_pair", |b| {
        b.iter(|| {
            find_target(
                &pair,
                1,
                Edge::Right,
                black_box(Point::new(1918.0, 540.0)),
                black_box(Vector::new(12.0, 0.0)),
                &tuning,
            )
        });
    });

    let wide = compute_zones(displays_from_rects(staggered_row(16)), &tuning);
    group.bench_function("find_target_wide", |b| {
        b.iter(|| {
            find_target(
                &wide,
                1,
                Edge::Right,
                black_box(Point::new(1918.0, 1000.0)),
                black_box(Vector::new(4.0, 15.0)),
                &tuning,
            )
        });
    });

    group.finish();
}

fn bench_controller(c: &mut Criterion) {
    let mut group = c.benchmark_group("controller");

    let host = VirtualHost::new(DisplayLayout::side_by_side().displays);
    host.move_cursor(Point::new(960.0, 540.0));
    let mut controller = CursorController::from_host(&host, Tuning::default());
    group.bench_function("tick_idle", |b| {
        b.iter(|| controller.tick(black_box(&host)));
    });

    group.finish();
}

criterion_group!(benches, bench_zones, bench_scoring, bench_controller);
criterion_main!(benches);
