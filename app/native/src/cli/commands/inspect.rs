//! Zone listing and cursor probing.
//!
//! Both commands work on the live display arrangement or on a layout file, so
//! a setup can be inspected on any machine.

use std::path::{Path, PathBuf};

use clap::Args;
use colored::Colorize;
use serde_json::json;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::cli::output;
use crate::config::{EdgeHopConfig, load_layout};
use crate::error::EdgeHopError;
use crate::geometry::{Edge, Point, Vector};
use crate::jump::{
    CursorController, Decision, Display, Topology, Tuning, compute_zones, displays_from_rects,
    score_candidates,
};

/// Arguments of `edgehop zones`.
#[derive(Args, Debug)]
pub struct ZonesArgs {
    /// Read display frames from a layout file instead of the current displays.
    #[arg(long, short, value_name = "FILE")]
    pub layout: Option<PathBuf>,

    /// Output in JSON format.
    #[arg(long, short)]
    pub json: bool,
}

/// Arguments of `edgehop probe`.
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Read display frames from a layout file instead of the current displays.
    #[arg(long, short, value_name = "FILE")]
    pub layout: Option<PathBuf>,

    /// Cursor X in global coordinates.
    #[arg(long, allow_negative_numbers = true)]
    pub x: f64,

    /// Cursor Y in global coordinates.
    #[arg(long, allow_negative_numbers = true)]
    pub y: f64,

    /// Horizontal movement since the previous sample (px).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub dx: f64,

    /// Vertical movement since the previous sample (px).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub dy: f64,

    /// Output in JSON format.
    #[arg(long, short)]
    pub json: bool,
}

/// Displays from a layout file, or from the host when no file is given.
fn load_displays(layout: Option<&Path>) -> Result<Vec<Display>, EdgeHopError> {
    match layout {
        Some(path) => Ok(displays_from_rects(load_layout(path)?.displays)),
        None => live_displays(),
    }
}

#[cfg(target_os = "macos")]
fn live_displays() -> Result<Vec<Display>, EdgeHopError> {
    let host = crate::host::macos::MacHost::new();
    Ok(crate::jump::build_topology(&host))
}

#[cfg(not(target_os = "macos"))]
fn live_displays() -> Result<Vec<Display>, EdgeHopError> {
    Err(EdgeHopError::Unsupported(
        "reading the current displays is only supported on macOS, pass --layout".to_string(),
    ))
}

fn compile(
    layout: Option<&Path>,
    config: &EdgeHopConfig,
) -> Result<(Topology, Tuning), EdgeHopError> {
    let tuning = Tuning::from(&config.cursor);
    let topology = compute_zones(load_displays(layout)?, &tuning);
    Ok((topology, tuning))
}

/// Runs `edgehop zones`.
///
/// # Errors
///
/// Returns an error if the layout cannot be loaded or the current displays
/// cannot be read on this platform.
pub fn zones(args: &ZonesArgs, config: &EdgeHopConfig) -> Result<(), EdgeHopError> {
    let (topology, _) = compile(args.layout.as_deref(), config)?;

    if args.json {
        output::print_highlighted_json(&serde_json::to_value(&topology)?);
        return Ok(());
    }

    print_displays(&topology);
    println!();
    print_zones(&topology);
    Ok(())
}

fn print_displays(topology: &Topology) {
    #[derive(Tabled)]
    struct DisplayRow {
        #[tabled(rename = "ID")]
        id: u32,
        #[tabled(rename = "Frame")]
        frame: String,
        #[tabled(rename = "Zones")]
        zones: usize,
    }

    let rows: Vec<DisplayRow> = topology
        .displays()
        .iter()
        .map(|display| DisplayRow {
            id: display.id,
            frame: output::format_rect(&display.frame),
            zones: topology.edge_zones(display.id).map_or(0, |zones| zones.len()),
        })
        .collect();

    let count = rows.len();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string();

    println!("{}", format!("Displays ({count})").bold());
    println!("{table}");
}

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "From")]
    source: u32,
    #[tabled(rename = "Edge")]
    edge: Edge,
    #[tabled(rename = "To")]
    target: u32,
    #[tabled(rename = "Source span")]
    source_span: String,
    #[tabled(rename = "Target span")]
    target_span: String,
    #[tabled(rename = "Landing")]
    landing: String,
}

fn print_zones(topology: &Topology) {
    let rows: Vec<ZoneRow> = topology
        .displays()
        .iter()
        .filter_map(|display| topology.edge_zones(display.id))
        .flat_map(|zones| zones.iter())
        .map(|zone| ZoneRow {
            source: zone.source,
            edge: zone.edge,
            target: zone.target,
            source_span: output::format_span(zone.source_span),
            target_span: output::format_span(zone.target_span),
            landing: output::format_px(zone.landing),
        })
        .collect();

    let count = rows.len();
    println!("{}", format!("Jump zones ({count})").bold());
    if rows.is_empty() {
        println!("{}", "No displays are adjacent to each other.".dimmed());
        return;
    }

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

/// Runs `edgehop probe`.
///
/// # Errors
///
/// Returns an error if the layout cannot be loaded or the current displays
/// cannot be read on this platform.
pub fn probe(args: &ProbeArgs, config: &EdgeHopConfig) -> Result<(), EdgeHopError> {
    let (topology, tuning) = compile(args.layout.as_deref(), config)?;
    let position = Point::new(args.x, args.y);
    let velocity = Vector::new(args.dx, args.dy);

    let at_edge = topology.resolve_display(position).and_then(|display| {
        Edge::detect(&display.frame, position, tuning.edge_threshold).map(|edge| (display.id, edge))
    });
    let candidates = at_edge
        .map(|(id, edge)| score_candidates(&topology, id, edge, position, velocity, &tuning))
        .unwrap_or_default();
    let decision = CursorController::new(topology, tuning).evaluate(position, velocity);

    if args.json {
        let value = json!({
            "position": position,
            "velocity": velocity,
            "candidates": candidates,
            "decision": decision,
        });
        output::print_highlighted_json(&value);
        return Ok(());
    }

    if !candidates.is_empty() {
        #[derive(Tabled)]
        struct CandidateRow {
            #[tabled(rename = "To")]
            target: u32,
            #[tabled(rename = "Target span")]
            target_span: String,
            #[tabled(rename = "Base")]
            base: String,
            #[tabled(rename = "Bonus")]
            bonus: String,
            #[tabled(rename = "Total")]
            total: String,
            #[tabled(rename = "Accepted")]
            accepted: String,
        }

        let rows: Vec<CandidateRow> = candidates
            .iter()
            .map(|candidate| CandidateRow {
                target: candidate.zone.target,
                target_span: output::format_span(candidate.zone.target_span),
                base: output::format_px(candidate.base),
                bonus: output::format_px(candidate.bonus),
                total: output::format_px(candidate.total),
                accepted: output::format_bool(candidate.total >= tuning.acceptance_threshold),
            })
            .collect();

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(0..1)).with(Alignment::right()))
            .with(Modify::new(Columns::new(2..5)).with(Alignment::right()))
            .with(Modify::new(Columns::new(5..6)).with(Alignment::center()))
            .to_string();

        println!("{}", format!("Candidates ({})", candidates.len()).bold());
        println!("{table}");
        println!();
    }

    println!("{}", describe(&decision));
    Ok(())
}

/// One-line summary of a decision.
fn describe(decision: &Decision) -> String {
    match decision {
        Decision::NoDisplay => "No display".dimmed().to_string(),
        Decision::Inside { display } => format!("Inside display {display}, not at an edge"),
        Decision::AtEdge { display, edge } => {
            format!("At the {edge} edge of display {display}, {}", "no jump".yellow())
        }
        Decision::Jump { display, target } => format!(
            "{} from display {display} across the {} edge to display {} at {} (score {})",
            "Jump".green().bold(),
            target.edge,
            target.display,
            target.point,
            output::format_px(target.score)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jump::Target;

    fn write_layout(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("layout.jsonc");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_compile_from_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_layout(
            &dir,
            r#"{
                // laptop on the left, external display on the right
                "displays": [
                    { "x": 0, "y": 0, "width": 1920, "height": 1080 },
                    { "x": 1920, "y": 0, "width": 2560, "height": 1440 }
                ]
            }"#,
        );

        let (topology, _) = compile(Some(&path), &EdgeHopConfig::default()).unwrap();
        assert_eq!(topology.displays().len(), 2);
        assert_eq!(topology.zone_count(), 2);
    }

    #[test]
    fn test_compile_missing_layout() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.jsonc");
        assert!(compile(Some(&missing), &EdgeHopConfig::default()).is_err());
    }

    #[test]
    fn test_probe_and_zones_accept_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_layout(
            &dir,
            r#"{ "displays": [
                { "x": 0, "y": 0, "width": 1920, "height": 1080 },
                { "x": 1920, "y": 0, "width": 1920, "height": 1080 }
            ] }"#,
        );

        let zones_args = ZonesArgs { layout: Some(path.clone()), json: true };
        assert!(zones(&zones_args, &EdgeHopConfig::default()).is_ok());

        let probe_args =
            ProbeArgs { layout: Some(path), x: 1918.0, y: 540.0, dx: 15.0, dy: 0.0, json: false };
        assert!(probe(&probe_args, &EdgeHopConfig::default()).is_ok());
    }

    #[test]
    fn test_describe() {
        colored::control::set_override(false);
        assert_eq!(describe(&Decision::NoDisplay), "No display");
        assert_eq!(
            describe(&Decision::AtEdge { display: 1, edge: Edge::Left }),
            "At the left edge of display 1, no jump"
        );

        let target = Target {
            display: 2,
            edge: Edge::Right,
            point: Point::new(1930.0, 540.0),
            score: 1000.0,
        };
        let text = describe(&Decision::Jump { display: 1, target });
        assert!(text.starts_with("Jump from display 1 across the right edge to display 2"));
        assert!(text.ends_with("(score 1000)"));
    }
}
