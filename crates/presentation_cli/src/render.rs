//! Plain-text rendering of the map screen state

use std::fmt::Write;

use application::{MapViewModel, Notice, NoticeLevel, OverlayLayerView};
use domain::{PlaceCandidate, QuickLocation};

/// Numbered candidate list
pub fn candidates(candidates: &[PlaceCandidate]) -> String {
    let mut out = String::new();
    for (index, candidate) in candidates.iter().enumerate() {
        let _ = writeln!(
            out,
            "  [{index}] {}  ({})",
            candidate.label, candidate.location
        );
    }
    out
}

/// Both endpoints and the route summary
pub fn route(view: &MapViewModel) -> String {
    let mut out = String::new();
    for (role, selection) in [("Start", &view.start), ("End", &view.end)] {
        match selection.resolved() {
            Some(point) => {
                let _ = writeln!(out, "{role:>5}: {} ({point})", selection.query());
            },
            None => {
                let _ = writeln!(out, "{role:>5}: (not set)");
            },
        }
    }

    match &view.route {
        Some(route) => {
            let _ = writeln!(out, "Route: {}", route.format_summary());
            let _ = writeln!(out, "       {} points", route.polyline.len());
        },
        None if view.route_loading => out.push_str("Route: loading\n"),
        None => out.push_str("Route: none\n"),
    }
    out
}

/// One overlay layer with its points or its error
pub fn overlay(layer: &OverlayLayerView) -> String {
    let mut out = String::new();
    if let Some(error) = &layer.last_error {
        let _ = writeln!(out, "{}: unavailable ({error})", layer.layer);
        return out;
    }

    let _ = writeln!(out, "{}: {} point(s)", layer.layer, layer.points.len());
    for point in &layer.points {
        let _ = write!(out, "  - {} ({})", point.label, point.location);
        if let Some(note) = &point.note {
            let _ = write!(out, " - {note}");
        }
        out.push('\n');
    }
    out
}

/// Pending notices
pub fn notices(notices: &[Notice]) -> String {
    let mut out = String::new();
    for notice in notices {
        let marker = match notice.level {
            NoticeLevel::Info => "i",
            NoticeLevel::Warning => "!",
        };
        let _ = writeln!(out, "[{marker}] {}: {}", notice.title, notice.message);
    }
    out
}

/// The quick-location presets
pub fn presets(presets: &[QuickLocation]) -> String {
    let mut out = String::new();
    for preset in presets {
        let _ = writeln!(out, "  {:<22} {}", preset.name, preset.location);
    }
    out
}
