//! AccessRoute CLI
//!
//! Drives the map screen coordinator from the terminal: place search,
//! routing between two endpoints and accessibility overlays.

#![allow(clippy::print_stdout)]

mod render;

use std::sync::Arc;

use anyhow::{Context, bail};
use application::{MapViewModel, RouteCoordinator, SearchOutcome};
use clap::{Parser, Subcommand};
use domain::{BoundingBox, EndpointRole, GeoPoint, OverlayKind, QUICK_LOCATIONS, QuickLocation};
use infrastructure::{
    AppConfig, MapboxDirectionsAdapter, MapboxGeocodingAdapter, OverlayFeedAdapter,
    StaticLocationProvider, init_telemetry,
};
use tracing::{debug, info};

/// AccessRoute CLI
#[derive(Parser)]
#[command(name = "accessroute-cli")]
#[command(author, version, about = "Accessible route planning from the terminal", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print the map view model as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file (default: ./config.toml if present)
    #[arg(short, long, env = "ACCESSROUTE_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for places and list the candidates
    Search {
        /// Free-text query (at least 3 characters)
        text: String,

        /// Endpoint the search is for
        #[arg(short, long, default_value = "start", value_parser = parse_role)]
        role: EndpointRole,
    },

    /// Plan a route between two endpoints
    ///
    /// Each endpoint is a quick-location name, `here` (device location),
    /// `lat,lon`, or free text.
    /// Example: accessroute-cli route "Circular Quay" "-33.8839,151.2065"
    Route {
        /// Origin
        from: String,

        /// Destination
        to: String,

        /// Candidate to take when a free-text endpoint has several matches
        #[arg(long, default_value = "0")]
        pick: usize,
    },

    /// Show an accessibility overlay layer
    Overlay {
        /// Layer: parking, lifts or stairs
        #[arg(value_parser = parse_layer)]
        layer: OverlayKind,

        /// Region as south,west,north,east (default: configured viewport)
        #[arg(long, value_parser = parse_bbox)]
        bbox: Option<BoundingBox>,
    },

    /// List the quick-location presets
    Presets,
}

/// An endpoint argument of the `route` command
#[derive(Debug, Clone, PartialEq)]
enum EndpointArg {
    Preset(QuickLocation),
    Here,
    Point(GeoPoint),
    Text(String),
}

impl EndpointArg {
    fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("here") {
            return Self::Here;
        }
        if let Some(preset) = QuickLocation::find(trimmed) {
            return Self::Preset(preset);
        }
        match trimmed.parse::<GeoPoint>() {
            Ok(point) => Self::Point(point),
            Err(_) => Self::Text(trimmed.to_string()),
        }
    }
}

fn parse_role(s: &str) -> Result<EndpointRole, String> {
    EndpointRole::from_config(s).ok_or_else(|| format!("unknown role '{s}', use start or end"))
}

fn parse_layer(s: &str) -> Result<OverlayKind, String> {
    OverlayKind::from_config(s)
        .ok_or_else(|| format!("unknown layer '{s}', use parking, lifts or stairs"))
}

fn parse_bbox(s: &str) -> Result<BoundingBox, String> {
    s.parse().map_err(|e: domain::DomainError| e.to_string())
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Wire the coordinator to the Mapbox, overlay feed and location adapters
fn build_coordinator(config: &AppConfig) -> anyhow::Result<RouteCoordinator> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    let geocoder = MapboxGeocodingAdapter::from_config(&config.mapbox)?;
    let directions = MapboxDirectionsAdapter::from_config(&config.mapbox)?;
    let overlays = OverlayFeedAdapter::from_config(&config.parking, &config.overpass)?;
    let location = StaticLocationProvider::from_fix(config.device_location()?);

    Ok(RouteCoordinator::new(
        Arc::new(geocoder),
        Arc::new(directions),
        Arc::new(overlays),
        config.coordinator_config()?,
    )
    .with_location(Arc::new(location)))
}

/// Resolve one endpoint of the `route` command
async fn resolve_endpoint(
    coordinator: &RouteCoordinator,
    role: EndpointRole,
    endpoint: EndpointArg,
    pick: usize,
) -> anyhow::Result<()> {
    debug!(%role, ?endpoint, "Resolving endpoint");
    match endpoint {
        EndpointArg::Here => {
            coordinator.use_current_location(Some(role)).await?;
        },
        EndpointArg::Preset(preset) => {
            coordinator.use_quick_location(Some(role), preset.name).await?;
        },
        EndpointArg::Point(point) => {
            coordinator.set_endpoint(role, point, &point.to_string()).await;
        },
        EndpointArg::Text(text) => match coordinator.search(role, &text).await {
            SearchOutcome::Resolved => {},
            SearchOutcome::Candidates(count) => {
                let view = coordinator.snapshot();
                let Some(candidate) = view.endpoint(role).candidates().get(pick) else {
                    bail!("{role}: '{text}' has {count} matches, --pick {pick} is out of range");
                };
                info!(%role, label = %candidate.label, "Picked candidate");
                coordinator.select_candidate(role, &candidate.id).await?;
            },
            SearchOutcome::Cleared => bail!("{role}: '{text}' is too short to search"),
            SearchOutcome::Failed(err) => return Err(err.into()),
            SearchOutcome::Stale => bail!("{role}: search for '{text}' was superseded"),
        },
    }
    Ok(())
}

fn print_view(json: bool, view: &MapViewModel, text: &str) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        print!("{text}");
        print!("{}", render::notices(&view.notices));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .context("failed to load configuration")?;

    // -v overrides the configured filter
    let mut telemetry = config.telemetry.clone();
    if cli.verbose > 0 {
        telemetry = telemetry.with_log_filter(log_filter_from_verbosity(cli.verbose));
    }
    init_telemetry(&telemetry)?;

    match cli.command {
        Commands::Presets => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&QUICK_LOCATIONS)?);
            } else {
                println!("Quick locations:");
                print!("{}", render::presets(&QUICK_LOCATIONS));
            }
        },

        Commands::Search { text, role } => {
            let coordinator = build_coordinator(&config)?;
            let outcome = coordinator.search(role, &text).await;
            let view = coordinator.snapshot();

            let summary = match &outcome {
                SearchOutcome::Candidates(count) => format!(
                    "{count} match(es) for '{text}':\n{}",
                    render::candidates(view.endpoint(role).candidates())
                ),
                SearchOutcome::Resolved => match view.endpoint(role).resolved() {
                    Some(point) => format!("Single match, {role} set to {point}\n"),
                    None => format!("Single match for '{text}'\n"),
                },
                SearchOutcome::Cleared => {
                    format!("'{text}' is too short, type at least 3 characters\n")
                },
                SearchOutcome::Failed(_) | SearchOutcome::Stale => String::new(),
            };
            print_view(cli.json, &view, &summary)?;
        },

        Commands::Route { from, to, pick } => {
            let coordinator = build_coordinator(&config)?;
            resolve_endpoint(&coordinator, EndpointRole::Start, EndpointArg::parse(&from), pick)
                .await?;
            resolve_endpoint(&coordinator, EndpointRole::End, EndpointArg::parse(&to), pick)
                .await?;

            let view = coordinator.snapshot();
            print_view(cli.json, &view, &render::route(&view))?;
        },

        Commands::Overlay { layer, bbox } => {
            let coordinator = build_coordinator(&config)?;
            if let Some(region) = bbox {
                coordinator.set_viewport(region);
            }
            coordinator.set_overlay(layer, true).await;

            let view = coordinator.snapshot();
            let text = view.overlay(layer).map(render::overlay).unwrap_or_default();
            print_view(cli.json, &view, &text)?;
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_verbosity_levels() {
        assert_eq!(log_filter_from_verbosity(0), "warn");
        assert_eq!(log_filter_from_verbosity(1), "info");
        assert_eq!(log_filter_from_verbosity(2), "debug");
        assert_eq!(log_filter_from_verbosity(3), "trace");
        assert_eq!(log_filter_from_verbosity(10), "trace");
    }

    #[test]
    fn endpoint_here() {
        assert_eq!(EndpointArg::parse(" HERE "), EndpointArg::Here);
    }

    #[test]
    fn endpoint_preset_is_case_insensitive() {
        match EndpointArg::parse("circular quay") {
            EndpointArg::Preset(preset) => assert_eq!(preset.name, "Circular Quay"),
            other => panic!("expected preset, got {other:?}"),
        }
    }

    #[test]
    fn endpoint_coordinates() {
        assert_eq!(
            EndpointArg::parse("-33.8839, 151.2065"),
            EndpointArg::Point(GeoPoint::new_unchecked(-33.8839, 151.2065))
        );
    }

    #[test]
    fn endpoint_free_text_with_comma() {
        assert_eq!(
            EndpointArg::parse("Kent St, Sydney"),
            EndpointArg::Text("Kent St, Sydney".to_string())
        );
    }

    #[test]
    fn cli_parses_route_command() {
        let cli = Cli::try_parse_from(["accessroute-cli", "-vv", "route", "here", "Central Station", "--pick", "2"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Route { from, to, pick } => {
                assert_eq!(from, "here");
                assert_eq!(to, "Central Station");
                assert_eq!(pick, 2);
            },
            _ => panic!("expected route command"),
        }
    }

    #[test]
    fn cli_parses_overlay_with_bbox() {
        let cli = Cli::try_parse_from([
            "accessroute-cli",
            "--json",
            "overlay",
            "lifts",
            "--bbox",
            "-33.89,151.19,-33.85,151.23",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Overlay { layer, bbox } => {
                assert_eq!(layer, OverlayKind::Lift);
                assert_eq!(bbox.map(|b| b.south()), Some(-33.89));
            },
            _ => panic!("expected overlay command"),
        }
    }

    #[test]
    fn cli_rejects_unknown_layer() {
        assert!(Cli::try_parse_from(["accessroute-cli", "overlay", "ramps"]).is_err());
    }

    #[test]
    fn cli_search_role_defaults_to_start() {
        let cli = Cli::try_parse_from(["accessroute-cli", "search", "Town Hall"]).unwrap();
        match cli.command {
            Commands::Search { role, .. } => assert_eq!(role, EndpointRole::Start),
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn build_coordinator_rejects_missing_token() {
        let err = build_coordinator(&AppConfig::default()).unwrap_err();
        assert!(err.to_string().contains("access_token"));
    }
}
