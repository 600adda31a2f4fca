//! Plans traffic control for a road closure along an event route: finds where the closure meets
//! the open road network, then recommends OTM signs and devices for each of those places.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod boundaries;
mod plan;

use anyhow::Result;
use structopt::StructOpt;

use closure_model::BoundaryType;

#[derive(StructOpt)]
#[structopt(name = "closure_cli", about = "Traffic control planning for road closures")]
enum Command {
    /// Recommends signs and devices for every place a route's closure meets open roads
    Plan {
        #[structopt(flatten)]
        inputs: Inputs,
        /// A JSON list of points of interest, like the start line or water stations
        #[structopt(long)]
        pois: Option<String>,
        /// Comma-separated event phases. Each boundary point gets a plan per phase.
        #[structopt(long, use_delimiter = true)]
        phases: Vec<String>,
        /// open_to_closed or partial_closure
        #[structopt(long, default_value = "open_to_closed", parse(try_from_str = parse_boundary_type))]
        boundary_type: BoundaryType,
        /// The closure takes away straight-through movements at intersections
        #[structopt(long)]
        blocks_straight: bool,
        /// The closure leaves some roads with only one direction open
        #[structopt(long)]
        creates_one_way: bool,
        /// How far to look from a boundary point for roads meeting there
        #[structopt(long, default_value = "100")]
        search_radius_meters: f64,
        /// A JSON file overriding placement standards
        #[structopt(long)]
        standards: Option<String>,
        /// The JSON file to write
        #[structopt(long)]
        output: String,
        /// Also write a bill of materials as CSV here
        #[structopt(long)]
        bom: Option<String>,
        /// Used to label the bill of materials
        #[structopt(long, default_value = "Event")]
        event_name: String,
    },
    /// Writes the closure area and its boundary points as GeoJSON
    Boundaries {
        #[structopt(flatten)]
        inputs: Inputs,
        /// The GeoJSON file to write
        #[structopt(long)]
        output: String,
    },
    /// Prints every sign and device in the catalog
    Signs,
}

#[derive(StructOpt)]
pub struct Inputs {
    /// A JSON file with the route: a list of [lng, lat] points, a list of those lists, route
    /// objects, or a GeoJSON LineString or MultiLineString
    #[structopt(long)]
    route: String,
    /// A GeoJSON file with the road network
    #[structopt(long)]
    roads: String,
    /// How far the closure extends on either side of the route
    #[structopt(long, default_value = "50")]
    buffer_meters: f64,
}

fn main() -> Result<()> {
    let cmd = Command::from_args();

    if !matches!(cmd, Command::Signs) {
        plan_util::logger::setup();
    }

    match cmd {
        Command::Plan {
            inputs,
            pois,
            phases,
            boundary_type,
            blocks_straight,
            creates_one_way,
            search_radius_meters,
            standards,
            output,
            bom,
            event_name,
        } => plan::run(plan::Args {
            inputs,
            pois,
            phases,
            boundary_type,
            blocks_straight,
            creates_one_way,
            search_radius_meters,
            standards,
            output,
            bom,
            event_name,
        })?,
        Command::Boundaries { inputs, output } => boundaries::run(inputs, output)?,
        Command::Signs => print_signs(),
    }
    Ok(())
}

fn parse_boundary_type(x: &str) -> Result<BoundaryType> {
    match x {
        "open_to_closed" => Ok(BoundaryType::OpenToClosed),
        "partial_closure" => Ok(BoundaryType::PartialClosure),
        _ => bail!("unknown boundary type {}", x),
    }
}

/// Distances from flags must be usable, or `Distance` would panic.
fn positive_meters(flag: &str, x: f64) -> Result<geom::Distance> {
    if !x.is_finite() || x <= 0.0 {
        bail!("--{} must be a positive number of meters, not {}", flag, x);
    }
    Ok(geom::Distance::meters(x))
}

fn print_signs() {
    for sign in otm::SIGNS {
        println!(
            "{:<8} {:<34} ${:>6.2}  {}",
            sign.code, sign.name, sign.cost, sign.placement
        );
    }
}
