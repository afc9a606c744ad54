/// Command line interface for `localize` executable
#[derive(clap::Parser, Debug, Clone)]
#[clap(
    name = "localize",
    about = "Localize electrode contacts in CT volumes and label them with an atlas",
)]
pub (super) struct Cli {
    /// TOML file with tolerances and refinement parameters
    #[clap(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase logging: -v info, -vv debug, -vvv trace
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[clap(subcommand)]
    pub (super) command: Command,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub (super) enum Command {

    /// Find the nearest occupied voxel along a view ray
    Raycast {
        /// Volume descriptor (TOML)
        volume: PathBuf,

        /// Ray origin `x,y,z` in world mm
        #[clap(short, long, value_parser = parse_point, allow_hyphen_values = true)]
        origin: Point,

        /// Ray direction `x,y,z`
        #[clap(short, long, value_parser = parse_vector, allow_hyphen_values = true)]
        direction: Vector,

        /// Override the configured tolerance
        #[clap(short, long)]
        tolerance: Option<Length>,
    },

    /// Move a point onto the intensity centroid of its neighbourhood
    Refine {
        /// Volume descriptor (TOML)
        volume: PathBuf,

        #[clap(short, long, value_parser = parse_point, allow_hyphen_values = true)]
        point: Point,

        /// Lead direction: discourage movement along it
        #[clap(short, long, value_parser = parse_vector, allow_hyphen_values = true)]
        axis: Option<Vector>,
    },

    /// Anatomical label of a point
    Label {
        /// Atlas volume descriptor (TOML)
        atlas: PathBuf,

        /// FreeSurfer colour lookup table
        lut: PathBuf,

        #[clap(short, long, value_parser = parse_point, allow_hyphen_values = true)]
        point: Point,
    },

    /// Fill in contacts between the last two given ones
    Interpolate(ChainArgs),

    /// Add contacts beyond the last given one
    Extend(ChainArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub (super) struct ChainArgs {
    /// Volume descriptor (TOML)
    pub volume: PathBuf,

    /// Camera position `x,y,z`
    #[clap(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub camera: Point,

    /// Localized contacts, in order
    #[clap(short, long = "point", value_parser = parse_point, allow_hyphen_values = true, required = true)]
    pub points: Vec<Point>,

    /// Contacts spanned by the last two (interpolate) or added plus 2 (extend)
    #[clap(short = 'n', long)]
    pub count: usize,

    /// Label the contacts with this atlas volume descriptor ...
    #[clap(long, requires = "lut")]
    pub atlas: Option<PathBuf>,

    /// ... and lookup table
    #[clap(long, requires = "atlas")]
    pub lut: Option<PathBuf>,

    /// Write the resulting chain as CSV
    #[clap(long)]
    pub csv: Option<PathBuf>,
}
// ----- Imports -----------------------------------------------------------------------------------------
use std::path::PathBuf;
use units::Length;
use electroloc::{
    Point, Vector,
    utils::{parse_point, parse_vector},
};
