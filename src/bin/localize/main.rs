mod cli;

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => read_config_file(path)?,
        None       => Config::default(),
    };
    info!(?config, "configuration");

    match args.command {
        Command::Raycast { volume, origin, direction, tolerance } => {
            let grid = load_volume(&volume)?;
            let tolerance = tolerance.unwrap_or(config.raycast.tolerance);
            match localize_from_ray(origin, direction, &grid, mm_(tolerance), config.raycast.snap) {
                Some(p) => println!("{}", format_point(&p)),
                None    => println!("no hit"),
            }
        }

        Command::Refine { volume, point, axis } => {
            let grid = load_volume(&volume)?;
            let refined = refine(point, &grid, axis, &config.refine.params());
            println!("{}  (moved {:.3} mm)", format_point(&refined), (refined - point).norm());
        }

        Command::Label { atlas, lut, point } => {
            let grid = load_volume(&atlas)?;
            let table = read_lut(&lut)?;
            let label = Labeler::new(config.atlas.neighbourhood).label(&point, &grid, &table);
            println!("{}\t{}", label.index, label.label);
        }

        Command::Interpolate(chain) => run_chain(chain, &config, Grow::Interpolate)?,
        Command::Extend     (chain) => run_chain(chain, &config, Grow::Extend)?,
    }
    Ok(())
}

#[derive(Clone, Copy, Debug)]
enum Grow { Interpolate, Extend }

fn run_chain(args: ChainArgs, config: &Config, grow: Grow) -> Result<(), Box<dyn Error>> {
    let grid = load_volume(&args.volume)?;
    let atlas = match (&args.atlas, &args.lut) {
        (Some(atlas), Some(lut)) => Some((load_volume(atlas)?, read_lut(lut)?)),
        _ => None,
    };
    let ac_x = config.atlas.anterior_commissure_x.map_or(0.0, mm_);
    let mut labeler = Labeler::new(config.atlas.neighbourhood);
    let mut label = |p: &Point| atlas.as_ref().map(|(grid, table)| labeler.label(p, grid, table));

    let mut chain = ElectrodeChain::with_anterior_commissure(ac_x);
    for p in &args.points {
        let fs = label(p);
        chain.add(*p, Mode::CtVolume, fs);
    }

    let source = VolumeSource::new(&grid, config.chain.snap);
    let escalation = config.chain.escalation();
    let estimate = match grow {
        Grow::Interpolate => interpolate_chain(&args.points, args.camera, &source, args.count, &escalation),
        Grow::Extend      => extend_chain     (&args.points, args.camera, &source, args.count, &escalation),
    };
    let Some(estimate) = estimate else {
        warn!(points = args.points.len(), count = args.count, "need at least two contacts and a count above 2");
        return Ok(())
    };
    let added = match grow {
        Grow::Interpolate => chain.apply_interpolation(estimate, Mode::CtVolume, &mut label),
        Grow::Extend      => chain.apply_extension    (estimate, Mode::CtVolume, &mut label),
    };
    info!(added, total = chain.len(), "chain updated");

    for e in &chain {
        println!("{:>3}  {}  {}", e.order, format_point(&e.position()), e.fs_label);
    }
    if let Some(path) = &args.csv {
        write_csv_file(&chain.export_rows(&SubjectTransforms::default(), "", true), path)?;
        info!(path = %path.display(), "chain written");
    }
    Ok(())
}

fn format_point(p: &Point) -> String { format!("{:.3},{:.3},{:.3}", p.x, p.y, p.z) }

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}
// ----- Imports -----------------------------------------------------------------------------------------
use std::error::Error;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;
use units::mm_;
use cli::{Cli, Command, ChainArgs};
use electroloc::{
    Point,
    localize_from_ray, refine, interpolate_chain, extend_chain,
    VolumeSource, Labeler,
    ElectrodeChain, Mode, SubjectTransforms,
    config::localize::{Config, read_config_file},
    export::write_csv_file,
    io::{volume::load_volume, lut::read_lut},
};
