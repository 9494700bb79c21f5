// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fermat_rays::io;
use fermat_rays::{FermatPath, FermatSolver, Interface, PathElement, SolveProgress};

#[derive(Parser)]
#[command(
    name = "fermat-rays",
    about = "Minimum-time rays through a stack of interfaces"
)]
struct Cli {
    /// Interface as NAME=FILE.npy, FILE holding an [n, 3] coordinate array (repeatable)
    #[arg(short = 'i', long = "interface", num_args = 1, required = true)]
    interfaces: Vec<String>,

    /// Path as alternating interface names and velocities,
    /// e.g. "probe,1480,frontwall,6320,backwall" (repeatable)
    #[arg(short = 'p', long = "path", num_args = 1, required = true)]
    paths: Vec<String>,

    /// Directory receiving <path>_times.npy and <path>_indices.npy
    #[arg(short = 'o', long, default_value = "rays")]
    output_dir: PathBuf,

    /// Number of Rayon worker threads
    #[arg(long)]
    threads: Option<usize>,

    /// Column block size of the min-plus combination
    #[arg(long, default_value = "256")]
    block_size: usize,

    /// Log each solved path
    #[arg(long)]
    progress: bool,

    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn parse_interface(s: &str) -> Result<(String, PathBuf)> {
    let Some((name, file)) = s.split_once('=') else {
        bail!("invalid --interface '{}': expected NAME=FILE.npy", s);
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("invalid --interface '{}': empty name", s);
    }
    Ok((name.to_string(), PathBuf::from(file.trim())))
}

fn load_interfaces(args: &[String]) -> Result<HashMap<String, Interface>> {
    let mut interfaces = HashMap::new();
    for arg in args {
        let (name, file) = parse_interface(arg)?;
        if interfaces.contains_key(&name) {
            bail!("interface '{}' given twice", name);
        }
        let points = io::load_points(&file, &name)
            .with_context(|| format!("loading interface '{}' from {}", name, file.display()))?;
        tracing::info!(interface = %name, points = points.len(), "loaded");
        interfaces.insert(name, points.into_interface());
    }
    Ok(interfaces)
}

fn parse_path(s: &str, interfaces: &HashMap<String, Interface>) -> Result<FermatPath> {
    let mut elements = Vec::new();
    for (position, token) in s.split(',').map(str::trim).enumerate() {
        if position % 2 == 0 {
            let Some(interface) = interfaces.get(token) else {
                bail!("unknown interface '{}' in --path '{}'", token, s);
            };
            elements.push(PathElement::Interface(interface.clone()));
        } else {
            let velocity: f64 = token
                .parse()
                .with_context(|| format!("invalid velocity '{}' in --path '{}'", token, s))?;
            elements.push(PathElement::Velocity(velocity));
        }
    }
    FermatPath::from_elements(elements).with_context(|| format!("invalid --path '{}'", s))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli, output_dir: &Path) -> Result<()> {
    let interfaces = load_interfaces(&cli.interfaces)?;
    let paths = cli
        .paths
        .iter()
        .map(|s| parse_path(s, &interfaces))
        .collect::<Result<Vec<_>>>()?;

    let mut solver = FermatSolver::new(paths)?
        .with_block_size(cli.block_size)
        .context("invalid --block-size")?;
    if let Some(threads) = cli.threads {
        solver = solver.with_threads(threads);
    }
    if cli.progress {
        solver = solver.with_progress(Box::new(|info: SolveProgress| {
            tracing::info!(
                solved = info.paths_solved,
                total = info.paths_total,
                elapsed_s = info.elapsed.as_secs_f64(),
                "progress"
            );
        }));
    }

    let results = solver.solve()?;

    let mut written = HashSet::new();
    let mut stems = HashSet::new();
    for path in solver.paths() {
        if !written.insert(path) {
            continue;
        }
        let rays = &results[path];
        let edge_rays = rays
            .gone_through_extreme_points()
            .iter()
            .filter(|&&f| f)
            .count();
        if edge_rays > 0 {
            tracing::warn!(
                path = %path,
                rays = edge_rays,
                "rays touch the first or last point of an interior interface"
            );
        }
        // Same interfaces with other velocities would share a stem
        let stem = io::unique_stem(&io::path_stem(rays), &mut stems);
        let (times_file, indices_file) = io::save_rays(rays, output_dir, &stem)
            .with_context(|| format!("saving rays of {}", path))?;
        tracing::info!(
            path = %path,
            times = %times_file.display(),
            indices = %indices_file.display(),
            "saved"
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(&cli, &cli.output_dir)
}
