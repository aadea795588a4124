/*
 * Copyright (c) 2025 Clément GRENNERAT
 *
 * This program is free software: you can redistribute it and/or modify it under the terms of the
 * GNU General Public License as published by the Free Software Foundation, version 3.
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
 * even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
 * See the GNU General Public License for more details.
 * You should have received a copy of the GNU General Public License along with this program.
 * If not, see https://www.gnu.org/licenses/.
 *
 */

use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use rota_scheduler_core::model::configuration::SolveParams;
use rota_scheduler_core::scheduler::{rota, solve, stats};
use rota_scheduler_store::workbook::Workbook;
use rota_scheduler_store::xlsx::export_xlsx;
use std::path::PathBuf;

/// Solves a rota workbook and exports the rota, week assignments and
/// dashboard. The exit code reflects I/O and input validation only: an
/// INFEASIBLE solve still exports (with empty roles) and exits 0.
#[derive(Parser, Debug)]
#[command(name = "rota-solve")]
struct Args {
    /// Input workbook path.
    #[arg(long)]
    input: PathBuf,
    /// Output workbook path.
    #[arg(long)]
    output: PathBuf,
    /// Solver wall-clock limit in seconds.
    #[arg(long = "time_limit", default_value_t = 60)]
    time_limit: u64,
    /// Allow the same consultant to hold blocks in adjacent weeks.
    #[arg(long = "no_hard_week_gap")]
    no_hard_week_gap: bool,
    /// Allow the same consultant to hold weekend blocks in adjacent weeks.
    #[arg(long = "no_hard_no_consec_weekends")]
    no_hard_no_consec_weekends: bool,
    /// Number of parallel search workers.
    #[arg(long, default_value_t = 8)]
    workers: usize,
    /// Search seed, for reproducible runs.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Optional XLSX publishing export of the solved regions.
    #[arg(long)]
    xlsx: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::new()
        .filter(None, LevelFilter::Info)
        .parse_default_env()
        .init();
    let args = Args::parse();

    let mut workbook = Workbook::load(&args.input)
        .with_context(|| format!("reading workbook {}", args.input.display()))?;
    let inputs = workbook.engine_inputs().context("validating inputs")?;

    let params = SolveParams {
        time_limit_s: args.time_limit,
        workers: args.workers,
        hard_no_consecutive_weekends: !args.no_hard_no_consec_weekends,
        hard_week_gap: !args.no_hard_week_gap,
        seed: args.seed,
    };
    let solution = solve::solve(&inputs, &params)?;
    match solution.objective {
        Some(objective) => println!("Status: {}  Objective: {}", solution.status, objective),
        None => println!("Status: {}", solution.status),
    }

    let day_rows = rota::expand(&inputs, &solution);
    let dashboard = stats::aggregate(&inputs, &solution, &day_rows);
    rota::to_table(&day_rows).printstd();
    stats::to_table(&dashboard).printstd();

    workbook.apply_solution(&solution, day_rows, dashboard);
    workbook
        .save(&args.output)
        .with_context(|| format!("writing workbook {}", args.output.display()))?;
    if let Some(xlsx_path) = &args.xlsx {
        export_xlsx(&workbook, xlsx_path)
            .with_context(|| format!("exporting {}", xlsx_path.display()))?;
    }
    println!("Wrote {}", args.output.display());
    Ok(())
}
