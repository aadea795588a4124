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

//! Leave-request administration over the JSON-per-request store, plus the
//! controlled compile step into the shared rota workbook.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use log::LevelFilter;
use prettytable::{row, Table};
use rota_scheduler_store::guard::{backup_file, LockGuard};
use rota_scheduler_store::leave::{LeaveStore, LeaveType};
use rota_scheduler_store::workbook::Workbook;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "rota-leave")]
struct Cli {
    /// Folder holding one JSON file per leave request (synced drive).
    #[arg(long, env = "LEAVE_REQUESTS_DIR")]
    requests_dir: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Creates a leave request.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long, default_value = "Annual")]
        leave_type: String,
        /// Requests are approved by default; pass this to park one.
        #[arg(long)]
        unapproved: bool,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Lists all requests, sorted by start date and name.
    List,
    /// Flips the approval state of a request.
    Approve {
        id: Uuid,
        #[arg(long)]
        revoke: bool,
    },
    /// Deletes a request file.
    Delete { id: Uuid },
    /// Compiles every request into the workbook's leave region,
    /// replacing it in place. Takes a backup and a lock around the write.
    Compile {
        #[arg(long, env = "ROTA_WORKBOOK_PATH")]
        workbook: PathBuf,
        #[arg(long)]
        no_backup: bool,
    },
}

fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::new()
        .filter(None, LevelFilter::Info)
        .parse_default_env()
        .init();
    let cli = Cli::parse();
    let store = LeaveStore::open(&cli.requests_dir).context("opening leave store")?;

    match cli.command {
        Command::Add {
            name,
            start,
            end,
            leave_type,
            unapproved,
            notes,
        } => {
            let request = store.create(
                &name,
                start,
                end,
                LeaveType::normalize(&leave_type),
                !unapproved,
                &notes,
            )?;
            println!(
                "Created request {} for {}: {} -> {} ({})",
                request.request_id, request.name, request.start_date, request.end_date,
                request.leave_type
            );
        }
        Command::List => {
            let requests = store.load_all()?;
            if requests.is_empty() {
                println!("No requests.");
                return Ok(());
            }
            let mut table = Table::new();
            table.add_row(row!["RequestID", "Name", "From", "To", "Type", "Approved", "Notes"]);
            for r in &requests {
                table.add_row(row![
                    r.request_id,
                    r.name,
                    r.start_date,
                    r.end_date,
                    r.leave_type,
                    r.approved,
                    r.notes
                ]);
            }
            table.printstd();
        }
        Command::Approve { id, revoke } => {
            let mut request = store.get(id)?;
            request.approved = !revoke;
            store.upsert(&mut request)?;
            println!(
                "Request {} is now {}",
                id,
                if request.approved { "approved" } else { "not approved" }
            );
        }
        Command::Delete { id } => {
            store.delete(id)?;
            println!("Deleted request {}", id);
        }
        Command::Compile {
            workbook: workbook_path,
            no_backup,
        } => {
            let _lock = LockGuard::acquire(&workbook_path)?;
            if !no_backup {
                match backup_file(&workbook_path) {
                    Some(backup) => println!("Backup created: {}", backup.display()),
                    None => println!("Backup failed; continuing."),
                }
            }
            let mut workbook = Workbook::load(&workbook_path)
                .with_context(|| format!("reading workbook {}", workbook_path.display()))?;
            let count = store.compile_into(&mut workbook)?;
            workbook.save(&workbook_path)?;
            println!(
                "Compiled {} requests into the leave region of {}",
                count,
                workbook_path.display()
            );
        }
    }
    Ok(())
}
