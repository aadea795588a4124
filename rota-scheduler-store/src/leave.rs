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

//! Leave requests stored one JSON file per request in a synced folder,
//! which avoids workbook write conflicts between requesters. Requests are
//! compiled into the workbook's leave region as a controlled step.

use crate::error::StoreError;
use crate::workbook::{LeaveRow, Workbook};
use chrono::{NaiveDate, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaveType {
    Annual,
    Study,
    #[serde(rename = "NOC")]
    Noc,
}

impl LeaveType {
    /// Normalizes free-text input the way the entry frontends do;
    /// unrecognized values fall back to Annual with a warning.
    pub fn normalize(value: &str) -> LeaveType {
        match value.trim().to_lowercase().as_str() {
            "annual" => LeaveType::Annual,
            "study" => LeaveType::Study,
            "noc" => LeaveType::Noc,
            other => {
                warn!("unknown leave type '{}', defaulting to Annual", other);
                LeaveType::Annual
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LeaveType::Annual => "Annual",
            LeaveType::Study => "Study",
            LeaveType::Noc => "NOC",
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub request_id: Uuid,
    pub name: Box<str>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
    pub approved: bool,
    #[serde(default)]
    pub notes: String,
    pub created_at: Box<str>,
    pub updated_at: Box<str>,
}

fn now_iso() -> Box<str> {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string().into()
}

fn validate_dates(start: NaiveDate, end: NaiveDate) -> Result<(), StoreError> {
    if end < start {
        return Err(StoreError::LeaveValidation { start, end });
    }
    Ok(())
}

/// Directory of `<request-id>.json` files.
#[derive(Debug, Clone)]
pub struct LeaveStore {
    dir: PathBuf,
}

impl LeaveStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        Ok(LeaveStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn request_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    /// Loads every request, sorted by (start date, name). Files that fail
    /// to parse are skipped with a warning rather than poisoning the whole
    /// store.
    pub fn load_all(&self) -> Result<Vec<LeaveRequest>, StoreError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        let mut requests = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StoreError::io(&self.dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|s| serde_json::from_str::<LeaveRequest>(&s).map_err(|e| e.to_string()))
            {
                Ok(request) => requests.push(request),
                Err(e) => warn!("skipping unreadable leave request {}: {}", path.display(), e),
            }
        }
        requests.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(requests)
    }

    /// Creates a new request with a fresh id and timestamps.
    pub fn create(
        &self,
        name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        leave_type: LeaveType,
        approved: bool,
        notes: &str,
    ) -> Result<LeaveRequest, StoreError> {
        validate_dates(start_date, end_date)?;
        let now = now_iso();
        let request = LeaveRequest {
            request_id: Uuid::new_v4(),
            name: name.trim().into(),
            start_date,
            end_date,
            leave_type,
            approved,
            notes: notes.trim().to_string(),
            created_at: now.clone(),
            updated_at: now,
        };
        self.save(&request)?;
        Ok(request)
    }

    /// Writes a request file, touching its update timestamp.
    pub fn upsert(&self, request: &mut LeaveRequest) -> Result<(), StoreError> {
        validate_dates(request.start_date, request.end_date)?;
        request.updated_at = now_iso();
        self.save(request)
    }

    fn save(&self, request: &LeaveRequest) -> Result<(), StoreError> {
        let path = self.request_path(request.request_id);
        let contents = serde_json::to_string_pretty(request).expect("request serialization");
        fs::write(&path, contents).map_err(|e| StoreError::io(path, e))
    }

    pub fn get(&self, id: Uuid) -> Result<LeaveRequest, StoreError> {
        let path = self.request_path(id);
        if !path.exists() {
            return Err(StoreError::UnknownRequest(id));
        }
        let contents = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
        serde_json::from_str(&contents).map_err(|source| StoreError::Shape { path, source })
    }

    pub fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let path = self.request_path(id);
        if !path.exists() {
            return Err(StoreError::UnknownRequest(id));
        }
        fs::remove_file(&path).map_err(|e| StoreError::io(path, e))
    }

    /// Replaces the workbook's leave region with every stored request, in
    /// (start date, name) order. Returns the number of compiled rows.
    pub fn compile_into(&self, workbook: &mut Workbook) -> Result<usize, StoreError> {
        let requests = self.load_all()?;
        let rows: Vec<LeaveRow> = requests
            .iter()
            .map(|r| LeaveRow {
                name: r.name.clone(),
                start: r.start_date,
                end: r.end_date,
                leave_type: r.leave_type,
                approved: r.approved,
            })
            .collect();
        let count = rows.len();
        workbook.replace_leave_region(rows);
        Ok(count)
    }
}

#[cfg(test)]
mod tests;
