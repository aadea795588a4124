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

//! Write-only XLSX export of the solved output regions, for publishing the
//! rota to spreadsheet consumers.

use crate::error::StoreError;
use crate::workbook::Workbook;
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet};
use std::path::Path;

fn header(worksheet: &mut Worksheet, titles: &[&str]) -> Result<(), StoreError> {
    let bold = Format::new().set_bold();
    for (col, title) in titles.iter().enumerate() {
        worksheet.write_with_format(0, col as u16, *title, &bold)?;
    }
    Ok(())
}

pub fn export_xlsx(workbook: &Workbook, path: &Path) -> Result<(), StoreError> {
    let mut book = XlsxWorkbook::new();

    let sheet = book.add_worksheet();
    sheet.set_name("WeekAssignments")?;
    header(
        sheet,
        &[
            "WeekMonday",
            "AB1",
            "AB2",
            "DMonThu",
            "WeekendAB",
            "WeekendMixed",
            "Status",
            "Objective",
        ],
    )?;
    for (i, row) in workbook.week_assignments.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write(r, 0, row.monday.to_string())?;
        sheet.write(r, 1, row.ab1.as_ref())?;
        sheet.write(r, 2, row.ab2.as_ref())?;
        sheet.write(r, 3, row.d_mon_thu.as_ref())?;
        sheet.write(r, 4, row.weekend_ab.as_ref())?;
        sheet.write(r, 5, row.weekend_mixed.as_ref())?;
        sheet.write(r, 6, row.status.as_ref())?;
        if let Some(objective) = row.objective {
            sheet.write(r, 7, objective as f64)?;
        }
    }

    let sheet = book.add_worksheet();
    sheet.set_name("Rota")?;
    header(sheet, &["Date", "Day", "A", "B", "D", "Flags"])?;
    for (i, row) in workbook.rota.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write(r, 0, row.day.to_string())?;
        sheet.write(r, 1, row.weekday.as_ref())?;
        sheet.write(r, 2, row.a.as_ref())?;
        sheet.write(r, 3, row.b.as_ref())?;
        sheet.write(r, 4, row.d.as_ref())?;
        sheet.write(r, 5, row.flags.as_ref())?;
    }

    let sheet = book.add_worksheet();
    sheet.set_name("Dashboard")?;
    header(
        sheet,
        &[
            "Name",
            "WTE",
            "A",
            "B",
            "D",
            "Total",
            "ExpectedTotal",
            "DeltaTotal",
            "BH",
            "ExpectedBH",
            "DeltaBH",
            "WeekendBlocks",
            "ConsecWeekendPairs",
        ],
    )?;
    for (i, row) in workbook.dashboard.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write(r, 0, row.name.as_ref())?;
        sheet.write(r, 1, row.wte)?;
        sheet.write(r, 2, row.a)?;
        sheet.write(r, 3, row.b)?;
        sheet.write(r, 4, row.d)?;
        sheet.write(r, 5, row.total)?;
        sheet.write(r, 6, row.expected_total)?;
        sheet.write(r, 7, row.delta_total)?;
        sheet.write(r, 8, row.bank_holidays)?;
        sheet.write(r, 9, row.expected_bank_holidays)?;
        sheet.write(r, 10, row.delta_bank_holidays)?;
        sheet.write(r, 11, row.weekend_blocks)?;
        sheet.write(r, 12, row.consecutive_weekend_pairs)?;
    }

    book.save(path)?;
    Ok(())
}
