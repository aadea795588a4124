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

//! Cycle calendar: dense day sequences and week anchors.

use chrono::{Datelike, Duration, NaiveDate};

/// Dense inclusive day sequence from `start` to `end`.
pub fn days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut d = start;
    while d <= end {
        out.push(d);
        d += Duration::days(1);
    }
    out
}

/// Week-anchor Mondays: the earliest Monday on or after `start`, stepped by
/// seven days while still on or before `end`. A `start` that already is a
/// Monday is the first anchor.
pub fn weeks(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let offset = (7 - start.weekday().num_days_from_monday()) % 7;
    let mut out = Vec::new();
    let mut monday = start + Duration::days(offset as i64);
    while monday <= end {
        out.push(monday);
        monday += Duration::days(7);
    }
    out
}

/// Monday of the ISO week containing `day`.
pub fn week_monday(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_monday() as i64)
}
