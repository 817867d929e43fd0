//! Lenient date parsing for spreadsheet cells.
//!
//! Store spreadsheets carry dates typed by hand: `Mar-22` (Spanish month
//! abbreviation, meaning the end of that month), `5/08/2023`, `19/08/23`, or an
//! ISO date possibly followed by a time.

use chrono::{Datelike, NaiveDate};

const MONTHS: [(&str, u32); 12] = [
    ("ene", 1), ("feb", 2), ("mar", 3), ("abr", 4), ("may", 5), ("jun", 6),
    ("jul", 7), ("ago", 8), ("set", 9), ("oct", 10), ("nov", 11), ("dic", 12),
];

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    month_year(raw)
        .or_else(|| day_month_year(raw))
        .or_else(|| iso(raw))
}

/// `d/m/yyyy`, the format exports write back out.
pub fn format_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.day(), date.month(), date.year())
}

fn month_year(raw: &str) -> Option<NaiveDate> {
    let (month, year) = raw.split_once('-')?;
    let month = month.to_lowercase();
    let (_, month) = MONTHS.iter().find(|(name, _)| *name == month)?;
    if year.len() != 2 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = 2000 + year.parse::<i32>().ok()?;
    last_day_of_month(year, *month)
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

fn day_month_year(raw: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = raw.split('/').collect();
    let [day, month, year] = parts.as_slice() else {
        return None;
    };
    let year: i32 = match year.len() {
        4 => year.parse().ok()?,
        2 => 2000 + year.parse::<i32>().ok()?,
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
}

fn iso(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.split('T').next()?;
    NaiveDate::parse_from_str(date_part.get(..10)?, "%Y-%m-%d").ok()
}
