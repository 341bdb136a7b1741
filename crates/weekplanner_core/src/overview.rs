//! Weekly overview table and cell-label parsing.
//!
//! # Responsibility
//! - Lay the schedule out as a time x weekday grid with per-day totals.
//! - Recognize task labels in rendered cells.
//!
//! # Invariants
//! - Rows follow the sorted time axis; every row has one cell per weekday.
//! - Totals are computed from the schedule at build time and never cached
//!   across builds.

use crate::model::clock::format_hhmm;
use crate::model::mirror::task_label;
use crate::model::schedule::{scoring, Schedule};
use crate::model::weekday::Weekday;
use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};

/// Text shown in a cell with no task.
pub const EMPTY_CELL: &str = "-";

static CELL_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+)\((\d+)/(\d+)\)$").expect("valid cell label regex"));

/// Parsed `name(earned/priority)` cell label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellLabel {
    pub name: String,
    pub earned: u32,
    pub priority: u32,
}

impl CellLabel {
    /// Returns `None` for empty cells and free text.
    pub fn parse(text: &str) -> Option<Self> {
        let captures = CELL_LABEL_RE.captures(text.trim())?;
        Some(Self {
            name: captures.get(1)?.as_str().to_string(),
            earned: captures.get(2)?.as_str().parse().ok()?,
            priority: captures.get(3)?.as_str().parse().ok()?,
        })
    }
}

/// One time slot across the week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewRow {
    pub time: NaiveTime,
    /// Monday first.
    pub cells: [String; 7],
}

impl OverviewRow {
    pub fn time_text(&self) -> String {
        format_hhmm(self.time)
    }

    pub fn cell(&self, weekday: Weekday) -> &str {
        &self.cells[weekday.position()]
    }
}

/// Earned and possible points of one weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayTotals {
    pub weekday: Weekday,
    pub earned: u32,
    pub possible: u32,
}

impl Display for DayTotals {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.earned, self.possible)
    }
}

/// Snapshot of the weekly grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyOverview {
    rows: Vec<OverviewRow>,
    totals: [DayTotals; 7],
}

impl WeeklyOverview {
    pub fn build(schedule: &Schedule) -> Self {
        let rows = schedule
            .collect_sorted_times()
            .into_iter()
            .map(|time| OverviewRow {
                time,
                cells: Weekday::ALL.map(|weekday| {
                    schedule
                        .get(weekday, time)
                        .map_or_else(|| EMPTY_CELL.to_string(), task_label)
                }),
            })
            .collect();
        let totals = Weekday::ALL.map(|weekday| DayTotals {
            weekday,
            earned: schedule.count_points(weekday, scoring::earned),
            possible: schedule.count_points(weekday, scoring::possible),
        });
        Self { rows, totals }
    }

    pub fn rows(&self) -> &[OverviewRow] {
        &self.rows
    }

    /// Monday-first totals.
    pub fn totals(&self) -> &[DayTotals; 7] {
        &self.totals
    }

    pub fn totals_for(&self, weekday: Weekday) -> DayTotals {
        self.totals[weekday.position()]
    }

    pub fn week_earned(&self) -> u32 {
        self.totals.iter().map(|day| day.earned).sum()
    }

    pub fn week_possible(&self) -> u32 {
        self.totals.iter().map(|day| day.possible).sum()
    }
}

impl Display for WeeklyOverview {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let width = self
            .rows
            .iter()
            .flat_map(|row| row.cells.iter().map(String::len))
            .chain(Weekday::ALL.iter().map(|weekday| weekday.as_str().len()))
            .max()
            .unwrap_or(0);

        write!(f, "{:<5}", "TIME")?;
        for weekday in Weekday::ALL {
            write!(f, " | {:<width$}", weekday.as_str())?;
        }
        writeln!(f)?;

        for row in &self.rows {
            write!(f, "{:<5}", row.time_text())?;
            for cell in &row.cells {
                write!(f, " | {cell:<width$}")?;
            }
            writeln!(f)?;
        }

        write!(f, "{:<5}", "SUM")?;
        for day in &self.totals {
            write!(f, " | {:<width$}", day.to_string())?;
        }
        writeln!(f)
    }
}
