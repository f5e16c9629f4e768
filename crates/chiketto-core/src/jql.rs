//! JQL queries for the extraction window

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::workflow::SelectionType;

/// Inclusive range of calendar dates to extract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

/// Quote a value as a JQL string literal
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Build the search query for one project
///
/// Jira compares date-only literals against midnight, so the upper bound is
/// expressed as "before the day after the end date".
pub fn project_query(project: &str, window: &DateWindow, selection: SelectionType) -> String {
    let field = selection.jql_field();
    let upper = match window.end.succ_opt() {
        Some(next) => format!("{} < \"{}\"", field, next),
        None => format!("{} <= \"{}\"", field, window.end),
    };

    format!(
        "project = {} AND {} >= \"{}\" AND {} ORDER BY {} ASC",
        quote(project),
        field,
        window.start,
        upper,
        field
    )
}
