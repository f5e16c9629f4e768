//! Kanban view of a Jira issue
//!
//! A `WorkItem` is a stripped-down, Kanban-centric view of the issue: who
//! asked for it, where it sits in the workflow and how it moved through it.
//! The derived fields are computed once, when the item is built.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::workflow::{Category, Workflow};

pub type Timestamp = DateTime<FixedOffset>;

/// A Jira user (creator, assignee or author of a change)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Display name
    pub name: String,
    /// Email address; empty when the account hides it
    pub email: String,
}

/// Where an issue sits in the workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Lower-cased Jira status
    pub name: String,
    pub category: Category,
}

/// A transition into a new state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub state: State,
    pub changed_on: Timestamp,
    /// Who made the change
    pub agent: User,
}

/// Facts read straight off the issue, before enrichment
#[derive(Debug, Clone)]
pub struct Issue {
    pub key: String,
    pub summary: String,
    pub requested_by: User,
    pub assigned_to: Option<User>,
    pub class_of_service: Option<String>,
    pub events: Vec<Event>,
    pub current_state: State,
    pub created_on: Timestamp,
    pub last_modified: Timestamp,
}

/// A Jira issue enriched with Kanban attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub key: String,
    pub summary: String,
    pub requested_by: User,
    pub assigned_to: Option<User>,
    /// Derived from the Jira priority
    pub class_of_service: Option<String>,
    /// Status changes in chronological order
    pub events: Vec<Event>,
    pub current_state: State,
    pub created_on: Timestamp,
    pub last_modified: Timestamp,

    /// Whether the work has been delivered
    pub is_done: bool,
    /// Calendar days from commitment to delivery, inclusive
    pub lead_time: Option<i64>,
    /// State in which the team committed to the work
    pub commitment_point: Option<String>,
    pub accepted_on: Option<Timestamp>,
    pub committed_on: Option<Timestamp>,
    pub delivered_on: Option<Timestamp>,
}

impl WorkItem {
    /// Enrich an issue using the given workflow mapping
    pub fn from_issue(issue: Issue, workflow: &Workflow) -> Self {
        let mut events = issue.events;
        events.sort_by_key(|e| e.changed_on);

        let is_done = issue.current_state.name == workflow.done;
        let accepted_on = first_entry(&events, &workflow.accepted);
        let commitment = events
            .iter()
            .find(|e| e.state.category == Category::Committed);
        let commitment_point = commitment.map(|e| e.state.name.clone());
        let committed_on = commitment.map(|e| e.changed_on);

        let delivered_on = if is_done {
            first_entry(&events, &workflow.done)
        } else {
            None
        };
        let lead_time = match (committed_on, delivered_on) {
            (Some(start), Some(end)) => Some(lead_time_days(start, end)),
            _ => None,
        };

        Self {
            key: issue.key,
            summary: issue.summary,
            requested_by: issue.requested_by,
            assigned_to: issue.assigned_to,
            class_of_service: issue.class_of_service,
            events,
            current_state: issue.current_state,
            created_on: issue.created_on,
            last_modified: issue.last_modified,
            is_done,
            lead_time,
            commitment_point,
            accepted_on,
            committed_on,
            delivered_on,
        }
    }
}

/// When the issue first entered the named state
fn first_entry(events: &[Event], state: &str) -> Option<Timestamp> {
    events
        .iter()
        .find(|e| e.state.name == state)
        .map(|e| e.changed_on)
}

/// Inclusive number of calendar days between two timestamps
pub fn lead_time_days(start: Timestamp, end: Timestamp) -> i64 {
    (end.date_naive() - start.date_naive()).num_days().abs() + 1
}
