//! Parses Jira issue JSON into enriched work items
//!
//! Only the subset of the REST payload that the Kanban view needs is
//! modelled. The changelog is filtered down to status transitions; every
//! other kind of change is ignored.

use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{Event, Issue, Timestamp, User, WorkItem};
use crate::workflow::Workflow;

/// Timestamp layout used by the Jira REST API (`2021-01-01T12:00:00.000-0500`)
const JIRA_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

#[derive(Debug, Deserialize)]
pub struct RawIssue {
    pub key: String,
    pub fields: RawFields,
    #[serde(default)]
    pub changelog: Option<RawChangelog>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFields {
    pub summary: String,
    pub creator: Option<RawUser>,
    pub assignee: Option<RawUser>,
    #[serde(default)]
    pub priority: Option<RawNamed>,
    pub status: RawNamed,
    pub created: String,
    pub updated: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    pub display_name: String,
    #[serde(default)]
    pub email_address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawNamed {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawChangelog {
    #[serde(default)]
    pub histories: Vec<RawHistory>,
}

#[derive(Debug, Deserialize)]
pub struct RawHistory {
    #[serde(default)]
    pub author: Option<RawUser>,
    pub created: String,
    #[serde(default)]
    pub items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
pub struct RawItem {
    pub field: String,
    #[serde(rename = "toString", default)]
    pub to: Option<String>,
}

impl From<&RawUser> for User {
    fn from(raw: &RawUser) -> Self {
        Self {
            name: raw.display_name.clone(),
            email: raw.email_address.clone().unwrap_or_default(),
        }
    }
}

/// Parse a Jira timestamp
pub fn parse_timestamp(s: &str) -> Result<Timestamp> {
    DateTime::parse_from_str(s, JIRA_TIMESTAMP)
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .map_err(|_| Error::Timestamp(s.to_string()))
}

/// The lower-cased status a changelog entry moved the issue into
pub fn workflow_state(history: &RawHistory) -> Option<String> {
    history
        .items
        .iter()
        .find(|item| item.field == "status")
        .and_then(|item| item.to.as_deref())
        .map(str::to_lowercase)
}

/// Parse an issue from the JSON returned by the REST API
pub fn parse_issue(value: Value, workflow: &Workflow) -> Result<WorkItem> {
    let key = value
        .get("key")
        .and_then(Value::as_str)
        .unwrap_or("<unknown>")
        .to_string();
    let raw: RawIssue = serde_json::from_value(value).map_err(|e| Error::Parse {
        key,
        reason: e.to_string(),
    })?;
    parse_raw_issue(raw, workflow)
}

/// Parse an already-deserialized issue
pub fn parse_raw_issue(raw: RawIssue, workflow: &Workflow) -> Result<WorkItem> {
    let fields = raw.fields;
    let requested_by: User = fields
        .creator
        .as_ref()
        .map(User::from)
        .ok_or_else(|| Error::Parse {
            key: raw.key.clone(),
            reason: "issue has no creator".to_string(),
        })?;
    let created_on = issue_timestamp(&raw.key, &fields.created)?;
    let last_modified = issue_timestamp(&raw.key, &fields.updated)?;

    let mut events = vec![Event {
        state: workflow.state(Workflow::REQUESTED),
        changed_on: created_on,
        agent: requested_by.clone(),
    }];
    let histories = raw.changelog.map(|c| c.histories).unwrap_or_default();
    for history in &histories {
        if let Some(event) = workflow_event(&raw.key, history, workflow)? {
            events.push(event);
        }
    }

    let issue = Issue {
        key: raw.key,
        summary: fields.summary,
        requested_by,
        assigned_to: fields.assignee.as_ref().map(User::from),
        class_of_service: fields.priority.map(|p| p.name),
        events,
        current_state: workflow.state(&fields.status.name),
        created_on,
        last_modified,
    };

    Ok(WorkItem::from_issue(issue, workflow))
}

/// A timestamp belonging to `key`; failures name the issue
fn issue_timestamp(key: &str, s: &str) -> Result<Timestamp> {
    parse_timestamp(s).map_err(|e| Error::Parse {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Turn a changelog entry into an event, if it is a status change
fn workflow_event(key: &str, history: &RawHistory, workflow: &Workflow) -> Result<Option<Event>> {
    let Some(state) = workflow_state(history) else {
        return Ok(None);
    };
    // Changes made by deleted accounts carry no author
    let agent = history.author.as_ref().map(User::from).unwrap_or_else(|| User {
        name: "Anonymous".to_string(),
        email: String::new(),
    });

    Ok(Some(Event {
        state: workflow.state(&state),
        changed_on: issue_timestamp(key, &history.created)?,
        agent,
    }))
}
