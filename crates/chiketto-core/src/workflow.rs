//! Kanban workflow categories and the state mapping that drives them
//!
//! Every Jira status lands in one of three categories:
//! - optional: work the team has not committed to and may discard
//! - committed: the team will deliver it; the lead time clock is running
//! - delivered: accepted by the requestor (or explicitly not delivered)

use serde::{Deserialize, Serialize};

use crate::model::State;

/// Category of a workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Optional,
    Committed,
    Delivered,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Optional => "optional",
            Category::Committed => "committed",
            Category::Delivered => "delivered",
        }
    }
}

/// Which timestamp the extraction window is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionType {
    /// Issues created inside the window
    #[default]
    Created,
    /// Issues last modified inside the window
    Modified,
}

impl SelectionType {
    pub const VARIANTS: [&'static str; 2] = ["created", "modified"];

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionType::Created => "created",
            SelectionType::Modified => "modified",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "created" => Some(SelectionType::Created),
            "modified" => Some(SelectionType::Modified),
            _ => None,
        }
    }

    /// The Jira field the window is matched against
    pub fn jql_field(&self) -> &'static str {
        match self {
            SelectionType::Created => "created",
            SelectionType::Modified => "updated",
        }
    }
}

/// Maps Jira status names onto Kanban categories
///
/// Names are compared lower-cased. Anything not listed as optional or
/// delivered is treated as committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Workflow {
    /// States where work may still be discarded
    pub optional: Vec<String>,
    /// States where work has left the system
    pub delivered: Vec<String>,
    /// State marking work as potentially committable
    pub accepted: String,
    /// State marking work as delivered to the requestor
    pub done: String,
}

impl Default for Workflow {
    fn default() -> Self {
        Self {
            optional: vec!["requested".to_string(), "accepted".to_string()],
            delivered: vec!["done".to_string(), "not delivered".to_string()],
            accepted: "accepted".to_string(),
            done: "done".to_string(),
        }
    }
}

impl Workflow {
    /// Name of the synthetic state every issue starts in
    pub const REQUESTED: &'static str = "requested";

    /// Lower-case every configured name so lookups are case-insensitive
    pub fn normalized(self) -> Self {
        let lower = |v: Vec<String>| v.into_iter().map(|s| s.to_lowercase()).collect();
        Self {
            optional: lower(self.optional),
            delivered: lower(self.delivered),
            accepted: self.accepted.to_lowercase(),
            done: self.done.to_lowercase(),
        }
    }

    /// Resolve the category of a (lower-case) state name
    pub fn category(&self, state: &str) -> Category {
        if self.optional.iter().any(|s| s == state) {
            Category::Optional
        } else if self.delivered.iter().any(|s| s == state) {
            Category::Delivered
        } else {
            Category::Committed
        }
    }

    /// Build a state from a raw Jira status name
    pub fn state(&self, status: &str) -> State {
        let name = status.to_lowercase();
        let category = self.category(&name);
        State { name, category }
    }
}
