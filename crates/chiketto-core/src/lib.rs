//! Chiketto Core - Jira extraction and Kanban enrichment
//!
//! Pulls issues out of a Jira Cloud project, folds their changelog into a
//! sequence of workflow events and derives the attributes Kanban analysis
//! needs: commitment point, delivery date and lead time.

pub mod config;
pub mod error;
pub mod jira;
pub mod jql;
pub mod model;
pub mod output;
pub mod parser;
pub mod paths;
pub mod workflow;

pub use config::Config;
pub use error::{Error, Result};
pub use jira::{Client, Credentials, IssueSource};
pub use model::{Event, State, User, WorkItem};
pub use output::OutputFormat;
pub use paths::Paths;
pub use workflow::{Category, SelectionType, Workflow};
