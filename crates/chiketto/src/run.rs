//! Extraction pipeline: config + invocation -> Jira -> work items -> output

use anyhow::{Context, Result};
use chrono::Local;
use std::time::Duration;
use tracing::{debug, info};

use chiketto_core::jira::{self, IssueSource};
use chiketto_core::jql::DateWindow;
use chiketto_core::{output, Client, Config, Paths, SelectionType, WorkItem, Workflow};

use crate::cli::Invocation;

/// Run one extraction
pub async fn run(invocation: Invocation) -> Result<()> {
    if invocation.projects.is_empty() {
        debug!("no projects given, nothing to extract");
        return Ok(());
    }

    let config_path = invocation
        .config
        .clone()
        .unwrap_or_else(|| Paths::new().config_file());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;

    let client = connect(&invocation, &config)?;
    let window = invocation.window(Local::now().date_naive());
    info!(
        projects = invocation.projects.len(),
        start = %window.start,
        end = %window.end,
        selection = invocation.selection_type.as_str(),
        "extracting"
    );

    let items = extract(
        &client,
        &invocation.projects,
        &window,
        invocation.selection_type,
        &config.workflow,
        config.page_size,
    )
    .await?;

    let format = invocation.format.unwrap_or(config.format);
    let mut out = output::open(invocation.output.as_deref()).context("Failed to open output")?;
    output::write_items(&mut out, &items, format).context("Failed to write work items")?;
    info!(count = items.len(), format = format.as_str(), "done");

    Ok(())
}

/// Build the Jira client from the invocation, falling back to config
fn connect(invocation: &Invocation, config: &Config) -> Result<Client> {
    let credentials = invocation.credentials();
    if credentials.is_none() {
        debug!("no credentials given, calling Jira anonymously");
    }

    let client = match &invocation.jira_url {
        Some(url) => Client::with_base_url(url.as_str(), credentials)?,
        None => {
            let host = invocation
                .jira_host
                .as_deref()
                .or(config.jira_host.as_deref())
                .context(
                    "No Jira host configured. \
                     Use --jira-host, JIRA_HOST or jira_host in the config file",
                )?;
            Client::new(host, credentials)?
        }
    };
    Ok(client.with_timeout(Duration::from_secs(config.timeout_secs))?)
}

/// Extract every project in order
pub async fn extract<S: IssueSource>(
    source: &S,
    projects: &[String],
    window: &DateWindow,
    selection: SelectionType,
    workflow: &Workflow,
    page_size: u32,
) -> Result<Vec<WorkItem>> {
    let mut items = Vec::new();

    for project in projects {
        let found = jira::find_work_items(source, project, window, selection, workflow, page_size)
            .await
            .with_context(|| format!("Failed to extract project {}", project))?;
        info!(project = %project, count = found.len(), "extracted");
        items.extend(found);
    }

    Ok(items)
}
