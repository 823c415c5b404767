//! Count deploys per month from inbox deploy notifications
//!
//! Deploy tooling posts to the flow's team inbox with tags like
//! `deployment, deploy_end, production, <app>`. This queries those messages
//! for each application concurrently and tallies them by calendar month.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate, TimeZone};
use flowdock::{FlowdockClient, Message, MessagesListOptions, TagMode};

use super::Session;

/// Page size; a full page means older deploys were cut off.
const LIMIT: u32 = 100;

#[derive(Debug, PartialEq)]
pub struct DeployCount {
    pub app: String,
    pub total: usize,
    /// Keyed by the first day of each month
    pub per_month: BTreeMap<NaiveDate, usize>,
    /// The result filled a whole page, so the oldest month is incomplete.
    pub truncated: bool,
}

impl DeployCount {
    /// Count non-preproduction deploys by calendar month in `tz`.
    fn tally<Tz: TimeZone>(app: String, messages: &[Message], limit: usize, tz: &Tz) -> Self {
        let mut per_month = BTreeMap::new();
        let mut total = 0;

        for msg in messages.iter().filter(|m| !m.has_tag("preproduction")) {
            total += 1;
            if let Some(month) = msg.sent.and_then(|t| {
                let local = t.with_timezone(tz);
                NaiveDate::from_ymd_opt(local.year(), local.month(), 1)
            }) {
                *per_month.entry(month).or_insert(0) += 1;
            }
        }

        Self {
            app,
            total,
            per_month,
            truncated: messages.len() >= limit,
        }
    }

    fn display(&self) {
        println!();
        println!("Application: {}", self.app);
        println!();

        let oldest = self.per_month.keys().next().copied();
        for (month, count) in &self.per_month {
            let partial = if self.truncated && Some(*month) == oldest {
                " (partial)"
            } else {
                ""
            };
            println!("{} {}{}", month.format("%Y-%b"), count, partial);
        }

        println!();
        println!("  Total: {}", self.total);
        println!();
    }
}

async fn count_deploys(
    client: &FlowdockClient,
    org: &str,
    flow: &str,
    environment: &str,
    app: &str,
) -> Result<DeployCount> {
    let opts = MessagesListOptions {
        event: Some("mail".to_string()),
        limit: Some(LIMIT),
        tags: vec![
            "deployment".to_string(),
            "deploy_end".to_string(),
            environment.to_string(),
            app.to_string(),
        ],
        tag_mode: Some(TagMode::And),
        search: Some(format!("{} to {}", environment, environment)),
        ..Default::default()
    };

    let (messages, _) = client
        .messages()
        .list(org, flow, Some(&opts))
        .await
        .with_context(|| format!("Failed to list deploys for {}", app))?;

    tracing::debug!("{} deploy messages for {}", messages.len(), app);
    Ok(DeployCount::tally(
        app.to_string(),
        &messages,
        LIMIT as usize,
        &Local,
    ))
}

pub async fn run(
    session: &Session,
    apps: &[String],
    environment: &str,
    org: &str,
    flow: &str,
) -> Result<()> {
    let counts = futures::future::try_join_all(
        apps.iter()
            .map(|app| count_deploys(&session.client, org, flow, environment, app)),
    )
    .await?;

    for count in &counts {
        count.display();
    }
    Ok(())
}
