//! Follow one or more flows live

use anyhow::{Context, Result};
use flowdock::{Message, MessagesListOptions};
use futures::StreamExt;

use super::{render_content, Session};

/// Event kinds that are noise in a terminal.
const HIDDEN_EVENTS: &[&str] = &[
    "user-edit",
    "file",
    "activity.user",
    "mail",
    "zendesk",
    "twitter",
    "tag-change",
];

fn is_displayed(msg: &Message) -> bool {
    msg.event
        .as_deref()
        .is_some_and(|event| !HIDDEN_EVENTS.contains(&event))
}

fn display_message(msg: &Message, flow: &str) {
    if !is_displayed(msg) {
        return;
    }
    println!(
        "\nMSG: {} {} {} {}",
        flow,
        msg.id.map(|id| id.to_string()).unwrap_or_default(),
        msg.event.as_deref().unwrap_or(""),
        render_content(msg)
    );
}

/// Print recent history of each flow, then stream all of them until every
/// stream closes or Ctrl+C.
pub async fn run(session: &Session, flows: &[(String, String)], history: u32) -> Result<()> {
    let token = session.access_token().await?;

    if history > 0 {
        let opts = MessagesListOptions {
            limit: Some(history),
            ..Default::default()
        };
        for (org, flow) in flows {
            let (messages, _) = session
                .client
                .messages()
                .list(org, flow, Some(&opts))
                .await
                .with_context(|| format!("Failed to list messages of {}/{}", org, flow))?;
            for msg in &messages {
                display_message(msg, flow);
            }
        }
    }

    let mut streams = Vec::with_capacity(flows.len());
    for (org, flow) in flows {
        let stream = session
            .client
            .messages()
            .stream(&token, org, flow)
            .await
            .with_context(|| format!("Failed to open stream for {}/{}", org, flow))?;
        let label = flow.clone();
        streams.push(stream.map(move |item| (label.clone(), item)));
    }

    println!("Waiting for events (Ctrl+C to stop)");

    let mut merged = futures::stream::select_all(streams);
    loop {
        tokio::select! {
            next = merged.next() => match next {
                Some((flow, Ok(msg))) => display_message(&msg, &flow),
                Some((flow, Err(e))) => tracing::warn!("{}: {:#}", flow, e),
                None => {
                    println!("All streams closed.");
                    return Ok(());
                }
            },
            _ = tokio::signal::ctrl_c() => {
                println!("Shutting down...");
                return Ok(());
            }
        }
    }
}
