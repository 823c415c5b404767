//! Flows, messages, users, organizations and inbox commands

use anyhow::{Context, Result};
use flowdock::{
    Flow, FlowdockClient, FlowsListOptions, InboxCreateOptions, MessagesCreateOptions,
    MessagesListOptions, User,
};

use super::{render_content, Session};

fn display_flow(flow: &Flow) {
    let name = flow.name.as_deref().unwrap_or("[unnamed]");
    let org = flow
        .organization
        .as_ref()
        .and_then(|o| o.parameterized_name.as_deref())
        .unwrap_or("?");
    let param = flow.parameterized_name.as_deref().unwrap_or("?");

    println!("{}", name);
    println!("  Path: {}/{}", org, param);
    if let Some(ref id) = flow.id {
        println!("  ID:   {}", id);
    }
    if let Some(mentions) = flow.unread_mentions.filter(|&n| n > 0) {
        println!("  Unread mentions: {}", mentions);
    }
}

fn display_user(user: &User) {
    println!(
        "{:>8}  {:<20} {}",
        user.id.map(|id| id.to_string()).unwrap_or_default(),
        user.nick.as_deref().unwrap_or("?"),
        user.name.as_deref().unwrap_or("")
    );
}

/// List joined flows (or every accessible flow with `all`).
pub async fn list_flows(session: &Session, all: bool, users: bool) -> Result<()> {
    let opts = FlowsListOptions { users };
    let (flows, _) = session
        .client
        .flows()
        .list(all, Some(&opts))
        .await
        .context("Failed to list flows")?;

    println!("\nFlows:");
    println!("{:-<60}", "");

    if flows.is_empty() {
        println!("  (no flows found)");
        return Ok(());
    }

    for flow in &flows {
        display_flow(flow);
        println!();
    }

    Ok(())
}

pub async fn show_flow(session: &Session, org: &str, flow: &str) -> Result<()> {
    let (flow, _) = session
        .client
        .flows()
        .get(org, flow)
        .await
        .context("Failed to get flow")?;

    display_flow(&flow);
    if let Some(open) = flow.open {
        println!("  Open: {}", open);
    }
    if let Some(ref url) = flow.web_url {
        println!("  Web:  {}", url);
    }
    Ok(())
}

/// Print recent messages of a flow.
pub async fn read_messages(
    session: &Session,
    org: &str,
    flow: &str,
    opts: &MessagesListOptions,
) -> Result<()> {
    let (messages, _) = session
        .client
        .messages()
        .list(org, flow, Some(opts))
        .await
        .context("Failed to list messages")?;

    if messages.is_empty() {
        println!("(no messages)");
        return Ok(());
    }

    for msg in &messages {
        let time = msg
            .sent
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        println!(
            "[{}] {} ({}): {}",
            time,
            msg.user.as_deref().unwrap_or("?"),
            msg.event.as_deref().unwrap_or("?"),
            render_content(msg)
        );
    }

    Ok(())
}

/// Post a chat message, or a comment when `parent` is given.
pub async fn send_message(
    session: &Session,
    org: &str,
    flow: &str,
    content: &str,
    parent: Option<i64>,
    tags: Vec<String>,
) -> Result<()> {
    let (target, _) = session
        .client
        .flows()
        .get(org, flow)
        .await
        .context("Failed to look up flow")?;

    let event = if parent.is_some() { "comment" } else { "message" };
    let opts = MessagesCreateOptions {
        flow: target.id,
        event: event.to_string(),
        content: content.to_string(),
        message: parent,
        tags,
        ..Default::default()
    };

    let messages = session.client.messages();
    let (sent, _) = match parent {
        Some(_) => messages.create_comment(&opts).await,
        None => messages.create(&opts).await,
    }
    .context("Failed to send message")?;

    match sent.id {
        Some(id) => println!("Message sent (id {}).", id),
        None => println!("Message sent."),
    }
    Ok(())
}

/// List users, either of one flow or all visible users.
pub async fn list_users(session: &Session, flow_ref: Option<(String, String)>) -> Result<()> {
    let users = session.client.users();
    let (users, _) = match &flow_ref {
        Some((org, flow)) => users.list(org, flow).await,
        None => users.all().await,
    }
    .context("Failed to list users")?;

    for user in &users {
        display_user(user);
    }
    Ok(())
}

pub async fn list_organizations(session: &Session) -> Result<()> {
    let (orgs, _) = session
        .client
        .organizations()
        .all()
        .await
        .context("Failed to list organizations")?;

    println!("\nOrganizations:");
    println!("{:-<60}", "");

    for org in &orgs {
        println!(
            "{} ({})",
            org.name.as_deref().unwrap_or("[unnamed]"),
            org.parameterized_name.as_deref().unwrap_or("?")
        );
        if let (Some(count), Some(limit)) = (org.user_count, org.user_limit) {
            println!("  Users: {}/{}", count, limit);
        }
    }
    Ok(())
}

/// Post to a flow's team inbox.
pub async fn post_inbox(
    client: &FlowdockClient,
    flow_token: &str,
    opts: &InboxCreateOptions,
) -> Result<()> {
    client
        .inbox()
        .create(flow_token, opts)
        .await
        .context("Failed to post to team inbox")?;
    println!("Inbox message posted.");
    Ok(())
}
