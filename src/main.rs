//! flowdock - command-line client for the Flowdock chat API
//!
//! Reads flows and messages, posts to flows and team inboxes, and follows
//! live event streams.

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use flowdock::{InboxCreateOptions, MessagesListOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::{Globals, Session};

#[derive(Parser)]
#[command(name = "flowdock")]
#[command(about = "Command-line client for Flowdock", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// OAuth client ID
    #[arg(long, global = true)]
    id: Option<String>,

    /// OAuth client secret
    #[arg(long, global = true)]
    secret: Option<String>,

    /// Token cache file
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    /// REST API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate with Flowdock (OAuth2 authorization code)
    Login {
        /// Authorization code from the URL printed by a previous run
        #[arg(short, long)]
        code: Option<String>,

        /// Re-authenticate even if a valid token is cached
        #[arg(short, long)]
        force: bool,
    },

    /// Remove the cached token
    Logout,

    /// Show current authentication status
    Status,

    /// List flows
    Flows {
        /// Include flows you have not joined
        #[arg(short, long)]
        all: bool,

        /// Include flow members
        #[arg(short, long)]
        users: bool,
    },

    /// Show a single flow
    Flow { org: String, flow: String },

    /// Read recent messages of a flow
    Messages {
        /// Organization (defaults to config)
        org: Option<String>,

        /// Flow (defaults to config)
        flow: Option<String>,

        /// Maximum number of messages to show
        #[arg(short, long, default_value = "20")]
        limit: u32,

        /// Only messages of this event kind
        #[arg(short, long)]
        event: Option<String>,

        /// Only messages with all of these tags
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Full-text search
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Send a message to a flow
    Send {
        org: String,
        flow: String,

        /// Message content
        message: String,

        /// Post as a comment on this message id
        #[arg(long)]
        comment_to: Option<i64>,

        /// Tags to attach
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// List users, optionally of one flow
    Users {
        #[arg(long, requires = "flow")]
        org: Option<String>,

        #[arg(long, requires = "org")]
        flow: Option<String>,
    },

    /// List organizations
    Orgs,

    /// Post to a flow's team inbox
    Inbox {
        /// The flow's API token
        flow_token: String,

        #[arg(long)]
        subject: String,

        /// Message body (HTML)
        #[arg(long)]
        content: String,

        #[arg(long, default_value = "flowdock-cli")]
        source: String,

        #[arg(long)]
        from_address: String,

        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Follow flows live (ORG/FLOW, defaults to the configured flow)
    Stream {
        flows: Vec<String>,

        /// Recent messages to print first per flow (0 disables)
        #[arg(long, default_value = "100")]
        history: u32,
    },

    /// Count deploys per month from deploy notifications
    Deploys {
        /// Application tags to count
        #[arg(required = true)]
        apps: Vec<String>,

        #[arg(short, long, default_value = "production")]
        environment: String,

        /// Organization (defaults to config)
        #[arg(long)]
        organization: Option<String>,

        /// Flow receiving deploy notifications (defaults to config)
        #[arg(long)]
        flow: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let globals = Globals {
        client_id: cli.id,
        client_secret: cli.secret,
        cache: cli.cache,
        api_url: cli.api_url,
    };

    match cli.command {
        Commands::Login { code, force } => {
            tracing::info!("Starting authentication flow...");
            commands::login::login(&globals, code.as_deref(), force).await?;
        }
        Commands::Logout => {
            commands::login::logout(&globals).await?;
        }
        Commands::Status => {
            commands::login::status(&globals).await?;
        }
        Commands::Flows { all, users } => {
            let session = Session::authenticated(&globals).await?;
            commands::resources::list_flows(&session, all, users).await?;
        }
        Commands::Flow { org, flow } => {
            let session = Session::authenticated(&globals).await?;
            commands::resources::show_flow(&session, &org, &flow).await?;
        }
        Commands::Messages {
            org,
            flow,
            limit,
            event,
            tags,
            search,
        } => {
            let session = Session::authenticated(&globals).await?;
            let (org, flow) = session.config.flow_ref(org, flow)?;
            let opts = MessagesListOptions {
                event,
                limit: Some(limit),
                tags,
                search,
                ..Default::default()
            };
            commands::resources::read_messages(&session, &org, &flow, &opts).await?;
        }
        Commands::Send {
            org,
            flow,
            message,
            comment_to,
            tags,
        } => {
            let session = Session::authenticated(&globals).await?;
            commands::resources::send_message(&session, &org, &flow, &message, comment_to, tags)
                .await?;
        }
        Commands::Users { org, flow } => {
            let session = Session::authenticated(&globals).await?;
            commands::resources::list_users(&session, org.zip(flow)).await?;
        }
        Commands::Orgs => {
            let session = Session::authenticated(&globals).await?;
            commands::resources::list_organizations(&session).await?;
        }
        Commands::Inbox {
            flow_token,
            subject,
            content,
            source,
            from_address,
            tags,
        } => {
            let client = commands::anonymous_client(&globals)?;
            let opts = InboxCreateOptions {
                source: Some(source),
                from_address: Some(from_address),
                subject: Some(subject),
                content: Some(content),
                tags,
                ..Default::default()
            };
            commands::resources::post_inbox(&client, &flow_token, &opts).await?;
        }
        Commands::Stream { flows, history } => {
            let session = Session::authenticated(&globals).await?;
            let flows = if flows.is_empty() {
                vec![session.config.flow_ref(None, None)?]
            } else {
                flows
                    .iter()
                    .map(|f| commands::parse_flow_ref(f))
                    .collect::<Result<Vec<_>>>()?
            };
            commands::stream::run(&session, &flows, history).await?;
        }
        Commands::Deploys {
            apps,
            environment,
            organization,
            flow,
        } => {
            let session = Session::authenticated(&globals).await?;
            let (org, flow) = session.config.flow_ref(organization, flow)?;
            commands::deploys::run(&session, &apps, &environment, &org, &flow).await?;
        }
    }

    Ok(())
}
