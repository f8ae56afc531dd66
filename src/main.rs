mod calendar;
mod config;
mod error;
mod mcp;
mod plugin;
mod tools;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::runtime::Handle;
use tracing_subscriber::EnvFilter;

use calendar::http::ReqwestHttp;
use plugin::host::{Bindings, PluginHost};
use tools::catalog::ToolId;
use tools::router::Dispatcher;
use tools::schema::SchemaDialect;

#[derive(Parser)]
#[command(name = "gcal-mcp", about = "Google Calendar tools over MCP")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over streamable HTTP (default)
    Serve,

    /// Serve MCP over newline-delimited stdin/stdout
    Stdio,

    /// Run one plugin-style call: {"toolId": ..., "arguments": {...}}
    Call {
        /// Request JSON; read from stdin when omitted
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Run one operation's handler directly on stdin/stdout
    Run {
        /// Tool id, e.g. list_events
        tool: String,

        /// Argument JSON; read from stdin when omitted
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Print the tool catalog
    Describe {
        /// Schema dialect: flat or function (defaults to GCAL_SCHEMA_DIALECT)
        #[arg(short, long)]
        dialect: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // stdout belongs to the protocol in stdio and call modes.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::Config::from_env()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config).await,
        Commands::Stdio => run_stdio(config).await,
        Commands::Call { input } => cmd_call(config, input).await,
        Commands::Run { tool, input } => cmd_run(config, &tool, input).await,
        Commands::Describe { dialect } => cmd_describe(config, dialect.as_deref()),
    }
}

/// Wire the reqwest-backed host into a dispatcher.
fn build_host(config: &config::Config) -> anyhow::Result<PluginHost> {
    let http = ReqwestHttp::new(
        Handle::current(),
        config.http_timeout_secs.map(Duration::from_secs),
    )
    .context("failed to build HTTP client")?;
    tracing::info!(
        credential_mode = %config.calendar.credential_mode,
        calendar_id = %config.calendar.calendar_id,
        "calendar host ready"
    );
    Ok(PluginHost::new(
        Arc::new(http),
        config.plugin_config.clone(),
        config.calendar.clone(),
    ))
}

fn stdout_bindings(input: String) -> Bindings {
    Bindings {
        input: Arc::new(move || Ok(input.clone())),
        output: Arc::new(|content: &str| println!("{content}")),
    }
}

/// Start the MCP HTTP server.
async fn run_server(config: config::Config) -> anyhow::Result<()> {
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(build_host(&config)?)));
    if config.mcp_auth_token.is_none() {
        tracing::warn!("MCP_AUTH_TOKEN is not set; /mcp accepts unauthenticated requests");
    }
    let app = mcp::router(dispatcher, config.mcp_auth_token.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.mcp_port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "MCP server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Serve MCP on stdin/stdout until stdin closes.
async fn run_stdio(config: config::Config) -> anyhow::Result<()> {
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(build_host(&config)?)));
    tracing::info!("MCP server running on stdio");
    mcp::stdio::serve_stdio(dispatcher).await?;
    Ok(())
}

/// The `--input` value, or all of stdin.
async fn read_input(input: Option<String>) -> anyhow::Result<String> {
    match input {
        Some(input) => Ok(input),
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("failed to read input from stdin")?;
            Ok(buf)
        }
    }
}

/// Run a single plugin call with stdout as the top-level output.
async fn cmd_call(config: config::Config, input: Option<String>) -> anyhow::Result<()> {
    let input = read_input(input).await?;

    let host = build_host(&config)?.with_bindings(stdout_bindings(input));
    let dispatcher = Dispatcher::new(Arc::new(host));
    let status = tokio::task::spawn_blocking(move || plugin::exports::call(&dispatcher)).await?;
    if status != 0 {
        anyhow::bail!("call failed with status {status}");
    }
    Ok(())
}

/// Run one handler with the argument JSON as its input.
async fn cmd_run(config: config::Config, tool: &str, input: Option<String>) -> anyhow::Result<()> {
    let id = tool
        .parse::<ToolId>()
        .map_err(|_| anyhow::anyhow!("unknown tool '{tool}'"))?;
    let input = read_input(input).await?;

    let host = build_host(&config)?.with_bindings(stdout_bindings(input));
    let dispatcher = Dispatcher::new(Arc::new(host));
    let status =
        tokio::task::spawn_blocking(move || plugin::exports::invoke(&dispatcher, id)).await?;
    if status != 0 {
        anyhow::bail!("{tool} failed with status {status}");
    }
    Ok(())
}

/// Print the catalog in the requested dialect.
fn cmd_describe(config: config::Config, dialect: Option<&str>) -> anyhow::Result<()> {
    let dialect = match dialect {
        Some(raw) => raw
            .parse::<SchemaDialect>()
            .map_err(|_| anyhow::anyhow!("unknown dialect '{raw}', expected flat or function"))?,
        None => config.schema_dialect,
    };

    let host = build_host(&config)?.with_bindings(stdout_bindings(String::new()));
    let dispatcher = Dispatcher::new(Arc::new(host));
    plugin::exports::describe(&dispatcher, dialect);
    Ok(())
}
