use std::env;
use std::process::ExitCode;

use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use mcp_time_client::client::ToolClient;
use mcp_time_client::core::error::ClientResult;

/// MCP Time Client
///
/// Spawns an MCP time server as a subprocess, performs the initialize
/// handshake, and exercises the advertised tools over newline-delimited
/// JSON-RPC on stdio, printing each result.
#[derive(Parser, Debug)]
#[command(name = "mcp-time-client")]
#[command(about = "Drive an MCP time server end-to-end over stdio")]
#[command(version)]
struct Cli {
    /// Command used to launch the server, followed by any arguments.
    #[arg(
        value_name = "SERVER_COMMAND",
        default_value = "mcp-time-server",
        num_args = 1..,
        trailing_var_arg = true
    )]
    server_command: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging only if LOG_LEVEL environment variable is set
    if let Ok(log_level) = env::var("LOG_LEVEL") {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
            )
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .init();
    }

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> ClientResult<()> {
    let command = cli
        .server_command
        .first()
        .map(String::as_str)
        .unwrap_or("mcp-time-server");
    let args = cli.server_command.get(1..).unwrap_or(&[]);

    let client = ToolClient::connect(command, args).await?;
    println!("Connected to MCP server");

    // The subprocess is killed on close whether or not the drive succeeded.
    let outcome = drive(&client).await;
    client.close().await;
    outcome
}

async fn drive(client: &ToolClient) -> ClientResult<()> {
    let tools = client.list_tools().await?;
    println!("\nAvailable tools:");
    for tool in &tools.tools {
        println!(
            "  • {}: {}",
            tool.name,
            tool.description.as_deref().unwrap_or("")
        );
    }

    println!("\n--- Testing get_current_time ---");

    let iso = client.call_tool("get_current_time", json!({})).await?;
    println!("Default (ISO): {}", iso.text().unwrap_or(""));

    let unix = client
        .call_tool("get_current_time", json!({"format": "unix"}))
        .await?;
    println!("Unix timestamp: {}", unix.text().unwrap_or(""));

    let locale = client
        .call_tool(
            "get_current_time",
            json!({"format": "locale", "timezone": "America/New_York"}),
        )
        .await?;
    println!("NY locale: {}", locale.text().unwrap_or(""));

    println!("\n--- Testing get_timezone_offset ---");

    for timezone in ["America/New_York", "Europe/London", "Asia/Tokyo"] {
        let offset = client
            .call_tool("get_timezone_offset", json!({"timezone": timezone}))
            .await?;
        println!("{}", offset.text().unwrap_or(""));
    }

    println!("\nAll checks passed");
    Ok(())
}
