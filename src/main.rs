//! trademark-mcp: trademark search & filing tools for MCP clients.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;

use trademark_mcp::backend::HttpBackend;
use trademark_mcp::config::{load_config, ServerConfig};
use trademark_mcp::mcp::http::run_http_server;
use trademark_mcp::mcp::registry::{resource_registry, tool_registry};
use trademark_mcp::mcp::{run_server, Dispatcher, TrademarkServer};
use trademark_mcp::observability::init_logging;

#[derive(Parser, Debug)]
#[command(name = "trademark-mcp", author, version, about, long_about = None)]
struct Cli {
    /// Config file, merged over the user and project config files
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve MCP over stdio (default) or HTTP
    Serve {
        /// Serve over HTTP instead of stdio; ADDR defaults to `http.bind`
        #[arg(long, value_name = "ADDR")]
        http: Option<Option<String>>,
    },
    /// Print the tool catalog as JSON
    Tools,
    /// Print the resource catalog as JSON
    Resources,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    match cli.command.unwrap_or(Command::Serve { http: None }) {
        Command::Tools => {
            let tools: Vec<_> = tool_registry()
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "inputSchema": t.input_schema.to_json_schema(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&tools)?);
        }
        Command::Resources => {
            println!("{}", serde_json::to_string_pretty(&resource_registry())?);
        }
        Command::Serve { http } => {
            let project_root = std::env::current_dir().ok();
            let config = load_config(cli.config.as_deref(), project_root.as_deref())?;
            let server = build_server(&config)?;
            match http {
                None => run_server(server).await?,
                Some(addr) => {
                    let addr = addr.unwrap_or_else(|| config.http.bind.clone());
                    run_http_server(server, &addr).await?;
                }
            }
        }
    }
    Ok(())
}

fn build_server(config: &ServerConfig) -> Result<TrademarkServer, Box<dyn std::error::Error>> {
    let backend = HttpBackend::new(&config.backend)?;
    tracing::info!(base_url = backend.base_url(), "using trademark backend");
    let dispatcher = Dispatcher::with_config(Arc::new(backend), &config.dispatch);
    Ok(TrademarkServer::new(dispatcher))
}
