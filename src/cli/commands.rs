use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use crud_mcp::catalog::ToolCatalog;
use crud_mcp::config::ServerConfig;
use crud_mcp::error::{BridgeError, Result};
use crud_mcp::http::{router, AppState};
use crud_mcp::registry::Registry;
use crud_mcp::rpc::McpHandler;
use crud_mcp::store::{SqliteStore, UserRepository};
use crud_mcp::users;
use crud_mcp::viewset::{model_name, Action};

#[derive(Parser)]
#[command(name = "crud-mcp")]
#[command(about = "Expose CRUD ViewSets as MCP tools over HTTP or stdio")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # List registered apps, ViewSets and generated tools
    crud-mcp scan

    # Serve MCP (POST /mcp/) and the REST API (/api/) on port 8001
    crud-mcp serve

    # Only expose the users app, on another port
    crud-mcp serve --port 9000 --app users

    # Serve MCP over stdin/stdout for local clients
    crud-mcp --db ./data.db stdio
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the SQLite database
    #[arg(long, default_value = ".crud-mcp.db")]
    pub db: std::path::PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the MCP endpoint and REST routes over HTTP
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(long, default_value_t = 8001)]
        port: u16,

        /// Only expose these apps (repeatable)
        #[arg(long = "app")]
        apps: Vec<String>,
    },
    /// Serve MCP over stdin/stdout
    Stdio {
        /// Only expose these apps (repeatable)
        #[arg(long = "app")]
        apps: Vec<String>,
    },
    /// Show discovered apps, ViewSets and the generated tool count
    Scan {
        /// Only include these apps (repeatable)
        #[arg(long = "app")]
        apps: Vec<String>,
    },
}

/// Opens the store and registers every resource module.
pub fn build_registry(config: &ServerConfig, apps: &[String]) -> Result<Arc<Registry>> {
    let store: Arc<dyn UserRepository> = Arc::new(SqliteStore::new(&config.db_path)?);
    let mut registry = Registry::new();
    users::register(&mut registry, store, config.page_size);

    if !apps.is_empty() {
        registry.retain_apps(apps);
    }
    info!(apps = registry.apps().len(), tools = registry.tools().len(), "Registry ready");
    Ok(Arc::new(registry))
}

pub async fn run_http_server(db_path: &Path, host: &str, port: u16, apps: &[String]) -> Result<()> {
    let config = ServerConfig::default().with_db_path(db_path);
    let registry = build_registry(&config, apps)?;
    let handler = McpHandler::new(Arc::clone(&registry), config);
    let app = router(AppState::new(handler, registry));

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| BridgeError::InvalidArgument(format!("Invalid address {}:{}: {}", host, port, e)))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("MCP endpoint at http://{}/mcp/, REST API at http://{}/api/", addr, addr);

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    Ok(())
}

pub async fn run_stdio_server(db_path: &Path, apps: &[String]) -> Result<()> {
    use crate::mcp::McpServer;
    use rmcp::ServiceExt;

    let config = ServerConfig::default().with_db_path(db_path);
    let registry = build_registry(&config, apps)?;
    let server = McpServer::new(McpHandler::new(registry, config));

    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let running = server
        .serve(transport)
        .await
        .map_err(|e| BridgeError::Transport(e.to_string()))?;
    running
        .waiting()
        .await
        .map_err(|e| BridgeError::Transport(e.to_string()))?;

    Ok(())
}

pub fn scan(db_path: &Path, apps: &[String]) -> Result<()> {
    let config = ServerConfig::default().with_db_path(db_path);
    let registry = build_registry(&config, apps)?;
    let viewsets = registry.viewsets();

    if viewsets.is_empty() {
        println!("No ViewSets found.");
    } else {
        println!("Found {} ViewSets:", viewsets.len());
        let mut current_app: Option<&str> = None;
        for (app, viewset) in &viewsets {
            if current_app != Some(app.as_str()) {
                println!("\n{}:", app);
                current_app = Some(app.as_str());
            }
            let mut actions: Vec<String> = Action::STANDARD
                .iter()
                .filter(|a| viewset.supports(a))
                .map(|a| a.as_str().to_string())
                .collect();
            actions.extend(viewset.extra_actions().into_iter().map(|a| a.name));

            println!("  {} ({})", viewset.name(), model_name(viewset.as_ref()));
            println!("    Actions: {}", actions.join(", "));
        }
    }

    let tools = ToolCatalog::new(Arc::clone(&registry)).discover();
    println!("\nDirect tools: {}", registry.tools().len());
    println!("Total tools: {}", tools.len());

    Ok(())
}
