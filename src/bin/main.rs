//! Property agents entry point.
//!
//! One binary, one subcommand per service role: the three agents and the
//! gateway.

use clap::{Parser, Subcommand};
use property_agents::agents::{self, AgentKind, AppState};
use property_agents::config::{EngineConfig, GatewayConfig};
use property_agents::engine::metta::MettaProcessEngine;
use property_agents::engine::QueryExecutor;
use property_agents::engine::RuleModule;
use property_agents::gateway::{self, GatewayState};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "property-agents")]
#[command(about = "Property validation, valuation and recommendation agents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the validation agent
    Validation {
        /// Port to listen on
        #[arg(short, long, default_value = "5001", env = "PORT")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
    },

    /// Start the valuation agent
    Valuation {
        #[arg(short, long, default_value = "5002", env = "PORT")]
        port: u16,

        #[arg(long, default_value = "0.0.0.0")]
        host: String,
    },

    /// Start the recommendation agent
    Recommendation {
        #[arg(short, long, default_value = "5003", env = "PORT")]
        port: u16,

        #[arg(long, default_value = "0.0.0.0")]
        host: String,
    },

    /// Start the gateway
    Gateway {
        #[arg(short, long, default_value = "8000", env = "PORT")]
        port: u16,

        #[arg(long, default_value = "0.0.0.0")]
        host: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let cli = Cli::parse();

    let (name, host, port, router) = match cli.command {
        Commands::Validation { port, host } => (
            "validation agent",
            host,
            port,
            agents::validation::router(agent_state(AgentKind::Validation)),
        ),
        Commands::Valuation { port, host } => (
            "valuation agent",
            host,
            port,
            agents::valuation::router(agent_state(AgentKind::Valuation)),
        ),
        Commands::Recommendation { port, host } => (
            "recommendation agent",
            host,
            port,
            agents::recommendation::router(agent_state(AgentKind::Recommendation)),
        ),
        Commands::Gateway { port, host } => {
            let state = Arc::new(GatewayState::new(GatewayConfig::from_env()));
            ("gateway", host, port, gateway::router(state))
        }
    };

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    tracing::info!("Starting {} on {}", name, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router.layer(TraceLayer::new_for_http())).await?;

    Ok(())
}

fn agent_state(kind: AgentKind) -> Arc<AppState> {
    let config = EngineConfig::from_env();
    let engine = Arc::new(MettaProcessEngine::new(config.binary.clone()));
    let module = RuleModule::new(config.module_path(kind));
    Arc::new(AppState::new(QueryExecutor::new(engine, module)))
}
