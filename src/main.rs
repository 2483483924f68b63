use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jobly_api::auth::{generate_jwt, Claims};
use jobly_api::config::{self, Environment};
use jobly_api::database::DatabaseManager;
use jobly_api::{app, AppState};

#[derive(Parser)]
#[command(name = "jobly-api", version, about = "Jobly API server")]
struct Cli {
    /// Port to listen on (defaults to JOBLY_API_PORT / PORT / 3001)
    #[arg(long, short)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print a signed token for a user, for operators and local testing
    Token {
        username: String,
        #[arg(long)]
        admin: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = config::config();

    let default_filter = match config.environment {
        Environment::Production => "jobly_api=info,tower_http=info",
        _ => "jobly_api=debug,tower_http=debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Token { username, admin } => {
            let token = generate_jwt(&Claims::new(username, admin), &config.security.jwt_secret)?;
            println!("{}", token);
            Ok(())
        }
        Command::Serve => serve(cli.port).await,
    }
}

async fn serve(port: Option<u16>) -> anyhow::Result<()> {
    let config = config::config();
    tracing::info!("Starting Jobly API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        tracing::error!("SECRET_KEY is not set; every credential will be rejected");
    }

    let pool = DatabaseManager::connect_lazy(&config.database).context("failed to configure database pool")?;

    let port = port.unwrap_or(config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Jobly API listening on http://{}", bind_addr);

    axum::serve(listener, app(AppState::new(pool)))
        .await
        .context("server error")?;

    Ok(())
}
