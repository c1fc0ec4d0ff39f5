use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use leadlytics_core::config::{AuthMode, Config};
use leadlytics_duckdb::DuckDbBackend;
use leadlytics_server::state::AppState;

/// `leadlytics health`: liveness check for container orchestrators.
///
/// Calls `GET http://localhost:$LEADLYTICS_PORT/health` and exits 0 on HTTP 200,
/// 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("LEADLYTICS_PORT").unwrap_or_else(|_| "3000".to_string());
    let url = format!("http://localhost:{}/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }

    // Structured JSON logging; level via RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("leadlytics=info".parse()?),
        )
        .json()
        .init();

    let cfg = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    std::fs::create_dir_all(&cfg.data_dir)?;
    let db_path = format!("{}/leadlytics.db", cfg.data_dir);
    let db = DuckDbBackend::open(&db_path, &cfg.duckdb_memory_limit)?;

    match &cfg.auth_mode {
        AuthMode::None => match &cfg.default_organization {
            Some(org) => {
                // ON CONFLICT upsert, safe on every startup.
                if let Err(e) = db.seed_organization(org, org).await {
                    tracing::warn!(
                        error = %e,
                        organization_id = %org,
                        "Failed to seed default organization"
                    );
                }
                info!(organization_id = %org, "Auth disabled; reports use the default organization");
            }
            None => tracing::warn!(
                "Auth disabled and LEADLYTICS_DEFAULT_ORG unset; report requests will get 401"
            ),
        },
        AuthMode::Jwt(_) => info!("JWT auth enabled"),
    }

    let state = Arc::new(AppState::new(db, cfg.clone()));
    let app = leadlytics_server::app::build_app(state);

    let addr = format!("0.0.0.0:{}", cfg.port);
    info!(
        port = cfg.port,
        fetch_timeout_ms = cfg.fetch_timeout_ms,
        "Leadlytics listening on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    info!("Shutdown complete");
    Ok(())
}
