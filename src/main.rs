// library management service

mod config;
mod error;
mod page;
mod queries;
mod routes;
mod sql;
mod types;

use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::routes::ServerState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let cfg = Config::from_env()?;

	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new("info,lms=debug,tower_http=debug"));
	tracing_subscriber::fmt().with_env_filter(filter).init();

	// set up connection pool
	let db = sql::connect(&cfg).await?;
	sql::migrate(&db).await?;

	let app = routes::router(ServerState{ db: db.clone() }, &cfg);

	let listener = tokio::net::TcpListener::bind(cfg.addr).await?;
	tracing::info!(addr = %cfg.addr, database = %cfg.database_url, "listening");
	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	db.close().await;
	tracing::info!("stopped");
	Ok(())
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %e, "can't listen for ctrl-c");
		// without a signal handler, keep serving
		std::future::pending::<()>().await;
	}
	tracing::info!("shutting down");
}
