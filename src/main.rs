use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use study_planner::db::{self, LogOnError};
use study_planner::{app, auth, config::Settings, state::AppState};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "study_planner=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let settings = Settings::load();
  let pool = db::init_db(&settings.database_path).expect("Failed to initialize database");

  {
    let conn = pool.lock().expect("Database lock failed during startup");
    let removed = auth::db::cleanup_expired_sessions(&conn)
      .log_warn_default("Failed to clean up expired sessions");
    if removed > 0 {
      tracing::info!("Removed {} expired sessions", removed);
    }
  }

  let app = app::router(AppState::new(pool));

  let bind_addr = settings.bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", settings.port);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
