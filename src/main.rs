//src/main.rs

use axum::{routing::get, Router};
use tokio::{net::TcpListener, sync::watch};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

use crate::config::AppState;

fn router(app_state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(|| async { "OK" }))
        // As duas rotas de dados devolvem `{ data: [...] }`
        .route("/sheet", get(handlers::sheets::get_sheet))
        .route("/sales", get(handlers::sheets::get_sales))
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
        .route("/weeks", get(handlers::dashboard::get_weeks));

    let static_dir = app_state.config.static_dir.clone();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .nest("/api", api_routes)
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Falha ao escutar Ctrl-C: {}", e);
    }
    tracing::info!("Sinal de desligamento recebido");
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // O poller vive enquanto o servidor estiver de pé.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = app_state.poller().spawn(shutdown_rx);

    let addr = app_state.config.bind_addr.clone();
    let app = router(app_state);

    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", addr);
    tracing::info!("📚 Documentação em http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Erro no servidor Axum");

    let _ = shutdown_tx.send(true);
    if let Err(e) = poller.await {
        tracing::error!("Poller terminou com erro: {}", e);
    }
}
