// Módulos de la aplicación
mod api;
mod app_state;
mod chat;
mod config;
mod dataset;
mod errors;
mod export;
mod geocoding;
mod insights;
mod llm;
mod models;
mod navigation;
mod recommend;
mod soil;

use crate::app_state::AppState;
use anyhow::Context;
use axum::Router;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Cargar .env e inicializar logging
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 2. Cargar configuración
    let cfg = config::AppConfig::from_env().context("Error al cargar la configuración")?;

    // 3. Servicios externos: geocodificador y asistente (la sesión de chat se abre al primer uso)
    let geocoder = geocoding::NominatimClient::from_config(&cfg)
        .context("Error inicializando el cliente de geocodificación")?;
    let assistant = llm::RigBackend::from_config(&cfg);

    // 4. Cargar el dataset de cultivos una única vez; si falla se sigue con uno vacío
    let http = reqwest::Client::new();
    let crops = dataset::load_or_empty(&cfg.crop_data_source, &http).await;

    // Crear canal para la señal de apagado.
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    // 5. Crear estado compartido de la aplicación
    let app_state = AppState::with_entropy(
        cfg.clone(),
        crops,
        Arc::new(assistant),
        Arc::new(geocoder),
        shutdown_tx,
    );

    // 6. Configurar el router de la API y el servicio de ficheros estáticos
    let app = Router::new()
        .merge(api::create_router(app_state.clone()))
        .fallback_service(ServeDir::new("frontend"))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // 7. Iniciar el servidor
    let server_addr = &app_state.config.server_addr;
    let listener = tokio::net::TcpListener::bind(server_addr)
        .await
        .with_context(|| format!("No se pudo escuchar en {server_addr}"))?;
    let server_url = format!("http://{}", server_addr);
    info!("🌱 Servidor escuchando en {}", &server_url);

    // Abrir el frontend en el navegador por defecto
    if app_state.config.open_browser && webbrowser::open(&server_url).is_err() {
        info!("No se pudo abrir el navegador. Por favor, accede a {} manualmente.", server_url);
    }

    // Configurar el apagado ordenado.
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_rx.await.ok();
            info!("Señal de apagado recibida, iniciando cierre del servidor.");
        })
        .await
        .context("Error en el servidor HTTP")?;

    info!("✅ Servidor cerrado correctamente.");
    Ok(())
}
