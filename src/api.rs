use axum::{
    extract::{Json, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::{
    app_state::{lock, AppState},
    errors::PlannerError,
    export,
    geocoding::{self, AddressFields, Coordinates, MapView},
    insights::{self, Insights},
    models::{ChatMessage, CropRecord, FarmProfile, FarmProfileForm, SoilIndicator},
    navigation::{DashboardTab, ViewSnapshot},
    recommend::{self, CROP_CATEGORIES},
    soil,
};

type ApiError = (StatusCode, Json<Value>);

// --- Payloads y Respuestas de la API ---

#[derive(Deserialize)]
pub struct TabPayload {
    tab: DashboardTab,
}

#[derive(Deserialize)]
pub struct ChatPayload {
    message: String,
}

#[derive(Deserialize)]
pub struct LocatePayload {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
pub struct CategoryQuery {
    category: Option<String>,
}

#[derive(Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    q: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    farm_profile: FarmProfile,
    soil_report: Vec<SoilIndicator>,
    map: MapView,
}

#[derive(Serialize)]
pub struct RecommendationsResponse {
    category: String,
    crops: Vec<CropRecord>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    reply: ChatMessage,
    transcript: Vec<ChatMessage>,
}

// --- Router ---

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/session", get(session_handler))
        .route("/api/start", post(start_handler))
        .route("/api/submit", post(submit_handler))
        .route("/api/tab", post(tab_handler))
        .route("/api/reset", post(reset_handler))
        .route("/api/dark-mode", post(dark_mode_handler))
        .route("/api/report", get(report_handler))
        .route("/api/categories", get(categories_handler))
        .route("/api/recommendations", get(recommendations_handler))
        .route("/api/insights", get(insights_handler))
        .route("/api/chat", get(chat_history_handler).post(chat_handler))
        .route("/api/locate", post(locate_handler))
        .route("/api/crop-suggestions", get(crop_suggestions_handler))
        .route("/api/export", get(export_handler))
        .route("/api/shutdown", post(shutdown_handler))
        .with_state(app_state)
}

// --- Navegación ---

#[axum::debug_handler]
async fn session_handler(State(state): State<AppState>) -> Json<ViewSnapshot> {
    Json(lock(&state.navigator).snapshot())
}

#[axum::debug_handler]
async fn start_handler(State(state): State<AppState>) -> Json<ViewSnapshot> {
    let mut nav = lock(&state.navigator);
    nav.start();
    Json(nav.snapshot())
}

/// El envío siempre tiene éxito: deriva la dirección y genera un informe nuevo.
#[axum::debug_handler]
async fn submit_handler(
    State(state): State<AppState>,
    Json(form): Json<FarmProfileForm>,
) -> Json<ViewSnapshot> {
    let profile = FarmProfile::from_form(form);
    let soil_report = soil::generate(&mut *lock(&state.rng));
    info!("Perfil de finca recibido ({})", profile.full_address);

    let mut nav = lock(&state.navigator);
    nav.submit(profile, soil_report);
    Json(nav.snapshot())
}

#[axum::debug_handler]
async fn tab_handler(
    State(state): State<AppState>,
    Json(payload): Json<TabPayload>,
) -> Json<ViewSnapshot> {
    let mut nav = lock(&state.navigator);
    nav.select_tab(payload.tab);
    debug!("Vista actual: {:?} / {:?}", nav.page(), nav.tab());
    Json(nav.snapshot())
}

#[axum::debug_handler]
async fn reset_handler(State(state): State<AppState>) -> Json<ViewSnapshot> {
    let mut nav = lock(&state.navigator);
    nav.reset();
    Json(nav.snapshot())
}

#[axum::debug_handler]
async fn dark_mode_handler(State(state): State<AppState>) -> Json<Value> {
    let mut nav = lock(&state.navigator);
    nav.toggle_dark_mode();
    Json(json!({ "darkMode": nav.dark_mode() }))
}

// --- Panel ---

fn current_farm(state: &AppState) -> Result<(FarmProfile, Vec<SoilIndicator>), PlannerError> {
    let nav = lock(&state.navigator);
    let profile = nav.profile().cloned().ok_or(PlannerError::MissingProfile)?;
    Ok((profile, nav.soil_report().to_vec()))
}

#[axum::debug_handler]
async fn report_handler(State(state): State<AppState>) -> Result<Json<ReportResponse>, ApiError> {
    let (farm_profile, soil_report) = current_farm(&state)?;
    let map = geocoding::locate_farm(state.geocoder.as_ref(), &farm_profile.full_address).await;
    Ok(Json(ReportResponse { farm_profile, soil_report, map }))
}

#[axum::debug_handler]
async fn categories_handler() -> Json<Vec<&'static str>> {
    Json(CROP_CATEGORIES.to_vec())
}

#[axum::debug_handler]
async fn recommendations_handler(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<RecommendationsResponse>, ApiError> {
    let (profile, _) = current_farm(&state)?;
    let category = query
        .category
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| recommend::ALL_CATEGORIES.to_string());
    let crops = recommend::recommend(&profile, state.dataset.records(), &category);
    Ok(Json(RecommendationsResponse { category, crops }))
}

#[axum::debug_handler]
async fn insights_handler(State(state): State<AppState>) -> Json<Insights> {
    Json(insights::compute(state.dataset.records()))
}

// --- Chatbot ---

#[axum::debug_handler]
async fn chat_history_handler(State(state): State<AppState>) -> Json<Vec<ChatMessage>> {
    Json(state.chatbot.transcript())
}

#[axum::debug_handler]
async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatPayload>,
) -> Result<Json<ChatResponse>, ApiError> {
    let reply = state.chatbot.send(&payload.message).await?;
    Ok(Json(ChatResponse { reply, transcript: state.chatbot.transcript() }))
}

// --- Formulario ---

/// Sin coincidencias o con el servicio caído se devuelven campos vacíos:
/// el formulario simplemente no se autocompleta.
#[axum::debug_handler]
async fn locate_handler(
    State(state): State<AppState>,
    Json(payload): Json<LocatePayload>,
) -> Result<Json<AddressFields>, ApiError> {
    let at = Coordinates::checked(payload.latitude, payload.longitude)?;
    match state.geocoder.reverse(at).await {
        Ok(fields) => Ok(Json(fields.unwrap_or_default())),
        Err(e) => {
            error!("Geocodificación inversa fallida: {}", e);
            Ok(Json(AddressFields::default()))
        }
    }
}

#[axum::debug_handler]
async fn crop_suggestions_handler(
    State(state): State<AppState>,
    Query(query): Query<SuggestionQuery>,
) -> Json<Vec<String>> {
    Json(insights::crop_suggestions(state.dataset.records(), &query.q))
}

// --- Exportación ---

#[axum::debug_handler]
async fn export_handler(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let (profile, soil_report) = current_farm(&state)?;
    let crops = recommend::recommend(&profile, state.dataset.records(), recommend::ALL_CATEGORIES);
    let lines = export::layout(&profile, &soil_report, &crops, Utc::now());

    let bytes = tokio::task::spawn_blocking(move || export::render_pdf(&lines))
        .await
        .map_err(|e| PlannerError::Export(e.to_string()))
        .and_then(|result| result)
        .map_err(|e| {
            error!("Error exportando el informe: {}", e);
            e
        })?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export::REPORT_FILENAME),
            ),
        ],
        bytes,
    ))
}

// --- Handler de Apagado ---

#[axum::debug_handler]
async fn shutdown_handler(State(state): State<AppState>) -> impl IntoResponse {
    info!("Petición de apagado recibida.");
    state.chatbot.end_session().await;
    if let Some(sender) = lock(&state.shutdown_sender).take() {
        let _ = sender.send(());
    }
    StatusCode::OK
}
