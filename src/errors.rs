//! Errores de la aplicación y su traducción a respuestas HTTP.
//!
//! Ningún error llega al usuario con su causa real: la causa se registra con
//! `tracing` y al navegador sólo se le envía un mensaje que invita a reintentar.

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Error cargando el dataset de cultivos: {0}")]
    Load(String),

    #[error("Error de geocodificación: {0}")]
    Geocode(String),

    #[error("Ubicación no disponible: {0}")]
    Geolocation(String),

    #[error("Error del asistente: {0}")]
    Assistant(String),

    #[error("Error generando el informe: {0}")]
    Export(String),

    #[error("Entrada no válida: {0}")]
    InvalidInput(String),

    #[error("Petición en curso")]
    Busy,

    #[error("No hay datos de la finca")]
    MissingProfile,
}

impl PlannerError {
    /// Mensaje seguro para mostrar en la interfaz.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Load(_) => "Crop data is unavailable right now. Please try again later.",
            Self::Geocode(_) => "We could not find that location. Please try again.",
            Self::Geolocation(_) => "Your location could not be determined. Please try again.",
            Self::Assistant(_) => {
                "Sorry, I'm having trouble connecting to my knowledge base right now. Please try again later."
            }
            Self::Export(_) => "The report could not be generated. Please try again.",
            Self::InvalidInput(_) => "Some of the information sent was not valid. Please try again.",
            Self::Busy => "Still working on your previous request. Please try again in a moment.",
            Self::MissingProfile => "Please fill in your farm details first and try again.",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Load(_) | Self::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Geocode(_) | Self::Assistant(_) => StatusCode::BAD_GATEWAY,
            Self::Geolocation(_) | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Busy | Self::MissingProfile => StatusCode::CONFLICT,
        }
    }
}

impl From<PlannerError> for (StatusCode, Json<Value>) {
    fn from(err: PlannerError) -> Self {
        (err.status_code(), Json(json!({ "error": err.user_message() })))
    }
}

impl From<reqwest::Error> for PlannerError {
    fn from(err: reqwest::Error) -> Self {
        PlannerError::Geocode(err.to_string())
    }
}
