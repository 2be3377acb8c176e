//! Carga y gestión de configuración de la aplicación (dataset, geocodificador y LLM).

use std::env;
use anyhow::{anyhow, Result};
use url::Url;

#[derive(Clone, Debug, PartialEq)]
pub enum LlmProvider {
    Gemini,
    OpenAI,
}

impl LlmProvider {
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAI),
            other => Err(anyhow!("Proveedor LLM no soportado: {other}")),
        }
    }

    /// Modelo de chat por defecto para cada proveedor.
    pub fn default_chat_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.5-flash",
            Self::OpenAI => "gpt-4o-mini",
        }
    }
}

/// Configuración completa de la aplicación.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_addr: String,
    pub open_browser: bool,

    /// Ruta local o URL http(s) del documento JSON de cultivos.
    pub crop_data_source: String,

    pub geocoder_base_url: Url,
    pub geocoder_user_agent: String,

    pub llm_provider: LlmProvider,
    pub llm_chat_model: String,
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno (usando .env si existe).
    pub fn from_env() -> Result<Self> {
        let server_addr =
            env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:3322".to_string());
        let open_browser = parse_flag(env::var("OPEN_BROWSER").ok().as_deref(), true)?;

        let crop_data_source = env::var("CROP_DATA_SOURCE")
            .unwrap_or_else(|_| "frontend/crop_data.json".to_string());

        let geocoder_base_url = env::var("GEOCODER_BASE_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string());
        let geocoder_base_url = Url::parse(&geocoder_base_url)
            .map_err(|e| anyhow!("GEOCODER_BASE_URL inválida ({geocoder_base_url}): {e}"))?;
        let geocoder_user_agent = env::var("GEOCODER_USER_AGENT")
            .unwrap_or_else(|_| format!("farm-planner-pro/{}", env!("CARGO_PKG_VERSION")));

        let llm_provider_str =
            env::var("LLM_PROVIDER").unwrap_or_else(|_| "gemini".to_string());
        let llm_provider = LlmProvider::from_str(&llm_provider_str)?;
        let llm_chat_model = env::var("LLM_CHAT_MODEL")
            .unwrap_or_else(|_| llm_provider.default_chat_model().to_string());

        Ok(Self {
            server_addr,
            open_browser,
            crop_data_source,
            geocoder_base_url,
            geocoder_user_agent,
            llm_provider,
            llm_chat_model,
        })
    }
}

fn parse_flag(raw: Option<&str>, default: bool) -> Result<bool> {
    match raw.map(|s| s.trim().to_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(anyhow!("Valor booleano no válido: {other}")),
        },
    }
}
