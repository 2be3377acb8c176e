//! Geocodificación directa e inversa contra un servicio tipo Nominatim.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use crate::config::AppConfig;
use crate::errors::PlannerError;

/// Centro de la India, usado cuando no se encuentra la dirección.
pub const FALLBACK_CENTER: (f64, f64) = (20.5937, 78.9629);
pub const FALLBACK_ZOOM: u8 = 5;
pub const FOUND_ZOOM: u8 = 13;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Valida unas coordenadas recibidas del navegador.
    pub fn checked(latitude: f64, longitude: f64) -> Result<Self, PlannerError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if valid {
            Ok(Self { latitude, longitude })
        } else {
            Err(PlannerError::Geolocation(format!(
                "coordenadas fuera de rango: {latitude}, {longitude}"
            )))
        }
    }
}

/// Campos de dirección para autocompletar el formulario.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AddressFields {
    pub street: String,
    pub town: String,
    pub district: String,
    pub state: String,
    pub pincode: String,
}

/// Vista inicial del mapa del informe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
    /// Texto del popup del marcador; `None` cuando se muestra la vista por defecto.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
}

impl MapView {
    pub fn fallback() -> Self {
        Self {
            latitude: FALLBACK_CENTER.0,
            longitude: FALLBACK_CENTER.1,
            zoom: FALLBACK_ZOOM,
            marker: None,
        }
    }
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Primer candidato para una dirección libre, o `None` si no hay coincidencias.
    async fn search(&self, address: &str) -> Result<Option<Coordinates>, PlannerError>;

    /// Desglose de dirección para unas coordenadas.
    async fn reverse(&self, at: Coordinates) -> Result<Option<AddressFields>, PlannerError>;
}

/// Centra el mapa en la dirección o, ante cualquier problema, en la vista por defecto.
pub async fn locate_farm(geocoder: &dyn Geocoder, full_address: &str) -> MapView {
    if full_address.trim().is_empty() {
        return MapView::fallback();
    }
    match geocoder.search(full_address).await {
        Ok(Some(at)) => MapView {
            latitude: at.latitude,
            longitude: at.longitude,
            zoom: FOUND_ZOOM,
            marker: Some(full_address.to_string()),
        },
        Ok(None) => {
            info!("Sin resultados de geocodificación para '{}'", full_address);
            MapView::fallback()
        }
        Err(e) => {
            warn!("Geocodificación fallida: {}", e);
            MapView::fallback()
        }
    }
}

/// Cliente HTTP para Nominatim.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: reqwest::Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

#[derive(Debug, Default, Deserialize)]
struct ReverseAddress {
    road: Option<String>,
    suburb: Option<String>,
    village: Option<String>,
    town: Option<String>,
    city: Option<String>,
    county: Option<String>,
    state_district: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseHit {
    address: Option<ReverseAddress>,
}

impl From<ReverseAddress> for AddressFields {
    fn from(a: ReverseAddress) -> Self {
        Self {
            street: a.road.or(a.suburb).unwrap_or_default(),
            town: a.village.or(a.town).or(a.city).unwrap_or_default(),
            district: a.county.or(a.state_district).unwrap_or_default(),
            state: a.state.unwrap_or_default(),
            pincode: a.postcode.unwrap_or_default(),
        }
    }
}

impl NominatimClient {
    pub fn from_config(cfg: &AppConfig) -> Result<Self, PlannerError> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.geocoder_user_agent.clone())
            .build()?;
        Ok(Self { http, base_url: cfg.geocoder_base_url.clone() })
    }

    fn endpoint(&self, path: &str) -> Result<Url, PlannerError> {
        self.base_url
            .join(path)
            .map_err(|e| PlannerError::Geocode(format!("URL inválida: {e}")))
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn search(&self, address: &str) -> Result<Option<Coordinates>, PlannerError> {
        let mut url = self.endpoint("search")?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("q", address);

        let hits: Vec<SearchHit> = self.http.get(url).send().await?.error_for_status()?.json().await?;
        match hits.into_iter().next() {
            Some(hit) => {
                let latitude = hit.lat.parse::<f64>();
                let longitude = hit.lon.parse::<f64>();
                match (latitude, longitude) {
                    (Ok(latitude), Ok(longitude)) => Ok(Some(Coordinates { latitude, longitude })),
                    _ => Err(PlannerError::Geocode(format!(
                        "coordenadas ilegibles: {}, {}",
                        hit.lat, hit.lon
                    ))),
                }
            }
            None => Ok(None),
        }
    }

    async fn reverse(&self, at: Coordinates) -> Result<Option<AddressFields>, PlannerError> {
        let mut url = self.endpoint("reverse")?;
        url.query_pairs_mut()
            .append_pair("format", "jsonv2")
            .append_pair("lat", &at.latitude.to_string())
            .append_pair("lon", &at.longitude.to_string());

        let hit: ReverseHit = self.http.get(url).send().await?.error_for_status()?.json().await?;
        Ok(hit.address.map(AddressFields::from))
    }
}
