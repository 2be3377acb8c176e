//! Carga única del dataset de cultivos.
//!
//! Si la carga falla, la aplicación arranca igualmente con un dataset vacío:
//! las pestañas de recomendaciones e insights simplemente no muestran datos.

use std::path::Path;

use tracing::{error, info, warn};

use crate::errors::PlannerError;
use crate::models::CropRecord;

/// Dataset de sólo lectura para toda la sesión.
#[derive(Debug, Clone, Default)]
pub struct CropDataset {
    records: Vec<CropRecord>,
}

impl CropDataset {
    pub fn new(records: Vec<CropRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[CropRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Carga el dataset desde una URL http(s) o una ruta local.
pub async fn load(source: &str, http: &reqwest::Client) -> Result<CropDataset, PlannerError> {
    let body = if source.starts_with("http://") || source.starts_with("https://") {
        let response = http
            .get(source)
            .send()
            .await
            .map_err(|e| PlannerError::Load(format!("{source}: {e}")))?;
        if !response.status().is_success() {
            return Err(PlannerError::Load(format!(
                "{source}: estado HTTP {}",
                response.status()
            )));
        }
        response
            .text()
            .await
            .map_err(|e| PlannerError::Load(format!("{source}: {e}")))?
    } else {
        tokio::fs::read_to_string(Path::new(source))
            .await
            .map_err(|e| PlannerError::Load(format!("{source}: {e}")))?
    };

    parse(&body).map_err(|e| PlannerError::Load(format!("{source}: {e}")))
}

/// Un registro inválido se descarta con un aviso; sólo un documento que no
/// sea un array JSON hace fallar la carga.
fn parse(body: &str) -> Result<CropDataset, serde_json::Error> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(body)?;
    let total = raw.len();
    let records: Vec<CropRecord> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value::<CropRecord>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Registro de cultivo #{} descartado: {}", i, e);
                None
            }
        })
        .collect();
    if records.len() < total {
        warn!("{} de {} registros de cultivos descartados", total - records.len(), total);
    }
    Ok(CropDataset::new(records))
}

/// Igual que [`load`], pero degradando a un dataset vacío y registrando el error.
pub async fn load_or_empty(source: &str, http: &reqwest::Client) -> CropDataset {
    match load(source, http).await {
        Ok(dataset) if dataset.is_empty() => {
            warn!("El dataset de cultivos de {} no contiene registros", source);
            dataset
        }
        Ok(dataset) => {
            info!("Dataset de cultivos cargado: {} registros desde {}", dataset.len(), source);
            dataset
        }
        Err(e) => {
            error!("No se pudo cargar el dataset de cultivos: {}", e);
            CropDataset::default()
        }
    }
}
