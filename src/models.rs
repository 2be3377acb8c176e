//! Modelos de dominio (perfil de la finca, registros de cultivos, indicadores de suelo y chat).

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaUnit {
    #[default]
    Acres,
    Hectares,
    Bigha,
    Katha,
}

impl AreaUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Acres => "acres",
            Self::Hectares => "hectares",
            Self::Bigha => "bigha",
            Self::Katha => "katha",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaterSource {
    #[default]
    Rain,
    Bore,
    Canal,
    River,
    Tank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Budget {
    #[default]
    Low,
    Medium,
    High,
}

/// Campos tal y como llegan del formulario. La dirección completa no se
/// acepta del cliente: siempre se deriva en el envío.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FarmProfileForm {
    pub street: String,
    pub town: String,
    pub district: String,
    pub state: String,
    pub pincode: String,
    pub land_area: Option<f64>,
    pub area_unit: AreaUnit,
    pub current_crop: String,
    pub water_source: WaterSource,
    pub budget: Budget,
}

/// Perfil de la finca, inmutable durante la sesión.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmProfile {
    pub street: String,
    pub town: String,
    pub district: String,
    pub state: String,
    pub pincode: String,
    pub land_area: Option<f64>,
    pub area_unit: AreaUnit,
    pub current_crop: String,
    pub water_source: WaterSource,
    pub budget: Budget,
    pub full_address: String,
}

impl FarmProfile {
    /// Construye el perfil a partir del formulario recalculando `full_address`.
    /// Una superficie no positiva se trata como "sin indicar".
    pub fn from_form(form: FarmProfileForm) -> Self {
        let full_address = derive_full_address(
            &form.street,
            &form.town,
            &form.district,
            &form.state,
            &form.pincode,
        );
        Self {
            land_area: form.land_area.filter(|a| a.is_finite() && *a > 0.0),
            street: form.street,
            town: form.town,
            district: form.district,
            state: form.state,
            pincode: form.pincode,
            area_unit: form.area_unit,
            current_crop: form.current_crop,
            water_source: form.water_source,
            budget: form.budget,
            full_address,
        }
    }

    /// Superficie con unidad, p. ej. "4.5 acres".
    pub fn land_area_label(&self) -> String {
        match self.land_area {
            Some(area) => format!("{} {}", area, self.area_unit.as_str()),
            None => format!("- {}", self.area_unit.as_str()),
        }
    }
}

/// Une calle, pueblo, distrito, estado y código postal con ", " omitiendo los vacíos.
pub fn derive_full_address(
    street: &str,
    town: &str,
    district: &str,
    state: &str,
    pincode: &str,
) -> String {
    [street, town, district, state, pincode]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Un registro del dataset de cultivos.
///
/// Estado, cultivo y rendimiento son obligatorios; el rendimiento ordena las
/// recomendaciones. El resto de campos ausentes o `null` quedan a cero o vacíos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRecord {
    pub state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub district: String,
    pub crop: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub crop_year: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub season: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub area: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub production: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub soil_ph_observed: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub soil_ph_optimal_min: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub soil_ph_optimal_max: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rainfall_mm_observed: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub crop_min_rain_mm: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub crop_max_rain_mm: f64,
    pub yield_kg_per_ha: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub water_need: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub icon: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Un indicador simulado del informe de suelo.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilIndicator {
    pub name: &'static str,
    pub value: String,
    pub icon: &'static str,
    pub ideal: &'static str,
    pub color: &'static str,
    pub text_color: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self { sender: Sender::User, text: text.into() }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self { sender: Sender::Bot, text: text.into() }
    }
}
