//! Motor de recomendación de cultivos.
//!
//! Flujo:
//!   1. Candidatos = registros del estado de la finca (sin distinguir mayúsculas).
//!      Si no hay ninguno, o el estado está vacío, se usa el dataset completo.
//!   2. Orden estable por rendimiento descendente (los empates mantienen el orden del dataset).
//!   3. Con la categoría "all" se devuelven los 12 primeros; con cualquier otra,
//!      todos los de esa categoría, sin límite.

use std::cmp::Ordering;

use crate::models::{CropRecord, FarmProfile};

pub const ALL_CATEGORIES: &str = "all";
pub const TOP_RECOMMENDATIONS: usize = 12;

/// Categorías ofrecidas como filtro en la interfaz.
pub const CROP_CATEGORIES: [&str; 6] = ["all", "cereals", "vegetables", "fruits", "pulses", "cash"];

pub fn recommend(profile: &FarmProfile, dataset: &[CropRecord], category: &str) -> Vec<CropRecord> {
    let mut ranked = candidates_for_state(&profile.state, dataset);
    sort_by_yield_desc(&mut ranked);

    let category = category.trim();
    if category.eq_ignore_ascii_case(ALL_CATEGORIES) {
        ranked.truncate(TOP_RECOMMENDATIONS);
        return ranked;
    }

    ranked
        .into_iter()
        .filter(|crop| crop.category.eq_ignore_ascii_case(category))
        .collect()
}

fn candidates_for_state(state: &str, dataset: &[CropRecord]) -> Vec<CropRecord> {
    let state = state.trim().to_lowercase();
    if !state.is_empty() {
        let in_state: Vec<CropRecord> = dataset
            .iter()
            .filter(|crop| crop.state.to_lowercase() == state)
            .cloned()
            .collect();
        if !in_state.is_empty() {
            return in_state;
        }
    }
    dataset.to_vec()
}

/// `sort_by` es estable, que es lo que garantiza el desempate por orden de llegada.
pub fn sort_by_yield_desc(crops: &mut [CropRecord]) {
    crops.sort_by(|a, b| {
        b.yield_kg_per_ha
            .partial_cmp(&a.yield_kg_per_ha)
            .unwrap_or(Ordering::Equal)
    });
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::FarmProfileForm;

    pub(crate) fn crop(state: &str, name: &str, yield_kg_per_ha: f64, category: &str) -> CropRecord {
        CropRecord {
            state: state.to_string(),
            district: "Test".to_string(),
            crop: name.to_string(),
            crop_year: 2020,
            season: "Kharif".to_string(),
            area: 100.0,
            production: 100.0,
            soil_ph_observed: 6.5,
            soil_ph_optimal_min: 6.0,
            soil_ph_optimal_max: 7.0,
            rainfall_mm_observed: 800.0,
            crop_min_rain_mm: 500.0,
            crop_max_rain_mm: 1000.0,
            yield_kg_per_ha,
            category: category.to_string(),
            water_need: "Medium".to_string(),
            icon: "🌱".to_string(),
        }
    }

    pub(crate) fn profile_in(state: &str) -> FarmProfile {
        FarmProfile::from_form(FarmProfileForm {
            state: state.to_string(),
            ..Default::default()
        })
    }

    fn yields(crops: &[CropRecord]) -> Vec<f64> {
        crops.iter().map(|c| c.yield_kg_per_ha).collect()
    }

    #[test]
    fn ranks_only_the_farm_state() {
        let dataset = vec![
            crop("Maharashtra", "Jowar", 100.0, "cereals"),
            crop("Punjab", "Wheat", 900.0, "cereals"),
            crop("Maharashtra", "Sugarcane", 500.0, "cash"),
            crop("Kerala", "Banana", 50.0, "fruits"),
            crop("Maharashtra", "Onion", 300.0, "vegetables"),
        ];
        let result = recommend(&profile_in("Maharashtra"), &dataset, "all");
        assert_eq!(yields(&result), vec![500.0, 300.0, 100.0]);
    }

    #[test]
    fn state_match_ignores_case_and_whitespace() {
        let dataset = vec![
            crop("Punjab", "Wheat", 900.0, "cereals"),
            crop("Kerala", "Rice", 400.0, "cereals"),
        ];
        let result = recommend(&profile_in("  kERALA "), &dataset, "all");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].crop, "Rice");
    }

    #[test]
    fn unknown_state_falls_back_to_whole_dataset() {
        let dataset = vec![
            crop("Punjab", "Wheat", 900.0, "cereals"),
            crop("Kerala", "Rice", 400.0, "cereals"),
            crop("Assam", "Tea", 1500.0, "cash"),
        ];
        let result = recommend(&profile_in("Atlantis"), &dataset, "all");
        assert_eq!(yields(&result), vec![1500.0, 900.0, 400.0]);

        let blank = recommend(&profile_in(""), &dataset, "all");
        assert_eq!(blank.len(), 3);
    }

    #[test]
    fn category_applies_to_the_fallback_ranking() {
        let dataset = vec![
            crop("Punjab", "Wheat", 900.0, "cereals"),
            crop("Bihar", "Lentil", 300.0, "pulses"),
            crop("Madhya Pradesh", "Gram", 700.0, "Pulses"),
            crop("Kerala", "Banana", 1200.0, "fruits"),
        ];
        let result = recommend(&profile_in("Atlantis"), &dataset, "pulses");
        let names: Vec<&str> = result.iter().map(|c| c.crop.as_str()).collect();
        assert_eq!(names, vec!["Gram", "Lentil"]);
    }

    #[test]
    fn all_is_capped_at_twelve_and_ties_keep_dataset_order() {
        let dataset: Vec<CropRecord> = (0..20)
            .map(|i| crop("Goa", &format!("crop-{i}"), if i % 2 == 0 { 10.0 } else { 20.0 }, "other"))
            .collect();
        let result = recommend(&profile_in("Goa"), &dataset, "ALL");
        assert_eq!(result.len(), TOP_RECOMMENDATIONS);
        let names: Vec<&str> = result.iter().map(|c| c.crop.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "crop-1", "crop-3", "crop-5", "crop-7", "crop-9", "crop-11", "crop-13",
                "crop-15", "crop-17", "crop-19", "crop-0", "crop-2"
            ]
        );
    }

    #[test]
    fn category_filter_is_uncapped_and_case_insensitive() {
        let mut dataset: Vec<CropRecord> = (0..15)
            .map(|i| crop("Bihar", &format!("pulse-{i}"), i as f64, "Pulses"))
            .collect();
        dataset.push(crop("Bihar", "Maize", 99.0, "cereals"));

        let result = recommend(&profile_in("Bihar"), &dataset, "pulses");
        assert_eq!(result.len(), 15);
        assert!(result.iter().all(|c| c.category.eq_ignore_ascii_case("pulses")));
        assert_eq!(result[0].yield_kg_per_ha, 14.0);
    }

    #[test]
    fn category_without_matches_is_empty_not_an_error() {
        let dataset = vec![crop("Bihar", "Maize", 99.0, "cereals")];
        assert!(recommend(&profile_in("Bihar"), &dataset, "fruits").is_empty());
        assert!(recommend(&profile_in("Bihar"), &[], "all").is_empty());
    }
}
