//! Agregados del dataset para la pestaña de "Insights" y sugerencias de cultivo.

use serde::Serialize;

use crate::models::CropRecord;
use crate::recommend::sort_by_yield_desc;

pub const TOP_BY_YIELD: usize = 7;
pub const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldBar {
    pub crop: String,
    pub yield_kg_per_ha: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub name: String,
    pub value: usize,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub top_crops_by_yield: Vec<YieldBar>,
    pub category_distribution: Vec<CategoryShare>,
}

pub fn compute(dataset: &[CropRecord]) -> Insights {
    let mut sorted = dataset.to_vec();
    sort_by_yield_desc(&mut sorted);
    let top_crops_by_yield = sorted
        .into_iter()
        .take(TOP_BY_YIELD)
        .map(|c| YieldBar { crop: c.crop, yield_kg_per_ha: c.yield_kg_per_ha })
        .collect();

    Insights {
        top_crops_by_yield,
        category_distribution: category_distribution(dataset),
    }
}

/// Recuento por categoría en orden de primera aparición.
fn category_distribution(dataset: &[CropRecord]) -> Vec<CategoryShare> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for crop in dataset {
        let name = if crop.category.is_empty() { "Uncategorized" } else { crop.category.as_str() };
        match counts.iter_mut().find(|(n, _)| n == name) {
            Some((_, count)) => *count += 1,
            None => counts.push((name.to_string(), 1)),
        }
    }

    let total = dataset.len().max(1) as f64;
    counts
        .into_iter()
        .map(|(name, value)| CategoryShare {
            percent: (value as f64 * 100.0 / total).round() as u32,
            name,
            value,
        })
        .collect()
}

/// Autocompletado del cultivo actual: nombres distintos que contienen la consulta.
pub fn crop_suggestions(dataset: &[CropRecord], query: &str) -> Vec<String> {
    let query = query.trim().to_lowercase();
    if query.chars().count() <= 1 {
        return Vec::new();
    }

    let mut names: Vec<String> = Vec::new();
    for crop in dataset {
        if names.len() == MAX_SUGGESTIONS {
            break;
        }
        if crop.crop.to_lowercase().contains(&query) && !names.contains(&crop.crop) {
            names.push(crop.crop.clone());
        }
    }
    names
}
