//! Exportación del informe de la finca a PDF.

use chrono::{DateTime, Utc};
use printpdf::*;
use tracing::debug;

use crate::errors::PlannerError;
use crate::models::{CropRecord, FarmProfile, SoilIndicator};

pub const REPORT_TITLE: &str = "Smart Farm Planner Pro - Report";
pub const REPORT_FILENAME: &str = "Smart_Farm_Report.pdf";
pub const MAX_EXPORTED_CROPS: usize = 10;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const LEFT_MARGIN_MM: f32 = 20.0;
const LINE_STEP_MM: f32 = 7.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Style {
    Title,
    Heading,
    Body,
    Caption,
}

impl Style {
    fn size(&self) -> f32 {
        match self {
            Self::Title => 22.0,
            Self::Heading => 16.0,
            Self::Body => 12.0,
            Self::Caption => 9.0,
        }
    }

    fn bold(&self) -> bool {
        matches!(self, Self::Title | Self::Heading)
    }
}

/// Una línea ya posicionada; `top_mm` se mide desde el borde superior.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
    pub text: String,
    pub style: Style,
    pub left_mm: f32,
    pub top_mm: f32,
}

impl ReportLine {
    fn at(text: impl Into<String>, style: Style, top_mm: f32) -> Self {
        Self { text: text.into(), style, left_mm: LEFT_MARGIN_MM, top_mm }
    }
}

/// Maquetación fija: título y tres secciones numeradas.
pub fn layout(
    profile: &FarmProfile,
    soil_report: &[SoilIndicator],
    crops: &[CropRecord],
    generated_at: DateTime<Utc>,
) -> Vec<ReportLine> {
    let mut lines = vec![
        ReportLine {
            text: REPORT_TITLE.to_string(),
            style: Style::Title,
            left_mm: centered_left(REPORT_TITLE, Style::Title),
            top_mm: 20.0,
        },
        ReportLine::at(
            format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M UTC")),
            Style::Caption,
            28.0,
        ),
        ReportLine::at("1. Farm Details", Style::Heading, 40.0),
        ReportLine::at(format!("Address: {}", profile.full_address), Style::Body, 50.0),
        ReportLine::at(format!("Land Area: {}", profile.land_area_label()), Style::Body, 57.0),
        ReportLine::at(format!("Current Crop: {}", profile.current_crop), Style::Body, 64.0),
        ReportLine::at("2. Soil Analysis", Style::Heading, 80.0),
    ];

    let mut top = 90.0;
    for item in soil_report {
        lines.push(ReportLine::at(
            format!("{}: {} (Ideal: {})", item.name, item.value, item.ideal),
            Style::Body,
            top,
        ));
        top += LINE_STEP_MM;
    }

    lines.push(ReportLine::at("3. Top Crop Recommendations", Style::Heading, top + 10.0));
    top += 20.0;
    for (index, crop) in crops.iter().take(MAX_EXPORTED_CROPS).enumerate() {
        lines.push(ReportLine::at(
            format!("{}. {} (Yield: {} kg/ha)", index + 1, crop.crop, crop.yield_kg_per_ha),
            Style::Body,
            top,
        ));
        top += LINE_STEP_MM;
    }
    lines
}

/// Aproximación del ancho de Helvetica para centrar el título.
fn centered_left(text: &str, style: Style) -> f32 {
    let pt_to_mm = 0.3528;
    let width = text.chars().count() as f32 * style.size() * 0.55 * pt_to_mm;
    ((PAGE_WIDTH_MM - width) / 2.0).max(LEFT_MARGIN_MM / 2.0)
}

/// Genera el PDF en memoria.
pub fn render_pdf(lines: &[ReportLine]) -> Result<Vec<u8>, PlannerError> {
    let (doc, page1, layer1) =
        PdfDocument::new(REPORT_TITLE, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let current_layer = doc.get_page(page1).get_layer(layer1);

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| PlannerError::Export(format!("No se pudo cargar la fuente: {e}")))?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| PlannerError::Export(format!("No se pudo cargar la fuente negrita: {e}")))?;

    for line in lines {
        let face = if line.style.bold() { &font_bold } else { &font };
        current_layer.use_text(
            line.text.as_str(),
            line.style.size(),
            Mm(line.left_mm),
            Mm(PAGE_HEIGHT_MM - line.top_mm),
            face,
        );
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| PlannerError::Export(format!("No se pudo guardar el PDF: {e}")))?;
    debug!("Informe PDF generado ({} bytes, {} líneas)", bytes.len(), lines.len());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AreaUnit, FarmProfileForm};
    use crate::recommend::tests::crop;
    use crate::soil;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_profile() -> FarmProfile {
        FarmProfile::from_form(FarmProfileForm {
            town: "Pune".to_string(),
            state: "MH".to_string(),
            pincode: "411001".to_string(),
            land_area: Some(4.5),
            area_unit: AreaUnit::Hectares,
            current_crop: "Sugarcane".to_string(),
            ..Default::default()
        })
    }

    fn texts(lines: &[ReportLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn layout_has_title_and_three_numbered_sections() {
        let soil_report = soil::generate(&mut StdRng::seed_from_u64(5));
        let crops: Vec<CropRecord> = (0..14).map(|i| crop("MH", &format!("c{i}"), 100.0 - i as f64, "cash")).collect();
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap();
        let lines = layout(&sample_profile(), &soil_report, &crops, at);
        let texts = texts(&lines);

        assert_eq!(texts[0], REPORT_TITLE);
        assert_eq!(texts[1], "Generated: 2024-06-01 08:30 UTC");
        assert!(texts.contains(&"Address: Pune, MH, 411001"));
        assert!(texts.contains(&"Land Area: 4.5 hectares"));
        assert!(texts.contains(&"Current Crop: Sugarcane"));
        let expected_soil = format!("pH Level: {} (Ideal: 6.0-7.0)", soil_report[0].value);
        assert!(texts.contains(&expected_soil.as_str()));
        assert!(texts.contains(&"1. c0 (Yield: 100 kg/ha)"));
        assert!(texts.contains(&"10. c9 (Yield: 91 kg/ha)"));
        assert!(!texts.iter().any(|t| t.starts_with("11. ")));

        let headings: Vec<&str> = lines
            .iter()
            .filter(|l| l.style == Style::Heading)
            .map(|l| l.text.as_str())
            .collect();
        assert_eq!(headings, vec!["1. Farm Details", "2. Soil Analysis", "3. Top Crop Recommendations"]);
    }

    #[test]
    fn lines_flow_downwards_inside_the_page() {
        let soil_report = soil::generate(&mut StdRng::seed_from_u64(5));
        let crops: Vec<CropRecord> = (0..10).map(|i| crop("MH", &format!("c{i}"), 1.0, "cash")).collect();
        let lines = layout(&sample_profile(), &soil_report, &crops, Utc::now());
        assert!(lines.windows(2).all(|w| w[0].top_mm < w[1].top_mm));
        assert!(lines.iter().all(|l| l.top_mm < PAGE_HEIGHT_MM && l.left_mm > 0.0));
    }

    #[test]
    fn renders_a_pdf_document() {
        let lines = layout(&sample_profile(), &[], &[], Utc::now());
        let bytes = render_pdf(&lines).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
