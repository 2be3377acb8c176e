//! Generador del informe de suelo simulado.
//!
//! Los valores no proceden de ningún sensor: cada envío del formulario produce
//! cinco indicadores nuevos, sorteados de forma independiente.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::SoilIndicator;

const NITROGEN_LEVELS: [&str; 3] = ["Low", "Medium", "High"];

/// Genera los cinco indicadores en orden fijo: pH, N, P, K y carbono orgánico.
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Vec<SoilIndicator> {
    let ph: f64 = rng.gen_range(5.5..=7.5);
    let nitrogen = NITROGEN_LEVELS.choose(rng).copied().unwrap_or("Medium");
    let phosphorus: u32 = rng.gen_range(20..=50);
    let potassium: u32 = rng.gen_range(150..=250);
    let organic_carbon: f64 = rng.gen_range(0.4..=0.9);

    vec![
        SoilIndicator {
            name: "pH Level",
            value: format!("{ph:.1}"),
            icon: "fas fa-vial",
            ideal: "6.0-7.0",
            color: "bg-green-100 dark:bg-green-900/50",
            text_color: "text-green-700 dark:text-green-300",
        },
        SoilIndicator {
            name: "Nitrogen (N)",
            value: nitrogen.to_string(),
            icon: "fas fa-atom",
            ideal: "Medium-High",
            color: "bg-blue-100 dark:bg-blue-900/50",
            text_color: "text-blue-700 dark:text-blue-300",
        },
        SoilIndicator {
            name: "Phosphorus (P)",
            value: format!("{phosphorus} kg/ha"),
            icon: "fas fa-fire",
            ideal: "25-50 kg/ha",
            color: "bg-orange-100 dark:bg-orange-900/50",
            text_color: "text-orange-700 dark:text-orange-300",
        },
        SoilIndicator {
            name: "Potassium (K)",
            value: format!("{potassium} kg/ha"),
            icon: "fas fa-bolt",
            ideal: "180-280 kg/ha",
            color: "bg-yellow-100 dark:bg-yellow-900/50",
            text_color: "text-yellow-700 dark:text-yellow-300",
        },
        SoilIndicator {
            name: "Organic Carbon",
            value: format!("{organic_carbon:.2} %"),
            icon: "fas fa-leaf",
            ideal: "> 0.75%",
            color: "bg-purple-100 dark:bg-purple-900/50",
            text_color: "text-purple-700 dark:text-purple-300",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn number(value: &str) -> f64 {
        value
            .split_whitespace()
            .next()
            .and_then(|n| n.parse().ok())
            .unwrap()
    }

    #[test]
    fn always_five_indicators_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let report = generate(&mut rng);
            assert_eq!(report.len(), 5);

            let ph = number(&report[0].value);
            assert!((5.5..=7.5).contains(&ph), "pH {ph}");
            assert!(NITROGEN_LEVELS.contains(&report[1].value.as_str()));
            let p = number(&report[2].value);
            assert!((20.0..=50.0).contains(&p) && p.fract() == 0.0, "P {p}");
            assert!(report[2].value.ends_with(" kg/ha"));
            let k = number(&report[3].value);
            assert!((150.0..=250.0).contains(&k) && k.fract() == 0.0, "K {k}");
            let oc = number(&report[4].value);
            assert!((0.4..=0.9).contains(&oc), "OC {oc}");
            assert!(report[4].value.ends_with(" %"));
        }
    }

    #[test]
    fn same_seed_same_report() {
        let a = generate(&mut StdRng::seed_from_u64(2024));
        let b = generate(&mut StdRng::seed_from_u64(2024));
        assert_eq!(a, b);
    }

    #[test]
    fn value_formatting_uses_fixed_decimals() {
        let report = generate(&mut StdRng::seed_from_u64(1));
        let ph = &report[0].value;
        assert_eq!(ph.split('.').nth(1).map(str::len), Some(1));
        let oc = report[4].value.trim_end_matches(" %");
        assert_eq!(oc.split('.').nth(1).map(str::len), Some(2));
        assert_eq!(report[0].name, "pH Level");
        assert_eq!(report[4].ideal, "> 0.75%");
    }
}
