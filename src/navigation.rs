//! Orquestador de vistas: página actual, pestaña del panel, modo oscuro y el
//! contexto de la finca (perfil + informe de suelo).
//!
//! Toda mutación pasa por las transiciones de `Navigator`; los handlers reciben
//! el navegador a través del estado compartido de la aplicación.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{FarmProfile, SoilIndicator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Welcome,
    Form,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardTab {
    #[default]
    Report,
    Recommendations,
    Insights,
    Chatbot,
}

/// Lo que la interfaz debe pintar ahora mismo.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub page: Page,
    pub tab: DashboardTab,
    pub dark_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farm_profile: Option<FarmProfile>,
    pub soil_report: Vec<SoilIndicator>,
}

#[derive(Debug, Default)]
pub struct Navigator {
    page: Page,
    tab: DashboardTab,
    dark_mode: bool,
    profile: Option<FarmProfile>,
    soil_report: Vec<SoilIndicator>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn tab(&self) -> DashboardTab {
        self.tab
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn profile(&self) -> Option<&FarmProfile> {
        self.profile.as_ref()
    }

    pub fn soil_report(&self) -> &[SoilIndicator] {
        &self.soil_report
    }

    /// welcome → form
    pub fn start(&mut self) {
        if self.page == Page::Welcome {
            self.page = Page::Form;
        }
    }

    /// form → dashboard(report). El informe anterior se reemplaza por completo.
    pub fn submit(&mut self, profile: FarmProfile, soil_report: Vec<SoilIndicator>) {
        debug!("Perfil enviado para: {}", profile.full_address);
        self.profile = Some(profile);
        self.soil_report = soil_report;
        self.page = Page::Dashboard;
        self.tab = DashboardTab::Report;
    }

    /// Cambio libre entre pestañas. Fuera del panel se aplica la guarda de entrada.
    pub fn select_tab(&mut self, tab: DashboardTab) {
        self.tab = tab;
        self.enter_dashboard();
    }

    /// Entrar al panel sin perfil no es válido: se redirige al formulario.
    pub fn enter_dashboard(&mut self) -> Page {
        if self.profile.is_some() {
            self.page = Page::Dashboard;
        } else {
            warn!("Acceso al panel sin perfil de finca; redirigiendo al formulario.");
            self.page = Page::Form;
        }
        self.page
    }

    /// Cualquier estado → welcome, descartando perfil e informe de suelo.
    pub fn reset(&mut self) {
        self.profile = None;
        self.soil_report.clear();
        self.page = Page::Welcome;
        self.tab = DashboardTab::Report;
    }

    pub fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.dark_mode
    }

    pub fn snapshot(&mut self) -> ViewSnapshot {
        if self.page == Page::Dashboard {
            self.enter_dashboard();
        }
        let on_dashboard = self.page == Page::Dashboard;
        ViewSnapshot {
            page: self.page,
            tab: self.tab,
            dark_mode: self.dark_mode,
            farm_profile: if on_dashboard { self.profile.clone() } else { None },
            soil_report: if on_dashboard { self.soil_report.clone() } else { Vec::new() },
        }
    }
}
