use std::sync::{Arc, Mutex, MutexGuard};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::oneshot;
use crate::{
    chat::Chatbot, config::AppConfig, dataset::CropDataset, geocoding::Geocoder,
    llm::AssistantBackend, navigation::Navigator,
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub dataset: Arc<CropDataset>,
    pub navigator: Arc<Mutex<Navigator>>,
    pub chatbot: Arc<Chatbot>,
    pub geocoder: Arc<dyn Geocoder>,
    pub rng: Arc<Mutex<StdRng>>,
    pub shutdown_sender: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        dataset: CropDataset,
        assistant: Arc<dyn AssistantBackend>,
        geocoder: Arc<dyn Geocoder>,
        rng: StdRng,
        shutdown_sender: Option<oneshot::Sender<()>>,
    ) -> Self {
        Self {
            config,
            dataset: Arc::new(dataset),
            navigator: Arc::new(Mutex::new(Navigator::new())),
            chatbot: Arc::new(Chatbot::new(assistant)),
            geocoder,
            rng: Arc::new(Mutex::new(rng)),
            shutdown_sender: Arc::new(Mutex::new(shutdown_sender)),
        }
    }

    pub fn with_entropy(
        config: AppConfig,
        dataset: CropDataset,
        assistant: Arc<dyn AssistantBackend>,
        geocoder: Arc<dyn Geocoder>,
        shutdown_sender: oneshot::Sender<()>,
    ) -> Self {
        Self::new(config, dataset, assistant, geocoder, StdRng::from_entropy(), Some(shutdown_sender))
    }
}

/// Bloquea un mutex aunque esté envenenado: el estado sigue siendo coherente
/// porque cada transición se aplica completa bajo el cerrojo.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
