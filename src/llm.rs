//! Abstracción sobre Rig para la conversación con el asistente agrícola.
//!
//! La sesión de chat se abre de forma perezosa en la primera pregunta y se
//! reutiliza mientras viva el adaptador, conservando los turnos anteriores para
//! que el modelo mantenga el contexto. Se implementan Gemini y OpenAI.

use std::sync::Arc;

use async_trait::async_trait;
use rig::completion::{Chat, CompletionModel};
use rig::message::Message;
use tracing::{debug, error, warn};

use crate::config::{AppConfig, LlmProvider};
use crate::errors::PlannerError;

pub const SYSTEM_INSTRUCTION: &str = r#"
You are AgriBot, an expert agricultural assistant for the Smart Farm Planner Pro application.
Your role is to provide concise, practical, and actionable advice to farmers.
Focus on topics like crop management, soil health, pest control, irrigation techniques, and market trends.
Keep your answers clear, easy to understand, and directly related to the user's questions.
Do not go off-topic. All your responses should be related to farming and agriculture.
"#;

pub const EMPTY_REPLY: &str = "Sorry, I could not generate a response. Please try again.";
pub const APOLOGY: &str =
    "Sorry, I'm having trouble connecting to my knowledge base right now. Please try again later.";

/// Una conversación abierta con el servicio externo.
#[async_trait]
pub trait ChatSession: Send {
    async fn send(&mut self, prompt: &str) -> Result<String, PlannerError>;
}

/// Fábrica de sesiones; en tests se sustituye por un backend falso.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    async fn open_session(&self) -> Result<Box<dyn ChatSession>, PlannerError>;
}

/// Backend real basado en Rig.
#[derive(Debug, Clone)]
pub struct RigBackend {
    pub provider: LlmProvider,
    pub chat_model: String,
}

impl RigBackend {
    /// Construye el backend a partir de la configuración.
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            provider: cfg.llm_provider.clone(),
            chat_model: cfg.llm_chat_model.clone(),
        }
    }

    fn model_name(&self) -> &str {
        if self.chat_model.is_empty() {
            self.provider.default_chat_model()
        } else {
            self.chat_model.as_str()
        }
    }
}

/// El cliente de Rig entra en pánico si falta la clave; se comprueba antes.
fn require_key(var: &str) -> Result<(), PlannerError> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(()),
        _ => Err(PlannerError::Assistant(format!("Falta {var} en el entorno"))),
    }
}

#[async_trait]
impl AssistantBackend for RigBackend {
    async fn open_session(&self) -> Result<Box<dyn ChatSession>, PlannerError> {
        // Traits para Client::from_env() y client.agent(...)
        use rig::client::{CompletionClient as _, ProviderClient as _};

        debug!("Abriendo sesión de chat con {:?} ({})", self.provider, self.model_name());
        match self.provider {
            LlmProvider::Gemini => {
                use rig::providers::gemini;
                require_key("GEMINI_API_KEY")?;
                let client = gemini::Client::from_env();
                let agent = client
                    .agent(self.model_name())
                    .preamble(SYSTEM_INSTRUCTION)
                    .build();
                Ok(Box::new(RigChatSession { agent, history: Vec::new() }))
            }
            LlmProvider::OpenAI => {
                use rig::providers::openai;
                require_key("OPENAI_API_KEY")?;
                let client = openai::Client::from_env();
                let agent = client
                    .agent(self.model_name())
                    .preamble(SYSTEM_INSTRUCTION)
                    .build();
                Ok(Box::new(RigChatSession { agent, history: Vec::new() }))
            }
        }
    }
}

struct RigChatSession<M: CompletionModel> {
    agent: rig::agent::Agent<M>,
    history: Vec<Message>,
}

#[async_trait]
impl<M> ChatSession for RigChatSession<M>
where
    M: CompletionModel + 'static,
{
    async fn send(&mut self, prompt: &str) -> Result<String, PlannerError> {
        let answer = self
            .agent
            .chat(prompt.to_string(), self.history.clone())
            .await
            .map_err(|e| PlannerError::Assistant(e.to_string()))?;

        // Sólo los turnos completados pasan al historial.
        self.history.push(Message::user(prompt.to_string()));
        self.history.push(Message::assistant(answer.clone()));
        Ok(answer)
    }
}

/// Adaptador del asistente: nunca propaga errores al llamante.
pub struct AssistantAdapter {
    backend: Arc<dyn AssistantBackend>,
    session: Option<Box<dyn ChatSession>>,
}

impl AssistantAdapter {
    pub fn new(backend: Arc<dyn AssistantBackend>) -> Self {
        Self { backend, session: None }
    }

    #[cfg(test)]
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Pregunta al asistente. Cualquier fallo se convierte en el texto de disculpa.
    pub async fn ask(&mut self, prompt: &str) -> String {
        match self.try_ask(prompt).await {
            Ok(answer) if answer.trim().is_empty() => {
                warn!("El asistente devolvió una respuesta vacía.");
                EMPTY_REPLY.to_string()
            }
            Ok(answer) => answer,
            Err(e) => {
                error!("Error generando la respuesta del chat: {}", e);
                APOLOGY.to_string()
            }
        }
    }

    async fn try_ask(&mut self, prompt: &str) -> Result<String, PlannerError> {
        if self.session.is_none() {
            self.session = Some(self.backend.open_session().await?);
        }
        match self.session.as_mut() {
            Some(session) => session.send(prompt).await,
            None => Err(PlannerError::Assistant("sesión no disponible".to_string())),
        }
    }

    /// Libera la conversación; la siguiente pregunta abrirá una nueva.
    pub fn close(&mut self) {
        if self.session.take().is_some() {
            debug!("Sesión de chat cerrada.");
        }
    }
}
