//! Historial del chatbot y envío de mensajes.
//!
//! Sólo se admite una petición en vuelo: mientras el asistente está ocupado,
//! un segundo envío se rechaza sin tocar el historial, así que las respuestas
//! se añaden siempre en el orden de las preguntas.
//!
//! La pregunta se resuelve en una tarea propia: aunque el cliente se desconecte
//! a mitad de la respuesta, el turno del bot llega igualmente al historial.

use std::sync::{Arc, Mutex};

use tracing::{error, info};

use crate::app_state::lock;
use crate::errors::PlannerError;
use crate::llm::{AssistantAdapter, AssistantBackend};
use crate::models::ChatMessage;

pub const GREETING: &str =
    "Hello! I am AgriBot. How can I assist you with your farming questions today?";

pub struct Chatbot {
    assistant: Arc<tokio::sync::Mutex<AssistantAdapter>>,
    transcript: Arc<Mutex<Vec<ChatMessage>>>,
}

impl Chatbot {
    pub fn new(backend: Arc<dyn AssistantBackend>) -> Self {
        Self {
            assistant: Arc::new(tokio::sync::Mutex::new(AssistantAdapter::new(backend))),
            transcript: Arc::new(Mutex::new(vec![ChatMessage::bot(GREETING)])),
        }
    }

    pub fn transcript(&self) -> Vec<ChatMessage> {
        lock(&self.transcript).clone()
    }

    /// Añade el turno del usuario y, al completarse, exactamente un turno del bot.
    pub async fn send(&self, text: &str) -> Result<ChatMessage, PlannerError> {
        if text.trim().is_empty() {
            return Err(PlannerError::InvalidInput("mensaje vacío".to_string()));
        }
        let mut assistant = self
            .assistant
            .clone()
            .try_lock_owned()
            .map_err(|_| PlannerError::Busy)?;

        lock(&self.transcript).push(ChatMessage::user(text));

        // El candado viaja con la tarea: se libera cuando el turno del bot ya está escrito.
        let transcript = self.transcript.clone();
        let prompt = text.to_string();
        let turn = tokio::spawn(async move {
            let reply = ChatMessage::bot(assistant.ask(&prompt).await);
            lock(&transcript).push(reply.clone());
            reply
        });

        turn.await.map_err(|e| {
            error!("La tarea del asistente terminó de forma inesperada: {}", e);
            PlannerError::Assistant(e.to_string())
        })
    }

    /// Fin de la sesión: libera la conversación con el servicio externo.
    pub async fn end_session(&self) {
        self.assistant.lock().await.close();
        info!("Sesión del asistente liberada.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::tests::{EchoBackend, UnreachableBackend};
    use crate::llm::{AssistantBackend, ChatSession, APOLOGY};
    use crate::models::Sender;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;

    #[test]
    fn transcript_starts_with_greeting() {
        let bot = Chatbot::new(Arc::new(EchoBackend::default()));
        assert_eq!(bot.transcript(), vec![ChatMessage::bot(GREETING)]);
    }

    #[tokio::test]
    async fn failure_appends_exactly_one_apology() {
        let bot = Chatbot::new(Arc::new(UnreachableBackend));
        let reply = bot.send("When to sow wheat?").await.unwrap();
        assert_eq!(reply, ChatMessage::bot(APOLOGY));

        let transcript = bot.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1], ChatMessage::user("When to sow wheat?"));
        assert_eq!(transcript.iter().filter(|m| m.text == APOLOGY).count(), 1);
    }

    #[tokio::test]
    async fn blank_messages_are_rejected_without_side_effects() {
        let bot = Chatbot::new(Arc::new(EchoBackend::default()));
        let err = bot.send("   ").await.unwrap_err();
        assert!(matches!(err, PlannerError::InvalidInput(_)));
        assert_eq!(bot.transcript().len(), 1);
    }

    #[tokio::test]
    async fn replies_follow_question_order() {
        let bot = Chatbot::new(Arc::new(EchoBackend::default()));
        bot.send("first").await.unwrap();
        bot.send("second").await.unwrap();
        let senders: Vec<Sender> = bot.transcript().iter().map(|m| m.sender).collect();
        assert_eq!(
            senders,
            vec![Sender::Bot, Sender::User, Sender::Bot, Sender::User, Sender::Bot]
        );
        assert!(bot.transcript()[4].text.ends_with("second"));
    }

    struct GatedSession {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl ChatSession for GatedSession {
        async fn send(&mut self, _prompt: &str) -> Result<String, PlannerError> {
            self.gate.notified().await;
            Ok("done".to_string())
        }
    }

    struct GatedBackend {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl AssistantBackend for GatedBackend {
        async fn open_session(&self) -> Result<Box<dyn ChatSession>, PlannerError> {
            Ok(Box::new(GatedSession { gate: self.gate.clone() }))
        }
    }

    #[tokio::test]
    async fn second_send_while_in_flight_is_busy() {
        let gate = Arc::new(Notify::new());
        let bot = Arc::new(Chatbot::new(Arc::new(GatedBackend { gate: gate.clone() })));

        let in_flight = {
            let bot = bot.clone();
            tokio::spawn(async move { bot.send("slow question").await })
        };
        while bot.transcript().len() < 2 {
            tokio::task::yield_now().await;
        }

        let err = bot.send("impatient").await.unwrap_err();
        assert!(matches!(err, PlannerError::Busy));
        assert_eq!(bot.transcript().len(), 2);

        gate.notify_one();
        let reply = in_flight.await.unwrap().unwrap();
        assert_eq!(reply.text, "done");
        assert_eq!(bot.transcript().len(), 3);
    }

    #[tokio::test]
    async fn abandoned_request_still_records_the_reply() {
        let gate = Arc::new(Notify::new());
        let bot = Chatbot::new(Arc::new(GatedBackend { gate: gate.clone() }));

        // El cliente se va antes de que el asistente conteste.
        let abandoned = tokio::time::timeout(Duration::from_millis(50), bot.send("q")).await;
        assert!(abandoned.is_err());
        assert_eq!(bot.transcript().last(), Some(&ChatMessage::user("q")));

        gate.notify_one();
        tokio::time::timeout(Duration::from_secs(5), async {
            while bot.transcript().len() < 3 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        let transcript = bot.transcript();
        assert_eq!(transcript[1], ChatMessage::user("q"));
        assert_eq!(transcript[2], ChatMessage::bot("done"));

        // El asistente vuelve a estar libre para la siguiente pregunta.
        gate.notify_one();
        assert_eq!(bot.send("again").await.unwrap().text, "done");
        assert_eq!(bot.transcript().len(), 5);
    }
}
