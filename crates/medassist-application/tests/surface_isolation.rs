use async_trait::async_trait;
use medassist_application::{AssistantChat, FloatingAssistant, SymptomChecker, TurnOutcome};
use medassist_core::session::{ConversationStatus, GenerativeSession, TurnRole};
use medassist_core::{SessionCredentials, SessionError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Echoes every turn after a short delay and remembers what it was asked.
struct EchoSession {
    name: &'static str,
    delay: Duration,
    seen: Mutex<Vec<String>>,
}

impl EchoSession {
    fn new(name: &'static str, delay_ms: u64) -> Arc<Self> {
        Arc::new(Self {
            name,
            delay: Duration::from_millis(delay_ms),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl GenerativeSession for EchoSession {
    async fn submit(&self, text: &str) -> Result<String, SessionError> {
        self.seen.lock().await.push(text.to_string());
        tokio::time::sleep(self.delay).await;
        Ok(format!("{} heard: {}", self.name, text))
    }
}

fn credentials() -> SessionCredentials {
    SessionCredentials::from_raw(Some("test-key"))
}

#[tokio::test]
async fn interleaved_surfaces_never_see_each_other() {
    let floating_session = EchoSession::new("floating", 20);
    let checker_session = EchoSession::new("checker", 5);

    let floating = FloatingAssistant::mount(floating_session.clone(), credentials());
    let mut checker = SymptomChecker::mount(checker_session.clone(), credentials());
    checker.toggle_symptom("Headache");

    let (floating_outcome, checker_outcome) =
        tokio::join!(floating.send("is this serious?"), checker.analyze());
    assert!(matches!(floating_outcome, Ok(TurnOutcome::Replied(_))));
    assert!(matches!(checker_outcome, Ok(TurnOutcome::Replied(_))));

    let floating_turns = floating.transcript().await.turns;
    let checker_turns = checker.transcript().await.turns;

    assert!(floating_turns.iter().all(|t| !t.content.contains("Analyze")));
    assert!(floating_turns.iter().all(|t| !t.content.contains("checker")));
    assert!(checker_turns.iter().all(|t| !t.content.contains("serious")));
    assert!(checker_turns.iter().all(|t| !t.content.contains("floating")));

    assert_eq!(*floating_session.seen.lock().await, vec!["is this serious?".to_string()]);
    assert_eq!(checker_session.seen.lock().await.len(), 1);
}

#[tokio::test]
async fn busy_on_one_surface_does_not_block_another() {
    let slow = EchoSession::new("slow", 50);
    let fast = EchoSession::new("fast", 0);

    let chat = Arc::new(AssistantChat::mount(slow, credentials()));
    let other = AssistantChat::mount(fast, credentials());

    let pending = tokio::spawn({
        let chat = Arc::clone(&chat);
        async move { chat.send("first").await }
    });
    while chat.conversation().status().await != ConversationStatus::Sending {
        tokio::task::yield_now().await;
    }

    assert_eq!(chat.send("second").await.unwrap_err(), SessionError::Busy);
    assert!(matches!(other.send("elsewhere").await, Ok(TurnOutcome::Replied(_))));

    pending.await.unwrap().unwrap();
    let contents: Vec<_> = chat
        .transcript()
        .await
        .turns
        .into_iter()
        .filter(|t| t.role == TurnRole::User)
        .map(|t| t.content)
        .collect();
    assert_eq!(contents, vec!["first".to_string()]);
}

#[tokio::test]
async fn degraded_mode_is_per_surface_and_offline() {
    let session = EchoSession::new("unused", 0);
    let chat = AssistantChat::mount(session.clone(), SessionCredentials::absent());
    let floating = FloatingAssistant::mount(EchoSession::new("live", 0), credentials());

    chat.send("hello").await.unwrap();
    floating.send("hello").await.unwrap();

    // greeting + notice, no user turn
    let chat_turns = chat.transcript().await.turns;
    assert_eq!(chat_turns.len(), 2);
    assert!(chat_turns.iter().all(|t| t.role == TurnRole::Assistant));
    assert!(session.seen.lock().await.is_empty());

    assert!(floating.credentials_banner().is_none());
    assert_eq!(floating.transcript().await.turns.len(), 3);
}
