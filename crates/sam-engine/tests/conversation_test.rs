use async_trait::async_trait;
use sam_engine::chat::{ChatBackend, ChatClient, ChatError, ChatMessage, Conversation, Role};
use sam_engine::CommandKind;
use std::sync::{Arc, Mutex};

#[test]
fn test_history_never_exceeds_cap() {
    let mut conversation = Conversation::new(3);
    assert_eq!(conversation.capacity(), 6);
    for i in 0..10 {
        conversation.record(format!("q{}", i), format!("a{}", i));
        assert!(conversation.len() <= 6);
    }

    let contents: Vec<&str> = conversation.messages().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["q7", "a7", "q8", "a8", "q9", "a9"]);
    assert_eq!(conversation.messages().next().map(|m| m.role), Some(Role::User));
}

#[test]
fn test_zero_turns_keeps_nothing() {
    let mut conversation = Conversation::new(0);
    conversation.record("q", "a");
    assert!(conversation.is_empty());
}

struct EchoBackend {
    seen: Arc<Mutex<Vec<usize>>>,
}

#[async_trait]
impl ChatBackend for EchoBackend {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        self.seen.lock().unwrap().push(messages.len());
        let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        Ok(format!("echo: {}", last))
    }
}

#[tokio::test]
async fn test_client_context_is_bounded() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut client = ChatClient::new(Box::new(EchoBackend { seen: seen.clone() }), "system", 2);

    for i in 0..5 {
        let answer = client.ask(&format!("message {}", i)).await.unwrap();
        assert_eq!(answer, format!("echo: message {}", i));
    }

    // system + history (0, 2, 4, 4, 4) + user
    assert_eq!(*seen.lock().unwrap(), vec![2, 4, 6, 6, 6]);
    assert_eq!(client.history().len(), 4);

    client.clear_history();
    assert!(client.history().is_empty());
}

#[tokio::test]
async fn test_analyze_command_falls_back_to_chat() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let client = ChatClient::new(Box::new(EchoBackend { seen }), "system", 2);

    let command = client.analyze_command("what's up").await;
    assert_eq!(command.kind, CommandKind::Chat);
    assert_eq!(command.param("message"), Some("what's up"));
    assert!(client.history().is_empty());
}
