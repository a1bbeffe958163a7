//! In-memory collaborators for view tests

use async_trait::async_trait;
use chrono::Utc;
use futures::channel::oneshot;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::api::{AuthApi, ConversationsApi};
use crate::types::{Conversation, Message, MessageRole, User};
use crate::{ApiError, Result};

/// A recorded collaborator call
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    List,
    Create(String),
    GetMessages(String),
    SendMessage(String, String),
}

/// Operations that can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Op {
    List,
    Create,
    GetMessages,
    SendMessage,
}

#[derive(Default)]
struct Backend {
    conversations: Vec<Conversation>,
    messages: HashMap<String, Vec<Message>>,
    calls: Vec<Call>,
    failing: HashSet<Op>,
}

/// Conversations backend that stores everything in memory and replies with
/// an echo of the user's message.
#[derive(Default)]
pub(crate) struct FakeConversations {
    backend: Mutex<Backend>,
    send_gate: Mutex<Option<oneshot::Receiver<()>>>,
    message_gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn conversation(id: &str, title: &str) -> Conversation {
    Conversation {
        id: id.to_string(),
        title: title.to_string(),
        created_at: Some(Utc::now()),
        updated_at: Some(Utc::now()),
    }
}

pub(crate) fn message(conversation_id: &str, role: MessageRole, content: &str) -> Message {
    Message {
        id: uuid::Uuid::new_v4().to_string(),
        conversation_id: conversation_id.to_string(),
        role,
        content: content.to_string(),
        created_at: Utc::now(),
    }
}

impl FakeConversations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_conversation(self, conversation: Conversation, messages: Vec<Message>) -> Self {
        {
            let mut backend = lock(&self.backend);
            backend
                .messages
                .insert(conversation.id.clone(), messages);
            backend.conversations.push(conversation);
        }
        self
    }

    pub fn fail(&self, op: Op) {
        lock(&self.backend).failing.insert(op);
    }

    pub fn recover(&self, op: Op) {
        lock(&self.backend).failing.remove(&op);
    }

    pub fn calls(&self) -> Vec<Call> {
        lock(&self.backend).calls.clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        lock(&self.backend).calls.iter().filter(|c| matches(c)).count()
    }

    pub fn stored_messages(&self, conversation_id: &str) -> Vec<Message> {
        lock(&self.backend)
            .messages
            .get(conversation_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Hold the next `send_message` until the returned sender fires.
    pub fn gate_send(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *lock(&self.send_gate) = Some(rx);
        tx
    }

    /// Hold the next `get_messages` for this conversation until the returned
    /// sender fires.
    pub fn gate_messages(&self, conversation_id: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        lock(&self.message_gates).insert(conversation_id.to_string(), rx);
        tx
    }

    fn record(&self, call: Call, op: Op) -> Result<()> {
        let mut backend = lock(&self.backend);
        backend.calls.push(call);
        if backend.failing.contains(&op) {
            return Err(ApiError::Status {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                body: "boom".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ConversationsApi for FakeConversations {
    async fn list(&self) -> Result<Vec<Conversation>> {
        self.record(Call::List, Op::List)?;
        Ok(lock(&self.backend).conversations.clone())
    }

    async fn create(&self, title: &str) -> Result<Conversation> {
        self.record(Call::Create(title.to_string()), Op::Create)?;
        let created = conversation(&uuid::Uuid::new_v4().to_string(), title);
        let mut backend = lock(&self.backend);
        backend.conversations.insert(0, created.clone());
        backend.messages.insert(created.id.clone(), Vec::new());
        Ok(created)
    }

    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let gate = lock(&self.message_gates).remove(conversation_id);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.record(Call::GetMessages(conversation_id.to_string()), Op::GetMessages)?;
        Ok(self.stored_messages(conversation_id))
    }

    async fn send_message(&self, conversation_id: &str, content: &str) -> Result<Message> {
        let gate = lock(&self.send_gate).take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.record(
            Call::SendMessage(conversation_id.to_string(), content.to_string()),
            Op::SendMessage,
        )?;
        let reply = message(conversation_id, MessageRole::Assistant, &format!("echo: {content}"));
        let mut backend = lock(&self.backend);
        let thread = backend
            .messages
            .entry(conversation_id.to_string())
            .or_default();
        thread.push(message(conversation_id, MessageRole::User, content));
        thread.push(reply.clone());
        Ok(reply)
    }
}

/// Auth service that accepts every well-formed request unless told otherwise.
#[derive(Default)]
pub(crate) struct FakeAuth {
    user: Mutex<Option<User>>,
    failure: Mutex<Option<String>>,
    calls: Mutex<Vec<String>>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FakeAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(email: &str) -> Self {
        let auth = Self::default();
        *lock(&auth.user) = Some(User {
            id: "u1".to_string(),
            email: email.to_string(),
        });
        auth
    }

    /// Make every call fail with this message.
    pub fn fail_with(&self, message: &str) {
        *lock(&self.failure) = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// Hold the next call until the returned sender fires.
    pub fn gate(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *lock(&self.gate) = Some(rx);
        tx
    }

    async fn enter(&self, call: String) -> Result<()> {
        lock(&self.calls).push(call);
        let gate = lock(&self.gate).take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        match lock(&self.failure).clone() {
            Some(message) => Err(ApiError::Auth(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AuthApi for FakeAuth {
    async fn sign_up(&self, email: &str, _password: &str) -> Result<()> {
        self.enter(format!("sign_up:{email}")).await
    }

    async fn sign_in(&self, email: &str, _password: &str) -> Result<User> {
        self.enter(format!("sign_in:{email}")).await?;
        let user = User {
            id: "u1".to_string(),
            email: email.to_string(),
        };
        *lock(&self.user) = Some(user.clone());
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        *lock(&self.user) = None;
        self.enter("sign_out".to_string()).await
    }

    fn current_user(&self) -> Option<User> {
        lock(&self.user).clone()
    }
}
