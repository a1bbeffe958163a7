//! Chat view
//!
//! Lists conversations, tracks the selected one and its messages, and sends
//! new messages with an optimistic local echo that is reconciled against the
//! server once the reply arrives.
//!
//! Message loads are stamped with a generation number. A load only lands if
//! it is still the newest one and its conversation is still selected, so
//! switching quickly between conversations can never show the messages of a
//! conversation that is no longer selected.

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

use super::lock;
use crate::api::{AuthApi, ConversationsApi};
use crate::navigation::{Navigator, Route};
use crate::types::{Conversation, Message};

pub const NEW_CONVERSATION_TITLE: &str = "New Conversation";

pub const LOAD_CONVERSATIONS_FAILED: &str = "Failed to load conversations";
pub const LOAD_MESSAGES_FAILED: &str = "Failed to load messages";
pub const CREATE_CONVERSATION_FAILED: &str = "Failed to create conversation";
pub const SEND_MESSAGE_FAILED: &str = "Failed to send message";

/// Visible state of the chat view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    pub conversations: Vec<Conversation>,
    pub current: Option<Conversation>,
    pub messages: Vec<Message>,
    pub input: String,
    /// A send is in flight
    pub loading: bool,
    pub error: Option<String>,
}

impl ChatState {
    pub fn current_id(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.id.as_str())
    }

    /// Whether the send button is enabled.
    pub fn can_send(&self) -> bool {
        !self.loading && self.current.is_some() && !self.input.trim().is_empty()
    }
}

/// What happened to a send request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input, no conversation selected, or a send already in flight
    Ignored,
    Sent,
    Failed,
}

#[derive(Default)]
struct Inner {
    view: ChatState,
    mounted: bool,
    load_generation: u64,
}

pub struct ChatView {
    conversations: Arc<dyn ConversationsApi>,
    auth: Arc<dyn AuthApi>,
    navigator: Arc<dyn Navigator>,
    state: Mutex<Inner>,
    revision: watch::Sender<u64>,
}

impl ChatView {
    pub fn new(
        conversations: Arc<dyn ConversationsApi>,
        auth: Arc<dyn AuthApi>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            conversations,
            auth,
            navigator,
            state: Mutex::new(Inner::default()),
            revision,
        }
    }

    fn state(&self) -> MutexGuard<'_, Inner> {
        lock(&self.state)
    }

    /// Tell subscribers the message list changed so they scroll to the end.
    fn messages_changed(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    pub fn snapshot(&self) -> ChatState {
        self.state().view.clone()
    }

    /// Receive the message-list revision; it bumps on every change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn user_email(&self) -> Option<String> {
        self.auth.current_user().map(|u| u.email)
    }

    pub fn set_input(&self, input: &str) {
        self.state().view.input = input.to_string();
    }

    /// Load the conversation list the first time the view is shown.
    pub async fn mount(&self) {
        {
            let mut state = self.state();
            if state.mounted {
                return;
            }
            state.mounted = true;
        }
        tracing::debug!("Chat view mounted");
        self.load_conversations().await;
    }

    pub async fn load_conversations(&self) {
        match self.conversations.list().await {
            Ok(conversations) => {
                tracing::debug!("Loaded {} conversations", conversations.len());
                self.state().view.conversations = conversations;
            }
            Err(e) => {
                tracing::error!("Failed to load conversations: {}", e);
                self.state().view.error = Some(LOAD_CONVERSATIONS_FAILED.to_string());
            }
        }
    }

    /// Select a conversation from the list and load its messages.
    ///
    /// Returns `false` if the id is unknown or already selected.
    pub async fn select_conversation(&self, conversation_id: &str) -> bool {
        {
            let mut state = self.state();
            if state.view.current_id() == Some(conversation_id) {
                return false;
            }
            let Some(conversation) = state
                .view
                .conversations
                .iter()
                .find(|c| c.id == conversation_id)
                .cloned()
            else {
                tracing::warn!("Unknown conversation {}", conversation_id);
                return false;
            };
            state.view.current = Some(conversation);
        }
        self.load_messages(conversation_id).await;
        true
    }

    async fn load_messages(&self, conversation_id: &str) {
        let generation = {
            let mut state = self.state();
            // Only the selected conversation may claim a generation
            if state.view.current_id() != Some(conversation_id) {
                tracing::debug!("Skipping message load for unselected {}", conversation_id);
                return;
            }
            state.load_generation += 1;
            state.load_generation
        };

        let result = self.conversations.get_messages(conversation_id).await;

        {
            let mut state = self.state();
            if state.load_generation != generation
                || state.view.current_id() != Some(conversation_id)
            {
                tracing::debug!("Discarding stale messages for {}", conversation_id);
                return;
            }
            match result {
                Ok(messages) => state.view.messages = messages,
                Err(e) => {
                    tracing::error!("Failed to load messages for {}: {}", conversation_id, e);
                    state.view.error = Some(LOAD_MESSAGES_FAILED.to_string());
                    return;
                }
            }
        }
        self.messages_changed();
    }

    /// Create a conversation, put it at the top of the list and open it.
    pub async fn new_conversation(&self) {
        let conversation = match self.conversations.create(NEW_CONVERSATION_TITLE).await {
            Ok(conversation) => conversation,
            Err(e) => {
                tracing::error!("Failed to create conversation: {}", e);
                self.state().view.error = Some(CREATE_CONVERSATION_FAILED.to_string());
                return;
            }
        };
        tracing::info!("Created conversation {}", conversation.id);

        let id = conversation.id.clone();
        {
            let mut state = self.state();
            state.view.conversations.insert(0, conversation.clone());
            state.view.current = Some(conversation);
            state.view.messages.clear();
        }
        self.messages_changed();
        self.load_messages(&id).await;
    }

    /// Send the current input to the selected conversation.
    pub async fn send_message(&self) -> SendOutcome {
        let (conversation_id, content) = {
            let mut state = self.state();
            let view = &mut state.view;
            if view.loading || view.input.trim().is_empty() {
                return SendOutcome::Ignored;
            }
            let Some(conversation_id) = view.current_id().map(str::to_string) else {
                return SendOutcome::Ignored;
            };
            let content = std::mem::take(&mut view.input);
            view.loading = true;
            view.error = None;
            view.messages.push(Message::optimistic(&conversation_id, &content));
            (conversation_id, content)
        };
        self.messages_changed();

        let outcome = match self.conversations.send_message(&conversation_id, &content).await {
            Ok(reply) => {
                let applied = {
                    let mut state = self.state();
                    if state.view.current_id() == Some(conversation_id.as_str()) {
                        state.view.messages.retain(|m| !m.is_temp());
                        state.view.messages.push(reply);
                        true
                    } else {
                        false
                    }
                };
                if applied {
                    self.messages_changed();
                    self.load_messages(&conversation_id).await;
                }
                SendOutcome::Sent
            }
            Err(e) => {
                tracing::error!("Failed to send message to {}: {}", conversation_id, e);
                let mut state = self.state();
                if state.view.current_id() == Some(conversation_id.as_str()) {
                    state.view.error = Some(SEND_MESSAGE_FAILED.to_string());
                }
                SendOutcome::Failed
            }
        };

        self.state().view.loading = false;
        outcome
    }

    /// Sign out and go back to the login screen.
    pub async fn sign_out(&self) {
        // The local session is dropped either way, so leave regardless.
        if let Err(e) = self.auth.sign_out().await {
            tracing::warn!("Sign-out failed: {}", e);
        }
        self.navigator.navigate(Route::Login);
    }
}
