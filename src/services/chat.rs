use crate::models::{ConversationSummary, Message, ModelId};
use crate::services::http::ClientError;
use crate::services::reveal::Reveal;

/// What the view has to fetch after mounting or switching conversations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bootstrap {
    LoggedOut,
    Fetch {
        /// Messages to load, tagged with the conversation active at issue time.
        conversation_id: Option<String>,
    },
}

/// A user message accepted by `submit`, ready to be persisted and queried.
#[derive(Debug, Clone)]
pub struct Outgoing {
    pub message: Message,
    pub model: ModelId,
    /// The raw input, untrimmed.
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendPhase {
    Idle,
    AwaitingReply,
    Streaming,
}

#[derive(Debug, Clone)]
pub enum ReplyOutcome {
    /// A placeholder was appended; drive it with `ticks` calls to `reveal_tick`.
    Reveal { message_id: String, ticks: usize },
    /// Nothing to animate; the message is complete and should be persisted.
    Finished(Message),
}

#[derive(Debug, Clone)]
pub enum TickOutcome {
    Revealing,
    Finished(Message),
    Unknown,
}

#[derive(Debug)]
struct ActiveReveal {
    message_id: String,
    conversation_id: String,
    reveal: Reveal,
}

/// State of the chat view, independent of any widget toolkit.
#[derive(Debug, Default)]
pub struct ChatState {
    logged_in: bool,
    active: Option<String>,
    messages: Vec<Message>,
    /// Ids of messages appended since the conversation was opened.
    local_ids: Vec<String>,
    conversations: Vec<ConversationSummary>,
    model: ModelId,
    pending_replies: usize,
    reveals: Vec<ActiveReveal>,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn conversations(&self) -> &[ConversationSummary] {
        &self.conversations
    }

    pub fn active_conversation(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    pub fn set_model(&mut self, model: ModelId) {
        self.model = model;
    }

    /// True while any reply is awaited or still being revealed.
    pub fn typing(&self) -> bool {
        self.pending_replies > 0 || !self.reveals.is_empty()
    }

    pub fn phase(&self) -> SendPhase {
        if !self.reveals.is_empty() {
            SendPhase::Streaming
        } else if self.pending_replies > 0 {
            SendPhase::AwaitingReply
        } else {
            SendPhase::Idle
        }
    }

    // --- Bootstrap & navigation ---

    pub fn bootstrap(&mut self, logged_in: bool) -> Bootstrap {
        self.logged_in = logged_in;
        if !logged_in {
            return Bootstrap::LoggedOut;
        }
        Bootstrap::Fetch {
            conversation_id: self.active.clone(),
        }
    }

    /// Switch to another conversation. Returns `false` when it is already open,
    /// in which case nothing needs to be fetched again.
    pub fn navigate(&mut self, conversation_id: &str) -> bool {
        if self.active.as_deref() == Some(conversation_id) {
            return false;
        }
        self.active = Some(conversation_id.to_string());
        self.messages.clear();
        self.local_ids.clear();
        true
    }

    /// Apply a message fetch. Failures and results for a conversation that is
    /// no longer open leave the list as it was and return `false`.
    ///
    /// Messages sent or received since the conversation was opened stay after
    /// the fetched history.
    pub fn messages_loaded(
        &mut self,
        conversation_id: &str,
        result: Result<Vec<Message>, ClientError>,
    ) -> bool {
        if self.active.as_deref() != Some(conversation_id) {
            tracing::debug!("Discarding stale messages for {}", conversation_id);
            return false;
        }
        let mut messages = match result {
            Ok(messages) => messages,
            Err(e) => {
                tracing::error!("Failed to load messages for {}: {}", conversation_id, e);
                return false;
            }
        };

        let local = std::mem::take(&mut self.messages)
            .into_iter()
            .filter(|m| self.local_ids.contains(&m.id));
        messages.extend(local);
        self.messages = messages;
        true
    }

    /// Apply a conversation list fetch, newest first. A failure keeps the
    /// previous list and returns `false`.
    pub fn conversations_loaded(
        &mut self,
        result: Result<Vec<ConversationSummary>, ClientError>,
    ) -> bool {
        match result {
            Ok(mut conversations) => {
                conversations.reverse();
                self.conversations = conversations;
                true
            }
            Err(e) => {
                tracing::error!("Failed to load conversations: {}", e);
                false
            }
        }
    }

    // --- Sending ---

    pub fn submit(&mut self, input: &str) -> Option<Outgoing> {
        if input.trim().is_empty() {
            return None;
        }
        let conversation_id = self.active.clone()?;

        let message = Message::user(&conversation_id, input);
        self.push_local(message.clone());
        self.pending_replies += 1;

        Some(Outgoing {
            message,
            model: self.model,
            query: input.to_string(),
        })
    }

    pub fn reply_failed(&mut self) {
        self.pending_replies = self.pending_replies.saturating_sub(1);
    }

    pub fn reply_received(&mut self, conversation_id: &str, reply: String) -> ReplyOutcome {
        self.pending_replies = self.pending_replies.saturating_sub(1);

        if self.active.as_deref() != Some(conversation_id) {
            return ReplyOutcome::Finished(Message::system(conversation_id, &reply));
        }

        let placeholder = Message::system(conversation_id, "");
        let message_id = placeholder.id.clone();
        self.push_local(placeholder);

        let reveal = Reveal::new(reply);
        if reveal.is_done() {
            let mut message = Message::system(conversation_id, reveal.full_text());
            message.id = message_id;
            return ReplyOutcome::Finished(message);
        }

        let ticks = reveal.tick_count();
        self.reveals.push(ActiveReveal {
            message_id: message_id.clone(),
            conversation_id: conversation_id.to_string(),
            reveal,
        });
        ReplyOutcome::Reveal { message_id, ticks }
    }

    /// Reveal one more character of the reply shown in `message_id`.
    pub fn reveal_tick(&mut self, message_id: &str) -> TickOutcome {
        let Some(pos) = self.reveals.iter().position(|r| r.message_id == message_id) else {
            return TickOutcome::Unknown;
        };

        let active = &mut self.reveals[pos];
        active.reveal.advance();
        if let Some(msg) = self.messages.iter_mut().find(|m| m.id == message_id) {
            msg.text = active.reveal.display().to_string();
        }

        if !active.reveal.is_done() {
            return TickOutcome::Revealing;
        }

        let done = self.reveals.remove(pos);
        let mut message = Message::system(&done.conversation_id, done.reveal.full_text());
        message.id = done.message_id;
        TickOutcome::Finished(message)
    }

    fn push_local(&mut self, message: Message) {
        self.local_ids.push(message.id.clone());
        self.messages.push(message);
    }

    /// A message of the open conversation.
    pub fn message(&self, message_id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == message_id)
    }

    pub fn message_text(&self, message_id: &str) -> Option<&str> {
        self.message(message_id).map(|m| m.text.as_str())
    }
}
