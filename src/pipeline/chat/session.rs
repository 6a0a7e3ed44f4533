use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::assistant::{ChatAssistant, REFUSAL_MESSAGE, UNAVAILABLE_MESSAGE};
use super::context::{reset_chat_context, ChatContext};
use super::ChatError;
use crate::models::SafetyReport;
use crate::pipeline::engine::ReviewEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatState {
    Idle,
    ContextReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: &str) -> Self {
        Self {
            role: ChatRole::User,
            content: content.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: &str) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// One clinician's conversation about the current report.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub state: ChatState,
    pub history: Vec<ChatMessage>,
    pub context: Option<ChatContext>,
    pub last_error: Option<String>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            state: ChatState::Idle,
            history: Vec::new(),
            context: None,
            last_error: None,
        }
    }

    /// Point the session at `report`. History is cleared only when the report
    /// content changed.
    pub fn sync_with_report(&mut self, report: &SafetyReport, input_summary: &str) {
        let previous = self.context.take();
        let previous_fingerprint = previous.as_ref().map(|c| c.fingerprint.clone());
        let context = reset_chat_context(previous, report, input_summary);

        if previous_fingerprint.as_deref() != Some(context.fingerprint.as_str()) {
            self.history.clear();
            self.last_error = None;
        }
        self.context = Some(context);
        self.state = ChatState::ContextReady;
    }

    /// Ask a question, recording both turns.
    pub fn ask<E: ReviewEngine + ?Sized>(
        &mut self,
        assistant: &ChatAssistant<'_, E>,
        user_text: &str,
    ) -> Result<String, ChatError> {
        let context = self.context.as_ref().ok_or(ChatError::NoContext)?;

        let answer = match assistant.try_reply(context, &self.history, user_text) {
            Ok(answer) => {
                self.last_error = None;
                answer
            }
            Err(ChatError::Refused(_)) => REFUSAL_MESSAGE.to_string(),
            Err(e) => {
                tracing::error!(error = %e, "Chat generation failed");
                self.last_error = Some(e.to_string());
                UNAVAILABLE_MESSAGE.to_string()
            }
        };

        self.history.push(ChatMessage::user(user_text));
        self.history.push(ChatMessage::assistant(&answer));
        Ok(answer)
    }
}
