use super::classify::classify_query;
use super::context::ChatContext;
use super::prompt::build_prompt_with_history;
use super::session::ChatMessage;
use super::ChatError;
use crate::pipeline::engine::{GenerationOptions, ReviewEngine};

pub const REFUSAL_MESSAGE: &str = "This assistant can clarify the audit results only. It cannot provide diagnosis, treatment advice, or image interpretation.";

pub const UNAVAILABLE_MESSAGE: &str = "Local review engine unavailable.";

/// Remove chat-template artifacts from a generated answer.
pub fn postprocess_answer(text: &str) -> String {
    text.replace("Assistant:", "").trim().to_string()
}

/// Answers follow-up questions from a [`ChatContext`] only.
pub struct ChatAssistant<'a, E: ReviewEngine + ?Sized> {
    engine: &'a E,
    options: GenerationOptions,
}

impl<'a, E: ReviewEngine + ?Sized> ChatAssistant<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self {
            engine,
            options: GenerationOptions::chat(),
        }
    }

    /// Reply to one question. Refusals and engine failures come back as
    /// fixed messages; a refused question never reaches the model.
    pub fn generate_reply(&self, context: &ChatContext, user_text: &str) -> String {
        self.reply_in_conversation(context, &[], user_text)
    }

    pub fn reply_in_conversation(
        &self,
        context: &ChatContext,
        history: &[ChatMessage],
        user_text: &str,
    ) -> String {
        match self.try_reply(context, history, user_text) {
            Ok(answer) => answer,
            Err(ChatError::Refused(_)) => REFUSAL_MESSAGE.to_string(),
            Err(e) => {
                tracing::error!(error = %e, "Chat generation failed");
                UNAVAILABLE_MESSAGE.to_string()
            }
        }
    }

    /// Reply with the failure kept as an error.
    pub fn try_reply(
        &self,
        context: &ChatContext,
        history: &[ChatMessage],
        user_text: &str,
    ) -> Result<String, ChatError> {
        let classification = classify_query(user_text);
        if !classification.allowed {
            tracing::info!(category = ?classification.category, "Chat query refused");
            return Err(ChatError::Refused(classification.reason));
        }

        let prompt = build_prompt_with_history(context, history, user_text);
        let raw = self.engine.generate_text(&prompt, &self.options)?;
        Ok(postprocess_answer(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::report;
    use crate::pipeline::chat::context::build_chat_context;
    use crate::pipeline::engine::MockReviewEngine;

    fn context() -> ChatContext {
        build_chat_context(&report(vec![]), "summary")
    }

    #[test]
    fn refused_query_never_reaches_engine() {
        let engine = MockReviewEngine::new();
        let reply = ChatAssistant::new(&engine).generate_reply(&context(), "What dose should I prescribe?");
        assert_eq!(reply, REFUSAL_MESSAGE);
        assert!(engine.prompts().is_empty());
    }

    #[test]
    fn allowed_query_is_answered_and_cleaned() {
        let engine = MockReviewEngine::new().with_text("Assistant: The flag cites INR 3.4.");
        let reply = ChatAssistant::new(&engine).generate_reply(&context(), "Why was the flag raised?");
        assert_eq!(reply, "The flag cites INR 3.4.");
        assert_eq!(engine.prompts().len(), 1);
    }

    #[test]
    fn engine_failure_gives_fixed_message() {
        let engine = MockReviewEngine::new().failing("http://localhost:11434");
        let reply = ChatAssistant::new(&engine).generate_reply(&context(), "Explain the summary");
        assert_eq!(reply, UNAVAILABLE_MESSAGE);
    }

    #[test]
    fn try_reply_surfaces_errors() {
        let engine = MockReviewEngine::new().failing("h");
        let err = ChatAssistant::new(&engine)
            .try_reply(&context(), &[], "Explain the summary")
            .unwrap_err();
        assert!(matches!(err, ChatError::Generation(_)));
    }

    #[test]
    fn postprocess_strips_prefix() {
        assert_eq!(postprocess_answer("  Assistant: hi "), "hi");
    }
}
