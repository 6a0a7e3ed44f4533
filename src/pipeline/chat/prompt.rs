use super::context::ChatContext;
use super::session::{ChatMessage, ChatRole};
use crate::models::truncate_chars;

/// Evidence characters shown per flag.
const EVIDENCE_PREVIEW_CHARS: usize = 150;

/// Prior turns included in a follow-up prompt.
const HISTORY_TURNS: usize = 4;

pub const CHAT_SYSTEM_PROMPT: &str = r#"You are the Sentinel Safety Assistant.
Your precise role is to explain the Safety Review findings to a clinician.

## STRICT RULES:
1. NO DIAGNOSIS: Do not diagnose conditions or interpret medical images.
2. NO TREATMENT: Do not recommend medications, dosages, or treatment plans.
3. GROUNDED ONLY: You can ONLY discuss the Flags and Missing Information listed below. If the question is about anything else, say you don't know.
4. KEYWORD: Use "Review" or "Consider" instead of "must" or "should"."#;

/// Build a grounded instruction for one question.
pub fn build_prompt(context: &ChatContext, user_text: &str) -> String {
    build_prompt_with_history(context, &[], user_text)
}

/// Same as [`build_prompt`], with the most recent turns of the conversation.
pub fn build_prompt_with_history(
    context: &ChatContext,
    history: &[ChatMessage],
    user_text: &str,
) -> String {
    let flags_block = if context.flags.is_empty() {
        "- None".to_string()
    } else {
        context
            .flags
            .iter()
            .enumerate()
            .map(|(i, flag)| {
                let evidence = context
                    .evidence_index
                    .get(&i)
                    .map(|e| truncate_chars(e, EVIDENCE_PREVIEW_CHARS))
                    .unwrap_or("");
                format!(
                    "- [{}] {}: {} (Evidence: {})",
                    flag.severity, flag.category, flag.explanation, evidence
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let missing_info = if context.missing_info.is_empty() {
        "None".to_string()
    } else {
        context.missing_info.join(", ")
    };

    let mut prompt = format!(
        "{CHAT_SYSTEM_PROMPT}\n\n## REVIEW CONTEXT:\nInput Summary: {}\n\nSafety Flags Found:\n{flags_block}\n\nMissing Info / Clarifications:\n{missing_info}\n\n",
        context.input_summary
    );

    let skip = history.len().saturating_sub(HISTORY_TURNS);
    let recent = &history[skip..];
    if !recent.is_empty() {
        prompt.push_str("## CONVERSATION SO FAR:\n");
        for msg in recent {
            let role = match msg.role {
                ChatRole::User => "Clinician",
                ChatRole::Assistant => "Assistant",
            };
            prompt.push_str(&format!("{role}: {}\n", msg.content));
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!(
        "User Question: {user_text}\n\nAnswer concisely (3-4 sentences max). Use bullet points if listing evidence."
    ));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{evidence, flag, report};
    use crate::models::{EvidenceSource, Severity};
    use crate::pipeline::chat::context::build_chat_context;

    fn context() -> ChatContext {
        let mut r = report(vec![flag(
            Severity::High,
            0.9,
            vec![evidence(&"INR 3.4 ".repeat(40), EvidenceSource::Labs)],
        )]);
        r.missing_info_questions = vec!["When was INR last checked?".into()];
        build_chat_context(&r, "Clinical Note Content:\nHPI")
    }

    #[test]
    fn prompt_lists_flags_and_questions() {
        let prompt = build_prompt(&context(), "Why was this raised?");
        assert!(prompt.contains("- [HIGH] OTHER: Potential issue noted in the record"));
        assert!(prompt.contains("When was INR last checked?"));
        assert!(prompt.ends_with("Use bullet points if listing evidence."));
        assert!(prompt.contains("User Question: Why was this raised?"));
    }

    #[test]
    fn evidence_is_truncated() {
        let prompt = build_prompt(&context(), "q");
        let line = prompt.lines().find(|l| l.starts_with("- [HIGH]")).unwrap();
        let evidence = line.split("(Evidence: ").nth(1).unwrap().trim_end_matches(')');
        assert!(evidence.chars().count() <= EVIDENCE_PREVIEW_CHARS);
    }

    #[test]
    fn empty_report_says_none() {
        let ctx = build_chat_context(&report(vec![]), "s");
        let prompt = build_prompt(&ctx, "q");
        assert!(prompt.contains("Safety Flags Found:\n- None"));
    }

    #[test]
    fn history_limited_to_recent_turns() {
        let history: Vec<ChatMessage> = (0..6)
            .map(|i| ChatMessage::user(&format!("turn {i}")))
            .collect();
        let prompt = build_prompt_with_history(&context(), &history, "q");
        assert!(!prompt.contains("turn 1\n"));
        assert!(prompt.contains("Clinician: turn 5"));
        assert!(prompt.contains("Clinician: turn 2"));
    }
}
