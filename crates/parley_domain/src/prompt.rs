use crate::{Message, Role};

/// Flattens prior turns plus a new user message into a single completion
/// prompt.
///
/// Each turn becomes a `"<Speaker>: <content>"` line in order. Assistant turns
/// with empty content are skipped, so an in-progress placeholder never leaks
/// into the context. The prompt ends with an open `Assistant:` turn for the
/// model to complete.
pub fn build_prompt(history: &[Message], new_message: &str) -> String {
    let mut prompt = String::new();
    for message in history {
        if message.role == Role::Assistant && message.content.is_empty() {
            continue;
        }
        prompt.push_str(message.role.label());
        prompt.push_str(": ");
        prompt.push_str(&message.content);
        prompt.push('\n');
    }
    prompt.push_str("User: ");
    prompt.push_str(new_message);
    prompt.push_str("\nAssistant:");
    prompt
}
