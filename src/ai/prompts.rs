//! Prompt text shared by the conversation engine.

/// Reply-format contract prepended to the persona prompt in the system
/// message. The model wraps internal reasoning and user-facing text in one
/// pair of tags each; only the content segment is shown.
pub const REPLY_FORMAT_PROMPT: &str = "Your reply must use the following format, with exactly one pair of think tags and one pair of content tags per reply (<think> with </think>, <content> with </content>):\n\
<think>internal reasoning</think><content>what you want to tell the user</content>\n\
The think segment should hold your read of the situation, your inferences, and how you would respond to the user's likely next moves, to help you keep continuity later.\n\
Character setup:\n";
