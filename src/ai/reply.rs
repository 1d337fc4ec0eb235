//! Parsing for the two-tag reply convention:
//! `<think>...</think><content>...</content>`.

/// Extract the user-facing `<content>` segment (first occurrence, may span
/// lines). `None` when the wrapper is missing or unterminated.
pub fn extract_content(raw: &str) -> Option<String> {
    extract_tag(raw, "<content>", "</content>")
}

/// Display text for a model reply: the content segment, or empty when the
/// tags are missing or malformed. Degrading to an empty string (rather than
/// leaking the raw reply with its think segment) is deliberate.
pub fn display_model_reply(raw: &str) -> String {
    extract_content(raw).unwrap_or_default()
}

/// Display text for an action-supplied message: falls back to the whole
/// string when the wrapper is missing or malformed, since callers on that
/// boundary are not required to use the convention.
pub fn display_action_message(raw: &str) -> String {
    extract_content(raw).unwrap_or_else(|| raw.to_string())
}

fn extract_tag(raw: &str, open: &str, close: &str) -> Option<String> {
    let start = raw.find(open)? + open.len();
    let end = raw[start..].find(close)? + start;
    Some(raw[start..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_reply_yields_content() {
        let raw = "<think>x</think><content>hello</content>";
        assert_eq!(display_model_reply(raw), "hello");
    }

    #[test]
    fn content_may_span_lines() {
        let raw = "<think>hm</think><content>line one\nline two</content>";
        assert_eq!(display_model_reply(raw), "line one\nline two");
    }

    #[test]
    fn missing_tags_display_empty_for_model_replies() {
        assert_eq!(display_model_reply("just text"), "");
        assert_eq!(display_model_reply("<content>unterminated"), "");
    }

    #[test]
    fn action_messages_fall_back_to_the_raw_string() {
        assert_eq!(display_action_message("just text"), "just text");
        assert_eq!(
            display_action_message("<content>wrapped</content>"),
            "wrapped"
        );
    }

    #[test]
    fn first_content_pair_wins() {
        let raw = "<content>one</content><content>two</content>";
        assert_eq!(display_model_reply(raw), "one");
    }
}
