//! Terminal rendering of conversation messages
//!
//! Formatting is kept free of color codes so it can be tested; the
//! `print_*` functions add color on the way out.

use colored::Colorize;

use crate::conversation::{Citation, Message};

/// Heading printed above the citation list of an answer
pub const CONTEXT_HEADING: &str = "Context:";

/// Lines of an assistant message's body, split on newlines
///
/// # Examples
///
/// ```
/// use citechat::commands::render::text_lines;
/// use citechat::conversation::Message;
///
/// let msg = Message::assistant("first\nsecond");
/// assert_eq!(text_lines(&msg), vec!["first", "second"]);
/// ```
pub fn text_lines(message: &Message) -> Vec<&str> {
    message.text.lines().collect()
}

/// Plain-text rendering of a message: the body, then a `Context:` block
/// when the message carries citations
pub fn format_message(message: &Message) -> String {
    let mut out = text_lines(message).join("\n");
    let citations = message.citations();
    if !citations.is_empty() {
        out.push_str("\n\n");
        out.push_str(&format_citations(&citations));
    }
    out
}

/// The `Context:` block for a non-empty citation list
pub fn format_citations(citations: &[Citation]) -> String {
    let mut out = String::from(CONTEXT_HEADING);
    for citation in citations {
        out.push_str("\n  ");
        out.push_str(&citation.to_string());
    }
    out
}

/// Print an assistant reply to stdout
///
/// Citations are hidden when `show_citations` is false.
pub fn print_reply(message: &Message, show_citations: bool) {
    for line in text_lines(message) {
        println!("{}", line);
    }
    let citations = message.citations();
    if show_citations && !citations.is_empty() {
        println!();
        println!("{}", CONTEXT_HEADING.cyan().bold());
        for citation in &citations {
            println!("  {}", citation.to_string().cyan());
        }
    }
    println!();
}
