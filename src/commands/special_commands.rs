//! Special commands parser for interactive chat mode
//!
//! Special commands control the session instead of being sent as queries:
//! - Log in or out
//! - Clear the conversation
//! - Show session status
//! - Display help information
//! - Exit the session
//!
//! Commands are prefixed with `/` and are case-insensitive. A line starting
//! with `//` is sent as a question with the first `/` removed.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Log in, optionally with the username already given
    ///
    /// Missing fields are prompted for.
    Login(Option<String>),

    /// Forget the session token and clear the conversation
    Logout,

    /// Empty the conversation log without logging out
    Clear,

    /// Display login state and conversation size
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Escaped text to send as a query, leading `//` reduced to `/`
    Literal(String),

    /// Not a special command
    ///
    /// The input should be sent as a query.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns [`CommandError::UnknownCommand`] if input starts with "/" but is
/// not a valid command, and [`CommandError::UnsupportedArgument`] when a
/// command that takes no argument is given one.
///
/// # Examples
///
/// ```
/// use citechat::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/logout").unwrap(), SpecialCommand::Logout);
/// assert_eq!(
///     parse_special_command("/login alice").unwrap(),
///     SpecialCommand::Login(Some("alice".to_string()))
/// );
/// assert_eq!(
///     parse_special_command("what is on page 3?").unwrap(),
///     SpecialCommand::None
/// );
/// assert!(parse_special_command("/foo").is_err());
/// assert_eq!(
///     parse_special_command("//etc/hosts format?").unwrap(),
///     SpecialCommand::Literal("/etc/hosts format?".to_string())
/// );
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if let Some(escaped) = trimmed.strip_prefix("//") {
        return Ok(SpecialCommand::Literal(format!("/{}", escaped)));
    }

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

    let no_arg = |cmd: SpecialCommand| match arg {
        None => Ok(cmd),
        Some(arg) => Err(CommandError::UnsupportedArgument {
            command: command.clone(),
            arg: arg.to_string(),
        }),
    };

    match command.as_str() {
        // Usernames keep their case
        "/login" => Ok(SpecialCommand::Login(arg.map(str::to_string))),
        "/logout" => no_arg(SpecialCommand::Logout),
        "/clear" => no_arg(SpecialCommand::Clear),
        "/status" => no_arg(SpecialCommand::ShowStatus),
        "/help" | "/?" => no_arg(SpecialCommand::Help),
        "/exit" | "/quit" | "exit" | "quit" => no_arg(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Print help information for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
==========================================

SESSION:
  /login [user]   - Log in (prompts for anything not given)
  /logout         - Log out and clear the conversation
  /status         - Show login state and conversation size

CONVERSATION:
  /clear          - Clear the conversation, stay logged in

OTHER:
  /help, /?       - Show this help
  /exit, exit     - Leave the chat

Anything else is sent as a question. Start a line with // to send
text that begins with / (//etc/hosts sends /etc/hosts).
"#
    );
}
