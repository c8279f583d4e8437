//! Citechat - document question answering client library
//!
//! This library provides the core of the citechat client: a login session
//! backed by a persisted token, and a conversation that sends questions to a
//! document question-answering service and keeps each answer together with
//! the files and pages it cites.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `backend`: the `Backend` trait, its HTTP implementation, a scripted fake,
//!   and response validation
//! - `session`: the session controller and token stores
//! - `conversation`: the message log and the two-phase send
//! - `commands`: CLI command handlers and chat-mode special commands
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use citechat::cli::Cli;
//! use citechat::commands::Controllers;
//! use citechat::Config;
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cli = Cli::parse_from(["citechat", "chat"]);
//!     let config = Config::load("config/citechat.yaml", &cli)?;
//!     config.validate()?;
//!
//!     let controllers = Controllers::from_config(&config)?;
//!     controllers.session.login("alice", "secret").await;
//!     if let Some(reply) = controllers.conversation.send("What is in chapter 2?").await {
//!         println!("{}", reply.text);
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod error;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use conversation::{Citation, ConversationController, ConversationState, Message};
pub use error::{BackendError, CitechatError, Result};
pub use session::{LoginOutcome, SessionController};

#[cfg(test)]
pub mod test_utils;
