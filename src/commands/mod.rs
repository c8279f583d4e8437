/*!
Command handlers for the CLI

This module provides the handlers invoked by the CLI entrypoint:

- `auth`  - log in and log out
- `ask`   - one question against the stored session
- `chat`  - interactive chat loop

Every handler goes through [`Controllers`], which wires a backend and a
token store into the session and conversation controllers.
*/

use std::sync::Arc;

use crate::backend::{create_backend, Backend};
use crate::config::Config;
use crate::conversation::ConversationController;
use crate::error::Result;
use crate::session::store::{create_token_store, TokenStore};
use crate::session::SessionController;

pub mod line_editor;
pub mod render;
pub mod special_commands;

use line_editor::{new_editor, prompt_line, prompt_password, LineEditor};

/// Session and conversation controllers sharing one backend
#[derive(Debug)]
pub struct Controllers {
    /// Owner of the session token
    pub session: Arc<SessionController>,
    /// Owner of the message log
    pub conversation: ConversationController,
}

impl Controllers {
    /// Wires controllers around an existing backend and token store
    ///
    /// The stored token, if any, is restored before returning.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use citechat::backend::fake::FakeBackend;
    /// use citechat::commands::Controllers;
    /// use citechat::config::Config;
    /// use citechat::session::store::MemoryTokenStore;
    ///
    /// let controllers = Controllers::new(
    ///     Arc::new(FakeBackend::new()),
    ///     Box::new(MemoryTokenStore::with_token("abc")),
    ///     &Config::default(),
    /// );
    /// assert!(controllers.session.is_logged_in());
    /// ```
    pub fn new(backend: Arc<dyn Backend>, store: Box<dyn TokenStore>, config: &Config) -> Self {
        let session = Arc::new(SessionController::new(backend.clone(), store));
        session.restore();
        let conversation = ConversationController::new(backend, session.clone())
            .with_session_expired_status(config.server.session_expired_status);
        Self {
            session,
            conversation,
        }
    }

    /// Builds the HTTP backend and token store described by `config`
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client or the token store cannot be built
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = create_backend(&config.server)?;
        let store = create_token_store(&config.session)?;
        Ok(Self::new(backend, store, config))
    }
}

// Login and logout handlers
pub mod auth {
    //! Login and logout handlers.
    //!
    //! `login` prompts for whatever was not supplied on the command line.
    //! Passwords are masked while typed and never added to the history.

    use super::*;
    use crate::session::LoginOutcome;
    use anyhow::bail;
    use colored::Colorize;

    /// Log in and persist the session token
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    /// * `username` - Username, prompted for when `None`
    /// * `password` - Password, prompted for when `None`
    ///
    /// # Errors
    ///
    /// Returns error if the controllers cannot be built, reading a prompt
    /// fails, or the login is rejected
    pub async fn run_login(
        config: &Config,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<()> {
        let controllers = Controllers::from_config(config)?;
        let outcome = match (username, password) {
            (Some(username), Some(password)) => login_with(&controllers, &username, &password).await,
            (username, password) => {
                let mut rl = new_editor()?;
                login_interactive(&controllers, &mut rl, username, password).await?
            }
        };
        report_login(&outcome)
    }

    /// Prompts for missing credentials and attempts a login
    pub(crate) async fn login_interactive(
        controllers: &Controllers,
        rl: &mut LineEditor,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<LoginOutcome> {
        let username = match username {
            Some(username) => username,
            None => prompt_line(rl, "Username: ")?,
        };
        let password = match password {
            Some(password) => password,
            None => prompt_password(rl, "Password: ")?,
        };
        Ok(login_with(controllers, &username, &password).await)
    }

    /// Attempts a login with the given credentials
    pub async fn login_with(controllers: &Controllers, username: &str, password: &str) -> LoginOutcome {
        tracing::info!("Logging in");
        controllers.session.login(username, password).await
    }

    /// Prints the outcome of a login and turns failures into errors
    pub(crate) fn report_login(outcome: &LoginOutcome) -> Result<()> {
        match outcome.display_message() {
            None => {
                println!("{}", "Logged in.".green());
                Ok(())
            }
            Some(message) => bail!("Login failed: {}", message),
        }
    }

    /// Forget the stored session token
    ///
    /// Makes no network call.
    pub fn run_logout(config: &Config) -> Result<()> {
        let controllers = Controllers::from_config(config)?;
        logout_with(&controllers);
        println!("Logged out.");
        Ok(())
    }

    /// Clears the session and the conversation
    pub fn logout_with(controllers: &Controllers) {
        controllers.session.logout();
        controllers.conversation.reset();
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::backend::fake::FakeBackend;
        use crate::session::store::MemoryTokenStore;
        use crate::test_utils::test_config;
        use serde_json::json;

        #[tokio::test]
        async fn test_login_with_success_persists_token() {
            let backend = FakeBackend::new();
            backend.push_login(Ok(json!({"token": "abc"})));
            let store = MemoryTokenStore::new();
            let controllers =
                Controllers::new(Arc::new(backend), Box::new(store.clone()), &test_config());

            let outcome = login_with(&controllers, "alice", "secret").await;
            assert!(outcome.is_success());
            assert!(report_login(&outcome).is_ok());
            assert_eq!(store.load().unwrap(), Some("abc".to_string()));
        }

        #[tokio::test]
        async fn test_login_with_blank_username_reports_error() {
            let backend = FakeBackend::new();
            let controllers = Controllers::new(
                Arc::new(backend.clone()),
                Box::new(MemoryTokenStore::new()),
                &test_config(),
            );

            let outcome = login_with(&controllers, " ", "secret").await;
            let err = report_login(&outcome).unwrap_err();
            assert!(err.to_string().contains("Username field cannot be empty"));
            assert_eq!(backend.call_count(), 0);
        }

        #[tokio::test]
        async fn test_logout_with_clears_session_and_conversation() {
            let backend = FakeBackend::new();
            backend.push_answer(Ok(json!({"files": [], "pages": [], "answer": "x"})));
            let store = MemoryTokenStore::with_token("abc");
            let controllers =
                Controllers::new(Arc::new(backend), Box::new(store.clone()), &test_config());
            controllers.conversation.send("hi").await;

            logout_with(&controllers);
            assert!(!controllers.session.is_logged_in());
            assert!(controllers.conversation.messages().is_empty());
            assert_eq!(store.load().unwrap(), None);
        }
    }
}

// Single question handler
pub mod ask {
    //! One-shot query handler.

    use super::*;
    use crate::conversation::Message;
    use crate::error::CitechatError;
    use anyhow::bail;

    /// Ask a single question using the stored session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    /// * `query` - Question words, joined with single spaces
    /// * `json` - Print the reply as a JSON object instead of text
    ///
    /// # Errors
    ///
    /// Returns error if the controllers cannot be built or the reply reports
    /// a failed query. The failure text has already been printed to stderr in
    /// that case.
    pub async fn run_ask(config: &Config, query: Vec<String>, json: bool) -> Result<()> {
        let controllers = Controllers::from_config(config)?;
        let text = query.join(" ");
        let Some(reply) = ask_with(&controllers, &text).await else {
            bail!("Question is empty");
        };

        if reply.is_error {
            eprintln!("{}", reply.text);
            bail!("Query failed");
        }

        if json {
            let rendered =
                serde_json::to_string_pretty(&reply).map_err(CitechatError::Serialization)?;
            println!("{}", rendered);
        } else {
            render::print_reply(&reply, config.chat.show_citations);
        }
        Ok(())
    }

    /// Sends `text` through the conversation controller
    pub async fn ask_with(controllers: &Controllers, text: &str) -> Option<Message> {
        controllers.conversation.send(text).await
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::backend::fake::FakeBackend;
        use crate::session::store::MemoryTokenStore;
        use crate::test_utils::test_config;
        use serde_json::json;

        #[tokio::test]
        async fn test_ask_with_returns_cited_answer() {
            let backend = FakeBackend::new();
            backend.push_answer(Ok(json!({"files": ["a.pdf"], "pages": [3], "answer": "x"})));
            let controllers = Controllers::new(
                Arc::new(backend.clone()),
                Box::new(MemoryTokenStore::with_token("abc")),
                &test_config(),
            );

            let reply = ask_with(&controllers, "where?").await.unwrap();
            assert_eq!(reply.citations().len(), 1);
            assert_eq!(backend.answer_calls()[0].1, "abc");
        }

        #[tokio::test]
        async fn test_ask_with_logged_out_yields_failure_text() {
            let controllers = Controllers::new(
                Arc::new(FakeBackend::new()),
                Box::new(MemoryTokenStore::new()),
                &test_config(),
            );

            let reply = ask_with(&controllers, "hello").await.unwrap();
            assert!(reply.is_error);
        }

        #[tokio::test]
        async fn test_answer_with_error_like_text_is_not_a_failure() {
            let backend = FakeBackend::new();
            backend.push_answer(Ok(json!({
                "files": [],
                "pages": [],
                "answer": "Session expired, please log in again"
            })));
            let controllers = Controllers::new(
                Arc::new(backend),
                Box::new(MemoryTokenStore::with_token("abc")),
                &test_config(),
            );

            let reply = ask_with(&controllers, "what does the banner say?").await.unwrap();
            assert!(!reply.is_error);
        }

        #[test]
        fn test_reply_serializes_without_empty_citations() {
            let value = serde_json::to_value(Message::assistant("x")).unwrap();
            assert_eq!(value, json!({"is_user": false, "text": "x"}));
        }
    }
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Runs a readline loop. Lines starting with `/` are special commands,
    //! except that `//` escapes a leading slash. Everything else is sent as a
    //! question and the reply is printed with its citation context.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use colored::Colorize;
    use rustyline::error::ReadlineError;

    /// Start interactive chat mode
    ///
    /// # Errors
    ///
    /// Returns error if the controllers or the line editor cannot be built
    ///
    /// # Examples
    ///
    /// ```
    /// use citechat::commands::chat;
    /// use citechat::config::Config;
    ///
    /// // In application code:
    /// // chat::run_chat(&Config::default()).await?;
    /// ```
    pub async fn run_chat(config: &Config) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let controllers = Controllers::from_config(config)?;
        let mut rl = new_editor()?;

        print_welcome_banner(&controllers);

        loop {
            match rl.readline(&config.chat.prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    };

                    let question = match command {
                        SpecialCommand::Login(username) => {
                            match auth::login_interactive(&controllers, &mut rl, username, None)
                                .await
                            {
                                Ok(outcome) => match outcome.display_message() {
                                    None => println!("{}\n", "Logged in.".green()),
                                    Some(message) => println!("{}\n", message.red()),
                                },
                                Err(e) => eprintln!("Login cancelled: {}\n", e),
                            }
                            continue;
                        }
                        SpecialCommand::Logout => {
                            auth::logout_with(&controllers);
                            println!("Logged out.\n");
                            continue;
                        }
                        SpecialCommand::Clear => {
                            controllers.conversation.reset();
                            println!("Conversation cleared.\n");
                            continue;
                        }
                        SpecialCommand::ShowStatus => {
                            print_status_display(&controllers, config);
                            continue;
                        }
                        SpecialCommand::Help => {
                            print_help();
                            continue;
                        }
                        SpecialCommand::Exit => break,
                        SpecialCommand::Literal(text) => text,
                        // Sent as entered, surrounding whitespace included
                        SpecialCommand::None => line.clone(),
                    };

                    rl.add_history_entry(trimmed)?;

                    if let Some(reply) = controllers.conversation.send(&question).await {
                        render::print_reply(&reply, config.chat.show_citations);
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn session_label(controllers: &Controllers) -> colored::ColoredString {
        if controllers.session.is_logged_in() {
            "logged in".green()
        } else {
            "logged out".yellow()
        }
    }

    fn print_welcome_banner(controllers: &Controllers) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║              Citechat Interactive Chat - Welcome!            ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Session: {}", session_label(controllers));
        if !controllers.session.is_logged_in() {
            println!("Use '/login' before asking questions.");
        }
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    /// Display login state, backend, and conversation size
    fn print_status_display(controllers: &Controllers, config: &Config) {
        let state = controllers.conversation.state();

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Citechat Session Status                   ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Session:           {}", session_label(controllers));
        println!("Backend:           {}", config.server.base_url);
        println!("Token Store:       {:?}", config.session.store);
        println!("Conversation Size: {} messages", state.messages.len());
        println!("Query In Progress: {}", state.in_progress);
        println!();
    }
}
