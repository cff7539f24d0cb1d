//! Interactive chat loop

use std::io::{self, Write};

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use super::view::{clear_current_line, render_header, render_turn, render_turns};
use crate::config::UiConfig;
use crate::dispatch::{DispatchOutcome, Dispatcher, is_exit};
use crate::session::Session;
use crate::transcript::Turn;

/// Interactive chat over one session
pub struct ChatRepl {
    dispatcher: Dispatcher,
    session: Session,
    ui: UiConfig,
    model: String,
    /// Number of transcript turns already printed
    rendered: usize,
}

impl ChatRepl {
    pub fn new(dispatcher: Dispatcher, session: Session, ui: UiConfig, model: impl Into<String>) -> Self {
        Self {
            dispatcher,
            session,
            ui,
            model: model.into(),
            rendered: 0,
        }
    }

    /// Run until the exit token (or Ctrl+D) ends the session
    pub async fn run(&mut self) -> Result<()> {
        print!("{}", render_header(&self.ui, &self.model));
        self.render_pending();

        // Create readline editor for proper line editing
        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        while self.session.is_active() {
            println!("{}", self.ui.input_hint.dimmed());
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            let input = match readline {
                Ok(line) => {
                    let input = line.trim().to_string();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(&input);
                    input
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C - just show new prompt
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D - same as typing the exit token
                    println!();
                    self.dispatcher.settings().exit_token.clone()
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            };

            self.submit(&input).await?;
        }

        debug!(id = %self.session.id(), "run: session over");
        Ok(())
    }

    /// Show the user's bubble, wait for the dispatcher, then show its reply
    async fn submit(&mut self, input: &str) -> Result<DispatchOutcome> {
        println!("{}", render_turn(&Turn::user(input)));

        let waiting = !is_exit(input, &self.dispatcher.settings().exit_token);
        if waiting {
            print!("{}", self.ui.thinking_message.dimmed());
            let _ = io::stdout().flush();
        }

        let outcome = self.dispatcher.dispatch(&mut self.session, input).await?;

        if waiting {
            let _ = clear_current_line(&mut io::stdout());
        }

        // The user turn was printed before dispatching
        self.rendered += 1;
        self.render_pending();
        Ok(outcome)
    }

    /// Print every turn appended since the last render
    fn render_pending(&mut self) {
        let pending = self.session.transcript().since(self.rendered);
        if !pending.is_empty() {
            println!("{}", render_turns(pending));
        }
        self.rendered = self.session.transcript().len();
    }
}
