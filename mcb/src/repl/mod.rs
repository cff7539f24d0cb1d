//! Interactive terminal chat
//!
//! Renders the transcript as role-tagged bubbles and feeds each line the user
//! types through the dispatcher.

mod chat;
pub mod view;

pub use chat::ChatRepl;

use std::sync::Arc;

use eyre::Result;

use crate::config::Config;
use crate::dispatch::{DispatchSettings, Dispatcher};
use crate::llm::LlmClient;
use crate::session::Session;

/// Run the interactive chat
///
/// This is the main entry point for `mcb`.
pub async fn run_interactive(config: &Config, llm: Arc<dyn LlmClient>) -> Result<()> {
    let model = llm.model().to_string();
    let session = Session::new(&config.session.bootstrap());
    let dispatcher = Dispatcher::new(llm, DispatchSettings::from_config(config));

    let mut repl = ChatRepl::new(dispatcher, session, config.ui.clone(), model);
    repl.run().await
}
