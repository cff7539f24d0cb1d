//! Session transcript store
//!
//! The transcript is the ordered, append-only log of turns for one chat
//! session. It is seeded with the bootstrap exchange that frames the model as
//! a daily micro-challenge giver, and only ever grows after that.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// A single conversational entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create a model turn
    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
        }
    }
}

/// The fixed opening exchange every session starts with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bootstrap {
    pub instruction: String,
    pub acknowledgment: String,
}

/// Ordered conversation log; insertion order is conversation order
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Start a transcript holding exactly the bootstrap user/model pair
    pub fn initialize(bootstrap: &Bootstrap) -> Self {
        debug!("Transcript::initialize: called");
        Self {
            turns: vec![
                Turn::user(bootstrap.instruction.clone()),
                Turn::model(bootstrap.acknowledgment.clone()),
            ],
        }
    }

    /// Append a turn to the end. Never fails and never reorders.
    pub fn append(&mut self, turn: Turn) {
        debug!(role = ?turn.role, len = self.turns.len(), "Transcript::append: called");
        self.turns.push(turn);
    }

    /// Every turn, oldest first
    pub fn all(&self) -> &[Turn] {
        &self.turns
    }

    /// Turns appended at or after `index`
    pub fn since(&self, index: usize) -> &[Turn] {
        self.turns.get(index..).unwrap_or(&[])
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
