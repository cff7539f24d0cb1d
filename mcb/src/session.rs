//! Chat session state
//!
//! A session owns one transcript and a two-state lifecycle. It lives exactly
//! as long as the interactive run that created it.

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::transcript::{Bootstrap, Transcript};

/// Lifecycle of a session; `Active -> Terminated` is one-way
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Terminated,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session {0} has ended; no further input is accepted")]
    Terminated(Uuid),
}

/// One interactive conversation
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    transcript: Transcript,
    state: SessionState,
}

impl Session {
    /// Start an active session seeded with the bootstrap exchange
    pub fn new(bootstrap: &Bootstrap) -> Self {
        let id = Uuid::now_v7();
        info!(%id, "Session started");
        Self {
            id,
            transcript: Transcript::initialize(bootstrap),
            state: SessionState::Active,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Mutable access for appends; refused once the session has ended
    pub fn transcript_mut(&mut self) -> Result<&mut Transcript, SessionError> {
        match self.state {
            SessionState::Active => Ok(&mut self.transcript),
            SessionState::Terminated => Err(SessionError::Terminated(self.id)),
        }
    }

    pub(crate) fn terminate(&mut self) {
        debug!(id = %self.id, "Session::terminate: called");
        if self.state == SessionState::Active {
            info!(id = %self.id, turns = self.transcript.len(), "Session terminated");
        }
        self.state = SessionState::Terminated;
    }
}
