//! Turn dispatcher
//!
//! Takes one raw user input, records it, and either ends the session or asks
//! the completion service for a reply. Service failures never escape: they
//! become a diagnostic model turn and the session carries on.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::llm::{CompletionRequest, LlmClient, LlmError};
use crate::session::{Session, SessionError};
use crate::transcript::Turn;

/// Reply used when the service answers with nothing usable
pub const EMPTY_REPLY_MESSAGE: &str =
    "Sorry, I can't give you a reply right now. The API response was empty or invalid.";

/// Knobs the dispatcher needs from configuration
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub exit_token: String,
    pub farewell: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl DispatchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            exit_token: config.session.exit_token.clone(),
            farewell: config.session.farewell.clone(),
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
            timeout: config.llm.timeout(),
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// What a dispatch appended after the user turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The model's text was appended
    Replied,
    /// The service answered with no text; the fallback message was appended
    EmptyReply,
    /// The call failed; a diagnostic was appended
    Failed,
    /// The exit token was entered; the farewell was appended and the session ended
    Terminated,
}

const CAUSE_CONNECTION: &str = "Internet connection problem or timeout.";
const CAUSE_CREDENTIAL: &str = "The API key may be restricted, invalid, or over its quota.";
const CAUSE_SERVER: &str = "An internal problem on the model provider's server.";

/// Diagnostic shown in place of a reply when the completion call fails
///
/// All possible causes are listed; the one the error points at comes first.
pub fn failure_message(model: &str, err: &LlmError) -> String {
    let mut causes = vec![CAUSE_CONNECTION, CAUSE_CREDENTIAL, CAUSE_SERVER];
    let likely = if err.is_rate_limit() || err.is_auth() {
        Some(CAUSE_CREDENTIAL)
    } else if err.is_server_error() {
        Some(CAUSE_SERVER)
    } else if err.is_timeout() {
        Some(CAUSE_CONNECTION)
    } else {
        None
    };
    if let Some(likely) = likely {
        causes.retain(|c| *c != likely);
        causes.insert(0, likely);
    }

    let mut message = format!("Sorry, something went wrong while talking to {model}: {err}\n\nPossible causes:");
    for cause in causes {
        message.push_str("\n - ");
        message.push_str(cause);
    }
    message
}

/// Check whether an input is the session's exit token
pub fn is_exit(input: &str, exit_token: &str) -> bool {
    input.to_lowercase() == exit_token.to_lowercase()
}

pub struct Dispatcher {
    llm: Arc<dyn LlmClient>,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(llm: Arc<dyn LlmClient>, settings: DispatchSettings) -> Self {
        Self { llm, settings }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Process one user input against the session
    ///
    /// Fails only when the session has already ended; the transcript is left
    /// untouched in that case.
    pub async fn dispatch(&self, session: &mut Session, input: &str) -> Result<DispatchOutcome, SessionError> {
        let session_id = session.id();
        debug!(%session_id, input_len = input.len(), "dispatch: called");

        let transcript = session.transcript_mut()?;
        transcript.append(Turn::user(input));

        if is_exit(input, &self.settings.exit_token) {
            debug!(%session_id, "dispatch: exit token");
            transcript.append(Turn::model(self.settings.farewell.clone()));
            session.terminate();
            return Ok(DispatchOutcome::Terminated);
        }

        let history = session.transcript().all().to_vec();
        let (reply, outcome) = match self.request_reply(history, input.to_lowercase()).await {
            Ok(Some(text)) => (text, DispatchOutcome::Replied),
            Ok(None) => {
                warn!(%session_id, "dispatch: empty reply");
                (EMPTY_REPLY_MESSAGE.to_string(), DispatchOutcome::EmptyReply)
            }
            Err(e) => {
                warn!(%session_id, error = %e, "dispatch: completion failed");
                (failure_message(self.llm.model(), &e), DispatchOutcome::Failed)
            }
        };

        session.transcript_mut()?.append(Turn::model(reply));
        debug!(%session_id, ?outcome, "dispatch: done");
        Ok(outcome)
    }

    /// Send the full transcript plus the lower-cased prompt, bounded by the configured timeout
    async fn request_reply(&self, mut messages: Vec<Turn>, prompt: String) -> Result<Option<String>, LlmError> {
        messages.push(Turn::user(prompt));
        let request = CompletionRequest {
            messages,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let start = std::time::Instant::now();
        let response = tokio::time::timeout(self.settings.timeout, self.llm.complete(request))
            .await
            .map_err(|_| LlmError::Timeout(self.settings.timeout))??;

        info!(
            model = %self.llm.model(),
            duration_ms = %start.elapsed().as_millis(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            finish_reason = ?response.finish_reason,
            "LLM request completed"
        );

        Ok(response.text().map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::{MockLlmClient, MockReply};
    use crate::session::SessionState;
    use crate::transcript::{Bootstrap, Role};

    fn bootstrap() -> Bootstrap {
        Bootstrap {
            instruction: "Give one micro-challenge.".to_string(),
            acknowledgment: "Type 'challenge'.".to_string(),
        }
    }

    fn setup(replies: Vec<MockReply>) -> (Arc<MockLlmClient>, Dispatcher, Session) {
        let llm = Arc::new(MockLlmClient::new(replies));
        let dispatcher = Dispatcher::new(llm.clone(), DispatchSettings::default());
        (llm, dispatcher, Session::new(&bootstrap()))
    }

    #[tokio::test]
    async fn test_each_turn_adds_user_and_model() {
        let (llm, dispatcher, mut session) = setup(vec![
            MockReply::Text("Learn 5 new words.".to_string()),
            MockReply::Text("Smile at 3 strangers.".to_string()),
            MockReply::Text("Drink a glass of water.".to_string()),
        ]);

        for input in ["challenge", "another", "one more"] {
            let outcome = dispatcher.dispatch(&mut session, input).await.unwrap();
            assert_eq!(outcome, DispatchOutcome::Replied);
        }

        assert_eq!(session.transcript().len(), 2 + 2 * 3);
        assert_eq!(llm.call_count(), 3);
        assert_eq!(session.transcript().last(), Some(&Turn::model("Drink a glass of water.")));
    }

    #[tokio::test]
    async fn test_success_appends_exact_text() {
        let (_llm, dispatcher, mut session) = setup(vec![MockReply::Text("  Walk 10 minutes.\n".to_string())]);

        dispatcher.dispatch(&mut session, "Challenge").await.unwrap();

        assert_eq!(
            session.transcript().since(2),
            &[Turn::user("Challenge"), Turn::model("  Walk 10 minutes.\n")]
        );
    }

    #[tokio::test]
    async fn test_request_carries_history_and_lowercased_prompt() {
        let (llm, dispatcher, mut session) = setup(vec![
            MockReply::Text("first".to_string()),
            MockReply::Text("second".to_string()),
        ]);

        dispatcher.dispatch(&mut session, "CHALLENGE").await.unwrap();
        dispatcher.dispatch(&mut session, "Again Please").await.unwrap();

        let requests = llm.requests();
        assert_eq!(requests.len(), 2);

        // Full transcript including the recorded user turn, then the lower-cased prompt
        let first = &requests[0];
        assert_eq!(first.messages.len(), 4);
        assert_eq!(&first.messages[..3], &session.transcript().all()[..3]);
        assert_eq!(first.messages[2], Turn::user("CHALLENGE"));
        assert_eq!(first.messages[3], Turn::user("challenge"));
        assert!((first.temperature - 0.4).abs() < f32::EPSILON);
        assert_eq!(first.max_tokens, 500);

        let second = &requests[1];
        let roles: Vec<Role> = second.messages.iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Model, Role::User, Role::Model, Role::User, Role::User]
        );
        assert_eq!(&second.messages[..5], &session.transcript().all()[..5]);
        assert_eq!(second.messages[4], Turn::user("Again Please"));
        assert_eq!(second.messages[5], Turn::user("again please"));
    }

    #[tokio::test]
    async fn test_exit_any_casing_terminates_without_call() {
        for input in ["exit", "EXIT", "Exit", "eXiT"] {
            let (llm, dispatcher, mut session) = setup(vec![]);

            let outcome = dispatcher.dispatch(&mut session, input).await.unwrap();

            assert_eq!(outcome, DispatchOutcome::Terminated);
            assert_eq!(session.state(), SessionState::Terminated);
            assert_eq!(llm.call_count(), 0);
            let last = session.transcript().last().unwrap();
            assert_eq!(last.role, Role::Model);
            assert_eq!(last.content, DispatchSettings::default().farewell);
        }
    }

    #[tokio::test]
    async fn test_no_processing_after_exit() {
        let (llm, dispatcher, mut session) = setup(vec![MockReply::Text("unused".to_string())]);
        dispatcher.dispatch(&mut session, "exit").await.unwrap();
        let len = session.transcript().len();

        let result = dispatcher.dispatch(&mut session, "challenge").await;

        assert_eq!(result, Err(SessionError::Terminated(session.id())));
        assert_eq!(session.transcript().len(), len);
        assert_eq!(llm.call_count(), 0);
    }

    #[test]
    fn test_is_exit_matches_whole_input_only() {
        assert!(is_exit("EXIT", "exit"));
        assert!(!is_exit(" exit ", "exit"));
        assert!(!is_exit("exit\n", "exit"));
        assert!(!is_exit("exits", "exit"));
    }

    #[tokio::test]
    async fn test_exit_is_not_a_substring_match() {
        let (llm, dispatcher, mut session) = setup(vec![MockReply::Text("ok".to_string())]);

        let outcome = dispatcher.dispatch(&mut session, "exit please").await.unwrap();

        assert_eq!(outcome, DispatchOutcome::Replied);
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_appends_diagnostic_and_keeps_history() {
        let (_llm, dispatcher, mut session) = setup(vec![
            MockReply::Text("Learn 5 new words.".to_string()),
            MockReply::Fail(LlmError::ApiError {
                status: 403,
                message: "API key not valid".to_string(),
            }),
        ]);
        dispatcher.dispatch(&mut session, "challenge").await.unwrap();
        let before = session.transcript().all().to_vec();

        let outcome = dispatcher.dispatch(&mut session, "challenge").await.unwrap();

        assert_eq!(outcome, DispatchOutcome::Failed);
        assert!(session.is_active());
        assert_eq!(&session.transcript().all()[..before.len()], before.as_slice());

        let diagnostic = &session.transcript().last().unwrap().content;
        assert!(diagnostic.contains("API key not valid"));
        assert!(diagnostic.contains("connection problem or timeout"));
        assert!(diagnostic.contains("restricted, invalid, or over its quota"));
        assert!(diagnostic.contains("server"));
    }

    #[tokio::test]
    async fn test_empty_reply_uses_fallback() {
        let (_llm, dispatcher, mut session) = setup(vec![MockReply::Empty, MockReply::Text("   ".to_string())]);

        assert_eq!(
            dispatcher.dispatch(&mut session, "challenge").await.unwrap(),
            DispatchOutcome::EmptyReply
        );
        assert_eq!(
            dispatcher.dispatch(&mut session, "challenge").await.unwrap(),
            DispatchOutcome::EmptyReply
        );
        assert_eq!(session.transcript().last(), Some(&Turn::model(EMPTY_REPLY_MESSAGE)));
        assert_eq!(session.transcript().len(), 6);
    }

    #[tokio::test]
    async fn test_hung_call_times_out_into_diagnostic() {
        let llm = Arc::new(MockLlmClient::new(vec![MockReply::Hang(Duration::from_secs(30))]));
        let settings = DispatchSettings {
            timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(llm, settings);
        let mut session = Session::new(&bootstrap());

        let outcome = dispatcher.dispatch(&mut session, "challenge").await.unwrap();

        assert_eq!(outcome, DispatchOutcome::Failed);
        let diagnostic = &session.transcript().last().unwrap().content;
        assert!(diagnostic.contains("Timeout after 50ms"));
    }

    #[tokio::test]
    async fn test_custom_exit_token() {
        let llm = Arc::new(MockLlmClient::new(vec![MockReply::Text("ok".to_string())]));
        let settings = DispatchSettings {
            exit_token: "Quit".to_string(),
            farewell: "Bye!".to_string(),
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(llm, settings);
        let mut session = Session::new(&bootstrap());

        assert_eq!(
            dispatcher.dispatch(&mut session, "exit").await.unwrap(),
            DispatchOutcome::Replied
        );
        assert_eq!(
            dispatcher.dispatch(&mut session, "QUIT").await.unwrap(),
            DispatchOutcome::Terminated
        );
        assert_eq!(session.transcript().last(), Some(&Turn::model("Bye!")));
    }

    #[test]
    fn test_failure_message_names_model_and_error() {
        let message = failure_message("gemini-1.5-flash", &LlmError::Timeout(Duration::from_secs(60)));

        assert!(message.starts_with("Sorry, something went wrong while talking to gemini-1.5-flash"));
        assert!(message.contains("Timeout after 60s"));
        assert!(message.contains("Possible causes:"));
    }

    fn first_cause(message: &str) -> &str {
        message
            .lines()
            .skip_while(|l| *l != "Possible causes:")
            .nth(1)
            .unwrap()
    }

    #[test]
    fn test_failure_message_puts_likely_cause_first() {
        let quota = LlmError::RateLimited {
            message: "Resource has been exhausted".to_string(),
        };
        assert_eq!(first_cause(&failure_message("m", &quota)), format!(" - {CAUSE_CREDENTIAL}"));

        let auth = LlmError::ApiError {
            status: 401,
            message: "API key not valid".to_string(),
        };
        assert_eq!(first_cause(&failure_message("m", &auth)), format!(" - {CAUSE_CREDENTIAL}"));

        let server = LlmError::ApiError {
            status: 503,
            message: "Unavailable".to_string(),
        };
        assert_eq!(first_cause(&failure_message("m", &server)), format!(" - {CAUSE_SERVER}"));

        let timeout = LlmError::Timeout(Duration::from_secs(60));
        assert_eq!(first_cause(&failure_message("m", &timeout)), format!(" - {CAUSE_CONNECTION}"));
    }

    #[test]
    fn test_failure_message_always_lists_every_cause_once() {
        let errors = [
            LlmError::InvalidResponse("garbage".to_string()),
            LlmError::RateLimited {
                message: "quota".to_string(),
            },
            LlmError::ApiError {
                status: 500,
                message: "boom".to_string(),
            },
        ];
        for err in &errors {
            let message = failure_message("m", err);
            for cause in [CAUSE_CONNECTION, CAUSE_CREDENTIAL, CAUSE_SERVER] {
                assert_eq!(message.matches(cause).count(), 1, "{message}");
            }
        }
    }
}
