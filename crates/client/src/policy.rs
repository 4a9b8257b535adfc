//! Response policy: classifies what came back from a request and carries out
//! the side effects that go with each outcome.
//!
//! # Outcomes
//!
//! | Outcome | Trigger | Side effect | Result |
//! |---------|---------|-------------|--------|
//! | `Success` | 2xx and envelope code is the success code | rotate token if `data.token` is present | `Ok(envelope)` |
//! | `Business` | 2xx but any other code (or no envelope) | notice with envelope message | `Err(Business)` |
//! | `Transport` 401 | non-2xx | unauthorized hook (logout + login redirect) | `Err(Unauthorized)` |
//! | `Transport` 403/404/500/other | non-2xx | notice | `Err(Forbidden/NotFound/Server)` |
//! | `NetworkUnreachable` | no response | notice | `Err(Network)` |
//! | `RequestMalformed` | request never sent | notice | `Err(RequestConfig)` |
//!
//! The policy only talks to the session, router and UI through the hook traits
//! below, so it can be built and tested without either.

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::SecretString;
use serde_json::Value;
use teamall_core::Envelope;

use crate::error::ClientError;
use crate::notify::{Notice, Notifier};

/// Shown when a business error carries no message.
pub const MSG_OPERATION_FAILED: &str = "Operation failed";
pub const MSG_FORBIDDEN: &str = "You do not have permission to perform this action";
pub const MSG_NOT_FOUND: &str = "The requested resource does not exist";
pub const MSG_SERVER_ERROR: &str = "Server error, please try again later";
pub const MSG_NETWORK_ERROR: &str = "Network error, please try again later";
pub const MSG_UNREACHABLE: &str = "Network connection failed, please check your network settings";
pub const MSG_REQUEST_CONFIG: &str = "Request configuration error";

// =============================================================================
// Hooks
// =============================================================================

/// Where the gateway gets its bearer token and where rotated tokens go.
pub trait TokenSource: Send + Sync {
    /// The current valid token, if any.
    fn bearer_token(&self) -> Option<SecretString>;

    /// A successful response carried a fresh token.
    fn rotate_token(&self, token: &str);
}

/// Reaction to an HTTP 401.
pub trait UnauthorizedHandler: Send + Sync {
    fn on_unauthorized(&self);
}

// =============================================================================
// Outcome
// =============================================================================

/// Classification of one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The envelope carries the success code.
    Success(Envelope),
    /// Transport succeeded but the application refused.
    Business { message: Option<String> },
    /// Non-2xx HTTP status.
    Transport {
        status: StatusCode,
        message: Option<String>,
    },
    /// No response was received.
    NetworkUnreachable { detail: String },
    /// The request was never sent.
    RequestMalformed { detail: String },
}

impl Outcome {
    /// Classify a received response from its status and raw body.
    #[must_use]
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        if !status.is_success() {
            let message = serde_json::from_str::<Value>(body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned))
                .filter(|m| !m.is_empty());
            return Self::Transport { status, message };
        }

        match serde_json::from_str::<Envelope>(body) {
            Ok(envelope) if envelope.is_success() => Self::Success(envelope),
            Ok(envelope) => Self::Business {
                message: envelope.message,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Response body is not an envelope");
                Self::Business { message: None }
            }
        }
    }

    /// Classify a failure to obtain a response.
    #[must_use]
    pub fn from_send_error(err: &reqwest::Error) -> Self {
        if err.is_builder() {
            Self::RequestMalformed {
                detail: err.to_string(),
            }
        } else {
            Self::NetworkUnreachable {
                detail: err.to_string(),
            }
        }
    }
}

// =============================================================================
// ResponsePolicy
// =============================================================================

/// Applies an [`Outcome`]'s side effects and turns it into the caller's result.
#[derive(Clone)]
pub struct ResponsePolicy {
    tokens: Arc<dyn TokenSource>,
    unauthorized: Arc<dyn UnauthorizedHandler>,
    notifier: Arc<dyn Notifier>,
}

impl ResponsePolicy {
    #[must_use]
    pub fn new(
        tokens: Arc<dyn TokenSource>,
        unauthorized: Arc<dyn UnauthorizedHandler>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            tokens,
            unauthorized,
            notifier,
        }
    }

    /// Token to attach to the next request.
    #[must_use]
    pub fn bearer_token(&self) -> Option<SecretString> {
        self.tokens.bearer_token()
    }

    /// Carry out the outcome's side effects.
    ///
    /// # Errors
    ///
    /// Every outcome other than `Success` becomes the matching `ClientError`.
    pub fn apply(&self, outcome: Outcome) -> Result<Envelope, ClientError> {
        match outcome {
            Outcome::Success(envelope) => {
                if let Some(token) = envelope.embedded_token() {
                    tracing::debug!("Response carried a fresh token");
                    self.tokens.rotate_token(token);
                }
                Ok(envelope)
            }
            Outcome::Business { message } => {
                let message = message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| MSG_OPERATION_FAILED.to_string());
                tracing::warn!(message = %message, "Business error");
                self.notifier.notify(Notice::error(&message));
                Err(ClientError::Business { message })
            }
            Outcome::Transport { status, message } => Err(self.transport_error(status, message)),
            Outcome::NetworkUnreachable { detail } => {
                tracing::error!(error = %detail, "No response received");
                self.notifier.notify(Notice::error(MSG_UNREACHABLE));
                Err(ClientError::Network(detail))
            }
            Outcome::RequestMalformed { detail } => {
                tracing::error!(error = %detail, "Request could not be sent");
                self.notifier.notify(Notice::error(MSG_REQUEST_CONFIG));
                Err(ClientError::RequestConfig(detail))
            }
        }
    }

    fn transport_error(&self, status: StatusCode, message: Option<String>) -> ClientError {
        tracing::error!(status = %status, message = ?message, "Request failed");
        match status {
            StatusCode::UNAUTHORIZED => {
                tracing::info!("Unauthorized, logging out");
                self.unauthorized.on_unauthorized();
                ClientError::Unauthorized
            }
            StatusCode::FORBIDDEN => {
                self.notifier.notify(Notice::error(MSG_FORBIDDEN));
                ClientError::Forbidden
            }
            StatusCode::NOT_FOUND => {
                self.notifier.notify(Notice::error(MSG_NOT_FOUND));
                ClientError::NotFound
            }
            StatusCode::INTERNAL_SERVER_ERROR => {
                self.notifier.notify(Notice::error(MSG_SERVER_ERROR));
                ClientError::Server { status, message }
            }
            _ => {
                let text = message.clone().unwrap_or_else(|| MSG_NETWORK_ERROR.to_string());
                self.notifier.notify(Notice::error(text));
                ClientError::Server { status, message }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use secrecy::ExposeSecret;

    use super::*;
    use crate::notify::RecordingNotifier;

    #[derive(Default)]
    struct FakeTokens {
        token: Mutex<Option<String>>,
    }

    impl TokenSource for FakeTokens {
        fn bearer_token(&self) -> Option<SecretString> {
            self.token.lock().unwrap().clone().map(SecretString::from)
        }

        fn rotate_token(&self, token: &str) {
            *self.token.lock().unwrap() = Some(token.to_owned());
        }
    }

    #[derive(Default)]
    struct CountingLogout(AtomicUsize);

    impl UnauthorizedHandler for CountingLogout {
        fn on_unauthorized(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Fixture {
        tokens: Arc<FakeTokens>,
        logout: Arc<CountingLogout>,
        notifier: Arc<RecordingNotifier>,
        policy: ResponsePolicy,
    }

    fn fixture() -> Fixture {
        let tokens = Arc::new(FakeTokens::default());
        let logout = Arc::new(CountingLogout::default());
        let notifier = Arc::new(RecordingNotifier::new());
        let policy = ResponsePolicy::new(tokens.clone(), logout.clone(), notifier.clone());
        Fixture {
            tokens,
            logout,
            notifier,
            policy,
        }
    }

    #[test]
    fn test_classify_success() {
        let outcome = Outcome::from_response(StatusCode::OK, r#"{"code":200,"data":{"id":1}}"#);
        assert!(matches!(outcome, Outcome::Success(_)));
    }

    #[test]
    fn test_classify_business_error_on_http_200() {
        let outcome =
            Outcome::from_response(StatusCode::OK, r#"{"code":500,"message":"Email already used"}"#);
        assert_eq!(
            outcome,
            Outcome::Business {
                message: Some("Email already used".to_string())
            }
        );
    }

    #[test]
    fn test_classify_non_envelope_body_as_business_error() {
        let outcome = Outcome::from_response(StatusCode::OK, "<html>proxy</html>");
        assert_eq!(outcome, Outcome::Business { message: None });
    }

    #[test]
    fn test_classify_transport_error_reads_message() {
        let outcome =
            Outcome::from_response(StatusCode::BAD_GATEWAY, r#"{"message":"upstream down"}"#);
        assert_eq!(
            outcome,
            Outcome::Transport {
                status: StatusCode::BAD_GATEWAY,
                message: Some("upstream down".to_string())
            }
        );

        let outcome = Outcome::from_response(StatusCode::FORBIDDEN, "");
        assert_eq!(
            outcome,
            Outcome::Transport {
                status: StatusCode::FORBIDDEN,
                message: None
            }
        );
    }

    #[test]
    fn test_success_rotates_embedded_token() {
        let f = fixture();
        let outcome =
            Outcome::from_response(StatusCode::OK, r#"{"code":200,"data":{"token":"fresh"}}"#);

        let envelope = f.policy.apply(outcome).unwrap();
        assert!(envelope.is_success());
        let token = f.tokens.bearer_token().unwrap();
        assert_eq!(token.expose_secret(), "fresh");
        assert!(f.notifier.take().is_empty());
    }

    #[test]
    fn test_business_error_notifies_and_rejects() {
        let f = fixture();
        let err = f
            .policy
            .apply(Outcome::Business { message: None })
            .unwrap_err();

        assert!(matches!(err, ClientError::Business { ref message } if message == MSG_OPERATION_FAILED));
        assert_eq!(f.notifier.messages(), vec![MSG_OPERATION_FAILED]);
    }

    #[test]
    fn test_unauthorized_runs_hook_without_notice() {
        let f = fixture();
        let err = f
            .policy
            .apply(Outcome::Transport {
                status: StatusCode::UNAUTHORIZED,
                message: None,
            })
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(f.logout.0.load(Ordering::SeqCst), 1);
        assert!(f.notifier.take().is_empty());
    }

    #[test]
    fn test_transport_notices() {
        let cases = [
            (StatusCode::FORBIDDEN, None, MSG_FORBIDDEN),
            (StatusCode::NOT_FOUND, None, MSG_NOT_FOUND),
            (StatusCode::INTERNAL_SERVER_ERROR, Some("boom"), MSG_SERVER_ERROR),
            (StatusCode::BAD_GATEWAY, None, MSG_NETWORK_ERROR),
            (StatusCode::CONFLICT, Some("Stale cart"), "Stale cart"),
        ];

        for (status, message, expected) in cases {
            let f = fixture();
            let err = f
                .policy
                .apply(Outcome::Transport {
                    status,
                    message: message.map(str::to_owned),
                })
                .unwrap_err();
            assert_eq!(err.status(), Some(status));
            assert_eq!(f.notifier.messages(), vec![expected]);
            assert_eq!(f.logout.0.load(Ordering::SeqCst), 0);
        }
    }

    #[test]
    fn test_unreachable_and_malformed() {
        let f = fixture();
        let err = f
            .policy
            .apply(Outcome::NetworkUnreachable {
                detail: "connection refused".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));

        let err = f
            .policy
            .apply(Outcome::RequestMalformed {
                detail: "bad url".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, ClientError::RequestConfig(_)));

        assert_eq!(
            f.notifier.messages(),
            vec![MSG_UNREACHABLE, MSG_REQUEST_CONFIG]
        );
    }
}
