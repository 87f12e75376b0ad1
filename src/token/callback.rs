//! Token Callbacks
//!
//! Observability hook invoked after a successful refresh.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::error::AuthError;
use crate::types::Token;

/// Refresh-event notification interface.
///
/// Callback failures never fail the refresh that triggered them.
#[async_trait]
pub trait TokenCallback: Send + Sync {
    /// Called after a refresh succeeds, with the previously issued token
    /// (if any) and the new one.
    async fn on_token_refreshed(
        &self,
        previous: Option<&Token>,
        new: &Token,
    ) -> Result<(), AuthError>;
}

/// Fans a refresh notification out to an ordered collection of callbacks.
///
/// Each callback's failure is isolated: later callbacks still run, and
/// the composite itself never fails.
#[derive(Default)]
pub struct CompositeTokenCallback {
    callbacks: Vec<Arc<dyn TokenCallback>>,
}

impl CompositeTokenCallback {
    /// Create an empty composite.
    pub fn new(callbacks: Vec<Arc<dyn TokenCallback>>) -> Self {
        Self { callbacks }
    }

    /// Append a callback.
    pub fn push(&mut self, callback: Arc<dyn TokenCallback>) {
        self.callbacks.push(callback);
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Check whether no callbacks are registered.
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

#[async_trait]
impl TokenCallback for CompositeTokenCallback {
    async fn on_token_refreshed(
        &self,
        previous: Option<&Token>,
        new: &Token,
    ) -> Result<(), AuthError> {
        for (index, callback) in self.callbacks.iter().enumerate() {
            if let Err(error) = callback.on_token_refreshed(previous, new).await {
                warn!(
                    callback = index,
                    error = %error,
                    error_code = error.error_code(),
                    "token callback failed"
                );
            }
        }
        Ok(())
    }
}

/// Recording callback for testing.
#[derive(Default)]
pub struct RecordingTokenCallback {
    invocations: std::sync::Mutex<Vec<(Option<Token>, Token)>>,
    fail: std::sync::Mutex<bool>,
}

impl RecordingTokenCallback {
    /// Create new recording callback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every invocation return an error (after recording it).
    pub fn fail(&self) -> &Self {
        *self.fail.lock().unwrap() = true;
        self
    }

    /// Recorded (previous, new) pairs, in call order.
    pub fn invocations(&self) -> Vec<(Option<Token>, Token)> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenCallback for RecordingTokenCallback {
    async fn on_token_refreshed(
        &self,
        previous: Option<&Token>,
        new: &Token,
    ) -> Result<(), AuthError> {
        self.invocations
            .lock()
            .unwrap()
            .push((previous.cloned(), new.clone()));

        if *self.fail.lock().unwrap() {
            return Err(AuthError::Token(crate::error::TokenError::InvalidToken {
                message: "mock callback failure".to_string(),
            }));
        }
        Ok(())
    }
}
