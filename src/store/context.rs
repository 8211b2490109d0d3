//! Query Context
//!
//! Context carried to every store call: a request id for log correlation,
//! an optional deadline and a cancellation flag shared with the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use uuid::Uuid;

use super::errors::{StoreError, StoreResult};

/// Cancellation flag shared between a caller and in-flight requests
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel every request holding a clone of this token
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Context carried through store calls
#[derive(Debug, Clone)]
pub struct QueryContext {
    request_id: Uuid,
    deadline: Option<Instant>,
    cancel: CancelToken,
}

impl QueryContext {
    /// Context with no deadline and an unshared cancel token
    pub fn background() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            deadline: None,
            cancel: CancelToken::new(),
        }
    }

    /// Context that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Attach a cancel token the caller keeps a clone of
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fail if the request was cancelled or its deadline passed
    pub fn check(&self) -> StoreResult<()> {
        if self.cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(StoreError::DeadlineExceeded);
            }
        }
        Ok(())
    }
}

impl Default for QueryContext {
    fn default() -> Self {
        Self::background()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_context_passes() {
        let ctx = QueryContext::background();
        assert!(ctx.check().is_ok());
        assert!(ctx.deadline().is_none());
    }

    #[test]
    fn test_request_ids_unique() {
        assert_ne!(
            QueryContext::background().request_id(),
            QueryContext::background().request_id()
        );
    }

    #[test]
    fn test_cancel_token_shared() {
        let token = CancelToken::new();
        let ctx = QueryContext::background().with_cancel_token(token.clone());
        assert!(ctx.check().is_ok());

        token.cancel();
        assert!(ctx.is_cancelled());
        assert_eq!(ctx.check(), Err(StoreError::Cancelled));
        assert_eq!(ctx.clone().check(), Err(StoreError::Cancelled));
    }

    #[test]
    fn test_expired_deadline() {
        let ctx = QueryContext::background().with_deadline(Instant::now());
        assert_eq!(ctx.check(), Err(StoreError::DeadlineExceeded));
    }

    #[test]
    fn test_future_deadline_passes() {
        let ctx = QueryContext::with_timeout(Duration::from_secs(60));
        assert!(ctx.check().is_ok());
        assert!(ctx.deadline().unwrap() > Instant::now() + Duration::from_secs(30));
    }
}
