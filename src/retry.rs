use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::NcbiDataError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Retryable,
    Fatal,
}

pub fn classify(err: &NcbiDataError) -> FailureClass {
    match err.status() {
        Some(status) if (500..=599).contains(&status) || status == 429 => FailureClass::Retryable,
        _ => FailureClass::Fatal,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub cooldown: Duration,
    pub courtesy_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            cooldown: Duration::from_secs(15),
            courtesy_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetrySettings {
    #[serde(default)]
    pub max_attempts: Option<usize>,
    #[serde(default)]
    pub cooldown_secs: Option<u64>,
    #[serde(default)]
    pub courtesy_delay_ms: Option<u64>,
}

impl RetrySettings {
    pub fn into_policy(self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts).max(1),
            cooldown: self
                .cooldown_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.cooldown),
            courtesy_delay: self
                .courtesy_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.courtesy_delay),
        }
    }
}

pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

#[derive(Clone)]
pub struct Retrier {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl Retrier {
    pub fn new(policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { policy, sleeper }
    }

    pub fn sleeper(&self) -> &dyn Sleeper {
        self.sleeper.as_ref()
    }

    pub fn run<T, F>(&self, operation: &str, subject: &str, mut call: F) -> Result<T, NcbiDataError>
    where
        F: FnMut() -> Result<T, NcbiDataError>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1usize;
        loop {
            match call() {
                Ok(value) => {
                    self.sleeper.sleep(self.policy.courtesy_delay);
                    return Ok(value);
                }
                Err(err) if classify(&err) == FailureClass::Retryable => {
                    warn!(
                        operation,
                        subject,
                        attempt,
                        max_attempts,
                        error = %err,
                        "received retryable error from NCBI"
                    );
                    if attempt >= max_attempts {
                        return Err(NcbiDataError::RetriesExhausted {
                            operation: operation.to_string(),
                            subject: subject.to_string(),
                            attempts: attempt,
                            last_error: err.to_string(),
                        });
                    }
                    self.sleeper.sleep(self.policy.cooldown);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for Retrier {
    fn default() -> Self {
        Self::new(RetryPolicy::default(), Arc::new(ThreadSleeper))
    }
}
