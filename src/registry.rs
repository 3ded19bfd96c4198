//! ISIN verification against the external securities registry.

use crate::config::RegistryConfig;
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Outcome of a registry lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsinStatus {
    /// The registry knows the ISIN.
    Valid,
    /// The registry answered with anything other than 200.
    Rejected,
}

/// Registry could not give an answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The request failed before a response arrived.
    #[error("ISIN registry unreachable: {0}")]
    Unavailable(String),
    /// Too many recent failures; requests are short-circuited.
    #[error("ISIN registry temporarily disabled after repeated failures")]
    CircuitOpen,
}

/// Checks whether an ISIN exists.
#[async_trait]
pub trait IsinVerifier: Send + Sync {
    /// Looks the ISIN up.
    ///
    /// # Errors
    /// Returns [`RegistryError`] when the registry cannot be consulted.
    async fn verify(&self, isin: &str) -> Result<IsinStatus, RegistryError>;
}

/// Consecutive-failure circuit breaker.
///
/// Closed until `failure_threshold` consecutive failures, then open for
/// `cooldown`. After the cooldown exactly one trial request is let through
/// (half-open); its outcome closes or reopens the circuit. A trial that never
/// reports back is abandoned after another `cooldown`.
#[derive(Debug)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    cooldown: Duration,
    state: Mutex<BreakerState>,
}

#[derive(Debug, Default)]
struct BreakerState {
    consecutive_failures: u32,
    open_until: Option<Instant>,
    trial_started: Option<Instant>,
}

impl CircuitBreaker {
    /// Creates a closed breaker.
    #[must_use]
    pub fn new(failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            failure_threshold,
            cooldown,
            state: Mutex::new(BreakerState::default()),
        }
    }

    /// Whether a request may be attempted now. While half-open, the first
    /// caller is granted the trial and everyone else is refused.
    pub fn allow(&self) -> bool {
        let mut state = self.state.lock();
        let Some(until) = state.open_until else {
            return true;
        };

        let now = Instant::now();
        if now < until {
            return false;
        }
        if let Some(started) = state.trial_started
            && now.duration_since(started) < self.cooldown
        {
            return false;
        }
        state.trial_started = Some(now);
        true
    }

    /// Closes the circuit.
    pub fn record_success(&self) {
        let mut state = self.state.lock();
        state.consecutive_failures = 0;
        state.open_until = None;
        state.trial_started = None;
    }

    /// Counts a failure, opening the circuit once the threshold is reached.
    /// A failed trial reopens it for another cooldown.
    pub fn record_failure(&self) {
        let mut state = self.state.lock();
        state.consecutive_failures = state.consecutive_failures.saturating_add(1);
        if state.consecutive_failures >= self.failure_threshold {
            state.open_until = Some(Instant::now() + self.cooldown);
            state.trial_started = None;
        }
    }

    /// Whether requests are currently refused, either because the cooldown is
    /// running or because a trial is in flight. Does not claim the trial.
    pub fn is_open(&self) -> bool {
        let state = self.state.lock();
        let Some(until) = state.open_until else {
            return false;
        };
        let now = Instant::now();
        now < until
            || state
                .trial_started
                .is_some_and(|started| now.duration_since(started) < self.cooldown)
    }
}

/// [`IsinVerifier`] that queries `GET {base_url}{isin}` over HTTP.
#[derive(Debug)]
pub struct RegistryIsinVerifier {
    client: Client,
    base_url: String,
    breaker: CircuitBreaker,
}

impl RegistryIsinVerifier {
    /// Builds a verifier from the registry configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &RegistryConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            breaker: CircuitBreaker::new(
                config.failure_threshold,
                Duration::from_secs(config.cooldown_secs),
            ),
        })
    }

    /// Lookup URL for an ISIN.
    #[must_use]
    pub fn lookup_url(&self, isin: &str) -> String {
        format!("{}{}", self.base_url, isin)
    }
}

#[async_trait]
impl IsinVerifier for RegistryIsinVerifier {
    async fn verify(&self, isin: &str) -> Result<IsinStatus, RegistryError> {
        if !self.breaker.allow() {
            return Err(RegistryError::CircuitOpen);
        }

        let url = self.lookup_url(isin);
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                self.breaker.record_failure();
                warn!("ISIN registry request for {} failed: {}", isin, err);
                return Err(RegistryError::Unavailable(err.to_string()));
            }
        };
        self.breaker.record_success();

        let status = response.status();
        if status == StatusCode::OK {
            debug!("ISIN code {} confirmed by registry", isin);
            return Ok(IsinStatus::Valid);
        }

        let body = response.text().await.unwrap_or_default();
        warn!("ISIN code {} is not valid ({}): {}", isin, status, body);
        Ok(IsinStatus::Rejected)
    }
}
