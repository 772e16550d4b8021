//! Confirmation polling for submitted transactions.
//!
//! A transaction is looked up by hash on a fullnode at a fixed interval. "Not
//! found yet" and pending responses are retried; an executed transaction
//! ends polling either way.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::TransactionsConfig;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransactionError {
    #[error("invalid transaction hash {0:?}")]
    InvalidHash(String),

    #[error("transaction {hash} failed: {vm_status}")]
    Failed { hash: String, vm_status: String },

    #[error("transaction {hash} not confirmed after {attempts} attempts")]
    Timeout { hash: String, attempts: u32 },
}

/// A successfully executed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub hash: String,
    pub version: Option<String>,
    pub vm_status: String,
}

#[derive(Debug, Deserialize)]
struct TransactionView {
    #[serde(rename = "type", default)]
    kind: String,
    success: Option<bool>,
    version: Option<String>,
    vm_status: Option<String>,
}

enum Poll {
    Pending,
    Done(Result<Confirmation, TransactionError>),
}

pub struct TransactionWatcher {
    client: reqwest::Client,
    fullnode_url: String,
    interval: Duration,
    max_attempts: u32,
}

impl TransactionWatcher {
    pub fn new(client: reqwest::Client, fullnode_url: impl Into<String>) -> Self {
        let defaults = TransactionsConfig::default();
        Self {
            client,
            fullnode_url: fullnode_url.into().trim_end_matches('/').to_string(),
            interval: defaults.interval,
            max_attempts: defaults.max_attempts,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn from_config(client: reqwest::Client, fullnode_url: &str, config: &TransactionsConfig) -> Self {
        Self::new(client, fullnode_url)
            .with_interval(config.interval)
            .with_max_attempts(config.max_attempts)
    }

    /// Poll until the transaction is executed or attempts run out.
    pub async fn wait_for_confirmation(&self, hash: &str) -> Result<Confirmation, TransactionError> {
        let hash = hash.trim();
        if !is_transaction_hash(hash) {
            return Err(TransactionError::InvalidHash(hash.to_string()));
        }

        for attempt in 1..=self.max_attempts {
            if let Poll::Done(result) = self.poll_once(hash, attempt).await {
                return result;
            }
            if attempt < self.max_attempts {
                tokio::time::sleep(self.interval).await;
            }
        }

        warn!(hash = %hash, attempts = self.max_attempts, "transaction not confirmed in time");
        Err(TransactionError::Timeout {
            hash: hash.to_string(),
            attempts: self.max_attempts,
        })
    }

    async fn poll_once(&self, hash: &str, attempt: u32) -> Poll {
        let url = format!("{}/v1/transactions/by_hash/{}", self.fullnode_url, hash);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(hash = %hash, attempt, error = %e, "transaction lookup failed; retrying");
                return Poll::Pending;
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(hash = %hash, attempt, "transaction not found yet");
            return Poll::Pending;
        }
        if !status.is_success() {
            debug!(hash = %hash, attempt, status = %status, "fullnode error; retrying");
            return Poll::Pending;
        }

        let view: TransactionView = match response.json().await {
            Ok(view) => view,
            Err(e) => {
                debug!(hash = %hash, attempt, error = %e, "unreadable transaction response; retrying");
                return Poll::Pending;
            }
        };

        if view.kind == "pending_transaction" {
            debug!(hash = %hash, attempt, "transaction pending");
            return Poll::Pending;
        }

        let vm_status = view.vm_status.unwrap_or_default();
        match view.success {
            Some(true) => {
                info!(hash = %hash, attempt, "transaction confirmed");
                Poll::Done(Ok(Confirmation {
                    hash: hash.to_string(),
                    version: view.version,
                    vm_status,
                }))
            }
            Some(false) => {
                warn!(hash = %hash, vm_status = %vm_status, "transaction failed");
                Poll::Done(Err(TransactionError::Failed {
                    hash: hash.to_string(),
                    vm_status,
                }))
            }
            None => Poll::Pending,
        }
    }
}

/// `0x` followed by exactly 64 hex digits.
pub fn is_transaction_hash(hash: &str) -> bool {
    hash.strip_prefix("0x")
        .is_some_and(|digits| digits.len() == 64 && digits.chars().all(|c| c.is_ascii_hexdigit()))
}
