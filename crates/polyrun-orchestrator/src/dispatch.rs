// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Task-queue dispatch: queue configuration, options, and the seam to the
//! external durable engine.
//!
//! Two dispatch modes exist. **Remote dispatch** routes a task through a
//! named queue to whatever worker pool registered its name — used for
//! everything implemented by another runtime. **Local dispatch** runs an
//! operation synchronously in this process under a short bounded retry —
//! reserved for work that must not depend on a possibly-unavailable remote
//! worker, chiefly the failure-recovery status update.

use std::env;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use polyrun_types::RunMemo;

use crate::error::{OrchestratorError, Result};

/// Queue the orchestration driver is scheduled on.
pub const DEFAULT_ORCHESTRATION_QUEUE: &str = "execution_orchestrator";

/// Queue the cross-runtime task handlers are registered on.
pub const DEFAULT_ACTIVITY_QUEUE: &str = "execution_runner";

/// Queue names for one deployment, resolved once at schedule time.
///
/// The creation-time caller converts this into the run's immutable
/// [`RunMemo`]; the orchestrator never reads the environment during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDispatchConfig {
    /// Queue the orchestration driver polls.
    pub orchestration_queue: String,
    /// Queue the cross-runtime task handlers poll.
    pub activity_queue: String,
}

impl RunDispatchConfig {
    /// Load queue names from environment variables.
    ///
    /// # Optional Environment Variables
    /// - `POLYRUN_ORCHESTRATION_QUEUE` - Orchestrator queue (default: "execution_orchestrator")
    /// - `POLYRUN_ACTIVITY_QUEUE` - Task-handler queue (default: "execution_runner")
    pub fn from_env() -> Self {
        let orchestration_queue = env::var("POLYRUN_ORCHESTRATION_QUEUE")
            .unwrap_or_else(|_| DEFAULT_ORCHESTRATION_QUEUE.to_string());
        let activity_queue = env::var("POLYRUN_ACTIVITY_QUEUE")
            .unwrap_or_else(|_| DEFAULT_ACTIVITY_QUEUE.to_string());
        Self {
            orchestration_queue,
            activity_queue,
        }
    }

    /// Immutable memo to attach to a run's start request.
    pub fn memo(&self) -> RunMemo {
        RunMemo::for_queue(self.activity_queue.clone())
    }
}

impl Default for RunDispatchConfig {
    fn default() -> Self {
        Self {
            orchestration_queue: DEFAULT_ORCHESTRATION_QUEUE.to_string(),
            activity_queue: DEFAULT_ACTIVITY_QUEUE.to_string(),
        }
    }
}

/// Timeout and retry bounds for one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Overall time bound for the dispatch, retries included.
    pub timeout: Duration,
    /// Maximum attempts before the dispatch fails.
    pub max_attempts: u32,
    /// Delay between attempts.
    pub retry_delay: Duration,
}

impl DispatchOptions {
    /// Defaults for remote task execution: minutes-long timeout matching
    /// expected task duration.
    pub fn remote() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            max_attempts: 3,
            retry_delay: Duration::from_secs(2),
        }
    }

    /// Defaults for local in-process dispatch: tens of seconds, so a
    /// failing recovery path surfaces quickly.
    pub fn local() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            retry_delay: Duration::from_secs(2),
        }
    }
}

/// Seam to the external durable engine's activity dispatch.
///
/// Implementations route `task` (a case-sensitive handler name) to the
/// worker pool polling `queue`, enforcing the timeout and retry policy in
/// `options`, and return the handler's serialized result. Every call is an
/// await point for the replay-safe driver; all real I/O happens behind it.
#[async_trait]
pub trait TaskDispatcher: Send + Sync {
    /// Dispatch a task and await its serialized result.
    async fn dispatch(
        &self,
        queue: &str,
        task: &str,
        input: Vec<u8>,
        options: &DispatchOptions,
    ) -> Result<Vec<u8>>;
}

/// Dispatch a task with typed input and output.
pub async fn call_remote<I, O>(
    dispatcher: &dyn TaskDispatcher,
    queue: &str,
    task: &str,
    input: &I,
    options: &DispatchOptions,
) -> Result<O>
where
    I: Serialize + Sync,
    O: DeserializeOwned,
{
    let payload = serde_json::to_vec(input)?;
    let raw = dispatcher.dispatch(queue, task, payload, options).await?;
    Ok(serde_json::from_slice(&raw)?)
}

/// Run an in-process operation under local dispatch bounds.
///
/// Attempts the operation up to `options.max_attempts` times with
/// `options.retry_delay` between attempts, all under `options.timeout`.
pub async fn with_local_retry<T, F, Fut>(
    task: &str,
    options: &DispatchOptions,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = options.max_attempts.max(1);
    let attempts = async {
        let mut last_error = None;
        for attempt in 1..=max_attempts {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(task, attempt, error = %e, "Local dispatch attempt failed");
                    last_error = Some(e);
                    if attempt < max_attempts {
                        tokio::time::sleep(options.retry_delay).await;
                    }
                }
            }
        }
        // max_attempts >= 1, so at least one error was recorded.
        Err(last_error.unwrap_or_else(|| OrchestratorError::Dispatch {
            task: task.to_string(),
            queue: "local".to_string(),
            reason: "no attempts executed".to_string(),
        }))
    };

    match tokio::time::timeout(options.timeout, attempts).await {
        Ok(result) => result,
        Err(_) => Err(OrchestratorError::Timeout {
            operation: task.to_string(),
            after_ms: options.timeout.as_millis() as u64,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_config_defaults() {
        let config = RunDispatchConfig::default();
        assert_eq!(config.orchestration_queue, DEFAULT_ORCHESTRATION_QUEUE);
        assert_eq!(config.activity_queue, DEFAULT_ACTIVITY_QUEUE);
    }

    #[test]
    fn test_memo_carries_activity_queue() {
        let config = RunDispatchConfig {
            orchestration_queue: "orc".to_string(),
            activity_queue: "act".to_string(),
        };
        assert_eq!(config.memo().activity_queue.as_deref(), Some("act"));
    }

    #[test]
    fn test_remote_options_are_long_local_options_short() {
        assert!(DispatchOptions::remote().timeout > DispatchOptions::local().timeout);
        assert_eq!(DispatchOptions::local().timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_local_retry_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let options = DispatchOptions {
            timeout: Duration::from_secs(5),
            max_attempts: 3,
            retry_delay: Duration::from_millis(1),
        };

        let result = with_local_retry("op", &options, || {
            let attempt = calls.fetch_add(1, Ordering::Relaxed) + 1;
            async move {
                if attempt < 3 {
                    Err(OrchestratorError::Storage {
                        operation: "save".to_string(),
                        details: "transient".to_string(),
                    })
                } else {
                    Ok(attempt)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result, 3);
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn test_local_retry_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let options = DispatchOptions {
            timeout: Duration::from_secs(5),
            max_attempts: 3,
            retry_delay: Duration::from_millis(1),
        };

        let result: Result<()> = with_local_retry("op", &options, || {
            calls.fetch_add(1, Ordering::Relaxed);
            async {
                Err(OrchestratorError::Storage {
                    operation: "save".to_string(),
                    details: "permanent".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(OrchestratorError::Storage { .. })));
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn test_local_retry_enforces_total_timeout() {
        let options = DispatchOptions {
            timeout: Duration::from_millis(20),
            max_attempts: 100,
            retry_delay: Duration::from_millis(50),
        };

        let result: Result<()> = with_local_retry("op", &options, || async {
            Err(OrchestratorError::Storage {
                operation: "save".to_string(),
                details: "slow".to_string(),
            })
        })
        .await;

        assert!(matches!(result, Err(OrchestratorError::Timeout { .. })));
    }
}
