//! Readiness polling for newly created projects.
//!
//! Provisioning is asynchronous on the provider side: the create call returns
//! as soon as the project is registered, and the project becomes usable some
//! time later. The poller waits for that moment with a fixed interval, bounded
//! by an optional deadline and attempt budget, and stops early on cancellation.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use serverless_search_repository::{ControlPlaneClient, ProvisioningError};
use serverless_search_shared::ProjectPhase;

/// Default time between two status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default overall deadline for a project to become ready.
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Configuration for the readiness poller.
#[derive(Debug, Clone)]
pub struct ReadinessConfig {
    /// Constant wait before each status check.
    pub interval: Duration,
    /// Overall deadline. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Maximum number of status checks. `None` means no limit.
    pub max_attempts: Option<u32>,
    /// Phase that marks the project as usable.
    pub ready_phase: ProjectPhase,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: Some(DEFAULT_READY_TIMEOUT),
            max_attempts: None,
            ready_phase: ProjectPhase::Initialized,
        }
    }
}

impl ReadinessConfig {
    /// Poll forever until the project is ready.
    pub fn unbounded() -> Self {
        Self {
            timeout: None,
            max_attempts: None,
            ..Self::default()
        }
    }
}

/// How a readiness wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessOutcome {
    /// The project reported the ready phase.
    Ready { attempts: u32, elapsed: Duration },
    /// The deadline or attempt budget ran out first.
    TimedOut {
        attempts: u32,
        elapsed: Duration,
        last_phase: Option<ProjectPhase>,
    },
    /// The cancellation token fired.
    Cancelled { attempts: u32 },
}

impl ReadinessOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// Polls the control API until a project reaches its ready phase.
pub struct ReadinessPoller {
    client: Arc<dyn ControlPlaneClient>,
    config: ReadinessConfig,
}

impl ReadinessPoller {
    /// Create a poller with default configuration.
    pub fn new(client: Arc<dyn ControlPlaneClient>) -> Self {
        Self::with_config(client, ReadinessConfig::default())
    }

    /// Create a poller with custom configuration.
    pub fn with_config(client: Arc<dyn ControlPlaneClient>, config: ReadinessConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ReadinessConfig {
        &self.config
    }

    /// Wait until `project_id` is ready.
    ///
    /// Each iteration waits one interval, then issues exactly one status
    /// check. The wait never extends past the deadline: if the deadline falls
    /// inside an interval the poller returns `TimedOut` at the deadline without
    /// a further check.
    ///
    /// # Returns
    ///
    /// * `Ok(ReadinessOutcome)` - Ready, timed out, or cancelled
    /// * `Err(ProvisioningError)` - A status request failed; no retry is made
    #[instrument(skip(self, cancel))]
    pub async fn await_ready(
        &self,
        project_id: &str,
        cancel: &CancellationToken,
    ) -> Result<ReadinessOutcome, ProvisioningError> {
        let started = Instant::now();
        // A deadline too far out to represent is no deadline.
        let deadline = self
            .config
            .timeout
            .and_then(|timeout| started.checked_add(timeout));
        let mut attempts: u32 = 0;
        let mut last_phase: Option<ProjectPhase> = None;

        loop {
            let next_check = Instant::now().checked_add(self.config.interval);
            let (wake_at, at_deadline) = match (deadline, next_check) {
                (Some(deadline), Some(next)) if deadline < next => (Some(deadline), true),
                (Some(deadline), None) => (Some(deadline), true),
                (_, next) => (next, false),
            };

            let Some(wake_at) = wake_at else {
                cancel.cancelled().await;
                info!(attempts, "Readiness wait cancelled");
                return Ok(ReadinessOutcome::Cancelled { attempts });
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(attempts, "Readiness wait cancelled");
                    return Ok(ReadinessOutcome::Cancelled { attempts });
                }
                _ = sleep_until(wake_at) => {}
            }

            if at_deadline {
                warn!(attempts, last_phase = ?last_phase, "Readiness deadline reached");
                return Ok(ReadinessOutcome::TimedOut {
                    attempts,
                    elapsed: started.elapsed(),
                    last_phase,
                });
            }

            attempts += 1;
            let status = self.client.project_status(project_id).await?;
            debug!(attempt = attempts, phase = %status.phase, "Polled project status");

            if status.phase == self.config.ready_phase {
                let elapsed = started.elapsed();
                info!(attempts, elapsed = ?elapsed, phase = %status.phase, "Project is ready");
                return Ok(ReadinessOutcome::Ready { attempts, elapsed });
            }
            last_phase = Some(status.phase);

            if self
                .config
                .max_attempts
                .is_some_and(|max_attempts| attempts >= max_attempts)
            {
                warn!(attempts, last_phase = ?last_phase, "Readiness attempt budget exhausted");
                return Ok(ReadinessOutcome::TimedOut {
                    attempts,
                    elapsed: started.elapsed(),
                    last_phase,
                });
            }
        }
    }
}
