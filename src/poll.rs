//! State polling
//!
//! Bounded fixed-interval wait used by every `wait_for_state` method:
//! probe the resource's status until it equals the target or the attempt
//! budget runs out. No backoff, no jitter.

use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Polling budget for a state wait
#[derive(Debug, Clone, Copy)]
pub struct WaitOpts {
    /// Pause between probes
    pub interval: Duration,
    /// Probe attempts before giving up
    pub max_attempts: u32,
    /// Treat a failed probe as reaching the target. Set when waiting for
    /// a deleted marker, where the resource may vanish (404) before the
    /// platform ever reports the marker.
    pub missing_matches: bool,
}

impl Default for WaitOpts {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 60,
            missing_matches: false,
        }
    }
}

/// Poll `probe` until it reports `target`.
///
/// `what` names the resource in log lines and the timeout error.
pub async fn wait_until<F, Fut>(what: &str, target: &str, opts: WaitOpts, mut probe: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String>>,
{
    for attempt in 1..=opts.max_attempts {
        match probe().await {
            Ok(state) if state == target => {
                tracing::info!("{} reached state {} after {} attempt(s)", what, target, attempt);
                return Ok(());
            }
            Ok(state) => {
                tracing::debug!(
                    "{} in state {}, waiting for {} ({}/{})",
                    what,
                    state,
                    target,
                    attempt,
                    opts.max_attempts
                );
            }
            Err(err) if opts.missing_matches => {
                tracing::info!("{} no longer answers ({}), treating as {}", what, err, target);
                return Ok(());
            }
            Err(err) => return Err(err),
        }

        if attempt < opts.max_attempts {
            sleep(opts.interval).await;
        }
    }

    Err(anyhow::anyhow!(
        "timed out waiting for {} to reach state {} ({} attempts every {:?})",
        what,
        target,
        opts.max_attempts,
        opts.interval
    ))
}
