//! Bounded polling over immediate probes.
//!
//! A single bounded wait is the whole retry budget for any interface read:
//! when the bound elapses the caller gets `None`/`false` and treats the
//! element as absent.

use crate::utils::error::{HarvestError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Polls `probe` every `poll` until it yields `Some`, or until `bound` has
/// elapsed. The probe always runs at least once. Probe errors propagate.
pub async fn wait_for<T, F, Fut>(bound: Duration, poll: Duration, mut probe: F) -> Result<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = Instant::now() + bound;
    loop {
        if let Some(found) = probe().await? {
            return Ok(Some(found));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        sleep(poll.min(deadline - now)).await;
    }
}

/// [`wait_for`] for boolean probes.
pub async fn wait_until<F, Fut>(bound: Duration, poll: Duration, mut probe: F) -> Result<bool>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let found = wait_for(bound, poll, || {
        let check = probe();
        async move { Ok::<_, HarvestError>(check.await?.then_some(())) }
    })
    .await?;
    Ok(found.is_some())
}
