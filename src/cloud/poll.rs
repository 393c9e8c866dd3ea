//! Caller-side polling for instance addresses
//!
//! Providers report "not ready yet" as an empty address and never retry on
//! their own. The attempt ceiling lives here, with the caller.

use crate::cloud::{CloudProvider, InstanceIdentifier};
use crate::{CrdHostError, Result};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 60,
        }
    }
}

/// Poll until the provider publishes an address.
///
/// Permanent errors end the wait immediately; transient ones count as an
/// attempt. Dropping the returned future cancels the wait.
pub async fn wait_for_address<P>(
    provider: &P,
    instance_id: &InstanceIdentifier,
    policy: PollPolicy,
) -> Result<String>
where
    P: CloudProvider + ?Sized,
{
    for attempt in 1..=policy.max_attempts {
        match provider.get_instance_address(instance_id).await {
            Ok(address) if !address.is_empty() => return Ok(address),
            Ok(_) => debug!(%instance_id, attempt, "address not published yet"),
            Err(e) if e.is_permanent() => return Err(e),
            Err(e) => debug!(%instance_id, attempt, error = %e, "transient lookup failure"),
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    Err(CrdHostError::WaitExhausted {
        instance_id: instance_id.to_string(),
        attempts: policy.max_attempts,
    })
}
