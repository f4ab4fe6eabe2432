//! Bounded polling for transaction-effect visibility.
//!
//! Ledger indexing lags execution. The polling loop is the only place in
//! OVC that waits for anything; it is bounded, and its result is a tagged
//! value rather than an error, so callers can tell "still indexing" apart
//! from "rejected" without catching exceptions.

use std::time::Duration;

use tracing::debug;

use crate::call::{TxEffects, TxHandle};
use crate::error::LedgerResult;
use crate::traits::LedgerTransport;

/// Retry budget for effect polling.
#[derive(Clone, Copy, Debug)]
pub struct PollPolicy {
    /// Maximum number of `effects` lookups before giving up.
    pub max_attempts: u32,
    /// Delay before the second attempt (the first runs immediately).
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each attempt.
    pub backoff_factor: f64,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay: Duration::from_millis(200),
            backoff_factor: 1.5,
        }
    }
}

impl PollPolicy {
    /// Zero-delay policy for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            backoff_factor: 1.0,
        }
    }
}

/// Outcome of a bounded polling run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// The effects became visible.
    Ready(TxEffects),
    /// The budget ran out with the transaction still unindexed.
    TimedOut { attempts: u32 },
}

/// Poll `transport` for the effects of `handle` under `policy`.
///
/// Transport errors propagate immediately; only "not yet indexed" is
/// retried.
pub async fn poll_effects<T: LedgerTransport + ?Sized>(
    transport: &T,
    handle: &TxHandle,
    policy: &PollPolicy,
) -> LedgerResult<PollOutcome> {
    let mut delay = policy.initial_delay;
    for attempt in 1..=policy.max_attempts {
        if let Some(effects) = transport.effects(handle).await? {
            debug!(digest = %handle.digest, attempt, "transaction effects visible");
            return Ok(PollOutcome::Ready(effects));
        }
        debug!(digest = %handle.digest, attempt, "effects not yet indexed");
        if attempt < policy.max_attempts && !delay.is_zero() {
            tokio::time::sleep(delay).await;
            delay = delay.mul_f64(policy.backoff_factor);
        }
    }
    Ok(PollOutcome::TimedOut {
        attempts: policy.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::{MutationCall, ReadQuery};
    use crate::error::LedgerError;
    use async_trait::async_trait;
    use ovc_wire::ReturnValue;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Transport whose effects become visible after a fixed number of polls.
    struct LaggyTransport {
        visible_after: u32,
        polls: AtomicU32,
    }

    #[async_trait]
    impl LedgerTransport for LaggyTransport {
        async fn submit(&self, _call: MutationCall) -> LedgerResult<TxHandle> {
            Ok(TxHandle::new("tx"))
        }

        async fn effects(&self, _handle: &TxHandle) -> LedgerResult<Option<TxEffects>> {
            let n = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= self.visible_after {
                Ok(Some(TxEffects::default()))
            } else {
                Ok(None)
            }
        }

        async fn simulate(&self, _query: ReadQuery) -> LedgerResult<Vec<ReturnValue>> {
            Err(LedgerError::Transport("unused".into()))
        }
    }

    #[tokio::test]
    async fn ready_after_lag() {
        let transport = LaggyTransport {
            visible_after: 3,
            polls: AtomicU32::new(0),
        };
        let outcome = poll_effects(&transport, &TxHandle::new("tx"), &PollPolicy::immediate(5))
            .await
            .unwrap();
        assert!(matches!(outcome, PollOutcome::Ready(_)));
        assert_eq!(transport.polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn times_out_when_budget_exhausted() {
        let transport = LaggyTransport {
            visible_after: 100,
            polls: AtomicU32::new(0),
        };
        let outcome = poll_effects(&transport, &TxHandle::new("tx"), &PollPolicy::immediate(4))
            .await
            .unwrap();
        assert_eq!(outcome, PollOutcome::TimedOut { attempts: 4 });
        assert_eq!(transport.polls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn first_attempt_runs_without_delay() {
        let transport = LaggyTransport {
            visible_after: 1,
            polls: AtomicU32::new(0),
        };
        let policy = PollPolicy {
            max_attempts: 2,
            initial_delay: Duration::from_secs(3600),
            backoff_factor: 2.0,
        };
        // Would hang for an hour if the first attempt slept.
        let outcome = poll_effects(&transport, &TxHandle::new("tx"), &policy)
            .await
            .unwrap();
        assert!(matches!(outcome, PollOutcome::Ready(_)));
    }
}
