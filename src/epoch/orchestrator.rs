//! Epoch Orchestrator Module
//!
//! This module runs the background loop that periodically turns queued candidates
//! into an epoch.
//!
//! # Flow
//! 1. Wait for the configured interval
//! 2. Drain up to `max_candidates` from the `CandidatePool` in submission order
//! 3. Resolve them against the ledger through `LedgerState`
//! 4. Record the epoch metadata in the `Registry`

use crate::{EpochMetadata, config::EpochConfig, pool::CandidatePool, registry::Registry, state::LedgerState};
use std::{future::Future, sync::Arc};
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

/// Epoch orchestrator
///
/// Connects the candidate pool, the ledger and the registry.
pub struct EpochOrchestrator {
    /// Submitted candidates waiting for an epoch
    candidates: Arc<CandidatePool>,
    /// Ledger the epochs are applied to
    ledger: LedgerState,
    /// Registry for epoch metadata
    registry: Arc<Registry>,
    /// Epoch configuration (interval, size limit)
    config: EpochConfig,
}

impl EpochOrchestrator {
    pub fn new(
        candidates: Arc<CandidatePool>,
        ledger: LedgerState,
        registry: Arc<Registry>,
        config: EpochConfig,
    ) -> Self {
        Self {
            candidates,
            ledger,
            registry,
            config,
        }
    }

    /// Start the orchestrator loop
    ///
    /// # Returns
    /// Runs until an internal fault is raised by the handler, which is returned as
    /// the error. Returns immediately with an error for a zero interval or size
    /// limit. Registry failures are logged and do not stop the loop.
    pub async fn start(self) -> anyhow::Result<()> {
        self.config.validate()?;
        info!(
            "Epoch orchestrator starting: interval_ms={}, max_candidates={}",
            self.config.interval_ms, self.config.max_candidates
        );

        let mut ticker = interval(Duration::from_millis(self.config.interval_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match self.run_epoch().await {
                Ok(Some(metadata)) => {
                    info!(
                        "Epoch #{} resolved: {} accepted, {} rejected, pool size {}",
                        metadata.epoch_id, metadata.accepted_count, metadata.rejected_count, metadata.pool_size
                    );
                }
                Ok(None) => debug!("No candidates queued"),
                Err(e) => {
                    error!("Epoch orchestrator stopping: {:?}", e);
                    return Err(e);
                }
            }
        }
    }

    /// Resolve one epoch from the queued candidates
    ///
    /// # Returns
    /// * `Ok(Some(EpochMetadata))` if an epoch was run
    /// * `Ok(None)` if no candidates were queued
    /// * `Err` on an internal handler fault
    pub async fn run_epoch(&self) -> anyhow::Result<Option<EpochMetadata>> {
        let candidates = self.candidates.take_pending(self.config.max_candidates).await;
        if candidates.is_empty() {
            return Ok(None);
        }

        debug!("Resolving epoch over {} candidates", candidates.len());
        let (metadata, _outcome) = self.ledger.run_epoch(candidates).await?;

        if let Err(e) = self.registry.store(&metadata).await {
            warn!("Failed to record epoch #{}: {:?}", metadata.epoch_id, e);
        }

        Ok(Some(metadata))
    }
}

/// Drive `server` until it returns or the orchestrator task exits
///
/// Queued candidates are never resolved without the orchestrator, so its exit ends
/// the node with an error even when the loop itself returned `Ok`.
pub async fn serve_until_stopped<S>(server: S, orchestrator: JoinHandle<anyhow::Result<()>>) -> anyhow::Result<()>
where
    S: Future<Output = anyhow::Result<()>>,
{
    tokio::select! {
        result = server => result,
        joined = orchestrator => {
            let result = joined
                .map_err(|e| anyhow::anyhow!("epoch orchestrator task failed: {}", e))
                .and_then(|result| result);
            match result {
                Ok(()) => Err(anyhow::anyhow!("epoch orchestrator stopped")),
                Err(e) => {
                    error!("Epoch orchestrator error: {:?}", e);
                    Err(e)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{alice, bob, carol, genesis_utxo, pool_with, signed_tx};
    use ethers::signers::Signer;

    async fn orchestrator(max_candidates: usize) -> (EpochOrchestrator, Arc<CandidatePool>, LedgerState, Arc<Registry>) {
        let u1 = genesis_utxo(1);
        let ledger = LedgerState::new(&pool_with(&[(u1, 10, &alice())]));
        let candidates = Arc::new(CandidatePool::new());
        let registry = Arc::new(Registry::connect("sqlite::memory:").await.unwrap());
        let config = EpochConfig {
            interval_ms: 10,
            max_candidates,
        };
        let orchestrator = EpochOrchestrator::new(candidates.clone(), ledger.clone(), registry.clone(), config);
        (orchestrator, candidates, ledger, registry)
    }

    #[tokio::test]
    async fn test_empty_queue_runs_no_epoch() {
        let (orchestrator, _, _, registry) = orchestrator(10).await;

        assert_eq!(orchestrator.run_epoch().await.unwrap(), None);
        assert_eq!(registry.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_epoch_drains_queue_and_records_metadata() {
        let (orchestrator, candidates, ledger, registry) = orchestrator(10).await;
        let alice = alice();
        let u1 = genesis_utxo(1);

        let t1 = signed_tx(&alice, &[u1], &[(10, bob().address())]);
        let t2 = signed_tx(&alice, &[u1], &[(10, carol().address())]);
        candidates.add(t1.clone()).await;
        candidates.add(t2).await;

        let metadata = orchestrator.run_epoch().await.unwrap().unwrap();

        assert_eq!(metadata.epoch_id, 1);
        assert_eq!(metadata.accepted_count, 1);
        assert_eq!(metadata.rejected_count, 1);
        assert!(candidates.is_empty().await);
        assert_eq!(ledger.get_utxo(&t1.output_id(0)).await.unwrap().owner, bob().address());
        assert_eq!(registry.get(1).await.unwrap(), Some(metadata));
    }

    #[tokio::test]
    async fn test_epoch_respects_max_candidates() {
        let (orchestrator, candidates, ledger, _) = orchestrator(1).await;
        let (alice, bob) = (alice(), bob());
        let u1 = genesis_utxo(1);

        let t1 = signed_tx(&alice, &[u1], &[(10, bob.address())]);
        let t2 = signed_tx(&bob, &[t1.output_id(0)], &[(10, carol().address())]);
        // Dependent first: it waits in the queue for a later epoch
        candidates.add(t2.clone()).await;
        candidates.add(t1.clone()).await;

        let first = orchestrator.run_epoch().await.unwrap().unwrap();
        assert_eq!(first.accepted_count, 0);
        assert_eq!(candidates.len().await, 1);

        let second = orchestrator.run_epoch().await.unwrap().unwrap();
        assert_eq!(second.epoch_id, 2);
        assert_eq!(second.accepted_count, 1);
        assert!(ledger.get_utxo(&t1.output_id(0)).await.is_some());
        assert!(ledger.get_utxo(&t2.output_id(0)).await.is_none());
    }

    #[tokio::test]
    async fn test_orchestrator_failure_stops_server() {
        let task = tokio::spawn(async { Err(anyhow::anyhow!("pool fault")) });

        let result = serve_until_stopped(std::future::pending(), task).await;

        assert!(result.unwrap_err().to_string().contains("pool fault"));
    }

    #[tokio::test]
    async fn test_orchestrator_exit_stops_server() {
        let task = tokio::spawn(async { Ok(()) });

        let result = serve_until_stopped(std::future::pending(), task).await;

        assert!(result.unwrap_err().to_string().contains("orchestrator stopped"));
    }

    #[tokio::test]
    async fn test_zero_interval_orchestrator_stops_server() {
        let (mut orchestrator, ..) = orchestrator(10).await;
        orchestrator.config.interval_ms = 0;
        let task = tokio::spawn(orchestrator.start());

        let result = serve_until_stopped(std::future::pending(), task).await;

        assert!(result.unwrap_err().to_string().contains("interval_ms"));
    }

    #[tokio::test]
    async fn test_server_exit_returns_its_result() {
        let task = tokio::spawn(std::future::pending::<anyhow::Result<()>>());

        let result = serve_until_stopped(async { Ok(()) }, task).await;

        assert!(result.is_ok());
    }
}
