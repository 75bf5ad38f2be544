//! Workload execution against a live ledger.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use tokenbook_common::{AccountId, LedgerError};
use tokenbook_ledger::TransferProcessor;

use crate::metrics::WorkloadMetrics;
use crate::scenario::{Scenario, ScenarioStep};

/// Drives transfers against the ledger and collects metrics.
pub struct WorkloadController {
    processor: Arc<TransferProcessor>,
    metrics: Arc<Mutex<WorkloadMetrics>>,
}

impl WorkloadController {
    /// Create a controller over an initialized processor.
    pub fn new(processor: Arc<TransferProcessor>) -> Self {
        Self {
            processor,
            metrics: Arc::new(Mutex::new(WorkloadMetrics::new())),
        }
    }

    /// Execute a deterministic scenario step by step.
    pub fn run_scenario(&self, scenario: &Scenario) -> anyhow::Result<()> {
        info!(
            scenario = %scenario.name,
            description = %scenario.description,
            "Running scenario"
        );

        for step in &scenario.steps {
            self.execute_step(step)?;
        }

        Ok(())
    }

    /// Execute a single scenario step.
    fn execute_step(&self, step: &ScenarioStep) -> anyhow::Result<()> {
        match step {
            ScenarioStep::Transfer { from, to, amount } => {
                info!(from = %from, to = %to, amount, "Scenario transfer");

                let start = Instant::now();
                self.processor
                    .transfer(&AccountId::new(from), &AccountId::new(to), *amount)?;
                self.metrics
                    .lock()
                    .record_success(start.elapsed().as_micros() as u64);
            }
            ScenarioStep::ExpectRejection { from, to, amount } => {
                info!(from = %from, to = %to, amount, "Scenario transfer, expecting rejection");

                match self
                    .processor
                    .transfer(&AccountId::new(from), &AccountId::new(to), *amount)
                {
                    Err(LedgerError::InsufficientBalance { .. }) => {
                        self.metrics.lock().record_rejection();
                    }
                    Ok(id) => {
                        anyhow::bail!("Expected rejection, transfer {} succeeded", id)
                    }
                    Err(e) => anyhow::bail!("Expected insufficient balance, got: {}", e),
                }
            }
            ScenarioStep::AssertBalance { account, expected } => {
                let actual = self.processor.balance_of(&AccountId::new(account));
                if actual != *expected {
                    anyhow::bail!(
                        "Balance assertion failed for {}: expected {}, got {}",
                        account,
                        expected,
                        actual
                    );
                }
            }
            ScenarioStep::AssertConservation => {
                if !self.processor.verify_integrity() {
                    anyhow::bail!("Conservation invariant violated");
                }
            }
        }

        Ok(())
    }

    /// Run a randomized concurrent workload: `workers` tasks each issue
    /// `transfers_per_worker` transfers between random accounts of the
    /// pool. Seeded per worker for reproducibility.
    pub async fn run_random(
        &self,
        account_pool: Vec<AccountId>,
        workers: usize,
        transfers_per_worker: u64,
        max_amount: u64,
        seed: u64,
    ) -> anyhow::Result<()> {
        info!(
            workers,
            transfers_per_worker,
            accounts = account_pool.len(),
            seed,
            "Starting randomized workload"
        );

        let pool = Arc::new(account_pool);

        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let processor = self.processor.clone();
                let metrics = self.metrics.clone();
                let pool = pool.clone();
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(worker as u64));

                tokio::task::spawn_blocking(move || {
                    for _ in 0..transfers_per_worker {
                        let from = &pool[rng.gen_range(0..pool.len())];
                        let to = &pool[rng.gen_range(0..pool.len())];
                        let amount = rng.gen_range(0..=max_amount);

                        let start = Instant::now();
                        match processor.transfer(from, to, amount) {
                            Ok(_) => {
                                metrics
                                    .lock()
                                    .record_success(start.elapsed().as_micros() as u64);
                            }
                            Err(LedgerError::InsufficientBalance { .. }) => {
                                metrics.lock().record_rejection();
                            }
                            Err(e) => {
                                // Anything else is a defect in the workload or ledger
                                warn!(error = %e, "Unexpected transfer failure");
                                return Err(e);
                            }
                        }
                    }
                    Ok(())
                })
            })
            .collect();

        for handle in handles {
            handle.await??;
        }

        if !self.processor.verify_integrity() {
            anyhow::bail!("Conservation invariant violated after workload");
        }

        Ok(())
    }

    /// Get a snapshot of the collected metrics.
    pub fn metrics(&self) -> WorkloadMetrics {
        self.metrics.lock().clone()
    }
}

/// Build the account pool for the randomized workload. The owner is
/// always index 0 so the seeded supply can fan out.
pub fn account_pool(owner: &AccountId, extra_accounts: usize) -> Vec<AccountId> {
    let mut pool = vec![owner.clone()];
    pool.extend((1..=extra_accounts).map(|i| AccountId::new(format!("ACCT_{:02}", i))));
    pool
}
