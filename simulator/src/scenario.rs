//! Deterministic ledger scenarios.

use serde::{Deserialize, Serialize};

/// A deterministic scenario: a named list of steps driven against a
/// freshly initialized ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Steps in the scenario.
    pub steps: Vec<ScenarioStep>,
}

/// A step in a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScenarioStep {
    /// Issue a transfer that is expected to succeed.
    Transfer {
        from: String,
        to: String,
        amount: u64,
    },
    /// Issue a transfer that is expected to be rejected.
    ExpectRejection {
        from: String,
        to: String,
        amount: u64,
    },
    /// Assert an account's balance.
    AssertBalance { account: String, expected: u64 },
    /// Assert the conservation invariant.
    AssertConservation,
}

impl Scenario {
    /// Load a scenario by name.
    pub fn load(name: &str) -> anyhow::Result<Self> {
        match name {
            "handover" => Ok(Self::handover()),
            "rejection" => Ok(Self::rejection()),
            "self-transfer" => Ok(Self::self_transfer()),
            _ => Err(anyhow::anyhow!("Unknown scenario: {}", name)),
        }
    }

    /// Owner pays two accounts, then one pays the other.
    fn handover() -> Self {
        Self {
            name: "handover".to_string(),
            description: "Supply flows owner -> ALICE -> BOB".to_string(),
            steps: vec![
                ScenarioStep::Transfer {
                    from: "OWNER".to_string(),
                    to: "ALICE".to_string(),
                    amount: 50,
                },
                ScenarioStep::AssertBalance {
                    account: "ALICE".to_string(),
                    expected: 50,
                },
                ScenarioStep::Transfer {
                    from: "ALICE".to_string(),
                    to: "BOB".to_string(),
                    amount: 50,
                },
                ScenarioStep::AssertBalance {
                    account: "ALICE".to_string(),
                    expected: 0,
                },
                ScenarioStep::AssertBalance {
                    account: "BOB".to_string(),
                    expected: 50,
                },
                ScenarioStep::AssertConservation,
            ],
        }
    }

    /// An empty account tries to spend.
    fn rejection() -> Self {
        Self {
            name: "rejection".to_string(),
            description: "Spend from an empty account is rejected".to_string(),
            steps: vec![
                ScenarioStep::ExpectRejection {
                    from: "ALICE".to_string(),
                    to: "OWNER".to_string(),
                    amount: 1,
                },
                ScenarioStep::AssertBalance {
                    account: "ALICE".to_string(),
                    expected: 0,
                },
                ScenarioStep::AssertConservation,
            ],
        }
    }

    /// Self-transfer leaves the balance unchanged but still notifies.
    fn self_transfer() -> Self {
        Self {
            name: "self-transfer".to_string(),
            description: "Owner pays itself; balance unchanged".to_string(),
            steps: vec![
                ScenarioStep::Transfer {
                    from: "OWNER".to_string(),
                    to: "OWNER".to_string(),
                    amount: 10,
                },
                ScenarioStep::AssertConservation,
            ],
        }
    }
}
