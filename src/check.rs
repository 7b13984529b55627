//! Verification checkpoints
//!
//! Accumulates PASS/FAIL tags over a test's verification steps; the
//! final mark fails the test if any step failed.

use anyhow::Result;
use chrono::{DateTime, Utc};

/// Outcome tag of one verification step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail,
}

/// One recorded verification step
#[derive(Debug, Clone)]
pub struct Verification {
    pub outcome: Outcome,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Ordered pass/fail accumulator for a single test
#[derive(Debug, Default)]
pub struct CheckPoint {
    records: Vec<Verification>,
}

impl CheckPoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result of one verification step
    pub fn mark(&mut self, result: bool, message: &str) {
        let outcome = if result { Outcome::Pass } else { Outcome::Fail };
        match outcome {
            Outcome::Pass => tracing::info!("### VERIFICATION SUCCESSFUL :: {}", message),
            Outcome::Fail => tracing::error!("### VERIFICATION FAILED :: {}", message),
        }
        self.records.push(Verification {
            outcome,
            message: message.to_string(),
            at: Utc::now(),
        });
    }

    /// Record the final verification and settle the test: `Err` carrying
    /// every failed message if any step failed, `Ok` otherwise. Clears
    /// the accumulated records either way.
    pub fn mark_final(&mut self, test_name: &str, result: bool, message: &str) -> Result<()> {
        self.mark(result, message);

        let failed: Vec<String> = self
            .records
            .iter()
            .filter(|r| r.outcome == Outcome::Fail)
            .map(|r| r.message.clone())
            .collect();
        self.records.clear();

        if failed.is_empty() {
            tracing::info!("{} ### TEST SUCCESSFUL", test_name);
            Ok(())
        } else {
            tracing::error!("{} ### TEST FAILED", test_name);
            Err(anyhow::anyhow!(
                "{} failed verifications: {}",
                test_name,
                failed.join("; ")
            ))
        }
    }

    /// Recorded steps so far (cleared by `mark_final`)
    pub fn records(&self) -> &[Verification] {
        &self.records
    }
}
