//! Scenario-based tests for covreport

mod cleanup;
mod failure_handling;
mod provisioning;
mod staleness;
