//! # fray-core
//!
//! Concurrency-control benchmark kernel for multi-agent shared-resource
//! workloads. A fixed set of concurrent agents runs a two-account transfer
//! against a store with no guarantees of its own, under four interchangeable
//! coordination disciplines (none, pessimistic locking, optimistic
//! validation, and Wait-Die leasing), and the harness measures the
//! correctness and liveness outcomes of each.

pub mod authority;
#[path = "authority_http.rs"]
pub mod authority_http;
#[path = "authority_in_memory.rs"]
pub mod authority_in_memory;
pub mod chaos;
pub mod config;
pub mod error;
pub mod metrics;
pub mod optimistic;
pub mod orchestrator;
pub mod pessimistic;
pub mod store;
pub mod strategy;
pub mod topology;
pub mod types;
pub mod wait_die;

#[cfg(test)]
mod strategy_test;
