//! Error model shared by the registry crates.
//!
//! Errors leave the service as RFC 9457 Problem Details (`Problem`). Domain
//! crates convert their own error enums into `Problem` at the REST boundary.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod problem;

pub use problem::{APPLICATION_PROBLEM_JSON, Problem};

/// Attach the request path and the current trace id to a `Problem`.
pub fn finalize(mut p: Problem, instance: &str, trace_id: Option<String>) -> Problem {
    p = p.with_instance(instance);
    if let Some(tid) = trace_id {
        p = p.with_trace_id(tid);
    }
    p
}
