//! Shared test framework for benchmark-case
//!
//! Scripted invokers, recording collectors and a fixture builder that runs a
//! benchmark against a manual clock so timings are exact.

pub mod fixture;

#[allow(unused_imports)]
pub use fixture::*;
