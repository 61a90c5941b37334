//! End-to-end test suite for the airdrop pipeline.
//!
//! Tests drive `airdrop_core::run` against real files in temporary
//! directories and read the written artifacts back.

pub mod helpers;
