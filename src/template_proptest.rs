//! Property-based tests for templates and repository situations.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.
