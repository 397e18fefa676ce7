//! Fixtures for façade integration tests.

use crate::test_helpers::store::Harness;
use rstest::fixture;

/// A façade whose store is reachable.
#[fixture]
pub fn online() -> Harness {
    Harness::new(true)
}

/// A façade whose store is down.
#[fixture]
pub fn offline() -> Harness {
    Harness::new(false)
}
