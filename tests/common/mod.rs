#![allow(dead_code)] // Different tests use different parts.

use candlepin_testkit::config::Config;
use candlepin_testkit::test::MemoryCandlepin;

/// Initializes logging for a test run; repeated calls are no-ops.
pub fn init_logging() {
    let _ = stderrlog::new().verbosity(3).init();
}

/// A fresh in-memory service with a client for its admin user.
pub fn admin_client() -> MemoryCandlepin {
    init_logging();
    MemoryCandlepin::admin(&Config::test())
}
