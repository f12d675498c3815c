//! End-to-end tests for a running foodservice instance.
//! Enable with `--features system_tests` and point FOODSERVICE_URL at the
//! server under test (default http://127.0.0.1:5000).

#[cfg(all(test, feature = "system_tests"))]
mod system_tests;
