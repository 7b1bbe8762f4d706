//! Unit tests for individual components

mod breaker_test;
mod builders_test;
mod cache_test;
mod config_test;
mod error_test;
mod events_test;
mod runtime_test;
mod util_test;
