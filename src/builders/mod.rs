//! Builders that assemble components from configuration.

pub mod manager_builder;

pub use manager_builder::{build_detector, build_manager, build_manager_with_detector};
