//! Command implementations for the distpack CLI.
//!
//! - [`build`] - run the build pipeline
//! - [`plan`] - print the expected outputs

pub mod build;
pub mod plan;
pub mod utils;

pub use build::execute as build_execute;
pub use plan::execute as plan_execute;
