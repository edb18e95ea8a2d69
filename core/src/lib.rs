//! Root of the `launchpad-core` library.
//!
//! Turns a possibly-empty mounted directory into a running Node application:
//! resolve the project, scaffold one if none exists, install dependencies
//! once, then exec the project's `dev` or `start` script in place of the
//! launcher. See [`startup::Startup`] for the sequence.

// All user-visible output goes through tracing; stdout belongs to the
// application that eventually replaces this process.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod bootstrap;
pub mod config;
pub mod descriptor;
pub mod entry;
pub mod error;
pub mod idle;
pub mod installer;
pub mod process;
pub mod resolver;
pub mod startup;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use config::{LaunchConfig, PackageManager};
pub use error::{LaunchError, Result};
pub use startup::{IdleReason, Outcome, Startup, StartupPlan};
