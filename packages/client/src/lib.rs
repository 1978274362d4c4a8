//! Interactive CLI client for the realtime channel/presence relay.

mod command;
mod domain;
pub mod error;
mod formatter;
mod runner;
mod session;
mod ui;

pub use runner::{ClientOptions, run_client};
