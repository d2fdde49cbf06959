//! FIREWISER headless incident-map driver.
//!
//! Wires the map session, the async services and a command-line front end
//! together. The session runs on its own loop thread; everything that talks
//! to the network runs on the tokio runtime.

pub mod cli;
pub mod game_loop;
pub mod state;

pub use firewiser_core as core;
