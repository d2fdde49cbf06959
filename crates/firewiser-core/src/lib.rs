//! Core types and definitions for the FIREWISER incident map.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, commands, scenario configuration, snapshots, events, the
//! rendering-surface contract, and constants.
//! It has no dependency on any runtime, map SDK, or network stack.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod events;
pub mod render;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
