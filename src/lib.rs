//! Provisioning-sequence composer for virtual machines.
//!
//! Given a machine's settings, resolves each requested package, repository
//! and script to the most specific handler available (project scripts,
//! plugin units, built-in units and scripts) and assembles the resulting
//! actions into one ordered shell sequence for the guest's package manager.
//!
//! The public API is organised into these layers:
//!
//! - **[`config`]**: load machine settings and describe the project layout
//! - **[`command`]**: OS-family command builders and the action sequence
//! - **[`resolve`]**: the override search and the handler registry
//! - **[`provision`]**: the per-machine orchestrator and the full pass
//! - **[`units`]**: built-in package units
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod command;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod operations;
pub mod platform;
pub mod provision;
pub mod resolve;
pub mod units;
