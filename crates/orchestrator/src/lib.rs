//! The `drivethru` binary: wires the nine pipeline components behind one
//! `process_turn` entry point and exposes it over a small CLI.

pub mod adapters;
pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod runtime;
pub mod state;
pub mod turn;
