// src/lib.rs

#[macro_use]
pub mod log;

pub mod card;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod extract;
pub mod merge;
pub mod progress;
pub mod report;
pub mod runner;
pub mod scrape;
pub mod snapshot;
pub mod specs;
pub mod store;
