// src/cli/mod.rs
pub mod cli;
mod run;
mod run_crawl_single;
mod run_enrich;
mod run_export;
mod show_database_stats;
