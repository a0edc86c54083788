pub mod app;
pub mod cli;
pub mod config;
pub mod output;
pub mod paginator;
pub mod runner;
pub mod utils;

pub use paginator::{PageOutcome, Paginator, PaginatorConfig, PaginatorError};
pub use runner::{CollectResult, Options, PathResult, Runner, RunnerError};

#[cfg(test)]
mod tests;
