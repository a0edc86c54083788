use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use governor::{Quota, RateLimiter};
use indicatif::ProgressBar;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::time::Instant;

use crate::paginator::{self, PageOutcome, Paginator, PaginatorConfig, PaginatorError};
use crate::utils;

#[derive(Clone, Debug)]
pub struct Options {
    pub origin: String,
    pub paths: Vec<String>,
    pub input_file: Option<String>,
    pub page_param: String,
    pub page_size_param: String,
    pub page_size: Option<u32>,
    pub max_pages: Option<u32>,
    pub rate: u32,
    pub concurrency: u32,
    pub timeout_seconds: usize,
    pub proxy: Option<String>,
    pub header: Option<String>,
    pub follow_redirects: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            origin: String::new(),
            paths: Vec::new(),
            input_file: None,
            page_param: paginator::DEFAULT_PAGE_PARAM.to_string(),
            page_size_param: paginator::DEFAULT_PAGE_SIZE_PARAM.to_string(),
            page_size: None,
            max_pages: None,
            rate: 100,
            concurrency: 4,
            timeout_seconds: paginator::DEFAULT_TIMEOUT_SECONDS,
            proxy: None,
            header: None,
            follow_redirects: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("no paths provided (paths and input_file are both empty)")]
    NoPaths,

    #[error("invalid rate {value}, expected positive integer")]
    InvalidRate { value: u32 },

    #[error("invalid concurrency {value}, expected positive integer")]
    InvalidConcurrency { value: u32 },

    #[error("invalid max_pages {value}, expected positive integer")]
    InvalidMaxPages { value: u32 },

    #[error("invalid page_size {value}, expected positive integer")]
    InvalidPageSize { value: u32 },

    #[error("invalid {kind} parameter name: {message}")]
    InvalidParamName { kind: &'static str, message: String },

    #[error("failed to open file for {kind}: {path}: {source}")]
    FileOpen {
        kind: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read lines for {kind}: {path}: {source}")]
    FileRead {
        kind: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Paginator(#[from] PaginatorError),
}

#[derive(Clone, Debug)]
pub struct PathResult {
    pub path: String,
    pub outcome: PageOutcome,
}

#[derive(Clone, Debug)]
pub struct CollectResult {
    pub started_at: Instant,
    pub elapsed: Duration,
    pub paths: Vec<PathResult>,
}

impl CollectResult {
    pub fn total_records(&self) -> usize {
        self.paths.iter().map(|p| p.outcome.records.len()).sum()
    }

    pub fn total_diagnostics(&self) -> usize {
        self.paths.iter().map(|p| p.outcome.diagnostics.len()).sum()
    }
}

#[derive(Clone)]
pub struct Runner {
    options: Options,
    progress: Option<ProgressBar>,
}

impl Runner {
    pub fn new(options: Options) -> Result<Self, RunnerError> {
        if options.paths.iter().all(|p| p.trim().is_empty()) && options.input_file.is_none() {
            return Err(RunnerError::NoPaths);
        }
        if options.rate == 0 {
            return Err(RunnerError::InvalidRate {
                value: options.rate,
            });
        }
        if options.concurrency == 0 {
            return Err(RunnerError::InvalidConcurrency {
                value: options.concurrency,
            });
        }
        if let Some(value) = options.max_pages.filter(|v| *v == 0) {
            return Err(RunnerError::InvalidMaxPages { value });
        }
        if let Some(value) = options.page_size.filter(|v| *v == 0) {
            return Err(RunnerError::InvalidPageSize { value });
        }
        utils::parse_query_param_name(&options.page_param)
            .map_err(|message| RunnerError::InvalidParamName {
                kind: "page",
                message,
            })?;
        utils::parse_query_param_name(&options.page_size_param).map_err(|message| {
            RunnerError::InvalidParamName {
                kind: "page size",
                message,
            }
        })?;
        paginator::parse_origin(&options.origin)?;
        Ok(Self {
            options,
            progress: None,
        })
    }

    pub fn with_progress(mut self, pb: ProgressBar) -> Self {
        self.progress = Some(pb);
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub async fn run(&self) -> Result<CollectResult, RunnerError> {
        let started_at = Instant::now();

        let paths = load_paths(&self.options.paths, self.options.input_file.as_deref()).await?;
        if paths.is_empty() {
            return Err(RunnerError::NoPaths);
        }

        let paginator = self.build_paginator()?;
        // resolve everything up front so a bad path fails before any traffic
        for path in paths.iter() {
            paginator.resolve(path)?;
        }

        if let Some(pb) = self.progress.as_ref() {
            pb.set_length(paths.len() as u64);
        }

        let concurrency = usize::try_from(self.options.concurrency).unwrap_or(1).max(1);
        let outcomes: Vec<Result<PathResult, PaginatorError>> = stream::iter(paths)
            .map(|path| {
                let paginator = paginator.clone();
                let pb = self.progress.clone();
                async move {
                    let outcome = paginator.collect_with_report(&path).await?;
                    tracing::info!(
                        path = %path,
                        records = outcome.records.len(),
                        pages = outcome.pages,
                        stop = %outcome.stop.label(),
                        "path collected"
                    );
                    if let Some(pb) = pb {
                        pb.inc(1);
                    }
                    Ok::<_, PaginatorError>(PathResult { path, outcome })
                }
            })
            .buffered(concurrency)
            .collect()
            .await;

        let paths = outcomes.into_iter().collect::<Result<Vec<_>, _>>()?;

        Ok(CollectResult {
            started_at,
            elapsed: started_at.elapsed(),
            paths,
        })
    }

    fn build_paginator(&self) -> Result<Paginator, RunnerError> {
        let config = PaginatorConfig {
            origin: self.options.origin.clone(),
            page_param: self.options.page_param.trim().to_string(),
            page_size_param: self.options.page_size_param.trim().to_string(),
            page_size: self.options.page_size,
            max_pages: self.options.max_pages,
            timeout_seconds: self.options.timeout_seconds,
            proxy: self.options.proxy.clone(),
            header: self.options.header.clone(),
            follow_redirects: self.options.follow_redirects,
        };
        let rate = NonZeroU32::new(self.options.rate).ok_or(RunnerError::InvalidRate {
            value: self.options.rate,
        })?;
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(rate)));
        Ok(Paginator::new(config)?.with_rate_limiter(limiter))
    }
}

pub(crate) async fn load_paths(
    paths: &[String],
    input_file: Option<&str>,
) -> Result<Vec<String>, RunnerError> {
    let mut out: Vec<String> = paths.to_vec();

    if let Some(input_file) = input_file {
        let handle = File::open(input_file)
            .await
            .map_err(|e| RunnerError::FileOpen {
                kind: "paths",
                path: input_file.to_string(),
                source: e,
            })?;
        let mut lines = BufReader::new(handle).lines();
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| RunnerError::FileRead {
                kind: "paths",
                path: input_file.to_string(),
                source: e,
            })?
        {
            out.push(line);
        }
    }

    Ok(utils::dedupe_paths(out))
}
