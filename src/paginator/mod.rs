pub mod page;

use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::RateLimiter;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::utils;

pub use page::PageResponse;

pub const DEFAULT_PAGE_PARAM: &str = "page";
pub const DEFAULT_PAGE_SIZE_PARAM: &str = "page_size";
pub const DEFAULT_TIMEOUT_SECONDS: usize = 10;

pub type PageRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

#[derive(Clone, Debug)]
pub struct PaginatorConfig {
    pub origin: String,
    pub page_param: String,
    pub page_size_param: String,
    pub page_size: Option<u32>,
    pub max_pages: Option<u32>,
    pub timeout_seconds: usize,
    pub proxy: Option<String>,
    pub header: Option<String>,
    pub follow_redirects: bool,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            origin: String::new(),
            page_param: DEFAULT_PAGE_PARAM.to_string(),
            page_size_param: DEFAULT_PAGE_SIZE_PARAM.to_string(),
            page_size: None,
            max_pages: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            proxy: None,
            header: None,
            follow_redirects: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum PaginatorError {
    #[error("invalid origin: {origin}")]
    InvalidOrigin { origin: String },

    #[error("cannot resolve path '{path}' against {origin}: {source}")]
    InvalidPath {
        origin: String,
        path: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid header '{header}': {message}")]
    InvalidHeader { header: String, message: String },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    // the request never produced response headers
    Transport,
    Body,
    Decode,
}

impl DiagnosticKind {
    pub fn label(self) -> &'static str {
        match self {
            DiagnosticKind::Transport => "transport",
            DiagnosticKind::Body => "body",
            DiagnosticKind::Decode => "decode",
        }
    }
}

#[derive(Clone, Debug)]
pub struct PageDiagnostic {
    pub page: u32,
    pub url: String,
    pub kind: DiagnosticKind,
    pub message: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StopReason {
    // any status outside 200-299
    Status(u16),
    Transport,
    MaxPages,
    #[default]
    Unstarted,
}

impl StopReason {
    pub fn label(&self) -> String {
        match self {
            StopReason::Status(status) => format!("status {status}"),
            StopReason::Transport => "transport error".to_string(),
            StopReason::MaxPages => "page limit".to_string(),
            StopReason::Unstarted => "not started".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PageOutcome {
    pub url: String,
    pub records: Vec<Value>,
    // successful responses, including ones whose body was dropped
    pub pages: u32,
    pub stop: StopReason,
    pub diagnostics: Vec<PageDiagnostic>,
}

impl PageOutcome {
    fn new(url: &Url) -> Self {
        Self {
            url: url.to_string(),
            ..Self::default()
        }
    }

    fn record_diagnostic(&mut self, page: u32, url: &Url, kind: DiagnosticKind, message: String) {
        tracing::warn!(page, url = %url, kind = kind.label(), error = %message, "page dropped");
        self.diagnostics.push(PageDiagnostic {
            page,
            url: url.to_string(),
            kind,
            message,
        });
    }
}

pub fn parse_origin(origin: &str) -> Result<Url, PaginatorError> {
    let trimmed = origin.trim();
    let url = Url::parse(trimmed).map_err(|_| PaginatorError::InvalidOrigin {
        origin: trimmed.to_string(),
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(PaginatorError::InvalidOrigin {
            origin: trimmed.to_string(),
        });
    }
    Ok(url)
}

pub fn resolve_path(origin: &Url, path: &str) -> Result<Url, PaginatorError> {
    origin
        .join(path.trim())
        .map_err(|e| PaginatorError::InvalidPath {
            origin: origin.to_string(),
            path: path.to_string(),
            source: e,
        })
}

// setting a parameter replaces its first occurrence and drops later
// duplicates, other pairs keep their order
pub fn page_url(base: &Url, page_param: &str, page: u32, page_size: Option<(&str, u32)>) -> Url {
    let mut pairs: Vec<(String, String)> = base
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    set_query_pair(&mut pairs, page_param, &page.to_string());
    if let Some((name, size)) = page_size {
        set_query_pair(&mut pairs, name, &size.to_string());
    }

    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    url
}

fn set_query_pair(pairs: &mut Vec<(String, String)>, name: &str, value: &str) {
    let mut seen = false;
    pairs.retain_mut(|(k, v)| {
        if k.as_str() != name {
            return true;
        }
        if seen {
            return false;
        }
        seen = true;
        *v = value.to_string();
        true
    });
    if !seen {
        pairs.push((name.to_string(), value.to_string()));
    }
}

fn build_client(config: &PaginatorConfig) -> Result<reqwest::Client, PaginatorError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(concat!(
            "pagecollect/",
            env!("CARGO_PKG_VERSION")
        )),
    );
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );
    if let Some(raw) = config.header.as_deref().filter(|h| !h.trim().is_empty()) {
        let (name, value) =
            utils::parse_header(raw).map_err(|message| PaginatorError::InvalidHeader {
                header: raw.to_string(),
                message,
            })?;
        headers.insert(name, value);
    }

    let redirect_policy = if config.follow_redirects {
        reqwest::redirect::Policy::limited(10)
    } else {
        reqwest::redirect::Policy::none()
    };

    let timeout = Duration::from_secs(
        config
            .timeout_seconds
            .try_into()
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS as u64),
    );
    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .redirect(redirect_policy)
        .timeout(timeout);

    if let Some(proxy) = config.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| PaginatorError::ProxySetup {
            proxy: proxy.to_string(),
            source: e,
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| PaginatorError::HttpClientBuild { source: e })
}

// each collect call owns its accumulator; page n + 1 is only requested once
// page n has been read, decoded and appended
#[derive(Clone)]
pub struct Paginator {
    client: reqwest::Client,
    origin: Url,
    page_param: String,
    page_size_param: String,
    page_size: Option<u32>,
    max_pages: Option<u32>,
    limiter: Option<Arc<PageRateLimiter>>,
}

impl Paginator {
    pub fn new(config: PaginatorConfig) -> Result<Self, PaginatorError> {
        let origin = parse_origin(&config.origin)?;
        let client = build_client(&config)?;
        Ok(Self {
            client,
            origin,
            page_param: config.page_param,
            page_size_param: config.page_size_param,
            page_size: config.page_size,
            max_pages: config.max_pages,
            limiter: None,
        })
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<PageRateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn resolve(&self, path: &str) -> Result<Url, PaginatorError> {
        resolve_path(&self.origin, path)
    }

    pub async fn collect(&self, path: &str) -> Result<Vec<Value>, PaginatorError> {
        Ok(self.collect_with_report(path).await?.records)
    }

    // records that do not fit `T` are logged and skipped
    pub async fn collect_as<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<T>, PaginatorError> {
        let outcome = self.collect_with_report(path).await?;
        let mut out = Vec::with_capacity(outcome.records.len());
        for (index, record) in outcome.records.into_iter().enumerate() {
            match serde_json::from_value::<T>(record) {
                Ok(value) => out.push(value),
                Err(e) => {
                    tracing::warn!(
                        url = %outcome.url,
                        index,
                        kind = "record",
                        error = %e,
                        "record skipped"
                    );
                }
            }
        }
        Ok(out)
    }

    pub async fn collect_with_report(&self, path: &str) -> Result<PageOutcome, PaginatorError> {
        let base = self.resolve(path)?;
        let page_size = self
            .page_size
            .map(|size| (self.page_size_param.as_str(), size));
        let mut outcome = PageOutcome::new(&base);
        let mut page: u32 = 1;

        loop {
            if self.max_pages.is_some_and(|max| page > max) {
                tracing::warn!(path, pages = outcome.pages, "page limit reached");
                outcome.stop = StopReason::MaxPages;
                break;
            }

            let url = page_url(&base, &self.page_param, page, page_size);
            if let Some(limiter) = self.limiter.as_ref() {
                limiter.until_ready().await;
            }

            tracing::debug!(path, page, url = %url, "requesting page");
            let response = match self.client.get(url.clone()).send().await {
                Ok(response) => response,
                Err(e) => {
                    outcome.record_diagnostic(page, &url, DiagnosticKind::Transport, e.to_string());
                    outcome.stop = StopReason::Transport;
                    break;
                }
            };

            let status = response.status();
            if !status.is_success() {
                tracing::debug!(path, page, status = status.as_u16(), "end of pages");
                outcome.stop = StopReason::Status(status.as_u16());
                break;
            }
            outcome.pages += 1;

            match page::read_page(response).await {
                Ok(records) => {
                    tracing::debug!(path, page, records = records.len(), "page appended");
                    outcome.records.extend(records);
                }
                Err(e) => outcome.record_diagnostic(page, &url, e.kind(), e.to_string()),
            }

            page = match page.checked_add(1) {
                Some(next) => next,
                None => {
                    outcome.stop = StopReason::MaxPages;
                    break;
                }
            };
        }

        Ok(outcome)
    }
}
