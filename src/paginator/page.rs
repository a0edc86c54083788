use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

// the body of one successful page; anything besides `data` is ignored
#[derive(Clone, Debug, Deserialize)]
pub struct PageResponse {
    pub data: Vec<Value>,
}

#[derive(Debug, Error)]
pub(in crate::paginator) enum PageError {
    #[error("failed to read response body: {source}")]
    Body {
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid page body: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },
}

impl PageError {
    pub(in crate::paginator) fn kind(&self) -> super::DiagnosticKind {
        match self {
            PageError::Body { .. } => super::DiagnosticKind::Body,
            PageError::Decode { .. } => super::DiagnosticKind::Decode,
        }
    }
}

pub(in crate::paginator) fn decode_page(body: &[u8]) -> Result<Vec<Value>, PageError> {
    serde_json::from_slice::<PageResponse>(body)
        .map(|page| page.data)
        .map_err(|e| PageError::Decode { source: e })
}

// reads the whole body before decoding so a truncated transfer and a
// malformed document are reported separately
pub(in crate::paginator) async fn read_page(
    response: reqwest::Response,
) -> Result<Vec<Value>, PageError> {
    let body = response
        .bytes()
        .await
        .map_err(|e| PageError::Body { source: e })?;
    decode_page(&body)
}
