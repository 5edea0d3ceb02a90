//! Ordered endpoint probing.
//!
//! Candidates are tried one after another; the first response whose body
//! passes the acceptance check wins. A failing candidate never stops the
//! ones after it, and running out of candidates is not an error.

use std::time::Duration;

use serde_json::Value;

use crate::http::client::{JsonResponse, JsonSource};

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub url: String,
    pub timeout: Option<Duration>,
}

impl Candidate {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Self {
        Candidate {
            url: url.into(),
            timeout,
        }
    }

    /// Same timeout for every url, order preserved.
    pub fn list(urls: Vec<String>, timeout: Option<Duration>) -> Vec<Candidate> {
        urls.into_iter()
            .map(|url| Candidate::new(url, timeout))
            .collect()
    }
}

pub fn is_non_empty_array(body: &Value) -> bool {
    body.as_array().is_some_and(|items| !items.is_empty())
}

/// Returns the first candidate response accepted by `accept`, or `None`.
pub async fn first_success<S, F>(
    source: &S,
    candidates: &[Candidate],
    accept: F,
) -> Option<JsonResponse>
where
    S: JsonSource + ?Sized,
    F: Fn(&Value) -> bool,
{
    for candidate in candidates {
        match source.get_json(&candidate.url, candidate.timeout).await {
            Ok(response) if accept(&response.body) => {
                log::info!("using endpoint {}", candidate.url);
                return Some(response);
            }
            Ok(_) => log::warn!("endpoint {} returned no usable data", candidate.url),
            Err(err) => log::warn!("endpoint {} failed: {}", candidate.url, err),
        }
    }
    None
}
