use std::error::Error as StdError;
use std::fmt;

#[derive(Debug)]
pub struct CmsError {
    pub message: String,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl CmsError {
    pub fn new(message: &str) -> Self {
        CmsError {
            message: message.to_string(),
            source: None,
        }
    }

    /// Non-2xx response from an endpoint.
    pub fn status(url: &str, status: u16) -> Self {
        CmsError::new(&format!("{} answered with HTTP {}", url, status))
    }

    /// Body parsed, but not in the shape the caller needs.
    pub fn unexpected_shape(url: &str) -> Self {
        CmsError::new(&format!("{} returned no usable data", url))
    }

    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }
}

impl fmt::Display for CmsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CmsError: {}", self.message)
    }
}

// Any std error converts, so `?` works on reqwest, serde_json and io errors alike.
impl<E: StdError + Send + Sync + 'static> From<E> for CmsError {
    fn from(err: E) -> Self {
        CmsError {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_source_of_converted_errors() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CmsError = parse_err.into();
        assert!(err.source_error().is_some());
        assert!(err.to_string().starts_with("CmsError: "));
    }

    #[test]
    fn status_error_names_url_and_code() {
        let err = CmsError::status("http://cms/pages", 503);
        assert_eq!(err.message, "http://cms/pages answered with HTTP 503");
        assert!(err.source_error().is_none());
    }
}
