use http::Extensions;
use reqwest::header::{CACHE_CONTROL, HeaderValue, PRAGMA};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};

/// Asks every proxy and the CMS page cache for a fresh answer.
pub struct NoCacheMiddleware;

#[async_trait::async_trait]
impl Middleware for NoCacheMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let headers = req.headers_mut();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        next.run(req, extensions).await
    }
}
