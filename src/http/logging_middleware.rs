use std::time::Instant;

use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};

pub struct LoggingMiddleware;

#[async_trait::async_trait]
impl Middleware for LoggingMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let method = req.method().clone();
        let url = req.url().to_string();
        let started = Instant::now();
        log::debug!("{} {}", method, url);

        let result = next.run(req, extensions).await;
        let elapsed = started.elapsed().as_millis();
        match &result {
            Ok(response) if response.status().is_success() => {
                log::debug!("{} {} -> {} ({} ms)", method, url, response.status(), elapsed);
            }
            Ok(response) => {
                log::warn!("{} {} -> {} ({} ms)", method, url, response.status(), elapsed);
            }
            Err(err) => {
                log::warn!("{} {} failed after {} ms: {}", method, url, elapsed, err);
            }
        }
        result
    }
}
