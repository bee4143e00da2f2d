use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes prepared requests. Decorators such as [`super::auth::UrlParam`]
/// wrap another `HttpClient` to alter requests on their way out.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
