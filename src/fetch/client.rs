use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes HTTP requests; wrapped so tests and decorators can stand in.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
