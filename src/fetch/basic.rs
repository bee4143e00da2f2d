use super::client::HttpClient;
use async_trait::async_trait;

const USER_AGENT: &str = concat!("whensthebus/", env!("CARGO_PKG_VERSION"));

/// Plain `reqwest` client with no request rewriting.
#[derive(Debug, Clone)]
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self(client))
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}
