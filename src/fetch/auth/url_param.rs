use crate::config::Credentials;
use crate::fetch::client::HttpClient;
use async_trait::async_trait;

/// An [`HttpClient`] wrapper that appends a query parameter to every request.
///
/// TransportAPI authenticates with two of these, `app_id` and `app_key`;
/// see [`with_app_credentials`].
#[derive(Debug, Clone)]
pub struct UrlParam<C> {
    pub inner: C,
    pub param_name: String,
    pub value: String,
}

impl<C> UrlParam<C> {
    pub fn new(inner: C, param_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            inner,
            param_name: param_name.into(),
            value: value.into(),
        }
    }
}

/// Wraps `inner` so each request carries `app_id` and `app_key`.
pub fn with_app_credentials<C: HttpClient>(
    inner: C,
    credentials: &Credentials,
) -> UrlParam<UrlParam<C>> {
    UrlParam::new(
        UrlParam::new(inner, "app_id", credentials.app_id()),
        "app_key",
        credentials.app_key(),
    )
}

#[async_trait]
impl<C: HttpClient> HttpClient for UrlParam<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.url_mut()
            .query_pairs_mut()
            .append_pair(&self.param_name, &self.value);
        self.inner.execute(req).await
    }
}

