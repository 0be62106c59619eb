//! Fetching one page of the roster from the search API.

use crate::error::ClientError;
use advodir_core::{SearchRequest, SearchResponse};
use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::{Request, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::future::Future;

/// Anything that can turn a [`SearchRequest`] into a [`SearchResponse`].
pub trait Fetch: Send + Sync {
    fn fetch(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<SearchResponse, ClientError>> + Send;
}

/// Fetches pages from `GET {base}/api/advocates` over plain HTTP.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    base: String,
    client: Client<HttpConnector, Empty<Bytes>>,
}

impl HttpFetcher {
    /// `base` is scheme plus authority, e.g. `http://127.0.0.1:3000`.
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            base,
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Request URI for `request`. The search parameter is omitted when empty.
    pub fn uri_for(&self, request: &SearchRequest) -> Result<Uri, ClientError> {
        let mut uri = format!(
            "{}/api/advocates?page={}&pageSize={}",
            self.base,
            request.page(),
            request.page_size()
        );
        if !request.search().is_empty() {
            uri.push_str("&search=");
            uri.push_str(&urlencoding::encode(request.search()));
        }
        Ok(uri.parse()?)
    }
}

impl Fetch for HttpFetcher {
    #[tracing::instrument(name = "fetch", skip_all, fields(page = request.page()))]
    async fn fetch(&self, request: &SearchRequest) -> Result<SearchResponse, ClientError> {
        let uri = self.uri_for(request)?;
        let req = Request::get(uri)
            .header(hyper::header::ACCEPT, "application/json")
            .body(Empty::<Bytes>::new())?;

        let response = self.client.request(req).await?;
        let status = response.status();
        let body = response.into_body().collect().await?.to_bytes();

        if !status.is_success() {
            let message = serde_json::from_slice::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error")?.as_str().map(str::to_owned));
            tracing::debug!(%status, ?message, "roster request rejected");
            return Err(ClientError::Status { status, message });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}
