//! HTTP transport for the collection API.
//!
//! Requires the `http` feature. Uses reqwest.
//!
//! ## Example
//!
//! ```ignore
//! use herd_sync::{HttpRemote, RemoteConfig, SharedToken, WishlistSync};
//!
//! let session = SharedToken::new();
//! let remote = HttpRemote::new(&RemoteConfig::from_env()?)?.with_tokens(session.clone());
//! let wishlist = WishlistSync::new(remote);
//!
//! session.set(token_from_login);
//! wishlist.fetch_all().await?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, Response, Url};

use super::{
    rejection_message, AddRequest, NoToken, RemoteCollection, RemoteConfig, RemoteError,
    TokenProvider,
};
use crate::collection::{CollectionItem, ItemId};

/// Collection transport over the marketplace REST API.
#[derive(Clone)]
pub struct HttpRemote {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl HttpRemote {
    /// Build a client from config. Unauthenticated until
    /// [`with_tokens`](Self::with_tokens) is called.
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let client = builder
            .build()
            .map_err(|e| RemoteError::Transport(format!("failed to build http client: {}", e)))?;

        Ok(Self::with_client(client, config.base()))
    }

    /// Use an existing reqwest client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        HttpRemote {
            client,
            base_url,
            tokens: Arc::new(NoToken),
        }
    }

    pub fn with_tokens(mut self, tokens: impl TokenProvider + 'static) -> Self {
        self.tokens = Arc::new(tokens);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}/", self.base_url, collection)
    }

    /// `{base}/{collection}/{id}` with the id encoded as a single path segment.
    fn item_url(&self, collection: &str, item_id: &ItemId) -> Result<Url, RemoteError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            RemoteError::Transport(format!("invalid base url {}: {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                RemoteError::Transport(format!("base url {} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .push(collection)
            .push(item_id.as_str());
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send, mapping transport failures and non-2xx responses to errors.
    async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteError> {
        let response = self.authorize(request).send().await.map_err(|e| {
            debug!("request failed before a response arrived: {}", e);
            RemoteError::network()
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::rejected(
            status.as_u16(),
            rejection_message(status.as_u16(), &body),
        ))
    }
}

#[async_trait]
impl RemoteCollection for HttpRemote {
    async fn list(&self, collection: &str) -> Result<Vec<CollectionItem>, RemoteError> {
        let url = self.collection_url(collection);
        debug!("GET {}", url);
        let response = self.send(self.client.get(&url)).await?;
        response
            .json::<Vec<CollectionItem>>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn create(
        &self,
        collection: &str,
        request: &AddRequest,
    ) -> Result<CollectionItem, RemoteError> {
        let url = self.collection_url(collection);
        debug!("POST {} product_id={}", url, request.product_id);
        let response = self.send(self.client.post(&url).json(request)).await?;
        response
            .json::<CollectionItem>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn delete(&self, collection: &str, item_id: &ItemId) -> Result<(), RemoteError> {
        let url = self.item_url(collection, item_id)?;
        debug!("DELETE {}", url);
        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}
