pub mod dto;
pub mod memory;

use std::env;
use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};

use crate::api::TOTAL_COUNT_HEADER;
use crate::error::{AppError, ErrorResponse};
use crate::models::{Entity, PageRequest};

pub use dto::Page;
pub use memory::MemoryEntityApi;

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_token: Option<String>,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn new_from_env() -> Result<Self, AppError> {
        let base_url = env::var("APE_API_URL")
            .map_err(|_| AppError::Config("APE_API_URL is not set".to_string()))?;
        let config = Self::new(base_url);

        Ok(match env::var("APE_API_TOKEN") {
            Ok(token) if !token.is_empty() => config.with_token(token),
            _ => config,
        })
    }
}

/// Data access for one entity type, keyed by its REST resource.
#[async_trait]
pub trait EntityApi<E: Entity>: Send + Sync {
    async fn fetch_all(&self, page: &PageRequest) -> Result<Page<E>, AppError>;
    async fn fetch(&self, id: i64) -> Result<E, AppError>;
    async fn create(&self, entity: &E) -> Result<E, AppError>;
    async fn update(&self, entity: &E) -> Result<E, AppError>;
    /// Returns the id that was deleted.
    async fn delete(&self, id: i64) -> Result<i64, AppError>;
}

pub struct HttpEntityApi<E> {
    client: Client,
    config: ApiConfig,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> HttpEntityApi<E> {
    pub fn new(config: ApiConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self::with_client(client, config))
    }

    /// Shares one connection pool across the per-entity clients.
    pub fn with_client(client: Client, config: ApiConfig) -> Self {
        Self {
            client,
            config,
            _entity: PhantomData,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/api/{}", self.config.base_url, E::RESOURCE)
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/{}", self.collection_url(), id)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AppError> {
        let response = self.authorize(request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            tracing::warn!("{} API error {}: {}", E::NAME, status, message);
            return Err(AppError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    fn require_id(entity: &E) -> Result<i64, AppError> {
        entity
            .id()
            .ok_or_else(|| AppError::BadRequest(format!("{} has no id", E::NAME)))
    }
}

#[async_trait]
impl<E: Entity> EntityApi<E> for HttpEntityApi<E> {
    async fn fetch_all(&self, page: &PageRequest) -> Result<Page<E>, AppError> {
        let url = self.collection_url();
        tracing::debug!("GET {} {:?}", url, page);

        let response = self.send(self.client.get(&url).query(page)).await?;
        let total = response
            .headers()
            .get(TOTAL_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let items = response.json::<Vec<E>>().await?;

        Ok(Page::new(items, total))
    }

    async fn fetch(&self, id: i64) -> Result<E, AppError> {
        let url = self.item_url(id);
        tracing::debug!("GET {}", url);

        let response = self.send(self.client.get(&url)).await?;
        Ok(response.json::<E>().await?)
    }

    async fn create(&self, entity: &E) -> Result<E, AppError> {
        let url = self.collection_url();
        tracing::debug!("POST {}", url);

        let response = self.send(self.client.post(&url).json(entity)).await?;
        Ok(response.json::<E>().await?)
    }

    async fn update(&self, entity: &E) -> Result<E, AppError> {
        let url = self.item_url(Self::require_id(entity)?);
        tracing::debug!("PUT {}", url);

        let response = self.send(self.client.put(&url).json(entity)).await?;
        Ok(response.json::<E>().await?)
    }

    async fn delete(&self, id: i64) -> Result<i64, AppError> {
        let url = self.item_url(id);
        tracing::debug!("DELETE {}", url);

        self.send(self.client.delete(&url)).await?;
        Ok(id)
    }
}
