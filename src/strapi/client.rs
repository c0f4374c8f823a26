//! Strapi REST client
//!
//! Thin wrapper over reqwest that knows the Strapi addressing rules: list
//! endpoints take filter queries, single-record paths take a `documentId`,
//! and the users-permissions `users` endpoint returns a bare array.

use std::time::Duration;

use reqwest::header::CACHE_CONTROL;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::config::StrapiConfig;
use crate::utils::errors::{HubError, Result, StrapiError};
use crate::utils::logging::log_api_error;

use super::query::Query;
use super::response::{CollectionResponse, ErrorResponse, Identity, Payload, SingleResponse};

/// Collection path of the users-permissions plugin
pub const USERS_COLLECTION: &str = "users";

/// HTTP client for a Strapi instance
#[derive(Clone, Debug)]
pub struct StrapiClient {
    client: Client,
    api_base: Url,
    health_url: Url,
    api_token: Option<String>,
    page_size: u32,
}

impl StrapiClient {
    /// Create a new StrapiClient instance
    pub fn new(config: &StrapiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("InstructorHub/1.0")
            .build()
            .map_err(HubError::Http)?;

        let base = Url::parse(&config.base_url)?;
        let mut api_base = base.clone();
        {
            let mut segments = api_base
                .path_segments_mut()
                .map_err(|_| HubError::Config(format!("Strapi base URL cannot be a base: {}", config.base_url)))?;
            segments.pop_if_empty();
            for segment in config.api_prefix.split('/').filter(|s| !s.is_empty()) {
                segments.push(segment);
            }
        }

        let mut health_url = base;
        health_url
            .path_segments_mut()
            .map_err(|_| HubError::Config(format!("Strapi base URL cannot be a base: {}", config.base_url)))?
            .pop_if_empty()
            .push("_health");

        Ok(Self {
            client,
            api_base,
            health_url,
            api_token: config.api_token.clone(),
            page_size: config.page_size,
        })
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// `{base}{prefix}/{collection}[/{document_id}]`
    pub fn collection_url(&self, collection: &str, document_id: Option<&str>) -> Result<Url> {
        let mut url = self.api_base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| HubError::Config("Strapi API URL cannot be a base".to_string()))?;
            segments.push(collection);
            if let Some(document_id) = document_id {
                segments.push(document_id);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url).header(CACHE_CONTROL, "no-cache");
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and turn non-2xx answers into errors
    async fn send(&self, builder: RequestBuilder, context: &str) -> Result<Response> {
        let response = builder.send().await.map_err(StrapiError::from)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);

        if status == StatusCode::NOT_FOUND {
            debug!(context = context, "Strapi resource not found");
            return Err(StrapiError::NotFound(context.to_string()).into());
        }

        log_api_error("strapi", &format!("HTTP {}: {}", status, message), Some(context));
        Err(StrapiError::Status {
            status: status.as_u16(),
            body: message,
        }
        .into())
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| StrapiError::InvalidResponse(e.to_string()).into())
    }

    /// Fetch one page of a collection
    pub async fn find_page<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &Query,
        page: u32,
        page_size: u32,
    ) -> Result<CollectionResponse<T>> {
        let url = self.collection_url(collection, None)?;
        debug!(collection = collection, page = page, page_size = page_size, "Querying Strapi collection");

        let builder = self
            .request(Method::GET, url)
            .query(&query.paged_pairs(page, page_size));
        let response = self.send(builder, collection).await?;
        Self::decode(response).await
    }

    /// First page of matches at the configured page size
    pub async fn find<T: DeserializeOwned>(&self, collection: &str, query: &Query) -> Result<Vec<T>> {
        Ok(self.find_page(collection, query, 1, self.page_size).await?.data)
    }

    /// Every match, following pagination until the last page
    pub async fn find_all<T: DeserializeOwned>(&self, collection: &str, query: &Query) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let response = self.find_page::<T>(collection, query, page, self.page_size).await?;
            let has_more = response.has_more() && !response.data.is_empty();
            items.extend(response.data);
            if !has_more {
                break;
            }
            page += 1;
        }

        debug!(collection = collection, pages = page, count = items.len(), "Fetched full collection scan");
        Ok(items)
    }

    /// Number of matches as reported by the pagination meta
    pub async fn count(&self, collection: &str, query: &Query) -> Result<u64> {
        Ok(self.find_page::<Identity>(collection, query, 1, 1).await?.total())
    }

    /// Path lookup by documentId; a 404 is `Ok(None)`
    pub async fn find_one<T: DeserializeOwned>(
        &self,
        collection: &str,
        document_id: &str,
        query: &Query,
    ) -> Result<Option<T>> {
        let url = self.collection_url(collection, Some(document_id))?;
        debug!(collection = collection, document_id = document_id, "Fetching Strapi record");

        let builder = self.request(Method::GET, url).query(&query.pairs());
        match self.send(builder, collection).await {
            Ok(response) => Ok(Self::decode::<SingleResponse<T>>(response).await?.data),
            Err(HubError::Strapi(StrapiError::NotFound(_))) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// POST a new record
    pub async fn create<B: Serialize, T: DeserializeOwned>(
        &self,
        collection: &str,
        body: &B,
        query: &Query,
    ) -> Result<T> {
        let url = self.collection_url(collection, None)?;
        debug!(collection = collection, "Creating Strapi record");

        let builder = self
            .request(Method::POST, url)
            .query(&query.pairs())
            .json(&Payload { data: body });
        let response = self.send(builder, collection).await?;
        Self::decode::<SingleResponse<T>>(response)
            .await?
            .data
            .ok_or_else(|| StrapiError::InvalidResponse(format!("empty create response from {}", collection)).into())
    }

    /// PUT changes to an existing record
    pub async fn update<B: Serialize, T: DeserializeOwned>(
        &self,
        collection: &str,
        document_id: &str,
        body: &B,
        query: &Query,
    ) -> Result<T> {
        let url = self.collection_url(collection, Some(document_id))?;
        debug!(collection = collection, document_id = document_id, "Updating Strapi record");

        let builder = self
            .request(Method::PUT, url)
            .query(&query.pairs())
            .json(&Payload { data: body });
        let response = self.send(builder, collection).await?;
        Self::decode::<SingleResponse<T>>(response)
            .await?
            .data
            .ok_or_else(|| StrapiError::InvalidResponse(format!("empty update response from {}", collection)).into())
    }

    /// DELETE a record
    pub async fn delete(&self, collection: &str, document_id: &str) -> Result<()> {
        let url = self.collection_url(collection, Some(document_id))?;
        debug!(collection = collection, document_id = document_id, "Deleting Strapi record");

        self.send(self.request(Method::DELETE, url), collection).await?;
        Ok(())
    }

    /// Query the users-permissions endpoint, which answers with a bare array
    pub async fn find_users<T: DeserializeOwned>(&self, query: &Query) -> Result<Vec<T>> {
        let url = self.collection_url(USERS_COLLECTION, None)?;
        debug!("Querying Strapi users");

        let builder = self.request(Method::GET, url).query(&query.pairs());
        let response = self.send(builder, USERS_COLLECTION).await?;
        Self::decode(response).await
    }

    /// Probe the Strapi health endpoint
    pub async fn health_check(&self) -> Result<bool> {
        let response = self
            .request(Method::GET, self.health_url.clone())
            .send()
            .await
            .map_err(StrapiError::from)?;
        Ok(response.status().is_success())
    }
}
