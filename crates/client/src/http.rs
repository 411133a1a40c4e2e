//! `reqwest`-backed implementation of the API traits.

use reqwest::{Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use parcelhub_auth::{IdentityPayload, Session, UpdateUser, User};
use parcelhub_core::{ParcelId, TrackingId, UserId};
use parcelhub_parcels::{MyParcels, Parcel, ParcelRequest};

use crate::dto::ErrorBody;
use crate::{
    ApiError, ApiResponse, CacheTag, ClientConfig, IdentityApi, PageQuery, Paginated,
    PaginationMeta, ParcelApi, QueryCache, UpdateParcelPayload, UserApi,
};

const IDENTITY_PATH: &str = "/user/me";
const MY_PARCELS_PATH: &str = "/parcels/me";
const PARCELS_PATH: &str = "/parcels";
const USERS_PATH: &str = "/user/all-users";

/// HTTP client with a cookie store, optional bearer token and query cache.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    config: ClientConfig,
    cache: QueryCache,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            config,
            cache: QueryCache::new(),
        })
    }

    pub fn from_env() -> Result<Self, ApiError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.authorized(self.http.request(method, self.config.url(path)))
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.trim().is_empty());
            tracing::debug!(status = status.as_u16(), ?message, "api request failed");
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn data<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        let envelope: ApiResponse<T> = self.send(req).await?;
        Ok(envelope.data)
    }

    async fn cached_data<T>(&self, path: &str, tag: CacheTag) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Serialize + Send,
    {
        if let Some(hit) = self.cache.get::<T>(path).await {
            tracing::debug!(path, "served from cache");
            return Ok(hit);
        }
        let value: T = self.data(self.request(Method::GET, path)).await?;
        self.cache.put(path, tag, &value).await;
        Ok(value)
    }

    async fn paginated<T>(
        &self,
        path: &str,
        page: PageQuery,
        tag: CacheTag,
    ) -> Result<Paginated<T>, ApiError>
    where
        T: DeserializeOwned + Serialize + Send,
    {
        let key = page.cache_key(path);
        if let Some(hit) = self.cache.get::<Paginated<T>>(&key).await {
            tracing::debug!(key, "served from cache");
            return Ok(hit);
        }

        let req = self
            .request(Method::GET, path)
            .query(&[("page", page.page), ("limit", page.limit)]);
        let envelope: ApiResponse<Vec<T>> = self.send(req).await?;
        let meta = match envelope.meta {
            Some(meta) => meta.completed(page),
            None => PaginationMeta::new(envelope.data.len() as u64, page),
        };

        let result = Paginated {
            data: envelope.data,
            meta,
        };
        self.cache.put(key, tag, &result).await;
        Ok(result)
    }

    /// Send a mutation; on success every query under `tag` is dropped.
    async fn mutate<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        tag: CacheTag,
    ) -> Result<T, ApiError> {
        match self.data(req).await {
            Ok(value) => {
                self.cache.invalidate(tag).await;
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(error = %err, ?tag, "mutation failed");
                Err(err)
            }
        }
    }
}

#[async_trait::async_trait]
impl IdentityApi for HttpClient {
    async fn current_session(&self) -> Result<Session, ApiError> {
        let payload: IdentityPayload = self.send(self.request(Method::GET, IDENTITY_PATH)).await?;
        Ok(Session::from_payload(payload))
    }
}

#[async_trait::async_trait]
impl ParcelApi for HttpClient {
    async fn send_parcel(&self, request: &ParcelRequest) -> Result<Parcel, ApiError> {
        request.validate()?;
        let req = self
            .request(Method::POST, PARCELS_PATH)
            .json(&request.normalized());
        self.mutate(req, CacheTag::Parcels).await
    }

    async fn track_parcel(&self, tracking_id: &TrackingId) -> Result<Parcel, ApiError> {
        let mut url = Url::parse(&self.config.url(PARCELS_PATH))
            .map_err(|e| ApiError::Config(format!("invalid API URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Config("API URL cannot carry a path".to_string()))?
            .push("track")
            .push(tracking_id.as_str());
        self.data(self.authorized(self.http.request(Method::GET, url))).await
    }

    async fn my_parcels(&self) -> Result<MyParcels, ApiError> {
        self.cached_data(MY_PARCELS_PATH, CacheTag::Parcels).await
    }

    async fn all_parcels(&self, page: PageQuery) -> Result<Paginated<Parcel>, ApiError> {
        self.paginated(PARCELS_PATH, page, CacheTag::Parcels).await
    }

    async fn update_parcel(
        &self,
        parcel_id: &ParcelId,
        payload: &UpdateParcelPayload,
    ) -> Result<Parcel, ApiError> {
        let path = format!("{PARCELS_PATH}/{parcel_id}");
        let req = self.request(Method::PATCH, &path).json(payload);
        self.mutate(req, CacheTag::Parcels).await
    }

    async fn cancel_parcel(&self, parcel_id: &ParcelId) -> Result<Parcel, ApiError> {
        let path = format!("{PARCELS_PATH}/{parcel_id}/cancel");
        self.mutate(self.request(Method::POST, &path), CacheTag::Parcels)
            .await
    }

    async fn confirm_delivery(&self, parcel_id: &ParcelId) -> Result<Parcel, ApiError> {
        let path = format!("{PARCELS_PATH}/{parcel_id}/confirm-delivery");
        self.mutate(self.request(Method::POST, &path), CacheTag::Parcels)
            .await
    }
}

#[async_trait::async_trait]
impl UserApi for HttpClient {
    async fn all_users(&self, page: PageQuery) -> Result<Paginated<User>, ApiError> {
        self.paginated(USERS_PATH, page, CacheTag::Users).await
    }

    async fn update_user(&self, user_id: &UserId, patch: &UpdateUser) -> Result<User, ApiError> {
        let path = format!("/user/{user_id}");
        let req = self.request(Method::PATCH, &path).json(patch);
        self.mutate(req, CacheTag::Users).await
    }
}
