//! HTTP execution engine for the TripPin OData service.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{
    batch::{self, BatchRequest, BatchResponse},
    query::{EntitySetQuery, Query},
    types::{Collection, Entity, EntitySet, Key, PropertyKind},
    Error,
};

/// Public read-write TripPin service root.
pub const DEFAULT_SERVICE_ROOT: &str = "https://services.odata.org/V4/TripPinServiceRW/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Asynchronous OData client bound to one service root.
///
/// Cloning is cheap and clones share the connection pool, so independent
/// queries can run concurrently from clones or from one shared reference.
/// Operations observe the client's cancellation token until response headers
/// arrive; after that the response is always read and materialized.
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    service_root: Url,
    cancel: CancellationToken,
}

impl Client {
    /// Creates a client for the public TripPin service.
    pub fn new() -> Result<Self, Error> {
        Self::with_service_root(DEFAULT_SERVICE_ROOT)
    }

    /// Creates a client for a custom service root. Used for testing with wiremock.
    pub fn with_service_root(service_root: &str) -> Result<Self, Error> {
        Self::with_options(service_root, REQUEST_TIMEOUT)
    }

    pub fn with_options(service_root: &str, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::ServiceUnavailable(e.to_string())
            })?;
        Ok(Self {
            http,
            service_root: normalize_root(service_root)?,
            cancel: CancellationToken::new(),
        })
    }

    pub fn service_root(&self) -> &Url {
        &self.service_root
    }

    /// Returns a client whose operations stop waiting once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            cancel: token,
            ..self.clone()
        }
    }

    /// Resolves the session-scoped root the service redirects to.
    ///
    /// TripPin answers the bare root with a redirect to `/(S(id))/`. Requests
    /// that are not `GET`, such as `$batch`, must target that session root
    /// directly because redirects do not replay a request body.
    pub async fn open_session(&self) -> Result<Self, Error> {
        let resp = self.send(self.http.get(self.service_root.clone())).await?;
        let mut root = resp.url().clone();
        let (status, body) = read_body(resp).await?;
        check_status(status, &body)?;
        root.set_query(None);
        root.set_fragment(None);
        let root = normalize_root(root.as_str())?;
        tracing::info!("Opened service session at {}", root);
        Ok(Self {
            service_root: root,
            ..self.clone()
        })
    }

    fn resource_url(&self, path: &str) -> Result<Url, Error> {
        self.service_root.join(path).map_err(|e| {
            tracing::error!("Invalid URL constructed for {}: {}", path, e);
            Error::InvalidUrl(e.to_string())
        })
    }

    /// URL of one entity, optionally of one of its navigation properties.
    /// The key literal goes in as a single encoded path segment.
    fn entity_url(&self, entity_set: &str, key: &Key, navigation: Option<&str>) -> Result<Url, Error> {
        let mut url = self.service_root.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                tracing::error!("Service root {} cannot carry a path", self.service_root);
                Error::InvalidUrl(self.service_root.to_string())
            })?;
            segments.pop_if_empty().push(&format!("{}({})", entity_set, key));
            if let Some(navigation) = navigation {
                segments.push(navigation);
            }
        }
        Ok(url)
    }

    fn get_url(&self, query: &impl Query) -> Result<Url, Error> {
        Ok(query.add_to_url(&self.resource_url(&query.resource_path())?))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, Error> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                tracing::debug!("Request cancelled before a response arrived");
                Err(Error::Cancelled)
            }
            result = request.send() => result.map_err(|e| {
                tracing::error!("Failed to reach service: {}", e);
                Error::ServiceUnavailable(e.to_string())
            }),
        }
    }

    async fn get(&self, url: Url) -> Result<(StatusCode, String), Error> {
        tracing::debug!("GET {}", url);
        let resp = self
            .send(self.http.get(url).header(ACCEPT, "application/json"))
            .await?;
        read_body(resp).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        let (status, body) = self.get(url).await?;
        check_status(status, &body)?;
        parse(&body)
    }

    /// Follows `@odata.nextLink` until the collection is exhausted.
    async fn fetch_all<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, Error> {
        let mut items = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(url);
        while let Some(url) = next.take() {
            seen.insert(url.clone());
            let page: Collection<T> = self.get_json(url).await?;
            items.extend(page.value);
            if let Some(link) = page.next_link {
                let link = self.resource_url(&link)?;
                if seen.contains(&link) {
                    tracing::error!("Next link {} was already fetched", link);
                    return Err(Error::Deserialization(format!(
                        "next link {} points at an already fetched page",
                        link
                    )));
                }
                next = Some(link);
            }
        }
        Ok(items)
    }

    /// Executes a query and materializes every matching entity.
    pub async fn execute<E: EntitySet>(&self, query: &EntitySetQuery<E>) -> Result<Vec<E>, Error> {
        let url = self.get_url(query)?;
        let items = self.fetch_all::<E>(url).await?;
        tracing::debug!("Materialized {} {} entities", items.len(), E::NAME);
        Ok(items)
    }

    /// Counts the entities matching the query's filter via `/$count`.
    ///
    /// Ordering, projection, expansion and paging options are ignored.
    pub async fn count<E: EntitySet>(&self, query: &EntitySetQuery<E>) -> Result<u64, Error> {
        let mut url = self.resource_url(&format!("{}/$count", E::NAME))?;
        if let Some(filter) = query.predicate() {
            url.query_pairs_mut()
                .append_pair("$filter", &filter.to_string());
        }
        let (status, body) = self.get(url).await?;
        check_status(status, &body)?;
        body.trim_start_matches('\u{feff}')
            .trim()
            .parse::<u64>()
            .map_err(|e| {
                tracing::error!("Failed to parse count: {} | body: {}", e, truncate_body(&body));
                Error::Deserialization(e.to_string())
            })
    }

    /// Fetches a single entity by key.
    pub async fn get_by_key<E: EntitySet>(&self, key: impl Into<Key>) -> Result<E, Error> {
        let key = key.into();
        let url = self.entity_url(E::NAME, &key, None)?;
        let (status, body) = self.get(url).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(Error::EntityNotFound {
                entity_set: E::NAME,
                key: key.to_string(),
            });
        }
        check_status(status, &body)?;
        parse(&body)
    }

    /// Fetches a singleton such as TripPin's `Me`.
    pub async fn get_singleton<E: Entity>(&self, name: &str) -> Result<E, Error> {
        self.get_json(self.resource_url(name)?).await
    }

    /// Populates a navigation property of an already materialized entity.
    ///
    /// Does nothing when the property is already loaded, whether by an earlier
    /// call or by `$expand`.
    pub async fn load_navigation<E: EntitySet>(
        &self,
        entity: &mut E,
        navigation: &str,
    ) -> Result<(), Error> {
        match E::property(navigation) {
            Some(p) if p.kind == PropertyKind::Navigation => {}
            Some(_) => {
                return Err(Error::invalid_field(
                    E::TYPE_NAME,
                    navigation,
                    "not a navigation property",
                ))
            }
            None => return Err(Error::invalid_field(E::TYPE_NAME, navigation, "unknown property")),
        }
        if entity.is_loaded(navigation) {
            tracing::debug!("{} already loaded, skipping request", navigation);
            return Ok(());
        }
        let key = entity.key();
        let url = self.entity_url(E::NAME, &key, Some(navigation))?;
        let items = match self.fetch_all::<serde_json::Value>(url).await {
            Err(Error::HttpStatus { status: 404, .. }) => {
                return Err(Error::EntityNotFound {
                    entity_set: E::NAME,
                    key: key.to_string(),
                })
            }
            other => other?,
        };
        entity
            .set_navigation(navigation, serde_json::Value::Array(items))
            .map_err(|e| {
                tracing::error!("Failed to materialize {}: {}", navigation, e);
                Error::Deserialization(e.to_string())
            })
    }

    /// Sends every query of the batch in one `$batch` request.
    ///
    /// The call fails as a whole only when the exchange itself fails; a
    /// sub-request that fails is reported by [`BatchResponse::take`] for that
    /// slot alone.
    pub async fn execute_batch(&self, batch: &BatchRequest) -> Result<BatchResponse, Error> {
        if batch.is_empty() {
            return Ok(BatchResponse::default());
        }
        let boundary = batch::new_boundary();
        let body = batch.encode(&self.service_root, &boundary)?;
        let url = self.resource_url("$batch")?;
        tracing::debug!("POST {} with {} parts", url, batch.len());
        let resp = self
            .send(
                self.http
                    .post(url)
                    .header(CONTENT_TYPE, format!("multipart/mixed; boundary={}", boundary))
                    .header(ACCEPT, "multipart/mixed")
                    .body(body),
            )
            .await?;
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let (status, body) = read_body(resp).await?;
        check_status(status, &body)?;

        let parts = batch::decode(&content_type, &body)?;
        if parts.len() != batch.len() {
            tracing::error!(
                "Batch returned {} parts for {} requests",
                parts.len(),
                batch.len()
            );
            return Err(Error::Deserialization(format!(
                "expected {} batch parts, got {}",
                batch.len(),
                parts.len()
            )));
        }
        Ok(BatchResponse::new(parts, batch.entity_sets()))
    }
}

fn normalize_root(service_root: &str) -> Result<Url, Error> {
    let mut root = Url::parse(service_root).map_err(|e| {
        tracing::error!("Invalid service root {}: {}", service_root, e);
        Error::InvalidUrl(e.to_string())
    })?;
    if !root.path().ends_with('/') {
        let path = format!("{}/", root.path());
        root.set_path(&path);
    }
    Ok(root)
}

async fn read_body(resp: Response) -> Result<(StatusCode, String), Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(|e| {
        tracing::error!("Failed to read response body: {}", e);
        Error::ServiceUnavailable(e.to_string())
    })?;
    Ok((status, body))
}

fn check_status(status: StatusCode, body: &str) -> Result<(), Error> {
    if status.is_success() {
        return Ok(());
    }
    let snippet = truncate_body(body);
    tracing::error!("Request failed with status {}: {}", status, snippet);
    Err(Error::HttpStatus {
        status: status.as_u16(),
        body: snippet,
    })
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str::<T>(body).map_err(|e| {
        tracing::error!("Failed to parse resource: {} | body: {}", e, truncate_body(body));
        Error::Deserialization(e.to_string())
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}
