//! Client wrapper that applies a [`RetryPolicy`] around each operation.

use tokio_util::sync::CancellationToken;
use trippin_api::types::{Entity, EntitySet, Key};
use trippin_api::{BatchRequest, BatchResponse, Client, EntitySetQuery};

use crate::error::TripPinError;
use crate::retry::RetryPolicy;

/// TripPin client with an opt-in retry policy. The default policy never
/// retries, so each operation maps to exactly one exchange.
#[derive(Clone, Debug)]
pub struct TripPinClient {
    inner: Client,
    retry: RetryPolicy,
}

impl TripPinClient {
    pub fn new(inner: Client) -> Self {
        Self {
            inner,
            retry: RetryPolicy::none(),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            inner: self.inner.with_cancellation(token),
            retry: self.retry,
        }
    }

    pub fn inner(&self) -> &Client {
        &self.inner
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Switches to the session-scoped root, keeping the retry policy.
    pub async fn open_session(&self) -> Result<Self, TripPinError> {
        let inner = self
            .retry
            .run("session", || async { Ok(self.inner.open_session().await?) })
            .await?;
        Ok(Self {
            inner,
            retry: self.retry,
        })
    }

    pub async fn execute<E: EntitySet>(&self, query: &EntitySetQuery<E>) -> Result<Vec<E>, TripPinError> {
        self.retry
            .run(E::NAME, || async { Ok(self.inner.execute(query).await?) })
            .await
    }

    pub async fn count<E: EntitySet>(&self, query: &EntitySetQuery<E>) -> Result<u64, TripPinError> {
        self.retry
            .run(E::NAME, || async { Ok(self.inner.count(query).await?) })
            .await
    }

    pub async fn get_by_key<E: EntitySet>(&self, key: impl Into<Key>) -> Result<E, TripPinError> {
        let key = key.into();
        self.retry
            .run(E::NAME, || async { Ok(self.inner.get_by_key::<E>(key.clone()).await?) })
            .await
    }

    pub async fn get_singleton<E: Entity>(&self, name: &str) -> Result<E, TripPinError> {
        self.retry
            .run(name, || async { Ok(self.inner.get_singleton::<E>(name).await?) })
            .await
    }

    /// Not retried: the entity stays borrowed across the single exchange.
    pub async fn load_navigation<E: EntitySet>(
        &self,
        entity: &mut E,
        navigation: &str,
    ) -> Result<(), TripPinError> {
        Ok(self.inner.load_navigation(entity, navigation).await?)
    }

    pub async fn execute_batch(&self, batch: &BatchRequest) -> Result<BatchResponse, TripPinError> {
        self.retry
            .run("$batch", || async { Ok(self.inner.execute_batch(batch).await?) })
            .await
    }
}
