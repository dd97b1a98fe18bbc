//! Query cache and request lifecycle.
//!
//! [`QueryController`] tracks a single "current" query on behalf of a view.
//! Fetched snapshots are cached per query key with a TTL, concurrent loads of
//! one key share a single upstream fetch, and a response that arrives after
//! the view has moved on to another query is dropped.

use chrono::Local;
use moka::future::Cache;
use std::{sync::Arc, time::Duration};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, instrument, warn};

use crate::{
    Config,
    error::WeatherError,
    model::{WeatherQuery, WeatherSnapshot},
    provider::WeatherProvider,
};

const MAX_CACHED_QUERIES: u64 = 256;

/// Lifecycle of the current query.
#[derive(Debug, Clone, Default)]
pub enum QueryStatus {
    #[default]
    Idle,
    Pending,
    Success(Arc<WeatherSnapshot>),
    Error(Arc<WeatherError>),
}

/// The current query and where it is in its lifecycle.
#[derive(Debug, Clone, Default)]
pub struct QueryState {
    pub query: Option<WeatherQuery>,
    pub status: QueryStatus,
}

impl QueryState {
    pub fn is_settled(&self) -> bool {
        !matches!(self.status, QueryStatus::Pending)
    }

    pub fn view(&self) -> ViewState {
        match &self.status {
            QueryStatus::Idle => ViewState::default(),
            QueryStatus::Pending => ViewState { is_loading: true, ..ViewState::default() },
            QueryStatus::Success(snapshot) => {
                ViewState { data: Some(Arc::clone(snapshot)), ..ViewState::default() }
            }
            QueryStatus::Error(err) => ViewState {
                is_error: true,
                error: Some(Arc::clone(err)),
                ..ViewState::default()
            },
        }
    }
}

/// What a view renders from.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub data: Option<Arc<WeatherSnapshot>>,
    pub is_loading: bool,
    pub is_error: bool,
    pub error: Option<Arc<WeatherError>>,
}

#[derive(Clone)]
pub struct QueryController {
    provider: Arc<dyn WeatherProvider>,
    cache: Cache<WeatherQuery, Arc<WeatherSnapshot>>,
    state: Arc<watch::Sender<QueryState>>,
}

impl std::fmt::Debug for QueryController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryController")
            .field("provider", &self.provider)
            .field("cached", &self.cache.entry_count())
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl QueryController {
    pub fn new(provider: Arc<dyn WeatherProvider>, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(MAX_CACHED_QUERIES).time_to_live(ttl).build();
        let (state, _) = watch::channel(QueryState::default());

        Self { provider, cache, state: Arc::new(state) }
    }

    pub fn from_config(provider: Arc<dyn WeatherProvider>, config: &Config) -> Self {
        Self::new(provider, Duration::from_secs(config.cache_ttl_secs))
    }

    pub fn state(&self) -> QueryState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.state.subscribe()
    }

    /// Make `query` the current query.
    ///
    /// A blank query is ignored: no network call and no state change. A fresh
    /// cached snapshot is published immediately. Otherwise the state becomes
    /// `Pending` and the returned task publishes the outcome, unless another
    /// query has become current in the meantime.
    #[instrument(skip(self, query), fields(query = %query))]
    pub async fn request(&self, query: WeatherQuery) -> Option<JoinHandle<()>> {
        if query.is_blank() {
            debug!("Blank query ignored");
            return None;
        }

        if let Some(snapshot) = self.cache.get(&query).await {
            debug!("Cache hit");
            self.state.send_replace(QueryState {
                query: Some(query),
                status: QueryStatus::Success(snapshot),
            });
            return None;
        }

        debug!("Cache miss");
        self.state.send_replace(QueryState {
            query: Some(query.clone()),
            status: QueryStatus::Pending,
        });

        let this = self.clone();
        Some(tokio::spawn(async move {
            let status = match this.load(query.clone()).await {
                Ok(snapshot) => QueryStatus::Success(snapshot),
                Err(err) => QueryStatus::Error(err),
            };
            this.publish(&query, status);
        }))
    }

    /// Load a snapshot through the cache without changing the current query.
    pub async fn fetch(
        &self,
        query: WeatherQuery,
    ) -> Result<Arc<WeatherSnapshot>, Arc<WeatherError>> {
        if query.is_blank() {
            return Err(Arc::new(WeatherError::Validation));
        }
        self.load(query).await
    }

    /// Drop the cached snapshot for the current query and request it again.
    pub async fn refresh(&self) -> Option<JoinHandle<()>> {
        let query = self.state.borrow().query.clone()?;
        self.cache.invalidate(&query).await;
        self.request(query).await
    }

    async fn load(
        &self,
        query: WeatherQuery,
    ) -> Result<Arc<WeatherSnapshot>, Arc<WeatherError>> {
        let provider = Arc::clone(&self.provider);
        let key = query.clone();

        let result = self
            .cache
            .try_get_with(key, async move {
                let raw = provider.fetch(&query).await?;
                let snapshot = WeatherSnapshot::from_raw(raw, &Local)?;
                info!(
                    city = %snapshot.current.city_name,
                    days = snapshot.daily.len(),
                    "Weather snapshot fetched"
                );
                Ok::<_, WeatherError>(Arc::new(snapshot))
            })
            .await;

        if let Err(err) = &result {
            warn!(error = %err, "Weather fetch failed");
        }
        result
    }

    fn publish(&self, query: &WeatherQuery, status: QueryStatus) {
        let applied = self.state.send_if_modified(|state| {
            if state.query.as_ref() == Some(query) {
                state.status = status;
                true
            } else {
                false
            }
        });

        if !applied {
            warn!(query = %query, "Discarding response for superseded query");
        }
    }
}
