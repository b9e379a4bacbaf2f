//! Tiered data resolution: embedded store first, then the static data file,
//! then a built-in default. Exactly one tier answers each call and the call
//! always settles on some result.

use crate::errors::{FetchError, StoreError};
use crate::fallback::{parse_payload, FallbackSource};
use crate::models::{AnalyticsSummary, OrderRecord, ResolutionTier, StaticAnalytics};
use crate::records::parse_records;
use crate::store::EmbeddedStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedData {
    Records(Vec<OrderRecord>),
    /// Static file that ships its own aggregates next to the orders.
    Prepared {
        orders: Vec<OrderRecord>,
        analytics: StaticAnalytics,
    },
    Summary(AnalyticsSummary),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub tier: ResolutionTier,
    pub data: ResolvedData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    TryPrimary,
    TryFallback,
    Default,
}

pub struct DataResolver {
    store: Option<Arc<dyn EmbeddedStore>>,
    database: String,
    collection: String,
    fallback: Arc<dyn FallbackSource>,
    demo_fallback: bool,
}

impl DataResolver {
    pub fn new(
        store: Option<Arc<dyn EmbeddedStore>>,
        database: impl Into<String>,
        collection: impl Into<String>,
        fallback: Arc<dyn FallbackSource>,
    ) -> Self {
        Self {
            store,
            database: database.into(),
            collection: collection.into(),
            fallback,
            demo_fallback: false,
        }
    }

    /// Serve the built-in demo orders instead of an empty summary when both
    /// real sources come up empty.
    pub fn with_demo_fallback(mut self, enabled: bool) -> Self {
        self.demo_fallback = enabled;
        self
    }

    pub async fn resolve(&self) -> Resolution {
        let mut step = Step::TryPrimary;
        loop {
            step = match step {
                Step::TryPrimary => match self.try_primary().await {
                    Ok(Some(records)) => {
                        info!(count = records.len(), "resolved orders from embedded store");
                        return Resolution {
                            tier: ResolutionTier::Primary,
                            data: ResolvedData::Records(records),
                        };
                    }
                    Ok(None) => Step::TryFallback,
                    Err(err) => {
                        warn!("embedded store read failed, trying static data: {err}");
                        Step::TryFallback
                    }
                },
                Step::TryFallback => match self.try_fallback().await {
                    Ok(Some(data)) => {
                        info!(source = %self.fallback.describe(), "resolved analytics from static data");
                        return Resolution {
                            tier: ResolutionTier::Fallback,
                            data,
                        };
                    }
                    Ok(None) => {
                        debug!(source = %self.fallback.describe(), "static data holds no orders");
                        Step::Default
                    }
                    Err(err) => {
                        warn!("static data unavailable, using default state: {err}");
                        Step::Default
                    }
                },
                Step::Default => return self.default_resolution(),
            };
        }
    }

    async fn try_primary(&self) -> Result<Option<Vec<OrderRecord>>, StoreError> {
        let Some(store) = &self.store else {
            debug!("no embedded store available");
            return Ok(None);
        };

        let db = match store.open(&self.database).await {
            Ok(db) => db,
            Err(StoreError::DatabaseMissing(database)) => {
                debug!(%database, "embedded store has no such database");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        if !db.has_collection(&self.collection) {
            debug!(collection = %self.collection, "embedded store has no such collection");
            return Ok(None);
        }

        let entries = db.read_all(&self.collection).await?;
        if entries.is_empty() {
            debug!(collection = %self.collection, "embedded store collection is empty");
            return Ok(None);
        }
        Ok(Some(parse_records(entries)))
    }

    async fn try_fallback(&self) -> Result<Option<ResolvedData>, FetchError> {
        let bytes = self.fallback.fetch().await?;
        let payload = parse_payload(&bytes)?;
        if !payload.is_usable() {
            return Ok(None);
        }

        let orders = parse_records(payload.orders);
        let data = match payload.analytics.filter(|analytics| !analytics.is_empty()) {
            Some(analytics) => ResolvedData::Prepared { orders, analytics },
            None => ResolvedData::Records(orders),
        };
        Ok(Some(data))
    }

    fn default_resolution(&self) -> Resolution {
        let data = if self.demo_fallback {
            info!("serving built-in demo orders");
            ResolvedData::Records(demo_orders(Utc::now()))
        } else {
            info!("serving empty analytics");
            ResolvedData::Summary(AnalyticsSummary::empty())
        };
        Resolution {
            tier: ResolutionTier::Default,
            data,
        }
    }
}

pub fn demo_orders(now: DateTime<Utc>) -> Vec<OrderRecord> {
    [
        ("ORD-8821", "Retail Customer", 450.00),
        ("ORD-8822", "Corporate Hub", 2100.00),
        ("ORD-8823", "Local School", 125.50),
    ]
    .into_iter()
    .map(|(id, customer, total)| OrderRecord {
        id: id.to_string(),
        customer_name: customer.to_string(),
        ordered_at: Some(now),
        grand_total: total,
        ..OrderRecord::default()
    })
    .collect()
}
