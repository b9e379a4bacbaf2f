use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CUSTOMER: &str = "Walking Customer";
pub const DEFAULT_PAYMENT_METHOD: &str = "Other";
pub const DEFAULT_SERVICE_NAME: &str = "Unnamed service";

/// One completed transaction, already validated by [`crate::records::parse_record`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    pub id: String,
    pub customer_name: String,
    pub ordered_at: Option<DateTime<Utc>>,
    pub grand_total: f64,
    pub payment_method: String,
    pub items: Vec<LineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub service_name: String,
    pub unit_price: f64,
}

impl Default for OrderRecord {
    fn default() -> Self {
        Self {
            id: String::new(),
            customer_name: DEFAULT_CUSTOMER.to_string(),
            ordered_at: None,
            grand_total: 0.0,
            payment_method: DEFAULT_PAYMENT_METHOD.to_string(),
            items: Vec::new(),
        }
    }
}

/// Which source produced the data for one resolution cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTier {
    Primary,
    Fallback,
    Default,
}

/// Pre-aggregated block some static data files carry next to their orders.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StaticAnalytics {
    #[serde(default)]
    pub revenue: Vec<StaticRevenueEntry>,
    #[serde(default)]
    pub services: Vec<StaticServiceEntry>,
}

impl StaticAnalytics {
    pub fn is_empty(&self) -> bool {
        self.revenue.is_empty() && self.services.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StaticRevenueEntry {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StaticServiceEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub count: serde_json::Value,
    #[serde(default, rename = "yield")]
    pub yield_value: serde_json::Value,
}

/// Top-level shape of the static fallback resource. Orders stay untyped here;
/// they go through the same parsing boundary as store entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaticPayload {
    #[serde(default)]
    pub orders: Vec<serde_json::Value>,
    #[serde(default)]
    pub analytics: Option<StaticAnalytics>,
}

/// Revenue or volume attributed to one service. Static files may hand the
/// yield over as an already formatted currency string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ServiceYield {
    Amount(f64),
    Formatted(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
    /// Source text to display verbatim, when the value arrived pre-formatted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceRow {
    pub name: String,
    pub count: u64,
    #[serde(rename = "yield")]
    pub yield_value: ServiceYield,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentOrder {
    pub short_id: String,
    pub customer_name: String,
    pub ordered_at: Option<DateTime<Utc>>,
    pub grand_total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    pub total_revenue: f64,
    pub order_count: u64,
    pub average_order_value: f64,
    pub series: Vec<SeriesPoint>,
    pub services: Vec<ServiceRow>,
    pub recent_orders: Vec<RecentOrder>,
}

impl AnalyticsSummary {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub tier: ResolutionTier,
    pub summary: AnalyticsSummary,
}
