use crate::models::{
    AnalyticsSummary, OrderRecord, RecentOrder, SeriesPoint, ServiceRow, ServiceYield,
    StaticAnalytics, StaticServiceEntry,
};
use crate::records::{amount, parse_currency};
use crate::resolver::{ResolvedData, Resolution};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    PaymentMethod,
    Customer,
    Service,
}

impl GroupKey {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "payment" | "payment_method" | "method" => Some(Self::PaymentMethod),
            "customer" => Some(Self::Customer),
            "service" => Some(Self::Service),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMetric {
    Count,
    Yield,
}

impl RankMetric {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "count" => Some(Self::Count),
            "yield" | "revenue" => Some(Self::Yield),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFilter {
    #[default]
    All,
    Today,
    Last7Days,
    Last30Days,
}

impl DateFilter {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Some(Self::All),
            "today" => Some(Self::Today),
            "7d" | "week" => Some(Self::Last7Days),
            "30d" | "month" => Some(Self::Last30Days),
            _ => None,
        }
    }

    /// Undated orders only pass the unfiltered view.
    pub fn admits(self, ordered_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let window = match self {
            Self::All => return true,
            Self::Today => {
                return ordered_at.is_some_and(|at| at.date_naive() == now.date_naive());
            }
            Self::Last7Days => Duration::days(7),
            Self::Last30Days => Duration::days(30),
        };
        ordered_at.is_some_and(|at| at >= now - window && at <= now)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateOptions {
    pub group_by: GroupKey,
    pub top_n: usize,
    pub rank_by: RankMetric,
    pub recent_limit: usize,
    /// Prefix used by pre-formatted currency strings in static data.
    pub currency_symbol: String,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            group_by: GroupKey::PaymentMethod,
            top_n: 5,
            rank_by: RankMetric::Count,
            recent_limit: 5,
            currency_symbol: "₹".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub label: String,
    pub count: u64,
    pub total: f64,
}

pub fn aggregate(records: &[OrderRecord], options: &AggregateOptions) -> AnalyticsSummary {
    let total_revenue: f64 = records.iter().map(|record| record.grand_total).sum();
    let order_count = records.len() as u64;
    let average_order_value = if order_count == 0 {
        0.0
    } else {
        total_revenue / order_count as f64
    };

    // Service breakdowns are ranked and cut to the top N like the table.
    let groups = match options.group_by {
        GroupKey::Service => ranked_services(records, options.top_n, options.rank_by),
        key => group_by(records, key),
    };
    let series = groups
        .into_iter()
        .map(|group| SeriesPoint {
            label: group.label,
            value: group.total,
            display: None,
        })
        .collect();

    AnalyticsSummary {
        total_revenue,
        order_count,
        average_order_value,
        series,
        services: top_services(records, options.top_n, options.rank_by),
        recent_orders: recent_orders(records, options.recent_limit),
    }
}

/// Groups in first-seen order. Service grouping counts each line item once
/// and sums unit prices; other keys count orders and sum grand totals.
pub fn group_by(records: &[OrderRecord], key: GroupKey) -> Vec<CategoryTotal> {
    let mut groups: Vec<CategoryTotal> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut add = |label: &str, value: f64| {
        let slot = *index.entry(label.to_string()).or_insert_with(|| {
            groups.push(CategoryTotal {
                label: label.to_string(),
                count: 0,
                total: 0.0,
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.count = group.count.saturating_add(1);
        group.total += value;
    };

    for record in records {
        match key {
            GroupKey::PaymentMethod => add(&record.payment_method, record.grand_total),
            GroupKey::Customer => add(&record.customer_name, record.grand_total),
            GroupKey::Service => {
                for item in &record.items {
                    add(&item.service_name, item.unit_price);
                }
            }
        }
    }

    groups
}

fn ranked_services(records: &[OrderRecord], limit: usize, metric: RankMetric) -> Vec<CategoryTotal> {
    let mut groups = group_by(records, GroupKey::Service);
    match metric {
        RankMetric::Count => groups.sort_by(|a, b| b.count.cmp(&a.count)),
        RankMetric::Yield => groups.sort_by(|a, b| b.total.total_cmp(&a.total)),
    }
    groups.truncate(limit);
    groups
}

pub fn top_services(records: &[OrderRecord], limit: usize, metric: RankMetric) -> Vec<ServiceRow> {
    ranked_services(records, limit, metric)
        .into_iter()
        .map(|group| ServiceRow {
            name: group.label,
            count: group.count,
            yield_value: ServiceYield::Amount(group.total),
        })
        .collect()
}

pub fn recent_orders(records: &[OrderRecord], limit: usize) -> Vec<RecentOrder> {
    let mut sorted: Vec<&OrderRecord> = records.iter().collect();
    // None sorts below Some, so undated orders end up last.
    sorted.sort_by(|a, b| b.ordered_at.cmp(&a.ordered_at));

    sorted
        .into_iter()
        .take(limit)
        .map(|record| RecentOrder {
            short_id: short_id(&record.id),
            customer_name: record.customer_name.clone(),
            ordered_at: record.ordered_at,
            grand_total: record.grand_total,
        })
        .collect()
}

fn short_id(id: &str) -> String {
    if id.is_empty() {
        return "N/A".to_string();
    }
    let skip = id.chars().count().saturating_sub(6);
    id.chars().skip(skip).collect()
}

pub fn filter_records(
    records: Vec<OrderRecord>,
    filter: DateFilter,
    now: DateTime<Utc>,
) -> Vec<OrderRecord> {
    records
        .into_iter()
        .filter(|record| filter.admits(record.ordered_at, now))
        .collect()
}

/// Produces the summary for whatever tier answered. Pre-aggregated static data
/// keeps its own revenue series and service table; the date filter only
/// narrows the order list.
pub fn summarize(
    resolution: Resolution,
    options: &AggregateOptions,
    filter: DateFilter,
    now: DateTime<Utc>,
) -> AnalyticsSummary {
    match resolution.data {
        ResolvedData::Records(records) => aggregate(&filter_records(records, filter, now), options),
        ResolvedData::Summary(summary) => summary,
        ResolvedData::Prepared { orders, analytics } => {
            let mut summary = aggregate(&filter_records(orders, filter, now), options);
            adapt_prepared(&mut summary, analytics, &options.currency_symbol);
            summary
        }
    }
}

fn adapt_prepared(summary: &mut AnalyticsSummary, analytics: StaticAnalytics, symbol: &str) {
    if !analytics.revenue.is_empty() {
        summary.series = analytics
            .revenue
            .into_iter()
            .map(|entry| match entry.value {
                Value::String(text) => SeriesPoint {
                    label: entry.label,
                    value: parse_currency(&text, symbol),
                    display: Some(text),
                },
                other => SeriesPoint {
                    label: entry.label,
                    value: amount(&other),
                    display: None,
                },
            })
            .collect();
    }

    if !analytics.services.is_empty() {
        summary.services = analytics.services.into_iter().map(service_row).collect();
    }
}

fn service_row(entry: StaticServiceEntry) -> ServiceRow {
    let count = match &entry.count {
        Value::Number(number) => number
            .as_u64()
            .unwrap_or_else(|| amount(&entry.count).round() as u64),
        other => amount(other).round() as u64,
    };
    let yield_value = match entry.yield_value {
        Value::String(text) => ServiceYield::Formatted(text),
        other => ServiceYield::Amount(amount(&other)),
    };
    ServiceRow {
        name: entry.name,
        count,
        yield_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LineItem, ResolutionTier};
    use crate::records::parse_records;
    use chrono::TimeZone;
    use serde_json::json;

    fn order(method: &str, total: f64) -> OrderRecord {
        OrderRecord {
            payment_method: method.to_string(),
            grand_total: total,
            ..OrderRecord::default()
        }
    }

    fn with_items(items: &[(&str, f64)]) -> OrderRecord {
        OrderRecord {
            items: items
                .iter()
                .map(|(name, price)| LineItem {
                    service_name: name.to_string(),
                    unit_price: *price,
                })
                .collect(),
            ..OrderRecord::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn totals_and_average() {
        let records = vec![order("Cash", 10.0), order("Card", 20.5), order("UPI", 30.0)];
        let summary = aggregate(&records, &AggregateOptions::default());
        assert_eq!(summary.total_revenue, 60.5);
        assert_eq!(summary.order_count, 3);
        assert!((summary.average_order_value - 60.5 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_is_all_zero() {
        let summary = aggregate(&[], &AggregateOptions::default());
        assert_eq!(summary, AnalyticsSummary::empty());
        assert!(summary.average_order_value.is_finite());
    }

    #[test]
    fn malformed_totals_count_as_zero() {
        let records = parse_records(vec![
            json!({ "grandTotal": "oops" }),
            json!({}),
            json!({ "grandTotal": 40 }),
        ]);
        let summary = aggregate(&records, &AggregateOptions::default());
        assert_eq!(summary.total_revenue, 40.0);
        assert_eq!(summary.order_count, 3);
        assert!((summary.average_order_value - 40.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn payment_groups_keep_first_seen_order() {
        let records = vec![order("Cash", 50.0), order("Cash", 70.0), order("Card", 20.0)];
        let groups = group_by(&records, GroupKey::PaymentMethod);
        let pairs: Vec<(&str, f64)> = groups.iter().map(|g| (g.label.as_str(), g.total)).collect();
        assert_eq!(pairs, vec![("Cash", 120.0), ("Card", 20.0)]);
        assert_eq!(groups[0].count, 2);
    }

    #[test]
    fn customer_grouping_uses_placeholder_name() {
        let records = parse_records(vec![
            json!({ "customerName": "Local School", "grandTotal": 10 }),
            json!({ "grandTotal": 5 }),
        ]);
        let groups = group_by(&records, GroupKey::Customer);
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Local School", "Walking Customer"]);
    }

    #[test]
    fn top_services_rank_by_count_and_keep_n() {
        let records = vec![
            with_items(&[("A", 1.0), ("B", 100.0)]),
            with_items(&[("B", 100.0), ("C", 5.0)]),
            with_items(&[("C", 5.0), ("C", 5.0), ("D", 1.0)]),
            with_items(&[("E", 1.0), ("F", 1.0)]),
        ];
        let rows = top_services(&records, 5, RankMetric::Count);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["C", "B", "A", "D", "E"]);
        assert_eq!(rows[0].count, 3);
        assert_eq!(rows[0].yield_value, ServiceYield::Amount(15.0));
    }

    #[test]
    fn top_services_rank_by_yield() {
        let records = vec![with_items(&[("A", 1.0), ("A", 1.0), ("B", 100.0)])];
        let rows = top_services(&records, 1, RankMetric::Yield);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "B");
    }

    #[test]
    fn series_and_table_lengths_are_independent() {
        let records = vec![
            OrderRecord {
                payment_method: "Cash".into(),
                ..with_items(&[("A", 1.0), ("B", 1.0), ("C", 1.0)])
            },
        ];
        let summary = aggregate(&records, &AggregateOptions::default());
        assert_eq!(summary.series.len(), 1);
        assert_eq!(summary.services.len(), 3);
    }

    #[test]
    fn service_series_is_ranked_and_cut_to_top_n() {
        let records: Vec<OrderRecord> = ["A", "B", "C", "D", "E", "F", "G"]
            .iter()
            .enumerate()
            .map(|(index, name)| with_items(&vec![(*name, 1.0); index + 1]))
            .collect();
        let options = AggregateOptions {
            group_by: GroupKey::Service,
            ..AggregateOptions::default()
        };

        let summary = aggregate(&records, &options);

        let labels: Vec<&str> = summary.series.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["G", "F", "E", "D", "C"]);
        assert_eq!(summary.series[0].value, 7.0);
        let table: Vec<&str> = summary.services.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(table, labels);
    }

    #[test]
    fn recent_orders_newest_first_with_short_ids() {
        let records = parse_records(vec![
            json!({ "orderId": "ORD-000001", "orderDate": "2026-03-01" }),
            json!({ "orderId": "ORD-000002" }),
            json!({ "orderId": "ORD-000003", "orderDate": "2026-03-05" }),
        ]);
        let recent = recent_orders(&records, 5);
        let ids: Vec<&str> = recent.iter().map(|r| r.short_id.as_str()).collect();
        assert_eq!(ids, vec!["000003", "000001", "000002"]);
    }

    #[test]
    fn date_filter_windows() {
        let records = parse_records(vec![
            json!({ "orderDate": "2026-03-10T08:00:00Z", "grandTotal": 1 }),
            json!({ "orderDate": "2026-03-05T08:00:00Z", "grandTotal": 2 }),
            json!({ "orderDate": "2026-02-20T08:00:00Z", "grandTotal": 4 }),
            json!({ "grandTotal": 8 }),
            json!({ "orderDate": "2026-03-12T08:00:00Z", "grandTotal": 16 }),
        ]);
        let total = |filter| -> f64 {
            filter_records(records.clone(), filter, now())
                .iter()
                .map(|r| r.grand_total)
                .sum()
        };
        assert_eq!(total(DateFilter::All), 31.0);
        assert_eq!(total(DateFilter::Today), 1.0);
        assert_eq!(total(DateFilter::Last7Days), 3.0);
        assert_eq!(total(DateFilter::Last30Days), 7.0);
    }

    #[test]
    fn fallback_orders_average() {
        let resolution = Resolution {
            tier: ResolutionTier::Fallback,
            data: ResolvedData::Records(parse_records(vec![
                json!({ "grandTotal": 100 }),
                json!({ "grandTotal": 300 }),
            ])),
        };
        let summary = summarize(resolution, &AggregateOptions::default(), DateFilter::All, now());
        assert_eq!(summary.average_order_value, 200.0);
    }

    #[test]
    fn prepared_analytics_pass_through() {
        let analytics: StaticAnalytics = serde_json::from_value(json!({
            "revenue": [
                { "label": "Printing", "value": "₹ 92,450.00" },
                { "label": "Binding", "value": 1200 }
            ],
            "services": [
                { "name": "Color Print", "count": 1240, "yield": "₹ 45,000" },
                { "name": "Lamination", "count": "12", "yield": 300 }
            ]
        }))
        .unwrap();
        let resolution = Resolution {
            tier: ResolutionTier::Fallback,
            data: ResolvedData::Prepared {
                orders: parse_records(vec![json!({ "grandTotal": 10 })]),
                analytics,
            },
        };

        let summary = summarize(resolution, &AggregateOptions::default(), DateFilter::All, now());

        assert_eq!(summary.order_count, 1);
        assert_eq!(summary.series[0].value, 92450.0);
        assert_eq!(summary.series[0].display.as_deref(), Some("₹ 92,450.00"));
        assert_eq!(summary.series[1].value, 1200.0);
        assert_eq!(
            summary.services[0].yield_value,
            ServiceYield::Formatted("₹ 45,000".to_string())
        );
        assert_eq!(summary.services[1].count, 12);
        assert_eq!(summary.services[1].yield_value, ServiceYield::Amount(300.0));
    }

    #[test]
    fn default_summary_passes_through() {
        let resolution = Resolution {
            tier: ResolutionTier::Default,
            data: ResolvedData::Summary(AnalyticsSummary::empty()),
        };
        let summary = summarize(resolution, &AggregateOptions::default(), DateFilter::Today, now());
        assert_eq!(summary, AnalyticsSummary::empty());
    }
}
