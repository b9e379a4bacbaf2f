use crate::models::{AnalyticsSummary, ResolutionTier, ServiceYield};
use serde::Serialize;
use std::collections::BTreeMap;

pub const NO_DATA_MESSAGE: &str = "No data available";

/// Something that can draw a categorical series into a container. Every
/// handle returned by `create` must eventually go back through `release`.
pub trait ChartBackend {
    type Handle;

    fn create(&mut self, spec: &ChartSpec) -> Self::Handle;

    fn release(&mut self, handle: Self::Handle);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub container: String,
    pub kind: &'static str,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChartHandle(u64);

/// In-process chart backend. Holds the configuration of every live chart, so
/// a handle that was never released shows up in `live_count`.
#[derive(Debug, Default)]
pub struct ChartRegistry {
    next_id: u64,
    live: BTreeMap<ChartHandle, ChartSpec>,
}

impl ChartRegistry {
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn get(&self, handle: ChartHandle) -> Option<&ChartSpec> {
        self.live.get(&handle)
    }
}

impl ChartBackend for ChartRegistry {
    type Handle = ChartHandle;

    fn create(&mut self, spec: &ChartSpec) -> ChartHandle {
        self.next_id += 1;
        let handle = ChartHandle(self.next_id);
        self.live.insert(handle, spec.clone());
        handle
    }

    fn release(&mut self, handle: ChartHandle) {
        self.live.remove(&handle);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub currency_symbol: String,
    /// Share of revenue shown as the net estimate; 1.0 shows raw revenue.
    pub net_margin: f64,
    pub chart_container: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
            net_margin: 0.65,
            chart_container: "revenueChart".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceLine {
    pub name: String,
    pub count: String,
    #[serde(rename = "yield")]
    pub yield_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricLine {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentLine {
    pub id: String,
    pub customer: String,
    pub date: String,
    pub total: String,
}

/// Contents of every named slot on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedView {
    pub sequence: u64,
    pub tier: ResolutionTier,
    pub kpi_revenue: String,
    pub kpi_orders: String,
    pub kpi_average: String,
    pub kpi_net: String,
    pub services: Vec<ServiceLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services_placeholder: Option<String>,
    pub metrics: Vec<MetricLine>,
    pub recent_orders: Vec<RecentLine>,
    pub chart: ChartSpec,
}

pub struct ViewRenderer<B: ChartBackend> {
    backend: B,
    options: RenderOptions,
    current_chart: Option<B::Handle>,
    last_applied: u64,
    current_view: Option<RenderedView>,
}

impl<B: ChartBackend> ViewRenderer<B> {
    pub fn new(backend: B, options: RenderOptions) -> Self {
        Self {
            backend,
            options,
            current_chart: None,
            last_applied: 0,
            current_view: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn current(&self) -> Option<&RenderedView> {
        self.current_view.as_ref()
    }

    /// Applies the result of refresh cycle `sequence` unless a newer cycle
    /// already painted the view. Stale results are dropped and `None` returned.
    pub fn render_cycle(
        &mut self,
        sequence: u64,
        tier: ResolutionTier,
        summary: &AnalyticsSummary,
    ) -> Option<RenderedView> {
        if sequence <= self.last_applied {
            return None;
        }
        self.last_applied = sequence;

        let mut view = self.render(tier, summary);
        view.sequence = sequence;
        self.current_view = Some(view.clone());
        Some(view)
    }

    /// Paints `summary`, disposing the previous chart before creating the next.
    pub fn render(&mut self, tier: ResolutionTier, summary: &AnalyticsSummary) -> RenderedView {
        let chart = ChartSpec {
            container: self.options.chart_container.clone(),
            kind: "doughnut",
            labels: summary.series.iter().map(|p| p.label.clone()).collect(),
            values: summary.series.iter().map(|p| p.value).collect(),
        };

        if let Some(previous) = self.current_chart.take() {
            self.backend.release(previous);
        }
        self.current_chart = Some(self.backend.create(&chart));

        let symbol = self.options.currency_symbol.as_str();
        let services: Vec<ServiceLine> = summary
            .services
            .iter()
            .map(|row| ServiceLine {
                name: row.name.clone(),
                count: group_digits(row.count),
                yield_text: match &row.yield_value {
                    ServiceYield::Formatted(text) => text.clone(),
                    ServiceYield::Amount(value) => format_currency(*value, symbol),
                },
            })
            .collect();

        RenderedView {
            sequence: 0,
            tier,
            kpi_revenue: format_currency(summary.total_revenue, symbol),
            kpi_orders: group_digits(summary.order_count),
            kpi_average: format_currency(summary.average_order_value, symbol),
            kpi_net: format_currency(summary.total_revenue * self.options.net_margin, symbol),
            services_placeholder: services.is_empty().then(|| NO_DATA_MESSAGE.to_string()),
            services,
            metrics: summary
                .series
                .iter()
                .map(|point| MetricLine {
                    label: point.label.clone(),
                    value: point
                        .display
                        .clone()
                        .unwrap_or_else(|| format_currency(point.value, symbol)),
                })
                .collect(),
            recent_orders: summary
                .recent_orders
                .iter()
                .map(|order| RecentLine {
                    id: format!("#{}", order.short_id),
                    customer: order.customer_name.clone(),
                    date: order
                        .ordered_at
                        .map(|at| at.format("%d %b %Y").to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    total: format_currency(order.grand_total, symbol),
                })
                .collect(),
            chart,
        }
    }
}

/// `1234567.891` with `₹` becomes `₹1,234,567.89`.
pub fn format_currency(value: f64, symbol: &str) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}{symbol}{}.{:02}", group_digits(cents / 100), cents % 100)
}

pub fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
