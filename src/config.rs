use crate::aggregate::{AggregateOptions, GroupKey, RankMetric};
use crate::render::RenderOptions;
use std::{env, path::PathBuf};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub port: u16,
    pub store_dir: Option<PathBuf>,
    pub database: String,
    pub collection: String,
    pub static_dir: PathBuf,
    pub fallback_path: String,
    pub fallback_url: Option<String>,
    pub demo_fallback: bool,
    pub aggregate: AggregateOptions,
    pub render: RenderOptions,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            store_dir: None,
            database: "PrintingStoreDB".to_string(),
            collection: "orders".to_string(),
            static_dir: PathBuf::from("data"),
            fallback_path: "dummy_data.json".to_string(),
            fallback_url: None,
            demo_fallback: false,
            aggregate: AggregateOptions::default(),
            render: RenderOptions::default(),
        }
    }
}

impl AnalyticsConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Malformed values keep their
    /// default and are reported with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let currency_symbol = text("ANALYTICS_CURRENCY")
            .unwrap_or_else(|| defaults.render.currency_symbol.clone());

        Self {
            port: parsed(&text, "PORT", str::parse::<u16>).unwrap_or(defaults.port),
            store_dir: text("ANALYTICS_STORE_DIR").map(PathBuf::from),
            database: text("ANALYTICS_DB_NAME").unwrap_or(defaults.database),
            collection: text("ANALYTICS_COLLECTION").unwrap_or(defaults.collection),
            static_dir: text("ANALYTICS_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            fallback_path: text("ANALYTICS_FALLBACK_PATH").unwrap_or(defaults.fallback_path),
            fallback_url: text("ANALYTICS_FALLBACK_URL"),
            demo_fallback: parsed(&text, "ANALYTICS_DEMO_FALLBACK", parse_flag)
                .unwrap_or(defaults.demo_fallback),
            aggregate: AggregateOptions {
                group_by: parsed(&text, "ANALYTICS_GROUP_BY", |v| GroupKey::parse(v).ok_or(()))
                    .unwrap_or(defaults.aggregate.group_by),
                top_n: parsed(&text, "ANALYTICS_TOP_N", str::parse::<usize>)
                    .unwrap_or(defaults.aggregate.top_n),
                rank_by: parsed(&text, "ANALYTICS_RANK_BY", |v| RankMetric::parse(v).ok_or(()))
                    .unwrap_or(defaults.aggregate.rank_by),
                currency_symbol: currency_symbol.clone(),
                ..defaults.aggregate
            },
            render: RenderOptions {
                net_margin: parsed(&text, "ANALYTICS_NET_MARGIN", parse_margin)
                    .unwrap_or(defaults.render.net_margin),
                currency_symbol,
                ..defaults.render
            },
        }
    }
}

fn parsed<T, E>(
    text: &impl Fn(&str) -> Option<String>,
    key: &str,
    parse: impl Fn(&str) -> Result<T, E>,
) -> Option<T> {
    let raw = text(key)?;
    match parse(&raw) {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring malformed {key}={raw:?}");
            None
        }
    }
}

fn parse_flag(value: &str) -> Result<bool, ()> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(()),
    }
}

fn parse_margin(value: &str) -> Result<f64, ()> {
    match value.parse::<f64>() {
        Ok(margin) if margin.is_finite() && margin >= 0.0 => Ok(margin),
        _ => Err(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AnalyticsConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AnalyticsConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]);
        assert_eq!(config.port, 8080);
        assert!(config.store_dir.is_none());
        assert_eq!(config.database, "PrintingStoreDB");
        assert_eq!(config.collection, "orders");
        assert_eq!(config.fallback_path, "dummy_data.json");
        assert_eq!(config.aggregate.group_by, GroupKey::PaymentMethod);
        assert_eq!(config.aggregate.top_n, 5);
        assert_eq!(config.render.net_margin, 0.65);
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("PORT", "9191"),
            ("ANALYTICS_STORE_DIR", "/tmp/store"),
            ("ANALYTICS_GROUP_BY", "service"),
            ("ANALYTICS_RANK_BY", "yield"),
            ("ANALYTICS_NET_MARGIN", "0.7"),
            ("ANALYTICS_CURRENCY", "$"),
            ("ANALYTICS_DEMO_FALLBACK", "yes"),
        ]);
        assert_eq!(config.port, 9191);
        assert_eq!(config.store_dir, Some(PathBuf::from("/tmp/store")));
        assert_eq!(config.aggregate.group_by, GroupKey::Service);
        assert_eq!(config.aggregate.rank_by, RankMetric::Yield);
        assert_eq!(config.render.net_margin, 0.7);
        assert_eq!(config.render.currency_symbol, "$");
        assert_eq!(config.aggregate.currency_symbol, "$");
        assert!(config.demo_fallback);
    }

    #[test]
    fn malformed_values_keep_defaults() {
        let config = config_from(&[
            ("PORT", "eighty"),
            ("ANALYTICS_NET_MARGIN", "-1"),
            ("ANALYTICS_GROUP_BY", "weekday"),
            ("ANALYTICS_TOP_N", ""),
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.render.net_margin, 0.65);
        assert_eq!(config.aggregate.group_by, GroupKey::PaymentMethod);
        assert_eq!(config.aggregate.top_n, 5);
    }
}
