//! Turns loosely shaped order entries (store rows, static file entries) into
//! [`OrderRecord`]s. Every missing or malformed field is defaulted here, so the
//! aggregation code never has to second-guess its input.

use crate::models::{
    LineItem, OrderRecord, DEFAULT_CUSTOMER, DEFAULT_PAYMENT_METHOD, DEFAULT_SERVICE_NAME,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};

const ID_KEYS: &[&str] = &["orderId", "id"];
const CUSTOMER_KEYS: &[&str] = &["customerName", "customer"];
const DATE_KEYS: &[&str] = &["orderDate", "date"];
const TOTAL_KEYS: &[&str] = &["grandTotal", "total"];
const PAYMENT_KEYS: &[&str] = &["paymentMethod", "paymentMode", "method"];
const ITEM_KEYS: &[&str] = &["items", "services"];
const ITEM_NAME_KEYS: &[&str] = &["serviceName", "name"];
const ITEM_PRICE_KEYS: &[&str] = &["price", "unitPrice", "amount"];

pub fn parse_records(values: Vec<Value>) -> Vec<OrderRecord> {
    values.iter().map(parse_record).collect()
}

pub fn parse_record(value: &Value) -> OrderRecord {
    let Some(fields) = value.as_object() else {
        return OrderRecord::default();
    };

    OrderRecord {
        id: pick(fields, ID_KEYS).map(id_text).unwrap_or_default(),
        customer_name: non_blank(pick(fields, CUSTOMER_KEYS))
            .unwrap_or_else(|| DEFAULT_CUSTOMER.to_string()),
        ordered_at: pick(fields, DATE_KEYS).and_then(parse_timestamp),
        grand_total: pick(fields, TOTAL_KEYS).map(amount).unwrap_or(0.0),
        payment_method: non_blank(pick(fields, PAYMENT_KEYS))
            .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string()),
        items: pick(fields, ITEM_KEYS)
            .and_then(Value::as_array)
            .map(|items| items.iter().map(parse_line_item).collect())
            .unwrap_or_default(),
    }
}

fn parse_line_item(value: &Value) -> LineItem {
    let fields = value.as_object();
    LineItem {
        service_name: non_blank(fields.and_then(|f| pick(f, ITEM_NAME_KEYS)))
            .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
        unit_price: fields
            .and_then(|f| pick(f, ITEM_PRICE_KEYS))
            .map(amount)
            .unwrap_or(0.0),
    }
}

/// Reads a currency string such as `"₹ 92,450.00"`: strips the prefix symbol,
/// thousands separators and whitespace. Anything unparseable reads as 0.
pub fn parse_currency(text: &str, symbol: &str) -> f64 {
    let body = text.trim();
    let body = body.strip_prefix(symbol).unwrap_or(body);
    let cleaned: String = body
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Non-negative amount from a number or a numeric string; 0 otherwise.
pub fn amount(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => amount_text(text),
        _ => 0.0,
    };
    if parsed.is_finite() && parsed > 0.0 { parsed } else { 0.0 }
}

/// Drops any currency prefix (`₹`, `Rs.`, `INR `) in front of the first digit.
/// A `.` touching the first digit is a decimal point unless it ends a word,
/// as in `Rs.100`. A `-` left in the prefix makes the amount negative.
fn amount_text(text: &str) -> f64 {
    let Some(start) = text.find(|c: char| c.is_ascii_digit()) else {
        return 0.0;
    };
    let (prefix, digits) = text.split_at(start);

    let (prefix, fraction) = match prefix.strip_suffix('.') {
        Some(rest) if !rest.ends_with(char::is_alphabetic) => (rest, true),
        _ => (prefix, false),
    };
    if prefix.trim_end().ends_with('-') {
        return 0.0;
    }

    if fraction {
        parse_currency(&format!(".{digits}"), "")
    } else {
        parse_currency(digits, "")
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(number) => number.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::String(text) => {
            let text = text.trim();
            if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
                return Some(parsed.with_timezone(&Utc));
            }
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
        _ => None,
    }
}

fn pick<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .find(|value| !value.is_null())
}

fn id_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    }
}

fn non_blank(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
