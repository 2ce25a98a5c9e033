use crate::errors::StoreError;
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};
use getset::{CopyGetters, Getters};
use rust_decimal::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const DATE_FORMAT: &str = "%Y-%m-%d";
const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

fn round_two_decimals<S>(x: &Decimal, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&format!("{:.2}", x.round_dp(2)))
}

fn round_four_decimals_or_none<S>(x: &Option<Decimal>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match x {
        Some(x) => s.serialize_str(&format!("{:.4}", x.round_dp(4))),
        None => s.serialize_none(),
    }
}

/// Parses a sale date into the calendar date it falls on locally.
///
/// Accepts plain `YYYY-MM-DD` dates, RFC 3339 timestamps (converted to the
/// local time zone first) and offset-less `YYYY-MM-DD HH:MM:SS` timestamps.
pub fn parse_sale_date(raw: &str) -> Result<NaiveDate, StoreError> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Local).date_naive());
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|timestamp| timestamp.date())
        .ok_or_else(|| StoreError::InvalidDate(raw.to_string()))
}

fn date_from_str<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_sale_date(&raw).map_err(serde::de::Error::custom)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSku {
    Text(String),
    Number(serde_json::Number),
}

// The converter turns numeric-looking SKUs into JSON numbers.
fn sku_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawSku::deserialize(deserializer)? {
        RawSku::Text(sku) => sku,
        RawSku::Number(sku) => sku.to_string(),
    })
}

/// A single line of the sales store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Getters, CopyGetters)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    #[getset(get = "pub")]
    #[serde(rename = "sKU", deserialize_with = "sku_from_any")]
    sku: String,
    #[getset(get_copy = "pub")]
    #[serde(deserialize_with = "date_from_str")]
    date: NaiveDate,
    #[getset(get_copy = "pub")]
    unit_price: Decimal,
    #[getset(get_copy = "pub")]
    quantity: u32,
    #[getset(get_copy = "pub")]
    total_price: Decimal,
}

impl SaleRecord {
    #[cfg(test)]
    pub fn new(
        sku: impl Into<String>,
        date: NaiveDate,
        unit_price: Decimal,
        quantity: u32,
        total_price: Decimal,
    ) -> Self {
        SaleRecord {
            sku: sku.into(),
            date,
            unit_price,
            quantity,
            total_price,
        }
    }

    pub fn month_key(&self) -> MonthKey {
        MonthKey::of(self.date)
    }
}

/// Calendar month a sale falls in. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, CopyGetters)]
pub struct MonthKey {
    #[getset(get_copy = "pub")]
    year: i32,
    #[getset(get_copy = "pub")]
    month0: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        MonthKey {
            year: date.year(),
            month0: date.month0(),
        }
    }

    /// One-based month, as reported in every output row.
    pub fn month(&self) -> u32 {
        self.month0 + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, CopyGetters)]
#[serde(rename_all = "camelCase")]
pub struct SaleTotal {
    #[getset(get_copy = "pub")]
    #[serde(serialize_with = "round_two_decimals")]
    total: Decimal,
}

impl SaleTotal {
    pub fn new(total: Decimal) -> Self {
        SaleTotal { total }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, CopyGetters)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySaleTotal {
    #[getset(get_copy = "pub")]
    year: i32,
    #[getset(get_copy = "pub")]
    month: u32,
    #[getset(get_copy = "pub")]
    #[serde(serialize_with = "round_two_decimals")]
    total: Decimal,
}

impl MonthlySaleTotal {
    pub fn new(year: i32, month: u32, total: Decimal) -> Self {
        MonthlySaleTotal { year, month, total }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters, CopyGetters)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPopularItem {
    #[getset(get_copy = "pub")]
    year: i32,
    #[getset(get_copy = "pub")]
    month: u32,
    #[getset(get = "pub")]
    item: String,
    #[getset(get_copy = "pub")]
    quantity_sold: u32,
}

impl MonthlyPopularItem {
    pub const COLUMNS: [&'static str; 4] = ["year", "month", "item", "quantitySold"];

    pub fn new(key: MonthKey, item: impl Into<String>, quantity_sold: u32) -> Self {
        MonthlyPopularItem {
            year: key.year(),
            month: key.month(),
            item: item.into(),
            quantity_sold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters, CopyGetters)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenueItem {
    #[getset(get_copy = "pub")]
    year: i32,
    #[getset(get_copy = "pub")]
    month: u32,
    #[getset(get = "pub")]
    item: String,
    #[getset(get_copy = "pub")]
    #[serde(serialize_with = "round_two_decimals")]
    revenue: Decimal,
}

impl MonthlyRevenueItem {
    pub const COLUMNS: [&'static str; 4] = ["year", "month", "item", "revenue"];

    pub fn new(key: MonthKey, item: impl Into<String>, revenue: Decimal) -> Self {
        MonthlyRevenueItem {
            year: key.year(),
            month: key.month(),
            item: item.into(),
            revenue,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, CopyGetters)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyOrderStats {
    #[getset(get_copy = "pub")]
    year: i32,
    #[getset(get_copy = "pub")]
    month: u32,
    #[getset(get_copy = "pub")]
    min_orders: u32,
    #[getset(get_copy = "pub")]
    max_orders: u32,
    /// `None` when the item was not sold that month.
    #[getset(get_copy = "pub")]
    #[serde(serialize_with = "round_four_decimals_or_none")]
    avg_orders: Option<Decimal>,
}

impl MonthlyOrderStats {
    pub const COLUMNS: [&'static str; 5] = ["year", "month", "minOrders", "maxOrders", "avgOrders"];

    /// Builds the statistics for one month from the quantities of every
    /// matching sale. An empty slice yields zero min/max and no average.
    pub fn from_quantities(key: MonthKey, quantities: &[u32]) -> Self {
        let avg_orders = if quantities.is_empty() {
            None
        } else {
            let sum: u64 = quantities.iter().map(|&q| u64::from(q)).sum();
            Some(Decimal::from(sum) / Decimal::from(quantities.len()))
        };

        MonthlyOrderStats {
            year: key.year(),
            month: key.month(),
            min_orders: quantities.iter().copied().min().unwrap_or(0),
            max_orders: quantities.iter().copied().max().unwrap_or(0),
            avg_orders,
        }
    }
}
