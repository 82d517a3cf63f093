//! Live quotes and the attributes that can be read off them.
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize, Serializer};
use strum_macros::{Display, EnumIter, EnumString};

use crate::connector::{ConnectorError, TaskPanic};
use crate::defaults::NOT_AVAILABLE;
use crate::error::CtkrError;

/// Quote returned by a connector for one (source, symbol) pair.
///
/// Every field is optional; sources fill in whatever they publish.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quote {
    pub last_price: Option<f64>,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub open: Option<f64>,
    pub close: Option<f64>,
    pub base_volume: Option<f64>,
    pub quote_volume: Option<f64>,
    pub vwap: Option<f64>,
    pub change: Option<f64>,
    pub percentage: Option<f64>,
    /// Source timestamp in milliseconds since the Unix epoch.
    pub timestamp: Option<i64>,
}

impl Quote {
    /// Read one attribute.
    pub fn get(&self, attribute: QuoteAttribute) -> Option<f64> {
        match attribute {
            QuoteAttribute::LastPrice => self.last_price,
            QuoteAttribute::Bid => self.bid,
            QuoteAttribute::Ask => self.ask,
            QuoteAttribute::High => self.high,
            QuoteAttribute::Low => self.low,
            QuoteAttribute::Open => self.open,
            QuoteAttribute::Close => self.close,
            QuoteAttribute::BaseVolume => self.base_volume,
            QuoteAttribute::QuoteVolume => self.quote_volume,
            QuoteAttribute::Vwap => self.vwap,
            QuoteAttribute::Change => self.change,
            QuoteAttribute::Percentage => self.percentage,
        }
    }
}

/// Set of quote attributes that can be requested.
#[allow(missing_docs)]
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    EnumString,
    EnumIter,
    Hash,
    Eq,
    PartialEq,
)]
#[value(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum QuoteAttribute {
    #[default]
    LastPrice,
    Bid,
    Ask,
    High,
    Low,
    Open,
    Close,
    BaseVolume,
    QuoteVolume,
    Vwap,
    Change,
    Percentage,
}

impl QuoteAttribute {
    /// Parse an attribute name such as `last_price`.
    ///
    /// Unknown names are a configuration error, never silently defaulted.
    pub fn from_name(name: &str) -> Result<Self, CtkrError> {
        name.trim()
            .parse::<QuoteAttribute>()
            .map_err(|_| CtkrError::UnsupportedAttribute(name.to_string()))
    }
}

/// Result of asking one source for one quote attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteResult {
    /// The attribute value.
    Value(f64),
    /// Quote received but the attribute is missing (or treated as missing).
    NotAvailable,
    /// The connector failed; holds the failure kind name.
    Failed(String),
}

impl QuoteResult {
    /// Failure tagged with the connector error kind.
    pub fn failed(err: &ConnectorError) -> Self {
        QuoteResult::Failed(err.kind().to_string())
    }

    /// The value, if one was read.
    pub fn value(&self) -> Option<f64> {
        match self {
            QuoteResult::Value(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<TaskPanic> for QuoteResult {
    fn from(_: TaskPanic) -> Self {
        QuoteResult::Failed(TaskPanic::KIND.to_string())
    }
}

impl fmt::Display for QuoteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteResult::Value(v) => write!(f, "{}", v),
            QuoteResult::NotAvailable => f.write_str(NOT_AVAILABLE),
            QuoteResult::Failed(kind) => f.write_str(kind),
        }
    }
}

/// A number for finite values, a string otherwise: `"NaN"`/`"inf"`/`"-inf"`,
/// `"N/A"` or the failure kind.
impl Serialize for QuoteResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            QuoteResult::Value(v) if v.is_finite() => serializer.serialize_f64(*v),
            QuoteResult::Value(v) => serializer.collect_str(v),
            QuoteResult::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
            QuoteResult::Failed(kind) => serializer.serialize_str(kind),
        }
    }
}
