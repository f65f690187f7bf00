use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(CouponId);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    pub barcode: String,
    #[serde(default)]
    pub is_used: bool,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub scanned_at: DateTime<Utc>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub used_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl Coupon {
    /// Human readable amount, e.g. `0.25 EUR`, when the backend knows the value.
    pub fn amount_label(&self) -> Option<String> {
        let value = self.value?;
        Some(match self.currency.as_deref() {
            Some(currency) => format!("{value:.2} {currency}"),
            None => format!("{value:.2}"),
        })
    }
}

/// Server-side filter for the coupon list, sent as the `used` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CouponFilter {
    #[default]
    All,
    Unused,
    Used,
}

impl CouponFilter {
    pub fn used_param(self) -> Option<bool> {
        match self {
            CouponFilter::All => None,
            CouponFilter::Unused => Some(false),
            CouponFilter::Used => Some(true),
        }
    }

    pub fn matches(self, coupon: &Coupon) -> bool {
        match self.used_param() {
            None => true,
            Some(used) => coupon.is_used == used,
        }
    }
}

/// Accepts RFC 3339 timestamps as well as the naive ISO-8601 form the backend
/// emits for `utcnow()` values, which are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .map(|naive| naive.and_utc())
        .map_err(|err| format!("invalid timestamp '{raw}': {err}"))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

// Decimal columns arrive either as JSON numbers or as strings like "0.25".
fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawAmount>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawAmount::Number(value)) => Ok(Some(value)),
        Some(RawAmount::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|err| serde::de::Error::custom(format!("invalid amount '{text}': {err}"))),
    }
}
