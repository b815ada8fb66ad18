//! SimpleMarketplace domain types.
//!
//! Listing read-model, entry-function payloads, and the APT <-> minor unit
//! conversion. Prices are held on chain as integers scaled by 100; this module
//! is the only place that scaling happens.

use serde::{Deserialize, Deserializer, Serialize};

/// Move module name of the marketplace program.
pub const MODULE_NAME: &str = "SimpleMarketplace";

/// Struct tag suffix of an on-chain listing resource.
pub const LISTING_RESOURCE: &str = "SimpleMarketplace::ListedNFT";

/// Minor units per displayed APT.
pub const MINOR_UNITS: u64 = 100;

/// A listing as shown in the gallery. Rebuilt on every fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nft {
    pub creator: String,
    /// Price in minor units.
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub price: u64,
    pub name: String,
    pub is_listed: bool,
}

impl Nft {
    /// Price formatted from the integer amount, e.g. `1.50 APT`.
    pub fn format_price(&self) -> String {
        format!(
            "{}.{:02} APT",
            self.price / MINOR_UNITS,
            self.price % MINOR_UNITS
        )
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_listed {
            "Listed"
        } else {
            "Sold"
        }
    }
}

/// Form input for a new listing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NftDraft {
    pub name: String,
    /// Price in APT, as typed.
    pub price: f64,
}

/// One `{type, data}` entry from an account's resource list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub data: serde_json::Value,
}

/// Entry-function transaction payload handed to the wallet for signing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryFunctionPayload {
    #[serde(rename = "type")]
    pub payload_type: String,
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<serde_json::Value>,
}

impl EntryFunctionPayload {
    fn entry(module_address: &str, entry_point: &str, arguments: Vec<serde_json::Value>) -> Self {
        Self {
            payload_type: "entry_function_payload".to_string(),
            function: format!("{}::{}::{}", module_address, MODULE_NAME, entry_point),
            type_arguments: Vec::new(),
            arguments,
        }
    }

    /// Arguments rendered as plain strings (the wire form for `u64` and `address`).
    pub fn string_arguments(&self) -> Vec<String> {
        self.arguments
            .iter()
            .map(|a| match a {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}

/// `list_nft(name: String, price: u64)`. The price goes over the wire as a string.
pub fn list_nft_payload(
    module_address: &str,
    name: &str,
    price_minor: u64,
) -> EntryFunctionPayload {
    EntryFunctionPayload::entry(
        module_address,
        "list_nft",
        vec![
            serde_json::Value::String(name.to_string()),
            serde_json::Value::String(price_minor.to_string()),
        ],
    )
}

/// `buy_nft(creator: address)`.
pub fn buy_nft_payload(module_address: &str, creator: &str) -> EntryFunctionPayload {
    EntryFunctionPayload::entry(
        module_address,
        "buy_nft",
        vec![serde_json::Value::String(creator.to_string())],
    )
}

/// Convert an APT amount to minor units, truncating past the second decimal.
///
/// Works on the decimal text of the value rather than multiplying floats, so
/// `0.29` yields `29` and not `28`.
pub fn to_minor_units(price: f64) -> Result<u64, PriceError> {
    if !price.is_finite() {
        return Err(PriceError::NotFinite);
    }
    if price < 0.0 {
        return Err(PriceError::Negative(price));
    }
    if price == 0.0 {
        return Ok(0);
    }

    // f64 Display never uses exponent notation.
    let text = price.to_string();
    let (whole, frac) = match text.find('.') {
        Some(dot) => (&text[..dot], &text[dot + 1..]),
        None => (text.as_str(), ""),
    };

    let whole_val: u64 = whole.parse().map_err(|_| PriceError::TooLarge(price))?;
    let frac_padded = format!("{:0<2}", frac);
    let frac_val: u64 = frac_padded[..2]
        .parse()
        .map_err(|_| PriceError::TooLarge(price))?;

    whole_val
        .checked_mul(MINOR_UNITS)
        .and_then(|v| v.checked_add(frac_val))
        .ok_or(PriceError::TooLarge(price))
}

/// Decode listing resources, keeping query order. Any malformed listing fails
/// the whole batch.
pub fn decode_listings(resources: &[AccountResource]) -> Result<Vec<Nft>, DecodeError> {
    resources
        .iter()
        .filter(|r| r.resource_type.contains(LISTING_RESOURCE))
        .map(|r| {
            serde_json::from_value::<Nft>(r.data.clone()).map_err(|e| DecodeError::Listing {
                resource_type: r.resource_type.clone(),
                source: e,
            })
        })
        .collect()
}

/// Shorten an address for display: `0xe9c0...d1d6`.
pub fn short_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    let head: String = address.chars().take(6).collect();
    let tail: String = address
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{}...{}", head, tail)
}

/// Compare two account addresses ignoring prefix, case and leading zeros.
pub fn same_address(a: &str, b: &str) -> bool {
    fn normalize(addr: &str) -> String {
        let addr = addr.trim();
        let hex = addr
            .strip_prefix("0x")
            .or_else(|| addr.strip_prefix("0X"))
            .unwrap_or(addr);
        hex.trim_start_matches('0').to_ascii_lowercase()
    }
    if a.trim().is_empty() || b.trim().is_empty() {
        return false;
    }
    normalize(a) == normalize(b)
}

/// Move `u64` values arrive as JSON strings; accept plain numbers too.
fn u64_from_str_or_num<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PriceError {
    #[error("Price must be a number")]
    NotFinite,

    #[error("Price cannot be negative: {0}")]
    Negative(f64),

    #[error("Price is too large: {0}")]
    TooLarge(f64),
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Malformed listing resource {resource_type}: {source}")]
    Listing {
        resource_type: String,
        #[source]
        source: serde_json::Error,
    },
}
