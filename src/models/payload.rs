//! Mapping from the backend's pack-referrals payload to the internal model.
//!
//! The payload is an array indexed by generation (generation 1 first), each
//! element an array of snake_case record objects. Records are mapped one at a
//! time so a single malformed entry never drops the rest of the network.

use serde::Deserialize;
use serde_json::{Number, Value};
use tracing::{debug, trace, warn};

use crate::date_utils::DateValue;
use crate::error::EngineResult;
use crate::models::referral::{PackStatus, RecordId, ReferralRecord};

/// Ids arrive as integers, integral floats (`1.0`), or strings. Any other
/// shape maps to no id instead of rejecting the record.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(Number),
    Text(String),
    Other(Value),
}

impl RawId {
    fn into_record_id(self) -> Option<RecordId> {
        match self {
            RawId::Number(number) => number_id(&number),
            RawId::Text(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| RecordId::new(text))
            }
            RawId::Other(value) => {
                trace!(value = %value, "Ignoring unusable id");
                None
            }
        }
    }
}

/// Largest integer an `f64` holds exactly.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

fn number_id(number: &Number) -> Option<RecordId> {
    if let Some(id) = number.as_i64() {
        return Some(RecordId::from(id));
    }
    if let Some(id) = number.as_u64() {
        return Some(RecordId::new(id.to_string()));
    }
    match number.as_f64() {
        Some(id) if id.fract() == 0.0 && id.abs() <= MAX_EXACT_FLOAT => {
            Some(RecordId::from(id as i64))
        }
        _ => {
            trace!(%number, "Ignoring non-integral id");
            None
        }
    }
}

/// Decimal columns arrive as JSON numbers or as strings like `"12.50"` or
/// `"1,500.00"`. Decimals must use a dot; `,` is only read as a thousands
/// separator.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
    Other(Value),
}

impl RawAmount {
    fn into_amount(self) -> Option<f64> {
        match self {
            RawAmount::Number(value) => Some(value),
            RawAmount::Text(text) => {
                let parsed = parse_amount_text(&text);
                if parsed.is_none() {
                    debug!(amount = %text, "Unreadable amount, treating as missing");
                }
                parsed
            }
            RawAmount::Other(value) => {
                trace!(value = %value, "Ignoring non-numeric amount");
                None
            }
        }
    }
}

/// Parse `1234.5`, `-1,234.50` and similar. Commas must group the integer
/// part in threes, so `"12,50"` is rejected rather than read as `1250`.
fn parse_amount_text(text: &str) -> Option<f64> {
    let text = text.trim();
    if !text.contains(',') {
        return text.parse::<f64>().ok();
    }

    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text, None),
    };
    let digits = whole.strip_prefix('-').unwrap_or(whole);
    let mut groups = digits.split(',');
    let lead = groups.next()?;
    let is_digits = |group: &str| group.bytes().all(|b| b.is_ascii_digit());
    if lead.is_empty() || lead.len() > 3 || !is_digits(lead) {
        return None;
    }
    if !groups.all(|group| group.len() == 3 && is_digits(group)) {
        return None;
    }

    let mut plain = whole.replace(',', "");
    if let Some(fraction) = fraction {
        plain.push('.');
        plain.push_str(fraction);
    }
    plain.parse::<f64>().ok()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawReferral {
    id: Option<RawId>,
    user_id: Option<RawId>,
    name: Option<String>,
    sponsor_id: Option<RawId>,
    pack_status: Option<String>,
    purchase_date: Option<Value>,
    expiry_date: Option<Value>,
    referral_code: Option<String>,
    pack_name: Option<String>,
    total_commission_usd: Option<RawAmount>,
    total_commission_cdf: Option<RawAmount>,
}

impl RawReferral {
    fn into_record(self) -> ReferralRecord {
        let pack_status = self.pack_status.as_deref().and_then(|status| {
            let parsed = status.parse::<PackStatus>().ok();
            if parsed.is_none() {
                debug!(status, "Unknown pack status");
            }
            parsed
        });

        ReferralRecord {
            id: self.id.and_then(RawId::into_record_id),
            user_id: self.user_id.and_then(RawId::into_record_id),
            name: self.name.unwrap_or_default(),
            sponsor_id: self.sponsor_id.and_then(RawId::into_record_id),
            pack_status,
            purchase_date: self.purchase_date.and_then(date_value),
            expiry_date: self.expiry_date.and_then(date_value),
            referral_code: self.referral_code.unwrap_or_default(),
            pack_name: self.pack_name.filter(|name| !name.trim().is_empty()),
            total_commission_usd: self.total_commission_usd.and_then(RawAmount::into_amount),
            total_commission_cdf: self.total_commission_cdf.and_then(RawAmount::into_amount),
        }
    }
}

fn date_value(value: Value) -> Option<DateValue> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(DateValue::Text(text)),
        Value::Null | Value::String(_) => None,
        other => {
            trace!(value = %other, "Ignoring non-string date value");
            None
        }
    }
}

/// Records for one generation plus how many raw entries were unusable.
#[derive(Debug, Default, Clone)]
pub struct ParsedGeneration {
    pub records: Vec<ReferralRecord>,
    pub skipped: usize,
}

#[derive(Debug, Default, Clone)]
pub struct ParsedGenerations {
    pub generations: Vec<Vec<ReferralRecord>>,
    pub skipped: usize,
}

/// Map one generation's raw array. Anything that is not an array counts as
/// an empty generation.
pub fn parse_generation(value: &Value) -> ParsedGeneration {
    let Some(items) = value.as_array() else {
        if !value.is_null() {
            warn!("Generation payload is not an array, treating as empty");
        }
        return ParsedGeneration::default();
    };

    let mut records = Vec::with_capacity(items.len());
    let mut skipped = 0;

    for (index, item) in items.iter().enumerate() {
        match RawReferral::deserialize(item) {
            Ok(raw) if item.is_object() => records.push(raw.into_record()),
            Ok(_) => {
                skipped += 1;
                warn!(index, "Skipping referral entry that is not an object");
            }
            Err(e) => {
                skipped += 1;
                warn!(index, error = %e, "Skipping malformed referral entry");
            }
        }
    }

    ParsedGeneration { records, skipped }
}

/// Map the full generation-indexed payload.
pub fn parse_generations(value: &Value) -> ParsedGenerations {
    let Some(items) = value.as_array() else {
        warn!("Referral payload is not an array, no generations loaded");
        return ParsedGenerations::default();
    };

    let mut result = ParsedGenerations::default();
    for item in items {
        let parsed = parse_generation(item);
        result.skipped += parsed.skipped;
        result.generations.push(parsed.records);
    }

    if result.skipped > 0 {
        warn!(skipped = result.skipped, "Referral payload mapped with skipped entries");
    }
    debug!(
        generations = result.generations.len(),
        records = result.generations.iter().map(Vec::len).sum::<usize>(),
        "Referral payload mapped"
    );

    result
}

pub fn parse_generations_str(payload: &str) -> EngineResult<ParsedGenerations> {
    let value: Value = serde_json::from_str(payload)?;
    Ok(parse_generations(&value))
}
