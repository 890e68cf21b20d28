use serde::Serialize;

use crate::date_utils::format_day;
use crate::models::ReferralRecord;

/// Column headers, in the order of `ExportRow`'s fields.
pub const EXPORT_COLUMNS: &[&str] = &[
    "Generation",
    "Name",
    "Referral code",
    "Pack",
    "Status",
    "Purchase date",
    "Expiry date",
    "Commission (USD)",
    "Commission (CDF)",
];

/// One referral flattened for a spreadsheet writer. Dates are `DD/MM/YYYY`
/// or empty when they do not parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub generation: usize,
    pub name: String,
    pub referral_code: String,
    pub pack_name: String,
    pub status: String,
    pub purchase_date: String,
    pub expiry_date: String,
    pub commission_usd: f64,
    pub commission_cdf: f64,
}

impl ExportRow {
    pub fn from_record(record: &ReferralRecord, generation: usize) -> Self {
        Self {
            generation,
            name: record.name.clone(),
            referral_code: record.referral_code.clone(),
            pack_name: record.pack_name.clone().unwrap_or_default(),
            status: record.status_label().to_string(),
            purchase_date: record.purchase_instant().map(format_day).unwrap_or_default(),
            expiry_date: record.expiry_instant().map(format_day).unwrap_or_default(),
            commission_usd: record.commission_usd(),
            commission_cdf: record.commission_cdf(),
        }
    }
}

pub fn export_rows<'a, I>(records: I, generation: usize) -> Vec<ExportRow>
where
    I: IntoIterator<Item = &'a ReferralRecord>,
{
    records
        .into_iter()
        .map(|record| ExportRow::from_record(record, generation))
        .collect()
}
