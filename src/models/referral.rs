use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::date_utils::{normalize, DateField, DateValue};
use crate::services::commission::commission_amount;

/// Identifier as carried by the backend. Numeric and string ids with the same
/// text compare equal, so `1` and `"1"` link the same sponsor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackStatus {
    Active,
    Inactive,
    Expired,
}

impl FromStr for PackStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "expired" => Ok(Self::Expired),
            _ => Err(()),
        }
    }
}

impl PackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Expired => "expired",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Expired => "Expired",
        }
    }
}

/// One user who joined the network under some sponsor, scoped to one pack.
///
/// The generation is not stored here: it is implied by the list the record
/// was delivered in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralRecord {
    pub id: Option<RecordId>,
    pub user_id: Option<RecordId>,
    pub name: String,
    pub sponsor_id: Option<RecordId>,
    pub pack_status: Option<PackStatus>,
    pub purchase_date: Option<DateValue>,
    pub expiry_date: Option<DateValue>,
    pub referral_code: String,
    pub pack_name: Option<String>,
    pub total_commission_usd: Option<f64>,
    pub total_commission_cdf: Option<f64>,
}

impl ReferralRecord {
    /// Identifier used to link sponsors: `user_id`, falling back to `id`.
    pub fn node_id(&self) -> Option<&RecordId> {
        self.user_id.as_ref().or(self.id.as_ref())
    }

    pub fn commission_usd(&self) -> f64 {
        commission_amount(self.total_commission_usd)
    }

    pub fn commission_cdf(&self) -> f64 {
        commission_amount(self.total_commission_cdf)
    }

    pub fn purchase_instant(&self) -> Option<DateTime<Utc>> {
        normalize(self.purchase_date.as_ref())
    }

    pub fn expiry_instant(&self) -> Option<DateTime<Utc>> {
        normalize(self.expiry_date.as_ref())
    }

    pub fn date_for(&self, field: DateField) -> Option<DateTime<Utc>> {
        match field {
            DateField::Purchase => self.purchase_instant(),
            DateField::Expiry => self.expiry_instant(),
        }
    }

    /// True when the expiry date lies strictly before `now`, whatever
    /// `pack_status` says.
    pub fn is_past_expiry(&self, now: DateTime<Utc>) -> bool {
        self.expiry_instant().is_some_and(|expiry| expiry < now)
    }

    pub fn status_label(&self) -> &'static str {
        self.pack_status.map(|s| s.label()).unwrap_or("Unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_node_id_prefers_user_id() {
        let record = ReferralRecord {
            id: Some(RecordId::from(7)),
            user_id: Some(RecordId::from(42)),
            ..Default::default()
        };
        assert_eq!(record.node_id(), Some(&RecordId::from(42)));

        let record = ReferralRecord {
            id: Some(RecordId::from(7)),
            ..Default::default()
        };
        assert_eq!(record.node_id(), Some(&RecordId::from(7)));
        assert_eq!(ReferralRecord::default().node_id(), None);
    }

    #[test]
    fn test_numeric_and_text_ids_match() {
        assert_eq!(RecordId::from(12), RecordId::from("12"));
    }

    #[test]
    fn test_commission_accessors_ignore_bad_values() {
        let record = ReferralRecord {
            total_commission_usd: Some(f64::NAN),
            total_commission_cdf: None,
            ..Default::default()
        };
        assert_eq!(record.commission_usd(), 0.0);
        assert_eq!(record.commission_cdf(), 0.0);
    }

    #[test]
    fn test_past_expiry() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let record = ReferralRecord {
            expiry_date: Some("31/05/2024".into()),
            ..Default::default()
        };
        assert!(record.is_past_expiry(now));

        let record = ReferralRecord {
            expiry_date: Some("2024-06-01".into()),
            ..Default::default()
        };
        assert!(!record.is_past_expiry(now));

        let record = ReferralRecord {
            expiry_date: Some("soon".into()),
            ..Default::default()
        };
        assert!(!record.is_past_expiry(now));
    }

    #[test]
    fn test_pack_status_parse() {
        assert_eq!(" Active ".parse::<PackStatus>(), Ok(PackStatus::Active));
        assert_eq!("EXPIRED".parse::<PackStatus>(), Ok(PackStatus::Expired));
        assert!("pending".parse::<PackStatus>().is_err());
    }
}
