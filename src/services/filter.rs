use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::date_utils::{DateField, DateRange};
use crate::models::{PackStatus, ReferralRecord};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
    Expired,
}

impl FromStr for StatusFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "expired" => Ok(Self::Expired),
            _ => Err(()),
        }
    }
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Expired => "expired",
        }
    }

    fn status(&self) -> Option<PackStatus> {
        match self {
            Self::All => None,
            Self::Active => Some(PackStatus::Active),
            Self::Inactive => Some(PackStatus::Inactive),
            Self::Expired => Some(PackStatus::Expired),
        }
    }
}

/// Filter state of the referrals table. Dates stay as the user typed them and
/// are normalized when the filter runs; a range is only applied when both
/// bounds parse.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterSpec {
    pub search_term: String,
    pub status_filter: StatusFilter,
    pub date_field: DateField,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl FilterSpec {
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn status(mut self, status: StatusFilter) -> Self {
        self.status_filter = status;
        self
    }

    pub fn date_range(
        mut self,
        field: DateField,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        self.date_field = field;
        self.start_date = Some(start.into());
        self.end_date = Some(end.into());
        self
    }

    pub fn resolved_range(&self) -> Option<DateRange> {
        DateRange::resolve(self.start_date.as_deref(), self.end_date.as_deref())
    }

    /// True when at least one predicate can exclude a record.
    pub fn is_active(&self) -> bool {
        !self.search_term.trim().is_empty()
            || self.status_filter != StatusFilter::All
            || self.resolved_range().is_some()
    }
}

/// A `FilterSpec` with its search term and date bounds resolved once.
#[derive(Debug, Clone)]
pub struct RecordMatcher {
    needle: String,
    status: StatusFilter,
    date_field: DateField,
    range: Option<DateRange>,
    now: DateTime<Utc>,
}

impl RecordMatcher {
    pub fn new(spec: &FilterSpec, now: DateTime<Utc>) -> Self {
        Self {
            needle: spec.search_term.trim().to_lowercase(),
            status: spec.status_filter,
            date_field: spec.date_field,
            range: spec.resolved_range(),
            now,
        }
    }

    pub fn matches(&self, record: &ReferralRecord) -> bool {
        self.matches_search(record) && self.matches_status(record) && self.matches_range(record)
    }

    fn matches_search(&self, record: &ReferralRecord) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        let contains = |text: &str| text.to_lowercase().contains(&self.needle);
        contains(&record.name)
            || contains(&record.referral_code)
            || record.pack_name.as_deref().is_some_and(contains)
    }

    fn matches_status(&self, record: &ReferralRecord) -> bool {
        match self.status {
            StatusFilter::All => true,
            StatusFilter::Expired => {
                record.pack_status == Some(PackStatus::Expired) || record.is_past_expiry(self.now)
            }
            other => record.pack_status == other.status(),
        }
    }

    fn matches_range(&self, record: &ReferralRecord) -> bool {
        let Some(range) = self.range else {
            return true;
        };
        record
            .date_for(self.date_field)
            .is_some_and(|instant| range.contains(instant))
    }
}

/// Records of one generation that pass every active predicate, in input order.
pub fn filter_records<'a, I>(records: I, spec: &FilterSpec) -> Vec<&'a ReferralRecord>
where
    I: IntoIterator<Item = &'a ReferralRecord>,
{
    filter_records_at(records, spec, Utc::now())
}

/// Same as `filter_records` with an explicit clock for expiry checks.
pub fn filter_records_at<'a, I>(
    records: I,
    spec: &FilterSpec,
    now: DateTime<Utc>,
) -> Vec<&'a ReferralRecord>
where
    I: IntoIterator<Item = &'a ReferralRecord>,
{
    let matcher = RecordMatcher::new(spec, now);
    let mut total = 0usize;
    let matched: Vec<&ReferralRecord> = records
        .into_iter()
        .inspect(|_| total += 1)
        .filter(|record| matcher.matches(record))
        .collect();

    debug!(
        total,
        matched = matched.len(),
        status = spec.status_filter.as_str(),
        date_field = spec.date_field.as_str(),
        "Filtered referrals"
    );

    matched
}
