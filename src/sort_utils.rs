use std::cmp::Ordering;

use crate::models::{PackStatus, ReferralRecord};

/// Sort direction for table columns.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Desc,
    Asc,
}

impl SortDirection {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "asc" => Self::Asc,
            _ => Self::Desc,
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// Trait for column enums. Each sortable table defines its own column enum
/// implementing this trait.
pub trait SortableColumn: Sized + Default + Clone + PartialEq {
    /// Parse a column name as the caller supplies it.
    fn from_str(s: &str) -> Option<Self>;
}

/// Sort configuration chosen by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSort<C: SortableColumn> {
    pub column: C,
    pub direction: SortDirection,
}

impl<C: SortableColumn> TableSort<C> {
    pub fn new(column: C, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Resolve raw parameters; unknown values fall back to the defaults.
    pub fn resolve(sort_by: Option<&str>, sort_dir: Option<&str>) -> Self {
        Self {
            column: sort_by.and_then(C::from_str).unwrap_or_default(),
            direction: sort_dir.map(SortDirection::from_str).unwrap_or_default(),
        }
    }
}

impl<C: SortableColumn> Default for TableSort<C> {
    fn default() -> Self {
        Self {
            column: C::default(),
            direction: SortDirection::default(),
        }
    }
}

/// Sortable columns of the referral table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReferralSortColumn {
    Name,
    #[default]
    PurchaseDate,
    ExpiryDate,
    Status,
    CommissionUsd,
    CommissionCdf,
}

impl SortableColumn for ReferralSortColumn {
    fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "name" => Some(Self::Name),
            "purchase_date" | "purchase" => Some(Self::PurchaseDate),
            "expiry_date" | "expiry" => Some(Self::ExpiryDate),
            "status" => Some(Self::Status),
            "commission_usd" | "usd" => Some(Self::CommissionUsd),
            "commission_cdf" | "cdf" => Some(Self::CommissionCdf),
            _ => None,
        }
    }
}

/// Stable in-place sort of a filtered set. Records without a value for the
/// sort key (unparseable date, unknown status) stay at the end in both
/// directions.
pub fn sort_records(records: &mut [&ReferralRecord], sort: &TableSort<ReferralSortColumn>) {
    let direction = sort.direction;
    match sort.column {
        ReferralSortColumn::Name => records.sort_by(|a, b| {
            direction.apply(a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        }),
        ReferralSortColumn::PurchaseDate => {
            records.sort_by_cached_key(|r| SortKey::new(r.purchase_instant(), direction))
        }
        ReferralSortColumn::ExpiryDate => {
            records.sort_by_cached_key(|r| SortKey::new(r.expiry_instant(), direction))
        }
        ReferralSortColumn::Status => {
            records.sort_by_key(|r| SortKey::<PackStatus>::new(r.pack_status, direction))
        }
        ReferralSortColumn::CommissionUsd => records.sort_by(|a, b| {
            direction.apply(a.commission_usd().total_cmp(&b.commission_usd()))
        }),
        ReferralSortColumn::CommissionCdf => records.sort_by(|a, b| {
            direction.apply(a.commission_cdf().total_cmp(&b.commission_cdf()))
        }),
    }
}

/// Orders present values by direction and absent values after all of them.
#[derive(Debug, Clone)]
struct SortKey<K> {
    value: Option<K>,
    direction: SortDirection,
}

impl<K> SortKey<K> {
    fn new(value: Option<K>, direction: SortDirection) -> Self {
        Self { value, direction }
    }
}

impl<K: Ord> PartialEq for SortKey<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K: Ord> Eq for SortKey<K> {}

impl<K: Ord> PartialOrd for SortKey<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for SortKey<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.value, &other.value) {
            (Some(a), Some(b)) => self.direction.apply(a.cmp(b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}
