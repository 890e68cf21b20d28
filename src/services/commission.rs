use std::borrow::Borrow;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{ReferralRecord, TreeNode};

/// Per-currency commission totals over some set of records. Totals are raw
/// sums; rounding only happens in `format`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionSummary {
    pub total_usd: f64,
    pub total_cdf: f64,
    pub count: usize,
}

impl CommissionSummary {
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator,
        I::Item: Borrow<ReferralRecord>,
    {
        let mut summary = Self::default();
        for record in records {
            let record = record.borrow();
            summary.add(record.commission_usd(), record.commission_cdf());
        }
        summary
    }

    fn add(&mut self, usd: f64, cdf: f64) {
        self.total_usd += usd;
        self.total_cdf += cdf;
        self.count += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Sum USD and CDF commissions over `records`.
pub fn aggregate<I>(records: I) -> CommissionSummary
where
    I: IntoIterator,
    I::Item: Borrow<ReferralRecord>,
{
    CommissionSummary::from_records(records)
}

/// Commission totals for every node below `node`; the node itself is left
/// out so the synthetic root never counts.
pub fn aggregate_tree(node: &TreeNode) -> CommissionSummary {
    let mut summary = CommissionSummary::default();
    for descendant in node.descendants() {
        summary.add(
            commission_amount(Some(descendant.commission_usd)),
            commission_amount(Some(descendant.commission_cdf)),
        );
    }
    summary
}

/// Totals per generation (1-based) for the nodes below `node`.
pub fn aggregate_tree_by_generation(node: &TreeNode) -> BTreeMap<usize, CommissionSummary> {
    let mut totals: BTreeMap<usize, CommissionSummary> = BTreeMap::new();
    for descendant in node.descendants() {
        totals.entry(descendant.generation).or_default().add(
            commission_amount(Some(descendant.commission_usd)),
            commission_amount(Some(descendant.commission_cdf)),
        );
    }
    totals
}

/// Missing, NaN, infinite and negative amounts count as zero.
pub fn commission_amount(value: Option<f64>) -> f64 {
    value
        .filter(|amount| amount.is_finite() && *amount > 0.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(usd: Option<f64>, cdf: Option<f64>) -> ReferralRecord {
        ReferralRecord {
            total_commission_usd: usd,
            total_commission_cdf: cdf,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty() {
        let summary = aggregate(Vec::<ReferralRecord>::new());
        assert_eq!(summary.count, 0);
        assert_eq!(summary.total_usd, 0.0);
        assert_eq!(summary.total_cdf, 0.0);
        assert!(summary.is_empty());
    }

    #[test]
    fn test_sums_each_currency() {
        let records = vec![
            record(Some(10.0), Some(0.0)),
            record(Some(2.5), Some(5000.0)),
            record(None, Some(1500.0)),
        ];
        let summary = aggregate(&records);
        assert!((summary.total_usd - 12.5).abs() < 1e-9);
        assert!((summary.total_cdf - 6500.0).abs() < 1e-9);
        assert_eq!(summary.count, 3);
    }

    #[test]
    fn test_nan_counts_as_zero() {
        let records = vec![
            record(Some(f64::NAN), Some(f64::INFINITY)),
            record(Some(4.0), Some(-3.0)),
        ];
        let summary = aggregate(&records);
        assert_eq!(summary.total_usd, 4.0);
        assert_eq!(summary.total_cdf, 0.0);
        assert_eq!(summary.count, 2);
    }

    #[test]
    fn test_accepts_borrowed_subsets() {
        let records = vec![record(Some(1.0), None), record(Some(2.0), None)];
        let subset: Vec<&ReferralRecord> = records
            .iter()
            .filter(|r| r.commission_usd() > 1.5)
            .collect();
        let summary = aggregate(subset.iter().copied());
        assert_eq!(summary.total_usd, 2.0);
        assert_eq!(summary.count, 1);
    }

    #[test]
    fn test_tree_excludes_root() {
        let mut root = TreeNode::root("Owner");
        root.commission_usd = 1000.0;
        let mut child = TreeNode::from_record(&record(Some(3.0), Some(10.0)), 1);
        child
            .children
            .push(TreeNode::from_record(&record(Some(2.0), None), 2));
        root.children.push(child);

        let summary = aggregate_tree(&root);
        assert_eq!(summary.total_usd, 5.0);
        assert_eq!(summary.total_cdf, 10.0);
        assert_eq!(summary.count, 2);

        let by_generation = aggregate_tree_by_generation(&root);
        assert_eq!(by_generation[&1].total_usd, 3.0);
        assert_eq!(by_generation[&2].count, 1);
    }
}
