//! Per-pack snapshot of referral generations and the queries the dashboard
//! runs against it.
//!
//! A store is built from one backend fetch and replaced, never updated, on
//! the next one. Query parameters (generation tab, filters, page, sort) are
//! owned by the caller and passed in on every call.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{EngineError, EngineResult};
use crate::export::{export_rows, ExportRow};
use crate::models::payload::{parse_generations, parse_generations_str};
use crate::models::ReferralRecord;
use crate::services::commission::{
    aggregate, aggregate_tree, aggregate_tree_by_generation, CommissionSummary,
};
use crate::services::filter::{filter_records_at, FilterSpec};
use crate::services::pagination::paginate;
use crate::services::tree_builder::{OrphanPolicy, TreeBuild, TreeBuilder};
use crate::sort_utils::{sort_records, ReferralSortColumn, TableSort};

/// Generations shown by the dashboard: direct referrals and three levels below.
pub const MAX_GENERATIONS: usize = 4;

#[derive(Debug, Clone, Default)]
pub struct ReferralStore {
    generations: Vec<Vec<ReferralRecord>>,
}

impl ReferralStore {
    pub fn new(mut generations: Vec<Vec<ReferralRecord>>) -> Self {
        if generations.len() > MAX_GENERATIONS {
            warn!(
                supplied = generations.len(),
                kept = MAX_GENERATIONS,
                "Ignoring generations past the supported depth"
            );
            generations.truncate(MAX_GENERATIONS);
        }
        Self { generations }
    }

    pub fn from_payload(value: &Value) -> Self {
        Self::new(parse_generations(value).generations)
    }

    pub fn from_payload_str(payload: &str) -> EngineResult<Self> {
        Ok(Self::new(parse_generations_str(payload)?.generations))
    }

    pub fn generations(&self) -> &[Vec<ReferralRecord>] {
        &self.generations
    }

    /// Records of a 1-based generation; empty when the backend sent none.
    pub fn generation(&self, generation: usize) -> EngineResult<&[ReferralRecord]> {
        check_generation(generation)?;
        Ok(self
            .generations
            .get(generation - 1)
            .map(Vec::as_slice)
            .unwrap_or(&[]))
    }

    /// Record count per generation tab.
    pub fn generation_counts(&self) -> [usize; MAX_GENERATIONS] {
        let mut counts = [0; MAX_GENERATIONS];
        for (count, records) in counts.iter_mut().zip(&self.generations) {
            *count = records.len();
        }
        counts
    }

    pub fn is_empty(&self) -> bool {
        self.generations.iter().all(Vec::is_empty)
    }

    pub fn filtered_at(
        &self,
        generation: usize,
        spec: &FilterSpec,
        now: DateTime<Utc>,
    ) -> EngineResult<Vec<&ReferralRecord>> {
        Ok(filter_records_at(self.generation(generation)?, spec, now))
    }

    pub fn table_view(&self, query: &NetworkQuery) -> EngineResult<TableView<'_>> {
        self.table_view_at(query, Utc::now())
    }

    /// Filter, optionally sort, then page one generation. The summary covers
    /// every filtered record, not just the page.
    pub fn table_view_at(
        &self,
        query: &NetworkQuery,
        now: DateTime<Utc>,
    ) -> EngineResult<TableView<'_>> {
        let mut filtered = self.filtered_at(query.generation, &query.filter, now)?;
        if let Some(sort) = &query.sort {
            sort_records(&mut filtered, sort);
        }

        let summary = aggregate(filtered.iter().copied());
        let page = paginate(&filtered, query.page_index, query.page_size)?;

        debug!(
            generation = query.generation,
            page_index = query.page_index,
            page_size = query.page_size,
            total = page.total,
            "Built referral table view"
        );

        Ok(TableView {
            generation: query.generation,
            items: page.items.to_vec(),
            total: page.total,
            page_index: page.page_index,
            page_size: page.page_size,
            page_count: page.page_count(),
            summary,
        })
    }

    /// The whole filtered set of one generation, ready for spreadsheet columns.
    pub fn export_rows(
        &self,
        generation: usize,
        spec: &FilterSpec,
    ) -> EngineResult<Vec<ExportRow>> {
        self.export_rows_at(generation, spec, Utc::now())
    }

    pub fn export_rows_at(
        &self,
        generation: usize,
        spec: &FilterSpec,
        now: DateTime<Utc>,
    ) -> EngineResult<Vec<ExportRow>> {
        let filtered = self.filtered_at(generation, spec, now)?;
        Ok(export_rows(filtered, generation))
    }

    pub fn tree_view(&self, root_label: &str, policy: OrphanPolicy) -> TreeView {
        let tree = TreeBuilder::new(policy).build(&self.generations, root_label);
        let summary = aggregate_tree(&tree.root);
        let by_generation = aggregate_tree_by_generation(&tree.root);
        TreeView {
            tree,
            summary,
            by_generation,
        }
    }

    pub fn tree_view_with(&self, config: &Config) -> TreeView {
        self.tree_view(&config.root_label, config.orphan_policy)
    }
}

fn check_generation(generation: usize) -> EngineResult<()> {
    if (1..=MAX_GENERATIONS).contains(&generation) {
        Ok(())
    } else {
        Err(EngineError::InvalidArgument(format!(
            "generation must be between 1 and {}, got {}",
            MAX_GENERATIONS, generation
        )))
    }
}

/// Caller-owned parameters of one table query.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkQuery {
    pub generation: usize,
    pub filter: FilterSpec,
    pub page_index: usize,
    pub page_size: usize,
    pub sort: Option<TableSort<ReferralSortColumn>>,
}

impl NetworkQuery {
    pub fn new(generation: usize, page_size: usize) -> Self {
        Self {
            generation,
            filter: FilterSpec::default(),
            page_index: 0,
            page_size,
            sort: None,
        }
    }

    pub fn from_config(generation: usize, config: &Config) -> Self {
        Self::new(generation, config.page_size)
    }

    pub fn filter(mut self, filter: FilterSpec) -> Self {
        self.filter = filter;
        self
    }

    pub fn page(mut self, page_index: usize) -> Self {
        self.page_index = page_index;
        self
    }

    pub fn sorted(mut self, sort: TableSort<ReferralSortColumn>) -> Self {
        self.sort = Some(sort);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView<'a> {
    pub generation: usize,
    pub items: Vec<&'a ReferralRecord>,
    pub total: usize,
    pub page_index: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub summary: CommissionSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeView {
    pub tree: TreeBuild,
    pub summary: CommissionSummary,
    pub by_generation: BTreeMap<usize, CommissionSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordId;

    fn named(name: &str) -> ReferralRecord {
        ReferralRecord {
            id: Some(RecordId::new(name)),
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_generation_is_empty() {
        let store = ReferralStore::new(vec![vec![named("a")]]);
        assert_eq!(store.generation(1).unwrap().len(), 1);
        assert!(store.generation(3).unwrap().is_empty());
        assert_eq!(store.generation_counts(), [1, 0, 0, 0]);
    }

    #[test]
    fn test_generation_out_of_range() {
        let store = ReferralStore::default();
        assert!(matches!(
            store.generation(0),
            Err(EngineError::InvalidArgument(_))
        ));
        assert!(matches!(
            store.generation(5),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_extra_generations_truncated() {
        let store = ReferralStore::new(vec![vec![named("x")]; 6]);
        assert_eq!(store.generations().len(), MAX_GENERATIONS);
    }

    #[test]
    fn test_zero_page_size_fails() {
        let store = ReferralStore::new(vec![vec![named("a")]]);
        let err = store.table_view(&NetworkQuery::new(1, 0)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }
}
