use serde::Serialize;

use crate::models::referral::{PackStatus, RecordId, ReferralRecord};

/// Node of a pack's sponsorship tree. Generation 0 is the synthetic root
/// standing for the pack owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub name: String,
    pub generation: usize,
    pub user_id: Option<RecordId>,
    pub sponsor_id: Option<RecordId>,
    pub status: Option<PackStatus>,
    pub commission_usd: f64,
    pub commission_cdf: f64,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn root(label: &str) -> Self {
        Self {
            name: label.to_string(),
            generation: 0,
            user_id: None,
            sponsor_id: None,
            status: None,
            commission_usd: 0.0,
            commission_cdf: 0.0,
            children: Vec::new(),
        }
    }

    pub fn from_record(record: &ReferralRecord, generation: usize) -> Self {
        Self {
            name: record.name.clone(),
            generation,
            user_id: record.node_id().cloned(),
            sponsor_id: record.sponsor_id.clone(),
            status: record.pack_status,
            commission_usd: record.commission_usd(),
            commission_cdf: record.commission_cdf(),
            children: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.generation == 0
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of nodes below this one.
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }

    /// Depth-first, pre-order search by user id.
    pub fn find(&self, user_id: &RecordId) -> Option<&TreeNode> {
        if self.user_id.as_ref() == Some(user_id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(user_id))
    }

    /// Every node below this one, pre-order.
    pub fn descendants(&self) -> Vec<&TreeNode> {
        let mut out = Vec::new();
        let mut stack: Vec<&TreeNode> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }
}
