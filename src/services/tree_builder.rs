//! Sponsorship tree assembly.
//!
//! Generation 1 hangs directly under a synthetic root standing for the pack
//! owner. Every later record attaches to the node whose user id equals its
//! `sponsor_id`, searched among the generations already placed. Nodes are
//! kept in an arena while linking and turned into an owned tree at the end.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{RecordId, ReferralRecord, TreeNode};

/// What happens to a record whose sponsor is not in the tree.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    #[default]
    Drop,
    AttachToRoot,
}

impl FromStr for OrphanPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "attach_to_root" | "attach-to-root" | "root" => Ok(Self::AttachToRoot),
            _ => Err(()),
        }
    }
}

impl OrphanPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::AttachToRoot => "attach_to_root",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanReason {
    MissingId,
    UnknownSponsor,
}

/// A record that could not be linked to its sponsor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Orphan {
    pub generation: usize,
    pub user_id: Option<RecordId>,
    pub sponsor_id: Option<RecordId>,
    pub name: String,
    pub reason: OrphanReason,
    /// Whether the record was placed under the root anyway.
    pub attached: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeBuild {
    pub root: TreeNode,
    pub orphans: Vec<Orphan>,
    /// Nodes placed per generation, index 0 being generation 1.
    pub attached: Vec<usize>,
}

impl TreeBuild {
    pub fn dropped_count(&self) -> usize {
        self.orphans.iter().filter(|o| !o.attached).count()
    }

    /// Nodes in the tree, root excluded.
    pub fn node_count(&self) -> usize {
        self.root.descendant_count()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilder {
    policy: OrphanPolicy,
}

impl TreeBuilder {
    pub fn new(policy: OrphanPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> OrphanPolicy {
        self.policy
    }

    /// Link `generations` (generation 1 first) under a root named
    /// `root_label`. Children keep the order of their generation's list.
    pub fn build<G>(&self, generations: &[G], root_label: &str) -> TreeBuild
    where
        G: AsRef<[ReferralRecord]>,
    {
        let mut nodes: Vec<Option<TreeNode>> = Vec::new();
        // Arena index of each node's parent; None is the root.
        let mut parents: Vec<Option<usize>> = Vec::new();
        let mut by_user: HashMap<RecordId, usize> = HashMap::new();
        let mut orphans = Vec::new();
        let mut attached = Vec::with_capacity(generations.len());

        for (offset, records) in generations.iter().enumerate() {
            let generation = offset + 1;
            let mut registered: Vec<(RecordId, usize)> = Vec::new();
            let mut placed = 0;

            for record in records.as_ref() {
                let Some(user_id) = record.node_id() else {
                    orphans.push(orphan(record, generation, OrphanReason::MissingId, false));
                    continue;
                };

                let parent = if generation == 1 {
                    None
                } else {
                    match record.sponsor_id.as_ref().and_then(|s| by_user.get(s)) {
                        Some(&index) => Some(index),
                        None => {
                            let keep = self.policy == OrphanPolicy::AttachToRoot;
                            orphans.push(orphan(
                                record,
                                generation,
                                OrphanReason::UnknownSponsor,
                                keep,
                            ));
                            if !keep {
                                continue;
                            }
                            None
                        }
                    }
                };

                let index = nodes.len();
                nodes.push(Some(TreeNode::from_record(record, generation)));
                parents.push(parent);
                registered.push((user_id.clone(), index));
                placed += 1;
            }

            // Registered only now so a record never sponsors one of its own generation.
            for (user_id, index) in registered {
                if by_user.contains_key(&user_id) {
                    debug!(%user_id, generation, "Duplicate user id, keeping first node");
                    continue;
                }
                by_user.insert(user_id, index);
            }
            attached.push(placed);
        }

        let mut root = TreeNode::root(root_label);
        // Parents always sit at a lower index than their children, so sweeping
        // backwards moves every subtree before its parent is taken.
        for index in (0..nodes.len()).rev() {
            let Some(mut node) = nodes[index].take() else {
                continue;
            };
            node.children.reverse();
            match parents[index] {
                Some(parent) => {
                    if let Some(parent_node) = nodes[parent].as_mut() {
                        parent_node.children.push(node);
                    }
                }
                None => root.children.push(node),
            }
        }
        root.children.reverse();

        for o in &orphans {
            warn!(
                generation = o.generation,
                user_id = o.user_id.as_ref().map(RecordId::as_str),
                sponsor_id = o.sponsor_id.as_ref().map(RecordId::as_str),
                attached = o.attached,
                reason = ?o.reason,
                "Referral could not be linked to its sponsor"
            );
        }
        debug!(
            generations = generations.len(),
            nodes = nodes.len(),
            orphans = orphans.len(),
            policy = self.policy.as_str(),
            "Built referral tree"
        );

        TreeBuild {
            root,
            orphans,
            attached,
        }
    }
}

fn orphan(record: &ReferralRecord, generation: usize, reason: OrphanReason, attached: bool) -> Orphan {
    Orphan {
        generation,
        user_id: record.node_id().cloned(),
        sponsor_id: record.sponsor_id.clone(),
        name: record.name.clone(),
        reason,
        attached,
    }
}

/// Build with the default policy and return only the tree.
pub fn build_tree<G>(generations: &[G], root_label: &str) -> TreeNode
where
    G: AsRef<[ReferralRecord]>,
{
    TreeBuilder::default().build(generations, root_label).root
}
