use std::collections::BTreeMap;

use crate::query::dependents::DependentRecord;

/// All dependents found at one depth, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthTier {
    pub depth: usize,
    pub packages: Vec<String>,
}

/// Partition search results into tiers, ascending by depth.
///
/// Depths with no members produce no tier. Within a tier, packages keep the order they have
/// in `records`.
pub fn group_by_depth(records: &[DependentRecord]) -> Vec<DepthTier> {
    let mut tiers: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for record in records {
        tiers
            .entry(record.depth)
            .or_default()
            .push(record.name.clone());
    }
    tiers
        .into_iter()
        .map(|(depth, packages)| DepthTier { depth, packages })
        .collect()
}
