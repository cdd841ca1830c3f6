//! Reaction aggregation / 表情统计

use std::collections::HashMap;

use serde_json::Value;

use crate::models::{ReactionStat, RowSet};
use crate::store::{StoreConnection, StoreError};

pub const REACTION_TYPE_COLUMN: &str = "reac_type";

/// Reaction counts by type for a profile, most frequent first / 按类型统计表情次数
pub async fn fetch_reaction_stats(
    conn: &mut dyn StoreConnection,
    uid: &str,
) -> Result<Vec<ReactionStat>, StoreError> {
    conn.reaction_counts(uid).await
}

/// Same grouping over already-fetched reaction rows / 对已获取的行做同样的分组
///
/// Ties keep first-appearance order.
pub fn count_reaction_types(reactions: &RowSet) -> Vec<ReactionStat> {
    let Some(col) = reactions.column_index(REACTION_TYPE_COLUMN) else {
        return Vec::new();
    };

    let mut order: Vec<Option<String>> = Vec::new();
    let mut counts: HashMap<Option<String>, i64> = HashMap::new();

    for row in &reactions.rows {
        let key = match row.get(col) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };
        let counter = counts.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            0
        });
        *counter += 1;
    }

    let mut stats: Vec<ReactionStat> = order
        .into_iter()
        .map(|reaction_type| {
            let count = counts[&reaction_type];
            ReactionStat { reaction_type, count }
        })
        .collect();
    // sort_by is stable
    stats.sort_by(|a, b| b.count.cmp(&a.count));
    stats
}
