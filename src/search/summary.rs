use crate::models::{ActivitySummary, TableResults};
use crate::store::Lookup;

/// Count posts, comments and reactions in fetched results / 统计活动数量
pub fn summarize_profile_activity(results: &TableResults) -> ActivitySummary {
    let count = |lookup: Lookup| results.get(lookup.table()).map_or(0, |rows| rows.len());

    ActivitySummary {
        post_count: count(Lookup::Posts),
        comment_count: count(Lookup::Comments),
        reaction_count: count(Lookup::Reactions),
    }
}
