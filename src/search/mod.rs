//! Profile search core / 账号搜索核心
//!
//! Validates the uid / phone form, runs the lookups on one request-scoped
//! connection and assembles the [`ResultBundle`] handed to the presentation
//! layer.

pub mod lookup;
pub mod reactions;
pub mod summary;
pub mod validate;

pub use lookup::{lookup_by_identifier, lookup_by_phone};
pub use reactions::{count_reaction_types, fetch_reaction_stats};
pub use summary::summarize_profile_activity;
pub use validate::{validate_inputs, SearchMode, ValidationError};

use crate::models::{ActivitySummary, Notice, NoticeLevel, ReactionStat, ResultBundle, TableResults};
use crate::store::{DataStore, Lookup, StoreError};

pub const DATA_STORE_FAILURE_MESSAGE: &str =
    "An error occurred while fetching data. Please try again later.";

/// Results of a successful lookup, before they are merged into the bundle
#[derive(Default)]
struct SearchData {
    tables: TableResults,
    profile_summary: Option<ActivitySummary>,
    reaction_stats: Vec<ReactionStat>,
}

/// Handle one search submission / 处理一次搜索请求
///
/// Never fails: validation problems and store errors become the bundle's
/// message. The store is not touched when validation fails.
pub async fn run_search(store: &dyn DataStore, uid: &str, phone: &str) -> ResultBundle {
    let uid = uid.trim();
    let phone = phone.trim();
    let mut bundle = ResultBundle::echo(uid, phone);

    let mode = match validate_inputs(uid, phone) {
        Ok(mode) => mode,
        Err(e) => {
            tracing::debug!("Rejected search input: {:?}", e);
            bundle.message = Some(Notice::new(NoticeLevel::Warning, e.to_string()));
            return bundle;
        }
    };

    match execute(store, &mode).await {
        Ok(data) => {
            bundle.tables = data.tables;
            bundle.profile_summary = data.profile_summary;
            bundle.reaction_stats = data.reaction_stats;
        }
        Err(e) => {
            tracing::error!("Database error while processing request: {}", e);
            bundle.message = Some(Notice::new(NoticeLevel::Danger, DATA_STORE_FAILURE_MESSAGE));
        }
    }

    bundle
}

async fn execute(store: &dyn DataStore, mode: &SearchMode) -> Result<SearchData, StoreError> {
    // Dropped on every return path, which hands the connection back / 任何返回路径都会释放连接
    let mut conn = store.connect().await?;

    match mode {
        SearchMode::ByPhone(phone) => {
            let rows = lookup_by_phone(conn.as_mut(), phone).await?;
            let mut tables = TableResults::new();
            tables.insert(Lookup::PhoneByNumber.table(), rows);
            Ok(SearchData {
                tables,
                ..Default::default()
            })
        }
        SearchMode::ByIdentifier(uid) => {
            let tables = lookup_by_identifier(conn.as_mut(), uid).await?;
            let profile_summary = summarize_profile_activity(&tables);
            let reaction_stats = fetch_reaction_stats(conn.as_mut(), uid).await?;
            Ok(SearchData {
                tables,
                profile_summary: Some(profile_summary),
                reaction_stats,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RowSet;
    use crate::store::testing::MemoryStore;
    use serde_json::json;

    fn dataset() -> MemoryStore {
        MemoryStore::new()
            .with_table(
                "profiles",
                RowSet::new(
                    vec!["profile_id".into(), "name".into()],
                    vec![vec![json!("42"), json!("Ann Example")], vec![json!("7"), json!("Bob")]],
                ),
            )
            .with_table(
                "posts",
                RowSet::new(
                    vec!["post_id".into(), "post_user_id".into()],
                    vec![
                        vec![json!(1), json!("42")],
                        vec![json!(2), json!("42")],
                        vec![json!(3), json!("42")],
                        vec![json!(4), json!("7")],
                    ],
                ),
            )
            .with_table(
                "comments",
                RowSet::new(vec!["com_id".into(), "com_user_id".into()], vec![vec![json!(1), json!("7")]]),
            )
            .with_table(
                "reactions",
                RowSet::new(
                    vec!["reac_user_id".into(), "reac_type".into()],
                    vec![
                        vec![json!("42"), json!("like")],
                        vec![json!("42"), json!("love")],
                        vec![json!("42"), json!("like")],
                        vec![json!("42"), json!("like")],
                        vec![json!("42"), json!("haha")],
                    ],
                ),
            )
            .with_table(
                "fbphone",
                RowSet::new(
                    vec!["uid".into(), "eightdigitnumbers".into()],
                    vec![vec![json!("42"), json!("12345678")]],
                ),
            )
    }

    #[tokio::test]
    async fn test_identifier_search_fills_everything() {
        let store = dataset();
        let bundle = run_search(&store, " 42 ", "").await;

        assert_eq!(bundle.uid, "42");
        assert!(bundle.message.is_none());
        let tables: Vec<_> = bundle.tables.tables().map(|t| t.table.as_str()).collect();
        assert_eq!(tables, vec!["profiles", "posts", "comments", "reactions", "fbphone"]);
        assert_eq!(bundle.tables.get("profiles").unwrap().len(), 1);
        assert_eq!(
            bundle.profile_summary,
            Some(ActivitySummary { post_count: 3, comment_count: 0, reaction_count: 5 })
        );
        assert_eq!(bundle.reaction_stats[0], ReactionStat { reaction_type: Some("like".into()), count: 3 });
        assert_eq!(bundle.reaction_stats.len(), 3);
    }

    #[tokio::test]
    async fn test_identifier_search_never_uses_phone_number_query() {
        let store = dataset();
        run_search(&store, "42", "").await;

        let lookups: Vec<_> = store.lookups().into_iter().map(|(l, _)| l).collect();
        assert_eq!(lookups, Lookup::BY_IDENTIFIER.to_vec());
        assert_eq!(store.reaction_queries(), 1);
    }

    #[tokio::test]
    async fn test_phone_search_only_touches_phone_mapping() {
        let store = dataset();
        let bundle = run_search(&store, "", "12345678").await;

        assert_eq!(store.lookups(), vec![(Lookup::PhoneByNumber, "12345678".to_string())]);
        assert_eq!(store.reaction_queries(), 0);
        assert_eq!(bundle.tables.tables().count(), 1);
        assert_eq!(bundle.tables.get("fbphone").unwrap().len(), 1);
        assert!(bundle.profile_summary.is_none());
        assert!(bundle.reaction_stats.is_empty());
    }

    #[tokio::test]
    async fn test_phone_mapping_to_several_profiles_is_kept() {
        let store = MemoryStore::new().with_table(
            "fbphone",
            RowSet::new(
                vec!["uid".into(), "eightdigitnumbers".into()],
                vec![vec![json!("42"), json!("12345678")], vec![json!("43"), json!("12345678")]],
            ),
        );
        let bundle = run_search(&store, "", "12345678").await;
        assert_eq!(bundle.tables.get("fbphone").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_identifier_matching_several_profiles_is_kept() {
        let store = dataset().with_table(
            "profiles",
            RowSet::new(
                vec!["profile_id".into(), "name".into()],
                vec![
                    vec![json!("42"), json!("Ann Example")],
                    vec![json!("42"), json!("Ann (duplicate import)")],
                    vec![json!("7"), json!("Bob")],
                ],
            ),
        );
        let bundle = run_search(&store, "42", "").await;

        assert!(bundle.message.is_none());
        assert_eq!(bundle.tables.get("profiles").unwrap().len(), 2);
        assert_eq!(bundle.profile_summary.unwrap().post_count, 3);
    }

    #[tokio::test]
    async fn test_unknown_identifier_gives_empty_tables() {
        let store = dataset();
        let bundle = run_search(&store, "999", "").await;

        assert!(bundle.message.is_none());
        assert!(bundle.tables.tables().all(|t| t.rows.is_empty()));
        assert_eq!(bundle.profile_summary, Some(ActivitySummary::default()));
        assert!(bundle.reaction_stats.is_empty());
    }

    #[tokio::test]
    async fn test_validation_failure_skips_store() {
        let store = dataset();
        for (uid, phone, expected) in [
            ("42", "12345678", ValidationError::ConflictingInputs),
            ("  ", "", ValidationError::MissingInput),
            ("", "1234567", ValidationError::MalformedPhone),
        ] {
            let bundle = run_search(&store, uid, phone).await;
            let message = bundle.message.unwrap();
            assert_eq!(message.level, NoticeLevel::Warning);
            assert_eq!(message.text, expected.to_string());
            assert!(bundle.tables.is_empty());
        }
        assert_eq!(store.opened(), 0);
        assert!(store.lookups().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_discards_partial_results() {
        for lookup in Lookup::BY_IDENTIFIER {
            let store = dataset().failing_on(lookup);
            let bundle = run_search(&store, "42", "").await;

            assert!(bundle.tables.is_empty(), "{:?}", lookup);
            assert!(bundle.profile_summary.is_none());
            assert!(bundle.reaction_stats.is_empty());
            let message = bundle.message.unwrap();
            assert_eq!(message.level, NoticeLevel::Danger);
            assert_eq!(message.text, DATA_STORE_FAILURE_MESSAGE);
            // All five lookups still ran, the reaction query did not
            assert_eq!(store.lookups().len(), 5);
            assert_eq!(store.reaction_queries(), 0);
            assert_eq!(store.opened(), store.released());
        }
    }

    #[tokio::test]
    async fn test_reaction_failure_discards_tables() {
        let store = dataset().failing_reactions();
        let bundle = run_search(&store, "42", "").await;

        assert!(bundle.tables.is_empty());
        assert!(bundle.profile_summary.is_none());
        assert_eq!(bundle.message.unwrap().text, DATA_STORE_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn test_connect_failure() {
        let store = dataset().failing_connect();
        let bundle = run_search(&store, "", "12345678").await;

        assert_eq!(bundle.phone, "12345678");
        assert!(bundle.tables.is_empty());
        assert_eq!(bundle.message.unwrap().level, NoticeLevel::Danger);
    }

    #[tokio::test]
    async fn test_connection_released_on_success() {
        let store = dataset();
        run_search(&store, "42", "").await;
        run_search(&store, "", "12345678").await;
        assert_eq!(store.opened(), 2);
        assert_eq!(store.released(), 2);
    }
}
