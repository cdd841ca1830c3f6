//! Lookup executor / 查询执行
//!
//! Issues the equality lookups for a validated search on a single
//! request-scoped connection.

use crate::models::{RowSet, TableResults};
use crate::store::{Lookup, StoreConnection, StoreError};

/// Phone-mapping rows for an 8-digit number / 按手机号查询映射
pub async fn lookup_by_phone(
    conn: &mut dyn StoreConnection,
    phone: &str,
) -> Result<RowSet, StoreError> {
    let rows = conn.select(Lookup::PhoneByNumber, phone).await?;
    if rows.len() > 1 {
        tracing::warn!("Phone {} maps to {} profiles", phone, rows.len());
    }
    Ok(rows)
}

/// Profile, posts, comments, reactions and phone rows for an identifier
/// 按 uid 查询五张表
///
/// Every lookup is attempted even after a failure; the first failure is
/// returned once all have run.
pub async fn lookup_by_identifier(
    conn: &mut dyn StoreConnection,
    uid: &str,
) -> Result<TableResults, StoreError> {
    let mut results = TableResults::new();
    let mut first_error = None;

    for lookup in Lookup::BY_IDENTIFIER {
        match conn.select(lookup, uid).await {
            Ok(rows) => results.insert(lookup.table(), rows),
            Err(e) => {
                tracing::warn!("Lookup on {} failed for uid {}: {}", lookup.table(), uid, e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    if let Some(e) = first_error {
        return Err(e);
    }

    if let Some(profiles) = results.get(Lookup::Profile.table()) {
        if profiles.len() > 1 {
            tracing::warn!("Identifier {} matches {} profile rows", uid, profiles.len());
        }
    }

    Ok(results)
}
