//! In-memory store that records every lookup it serves / 测试用内存存储

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::{DataStore, Lookup, StoreConnection, StoreError};
use crate::models::{ReactionStat, RowSet};
use crate::search::reactions::count_reaction_types;

#[derive(Default)]
struct Shared {
    tables: HashMap<&'static str, RowSet>,
    fail_on: Option<Lookup>,
    fail_reactions: bool,
    fail_connect: bool,
    lookups: Mutex<Vec<(Lookup, String)>>,
    reaction_queries: AtomicUsize,
    opened: AtomicUsize,
    released: AtomicUsize,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn shared_mut(&mut self) -> &mut Shared {
        Arc::get_mut(&mut self.shared).expect("configure MemoryStore before cloning it")
    }

    pub fn with_table(mut self, table: &'static str, rows: RowSet) -> Self {
        self.shared_mut().tables.insert(table, rows);
        self
    }

    pub fn failing_on(mut self, lookup: Lookup) -> Self {
        self.shared_mut().fail_on = Some(lookup);
        self
    }

    pub fn failing_reactions(mut self) -> Self {
        self.shared_mut().fail_reactions = true;
        self
    }

    pub fn failing_connect(mut self) -> Self {
        self.shared_mut().fail_connect = true;
        self
    }

    pub fn lookups(&self) -> Vec<(Lookup, String)> {
        self.shared.lookups.lock().clone()
    }

    pub fn reaction_queries(&self) -> usize {
        self.shared.reaction_queries.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.shared.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.shared.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn connect(&self) -> Result<Box<dyn StoreConnection>, StoreError> {
        if self.shared.fail_connect {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        self.shared.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryConnection { shared: self.shared.clone() }))
    }
}

struct MemoryConnection {
    shared: Arc<Shared>,
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.shared.released.fetch_add(1, Ordering::SeqCst);
    }
}

fn filter_rows(rows: &RowSet, column: &str, key: &str) -> RowSet {
    let Some(col) = rows.column_index(column) else {
        return RowSet::new(rows.columns.clone(), Vec::new());
    };
    let matching = rows
        .rows
        .iter()
        .filter(|row| match row.get(col) {
            Some(Value::String(s)) => s == key,
            Some(other) => other.to_string() == key,
            None => false,
        })
        .cloned()
        .collect();
    RowSet::new(rows.columns.clone(), matching)
}

#[async_trait]
impl StoreConnection for MemoryConnection {
    async fn select(&mut self, lookup: Lookup, key: &str) -> Result<RowSet, StoreError> {
        self.shared.lookups.lock().push((lookup, key.to_string()));
        if self.shared.fail_on == Some(lookup) {
            return Err(StoreError::Unavailable(format!("{} is offline", lookup.table())));
        }
        Ok(self
            .shared
            .tables
            .get(lookup.table())
            .map(|rows| filter_rows(rows, lookup.key_column(), key))
            .unwrap_or_default())
    }

    async fn reaction_counts(&mut self, uid: &str) -> Result<Vec<ReactionStat>, StoreError> {
        self.shared.reaction_queries.fetch_add(1, Ordering::SeqCst);
        if self.shared.fail_reactions {
            return Err(StoreError::Unavailable("reactions is offline".into()));
        }
        let rows = self
            .shared
            .tables
            .get(Lookup::Reactions.table())
            .map(|rows| filter_rows(rows, Lookup::Reactions.key_column(), uid))
            .unwrap_or_default();
        Ok(count_reaction_types(&rows))
    }
}
