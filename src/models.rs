//! Result bundle types shared by the search core and the API layer
//! 搜索核心与 API 层共享的结果类型

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column names plus rows of one query result / 单个查询结果（列名 + 行）
///
/// Columns and rows live in one record so a row can never be paired with the
/// column list of another table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name / 按名称查找列位置
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Row set tagged with the table it came from / 带表名的结果集
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRows {
    pub table: String,
    #[serde(flatten)]
    pub rows: RowSet,
}

/// Per-table results of one search, in lookup order / 一次搜索的分表结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableResults(Vec<TableRows>);

impl TableResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: &str, rows: RowSet) {
        match self.0.iter_mut().find(|t| t.table == table) {
            Some(existing) => existing.rows = rows,
            None => self.0.push(TableRows {
                table: table.to_string(),
                rows,
            }),
        }
    }

    pub fn get(&self, table: &str) -> Option<&RowSet> {
        self.0.iter().find(|t| t.table == table).map(|t| &t.rows)
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableRows> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Post / comment / reaction counts for a profile / 账号活动统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub post_count: usize,
    pub comment_count: usize,
    pub reaction_count: usize,
}

/// One reaction type and how often it occurs / 单种表情的次数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionStat {
    #[serde(rename = "type")]
    pub reaction_type: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Danger,
}

/// User-facing message attached to a response / 面向用户的提示信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// Everything the presentation layer needs to render a search / 搜索结果包
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultBundle {
    pub uid: String,
    pub phone: String,
    pub tables: TableResults,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_summary: Option<ActivitySummary>,
    pub reaction_stats: Vec<ReactionStat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Notice>,
}

impl ResultBundle {
    /// Empty bundle echoing the submitted inputs / 回显输入的空结果
    pub fn echo(uid: &str, phone: &str) -> Self {
        Self {
            uid: uid.to_string(),
            phone: phone.to_string(),
            ..Default::default()
        }
    }
}
