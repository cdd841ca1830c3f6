use axum::{extract::State, Form, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::config::DatasetCounts;
use crate::models::ResultBundle;
use crate::search::run_search;
use crate::state::AppState;

/// Search form fields; a missing field counts as empty / 搜索表单
#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub phone: String,
}

/// POST /api/search - 按 uid 或手机号搜索
pub async fn search(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SearchForm>,
) -> Json<ResultBundle> {
    Json(run_search(state.store.as_ref(), &form.uid, &form.phone).await)
}

/// GET /api/dataset/counts - 数据集规模（静态展示值）
pub async fn dataset_counts(State(state): State<Arc<AppState>>) -> Json<DatasetCounts> {
    Json(state.config.dataset_counts.clone())
}
