use std::sync::atomic::Ordering;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use super::AppState;
use crate::error::AppResult;
use crate::models::QuizRequest;
use crate::workflow::QuizCtx;

/// 存活探针
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "running" }))
}

/// 答题入口，成功时原样返回评分端点的 JSON
pub async fn solve_quiz(
    State(state): State<AppState>,
    Json(request): Json<QuizRequest>,
) -> AppResult<Json<Value>> {
    let request_id = state.request_counter.fetch_add(1, Ordering::Relaxed) + 1;
    let ctx = QuizCtx::new(request_id, request.url.clone());
    info!("{} 📥 收到答题请求 (email: {})", ctx, request.email);

    let result = state.flow.run(&request, &ctx).await?;
    Ok(Json(result))
}
