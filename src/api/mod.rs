//! HTTP 接口层
//!
//! - `GET /`  存活探针
//! - `POST /` 完整答题流程

pub mod routes;

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::workflow::QuizFlow;

/// 所有请求共享的只读状态
#[derive(Clone)]
pub struct AppState {
    pub flow: Arc<QuizFlow>,
    /// 请求序号，只用于日志
    pub request_counter: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(flow: QuizFlow) -> Self {
        Self {
            flow: Arc::new(flow),
            request_counter: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// 构建路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::health).post(routes::solve_quiz))
        .with_state(state)
}
