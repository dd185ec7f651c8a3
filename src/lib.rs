//! # Quiz Bridge
//!
//! 给定题目页面 URL，渲染页面、抽取题目、调用模型求解，并把答案提交到评分端点
//!
//! ## 架构设计
//!
//! ### ① 基础设施层
//! - `browser/` - 无头浏览器渲染（每次请求启动并关闭一个浏览器）
//! - `clients/` - OpenAI 兼容的 LLM 客户端
//!
//! ### ② 业务能力层（Services）
//! - `QuizExtractor` - 从 HTML 中抽取题目描述
//! - `QuizSolver` - 求解题目
//! - `Submitter` - 提交答案
//!
//! ### ③ 流程层（Workflow）
//! - `QuizFlow` - 校验密钥 → 渲染 → 抽取 → 求解 → 提交
//!
//! ### ④ 接口层
//! - `api/` - axum 路由，`GET /` 存活探针，`POST /` 答题
//! - `app` - 监听端口和优雅退出
//!
//! ## 模块结构

pub mod api;
pub mod app;
pub mod browser;
pub mod clients;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use browser::{HeadlessRenderer, PageRenderer};
pub use clients::{LanguageModel, LlmClient};
pub use config::{Config, Credentials};
pub use error::{AppError, AppResult};
pub use models::{QuizDescriptor, QuizRequest};
pub use workflow::{QuizCtx, QuizFlow};
