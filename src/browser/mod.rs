//! 浏览器层
//!
//! 只负责"把 URL 渲染成 HTML"，不认识题目

pub mod headless;

use async_trait::async_trait;

use crate::error::AppResult;

pub use headless::HeadlessRenderer;

/// 页面渲染能力
///
/// 生产环境由 [`HeadlessRenderer`] 实现，测试中可替换为固定 HTML
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// 渲染页面并返回执行完脚本后的完整 HTML
    async fn render(&self, url: &str) -> AppResult<String>;
}
