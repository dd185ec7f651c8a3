//! 请求处理上下文
//!
//! 封装"我正在处理第几个请求、哪个题目页面"这一信息

use std::fmt::Display;

/// 请求处理上下文
#[derive(Debug, Clone)]
pub struct QuizCtx {
    /// 请求序号（仅用于日志显示）
    pub request_id: u64,

    /// 题目页面 URL
    pub url: String,
}

impl QuizCtx {
    pub fn new(request_id: u64, url: impl Into<String>) -> Self {
        Self {
            request_id,
            url: url.into(),
        }
    }
}

impl Display for QuizCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[请求 #{} {}]", self.request_id, self.url)
    }
}
