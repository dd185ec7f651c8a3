//! 解题服务 - 业务能力层

use std::sync::Arc;

use tracing::{debug, info};

use crate::clients::LanguageModel;
use crate::error::AppResult;
use crate::utils::logging::truncate_text;

/// 解题服务
///
/// 不做答案格式校验，模型输出去除首尾空白后原样返回
pub struct QuizSolver {
    model: Arc<dyn LanguageModel>,
}

impl QuizSolver {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub fn prompt_for(question: &str) -> String {
        format!("Answer this clearly and correctly: {question}")
    }

    /// 求解题目
    pub async fn solve(&self, question: &str) -> AppResult<String> {
        debug!("请求模型解题: {}", truncate_text(question, 80));

        let answer = self
            .model
            .complete(&Self::prompt_for(question))
            .await?
            .trim()
            .to_string();

        info!("✓ 模型给出答案: {}", truncate_text(&answer, 80));
        Ok(answer)
    }
}
