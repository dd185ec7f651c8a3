//! 答案提交服务 - 业务能力层
//!
//! 只负责把答案 POST 到评分端点，不关心答案从哪里来

use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::Credentials;
use crate::error::{AppError, AppResult};
use crate::utils::logging::truncate_text;

/// 评分端点返回非 JSON 时的原因
pub const INVALID_RESPONSE_REASON: &str = "Invalid server response";

/// 提交给评分端点的请求体
#[derive(Debug, Serialize)]
pub struct SubmissionPayload<'a> {
    pub email: &'a str,
    pub secret: &'a str,
    /// 原始题目页面 URL
    pub url: &'a str,
    pub answer: &'a str,
}

/// 评分端点响应体无法解析时的兜底结果
pub fn fallback_result() -> Value {
    json!({ "correct": false, "reason": INVALID_RESPONSE_REASON })
}

/// 答案提交服务
///
/// 单次 POST，不重试，使用传输层默认超时
pub struct Submitter {
    http: Client,
    credentials: Credentials,
}

impl Submitter {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            http: Client::new(),
            credentials,
        }
    }

    /// 提交答案
    ///
    /// # 参数
    /// - `submit_url`: 评分端点
    /// - `original_url`: 题目页面 URL
    /// - `answer`: 答案文本
    ///
    /// # 返回
    /// 评分端点返回的 JSON；响应体不是 JSON 时返回兜底对象
    pub async fn submit(
        &self,
        submit_url: &str,
        original_url: &str,
        answer: &str,
    ) -> AppResult<Value> {
        let payload = SubmissionPayload {
            email: &self.credentials.email,
            secret: &self.credentials.secret,
            url: original_url,
            answer,
        };

        info!("📤 提交答案到: {}", submit_url);
        debug!("答案预览: {}", truncate_text(answer, 100));

        let response = self
            .http
            .post(submit_url)
            .json(&payload)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| {
                warn!("提交请求失败: {}", e);
                AppError::submission(submit_url, e)
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::submission(submit_url, e))?;

        Ok(parse_grading_body(status.as_u16(), &body))
    }
}

/// 解析评分端点响应体，非 JSON 时降级为兜底对象
fn parse_grading_body(status: u16, body: &str) -> Value {
    match serde_json::from_str::<Value>(body) {
        Ok(result) => {
            info!("✅ 评分结果 (HTTP {}): {}", status, truncate_text(&result.to_string(), 200));
            result
        }
        Err(e) => {
            warn!(
                "评分端点返回了无法解析的响应 (HTTP {}): {} | 内容: {}",
                status,
                e,
                truncate_text(body, 200)
            );
            fallback_result()
        }
    }
}
