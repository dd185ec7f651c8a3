use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 应用程序错误类型
///
/// 除 `Auth` 以外，所有错误对调用方都表现为 500
#[derive(Debug, Error)]
pub enum AppError {
    /// 请求密钥不匹配
    #[error("Invalid secret")]
    Auth,

    /// 浏览器启动、导航或读取页面失败
    #[error("页面渲染失败 ({url}): {reason}")]
    Render { url: String, reason: String },

    /// 模型输出中找不到可解析的 JSON 对象
    #[error("无法从模型输出中解析题目信息: {reason}")]
    Parse { reason: String },

    /// 题目描述缺少必需字段
    #[error("题目描述缺少字段: {field}")]
    MissingField { field: &'static str },

    /// 语言模型调用失败
    #[error("LLM 调用失败 (模型: {model}): {source}")]
    Model {
        model: String,
        #[source]
        source: BoxError,
    },

    /// 提交答案的网络请求失败或返回非 2xx
    #[error("提交答案失败 ({endpoint}): {source}")]
    Submission {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// 缺少必需的环境变量
    #[error(
        "缺少环境变量: {}。请在项目根目录创建 .env 文件并填写这些变量",
        .0.join(", ")
    )]
    MissingEnvVars(Vec<String>),

    /// 环境变量无法解析
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    InvalidEnvVar {
        var_name: String,
        value: String,
        expected_type: String,
    },

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建渲染错误
    pub fn render(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        AppError::Render {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// 创建解析错误
    pub fn parse(reason: impl Into<String>) -> Self {
        AppError::Parse {
            reason: reason.into(),
        }
    }

    /// 创建 LLM 调用错误
    pub fn model(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Model {
            model: model.into(),
            source: Box::new(source),
        }
    }

    /// 创建没有底层错误的 LLM 错误（例如返回内容为空）
    pub fn model_message(model: impl Into<String>, message: impl Into<String>) -> Self {
        let message: String = message.into();
        AppError::Model {
            model: model.into(),
            source: message.into(),
        }
    }

    /// 创建提交错误
    pub fn submission(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Submission {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            AppError::Auth => (status, Json(json!({ "detail": "Invalid secret" }))).into_response(),
            other => {
                error!("❌ 请求处理失败: {}", other);
                (status, "Internal Server Error").into_response()
            }
        }
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::Auth.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::MissingField { field: "question" }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::render("https://x", "timeout").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_env_vars_message_lists_every_name() {
        let err = AppError::MissingEnvVars(vec!["GEMINI_API_KEY".into(), "STUDENT_SECRET".into()]);
        let msg = err.to_string();

        assert!(msg.contains("GEMINI_API_KEY, STUDENT_SECRET"));
        assert!(msg.contains(".env"));
    }

    #[test]
    fn test_auth_response_is_403() {
        let response = AppError::Auth.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_response_status_matches_status_code() {
        let errors = [
            AppError::Auth,
            AppError::parse("no braces"),
            AppError::MissingField { field: "submit_url" },
            AppError::model_message("gemini-2.5-flash", "empty"),
            AppError::render("https://x", "timeout"),
        ];

        for err in errors {
            let expected = err.status_code();
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
