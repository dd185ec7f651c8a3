use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// 调用方提交的请求体
///
/// 未识别的额外字段会被忽略
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct QuizRequest {
    pub email: String,
    pub secret: String,
    /// 题目页面 URL
    pub url: String,
}

/// 题目描述
///
/// 由模型从渲染后的页面中抽取，模型输出的 JSON 使用 `submit_url` 作为键名
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QuizDescriptor {
    /// 题目文本
    pub question: String,
    /// 答案提交地址
    #[serde(rename = "submit_url")]
    pub submission_url: String,
    /// 辅助数据来源，可能为空
    pub data_sources: Vec<String>,
}

impl QuizDescriptor {
    /// 从模型输出的 JSON 对象构建题目描述
    ///
    /// `question` 和 `submit_url` 缺失或为空时返回 `MissingField`；
    /// `data_sources` 缺失时为空列表，非字符串元素保留其 JSON 文本
    pub fn from_value(value: &Value) -> AppResult<Self> {
        let question = required_str(value, "question")?;
        let submission_url = required_str(value, "submit_url")?;

        let data_sources = match value.get("data_sources") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        };

        Ok(Self {
            question,
            submission_url,
            data_sources,
        })
    }
}

fn required_str(value: &Value, field: &'static str) -> AppResult<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .ok_or(AppError::MissingField { field })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_full() {
        let value = json!({
            "question": "2+2?",
            "submit_url": "https://x/submit",
            "data_sources": ["https://x/data.csv", {"kind": "api"}]
        });

        let descriptor = QuizDescriptor::from_value(&value).unwrap();
        assert_eq!(descriptor.question, "2+2?");
        assert_eq!(descriptor.submission_url, "https://x/submit");
        assert_eq!(
            descriptor.data_sources,
            vec!["https://x/data.csv".to_string(), r#"{"kind":"api"}"#.to_string()]
        );
    }

    #[test]
    fn test_missing_data_sources_defaults_to_empty() {
        let value = json!({ "question": "q", "submit_url": "https://x" });

        let descriptor = QuizDescriptor::from_value(&value).unwrap();
        assert!(descriptor.data_sources.is_empty());
    }

    #[test]
    fn test_missing_question_is_missing_field() {
        let value = json!({ "submit_url": "https://x" });

        let err = QuizDescriptor::from_value(&value).unwrap_err();
        assert!(matches!(err, AppError::MissingField { field: "question" }));
    }

    #[test]
    fn test_empty_submit_url_is_missing_field() {
        let value = json!({ "question": "q", "submit_url": "  " });

        let err = QuizDescriptor::from_value(&value).unwrap_err();
        assert!(matches!(err, AppError::MissingField { field: "submit_url" }));
    }

    #[test]
    fn test_serializes_with_submit_url_key() {
        let descriptor = QuizDescriptor {
            question: "q".into(),
            submission_url: "https://x".into(),
            data_sources: vec![],
        };

        assert_eq!(
            serde_json::to_value(&descriptor).unwrap(),
            json!({ "question": "q", "submit_url": "https://x", "data_sources": [] })
        );
    }

    #[test]
    fn test_request_ignores_extra_fields() {
        let request: QuizRequest = serde_json::from_value(json!({
            "email": "a@b.c",
            "secret": "s",
            "url": "https://quiz",
            "extra": 1
        }))
        .unwrap();

        assert_eq!(request.url, "https://quiz");
    }
}
