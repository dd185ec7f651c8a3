//! 题目抽取服务 - 业务能力层
//!
//! 让模型从渲染后的 HTML 中找出题目和提交地址

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::clients::LanguageModel;
use crate::error::{AppError, AppResult};
use crate::models::QuizDescriptor;
use crate::utils::logging::truncate_text;

/// 抽取指令，HTML 直接拼接在后面
pub const EXTRACTION_PROMPT: &str = r#"
Extract and return ONLY valid JSON:

1. question text
2. submit_url
3. any required data

Format:
{
  "question": "...",
  "submit_url": "...",
  "data_sources": []
}
"#;

/// 从模型的自由文本输出中尽力取出 JSON 对象
///
/// 取第一个 `{` 到最后一个 `}` 之间的子串解析。能容忍前后的说明文字或
/// markdown 代码块，但不能容忍对象内部的格式错误。
///
/// 已知限制：如果对象前面的文字里出现 `{`，或者后面的文字里出现 `}`，
/// 截取范围会出错并返回 `Parse` 错误。单个对象内部的嵌套对象不受影响。
pub fn extract_json_object(text: &str) -> AppResult<Value> {
    let start = text
        .find('{')
        .ok_or_else(|| AppError::parse("模型输出中没有 '{'"))?;
    let end = text
        .rfind('}')
        .ok_or_else(|| AppError::parse("模型输出中没有 '}'"))?;

    if end < start {
        return Err(AppError::parse("'}' 出现在 '{' 之前"));
    }

    serde_json::from_str(&text[start..=end])
        .map_err(|e| AppError::parse(format!("JSON 解析失败: {e}")))
}

/// 题目抽取服务
pub struct QuizExtractor {
    model: Arc<dyn LanguageModel>,
}

impl QuizExtractor {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// 从 HTML 中抽取题目描述
    pub async fn extract(&self, html: &str) -> AppResult<QuizDescriptor> {
        debug!("发送 HTML 给模型抽取题目，长度: {} 字符", html.len());

        let prompt = format!("{EXTRACTION_PROMPT}{html}");
        let output = self.model.complete(&prompt).await?;
        debug!("模型抽取输出: {}", truncate_text(&output, 300));

        let value = extract_json_object(&output).map_err(|e| {
            warn!("无法解析模型输出: {} | 输出: {}", e, truncate_text(&output, 300));
            e
        })?;

        let descriptor = QuizDescriptor::from_value(&value)?;
        info!(
            "✓ 抽取到题目: {} | 提交地址: {} | 数据来源: {} 个",
            truncate_text(&descriptor.question, 80),
            descriptor.submission_url,
            descriptor.data_sources.len()
        );

        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// 返回固定文本并记录收到的提示词
    struct CannedModel {
        output: String,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedModel {
        fn new(output: &str) -> Arc<Self> {
            Arc::new(Self {
                output: output.to_string(),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for CannedModel {
        async fn complete(&self, prompt: &str) -> AppResult<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.output.clone())
        }
    }

    #[test]
    fn test_extract_plain_object() {
        let value = extract_json_object(r#"{"a": 1}"#).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_extract_tolerates_surrounding_prose() {
        let text = r#"Here you go: {"question":"2+2?","submit_url":"https://x/submit","data_sources":[]} thanks"#;

        let value = extract_json_object(text).unwrap();
        assert_eq!(value["question"], "2+2?");
    }

    #[test]
    fn test_extract_tolerates_markdown_fence() {
        let text = "```json\n{\n  \"question\": \"q\",\n  \"submit_url\": \"https://x\"\n}\n```";

        let value = extract_json_object(text).unwrap();
        assert_eq!(value["submit_url"], "https://x");
    }

    #[test]
    fn test_extract_keeps_nested_objects() {
        let text = r#"Result: {"question":"q","submit_url":"u","data_sources":[{"url":"https://d"}]}"#;

        let value = extract_json_object(text).unwrap();
        assert_eq!(value["data_sources"][0]["url"], "https://d");
    }

    #[test]
    fn test_no_braces_is_parse_error() {
        let err = extract_json_object("I could not find a question on this page.").unwrap_err();
        assert!(matches!(err, AppError::Parse { .. }));
    }

    #[test]
    fn test_only_opening_brace_is_parse_error() {
        let err = extract_json_object("partial { output").unwrap_err();
        assert!(matches!(err, AppError::Parse { .. }));
    }

    #[test]
    fn test_reversed_braces_is_parse_error() {
        let err = extract_json_object("} nothing here {").unwrap_err();
        assert!(matches!(err, AppError::Parse { .. }));
    }

    #[test]
    fn test_malformed_interior_is_parse_error() {
        let err = extract_json_object(r#"{"question": "q", "submit_url": }"#).unwrap_err();
        assert!(matches!(err, AppError::Parse { .. }));
    }

    #[test]
    fn test_trailing_brace_in_prose_mis_slices() {
        // 对象后面的文字带 '}'，截取范围越界，属于已知限制
        let text = r#"{"question":"q","submit_url":"u"} note: use {braces} carefully"#;

        assert!(extract_json_object(text).is_err());
    }

    #[test]
    fn test_empty_output_is_parse_error() {
        assert!(matches!(
            extract_json_object(""),
            Err(AppError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn test_extract_descriptor_from_wrapped_output() {
        let model = CannedModel::new(
            r#"Here you go: {"question":"2+2?","submit_url":"https://x/submit","data_sources":[]} thanks"#,
        );
        let extractor = QuizExtractor::new(model.clone());

        let descriptor = extractor.extract("<html><body>2+2?</body></html>").await.unwrap();

        assert_eq!(
            descriptor,
            QuizDescriptor {
                question: "2+2?".to_string(),
                submission_url: "https://x/submit".to_string(),
                data_sources: vec![],
            }
        );

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with(EXTRACTION_PROMPT));
        assert!(prompts[0].ends_with("<html><body>2+2?</body></html>"));
    }

    #[tokio::test]
    async fn test_extract_without_json_is_parse_error() {
        let extractor = QuizExtractor::new(CannedModel::new("question A"));

        let err = extractor.extract("<html></html>").await.unwrap_err();
        assert!(matches!(err, AppError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_extract_missing_submit_url() {
        let extractor = QuizExtractor::new(CannedModel::new(r#"{"question": "q"}"#));

        let err = extractor.extract("<html></html>").await.unwrap_err();
        assert!(matches!(err, AppError::MissingField { field: "submit_url" }));
    }
}
