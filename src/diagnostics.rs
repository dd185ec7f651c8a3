//! 自检工具
//!
//! - `check-llm`: 确认模型配置可用
//! - `check-server`: 向运行中的服务发送一次演示请求

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;

use crate::clients::{LanguageModel, LlmClient};
use crate::config::Config;

/// 演示题目页面
pub const DEMO_QUIZ_URL: &str = "https://tds-llm-analysis.s-anand.net/demo";
/// 本地服务默认地址
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

const PLACEHOLDER_API_KEYS: [&str; 2] = ["your_key_here", "your_actual_gemini_api_key_here"];

/// 服务自检结果
#[derive(Debug)]
pub struct ServerCheck {
    pub status: u16,
    /// 响应体能解析为 JSON 时的值
    pub json: Option<Value>,
    pub raw: String,
}

impl ServerCheck {
    pub fn passed(&self) -> bool {
        self.status == 200
    }
}

/// 发送一条测试消息给模型
pub async fn check_llm(config: &Config) -> Result<String> {
    if PLACEHOLDER_API_KEYS.contains(&config.credentials.api_key.as_str()) {
        anyhow::bail!("GEMINI_API_KEY 仍是占位值，请在 .env 中填写真实的 API key");
    }

    let client = LlmClient::new(config);
    info!("发送测试请求到模型: {}", client.model_name());

    let reply = client
        .complete("Write a Python print statement that says 'Hello from Gemini'")
        .await
        .context("模型测试请求失败")?;
    Ok(reply)
}

/// 向运行中的服务发送演示请求
///
/// # 参数
/// - `base_url`: 服务地址
/// - `email` / `secret`: 请求携带的身份信息
/// - `quiz_url`: 题目页面
pub async fn check_server(
    base_url: &str,
    email: &str,
    secret: &str,
    quiz_url: &str,
) -> Result<ServerCheck> {
    let payload = json!({
        "email": email,
        "secret": secret,
        "url": quiz_url,
    });
    info!("发送 POST 请求到: {}", base_url);
    info!("请求体: {}", json!({ "email": email, "secret": "***", "url": quiz_url }));

    let response = reqwest::Client::new()
        .post(base_url)
        .json(&payload)
        .timeout(Duration::from_secs(30))
        .send()
        .await
        .with_context(|| {
            format!("无法连接到服务 {base_url}，请确认服务已启动（cargo run）")
        })?;

    let status = response.status().as_u16();
    let raw = response.text().await.context("读取响应体失败")?;
    let json = serde_json::from_str(&raw).ok();

    Ok(ServerCheck { status, json, raw })
}
