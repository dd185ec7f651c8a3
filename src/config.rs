use std::fmt;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// 必需的环境变量
pub const REQUIRED_VARS: [&str; 3] = ["GEMINI_API_KEY", "STUDENT_EMAIL", "STUDENT_SECRET"];

/// 进程级凭据
///
/// 启动时加载一次，之后只读，所有请求共享
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// 语言模型 API 密钥
    pub api_key: String,
    /// 学生邮箱
    pub email: String,
    /// 共享密钥
    pub secret: String,
}

impl Credentials {
    pub fn new(
        api_key: impl Into<String>,
        email: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            email: email.into(),
            secret: secret.into(),
        }
    }

    /// 校验请求中携带的密钥
    pub fn secret_matches(&self, candidate: &str) -> bool {
        self.secret == candidate
    }
}

// 日志里不能出现密钥
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"***")
            .field("email", &self.email)
            .field("secret", &"***")
            .finish()
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    pub credentials: Credentials,
    // --- LLM 配置 ---
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    // --- 服务配置 ---
    pub host: String,
    pub port: u16,
    // --- 浏览器配置 ---
    /// 浏览器可执行文件路径，为空时由 chromiumoxide 自动查找
    pub browser_executable: Option<String>,
    /// 页面导航超时（秒）
    pub navigation_timeout_secs: u64,
}

impl Config {
    pub const DEFAULT_LLM_API_BASE_URL: &'static str =
        "https://generativelanguage.googleapis.com/v1beta/openai/";
    pub const DEFAULT_LLM_MODEL_NAME: &'static str = "gemini-2.5-flash";
    pub const DEFAULT_HOST: &'static str = "0.0.0.0";
    pub const DEFAULT_PORT: u16 = 8000;
    pub const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 30;

    /// 使用默认值构建配置（测试和工具命令使用）
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            credentials,
            llm_api_base_url: Self::DEFAULT_LLM_API_BASE_URL.to_string(),
            llm_model_name: Self::DEFAULT_LLM_MODEL_NAME.to_string(),
            host: Self::DEFAULT_HOST.to_string(),
            port: Self::DEFAULT_PORT,
            browser_executable: None,
            navigation_timeout_secs: Self::DEFAULT_NAVIGATION_TIMEOUT_SECS,
        }
    }

    /// 从进程环境变量加载配置
    ///
    /// 调用前应先用 `dotenvy` 加载 `.env` 文件
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 通过任意查找函数加载配置
    ///
    /// 所有缺失的必需变量会在同一个错误里一起报告
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let missing: Vec<String> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|name| get(*name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::MissingEnvVars(missing));
        }

        let credentials = Credentials::new(
            get("GEMINI_API_KEY").unwrap_or_default(),
            get("STUDENT_EMAIL").unwrap_or_default(),
            get("STUDENT_SECRET").unwrap_or_default(),
        );

        let default = Self::with_credentials(credentials);
        Ok(Self {
            llm_api_base_url: get("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url.clone()),
            llm_model_name: get("LLM_MODEL_NAME").unwrap_or(default.llm_model_name.clone()),
            host: get("HOST").unwrap_or(default.host.clone()),
            port: parse_var("PORT", get("PORT"), "u16")?.unwrap_or(default.port),
            browser_executable: get("BROWSER_EXECUTABLE"),
            navigation_timeout_secs: parse_var(
                "NAVIGATION_TIMEOUT_SECS",
                get("NAVIGATION_TIMEOUT_SECS"),
                "u64",
            )?
            .unwrap_or(default.navigation_timeout_secs),
            credentials: default.credentials,
        })
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

fn parse_var<T: std::str::FromStr>(
    var_name: &str,
    value: Option<String>,
    expected_type: &str,
) -> AppResult<Option<T>> {
    match value {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::InvalidEnvVar {
                var_name: var_name.to_string(),
                value: raw,
                expected_type: expected_type.to_string(),
            }),
    }
}
