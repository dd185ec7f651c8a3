//! 答题流程 - 流程层
//!
//! 核心职责：定义"一个请求"的完整处理流程
//!
//! 流程顺序（任何一步失败都直接结束请求，不重试）：
//! 1. 校验密钥
//! 2. 渲染页面
//! 3. 抽取题目
//! 4. 求解
//! 5. 提交答案

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::browser::{HeadlessRenderer, PageRenderer};
use crate::clients::{LanguageModel, LlmClient};
use crate::config::{Config, Credentials};
use crate::error::{AppError, AppResult};
use crate::models::QuizRequest;
use crate::services::{QuizExtractor, QuizSolver, Submitter};
use crate::workflow::quiz_ctx::QuizCtx;

/// 流程阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    Received,
    SecretChecked,
    Rendered,
    Extracted,
    Solved,
    Submitted,
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowStage::Received => "已接收",
            FlowStage::SecretChecked => "密钥已校验",
            FlowStage::Rendered => "页面已渲染",
            FlowStage::Extracted => "题目已抽取",
            FlowStage::Solved => "已求解",
            FlowStage::Submitted => "已提交",
        };
        f.write_str(name)
    }
}

/// 答题流程
///
/// - 编排 渲染 → 抽取 → 求解 → 提交
/// - 只持有只读配置，可被并发请求共享
pub struct QuizFlow {
    credentials: Credentials,
    renderer: Arc<dyn PageRenderer>,
    extractor: QuizExtractor,
    solver: QuizSolver,
    submitter: Submitter,
}

impl QuizFlow {
    /// 使用生产组件创建流程（无头浏览器 + OpenAI 兼容模型）
    pub fn new(config: &Config) -> Self {
        Self::with_components(
            config.credentials.clone(),
            Arc::new(HeadlessRenderer::new(config)),
            Arc::new(LlmClient::new(config)),
        )
    }

    /// 使用自定义渲染器和模型创建流程
    pub fn with_components(
        credentials: Credentials,
        renderer: Arc<dyn PageRenderer>,
        model: Arc<dyn LanguageModel>,
    ) -> Self {
        Self {
            submitter: Submitter::new(credentials.clone()),
            credentials,
            renderer,
            extractor: QuizExtractor::new(model.clone()),
            solver: QuizSolver::new(model),
        }
    }

    /// 校验请求密钥
    pub fn check_secret(&self, request: &QuizRequest) -> AppResult<()> {
        if self.credentials.secret_matches(&request.secret) {
            Ok(())
        } else {
            Err(AppError::Auth)
        }
    }

    /// 执行完整流程，返回评分端点的结果
    pub async fn run(&self, request: &QuizRequest, ctx: &QuizCtx) -> AppResult<Value> {
        self.log_stage(ctx, FlowStage::Received);

        if let Err(e) = self.check_secret(request) {
            warn!("{} ⛔ 密钥不匹配，拒绝请求", ctx);
            return Err(e);
        }
        self.log_stage(ctx, FlowStage::SecretChecked);

        let result = self.run_pipeline(request, ctx).await;
        if let Err(e) = &result {
            error!("{} ❌ 流程失败: {}", ctx, e);
        }
        result
    }

    async fn run_pipeline(&self, request: &QuizRequest, ctx: &QuizCtx) -> AppResult<Value> {
        let html = self.renderer.render(&request.url).await?;
        self.log_stage(ctx, FlowStage::Rendered);

        let descriptor = self.extractor.extract(&html).await?;
        drop(html);
        self.log_stage(ctx, FlowStage::Extracted);

        let answer = self.solver.solve(&descriptor.question).await?;
        self.log_stage(ctx, FlowStage::Solved);

        let result = self
            .submitter
            .submit(&descriptor.submission_url, &request.url, &answer)
            .await?;
        self.log_stage(ctx, FlowStage::Submitted);

        Ok(result)
    }

    fn log_stage(&self, ctx: &QuizCtx, stage: FlowStage) {
        info!("{} ▶ {}", ctx, stage);
    }
}
