//! 应用生命周期：初始化、监听、优雅退出

use tokio::net::TcpListener;
use tracing::info;

use crate::api::{self, AppState};
use crate::config::Config;
use crate::error::AppResult;
use crate::utils::logging::log_startup;
use crate::workflow::QuizFlow;

/// 应用主结构
pub struct App {
    listener: TcpListener,
    state: AppState,
}

impl App {
    /// 初始化应用：构建流程并绑定端口
    pub async fn initialize(config: Config) -> AppResult<Self> {
        // HOST 可以是 IP 或主机名
        let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
        log_startup(&config, listener.local_addr()?);

        let state = AppState::new(QuizFlow::new(&config));
        Ok(Self { listener, state })
    }

    /// 运行服务直到收到 Ctrl-C
    pub async fn run(self) -> AppResult<()> {
        axum::serve(self.listener, api::router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("👋 服务已停止");
        Ok(())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("收到退出信号，正在停止服务...");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;

    #[tokio::test]
    async fn test_initialize_binds_hostname() {
        let mut config = Config::with_credentials(Credentials::new("k", "a@b.c", "s"));
        config.host = "localhost".to_string();
        config.port = 0;

        let app = App::initialize(config).await.unwrap();
        assert!(app.listener.local_addr().unwrap().ip().is_loopback());
    }
}
