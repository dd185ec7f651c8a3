use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::{
    EventLifecycleEvent, FrameId, SetLifecycleEventsEnabledParams,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use super::PageRenderer;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::utils::logging::truncate_text;

/// 生命周期事件：新文档开始加载
const LIFECYCLE_INIT: &str = "init";
/// 生命周期事件：网络空闲
const LIFECYCLE_NETWORK_IDLE: &str = "networkIdle";

/// 无头浏览器渲染器
///
/// 每次渲染都启动一个新的浏览器实例和页面，结束后立即关闭，不在请求间复用
pub struct HeadlessRenderer {
    executable: Option<String>,
    navigation_timeout: Duration,
}

impl HeadlessRenderer {
    /// 根据程序配置创建渲染器
    pub fn new(config: &Config) -> Self {
        Self::with_timeout(config.browser_executable.clone(), config.navigation_timeout())
    }

    pub fn with_timeout(executable: Option<String>, navigation_timeout: Duration) -> Self {
        Self {
            executable,
            navigation_timeout,
        }
    }

    /// 为一次渲染创建独立的浏览器配置目录，Drop 时删除
    fn new_profile_dir() -> std::io::Result<TempDir> {
        tempfile::Builder::new()
            .prefix("quiz_bridge-profile-")
            .tempdir()
    }

    /// 配置无头浏览器
    ///
    /// 每个浏览器实例必须使用自己的配置目录，否则并发启动会争用同一个 profile 锁
    fn browser_config(&self, profile_dir: &Path) -> Result<BrowserConfig, String> {
        let mut builder = BrowserConfig::builder()
            .new_headless_mode()
            .user_data_dir(profile_dir)
            .request_timeout(self.navigation_timeout)
            .args(vec![
                "--disable-gpu",
                "--no-sandbox",              // 容器内没有沙盒权限
                "--disable-dev-shm-usage",   // 防止共享内存不足
                "--remote-debugging-port=0", // 让浏览器自动选择端口
            ]);

        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(Path::new(path));
        }

        builder.build()
    }

    /// 启动浏览器并在后台处理浏览器事件
    async fn launch(
        &self,
        url: &str,
        profile_dir: &Path,
    ) -> AppResult<(Browser, JoinHandle<()>)> {
        let config = self.browser_config(profile_dir).map_err(|e| {
            error!("配置无头浏览器失败: {}", e);
            AppError::render(url, format!("配置无头浏览器失败: {e}"))
        })?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            error!("启动无头浏览器失败: {}", e);
            AppError::render(url, format!("启动无头浏览器失败: {e}"))
        })?;
        debug!("无头浏览器启动成功");

        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok((browser, handler_task))
    }
}

#[async_trait]
impl PageRenderer for HeadlessRenderer {
    async fn render(&self, url: &str) -> AppResult<String> {
        info!("🚀 启动无头浏览器渲染: {}", url);

        let profile_dir = Self::new_profile_dir()
            .map_err(|e| AppError::render(url, format!("创建浏览器配置目录失败: {e}")))?;
        debug!("浏览器配置目录: {}", profile_dir.path().display());

        let (mut browser, handler_task) = self.launch(url, profile_dir.path()).await?;

        let result = match timeout(self.navigation_timeout, load_page(&browser, url)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::render(
                url,
                format!("页面加载超时 ({} 秒)", self.navigation_timeout.as_secs()),
            )),
        };

        // 无论成功与否都关闭浏览器
        if let Err(e) = browser.close().await {
            warn!("关闭浏览器失败: {}", e);
        }
        if let Err(e) = browser.wait().await {
            warn!("等待浏览器进程退出失败: {}", e);
        }
        handler_task.abort();
        // 浏览器进程退出后再删除配置目录
        drop(profile_dir);

        match &result {
            Ok(html) => info!("✅ 页面渲染完成，HTML 长度: {} 字符", html.len()),
            Err(e) => error!("页面渲染失败: {}", e),
        }

        result
    }
}

/// 打开页面，依次等待网络空闲和 DOMContentLoaded，然后读取 HTML
async fn load_page(browser: &Browser, url: &str) -> AppResult<String> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| AppError::render(url, format!("创建页面失败: {e}")))?;

    page.execute(SetLifecycleEventsEnabledParams::new(true))
        .await
        .map_err(|e| AppError::render(url, format!("开启生命周期事件失败: {e}")))?;

    let mut lifecycle = page
        .event_listener::<EventLifecycleEvent>()
        .await
        .map_err(|e| AppError::render(url, format!("订阅生命周期事件失败: {e}")))?;

    page.goto(url)
        .await
        .map_err(|e| AppError::render(url, format!("导航失败: {e}")))?;
    debug!("已导航到: {}，等待网络空闲", url);

    let main_frame = page
        .mainframe()
        .await
        .map_err(|e| AppError::render(url, format!("读取主框架失败: {e}")))?
        .ok_or_else(|| AppError::render(url, "页面没有主框架"))?;

    let mut idle = NetworkIdleTracker::new(main_frame);
    while let Some(event) = lifecycle.next().await {
        if idle.observe(&event.frame_id, &event.name) {
            break;
        }
    }
    debug!("网络已空闲");

    wait_for_dom_content_loaded(&page, url).await?;

    let html = page
        .content()
        .await
        .map_err(|e| AppError::render(url, format!("读取页面内容失败: {e}")))?;

    if html.trim().is_empty() {
        return Err(AppError::render(url, "页面内容为空"));
    }

    debug!("页面内容预览: {}", truncate_text(&html, 200));
    Ok(html)
}

/// 判断主框架是否已进入网络空闲
///
/// 只接受主框架的事件，iframe 的 init / networkIdle 会被忽略。
/// about:blank 的残留事件出现在新文档的 init 之前，同样被跳过。
#[derive(Debug)]
struct NetworkIdleTracker {
    main_frame: FrameId,
    navigation_started: bool,
}

impl NetworkIdleTracker {
    fn new(main_frame: FrameId) -> Self {
        Self {
            main_frame,
            navigation_started: false,
        }
    }

    /// 处理一个生命周期事件，返回主框架是否已网络空闲
    fn observe(&mut self, frame_id: &FrameId, name: &str) -> bool {
        if *frame_id != self.main_frame {
            return false;
        }

        match name {
            LIFECYCLE_INIT => {
                self.navigation_started = true;
                false
            }
            LIFECYCLE_NETWORK_IDLE => self.navigation_started,
            _ => false,
        }
    }
}

/// 等待 document.readyState 离开 loading 状态
async fn wait_for_dom_content_loaded(page: &Page, url: &str) -> AppResult<()> {
    loop {
        let state: String = page
            .evaluate("document.readyState")
            .await
            .map_err(|e| AppError::render(url, format!("读取 readyState 失败: {e}")))?
            .into_value()
            .map_err(|e| AppError::render(url, format!("解析 readyState 失败: {e}")))?;

        if state != "loading" {
            debug!("DOMContentLoaded 已触发 (readyState: {})", state);
            return Ok(());
        }

        sleep(Duration::from_millis(100)).await;
    }
}
