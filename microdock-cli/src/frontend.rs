use crate::utils::new_spinner;
use async_trait::async_trait;
use indicatif::ProgressBar;
use microdock_core::container::DockerCli;
use microdock_core::lifecycle::{Frontend, Notification, NotificationLevel};
use microdock_core::workspace::Project;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

/// 失败时展示的日志行数
const FAILURE_LOG_TAIL: usize = 100;

/// 终端前端：通知写入日志，失败时打印最近的 compose 日志
pub struct CliFrontend {
    docker: Arc<DockerCli>,
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliFrontend {
    pub fn new(docker: Arc<DockerCli>) -> Self {
        Self {
            docker,
            spinner: Mutex::new(None),
        }
    }

    /// 显示进度 spinner，直到调用 `end_progress`
    pub fn begin_progress(&self, message: impl Into<String>) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(old) = slot.replace(new_spinner(message)) {
                old.finish_and_clear();
            }
        }
    }

    pub fn end_progress(&self) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(spinner) = slot.take() {
                spinner.finish_and_clear();
            }
        }
    }

    /// 输出时暂停 spinner，避免与日志混在同一行
    fn with_spinner_suspended(&self, f: impl FnOnce()) {
        let spinner = self.spinner.lock().ok().and_then(|slot| slot.clone());
        match spinner {
            Some(spinner) => spinner.suspend(f),
            None => f(),
        }
    }
}

#[async_trait]
impl Frontend for CliFrontend {
    fn notify(&self, notification: Notification) {
        self.with_spinner_suspended(|| match notification.level {
            NotificationLevel::Info => info!("ℹ️  {}", notification.message),
            NotificationLevel::Warning => warn!("⚠️  {}", notification.message),
            NotificationLevel::Error => error!("❌ {}", notification.message),
        });
    }

    async fn show_logs(&self, project: &Project) {
        self.end_progress();
        info!("👉 持续查看日志: microdock logs {}", project.name);
        info!("📜 项目 {} 最近 {} 行日志:", project.name, FAILURE_LOG_TAIL);

        let compose_file = project.compose_file();
        let mut cmd = self
            .docker
            .logs_command(&compose_file, false, Some(FAILURE_LOG_TAIL))
            .await;
        let status = cmd
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => {}
            Ok(status) => warn!("⚠️  docker compose logs 退出码: {}", status),
            Err(e) => error!("❌ Failed to show Docker logs: {}", e),
        }
    }

    fn open_external(&self, url: &str) {
        self.with_spinner_suspended(|| match open::that(url) {
            Ok(()) => info!("🌐 已在浏览器中打开 {}", url),
            Err(e) => error!("❌ Failed to open URL: {} ({})", url, e),
        });
    }
}
