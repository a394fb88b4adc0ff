use crate::workspace::Project;
use async_trait::async_trait;

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// 面向用户的通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// 编排器与用户界面之间的接口
///
/// 核心库只产生通知和动作请求，如何展示由前端决定（CLI、编辑器插件等）。
#[async_trait]
pub trait Frontend: Send + Sync {
    fn notify(&self, notification: Notification);

    /// 展示项目的 compose 日志
    async fn show_logs(&self, project: &Project);

    /// 在外部浏览器中打开地址
    fn open_external(&self, url: &str);

    fn info(&self, message: &str) {
        self.notify(Notification::info(message));
    }

    fn warn(&self, message: &str) {
        self.notify(Notification::warning(message));
    }

    fn error(&self, message: &str) {
        self.notify(Notification::error(message));
    }
}
