//! 状态到展示信息的纯映射，渲染由前端完成

use crate::status::{MicroserviceStatus, ProjectStatus};

/// 状态对应的主操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    Stop,
    Start,
    Deploy,
    /// 打开 Docker 安装引导页
    OpenDockerWebsite,
}

impl PrimaryAction {
    pub fn title(&self) -> &'static str {
        match self {
            PrimaryAction::Stop => "Stop Microservice",
            PrimaryAction::Start => "Start Microservice",
            PrimaryAction::Deploy => "Deploy Microservice",
            PrimaryAction::OpenDockerWebsite => "Install Docker",
        }
    }
}

/// 图标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Stop,
    Play,
    Loading,
    Download,
    Error,
}

impl Icon {
    /// 终端中使用的符号
    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::Stop => "⏹",
            Icon::Play => "▶",
            Icon::Loading => "⏳",
            Icon::Download => "⬇",
            Icon::Error => "❌",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub label: &'static str,
    pub icon: Icon,
    pub action: Option<PrimaryAction>,
}

impl Presentation {
    pub fn for_status(status: &MicroserviceStatus) -> Self {
        let (icon, action) = match status {
            MicroserviceStatus::Running => (Icon::Stop, Some(PrimaryAction::Stop)),
            MicroserviceStatus::Stopped => (Icon::Play, Some(PrimaryAction::Start)),
            MicroserviceStatus::NotDeployed => (Icon::Loading, Some(PrimaryAction::Deploy)),
            MicroserviceStatus::NeedsDocker => {
                (Icon::Download, Some(PrimaryAction::OpenDockerWebsite))
            }
            MicroserviceStatus::Error(_) => (Icon::Error, None),
        };

        Self {
            label: status.label(),
            icon,
            action,
        }
    }
}

/// 项目摘要：`<running> / <total> running`
pub fn project_summary(project: &ProjectStatus) -> String {
    format!("{} / {} running", project.running_count(), project.total())
}
