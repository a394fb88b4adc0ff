use crate::container::DockerEvent;
use crate::workspace::{Microservice, Project};
use chrono::{DateTime, Local};
use std::fmt;

/// 微服务状态，每次刷新时根据 Docker 状态重新计算
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MicroserviceStatus {
    /// Docker 未安装或守护进程未运行
    NeedsDocker,
    /// 没有对应的容器
    NotDeployed,
    Stopped,
    Running,
    /// 守护进程可用但获取容器列表失败
    Error(String),
}

impl MicroserviceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MicroserviceStatus::NeedsDocker => "need to install and/or start docker",
            MicroserviceStatus::NotDeployed => "not deployed",
            MicroserviceStatus::Stopped => "stopped",
            MicroserviceStatus::Running => "running",
            MicroserviceStatus::Error(_) => "Error",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, MicroserviceStatus::Running)
    }
}

impl fmt::Display for MicroserviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 状态变化通知（守护进程状态切换或容器事件）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    DaemonAvailable,
    DaemonUnavailable,
    Container(DockerEvent),
}

/// 带状态的微服务
#[derive(Debug, Clone)]
pub struct MicroserviceEntry {
    pub microservice: Microservice,
    pub status: MicroserviceStatus,
}

/// 项目及其微服务状态
#[derive(Debug, Clone)]
pub struct ProjectStatus {
    pub project: Project,
    pub microservices: Vec<MicroserviceEntry>,
}

impl ProjectStatus {
    pub fn running_count(&self) -> usize {
        self.microservices
            .iter()
            .filter(|entry| entry.status.is_running())
            .count()
    }

    pub fn total(&self) -> usize {
        self.microservices.len()
    }
}

/// 某一时刻整个工作区的状态
#[derive(Debug, Clone)]
pub struct WorkspaceSnapshot {
    pub taken_at: DateTime<Local>,
    pub docker_available: bool,
    pub projects: Vec<ProjectStatus>,
}

impl WorkspaceSnapshot {
    pub fn project(&self, name: &str) -> Option<&ProjectStatus> {
        self.projects.iter().find(|p| p.project.name == name)
    }
}
