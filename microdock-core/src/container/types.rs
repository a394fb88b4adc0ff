use crate::constants::docker::NON_CRITICAL_COMPOSE_MESSAGES;
use crate::constants::ports::CONTAINER_PORT;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::OnceCell;

/// 容器运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerState {
    Running,
    Created,
    Exited,
    Paused,
    Restarting,
    Dead,
    Unknown,
}

impl ContainerState {
    /// 根据运行标志和 docker 状态描述（如 "Exited (0) 3 hours ago"）解析状态
    pub fn from_status(running: bool, status: &str) -> Self {
        if running {
            return ContainerState::Running;
        }

        match status.trim().to_lowercase().as_str() {
            s if s.starts_with("up") || s == "running" => ContainerState::Running,
            s if s.starts_with("created") => ContainerState::Created,
            s if s.starts_with("exited") => ContainerState::Exited,
            s if s.contains("paused") => ContainerState::Paused,
            s if s.starts_with("restarting") => ContainerState::Restarting,
            s if s.starts_with("dead") => ContainerState::Dead,
            _ => ContainerState::Unknown,
        }
    }

    /// 获取状态的显示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            ContainerState::Running => "running",
            ContainerState::Created => "created",
            ContainerState::Exited => "exited",
            ContainerState::Paused => "paused",
            ContainerState::Restarting => "restarting",
            ContainerState::Dead => "dead",
            ContainerState::Unknown => "unknown",
        }
    }
}

/// Docker 容器摘要信息（包括已停止的容器）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub id: String,
    /// 容器名称（多个名称以逗号分隔）
    pub names: String,
    pub image: String,
    pub state: ContainerState,
    /// 端口描述，例如 "0.0.0.0:8001->8000/tcp, :::8001->8000/tcp"
    pub ports: String,
}

impl ContainerSummary {
    /// 容器名称是否包含关键字
    pub fn name_contains(&self, keyword: &str) -> bool {
        self.names
            .to_lowercase()
            .contains(&keyword.to_lowercase())
    }

    pub fn is_running(&self) -> bool {
        self.state == ContainerState::Running
    }

    /// 对外发布的主机端口，优先选择映射到容器 8000 端口的那个
    pub fn host_port(&self) -> Option<u16> {
        let mappings: Vec<(u16, u16)> = self
            .ports
            .split(',')
            .filter_map(|part| parse_port_binding(part.trim()))
            .collect();

        mappings
            .iter()
            .find(|(_, container)| *container == CONTAINER_PORT)
            .or_else(|| mappings.first())
            .map(|(host, _)| *host)
    }
}

/// 解析 "0.0.0.0:8001->8000/tcp" 为 (8001, 8000)，未发布的端口返回 None
fn parse_port_binding(binding: &str) -> Option<(u16, u16)> {
    let (host_part, container_part) = binding.split_once("->")?;
    let host_port = host_part.rsplit(':').next()?.trim().parse::<u16>().ok()?;
    let container_port = container_part
        .split('/')
        .next()?
        .trim()
        .parse::<u16>()
        .ok()?;
    Some((host_port, container_port))
}

/// Docker 守护进程的容器事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerEvent {
    /// 事件动作，例如 start / stop / die / destroy
    pub action: String,
    /// 触发事件的容器名称
    pub container_name: Option<String>,
}

/// docker compose 命令输出
#[derive(Debug, Clone, Default)]
pub struct ComposeOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ComposeOutput {
    /// stderr 中除进度信息外的行（compose 把进度也写到 stderr）
    pub fn critical_lines(&self) -> Vec<String> {
        self.stderr
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| {
                !NON_CRITICAL_COMPOSE_MESSAGES
                    .iter()
                    .any(|message| line.contains(message))
            })
            .map(str::to_string)
            .collect()
    }
}

/// compose 命令的调用方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeProgram {
    /// `docker compose`（新语法）
    Plugin,
    /// `docker-compose`（旧语法）
    Standalone,
}

/// 基于 docker CLI 和 Docker Engine API 的容器引擎
#[derive(Debug, Clone)]
pub struct DockerCli {
    pub(crate) socket_path: PathBuf,
    pub(crate) compose_program: OnceCell<ComposeProgram>,
}
