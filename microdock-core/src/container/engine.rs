use super::types::{ComposeOutput, ContainerSummary, DockerEvent};
use crate::Result;
use async_trait::async_trait;
use std::path::Path;
use tokio::sync::mpsc;

/// 容器引擎抽象
///
/// 状态探测和生命周期编排只通过这个接口访问 Docker，
/// 测试中可以替换为内存实现。
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// docker 命令是否可用
    async fn is_installed(&self) -> bool;

    /// Docker 守护进程是否可达
    async fn is_daemon_running(&self) -> bool;

    /// 列出所有容器（包括已停止的）
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>>;

    async fn start_container(&self, id: &str) -> Result<()>;

    async fn stop_container(&self, id: &str) -> Result<()>;

    async fn remove_container(&self, id: &str) -> Result<()>;

    /// `compose up -d <service>`
    async fn compose_up(&self, compose_file: &Path, service: &str) -> Result<ComposeOutput>;

    /// `compose build <service>`
    async fn compose_build(&self, compose_file: &Path, service: &str) -> Result<()>;

    /// 订阅容器事件流，守护进程断开时通道关闭
    async fn subscribe_events(&self) -> Result<mpsc::Receiver<DockerEvent>>;
}
