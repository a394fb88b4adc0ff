use super::engine::ContainerEngine;
use super::types::{ComposeOutput, ContainerState, ContainerSummary, DockerCli, DockerEvent};
use crate::{MicrodockError, Result};
use async_trait::async_trait;
use ducker::docker::{container::DockerContainer, util::new_local_docker_connection};
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

impl DockerCli {
    /// 使用 ducker 库获取所有容器信息
    async fn list_with_ducker(&self) -> Result<Vec<DockerContainer>> {
        let socket = self.socket_path.to_string_lossy().to_string();
        match new_local_docker_connection(&socket, None).await {
            Ok(docker) => match DockerContainer::list(&docker).await {
                Ok(containers) => {
                    debug!("ducker 获取到 {} 个容器", containers.len());
                    Ok(containers)
                }
                Err(e) => {
                    error!("ducker 获取容器列表失败: {}", e);
                    Err(MicrodockError::docker(format!("获取容器列表失败: {e}")))
                }
            },
            Err(e) => {
                error!("ducker 连接 Docker 失败: {}", e);
                Err(MicrodockError::docker_unavailable(format!(
                    "连接 Docker 失败: {e}"
                )))
            }
        }
    }
}

/// 将 DockerContainer 转换为 ContainerSummary
fn to_summary(container: DockerContainer) -> ContainerSummary {
    ContainerSummary {
        state: ContainerState::from_status(container.running, &container.status),
        id: container.id,
        names: container.names,
        image: container.image,
        ports: container.ports,
    }
}

#[async_trait]
impl ContainerEngine for DockerCli {
    async fn is_installed(&self) -> bool {
        which::which("docker").is_ok()
    }

    async fn is_daemon_running(&self) -> bool {
        match self.check_docker_status().await {
            Ok(()) => true,
            Err(e) => {
                debug!("Docker 不可用: {}", e);
                false
            }
        }
    }

    async fn list_containers(&self) -> Result<Vec<ContainerSummary>> {
        let containers = self.list_with_ducker().await?;
        Ok(containers.into_iter().map(to_summary).collect())
    }

    async fn start_container(&self, id: &str) -> Result<()> {
        info!("启动容器: {}", id);
        self.run_docker_checked(&["start", id]).await?;
        Ok(())
    }

    async fn stop_container(&self, id: &str) -> Result<()> {
        info!("停止容器: {}", id);
        self.run_docker_checked(&["stop", id]).await?;
        Ok(())
    }

    async fn remove_container(&self, id: &str) -> Result<()> {
        info!("删除容器: {}", id);
        self.run_docker_checked(&["rm", id]).await?;
        Ok(())
    }

    async fn compose_up(&self, compose_file: &Path, service: &str) -> Result<ComposeOutput> {
        info!("部署服务 {} ({})", service, compose_file.display());
        self.run_compose_command(compose_file, &["up", "-d", service])
            .await
    }

    async fn compose_build(&self, compose_file: &Path, service: &str) -> Result<()> {
        info!("构建服务镜像 {} ({})", service, compose_file.display());
        self.run_compose_command(compose_file, &["build", service])
            .await?;
        Ok(())
    }

    async fn subscribe_events(&self) -> Result<mpsc::Receiver<DockerEvent>> {
        self.spawn_event_stream().await
    }
}
