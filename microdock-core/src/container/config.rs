use super::types::DockerCli;
use crate::constants::docker::DOCKER_SOCKET_PATH;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;

impl DockerCli {
    /// 创建新的 Docker 引擎实例
    pub fn new<P: AsRef<Path>>(socket_path: P) -> Self {
        // 不在创建时检查 Docker 是否可用，而是在实际执行命令时检查
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
            compose_program: OnceCell::new(),
        }
    }

    /// 获取 Docker socket 路径
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new(PathBuf::from(DOCKER_SOCKET_PATH))
    }
}
