use crate::constants::layout;
use crate::naming;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// 项目（包含 project-config.json 的目录）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Project {
    pub name: String,
    pub path: PathBuf,
}

impl Project {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// 获取 docker-compose.yml 路径
    pub fn compose_file(&self) -> PathBuf {
        layout::compose_file(&self.path)
    }

    /// 获取部署目录（docker compose 的工作目录）
    pub fn deployment_dir(&self) -> PathBuf {
        layout::deployment_dir(&self.path)
    }

    pub fn microservices_dir(&self) -> PathBuf {
        layout::microservices_dir(&self.path)
    }

    /// 项目所在的工作区根目录
    pub fn workspace_root(&self) -> Option<&Path> {
        self.path.parent()
    }
}

/// 微服务（项目 microservices/ 下的子目录）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Microservice {
    pub name: String,
    pub path: PathBuf,
    pub project: Project,
}

impl Microservice {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, project: Project) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            project,
        }
    }

    /// compose 服务名，同时也是容器名匹配的关键字
    pub fn service_name(&self) -> String {
        naming::compose_service_name(&self.name)
    }
}
