use crate::constants::{config, docker, local, timeout};
use crate::error::Result;
use crate::lifecycle::ReadinessSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 应用配置结构
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    pub workspace: WorkspaceConfig,
    pub docker: DockerConfig,
    pub readiness: ReadinessConfig,
    #[serde(default)]
    pub local: LocalConfig,
}

/// 工作区相关配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WorkspaceConfig {
    /// 存放所有项目的根目录
    pub root: String,
}

/// Docker相关配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DockerConfig {
    pub socket_path: String,
    /// 守护进程可用性轮询间隔（秒）
    pub poll_interval_secs: u64,
}

/// 本地运行模式配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LocalConfig {
    /// 在微服务目录中执行的命令，`{port}` 替换为 compose 中的主机端口
    pub command: Vec<String>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            command: local::DEFAULT_COMMAND.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// 就绪检查相关配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReadinessConfig {
    pub interval_secs: u64,
    pub start_timeout_secs: u64,
    pub deploy_timeout_secs: u64,
    /// 服务就绪后是否在浏览器中打开文档页
    pub open_browser: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: WorkspaceConfig {
                root: ".".to_string(),
            },
            docker: DockerConfig {
                socket_path: docker::DOCKER_SOCKET_PATH.to_string(),
                poll_interval_secs: timeout::DAEMON_POLL_INTERVAL,
            },
            readiness: ReadinessConfig {
                interval_secs: timeout::READINESS_CHECK_INTERVAL,
                start_timeout_secs: timeout::START_READY_TIMEOUT,
                deploy_timeout_secs: timeout::DEPLOY_READY_TIMEOUT,
                open_browser: true,
            },
            local: LocalConfig::default(),
        }
    }
}

impl AppConfig {
    /// 智能查找并加载配置文件
    /// 按优先级查找：microdock.toml -> .microdock.toml，都不存在时使用默认配置
    pub fn find_and_load_config() -> Result<Self> {
        for config_file in config::CONFIG_FILE_NAMES {
            if Path::new(config_file).exists() {
                tracing::info!("找到配置文件: {}", config_file);
                return Self::load_from_file(config_file);
            }
        }

        tracing::debug!("未找到配置文件，使用默认配置");
        Ok(Self::default())
    }

    /// 从指定文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;

        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml_with_comments();
        fs::write(&path, content)?;
        Ok(())
    }

    /// 生成带注释的TOML配置
    fn to_toml_with_comments(&self) -> String {
        const TEMPLATE: &str = include_str!("../templates/microdock.toml.template");

        TEMPLATE
            .replace("{workspace_root}", &self.workspace.root)
            .replace("{socket_path}", &self.docker.socket_path)
            .replace(
                "{poll_interval_secs}",
                &self.docker.poll_interval_secs.to_string(),
            )
            .replace(
                "{readiness_interval_secs}",
                &self.readiness.interval_secs.to_string(),
            )
            .replace(
                "{start_timeout_secs}",
                &self.readiness.start_timeout_secs.to_string(),
            )
            .replace(
                "{deploy_timeout_secs}",
                &self.readiness.deploy_timeout_secs.to_string(),
            )
            .replace("{open_browser}", &self.readiness.open_browser.to_string())
            .replace("{local_command}", &self.local_command_toml())
    }

    fn local_command_toml(&self) -> String {
        toml::Value::Array(
            self.local
                .command
                .iter()
                .cloned()
                .map(toml::Value::String)
                .collect(),
        )
        .to_string()
    }

    /// 获取工作区根目录
    pub fn workspace_root(&self) -> PathBuf {
        PathBuf::from(&self.workspace.root)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.docker.poll_interval_secs.max(1))
    }

    pub fn readiness_interval(&self) -> Duration {
        Duration::from_secs(self.readiness.interval_secs.max(1))
    }

    pub fn start_timeout(&self) -> Duration {
        Duration::from_secs(self.readiness.start_timeout_secs)
    }

    pub fn deploy_timeout(&self) -> Duration {
        Duration::from_secs(self.readiness.deploy_timeout_secs)
    }

    /// 编排器使用的就绪检查参数
    pub fn readiness_settings(&self) -> ReadinessSettings {
        ReadinessSettings {
            interval: self.readiness_interval(),
            start_timeout: self.start_timeout(),
            deploy_timeout: self.deploy_timeout(),
            open_browser: self.readiness.open_browser,
        }
    }
}
