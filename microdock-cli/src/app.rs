use crate::cli::Commands;
use crate::commands;
use crate::frontend::CliFrontend;
use crate::init::{run_init, user_config_path};
use microdock_core::config::AppConfig;
use microdock_core::constants::config;
use microdock_core::container::DockerCli;
use microdock_core::lifecycle::Orchestrator;
use microdock_core::status::{StatusInspector, StatusWatcher};
use microdock_core::workspace::{self, Microservice, Project};
use microdock_core::{MicrodockError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// 当前目录没有配置文件时，回退到用户级配置
fn user_config_fallback() -> Option<PathBuf> {
    let has_local = config::CONFIG_FILE_NAMES
        .iter()
        .any(|name| Path::new(name).exists());
    if has_local {
        return None;
    }
    user_config_path().filter(|path| path.exists())
}

pub struct CliApp {
    pub config: AppConfig,
    pub root: PathBuf,
    pub docker: Arc<DockerCli>,
    pub frontend: Arc<CliFrontend>,
    pub orchestrator: Orchestrator,
}

impl CliApp {
    /// 根据配置初始化CLI应用，`root` 参数优先于配置中的工作区根目录
    pub fn new(config: AppConfig, root: Option<PathBuf>) -> Result<Self> {
        let root = root.unwrap_or_else(|| config.workspace_root());
        debug!("工作区根目录: {}", root.display());

        let docker = Arc::new(DockerCli::new(&config.docker.socket_path));
        let settings = config.readiness_settings();
        let frontend = Arc::new(CliFrontend::new(docker.clone()));
        let orchestrator = Orchestrator::new(docker.clone(), frontend.clone(), settings)?;

        Ok(Self {
            config,
            root,
            docker,
            frontend,
            orchestrator,
        })
    }

    /// 使用智能配置查找初始化CLI应用
    pub fn new_with_auto_config(
        config_path: Option<PathBuf>,
        root: Option<PathBuf>,
    ) -> Result<Self> {
        let config = match config_path {
            Some(path) => AppConfig::load_from_file(path)?,
            None => match user_config_fallback() {
                Some(path) => {
                    debug!("使用用户配置文件: {}", path.display());
                    AppConfig::load_from_file(path)?
                }
                None => AppConfig::find_and_load_config()?,
            },
        };
        Self::new(config, root)
    }

    pub fn inspector(&self) -> StatusInspector {
        StatusInspector::new(self.docker.clone())
    }

    pub fn watcher(&self) -> StatusWatcher {
        StatusWatcher::new(self.docker.clone(), self.config.poll_interval())
    }

    pub fn project(&self, name: &str) -> Result<Project> {
        workspace::find_project(&self.root, name)
            .ok_or_else(|| MicrodockError::ProjectNotFound(name.to_string()))
    }

    pub fn microservice(&self, project: &str, name: &str) -> Result<Microservice> {
        let project = self.project(project)?;
        workspace::find_microservice(&project, name)
            .ok_or_else(|| MicrodockError::MicroserviceNotFound(format!("{}/{}", project.name, name)))
    }

    /// 运行应用命令
    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Init { force, global } => run_init(force, global),
            Commands::Status => commands::run_status(self).await,
            Commands::Watch => commands::run_watch(self).await,
            Commands::CreateProject { name } => commands::run_create_project(self, &name),
            Commands::Create { project, name } => {
                commands::run_create_microservice(self, &project, &name)
            }
            Commands::Deploy { project, service } => {
                commands::run_deploy(self, &project, &service).await
            }
            Commands::Start { project, service } => {
                commands::run_start(self, &project, service.as_deref()).await
            }
            Commands::Stop { project, service } => {
                commands::run_stop(self, &project, service.as_deref()).await
            }
            Commands::Restart { project, service } => {
                commands::run_restart(self, &project, service.as_deref()).await
            }
            Commands::Run { project, service } => {
                commands::run_local(self, &project, service.as_deref()).await
            }
            Commands::Logs { project, tail } => commands::run_logs(self, &project, tail).await,
            Commands::Teardown { project } => commands::run_teardown(self, &project).await,
        }
    }
}
