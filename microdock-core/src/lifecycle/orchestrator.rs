use super::frontend::Frontend;
use super::outcome::{BulkReport, RestartOutcome, StartOutcome, StopOutcome};
use super::readiness::{ReadinessSettings, readiness_client, wait_for_ready};
use crate::compose;
use crate::constants::http;
use crate::container::{ContainerEngine, ContainerState, ContainerSummary};
use crate::status::find_container;
use crate::workspace::{self, Microservice, Project};
use crate::{MicrodockError, Result};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// 持有期间其他生命周期操作会被拒绝，离开作用域时释放
struct OperationGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// 微服务生命周期编排器
///
/// 同一时刻只允许一个 start / stop / restart / deploy 操作（包括批量操作），
/// 冲突的请求直接拒绝，不排队也不重试。
pub struct Orchestrator {
    engine: Arc<dyn ContainerEngine>,
    frontend: Arc<dyn Frontend>,
    http: reqwest::Client,
    settings: ReadinessSettings,
    busy: AtomicBool,
    opened_ports: Mutex<HashSet<u16>>,
}

impl Orchestrator {
    pub fn new(
        engine: Arc<dyn ContainerEngine>,
        frontend: Arc<dyn Frontend>,
        settings: ReadinessSettings,
    ) -> Result<Self> {
        Ok(Self {
            engine,
            frontend,
            http: readiness_client()?,
            settings,
            busy: AtomicBool::new(false),
            opened_ports: Mutex::new(HashSet::new()),
        })
    }

    /// 是否有操作正在进行
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// 已经在浏览器中打开过的端口
    pub async fn opened_ports(&self) -> Vec<u16> {
        let mut ports: Vec<u16> = self.opened_ports.lock().await.iter().copied().collect();
        ports.sort_unstable();
        ports
    }

    fn begin(&self) -> Result<OperationGuard<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("⚠️ 已有微服务操作正在进行，拒绝新的请求");
            self.frontend.warn(
                "A microservice operation is already in progress. Please wait until it completes.",
            );
            return Err(MicrodockError::OperationInProgress);
        }
        Ok(OperationGuard { flag: &self.busy })
    }

    async fn ensure_docker(&self) -> Result<()> {
        if self.engine.is_installed().await && self.engine.is_daemon_running().await {
            return Ok(());
        }
        error!("❌ Docker 不可用");
        self.frontend.error(
            "Docker is not available. Please install and/or start Docker and try again.",
        );
        Err(MicrodockError::docker_unavailable(
            "Docker 未安装或守护进程未运行",
        ))
    }

    // ---------------------------------------------------------------
    // 单个微服务
    // ---------------------------------------------------------------

    /// 部署微服务（`compose up -d <service>`）
    pub async fn deploy(&self, microservice: &Microservice) -> Result<()> {
        let _guard = self.begin()?;
        self.ensure_docker().await?;

        self.frontend
            .info(&format!("Deploying microservice: {}", microservice.name));
        match self.deploy_inner(microservice).await {
            Ok(()) => {
                self.frontend.info(&format!(
                    "Microservice {} deployed successfully.",
                    microservice.name
                ));
                Ok(())
            }
            Err(e) => {
                self.frontend
                    .error(&format!("Failed to deploy microservice: {e}"));
                Err(e)
            }
        }
    }

    pub async fn start(&self, microservice: &Microservice) -> Result<StartOutcome> {
        let _guard = self.begin()?;
        self.ensure_docker().await?;

        let name = &microservice.name;
        let outcome = self.start_inner(microservice).await;
        match outcome {
            StartOutcome::Started => self
                .frontend
                .info(&format!("Microservice {name} started successfully.")),
            StartOutcome::AlreadyRunning => self
                .frontend
                .warn(&format!("Microservice \"{name}\" is already running.")),
            StartOutcome::Deployed => self
                .frontend
                .info(&format!("Microservice {name} deployed successfully.")),
            StartOutcome::Failed => {
                self.frontend.error(&format!(
                    "Failed to start microservice {name}. Check the logs to debug the issue."
                ));
                self.frontend.show_logs(&microservice.project).await;
            }
        }
        Ok(outcome)
    }

    pub async fn stop(&self, microservice: &Microservice) -> Result<StopOutcome> {
        let _guard = self.begin()?;
        self.ensure_docker().await?;

        let name = &microservice.name;
        self.frontend.info(&format!("Stopping microservice: {name}"));
        let outcome = self.stop_inner(microservice).await;
        match outcome {
            StopOutcome::Stopped => self
                .frontend
                .info(&format!("Microservice {name} stopped successfully.")),
            StopOutcome::AlreadyStopped => self
                .frontend
                .info(&format!("Microservice \"{name}\" is already stopped.")),
            StopOutcome::Failed => self
                .frontend
                .error(&format!("Failed to stop microservice \"{name}\".")),
        }
        Ok(outcome)
    }

    pub async fn restart(&self, microservice: &Microservice) -> Result<RestartOutcome> {
        let _guard = self.begin()?;
        self.ensure_docker().await?;

        let name = &microservice.name;
        let outcome = self.restart_inner(microservice).await;
        match outcome {
            RestartOutcome::Restarted => self
                .frontend
                .info(&format!("Microservice {name} restarted successfully.")),
            RestartOutcome::Deployed => self
                .frontend
                .info(&format!("Microservice {name} deployed successfully.")),
            RestartOutcome::Failed => {
                self.frontend.error(&format!(
                    "Failed to restart microservice {name}. Check the logs to debug the issue and restart project."
                ));
                self.frontend.show_logs(&microservice.project).await;
            }
        }
        Ok(outcome)
    }

    // ---------------------------------------------------------------
    // 批量操作（逐个处理，每个分类一条汇总通知）
    // ---------------------------------------------------------------

    fn project_microservices(&self, project: &Project) -> Vec<Microservice> {
        let microservices = workspace::list_microservices(project);
        if microservices.is_empty() {
            self.frontend
                .error("No microservices found in the selected project");
        }
        microservices
    }

    pub async fn start_all(&self, project: &Project) -> Result<BulkReport<StartOutcome>> {
        let _guard = self.begin()?;
        self.ensure_docker().await?;

        let mut report = BulkReport::default();
        for microservice in self.project_microservices(project) {
            let outcome = self.start_inner(&microservice).await;
            report.push(microservice.name, outcome);
        }
        self.publish(report.notifications());
        if report.count(StartOutcome::Failed) > 0 {
            self.frontend.show_logs(project).await;
        }
        Ok(report)
    }

    pub async fn stop_all(&self, project: &Project) -> Result<BulkReport<StopOutcome>> {
        let _guard = self.begin()?;
        self.ensure_docker().await?;

        let mut report = BulkReport::default();
        for microservice in self.project_microservices(project) {
            let outcome = self.stop_inner(&microservice).await;
            report.push(microservice.name, outcome);
        }
        self.publish(report.notifications());
        Ok(report)
    }

    pub async fn restart_all(&self, project: &Project) -> Result<BulkReport<RestartOutcome>> {
        let _guard = self.begin()?;
        self.ensure_docker().await?;

        let mut report = BulkReport::default();
        for microservice in self.project_microservices(project) {
            let outcome = self.restart_inner(&microservice).await;
            report.push(microservice.name, outcome);
        }
        self.publish(report.notifications());
        if report.count(RestartOutcome::Failed) > 0 {
            self.frontend.show_logs(project).await;
        }
        Ok(report)
    }

    /// 停止并删除项目中所有微服务的容器
    ///
    /// `Stopped` 表示容器已删除，`AlreadyStopped` 表示没有对应容器。
    pub async fn teardown_project(&self, project: &Project) -> Result<BulkReport<StopOutcome>> {
        let _guard = self.begin()?;
        self.ensure_docker().await?;

        let mut report = BulkReport::default();
        for microservice in self.project_microservices(project) {
            let outcome = match self.remove_microservice(&microservice).await {
                Ok(true) => StopOutcome::Stopped,
                Ok(false) => StopOutcome::AlreadyStopped,
                Err(e) => {
                    error!("❌ 删除微服务 {} 的容器失败: {}", microservice.name, e);
                    StopOutcome::Failed
                }
            };
            report.push(microservice.name, outcome);
        }

        let removed = report.count(StopOutcome::Stopped);
        if removed > 0 {
            self.frontend.info(&format!(
                "Removed {removed} microservice container(s) of project {}.",
                project.name
            ));
        }
        let failed = report.count(StopOutcome::Failed);
        if failed > 0 {
            self.frontend
                .error(&format!("Failed to remove {failed} microservice container(s)."));
        }
        Ok(report)
    }

    fn publish(&self, notifications: Vec<super::frontend::Notification>) {
        for notification in notifications {
            self.frontend.notify(notification);
        }
    }

    // ---------------------------------------------------------------
    // 内部实现（调用方已持有操作标志）
    // ---------------------------------------------------------------

    async fn current_container(&self, microservice: &Microservice) -> Result<Option<ContainerSummary>> {
        let containers = self.engine.list_containers().await?;
        Ok(find_container(&containers, &microservice.name).cloned())
    }

    /// 确保 compose 中有服务定义，然后 `compose up -d`，等待就绪
    async fn deploy_inner(&self, microservice: &Microservice) -> Result<()> {
        let project = &microservice.project;
        compose::update_docker_compose(&project.path, &project.name, &microservice.name)?;

        let compose_file = project.compose_file();
        let service = microservice.service_name();
        info!("🚀 部署微服务 {} ({})", service, compose_file.display());

        let output = self.engine.compose_up(&compose_file, &service).await?;
        self.report_compose_warnings(&output.critical_lines());

        let container = self.current_container(microservice).await?.ok_or_else(|| {
            MicrodockError::docker(format!("部署后未找到 {service} 的容器"))
        })?;
        if !container.is_running() {
            return Err(MicrodockError::docker(format!(
                "{service} 部署后未运行 (状态: {})",
                container.state.display_name()
            )));
        }

        match container.host_port() {
            Some(port) => {
                self.await_ready_and_open(microservice, port, self.settings.deploy_timeout)
                    .await
            }
            None => warn!("⚠️ {} 没有对外发布端口，跳过就绪检查", service),
        }
        info!("✅ 微服务 {} 部署完成", microservice.name);
        Ok(())
    }

    async fn start_inner(&self, microservice: &Microservice) -> StartOutcome {
        let container = match self.current_container(microservice).await {
            Ok(container) => container,
            Err(e) => {
                error!("❌ 获取 {} 的容器失败: {}", microservice.name, e);
                return StartOutcome::Failed;
            }
        };

        let Some(container) = container else {
            self.frontend.info(&format!(
                "Container for microservice {} not found. Deploying microservice.",
                microservice.name
            ));
            return match self.deploy_inner(microservice).await {
                Ok(()) => StartOutcome::Deployed,
                Err(e) => {
                    error!("❌ 部署微服务 {} 失败: {}", microservice.name, e);
                    StartOutcome::Failed
                }
            };
        };

        if container.is_running() {
            info!("微服务 {} 已在运行", microservice.name);
            if let Some(port) = container.host_port() {
                if !self.is_opened(port).await {
                    self.await_ready_and_open(microservice, port, self.settings.start_timeout)
                        .await;
                }
            }
            return StartOutcome::AlreadyRunning;
        }

        match self.start_container(microservice, &container).await {
            Ok(port) => {
                if let Some(port) = port {
                    self.await_ready_and_open(microservice, port, self.settings.start_timeout)
                        .await;
                }
                info!("✅ 微服务 {} 已启动", microservice.name);
                StartOutcome::Started
            }
            Err(e) => {
                error!("❌ 启动微服务 {} 失败: {}", microservice.name, e);
                StartOutcome::Failed
            }
        }
    }

    /// 启动已存在的容器，返回启动后的主机端口
    async fn start_container(
        &self,
        microservice: &Microservice,
        container: &ContainerSummary,
    ) -> Result<Option<u16>> {
        self.engine.start_container(&container.id).await?;

        // 已停止容器的端口信息为空，启动后重新获取
        let started = self.current_container(microservice).await?;
        Ok(started.and_then(|c| c.host_port()))
    }

    async fn stop_inner(&self, microservice: &Microservice) -> StopOutcome {
        let container = match self.current_container(microservice).await {
            Ok(Some(container)) => container,
            Ok(None) => {
                info!("微服务 {} 没有容器", microservice.name);
                return StopOutcome::AlreadyStopped;
            }
            Err(e) => {
                error!("❌ 获取 {} 的容器失败: {}", microservice.name, e);
                return StopOutcome::Failed;
            }
        };

        if !container.is_running() {
            info!(
                "微服务 {} 未在运行 (状态: {})",
                microservice.name,
                container.state.display_name()
            );
            return StopOutcome::AlreadyStopped;
        }

        match self.engine.stop_container(&container.id).await {
            Ok(()) => {
                info!("🛑 微服务 {} 已停止", microservice.name);
                StopOutcome::Stopped
            }
            Err(e) => {
                error!("❌ 停止微服务 {} 失败: {}", microservice.name, e);
                StopOutcome::Failed
            }
        }
    }

    async fn restart_inner(&self, microservice: &Microservice) -> RestartOutcome {
        let container = match self.current_container(microservice).await {
            Ok(container) => container,
            Err(e) => {
                error!("❌ 获取 {} 的容器失败: {}", microservice.name, e);
                return RestartOutcome::Failed;
            }
        };

        let Some(container) = container else {
            self.frontend.info(&format!(
                "Container for microservice {} not found. Deploying microservice.",
                microservice.name
            ));
            return match self.deploy_inner(microservice).await {
                Ok(()) => RestartOutcome::Deployed,
                Err(e) => {
                    error!("❌ 部署微服务 {} 失败: {}", microservice.name, e);
                    RestartOutcome::Failed
                }
            };
        };

        match self.rebuild_container(microservice, &container).await {
            Ok(port) => {
                if let Some(port) = port {
                    self.await_ready_and_open(microservice, port, self.settings.start_timeout)
                        .await;
                }
                info!("✅ 微服务 {} 已重启", microservice.name);
                RestartOutcome::Restarted
            }
            Err(e) => {
                error!("❌ 重启微服务 {} 失败: {}", microservice.name, e);
                RestartOutcome::Failed
            }
        }
    }

    /// 停止 → 重新构建镜像 → 删除旧容器 → `compose up -d`
    async fn rebuild_container(
        &self,
        microservice: &Microservice,
        container: &ContainerSummary,
    ) -> Result<Option<u16>> {
        let compose_file = microservice.project.compose_file();
        let service = microservice.service_name();

        if container.is_running() {
            info!("🛑 停止容器 {}", container.names);
            self.engine.stop_container(&container.id).await?;
        }

        info!("🔨 重新构建镜像 {}", service);
        self.engine.compose_build(&compose_file, &service).await?;

        // 只创建未启动过的容器会被 compose up 直接复用
        if container.state != ContainerState::Created {
            self.engine.remove_container(&container.id).await?;
        }

        let output = self.engine.compose_up(&compose_file, &service).await?;
        self.report_compose_warnings(&output.critical_lines());

        let restarted = self
            .current_container(microservice)
            .await?
            .filter(|c| c.is_running())
            .ok_or_else(|| MicrodockError::docker(format!("{service} 重启后未运行")))?;
        Ok(restarted.host_port())
    }

    /// 停止并删除容器，返回是否存在容器
    async fn remove_microservice(&self, microservice: &Microservice) -> Result<bool> {
        let Some(container) = self.current_container(microservice).await? else {
            return Ok(false);
        };
        if container.is_running() {
            self.engine.stop_container(&container.id).await?;
        }
        self.engine.remove_container(&container.id).await?;
        info!("🗑️ 已删除微服务 {} 的容器", microservice.name);
        Ok(true)
    }

    fn report_compose_warnings(&self, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        warn!("⚠️ Docker Compose 输出: {}", lines.join(" | "));
        self.frontend.warn(&format!(
            "Docker Compose reported warnings or errors: {}",
            lines.join("\n")
        ));
    }

    // ---------------------------------------------------------------
    // 就绪检查与打开浏览器
    // ---------------------------------------------------------------

    async fn is_opened(&self, port: u16) -> bool {
        self.opened_ports.lock().await.contains(&port)
    }

    /// 等待服务就绪，每个端口只打开一次浏览器；超时只提示不回滚
    async fn await_ready_and_open(&self, microservice: &Microservice, port: u16, max_wait: Duration) {
        match wait_for_ready(&self.http, port, max_wait, self.settings.interval).await {
            Ok(()) => self.open_once(port).await,
            Err(e) => {
                warn!("⚠️ 微服务 {} 未就绪: {}", microservice.name, e);
                self.frontend.error(&format!(
                    "Microservice {} is not ready yet: {e}",
                    microservice.name
                ));
            }
        }
    }

    async fn open_once(&self, port: u16) {
        if !self.settings.open_browser {
            return;
        }
        let newly_opened = self.opened_ports.lock().await.insert(port);
        if newly_opened {
            self.frontend.open_external(&http::docs_url(port));
        }
    }
}
