use crate::app::CliApp;
use microdock_core::constants::{http, local::STATUS_CHECK_INTERVAL_MS};
use microdock_core::lifecycle::{Frontend, readiness_client, wait_for_ready};
use microdock_core::local::LocalRunner;
use microdock_core::presentation::project_summary;
use microdock_core::workspace::{self, Microservice};
use microdock_core::{MicrodockError, Result};
use std::time::Duration;
use tracing::{error, info, warn};

/// 要在本地运行的微服务：指定名称时只运行一个，否则运行项目中的全部微服务
fn local_targets(app: &CliApp, project: &str, service: Option<&str>) -> Result<Vec<Microservice>> {
    match service {
        Some(service) => Ok(vec![app.microservice(project, service)?]),
        None => {
            let project = app.project(project)?;
            let microservices = workspace::list_microservices(&project);
            if microservices.is_empty() {
                return Err(MicrodockError::custom(
                    "No microservices found in the selected project",
                ));
            }
            Ok(microservices)
        }
    }
}

/// 在本地前台运行微服务，直到 Ctrl+C 或所有进程退出
pub async fn run_local(app: &CliApp, project: &str, service: Option<&str>) -> Result<()> {
    let targets = local_targets(app, project, service)?;
    let project = targets[0].project.clone();
    let runner = LocalRunner::new(app.config.local.command.clone());

    let mut started = Vec::new();
    let mut failed = 0;
    for microservice in &targets {
        match runner.start(microservice).await {
            Ok((_, port)) => started.push((microservice, port)),
            Err(e) => {
                error!("❌ Failed to start local microservice {}: {}", microservice.name, e);
                failed += 1;
            }
        }
    }
    if started.is_empty() {
        return Err(MicrodockError::custom("没有成功启动的本地微服务"));
    }

    let settings = app.config.readiness_settings();
    let client = readiness_client()?;
    for (microservice, port) in &started {
        match wait_for_ready(&client, *port, settings.start_timeout, settings.interval).await {
            Ok(()) if settings.open_browser => app.frontend.open_external(&http::docs_url(*port)),
            Ok(()) => {}
            Err(e) => warn!("⚠️  Microservice {} is not ready yet: {}", microservice.name, e),
        }
    }

    let summary = runner.project_status(&project, &targets).await;
    info!("📦 {} ({})，按 Ctrl+C 结束", project.name, project_summary(&summary));

    let mut last_running = summary.running_count();
    let mut ticker = tokio::time::interval(Duration::from_millis(STATUS_CHECK_INTERVAL_MS));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let summary = runner.project_status(&project, &targets).await;
                let running = summary.running_count();
                if running != last_running {
                    info!("📦 {} ({})", project.name, project_summary(&summary));
                    last_running = running;
                }
                if running == 0 {
                    warn!("⚠️  所有本地微服务都已退出");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("👋 正在停止本地微服务");
                break;
            }
        }
    }

    let stopped = runner.stop_all().await;
    info!("🛑 已停止 {} 个本地微服务", stopped);

    match failed {
        0 => Ok(()),
        n => Err(MicrodockError::custom(format!("{n} 个本地微服务启动失败"))),
    }
}
