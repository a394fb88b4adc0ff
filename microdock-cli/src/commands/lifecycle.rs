use crate::app::CliApp;
use microdock_core::lifecycle::{BulkReport, RestartOutcome, StartOutcome, StopOutcome};
use microdock_core::{MicrodockError, Result};
use std::fmt::Debug;
use std::future::Future;
use tracing::{debug, info};

/// 在 spinner 下执行编排操作
async fn with_progress<T>(
    app: &CliApp,
    message: String,
    operation: impl Future<Output = Result<T>>,
) -> Result<T> {
    app.frontend.begin_progress(message);
    let result = operation.await;
    app.frontend.end_progress();
    result
}

fn ensure_succeeded(failed: bool, what: &str) -> Result<()> {
    if failed {
        Err(MicrodockError::custom(format!("{what} 失败")))
    } else {
        Ok(())
    }
}

/// 输出批量操作的明细，存在失败项时返回错误
fn finish_bulk<O: Copy + PartialEq + Debug>(
    report: &BulkReport<O>,
    failed: O,
    what: &str,
) -> Result<()> {
    if report.is_empty() {
        info!("ℹ️  项目中没有微服务");
        return Ok(());
    }
    for (name, outcome) in &report.results {
        debug!("   {}: {:?}", name, outcome);
    }
    match report.count(failed) {
        0 => Ok(()),
        n => Err(MicrodockError::custom(format!("{what}: {n} 个微服务失败"))),
    }
}

/// 部署单个微服务
pub async fn run_deploy(app: &CliApp, project: &str, service: &str) -> Result<()> {
    let microservice = app.microservice(project, service)?;
    with_progress(
        app,
        format!("🚀 正在部署 {}/{} ...", microservice.project.name, microservice.name),
        app.orchestrator.deploy(&microservice),
    )
    .await
}

/// 启动单个微服务或项目中的全部微服务
pub async fn run_start(app: &CliApp, project: &str, service: Option<&str>) -> Result<()> {
    match service {
        Some(service) => {
            let microservice = app.microservice(project, service)?;
            let outcome = with_progress(
                app,
                format!("▶ 正在启动 {}/{} ...", project, microservice.name),
                app.orchestrator.start(&microservice),
            )
            .await?;
            ensure_succeeded(outcome == StartOutcome::Failed, "启动微服务")
        }
        None => {
            let project = app.project(project)?;
            let report = with_progress(
                app,
                format!("▶ 正在启动项目 {} 的全部微服务 ...", project.name),
                app.orchestrator.start_all(&project),
            )
            .await?;
            finish_bulk(&report, StartOutcome::Failed, "批量启动")
        }
    }
}

/// 停止单个微服务或项目中的全部微服务
pub async fn run_stop(app: &CliApp, project: &str, service: Option<&str>) -> Result<()> {
    match service {
        Some(service) => {
            let microservice = app.microservice(project, service)?;
            let outcome = with_progress(
                app,
                format!("⏹ 正在停止 {}/{} ...", project, microservice.name),
                app.orchestrator.stop(&microservice),
            )
            .await?;
            ensure_succeeded(outcome == StopOutcome::Failed, "停止微服务")
        }
        None => {
            let project = app.project(project)?;
            let report = with_progress(
                app,
                format!("⏹ 正在停止项目 {} 的全部微服务 ...", project.name),
                app.orchestrator.stop_all(&project),
            )
            .await?;
            finish_bulk(&report, StopOutcome::Failed, "批量停止")
        }
    }
}

/// 重新构建并重启单个微服务或项目中的全部微服务
pub async fn run_restart(app: &CliApp, project: &str, service: Option<&str>) -> Result<()> {
    match service {
        Some(service) => {
            let microservice = app.microservice(project, service)?;
            let outcome = with_progress(
                app,
                format!("🔄 正在重启 {}/{} ...", project, microservice.name),
                app.orchestrator.restart(&microservice),
            )
            .await?;
            ensure_succeeded(outcome == RestartOutcome::Failed, "重启微服务")
        }
        None => {
            let project = app.project(project)?;
            let report = with_progress(
                app,
                format!("🔄 正在重启项目 {} 的全部微服务 ...", project.name),
                app.orchestrator.restart_all(&project),
            )
            .await?;
            finish_bulk(&report, RestartOutcome::Failed, "批量重启")
        }
    }
}

/// 停止并删除项目中所有微服务的容器
pub async fn run_teardown(app: &CliApp, project: &str) -> Result<()> {
    let project = app.project(project)?;
    let report = with_progress(
        app,
        format!("🧹 正在清理项目 {} 的容器 ...", project.name),
        app.orchestrator.teardown_project(&project),
    )
    .await?;
    finish_bulk(&report, StopOutcome::Failed, "清理项目")
}
