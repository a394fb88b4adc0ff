use crate::app::CliApp;
use microdock_core::{MicrodockError, Result};
use std::process::Stdio;
use tracing::info;

/// 持续输出项目的 docker compose 日志，直到用户中断
pub async fn run_logs(app: &CliApp, project: &str, tail: Option<usize>) -> Result<()> {
    let project = app.project(project)?;
    let compose_file = project.compose_file();
    if !compose_file.exists() {
        return Err(MicrodockError::custom(format!(
            "docker-compose.yml not found in deployment folder: {}",
            compose_file.display()
        )));
    }

    info!("📜 项目 {} 的日志 (Ctrl+C 退出)", project.name);
    let mut cmd = app.docker.logs_command(&compose_file, true, tail).await;
    let status = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await?;

    if !status.success() {
        return Err(MicrodockError::Compose(format!(
            "docker compose logs 退出码: {status}"
        )));
    }
    Ok(())
}
