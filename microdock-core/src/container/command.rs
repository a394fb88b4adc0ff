use super::types::{ComposeOutput, ComposeProgram, DockerCli};
use crate::{MicrodockError, Result};
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::{debug, warn};

impl DockerCli {
    /// 检查 Docker 状态
    pub async fn check_docker_status(&self) -> Result<()> {
        // 检查 docker 命令
        if which::which("docker").is_err() {
            return Err(MicrodockError::docker_unavailable(
                "Docker 未安装或不在 PATH 中",
            ));
        }

        // 检查 Docker 服务是否运行
        let output = self.run_docker_command(&["info"]).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MicrodockError::docker_unavailable(format!(
                "Docker 服务未运行: {}",
                stderr.trim()
            )));
        }

        Ok(())
    }

    /// 检测可用的 compose 调用方式，结果只计算一次
    pub(crate) async fn compose_program(&self) -> ComposeProgram {
        *self
            .compose_program
            .get_or_init(|| async {
                let plugin_ok = matches!(
                    self.run_docker_command(&["compose", "version"]).await,
                    Ok(output) if output.status.success()
                );

                if plugin_ok || which::which("docker-compose").is_err() {
                    debug!("使用 docker compose 子命令");
                    ComposeProgram::Plugin
                } else {
                    debug!("回退到独立的 docker-compose 命令");
                    ComposeProgram::Standalone
                }
            })
            .await
    }

    /// 构造 compose 命令，工作目录为 compose 文件所在目录
    pub(crate) async fn compose_command(&self, compose_file: &Path) -> Command {
        let mut cmd = match self.compose_program().await {
            ComposeProgram::Plugin => {
                let mut cmd = Command::new("docker");
                cmd.arg("compose");
                cmd
            }
            ComposeProgram::Standalone => Command::new("docker-compose"),
        };

        cmd.arg("-f").arg(compose_file);
        if let Some(dir) = compose_file.parent() {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// 执行 compose 命令，非零退出码视为失败
    pub(crate) async fn run_compose_command(
        &self,
        compose_file: &Path,
        args: &[&str],
    ) -> Result<ComposeOutput> {
        let output = self
            .compose_command(compose_file)
            .await
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        let result = ComposeOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !output.status.success() {
            warn!("compose {:?} 执行失败: {}", args, result.stderr.trim());
            return Err(MicrodockError::compose(result.stderr.trim().to_string()));
        }

        Ok(result)
    }

    /// 构造查看 compose 日志的命令（`compose logs [-f] [--tail N]`）
    pub async fn logs_command(
        &self,
        compose_file: &Path,
        follow: bool,
        tail: Option<usize>,
    ) -> Command {
        let mut cmd = self.compose_command(compose_file).await;
        cmd.arg("logs");
        if follow {
            cmd.arg("-f");
        }
        if let Some(tail) = tail {
            cmd.arg("--tail").arg(tail.to_string());
        }
        cmd
    }

    /// 执行 docker 命令
    pub(crate) async fn run_docker_command(&self, args: &[&str]) -> Result<Output> {
        let output = Command::new("docker")
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        Ok(output)
    }

    /// 执行 docker 命令，非零退出码转换为错误
    pub(crate) async fn run_docker_checked(&self, args: &[&str]) -> Result<String> {
        let output = self.run_docker_command(args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MicrodockError::docker(format!(
                "docker {} 失败: {}",
                args.join(" "),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
