//! 本地运行模式：不经过 Docker，直接在微服务目录中启动开发服务器
//!
//! 端口取自 docker-compose.yml 中该服务的主机端口映射，
//! 因此本地运行和容器运行时访问的地址相同。

use crate::compose;
use crate::constants::local::PORT_PLACEHOLDER;
use crate::lifecycle::{StartOutcome, StopOutcome};
use crate::status::{MicroserviceEntry, MicroserviceStatus, ProjectStatus};
use crate::workspace::{Microservice, Project};
use crate::{MicrodockError, Result};
use std::collections::HashMap;
use std::fs;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// 从项目的 docker-compose.yml 读取微服务的主机端口
pub fn local_port(microservice: &Microservice) -> Result<u16> {
    let compose_file = microservice.project.compose_file();
    if !compose_file.exists() {
        return Err(MicrodockError::custom(format!(
            "docker-compose.yml not found in {}",
            microservice.project.deployment_dir().display()
        )));
    }

    let content = fs::read_to_string(&compose_file)?;
    compose::service_host_port(&content, &microservice.service_name()).ok_or_else(|| {
        MicrodockError::custom(format!(
            "Could not find port for microservice \"{}\" in docker-compose.yml",
            microservice.name
        ))
    })
}

/// 用端口替换命令模板中的 `{port}`
pub fn render_command(template: &[String], port: u16) -> Result<Command> {
    let (program, args) = template
        .split_first()
        .ok_or_else(|| MicrodockError::custom("本地运行命令为空"))?;

    let port = port.to_string();
    let mut cmd = Command::new(program.replace(PORT_PLACEHOLDER, &port));
    cmd.args(args.iter().map(|arg| arg.replace(PORT_PLACEHOLDER, &port)));
    Ok(cmd)
}

struct LocalProcess {
    child: Child,
    port: u16,
}

/// 本地微服务进程表
///
/// 进程随 `LocalRunner` 一起结束（`kill_on_drop`）。
pub struct LocalRunner {
    command: Vec<String>,
    processes: Mutex<HashMap<String, LocalProcess>>,
}

fn process_key(microservice: &Microservice) -> String {
    format!("{}/{}", microservice.project.name, microservice.name)
}

impl LocalRunner {
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            processes: Mutex::new(HashMap::new()),
        }
    }

    /// 在微服务目录中启动本地进程，返回结果和使用的端口
    pub async fn start(&self, microservice: &Microservice) -> Result<(StartOutcome, u16)> {
        let key = process_key(microservice);
        let mut processes = self.processes.lock().await;

        if let Some(process) = processes.get_mut(&key) {
            if process.child.try_wait()?.is_none() {
                warn!("⚠️ 本地微服务 {} 已在运行", microservice.name);
                return Ok((StartOutcome::AlreadyRunning, process.port));
            }
            processes.remove(&key);
        }

        let port = local_port(microservice)?;
        let mut cmd = render_command(&self.command, port)?;
        cmd.current_dir(&microservice.path)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!("本地启动命令: {:?}", cmd);
        let child = cmd.spawn()?;
        info!(
            "▶ 本地微服务 {} 已启动 (端口 {}, pid {:?})",
            microservice.name,
            port,
            child.id()
        );
        processes.insert(key, LocalProcess { child, port });
        Ok((StartOutcome::Started, port))
    }

    /// 结束本地进程
    pub async fn stop(&self, microservice: &Microservice) -> Result<StopOutcome> {
        let process = self.processes.lock().await.remove(&process_key(microservice));
        let Some(mut process) = process else {
            return Ok(StopOutcome::AlreadyStopped);
        };

        if process.child.try_wait()?.is_some() {
            return Ok(StopOutcome::AlreadyStopped);
        }
        process.child.kill().await?;
        info!("🛑 本地微服务 {} 已停止", microservice.name);
        Ok(StopOutcome::Stopped)
    }

    /// 结束所有本地进程，返回结束的数量
    pub async fn stop_all(&self) -> usize {
        let processes: Vec<(String, LocalProcess)> =
            self.processes.lock().await.drain().collect();

        let mut stopped = 0;
        for (key, mut process) in processes {
            if matches!(process.child.try_wait(), Ok(Some(_))) {
                continue;
            }
            match process.child.kill().await {
                Ok(()) => stopped += 1,
                Err(e) => warn!("⚠️ 结束本地进程 {} 失败: {}", key, e),
            }
        }
        stopped
    }

    /// 本地进程是否仍在运行（已退出的进程会被回收）
    pub async fn status(&self, microservice: &Microservice) -> MicroserviceStatus {
        let key = process_key(microservice);
        let mut processes = self.processes.lock().await;

        let Some(process) = processes.get_mut(&key) else {
            return MicroserviceStatus::Stopped;
        };
        match process.child.try_wait() {
            Ok(None) => MicroserviceStatus::Running,
            Ok(Some(status)) => {
                info!("本地微服务 {} 已退出: {}", microservice.name, status);
                processes.remove(&key);
                MicroserviceStatus::Stopped
            }
            Err(e) => MicroserviceStatus::Error(e.to_string()),
        }
    }

    /// 项目中各微服务的本地运行状态
    pub async fn project_status(
        &self,
        project: &Project,
        microservices: &[Microservice],
    ) -> ProjectStatus {
        let mut entries = Vec::with_capacity(microservices.len());
        for microservice in microservices {
            entries.push(MicroserviceEntry {
                status: self.status(microservice).await,
                microservice: microservice.clone(),
            });
        }
        ProjectStatus {
            project: project.clone(),
            microservices: entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::tempdir;

    fn fixture(root: &Path, port_line: &str) -> Microservice {
        let project = Project::new("demo", root.join("demo"));
        let path = project.microservices_dir().join("auth");
        fs::create_dir_all(&path).unwrap();
        fs::create_dir_all(project.deployment_dir()).unwrap();
        fs::write(
            project.compose_file(),
            format!("services:\n  microservice-auth:\n    ports:\n      - {port_line}\n"),
        )
        .unwrap();
        Microservice::new("auth", path, project)
    }

    fn command(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_local_port_from_compose() {
        let dir = tempdir().unwrap();
        let microservice = fixture(dir.path(), "\"8004:8000\"");
        assert_eq!(local_port(&microservice).unwrap(), 8004);
    }

    #[test]
    fn test_local_port_requires_compose_file() {
        let dir = tempdir().unwrap();
        let project = Project::new("demo", dir.path().join("demo"));
        let microservice = Microservice::new("auth", dir.path().join("demo/microservices/auth"), project);

        let err = local_port(&microservice).unwrap_err();
        assert!(err.to_string().contains("docker-compose.yml not found"));
    }

    #[test]
    fn test_render_command_replaces_port() {
        let cmd = render_command(
            &command(&["uvicorn", "app.main:app", "--port", "{port}"]),
            8002,
        )
        .unwrap();
        let std_cmd = cmd.as_std();
        assert_eq!(std_cmd.get_program(), "uvicorn");
        let args: Vec<_> = std_cmd.get_args().collect();
        assert_eq!(args, ["app.main:app", "--port", "8002"]);

        assert!(render_command(&[], 8002).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_start_stop_lifecycle() {
        let dir = tempdir().unwrap();
        let microservice = fixture(dir.path(), "\"8005:8000\"");
        let runner = LocalRunner::new(command(&["sleep", "30"]));

        assert_eq!(runner.status(&microservice).await, MicroserviceStatus::Stopped);

        let (outcome, port) = runner.start(&microservice).await.unwrap();
        assert_eq!((outcome, port), (StartOutcome::Started, 8005));
        assert_eq!(runner.status(&microservice).await, MicroserviceStatus::Running);

        let (again, _) = runner.start(&microservice).await.unwrap();
        assert_eq!(again, StartOutcome::AlreadyRunning);

        let summary = runner
            .project_status(&microservice.project, std::slice::from_ref(&microservice))
            .await;
        assert_eq!((summary.running_count(), summary.total()), (1, 1));

        assert_eq!(runner.stop(&microservice).await.unwrap(), StopOutcome::Stopped);
        assert_eq!(runner.status(&microservice).await, MicroserviceStatus::Stopped);
        assert_eq!(
            runner.stop(&microservice).await.unwrap(),
            StopOutcome::AlreadyStopped
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exited_process_is_reported_stopped() {
        let dir = tempdir().unwrap();
        let microservice = fixture(dir.path(), "\"8006:8000\"");
        let runner = LocalRunner::new(command(&["true"]));

        runner.start(&microservice).await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), async {
            while runner.status(&microservice).await == MicroserviceStatus::Running {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .unwrap();

        assert_eq!(runner.stop_all().await, 0);
    }

    #[tokio::test]
    async fn test_start_without_port_mapping_fails() {
        let dir = tempdir().unwrap();
        let microservice = fixture(dir.path(), "\"8007:8000\"");
        fs::write(
            microservice.project.compose_file(),
            "services:\n  microservice-auth:\n    image: auth\n",
        )
        .unwrap();

        let runner = LocalRunner::new(command(&["sleep", "30"]));
        let err = runner.start(&microservice).await.unwrap_err();
        assert!(err.to_string().contains("Could not find port"));
        assert_eq!(runner.stop_all().await, 0);
    }
}
