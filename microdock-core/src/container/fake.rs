//! 测试用的内存容器引擎，记录每一次调用

use super::engine::ContainerEngine;
use super::types::{ComposeOutput, ContainerState, ContainerSummary, DockerEvent};
use crate::{MicrodockError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;
use tokio::sync::mpsc;

#[derive(Debug)]
struct FakeState {
    installed: bool,
    daemon_running: bool,
    list_error: Option<String>,
    containers: Vec<ContainerSummary>,
    calls: Vec<String>,
    fail_start: bool,
    fail_compose_up: bool,
    /// compose up 后容器是否处于运行状态
    up_leaves_running: bool,
    compose_stderr: String,
    next_port: u16,
    next_id: usize,
    event_senders: Vec<mpsc::Sender<DockerEvent>>,
}

#[derive(Debug)]
pub(crate) struct FakeEngine {
    state: Mutex<FakeState>,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self {
            state: Mutex::new(FakeState {
                installed: true,
                daemon_running: true,
                list_error: None,
                containers: Vec::new(),
                calls: Vec::new(),
                fail_start: false,
                fail_compose_up: false,
                up_leaves_running: true,
                compose_stderr: String::new(),
                next_port: 8000,
                next_id: 0,
                event_senders: Vec::new(),
            }),
        }
    }
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn add_container(&self, name: &str, state: ContainerState, host_port: Option<u16>) {
        self.with_state(|s| {
            s.next_id += 1;
            let ports = host_port
                .map(|port| format!("0.0.0.0:{port}->8000/tcp"))
                .unwrap_or_default();
            s.containers.push(ContainerSummary {
                id: format!("id-{}", s.next_id),
                names: name.to_string(),
                image: name.to_string(),
                state,
                ports,
            });
        });
    }

    pub fn set_installed(&self, installed: bool) {
        self.with_state(|s| s.installed = installed);
    }

    pub fn set_daemon_running(&self, running: bool) {
        self.with_state(|s| s.daemon_running = running);
    }

    pub fn set_list_error(&self, message: Option<&str>) {
        self.with_state(|s| s.list_error = message.map(str::to_string));
    }

    pub fn set_fail_start(&self, fail: bool) {
        self.with_state(|s| s.fail_start = fail);
    }

    pub fn set_fail_compose_up(&self, fail: bool) {
        self.with_state(|s| s.fail_compose_up = fail);
    }

    pub fn set_up_leaves_running(&self, running: bool) {
        self.with_state(|s| s.up_leaves_running = running);
    }

    pub fn set_next_port(&self, port: u16) {
        self.with_state(|s| s.next_port = port);
    }

    pub fn set_compose_stderr(&self, stderr: &str) {
        self.with_state(|s| s.compose_stderr = stderr.to_string());
    }

    pub fn state_of(&self, name: &str) -> Option<ContainerState> {
        self.with_state(|s| {
            s.containers
                .iter()
                .find(|c| c.names == name)
                .map(|c| c.state)
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.with_state(|s| s.calls.clone())
    }

    /// 不包含 info / list 这类只读调用
    pub fn mutating_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call != "list" && call != "info" && call != "which")
            .collect()
    }

    pub async fn emit(&self, event: DockerEvent) {
        let senders = self.with_state(|s| s.event_senders.clone());
        for sender in senders {
            let _ = sender.send(event.clone()).await;
        }
    }

    /// 关闭所有已订阅的事件流（模拟 `docker events` 进程退出）
    pub fn close_event_streams(&self) {
        self.with_state(|s| s.event_senders.clear());
    }

    fn set_container_state(&self, id: &str, state: ContainerState) -> Result<()> {
        self.with_state(|s| {
            let container = s
                .containers
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| MicrodockError::docker(format!("no such container: {id}")))?;
            container.state = state;
            Ok(())
        })
    }
}

#[async_trait]
impl ContainerEngine for FakeEngine {
    async fn is_installed(&self) -> bool {
        self.with_state(|s| {
            s.calls.push("which".to_string());
            s.installed
        })
    }

    async fn is_daemon_running(&self) -> bool {
        self.with_state(|s| {
            s.calls.push("info".to_string());
            s.installed && s.daemon_running
        })
    }

    async fn list_containers(&self) -> Result<Vec<ContainerSummary>> {
        self.with_state(|s| {
            s.calls.push("list".to_string());
            match &s.list_error {
                Some(message) => Err(MicrodockError::docker(message.clone())),
                None => Ok(s.containers.clone()),
            }
        })
    }

    async fn start_container(&self, id: &str) -> Result<()> {
        let fail = self.with_state(|s| {
            s.calls.push(format!("start:{id}"));
            s.fail_start
        });
        if fail {
            return Err(MicrodockError::docker("start failed"));
        }
        self.set_container_state(id, ContainerState::Running)
    }

    async fn stop_container(&self, id: &str) -> Result<()> {
        self.with_state(|s| s.calls.push(format!("stop:{id}")));
        self.set_container_state(id, ContainerState::Exited)
    }

    async fn remove_container(&self, id: &str) -> Result<()> {
        self.with_state(|s| {
            s.calls.push(format!("rm:{id}"));
            s.containers.retain(|c| c.id != id);
        });
        Ok(())
    }

    async fn compose_up(&self, compose_file: &Path, service: &str) -> Result<ComposeOutput> {
        let project = compose_file
            .parent()
            .and_then(Path::parent)
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        let (fail, running, stderr) = self.with_state(|s| {
            s.calls.push(format!("up:{service}"));
            (s.fail_compose_up, s.up_leaves_running, s.compose_stderr.clone())
        });
        if fail {
            return Err(MicrodockError::compose("compose up failed"));
        }

        let name = format!("{project}-{service}");
        let state = if running {
            ContainerState::Running
        } else {
            ContainerState::Exited
        };
        let existing = self.with_state(|s| {
            s.containers
                .iter_mut()
                .find(|c| c.names == name)
                .map(|c| c.state = state)
                .is_some()
        });
        if !existing {
            let port = self.with_state(|s| {
                let port = s.next_port;
                s.next_port += 1;
                port
            });
            self.add_container(&name, state, Some(port));
        }

        Ok(ComposeOutput {
            stdout: String::new(),
            stderr,
        })
    }

    async fn compose_build(&self, _compose_file: &Path, service: &str) -> Result<()> {
        self.with_state(|s| s.calls.push(format!("build:{service}")));
        Ok(())
    }

    async fn subscribe_events(&self) -> Result<mpsc::Receiver<DockerEvent>> {
        let (tx, rx) = mpsc::channel(16);
        self.with_state(|s| {
            s.calls.push("events".to_string());
            s.event_senders.push(tx);
        });
        Ok(rx)
    }
}
