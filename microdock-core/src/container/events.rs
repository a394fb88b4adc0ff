use super::types::{DockerCli, DockerEvent};
use crate::constants::docker::WATCHED_EVENTS;
use crate::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// `docker events --format '{{json .}}'` 输出的一行
#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "Action", default)]
    action: Option<String>,
    /// 旧版本 Docker 只有 status 字段
    #[serde(default)]
    status: Option<String>,
    #[serde(rename = "Actor", default)]
    actor: Option<RawActor>,
}

#[derive(Debug, Deserialize)]
struct RawActor {
    #[serde(rename = "Attributes", default)]
    attributes: HashMap<String, String>,
}

/// 解析一行事件 JSON，只保留关注的容器事件
pub(crate) fn parse_event_line(line: &str) -> Option<DockerEvent> {
    let raw: RawEvent = match serde_json::from_str(line.trim()) {
        Ok(raw) => raw,
        Err(e) => {
            debug!("忽略无法解析的 Docker 事件: {} ({})", line, e);
            return None;
        }
    };

    let action = raw.action.or(raw.status)?;
    if !WATCHED_EVENTS.contains(&action.as_str()) {
        return None;
    }

    let container_name = raw
        .actor
        .and_then(|actor| actor.attributes.get("name").cloned());

    Some(DockerEvent {
        action,
        container_name,
    })
}

impl DockerCli {
    /// 启动 `docker events` 子进程，把关注的容器事件转发到通道
    ///
    /// 子进程退出（例如守护进程停止）或接收端被丢弃时转发任务结束。
    pub(crate) async fn spawn_event_stream(&self) -> Result<mpsc::Receiver<DockerEvent>> {
        let mut args = vec![
            "events".to_string(),
            "--format".to_string(),
            "{{json .}}".to_string(),
            "--filter".to_string(),
            "type=container".to_string(),
        ];
        for event in WATCHED_EVENTS {
            args.push("--filter".to_string());
            args.push(format!("event={event}"));
        }

        let mut child = Command::new("docker")
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| crate::MicrodockError::docker("无法读取 docker events 输出"))?;

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let Some(event) = parse_event_line(&line) else {
                            continue;
                        };
                        debug!("Docker 事件: {:?}", event);
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        info!("docker events 输出结束");
                        break;
                    }
                    Err(e) => {
                        warn!("读取 docker events 输出失败: {}", e);
                        break;
                    }
                }
            }
            // child 在此处被丢弃，kill_on_drop 负责结束子进程
            drop(child);
        });

        Ok(rx)
    }
}
