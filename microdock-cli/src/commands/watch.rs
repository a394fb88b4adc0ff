use super::status::run_status;
use crate::app::CliApp;
use microdock_core::Result;
use microdock_core::status::StatusChange;
use tokio_stream::StreamExt;
use tracing::info;

fn describe(change: &StatusChange) -> String {
    match change {
        StatusChange::DaemonAvailable => "🐳 Docker 守护进程可用".to_string(),
        StatusChange::DaemonUnavailable => "⚠️  Docker 守护进程不可用".to_string(),
        StatusChange::Container(event) => format!(
            "🔄 容器 {} {}",
            event.container_name.as_deref().unwrap_or("<unknown>"),
            event.action
        ),
    }
}

/// 持续监听状态变化，每次变化后重新扫描并显示
pub async fn run_watch(app: &CliApp) -> Result<()> {
    info!("👀 正在监听 Docker 状态变化，按 Ctrl+C 退出");

    let (mut changes, handle) = app.watcher().into_stream();
    loop {
        tokio::select! {
            change = changes.next() => {
                let Some(change) = change else {
                    break;
                };
                info!("{}", describe(&change));
                run_status(app).await?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("👋 停止监听");
                break;
            }
        }
    }

    handle.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use microdock_core::container::DockerEvent;

    #[test]
    fn test_describe_container_event() {
        let change = StatusChange::Container(DockerEvent {
            action: "die".to_string(),
            container_name: Some("demo-microservice-auth".to_string()),
        });
        assert_eq!(describe(&change), "🔄 容器 demo-microservice-auth die");
    }
}
