use super::inspector::StatusInspector;
use super::types::StatusChange;
use crate::container::{ContainerEngine, DockerEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

enum Tick {
    Poll,
    Event(Option<DockerEvent>),
}

/// 监听 Docker 状态变化
///
/// 定期轮询守护进程是否可用，只在状态切换时发布通知；
/// 守护进程可用时订阅容器事件流并转发关注的事件。
pub struct StatusWatcher {
    engine: Arc<dyn ContainerEngine>,
    poll_interval: Duration,
}

impl StatusWatcher {
    pub fn new(engine: Arc<dyn ContainerEngine>, poll_interval: Duration) -> Self {
        Self {
            engine,
            poll_interval,
        }
    }

    /// 在后台任务中运行，接收端被丢弃后任务结束
    pub fn spawn(self) -> (mpsc::Receiver<StatusChange>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(32);
        let handle = tokio::spawn(self.run(tx));
        (rx, handle)
    }

    /// 以 Stream 形式消费状态变化
    pub fn into_stream(self) -> (ReceiverStream<StatusChange>, JoinHandle<()>) {
        let (rx, handle) = self.spawn();
        (ReceiverStream::new(rx), handle)
    }

    async fn subscribe(&self) -> Option<mpsc::Receiver<DockerEvent>> {
        match self.engine.subscribe_events().await {
            Ok(rx) => Some(rx),
            Err(e) => {
                warn!("订阅 Docker 事件失败: {}", e);
                None
            }
        }
    }

    async fn run(self, tx: mpsc::Sender<StatusChange>) {
        let inspector = StatusInspector::new(self.engine.clone());
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        let mut daemon_up: Option<bool> = None;
        let mut events: Option<mpsc::Receiver<DockerEvent>> = None;

        loop {
            let tick = tokio::select! {
                _ = ticker.tick() => Tick::Poll,
                event = next_event(&mut events) => Tick::Event(event),
                _ = tx.closed() => {
                    debug!("状态监听接收端已关闭");
                    return;
                }
            };

            let change = match tick {
                Tick::Poll => {
                    let available = inspector.docker_available().await;
                    if !available {
                        events = None;
                    } else if events.is_none() {
                        // 守护进程可用但事件流未建立或已结束时重新订阅
                        events = self.subscribe().await;
                    }

                    if daemon_up == Some(available) {
                        continue;
                    }
                    daemon_up = Some(available);

                    if available {
                        info!("✅ Docker 守护进程可用，已订阅容器事件");
                        StatusChange::DaemonAvailable
                    } else {
                        warn!("⚠️ Docker 守护进程不可用");
                        StatusChange::DaemonUnavailable
                    }
                }
                Tick::Event(Some(event)) => StatusChange::Container(event),
                Tick::Event(None) => {
                    debug!("Docker 事件流已结束，下次轮询时重新订阅");
                    events = None;
                    continue;
                }
            };

            if tx.send(change).await.is_err() {
                return;
            }
        }
    }
}

/// 没有事件流时永远挂起
async fn next_event(events: &mut Option<mpsc::Receiver<DockerEvent>>) -> Option<DockerEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
