use crate::constants::{http, timeout};
use crate::{MicrodockError, Result};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// 就绪检查参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessSettings {
    pub interval: Duration,
    pub start_timeout: Duration,
    pub deploy_timeout: Duration,
    /// 就绪后是否在浏览器中打开文档页
    pub open_browser: bool,
}

impl Default for ReadinessSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(timeout::READINESS_CHECK_INTERVAL),
            start_timeout: Duration::from_secs(timeout::START_READY_TIMEOUT),
            deploy_timeout: Duration::from_secs(timeout::DEPLOY_READY_TIMEOUT),
            open_browser: true,
        }
    }
}

/// 创建就绪检查使用的 HTTP 客户端
pub fn readiness_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout::READINESS_REQUEST_TIMEOUT))
        .build()?;
    Ok(client)
}

/// 轮询 `http://localhost:<port>/docs` 直到返回 2xx 或超时
pub async fn wait_for_ready(
    client: &reqwest::Client,
    port: u16,
    max_wait: Duration,
    interval: Duration,
) -> Result<()> {
    let url = http::docs_url(port);
    let start = Instant::now();
    let mut attempts = 0u32;

    info!("⏳ 等待服务就绪: {}", url);

    loop {
        attempts += 1;
        match client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                info!(
                    "✅ 服务已就绪: {} (第 {} 次检查，耗时 {:.1}s)",
                    url,
                    attempts,
                    start.elapsed().as_secs_f64()
                );
                return Ok(());
            }
            Ok(response) => debug!("{} 返回 {}", url, response.status()),
            Err(e) => debug!("{} 暂不可达: {}", url, e),
        }

        if start.elapsed() + interval > max_wait {
            warn!("⏰ 服务在 {:?} 内未就绪: {}", max_wait, url);
            return Err(MicrodockError::ReadinessTimeout {
                port,
                timeout_secs: max_wait.as_secs(),
            });
        }

        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// 启动一个对所有请求返回指定状态码的最小 HTTP 服务
    async fn serve(status_line: &'static str) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response =
                    format!("HTTP/1.1 {status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
        port
    }

    async fn unused_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn test_ready_on_success_status() {
        let port = serve("200 OK").await;
        let client = readiness_client().unwrap();
        wait_for_ready(
            &client,
            port,
            Duration::from_secs(5),
            Duration::from_millis(50),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_timeout_when_nothing_listens() {
        let port = unused_port().await;
        let client = readiness_client().unwrap();
        let result = wait_for_ready(
            &client,
            port,
            Duration::from_millis(200),
            Duration::from_millis(50),
        )
        .await;
        assert!(matches!(
            result,
            Err(MicrodockError::ReadinessTimeout { port: p, .. }) if p == port
        ));
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_ready() {
        let port = serve("503 Service Unavailable").await;
        let client = readiness_client().unwrap();
        let result = wait_for_ready(
            &client,
            port,
            Duration::from_millis(200),
            Duration::from_millis(50),
        )
        .await;
        assert!(matches!(result, Err(MicrodockError::ReadinessTimeout { .. })));
    }
}
