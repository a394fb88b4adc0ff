use thiserror::Error;

pub type Result<T> = std::result::Result<T, MicrodockError>;

#[derive(Error, Debug)]
pub enum MicrodockError {
    #[error("配置错误: {0}")]
    Config(#[from] toml::de::Error),

    #[error("配置序列化错误: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("HTTP 请求错误: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML 解析错误: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("任务执行错误: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Docker 未安装或守护进程不可达
    #[error("Docker 不可用: {0}")]
    DockerUnavailable(String),

    #[error("Docker 命令执行失败: {0}")]
    Docker(String),

    #[error("Docker Compose 命令执行失败: {0}")]
    Compose(String),

    #[error("服务在 {timeout_secs} 秒内未就绪: http://localhost:{port}/docs")]
    ReadinessTimeout { port: u16, timeout_secs: u64 },

    #[error("已有微服务操作正在进行，请等待其完成")]
    OperationInProgress,

    #[error("项目已存在: {0}")]
    ProjectExists(String),

    #[error("项目不存在: {0}")]
    ProjectNotFound(String),

    #[error("微服务不存在: {0}")]
    MicroserviceNotFound(String),

    #[error("名称无效: {0:?}")]
    InvalidName(String),

    #[error("自定义错误: {0}")]
    Custom(String),
}

impl MicrodockError {
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    pub fn docker(msg: impl Into<String>) -> Self {
        Self::Docker(msg.into())
    }

    pub fn compose(msg: impl Into<String>) -> Self {
        Self::Compose(msg.into())
    }

    pub fn docker_unavailable(msg: impl Into<String>) -> Self {
        Self::DockerUnavailable(msg.into())
    }

    /// 环境类错误：提示用户安装或启动 Docker，而不是查看日志
    pub fn is_environment(&self) -> bool {
        matches!(self, Self::DockerUnavailable(_))
    }
}
