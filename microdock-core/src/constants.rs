/// 工作区目录约定
pub mod layout {
    use std::path::{Path, PathBuf};

    /// 项目标记文件名
    pub const PROJECT_CONFIG_FILE: &str = "project-config.json";

    /// 微服务目录名
    pub const MICROSERVICES_DIR: &str = "microservices";

    /// 部署目录名
    pub const DEPLOYMENT_DIR: &str = "deployment";

    /// docker-compose.yml文件名
    pub const COMPOSE_FILE_NAME: &str = "docker-compose.yml";

    /// 获取项目的部署目录
    pub fn deployment_dir(project_path: &Path) -> PathBuf {
        project_path.join(DEPLOYMENT_DIR)
    }

    /// 获取项目的 docker-compose.yml 路径
    pub fn compose_file(project_path: &Path) -> PathBuf {
        deployment_dir(project_path).join(COMPOSE_FILE_NAME)
    }

    /// 获取项目的微服务根目录
    pub fn microservices_dir(project_path: &Path) -> PathBuf {
        project_path.join(MICROSERVICES_DIR)
    }
}

/// Docker相关常量
pub mod docker {
    /// Docker socket路径（跨平台支持）
    /// Unix/Linux/macOS: /var/run/docker.sock
    /// Windows: \\.\pipe\docker_engine
    #[cfg(unix)]
    pub const DOCKER_SOCKET_PATH: &str = "/var/run/docker.sock";

    #[cfg(windows)]
    pub const DOCKER_SOCKET_PATH: &str = r"\\.\pipe\docker_engine";

    /// compose 服务名前缀
    pub const SERVICE_PREFIX: &str = "microservice-";

    /// 触发状态刷新的 Docker 事件
    pub const WATCHED_EVENTS: &[&str] = &["start", "stop", "die", "destroy"];

    /// compose 输出到 stderr 的非关键信息
    pub const NON_CRITICAL_COMPOSE_MESSAGES: &[&str] = &[
        "Creating",
        "Created",
        "Starting",
        "Started",
        "Found orphan containers",
    ];

    /// Docker 安装引导页面
    pub const GET_STARTED_URL: &str = "https://www.docker.com/get-started";
}

/// 端口分配相关常量
pub mod ports {
    /// 容器内服务监听端口
    pub const CONTAINER_PORT: u16 = 8000;

    /// 主机端口分配起点
    pub const BASE_HOST_PORT: u16 = 8000;
}

/// 超时与轮询间隔（秒）
pub mod timeout {
    /// Docker 守护进程可用性轮询间隔
    pub const DAEMON_POLL_INTERVAL: u64 = 10;

    /// 就绪检查请求间隔
    pub const READINESS_CHECK_INTERVAL: u64 = 1;

    /// 启动/重启后的就绪等待时间
    pub const START_READY_TIMEOUT: u64 = 10;

    /// 部署后的就绪等待时间（需要构建镜像，时间更长）
    pub const DEPLOY_READY_TIMEOUT: u64 = 30;

    /// 单次就绪检查 HTTP 请求超时
    pub const READINESS_REQUEST_TIMEOUT: u64 = 2;
}

/// HTTP 就绪检查
pub mod http {
    /// 就绪检查路径
    pub const DOCS_PATH: &str = "/docs";

    /// 构造服务文档地址
    pub fn docs_url(port: u16) -> String {
        format!("http://localhost:{port}{DOCS_PATH}")
    }
}

/// 本地运行模式
pub mod local {
    /// 命令模板中的端口占位符
    pub const PORT_PLACEHOLDER: &str = "{port}";

    /// 在微服务目录中执行的默认开发服务器命令
    #[cfg(not(windows))]
    pub const DEFAULT_COMMAND: &[&str] = &["uvicorn", "app.main:app", "--reload", "--port", "{port}"];

    #[cfg(windows)]
    pub const DEFAULT_COMMAND: &[&str] = &[
        "python",
        "-m",
        "uvicorn",
        "app.main:app",
        "--reload",
        "--port",
        "{port}",
    ];

    /// 本地进程状态检查间隔（毫秒）
    pub const STATUS_CHECK_INTERVAL_MS: u64 = 1000;
}

/// 配置文件相关常量
pub mod config {
    /// 按优先级查找的配置文件名
    pub const CONFIG_FILE_NAMES: &[&str] = &["microdock.toml", ".microdock.toml"];

    /// 默认配置文件名
    pub const DEFAULT_CONFIG_FILE: &str = "microdock.toml";
}
