use crate::project_info::{metadata, version_info};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Microdock CLI - 本地微服务项目与 Docker 生命周期管理工具
#[derive(Parser, Debug)]
#[command(name = "microdock")]
#[command(about = metadata::PROJECT_DESCRIPTION)]
#[command(version = version_info::CLI_VERSION)]
#[command(long_about = metadata::display::DESCRIPTION_LONG)]
#[command(author = metadata::PROJECT_AUTHORS)]
pub struct Cli {
    /// 配置文件路径（默认依次查找 microdock.toml、.microdock.toml、用户配置目录）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 工作区根目录，覆盖配置文件中的设置
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// 详细输出
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// 在当前目录生成默认配置文件
    Init {
        /// 如果配置文件已存在，强制覆盖
        #[arg(long)]
        force: bool,
        /// 写入用户级配置目录而不是当前目录
        #[arg(long)]
        global: bool,
    },
    /// 显示工作区中所有项目和微服务的状态
    Status,
    /// 持续监听 Docker 状态变化并刷新显示
    Watch,
    /// 创建项目
    CreateProject {
        /// 项目名称（会被规范化）
        name: String,
    },
    /// 在项目下创建微服务并登记到 docker-compose.yml
    Create {
        /// 项目名称
        project: String,
        /// 微服务名称（会被规范化）
        name: String,
    },
    /// 部署微服务（docker compose up -d）
    Deploy {
        project: String,
        service: String,
    },
    /// 启动微服务，不指定微服务时启动项目中的全部微服务
    Start {
        project: String,
        service: Option<String>,
    },
    /// 停止微服务，不指定微服务时停止项目中的全部微服务
    Stop {
        project: String,
        service: Option<String>,
    },
    /// 重新构建并重启微服务，不指定微服务时重启项目中的全部微服务
    Restart {
        project: String,
        service: Option<String>,
    },
    /// 不经过 Docker，在本地直接运行微服务（前台运行，Ctrl+C 结束）
    Run {
        project: String,
        /// 不指定时运行项目中的全部微服务
        service: Option<String>,
    },
    /// 持续输出项目的 docker compose 日志
    Logs {
        project: String,
        /// 只显示最近的 N 行
        #[arg(long)]
        tail: Option<usize>,
    },
    /// 停止并删除项目中所有微服务的容器
    Teardown { project: String },
}
