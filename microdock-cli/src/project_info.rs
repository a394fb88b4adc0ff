/// Microdock CLI 项目信息模块
///
/// microdock-cli 是面向用户的主程序，项目元数据统一在这里定义，
/// microdock-core 作为内部库只提供技术性常量。

/// 项目元数据（自动从 Cargo.toml 同步）
pub mod metadata {
    pub const PROJECT_NAME: &str = env!("CARGO_PKG_NAME");

    pub const PROJECT_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

    pub const PROJECT_AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

    pub const PROJECT_LICENSE: &str = env!("CARGO_PKG_LICENSE");

    /// 用户友好的显示名称（手动维护，用于 UI 显示）
    pub mod display {
        pub const FRIENDLY_NAME: &str = "Microdock";

        pub const DESCRIPTION_LONG: &str = "本地微服务项目管理工具：按约定扫描工作区中的项目与微服务，维护 docker-compose.yml，并负责微服务容器的部署、启动、停止、重启与日志查看";
    }
}

/// 版本信息
pub mod version_info {
    /// CLI 版本（自动从 Cargo.toml 同步）
    pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// 获取版本信息字符串
pub fn get_version_string() -> String {
    format!(
        "{} v{}",
        metadata::display::FRIENDLY_NAME,
        version_info::CLI_VERSION
    )
}

/// 获取作者和许可证信息
pub fn get_copyright_info() -> String {
    format!(
        "© {} - Licensed under {}",
        metadata::PROJECT_AUTHORS,
        metadata::PROJECT_LICENSE
    )
}
