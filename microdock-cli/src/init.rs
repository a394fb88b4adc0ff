use microdock_core::config::AppConfig;
use microdock_core::constants::config;
use microdock_core::{MicrodockError, Result};
use std::path::PathBuf;
use tracing::{info, warn};

/// 用户级配置文件路径（如 `~/.config/microdock/microdock.toml`）
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("microdock").join(config::DEFAULT_CONFIG_FILE))
}

/// 初始化配置文件的目标路径
fn init_target(global: bool) -> Result<PathBuf> {
    if global {
        user_config_path()
            .ok_or_else(|| MicrodockError::custom("无法确定用户配置目录"))
    } else {
        Ok(PathBuf::from(config::DEFAULT_CONFIG_FILE))
    }
}

/// 写入默认配置文件，已存在时需要 `--force`
pub fn write_default_config(target: &std::path::Path, force: bool) -> Result<bool> {
    if target.exists() && !force {
        return Ok(false);
    }
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    AppConfig::default().save_to_file(target)?;
    Ok(true)
}

/// 运行独立的初始化流程
pub fn run_init(force: bool, global: bool) -> Result<()> {
    info!("🐳 Microdock 初始化");

    let target = init_target(global)?;
    if !write_default_config(&target, force)? {
        warn!("⚠️  配置文件已存在: {}", target.display());
        info!("如果您要重新生成，请使用 --force 参数");
        info!("示例: microdock init --force");
        return Ok(());
    }

    info!("   ✅ 创建配置文件: {}", target.display());
    info!("📝 接下来的步骤:");
    info!("   1️⃣  运行 'microdock create-project <名称>' 创建项目");
    info!("   2️⃣  运行 'microdock create <项目> <微服务>' 创建微服务");
    info!("   3️⃣  运行 'microdock deploy <项目> <微服务>' 部署微服务");
    info!("💡 使用 'microdock status' 查看工作区状态");

    Ok(())
}
