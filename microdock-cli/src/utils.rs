use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// # Microdock 日志系统使用说明
///
/// ## 基本原则
/// 1. **库代码只使用 `tracing` 宏**：`info!()`, `warn!()`, `error!()`, `debug!()`
/// 2. **应用入口控制日志配置**：在 `main.rs` 中调用 `setup_logging()`
///
/// ## 日志配置选项
///
/// - `-v, --verbose`：启用详细日志模式（DEBUG 级别）
/// - `RUST_LOG`：标准的 Rust 日志级别控制（如 `debug`, `info`, `warn`, `error`）
/// - `MICRODOCK_LOG_FILE`：日志文件路径，设置后日志输出到文件而非终端
///
/// ## 使用示例
///
/// ```bash
/// # 详细日志输出到终端
/// microdock -v status
///
/// # 日志输出到文件
/// MICRODOCK_LOG_FILE=microdock.log microdock start demo
///
/// # 使用 RUST_LOG 控制特定模块的日志级别
/// RUST_LOG=microdock_core::lifecycle=debug microdock restart demo auth
/// ```
///
/// ## 日志格式
/// - **终端输出**：人类可读格式，不显示模块路径
/// - **文件输出**：包含完整模块路径和更多调试信息
pub fn setup_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    // 根据verbose参数和环境变量确定日志级别
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 检查环境变量，决定是否输出到文件
    if let Ok(log_file) = std::env::var("MICRODOCK_LOG_FILE") {
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
        {
            Ok(file) => {
                // 输出到文件 - 使用详细格式便于调试
                fmt()
                    .with_env_filter(env_filter)
                    .with_writer(file)
                    .with_target(true)
                    .with_thread_names(true)
                    .with_line_number(true)
                    .init();
                return;
            }
            Err(e) => eprintln!("无法打开日志文件 {log_file}: {e}，改为输出到终端"),
        }
    }

    // 输出到终端 - 使用简洁格式，用户友好
    fmt()
        .with_env_filter(env_filter)
        .with_target(false) // 不显示模块路径
        .with_thread_names(false) // 不显示线程名
        .with_line_number(false) // 不显示行号
        .without_time() // 不显示时间戳
        .compact() // 使用紧凑格式
        .init();
}

/// 创建长时间操作使用的终端 spinner
pub fn new_spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
