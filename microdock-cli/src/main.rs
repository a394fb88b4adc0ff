use clap::Parser;
use microdock_cli::project_info::{get_copyright_info, get_version_string};
use microdock_cli::{Cli, CliApp, Commands, run_init, setup_logging};
use tracing::{debug, error};

#[tokio::main]
async fn main() {
    // 解析命令行参数
    let cli = Cli::parse();

    // 设置日志记录
    setup_logging(cli.verbose);
    debug!("{} ({})", get_version_string(), get_copyright_info());

    // `init` 命令是特例，它不需要预先加载配置
    if let Commands::Init { force, global } = cli.command {
        if let Err(e) = run_init(force, global) {
            error!("❌ 初始化失败: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let app = match CliApp::new_with_auto_config(cli.config.clone(), cli.root.clone()) {
        Ok(app) => app,
        Err(e) => {
            error!("❌ 应用初始化失败: {}", e);
            error!("👉 可以运行 'microdock init' 生成默认配置文件");
            std::process::exit(1);
        }
    };

    // 运行命令
    if let Err(e) = app.run(cli.command).await {
        error!("❌ 操作失败: {}", e);
        std::process::exit(1);
    }
}
