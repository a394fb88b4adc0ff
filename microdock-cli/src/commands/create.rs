use crate::app::CliApp;
use microdock_core::Result;
use microdock_core::compose::ComposeUpdate;
use microdock_core::scaffold;
use tracing::info;

/// 创建项目
pub fn run_create_project(app: &CliApp, name: &str) -> Result<()> {
    let project = scaffold::create_project(&app.root, name)?;
    info!("✅ Project {} created successfully", project.name);
    info!("   📁 {}", project.path.display());
    Ok(())
}

/// 创建微服务并登记到 docker-compose.yml
pub fn run_create_microservice(app: &CliApp, project: &str, name: &str) -> Result<()> {
    let (microservice, update) = scaffold::create_microservice(&app.root, project, name)?;

    info!(
        "✅ Microservice {} created successfully",
        microservice.name
    );
    info!("   📁 {}", microservice.path.display());
    match update {
        ComposeUpdate::Added(entry) => info!(
            "   🐳 {} → 主机端口 {} ({})",
            entry.service_name,
            entry.host_port,
            microservice.project.compose_file().display()
        ),
        ComposeUpdate::AlreadyPresent { service_name } => {
            info!("   🐳 {} 已存在于 docker-compose.yml", service_name)
        }
    }
    info!(
        "👉 部署: microdock deploy {} {}",
        microservice.project.name, microservice.name
    );
    Ok(())
}
