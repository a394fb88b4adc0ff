use crate::app::CliApp;
use microdock_core::Result;
use microdock_core::constants::docker::GET_STARTED_URL;
use microdock_core::presentation::{Presentation, project_summary};
use microdock_core::status::WorkspaceSnapshot;
use std::path::Path;
use tracing::info;

/// 将工作区状态渲染为终端输出行
pub fn render_snapshot(snapshot: &WorkspaceSnapshot, root: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "📁 工作区: {} (刷新于 {})",
        root.display(),
        snapshot.taken_at.format("%H:%M:%S")
    )];

    if snapshot.docker_available {
        lines.push("🐳 Docker: 运行中".to_string());
    } else {
        lines.push(format!(
            "⚠️  Docker 未安装或未启动，安装引导: {GET_STARTED_URL}"
        ));
    }

    if snapshot.projects.is_empty() {
        lines.push("No projects found. Please create a project first.".to_string());
        return lines;
    }

    for project in &snapshot.projects {
        lines.push(format!(
            "📦 {} ({})",
            project.project.name,
            project_summary(project)
        ));
        if project.microservices.is_empty() {
            lines.push("   (没有微服务)".to_string());
        }
        for entry in &project.microservices {
            let presentation = Presentation::for_status(&entry.status);
            let action = presentation
                .action
                .map(|action| format!("  → {}", action.title()))
                .unwrap_or_default();
            lines.push(format!(
                "   {} {}: {}{}",
                presentation.icon.glyph(),
                entry.microservice.name,
                presentation.label,
                action
            ));
        }
    }

    lines
}

/// 显示工作区中所有项目和微服务的状态
pub async fn run_status(app: &CliApp) -> Result<()> {
    let snapshot = app.inspector().snapshot(&app.root).await;
    for line in render_snapshot(&snapshot, &app.root) {
        info!("{}", line);
    }
    Ok(())
}
