use super::ports::{next_available_port, scan_used_ports};
use crate::constants::{layout, ports};
use crate::naming;
use crate::{MicrodockError, Result};
use serde_yaml::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// 一个 compose 服务条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeServiceEntry {
    pub service_name: String,
    pub container_name: String,
    pub build_context: String,
    pub host_port: u16,
}

impl ComposeServiceEntry {
    /// 渲染为 services 下的 YAML 片段
    fn render(&self) -> String {
        format!(
            r#"  {service}:
    build:
      context: {context}
    container_name: {container}
    ports:
      - "{host}:{container_port}"
    environment:
      - DATABASE_URL=sqlite:///./test.db
"#,
            service = self.service_name,
            context = self.build_context,
            container = self.container_name,
            host = self.host_port,
            container_port = ports::CONTAINER_PORT,
        )
    }
}

/// compose 文件更新结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeUpdate {
    /// 新追加了服务条目
    Added(ComposeServiceEntry),
    /// 服务已存在，文件未修改
    AlreadyPresent { service_name: String },
}

/// 判断 compose 内容中是否已经定义了指定服务
///
/// 能解析为 YAML 时按 `services` 下的键判断；解析失败时退化为子串匹配。
pub fn has_service(content: &str, service_name: &str) -> bool {
    match serde_yaml::from_str::<Value>(content) {
        Ok(yaml) => yaml
            .get("services")
            .and_then(|services| services.as_mapping())
            .map(|services| services.contains_key(service_name))
            .unwrap_or(false),
        Err(e) => {
            debug!("compose 文件无法解析，使用文本匹配: {}", e);
            content.contains(service_name)
        }
    }
}

/// 列出 compose 内容中定义的服务名（无法解析时返回 None）
pub fn service_names(content: &str) -> Option<Vec<String>> {
    let yaml: Value = serde_yaml::from_str(content).ok()?;
    let names = yaml
        .get("services")
        .and_then(|services| services.as_mapping())
        .map(|services| {
            services
                .keys()
                .filter_map(|key| key.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    Some(names)
}

/// 读取服务第一个端口映射中的主机端口（`"<host>:8000"` 中的 `<host>`）
pub fn service_host_port(content: &str, service_name: &str) -> Option<u16> {
    let yaml: Value = serde_yaml::from_str(content).ok()?;
    let first = yaml
        .get("services")?
        .get(service_name)?
        .get("ports")?
        .as_sequence()?
        .first()?;
    let mapping = match first {
        Value::String(mapping) => mapping.clone(),
        Value::Number(port) => port.to_string(),
        _ => return None,
    };
    mapping.split(':').next()?.trim().parse().ok()
}

fn is_services_root(line: &str) -> bool {
    let without_comment = line.split('#').next().unwrap_or_default();
    without_comment.trim_end() == "services:"
}

/// 顶层键（第 0 列开始、非注释、非空）
fn is_top_level_key(line: &str) -> bool {
    line.chars()
        .next()
        .is_some_and(|c| !c.is_whitespace() && c != '#')
}

/// 把服务片段插入到 `services:` 段的末尾
///
/// `services:` 之后的其他顶层键（如 `volumes:`、`networks:`）保持在片段之后；
/// 没有 `services:` 时在文件末尾创建。
fn insert_service_block(content: &str, block: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();

    let Some(root) = lines.iter().position(|line| is_services_root(line)) else {
        let mut out = content.trim_end().to_string();
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("services:\n");
        out.push_str(block);
        return out;
    };

    let section_end = lines[root + 1..]
        .iter()
        .position(|line| is_top_level_key(line))
        .map_or(lines.len(), |offset| root + 1 + offset);
    let last_entry = lines[root + 1..section_end]
        .iter()
        .rposition(|line| !line.trim().is_empty());
    let insert_at = last_entry.map_or(root + 1, |offset| root + 2 + offset);

    let mut out = String::new();
    for line in &lines[..insert_at] {
        out.push_str(line);
        out.push('\n');
    }
    if last_entry.is_some() {
        out.push('\n');
    }
    out.push_str(block);

    let rest = &lines[insert_at..];
    if rest.first().is_some_and(|line| is_top_level_key(line)) {
        out.push('\n');
    }
    for line in rest {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// 确保项目的 docker-compose.yml 中存在 `microservice-<name>` 服务
///
/// 文件不存在时以 `services:` 为根创建；服务已存在时不做修改。
/// 主机端口在工作区根目录下的所有项目中全局分配。
pub fn update_docker_compose(
    project_path: &Path,
    project_name: &str,
    service_name: &str,
) -> Result<ComposeUpdate> {
    let normalized = naming::normalize_name(service_name);
    if normalized.is_empty() {
        return Err(MicrodockError::InvalidName(service_name.to_string()));
    }

    let compose_file = layout::compose_file(project_path);
    let compose_service = naming::compose_service_name(&normalized);

    let content = if compose_file.exists() {
        fs::read_to_string(&compose_file)?
    } else {
        String::new()
    };

    if has_service(&content, &compose_service) {
        info!("服务 {} 已存在于 {}", compose_service, compose_file.display());
        return Ok(ComposeUpdate::AlreadyPresent {
            service_name: compose_service,
        });
    }

    let root = project_path.parent().unwrap_or(project_path);
    let used_ports = scan_used_ports(root);
    let host_port = next_available_port(&used_ports)?;

    let entry = ComposeServiceEntry {
        container_name: naming::container_name(project_name, &normalized),
        // 构建上下文指向微服务的实际目录名，目录名不一定是规范化后的名称
        build_context: format!("../{}/{}", layout::MICROSERVICES_DIR, service_name),
        service_name: compose_service,
        host_port,
    };

    let updated = insert_service_block(&content, &entry.render());

    if let Some(parent) = compose_file.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&compose_file, updated)?;

    info!(
        "已添加服务 {} (端口 {}) 到 {}",
        entry.service_name,
        entry.host_port,
        compose_file.display()
    );
    Ok(ComposeUpdate::Added(entry))
}
