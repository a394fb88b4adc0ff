use crate::constants::{layout, ports};
use crate::{MicrodockError, Result};
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// 匹配 `- "<host>:8000"` 形式的端口映射行，允许行尾注释
static PORT_MAPPING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?m)^\s*-\s*["']?(\d{{1,5}}):{}(?:/tcp)?["']?\s*(?:#.*)?$"#,
        ports::CONTAINER_PORT
    ))
    .expect("端口映射正则无效")
});

/// 从 compose 文件内容中提取已映射到容器 8000 端口的主机端口
///
/// 按行做正则扫描，不做结构化解析，因此手工编辑过甚至无法解析的文件也能扫描。
pub fn ports_in_compose(content: &str) -> Vec<u16> {
    PORT_MAPPING_RE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| match m.as_str().parse::<u16>() {
            Ok(port) => Some(port),
            Err(_) => {
                warn!("忽略无效的主机端口: {}", m.as_str());
                None
            }
        })
        .collect()
}

/// 扫描工作区根目录下所有项目的 compose 文件，收集已使用的主机端口
///
/// 端口分配是全局的：不同项目之间不能分配相同的主机端口。
pub fn scan_used_ports(root: &Path) -> BTreeSet<u16> {
    let mut used = BTreeSet::new();

    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("无法读取工作区根目录 {}: {}", root.display(), e);
            return used;
        }
    };

    for entry in entries.filter_map(|entry| entry.ok()) {
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir || entry.file_name() == layout::DEPLOYMENT_DIR {
            continue;
        }

        let compose_file = layout::compose_file(&entry.path());
        let Ok(content) = fs::read_to_string(&compose_file) else {
            continue;
        };

        let found = ports_in_compose(&content);
        debug!("{} 中已使用的端口: {:?}", compose_file.display(), found);
        used.extend(found);
    }

    used
}

/// 返回不小于 8000 的最小未使用端口
pub fn next_available_port(used: &BTreeSet<u16>) -> Result<u16> {
    (ports::BASE_HOST_PORT..=u16::MAX)
        .find(|port| !used.contains(port))
        .ok_or_else(|| MicrodockError::custom("没有可分配的主机端口"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_compose(root: &Path, project: &str, content: &str) {
        let deployment = root.join(project).join("deployment");
        fs::create_dir_all(&deployment).unwrap();
        fs::write(deployment.join("docker-compose.yml"), content).unwrap();
    }

    #[test]
    fn test_ports_in_compose() {
        let content = r#"
services:
  microservice-auth:
    ports:
      - "8000:8000"
  microservice-billing:
    ports:
      - '8003:8000'
  other:
    ports:
      - "9000:80"
      - 8004:8000/tcp
"#;
        assert_eq!(ports_in_compose(content), vec![8000, 8003, 8004]);
    }

    #[test]
    fn test_ports_with_trailing_comment() {
        let content = "services:\n  api:\n    ports:\n      - \"8000:8000\" # public api\n      - 8001:8000/tcp  #internal\n      - \"8002:80001\"\n";
        assert_eq!(ports_in_compose(content), vec![8000, 8001]);
    }

    #[test]
    fn test_commented_port_is_not_reallocated() {
        let dir = tempdir().unwrap();
        write_compose(
            dir.path(),
            "alpha",
            "services:\n  api:\n    ports:\n      - \"8000:8000\" # public api\n",
        );

        let used = scan_used_ports(dir.path());
        assert!(used.contains(&8000));
        assert_eq!(next_available_port(&used).unwrap(), 8001);
    }

    #[test]
    fn test_ports_in_malformed_content() {
        let content = "services:\n  broken: [\n    ports:\n      - \"8007:8000\"\n";
        assert_eq!(ports_in_compose(content), vec![8007]);
    }

    #[test]
    fn test_next_port_without_gaps() {
        let used: BTreeSet<u16> = (8000..8005).collect();
        assert_eq!(next_available_port(&used).unwrap(), 8005);
        assert_eq!(next_available_port(&BTreeSet::new()).unwrap(), 8000);
    }

    #[test]
    fn test_next_port_fills_gap() {
        let used: BTreeSet<u16> = [8000, 8002].into_iter().collect();
        assert_eq!(next_available_port(&used).unwrap(), 8001);
    }

    #[test]
    fn test_next_port_ignores_ports_below_base() {
        let used: BTreeSet<u16> = [80, 443, 7999].into_iter().collect();
        assert_eq!(next_available_port(&used).unwrap(), 8000);
    }

    #[test]
    fn test_scan_used_ports_across_projects() {
        let dir = tempdir().unwrap();
        write_compose(dir.path(), "alpha", "services:\n  a:\n    ports:\n      - \"8000:8000\"\n");
        write_compose(dir.path(), "beta", "services:\n  b:\n    ports:\n      - \"8001:8000\"\n");

        let used = scan_used_ports(dir.path());
        assert_eq!(used.into_iter().collect::<Vec<_>>(), vec![8000, 8001]);
    }

    #[test]
    fn test_scan_used_ports_missing_root() {
        assert!(scan_used_ports(Path::new("/nonexistent/microdock")).is_empty());
    }
}
