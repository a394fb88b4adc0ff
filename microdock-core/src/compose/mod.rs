//! docker-compose.yml 维护
//!
//! 新服务以文本方式插入到 `services:` 段末尾，保留用户手工编辑的格式；
//! 端口占用按行扫描，服务是否存在优先按 YAML 结构判断。

mod mutator;
mod ports;

pub use mutator::{
    ComposeServiceEntry, ComposeUpdate, has_service, service_host_port, service_names,
    update_docker_compose,
};
pub use ports::{next_available_port, ports_in_compose, scan_used_ports};
