//! 工作区文件系统扫描
//!
//! 项目是根目录下包含 `project-config.json` 的直接子目录；
//! 微服务是 `<project>/microservices/` 下的直接子目录。
//! 每次刷新都重新扫描，不做缓存。

mod scanner;
mod types;

pub use scanner::{find_microservice, find_project, list_microservices, list_projects};
pub use types::{Microservice, Project};
