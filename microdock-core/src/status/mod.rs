//! 微服务状态探测与变化监听

mod inspector;
mod types;
mod watcher;

pub use inspector::{StatusInspector, find_container, resolve_status};
pub use types::{
    MicroserviceEntry, MicroserviceStatus, ProjectStatus, StatusChange, WorkspaceSnapshot,
};
pub use watcher::StatusWatcher;
