// 模块声明
mod command;
mod config;
mod engine;
mod events;
mod service;
mod types;

#[cfg(test)]
pub(crate) mod fake;

// 重新导出公共API
pub use engine::ContainerEngine;
pub use types::{
    ComposeOutput, ComposeProgram, ContainerState, ContainerSummary, DockerCli, DockerEvent,
};
