//! 微服务生命周期编排：部署、启动、停止、重启

mod frontend;
mod orchestrator;
mod outcome;
mod readiness;

pub use frontend::{Frontend, Notification, NotificationLevel};
pub use orchestrator::Orchestrator;
pub use outcome::{BulkReport, RestartOutcome, StartOutcome, StopOutcome};
pub use readiness::{ReadinessSettings, readiness_client, wait_for_ready};
