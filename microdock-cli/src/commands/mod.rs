pub mod create;
pub mod lifecycle;
pub mod local;
pub mod logs;
pub mod status;
pub mod watch;

pub use create::{run_create_microservice, run_create_project};
pub use lifecycle::{run_deploy, run_restart, run_start, run_stop, run_teardown};
pub use local::run_local;
pub use logs::run_logs;
pub use status::{render_snapshot, run_status};
pub use watch::run_watch;
