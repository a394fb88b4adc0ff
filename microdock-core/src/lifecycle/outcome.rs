use super::frontend::Notification;

/// 启动单个微服务的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
    /// 没有容器，已重新部署
    Deployed,
    Failed,
}

/// 停止单个微服务的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    /// 容器不存在或未在运行
    AlreadyStopped,
    Failed,
}

/// 重启单个微服务的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartOutcome {
    Restarted,
    /// 没有容器，已重新部署
    Deployed,
    Failed,
}

/// 批量操作中每个微服务的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkReport<O> {
    pub results: Vec<(String, O)>,
}

impl<O> Default for BulkReport<O> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
        }
    }
}

impl<O: Copy + PartialEq> BulkReport<O> {
    pub fn push(&mut self, microservice: impl Into<String>, outcome: O) {
        self.results.push((microservice.into(), outcome));
    }

    pub fn count(&self, outcome: O) -> usize {
        self.results.iter().filter(|(_, o)| *o == outcome).count()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

fn push_if(notifications: &mut Vec<Notification>, count: usize, build: impl FnOnce(usize) -> Notification) {
    if count > 0 {
        notifications.push(build(count));
    }
}

impl BulkReport<StartOutcome> {
    /// 每个非空分类一条汇总通知
    pub fn notifications(&self) -> Vec<Notification> {
        let mut out = Vec::new();
        push_if(&mut out, self.count(StartOutcome::Started), |n| {
            Notification::info(format!("Started {n} microservice(s) successfully."))
        });
        push_if(&mut out, self.count(StartOutcome::AlreadyRunning), |n| {
            Notification::info(format!("{n} microservice(s) were already running."))
        });
        push_if(&mut out, self.count(StartOutcome::Deployed), |n| {
            Notification::info(format!(
                "Deployed and started {n} microservice(s) successfully."
            ))
        });
        push_if(&mut out, self.count(StartOutcome::Failed), |n| {
            Notification::error(format!(
                "Failed to start {n} microservice(s). Check the logs to debug the issue."
            ))
        });
        out
    }
}

impl BulkReport<StopOutcome> {
    pub fn notifications(&self) -> Vec<Notification> {
        let mut out = Vec::new();
        push_if(&mut out, self.count(StopOutcome::Stopped), |n| {
            Notification::info(format!("Stopped {n} microservice(s) successfully."))
        });
        push_if(&mut out, self.count(StopOutcome::AlreadyStopped), |n| {
            Notification::info(format!("{n} microservice(s) were already stopped."))
        });
        push_if(&mut out, self.count(StopOutcome::Failed), |n| {
            Notification::error(format!("Failed to stop {n} microservice(s)."))
        });
        out
    }
}

impl BulkReport<RestartOutcome> {
    pub fn notifications(&self) -> Vec<Notification> {
        let mut out = Vec::new();
        push_if(&mut out, self.count(RestartOutcome::Restarted), |n| {
            Notification::info(format!("Restarted {n} microservice(s) successfully."))
        });
        push_if(&mut out, self.count(RestartOutcome::Deployed), |n| {
            Notification::info(format!(
                "Deployed and started {n} microservice(s) successfully."
            ))
        });
        push_if(&mut out, self.count(RestartOutcome::Failed), |n| {
            Notification::error(format!(
                "Failed to restart {n} microservice(s). Check the logs to debug the issue and restart project."
            ))
        });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::frontend::NotificationLevel;

    #[test]
    fn test_start_report_has_one_notification_per_category() {
        let mut report = BulkReport::default();
        report.push("auth", StartOutcome::Started);
        report.push("billing", StartOutcome::Started);
        report.push("cart", StartOutcome::Failed);

        let notifications = report.notifications();
        assert_eq!(notifications.len(), 2);
        assert_eq!(
            notifications[0].message,
            "Started 2 microservice(s) successfully."
        );
        assert_eq!(notifications[1].level, NotificationLevel::Error);
        assert!(notifications[1].message.starts_with("Failed to start 1 "));
    }

    #[test]
    fn test_empty_report_has_no_notifications() {
        let report: BulkReport<StopOutcome> = BulkReport::default();
        assert!(report.is_empty());
        assert!(report.notifications().is_empty());
    }

    #[test]
    fn test_stop_report_counts() {
        let mut report = BulkReport::default();
        report.push("auth", StopOutcome::AlreadyStopped);
        report.push("billing", StopOutcome::Stopped);
        assert_eq!(report.count(StopOutcome::Stopped), 1);
        let messages: Vec<_> = report
            .notifications()
            .into_iter()
            .map(|n| n.message)
            .collect();
        assert_eq!(
            messages,
            vec![
                "Stopped 1 microservice(s) successfully.",
                "1 microservice(s) were already stopped."
            ]
        );
    }
}
