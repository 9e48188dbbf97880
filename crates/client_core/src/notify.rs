use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::domain::{NotificationId, Severity};

/// A transient, dismissible message shown at the top of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub severity: Severity,
    pub message: String,
    pub dismissible: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(id: NotificationId, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            id,
            severity,
            message: message.into(),
            dismissible: true,
            created_at: Utc::now(),
        }
    }

    pub fn class_name(&self) -> String {
        format!(
            "alert {} alert-dismissible fade show",
            self.severity.css_class()
        )
    }
}

#[derive(Debug, Default)]
pub struct NotificationIds {
    next: AtomicI64,
}

impl NotificationIds {
    pub fn next(&self) -> NotificationId {
        NotificationId(self.next.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let ids = NotificationIds::default();
        let first = ids.next();
        let second = ids.next();
        assert!(second.0 > first.0);
    }

    #[test]
    fn class_name_carries_severity() {
        let n = Notification::new(NotificationId(1), Severity::Warning, "careful");
        assert_eq!(n.class_name(), "alert alert-warning alert-dismissible fade show");
        assert!(n.dismissible);
    }
}
