//! Transient notification toasts
//!
//! The queue only tracks what should be on screen; the front-end creates and
//! removes the DOM nodes.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Achievement,
}

impl NotificationKind {
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationKind::Success => "✅",
            NotificationKind::Error => "❌",
            NotificationKind::Info => "ℹ️",
            NotificationKind::Achievement => "🏆",
        }
    }

    /// CSS modifier class
    pub fn css_class(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
            NotificationKind::Achievement => "achievement",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    /// Timestamp (ms) after which the toast is removed
    pub expires_at: f64,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    active: Vec<Notification>,
    next_id: u64,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
        now: f64,
        duration_ms: f64,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.active.push(Notification {
            id,
            kind,
            message: message.into(),
            expires_at: now + duration_ms,
        });
        id
    }

    /// Remove expired toasts, returning them
    pub fn expire(&mut self, now: f64) -> Vec<Notification> {
        let (expired, active): (Vec<_>, Vec<_>) = std::mem::take(&mut self.active)
            .into_iter()
            .partition(|n| n.expires_at <= now);
        self.active = active;
        expired
    }

    pub fn active(&self) -> &[Notification] {
        &self.active
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_expire_in_order() {
        let mut queue = NotificationQueue::new();
        let a = queue.push(NotificationKind::Info, "first", 0.0, 3000.0);
        let b = queue.push(NotificationKind::Achievement, "second", 1000.0, 3000.0);
        assert_ne!(a, b);

        assert!(queue.expire(2999.0).is_empty());
        let expired = queue.expire(3000.0);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, a);
        assert_eq!(queue.active().len(), 1);
        assert_eq!(queue.active()[0].message, "second");
    }
}
