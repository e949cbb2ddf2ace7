use std::time::{Duration, Instant};

const VISIBLE: f32 = 3.0;
const FADE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    start: Instant,
}

impl Toast {
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
            start: Instant::now(),
        }
    }

    fn elapsed(&self, now: Instant) -> f32 {
        now.saturating_duration_since(self.start).as_secs_f32()
    }

    pub fn opacity_at(&self, now: Instant) -> f32 {
        let elapsed = self.elapsed(now);
        if elapsed < VISIBLE {
            1.0
        } else if elapsed < VISIBLE + FADE {
            1.0 - (elapsed - VISIBLE) / FADE
        } else {
            0.0
        }
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.elapsed(now) >= VISIBLE + FADE
    }
}

/// Stack of on-screen notifications, newest last.
#[derive(Debug, Default)]
pub struct Notifications {
    toasts: Vec<Toast>,
}

impl Notifications {
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Toast::new(message, ToastKind::Info));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Toast::new(message, ToastKind::Success));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Toast::new(message, ToastKind::Error));
    }

    fn push(&mut self, toast: Toast) {
        tracing::debug!(kind = ?toast.kind, message = %toast.message, "notification");
        self.toasts.push(toast);
    }

    /// Drop faded toasts. Returns whether any are still visible.
    pub fn expire(&mut self, now: Instant) -> bool {
        self.toasts.retain(|t| !t.is_expired_at(now));
        !self.toasts.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// How long until the next toast changes appearance.
    pub fn next_repaint(&self) -> Option<Duration> {
        if self.toasts.is_empty() {
            None
        } else {
            Some(Duration::from_millis(50))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opacity_timeline() {
        let toast = Toast::new("hi", ToastKind::Info);
        let t0 = toast.start;
        assert_eq!(toast.opacity_at(t0), 1.0);
        assert_eq!(toast.opacity_at(t0 + Duration::from_millis(2900)), 1.0);
        let mid = toast.opacity_at(t0 + Duration::from_millis(3250));
        assert!(mid > 0.4 && mid < 0.6, "mid-fade opacity {mid}");
        assert_eq!(toast.opacity_at(t0 + Duration::from_secs(4)), 0.0);
        assert!(toast.is_expired_at(t0 + Duration::from_secs(4)));
    }

    #[test]
    fn test_expire_drops_only_faded() {
        let mut n = Notifications::default();
        n.info("old");
        let later = Instant::now() + Duration::from_secs(5);
        n.toasts.push(Toast {
            message: "new".into(),
            kind: ToastKind::Success,
            start: later,
        });
        assert!(n.expire(later));
        assert_eq!(n.len(), 1);
        assert_eq!(n.iter().next().unwrap().message, "new");
    }

    #[test]
    fn test_expire_on_empty_is_noop() {
        let mut n = Notifications::default();
        assert!(!n.expire(Instant::now()));
        assert!(n.is_empty());
        assert_eq!(n.next_repaint(), None);
    }

    #[test]
    fn test_iter_rev_is_newest_first() {
        let mut n = Notifications::default();
        n.info("first");
        n.error("second");
        let newest: Vec<&str> = n.iter().rev().map(|t| t.message.as_str()).collect();
        assert_eq!(newest, ["second", "first"]);
    }
}
