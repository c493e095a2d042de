//! Transient notices shown above the book form.
//!
use std::time::{Duration, Instant};

/// How long a notice stays on screen.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Danger,
}

#[derive(Clone, Debug)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    shown_at: Instant,
}

impl Notice {
    pub fn new(message: impl Into<String>, kind: NoticeKind, now: Instant) -> Self {
        Self {
            message: message.into(),
            kind,
            shown_at: now,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NoticeKind::Success, Instant::now())
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(message, NoticeKind::Danger, Instant::now())
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= NOTICE_TTL
    }
}

/// Drop `slot`'s notice once it has been visible for [`NOTICE_TTL`].
pub fn dismiss_expired(slot: &mut Option<Notice>, now: Instant) {
    if slot.as_ref().is_some_and(|n| n.is_expired(now)) {
        *slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_expires_after_three_seconds() {
        let t0 = Instant::now();
        let mut slot = Some(Notice::new("Book Added", NoticeKind::Success, t0));
        dismiss_expired(&mut slot, t0 + Duration::from_millis(2999));
        assert!(slot.is_some());
        dismiss_expired(&mut slot, t0 + NOTICE_TTL);
        assert!(slot.is_none());
    }
}
