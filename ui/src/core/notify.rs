//! Transient notification banner shared by verification, calculation,
//! and sweep outcomes. One banner at a time: posting replaces whatever
//! was showing, and expiry is id-guarded so a stale auto-dismiss timer
//! never clears a newer message.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoticeBoard {
    current: Option<Notice>,
    next_id: u64,
}

impl NoticeBoard {
    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    /// Show a banner, replacing any existing one. Returns the id the
    /// caller should hand to its dismissal timer.
    pub fn post(&mut self, kind: NoticeKind, message: impl Into<String>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.current = Some(Notice {
            id,
            kind,
            message: message.into(),
        });
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.post(NoticeKind::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.post(NoticeKind::Error, message)
    }

    /// Clear the banner, but only if `id` still identifies it.
    pub fn expire(&mut self, id: u64) {
        if self.current.as_ref().is_some_and(|n| n.id == id) {
            self.current = None;
        }
    }
}
