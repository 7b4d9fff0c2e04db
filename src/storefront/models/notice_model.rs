//! Notice model

use std::fmt;
use std::str::FromStr;

/// Style of a transient notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    Success,
    Warning,
    Danger,
    Info,
}

impl NoticeKind {
    /// CSS class applied next to `notice-item`
    pub fn css_class(&self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Warning => "warning",
            NoticeKind::Danger => "danger",
            NoticeKind::Info => "info",
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_class())
    }
}

impl FromStr for NoticeKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(NoticeKind::Success),
            "warning" => Ok(NoticeKind::Warning),
            "danger" => Ok(NoticeKind::Danger),
            "info" => Ok(NoticeKind::Info),
            other => Err(anyhow::anyhow!("unknown notice kind '{other}'")),
        }
    }
}

/// A notice currently on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub message: String,
    pub kind: NoticeKind,
}
