//! Share panel: share text and outbound links for one dashboard.

use crate::domain::Dashboard;
use std::str::FromStr;

/// Where a dashboard can be shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareTarget {
    Twitter,
    LinkedIn,
    WhatsApp,
    Email,
}

impl ShareTarget {
    pub const ALL: [Self; 4] = [Self::Twitter, Self::LinkedIn, Self::WhatsApp, Self::Email];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Twitter => "twitter",
            Self::LinkedIn => "linkedin",
            Self::WhatsApp => "whatsapp",
            Self::Email => "email",
        }
    }
}

impl FromStr for ShareTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown share target: {s}"))
    }
}

impl std::fmt::Display for ShareTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Share state for one dashboard.
///
/// # Examples
///
/// ```
/// use dashcat::app::{SharePanel, ShareTarget};
/// use dashcat::storage::seed_dashboards;
///
/// let record = seed_dashboards().remove(0);
/// let panel = SharePanel::new(&record).with_message("Veja isto");
/// assert!(panel.link(ShareTarget::LinkedIn).starts_with("https://www.linkedin.com/"));
/// assert_eq!(panel.copy_link(), record.url);
/// ```
#[derive(Debug, Clone)]
pub struct SharePanel<'a> {
    dashboard: &'a Dashboard,
    message: String,
}

impl<'a> SharePanel<'a> {
    #[must_use]
    pub fn new(dashboard: &'a Dashboard) -> Self {
        Self {
            dashboard,
            message: String::new(),
        }
    }

    /// Replaces the default share text. An empty message restores the default.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// The custom message, or `"<title> - <description>"`.
    #[must_use]
    pub fn share_text(&self) -> String {
        if self.message.is_empty() {
            format!("{} - {}", self.dashboard.title, self.dashboard.description)
        } else {
            self.message.clone()
        }
    }

    /// The link placed on the clipboard: the dashboard url itself.
    #[must_use]
    pub fn copy_link(&self) -> &str {
        &self.dashboard.url
    }

    #[must_use]
    pub fn link(&self, target: ShareTarget) -> String {
        let text = self.share_text();
        let url = &self.dashboard.url;
        match target {
            ShareTarget::Twitter => format!(
                "https://twitter.com/intent/tweet?text={}&url={}",
                encode_component(&text),
                encode_component(url)
            ),
            ShareTarget::LinkedIn => format!(
                "https://www.linkedin.com/sharing/share-offsite/?url={}",
                encode_component(url)
            ),
            ShareTarget::WhatsApp => {
                format!("https://wa.me/?text={}", encode_component(&format!("{text} {url}")))
            }
            ShareTarget::Email => format!(
                "mailto:?subject={}&body={}",
                encode_component(&self.dashboard.title),
                encode_component(&format!("{text}\n\n{url}"))
            ),
        }
    }
}

/// Percent-encodes everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`, byte by byte over
/// the UTF-8 encoding.
#[must_use]
pub fn encode_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        let unreserved = byte.is_ascii_alphanumeric()
            || matches!(byte, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')');
        if unreserved {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DashboardDraft;
    use chrono::Utc;

    fn dashboard() -> Dashboard {
        Dashboard::from_draft(
            "1",
            DashboardDraft::new("CNPq", "https://a.test/x?y=1").with_description("Editais"),
            Utc::now(),
        )
    }

    #[test]
    fn encodes_like_encode_uri_component() {
        assert_eq!(encode_component("a b&c=d/é"), "a%20b%26c%3Dd%2F%C3%A9");
        assert_eq!(encode_component("-_.!~*'()"), "-_.!~*'()");
        assert_eq!(encode_component("\n"), "%0A");
        assert_eq!(encode_component("ÿ\u{7f}"), "%C3%BF%7F");
    }

    #[test]
    fn default_text_joins_title_and_description() {
        let record = dashboard();
        assert_eq!(SharePanel::new(&record).share_text(), "CNPq - Editais");
        assert_eq!(SharePanel::new(&record).with_message("oi").share_text(), "oi");
    }

    #[test]
    fn builds_target_links() {
        let record = dashboard();
        let panel = SharePanel::new(&record);

        assert_eq!(
            panel.link(ShareTarget::Twitter),
            "https://twitter.com/intent/tweet?text=CNPq%20-%20Editais&url=https%3A%2F%2Fa.test%2Fx%3Fy%3D1"
        );
        assert_eq!(
            panel.link(ShareTarget::WhatsApp),
            "https://wa.me/?text=CNPq%20-%20Editais%20https%3A%2F%2Fa.test%2Fx%3Fy%3D1"
        );
        assert_eq!(
            panel.link(ShareTarget::Email),
            "mailto:?subject=CNPq&body=CNPq%20-%20Editais%0A%0Ahttps%3A%2F%2Fa.test%2Fx%3Fy%3D1"
        );
    }

    #[test]
    fn parses_targets_case_insensitively() {
        assert_eq!("WhatsApp".parse::<ShareTarget>(), Ok(ShareTarget::WhatsApp));
        assert!("fax".parse::<ShareTarget>().is_err());
    }
}
