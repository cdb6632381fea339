//! Mailing list and automated sender detection, following the exclusions
//! of RFC 5230 section 4.6 and RFC 3834 section 2.
//!
//! On top of the list senders and list/bulk headers, the null envelope
//! sender and any `Auto-Submitted` value other than `no` are never
//! answered, so bounces and other automatic replies cannot start a loop.

use crate::proto::Headers;

const LIST_SENDERS: &[&str] = &["mailer-daemon", "listserv", "majordomo"];

const LIST_HEADERS: &[&str] = &[
    "List-Id", "List-Help", "List-Subscribe", "List-Unsubscribe",
    "List-Post", "List-Owner", "List-Archive",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Reason {
    NullSender,
    ListSender(String),
    BulkPrecedence,
    PhpMailer,
    ListHeader(&'static str),
    AutoSubmitted(String),
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Reason::NullSender => write!(f, "empty envelope sender"),
            Reason::ListSender(l) => write!(f, "sender local part {:?}", l),
            Reason::BulkPrecedence => write!(f, "Precedence: bulk"),
            Reason::PhpMailer => write!(f, "X-Mailer: PHPMailer"),
            Reason::ListHeader(h) => write!(f, "{} header present", h),
            Reason::AutoSubmitted(v) => write!(f, "Auto-Submitted: {}", v),
        }
    }
}

pub fn sender_local_part(sender: &str) -> String {
    let sender = sender.to_lowercase();
    match sender.rsplitn(2, '@').nth(1) {
        Some(local) => local.to_string(),
        None => sender,
    }
}

fn header_is(headers: &Headers, name: &str, value: &str) -> bool {
    headers.get(name)
        .map(|v| v.trim().eq_ignore_ascii_case(value))
        .unwrap_or(false)
}

/// Returns why no reply must be sent for this message, if anything.
pub fn mailing_list_reason(sender: &str, headers: &Headers) -> Option<Reason> {
    let sender = sender.trim().trim_start_matches('<').trim_end_matches('>');
    if sender.is_empty() {
        return Some(Reason::NullSender);
    }

    let local_part = sender_local_part(sender);
    if LIST_SENDERS.contains(&local_part.as_str())
        || local_part.starts_with("owner-")
        || local_part.ends_with("-request")
    {
        return Some(Reason::ListSender(local_part));
    }

    if header_is(headers, "Precedence", "bulk") {
        return Some(Reason::BulkPrecedence);
    }
    if header_is(headers, "X-Mailer", "PHPMailer") {
        return Some(Reason::PhpMailer);
    }
    if let Some(h) = LIST_HEADERS.iter().find(|h| headers.contains(h)) {
        return Some(Reason::ListHeader(*h));
    }

    match headers.get("Auto-Submitted") {
        Some(v) if !v.trim().eq_ignore_ascii_case("no") => {
            Some(Reason::AutoSubmitted(v.trim().to_string()))
        }
        _ => None,
    }
}
