use lettre::message::header::{ContentType, Header, HeaderName, HeaderValue};
use crate::error::SendingError;
use crate::models::{AutoreplyConfig, Mailbox};
use crate::proto::InboundMessage;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// `Auto-Submitted` (RFC 3834).
#[derive(Debug, Clone, PartialEq)]
pub struct AutoSubmitted(String);

impl Header for AutoSubmitted {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("Auto-Submitted")
    }

    fn parse(s: &str) -> Result<Self, BoxError> {
        Ok(Self(s.trim().to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Precedence(String);

impl Header for Precedence {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("Precedence")
    }

    fn parse(s: &str) -> Result<Self, BoxError> {
        Ok(Self(s.trim().to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

pub fn reply_subject(config: &AutoreplyConfig, original: &InboundMessage) -> String {
    format!("Auto: {} Re: {}", config.subject, original.subject())
}

/// Builds the reply to `sender` for a message received by `mailbox`.
pub fn compose_reply(sender: &str, mailbox: &Mailbox, config: &AutoreplyConfig, original: &InboundMessage) -> Result<lettre::Message, SendingError> {
    let from = lettre::message::Mailbox::new(mailbox.full_name(), mailbox.outgoing_address().parse()?);
    let to = lettre::message::Mailbox::new(None, sender.parse()?);

    let mut email_builder = lettre::Message::builder()
        .from(from)
        .to(to)
        .subject(reply_subject(config, original))
        .message_id(None)
        .header(AutoSubmitted("auto-replied".to_string()))
        .header(Precedence("bulk".to_string()))
        .header(ContentType::TEXT_PLAIN);

    if let Some(msg_id) = original.message_id() {
        email_builder = email_builder
            .in_reply_to(msg_id.to_owned())
            .references(msg_id.to_owned());
    }

    Ok(email_builder.body(config.content.clone())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{config, inbound, mailbox};
    use mailparse::MailHeaderMap;

    fn single_address(mail: &mailparse::ParsedMail<'_>, name: &str) -> mailparse::SingleInfo {
        let header = mail.headers.get_first_header(name).unwrap();
        mailparse::addrparse_header(header).unwrap().extract_single_info().unwrap()
    }

    #[test]
    fn reply_headers() {
        let original = inbound(
            "homer@simpson.test",
            &["user@test.com"],
            "Subject: Test\r\nMessage-ID: <abc>\r\n\r\nHi",
        );
        let email = compose_reply("homer@simpson.test", &mailbox(), &config(), &original).unwrap();
        let data = email.formatted();
        let parsed = mailparse::parse_mail(&data).unwrap();

        assert_eq!(parsed.headers.get_first_value("Subject").unwrap(), "Auto: On leave Re: Test");
        let to = single_address(&parsed, "To");
        assert_eq!(to.addr, "homer@simpson.test");
        let from = single_address(&parsed, "From");
        assert_eq!(from.addr, "user@test.com");
        assert_eq!(from.display_name.as_deref(), Some("User Test"));
        assert_eq!(parsed.headers.get_first_value("Auto-Submitted").unwrap(), "auto-replied");
        assert_eq!(parsed.headers.get_first_value("Precedence").unwrap(), "bulk");
        assert_eq!(parsed.headers.get_first_value("In-Reply-To").unwrap(), "<abc>");
        assert_eq!(parsed.headers.get_first_value("References").unwrap(), "<abc>");
        assert!(parsed.headers.get_first_value("Message-ID").is_some());
        assert_eq!(parsed.get_body().unwrap().trim_end(), "I'm off");
    }

    #[test]
    fn subject_without_original_subject() {
        let original = inbound("homer@simpson.test", &["user@test.com"], "From: homer@simpson.test\r\n\r\n");
        assert_eq!(reply_subject(&config(), &original), "Auto: On leave Re: ");
    }

    #[test]
    fn envelope_targets_sender_only() {
        let original = inbound("homer@simpson.test", &["user@test.com", "other@test.com"], "Subject: Test\r\n\r\n");
        let email = compose_reply("homer@simpson.test", &mailbox(), &config(), &original).unwrap();
        let envelope = email.envelope();

        assert_eq!(envelope.to().len(), 1);
        assert_eq!(envelope.to()[0].to_string(), "homer@simpson.test");
        assert_eq!(envelope.from().map(|f| f.to_string()), Some("user@test.com".to_string()));
    }

    #[test]
    fn no_threading_headers_without_message_id() {
        let original = inbound("homer@simpson.test", &["user@test.com"], "From: homer@simpson.test\r\n\r\n");
        let email = compose_reply("homer@simpson.test", &mailbox(), &config(), &original).unwrap();
        let data = email.formatted();
        let parsed = mailparse::parse_mail(&data).unwrap();

        assert_eq!(parsed.headers.get_first_value("Subject").unwrap().trim_end(), "Auto: On leave Re:");
        assert!(parsed.headers.get_first_value("In-Reply-To").is_none());
        assert!(parsed.headers.get_first_value("References").is_none());
    }

    #[test]
    fn utf8_content_survives_encoding() {
        let mut config = config();
        config.subject = "Congés".to_string();
        config.content = "Je suis en congés jusqu'au 3 août \u{1F3D6}".to_string();
        let original = inbound("homer@simpson.test", &["user@test.com"], "Subject: Déjà vu\r\n\r\n");

        let email = compose_reply("homer@simpson.test", &mailbox(), &config, &original).unwrap();
        let data = email.formatted();
        let parsed = mailparse::parse_mail(&data).unwrap();

        assert_eq!(parsed.headers.get_first_value("Subject").unwrap(), "Auto: Congés Re: Déjà vu");
        assert_eq!(parsed.get_body().unwrap().trim_end(), config.content);
    }

    #[test]
    fn falls_back_to_mailbox_address() {
        let mut mailbox = mailbox();
        mailbox.address = "leon".to_string();
        mailbox.user_email = String::new();
        mailbox.first_name = String::new();
        mailbox.last_name = String::new();
        let original = inbound("homer@simpson.test", &["user@test.com"], "Subject: Test\r\n\r\n");

        let email = compose_reply("homer@simpson.test", &mailbox, &config(), &original).unwrap();
        assert_eq!(email.envelope().from().map(|f| f.to_string()), Some("leon@test.com".to_string()));
    }

    #[test]
    fn invalid_sender_is_rejected() {
        let original = inbound("not an address", &["user@test.com"], "Subject: Test\r\n\r\n");
        let err = compose_reply("not an address", &mailbox(), &config(), &original).unwrap_err();
        assert!(matches!(err, SendingError::InvalidAddress(_)));
    }
}
