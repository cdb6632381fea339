use lettre::Transport;
use crate::config::SmtpConfig;
use crate::error::SendingError;

pub trait Mailer {
    fn send(&self, email: &lettre::Message) -> Result<(), SendingError>;
}

/// Hands replies to the local MTA over plain SMTP.
pub struct SmtpMailer {
    transport: lettre::SmtpTransport,
    relay: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Self {
        let transport = lettre::SmtpTransport::builder_dangerous(config.host.as_str())
            .port(config.port)
            .timeout(Some(config.timeout))
            .build();
        SmtpMailer {
            transport,
            relay: format!("{}:{}", config.host, config.port),
        }
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, email: &lettre::Message) -> Result<(), SendingError> {
        let resp = self.transport.send(email)?;
        debug!("{} accepted message: {}", self.relay, resp.code());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{config, inbound, mailbox};

    #[test]
    fn unreachable_relay_is_a_sending_error() {
        let mailer = SmtpMailer::new(&SmtpConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            timeout: std::time::Duration::from_secs(2),
        });
        let original = inbound("homer@simpson.test", &["user@test.com"], "Subject: Test\r\n\r\n");
        let email = crate::sender::compose_reply("homer@simpson.test", &mailbox(), &config(), &original).unwrap();

        assert!(mailer.send(&email).is_err());
    }
}
