//! Decides, per recipient, whether an inbound message gets an automatic
//! reply and sends it.
//!
//! A configuration whose end date has passed is disabled the next time it
//! is evaluated; there is no background sweep.

use chrono::{DateTime, Utc};
use crate::client::Mailer;
use crate::error::DispatchError;
use crate::filter::{self, Reason};
use crate::models::{AutoreplyConfig, Mailbox};
use crate::proto::InboundMessage;
use crate::store::{self, Store};

#[derive(Debug)]
pub enum Outcome {
    Sent,
    UnknownRecipient,
    NoConfig,
    Disabled,
    NotYetActive,
    Expired,
    CoolingDown,
    Failed(DispatchError),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

#[derive(Debug)]
pub struct Report {
    pub filtered: Option<Reason>,
    pub recipients: Vec<(String, Outcome)>,
}

impl Report {
    pub fn sent(&self) -> usize {
        self.recipients.iter().filter(|(_, o)| matches!(o, Outcome::Sent)).count()
    }

    pub fn has_failures(&self) -> bool {
        self.recipients.iter().any(|(_, o)| o.is_failure())
    }
}

pub struct Dispatcher<'a, S: Store, M: Mailer> {
    store: &'a S,
    mailer: &'a M,
    cooldown: chrono::Duration,
}

impl<'a, S: Store, M: Mailer> Dispatcher<'a, S, M> {
    pub fn new(store: &'a S, mailer: &'a M, cooldown: chrono::Duration) -> Self {
        Self {
            store,
            mailer,
            cooldown,
        }
    }

    pub fn dispatch(&self, message: &InboundMessage, now: DateTime<Utc>) -> Report {
        debug!("autoreply sender={} recipient={}", message.sender, message.recipients.join(","));

        if let Some(reason) = filter::mailing_list_reason(&message.sender, &message.headers) {
            debug!("Skip auto reply, this mail comes from a mailing list ({})", reason);
            return Report {
                filtered: Some(reason),
                recipients: vec![],
            };
        }

        let recipients = message.recipients.iter()
            .map(|r| (r.clone(), self.process_recipient(r, message, now)))
            .collect();

        Report {
            filtered: None,
            recipients,
        }
    }

    fn process_recipient(&self, recipient: &str, message: &InboundMessage, now: DateTime<Utc>) -> Outcome {
        let (local_part, domain) = match store::split_mailbox(recipient) {
            Some(p) => p,
            None => {
                debug!("Unknown recipient {}", recipient);
                return Outcome::UnknownRecipient;
            }
        };

        let mailbox = match self.store.lookup_mailbox(local_part, domain) {
            Ok(Some(m)) => m,
            Ok(None) => {
                debug!("Unknown recipient {}", recipient);
                return Outcome::UnknownRecipient;
            }
            Err(e) => {
                error!("Error looking up mailbox {}: {}", recipient, e);
                return Outcome::Failed(e.into());
            }
        };

        let config = match self.store.get_config(mailbox.id) {
            Ok(Some(c)) => c,
            Ok(None) => {
                debug!("autoreply message not found for {}", recipient);
                return Outcome::NoConfig;
            }
            Err(e) => {
                error!("Error loading autoreply message for {}: {}", recipient, e);
                return Outcome::Failed(e.into());
            }
        };
        if !config.enabled {
            debug!("autoreply message disabled for {}", recipient);
            return Outcome::Disabled;
        }

        debug!("autoreply message found for {}", recipient);
        self.send_autoreply(&message.sender, &mailbox, config, message, now)
    }

    /// Runs the send decision for one enabled configuration. States are
    /// checked in order: not yet active, expired, cooling down, send.
    pub fn send_autoreply(&self, sender: &str, mailbox: &Mailbox, mut config: AutoreplyConfig, original: &InboundMessage, now: DateTime<Utc>) -> Outcome {
        if config.from_date > now {
            debug!("autoreply message for {} starts at {}", mailbox.full_address(), config.from_date);
            return Outcome::NotYetActive;
        }

        if let Some(until) = config.until_date {
            if until < now {
                config.enabled = false;
                return match self.store.save_config(&config) {
                    Ok(_) => {
                        debug!("autoreply message for {} expired at {}, disabled", mailbox.full_address(), until);
                        Outcome::Expired
                    }
                    Err(e) => {
                        error!("Error disabling expired autoreply message {}: {}", config.id, e);
                        Outcome::Failed(e.into())
                    }
                };
            }
        }

        match self.store.get_send_record(config.id, sender) {
            Ok(Some(last)) => {
                // An end of cooldown past the calendar never comes.
                let cooling = last.last_sent.checked_add_signed(self.cooldown)
                    .map_or(true, |until| until > now);
                if cooling {
                    debug!(
                        "no autoreply message sent to {} because last one was sent at {} (timeout {}s)",
                        sender, last.last_sent, self.cooldown.num_seconds()
                    );
                    return Outcome::CoolingDown;
                }
            }
            Ok(None) => {}
            Err(e) => {
                error!("Error loading autoreply history for {}: {}", sender, e);
                return Outcome::Failed(e.into());
            }
        }

        let email = match crate::sender::compose_reply(sender, mailbox, &config, original) {
            Ok(e) => e,
            Err(e) => {
                error!("Failed to build autoreply message to {}: {}", sender, e);
                return Outcome::Failed(e.into());
            }
        };
        if let Err(e) = self.mailer.send(&email) {
            error!("Failed to send autoreply message to {}: {}", sender, e);
            return Outcome::Failed(e.into());
        }
        debug!("autoreply message sent to {} from {}", sender, mailbox.outgoing_address());

        match self.store.upsert_send_record(config.id, sender, now) {
            Ok(_) => Outcome::Sent,
            Err(e) => {
                error!("Error recording autoreply sent to {}: {}", sender, e);
                Outcome::Failed(e.into())
            }
        }
    }
}
