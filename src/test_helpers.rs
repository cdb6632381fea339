use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use chrono::{DateTime, TimeZone, Utc};
use crate::client::Mailer;
use crate::error::{SendingError, StoreError};
use crate::models::{AutoreplyConfig, Mailbox, SendRecord};
use crate::proto::InboundMessage;
use crate::store::Store;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 5, 7, 18, 54, 0).unwrap()
}

pub fn mailbox() -> Mailbox {
    Mailbox {
        id: 1,
        address: "user".to_string(),
        domain: "test.com".to_string(),
        first_name: "User".to_string(),
        last_name: "Test".to_string(),
        user_email: "user@test.com".to_string(),
    }
}

pub fn config() -> AutoreplyConfig {
    AutoreplyConfig {
        id: 10,
        mailbox_id: 1,
        subject: "On leave".to_string(),
        content: "I'm off".to_string(),
        enabled: true,
        from_date: t0() - chrono::Duration::days(1),
        until_date: None,
    }
}

pub fn inbound(sender: &str, recipients: &[&str], data: &str) -> InboundMessage {
    let recipients = recipients.iter().map(|r| r.to_string()).collect::<Vec<_>>();
    InboundMessage::parse(sender, &recipients, data.as_bytes()).unwrap()
}

/// In-memory stand-in for the Modoboa database.
#[derive(Default)]
pub struct MemoryStore {
    pub mailboxes: RefCell<Vec<Mailbox>>,
    pub configs: RefCell<Vec<AutoreplyConfig>>,
    pub records: RefCell<HashMap<(i32, String), SendRecord>>,
    pub config_saves: Cell<usize>,
    pub broken: Cell<bool>,
    next_record_id: Cell<i32>,
}

impl MemoryStore {
    pub fn with(mailboxes: Vec<Mailbox>, configs: Vec<AutoreplyConfig>) -> Self {
        let store = MemoryStore::default();
        *store.mailboxes.borrow_mut() = mailboxes;
        *store.configs.borrow_mut() = configs;
        store
    }

    pub fn config(&self, id: i32) -> AutoreplyConfig {
        self.configs.borrow().iter().find(|c| c.id == id).cloned().unwrap()
    }

    pub fn record(&self, config_id: i32, sender: &str) -> Option<SendRecord> {
        self.records.borrow().get(&(config_id, sender.to_string())).cloned()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.broken.get() {
            Err(StoreError::Query(diesel::result::Error::RollbackTransaction))
        } else {
            Ok(())
        }
    }
}

impl Store for MemoryStore {
    fn lookup_mailbox(&self, local_part: &str, domain: &str) -> Result<Option<Mailbox>, StoreError> {
        self.check()?;
        Ok(self.mailboxes.borrow().iter()
            .find(|m| m.address == local_part && m.domain == domain)
            .cloned())
    }

    fn get_config(&self, mailbox_id: i32) -> Result<Option<AutoreplyConfig>, StoreError> {
        self.check()?;
        let configs = self.configs.borrow();
        let mut candidates = configs.iter().filter(|c| c.mailbox_id == mailbox_id).collect::<Vec<_>>();
        candidates.sort_by_key(|c| (!c.enabled, -c.id));
        Ok(candidates.first().map(|c| (*c).clone()))
    }

    fn save_config(&self, config: &AutoreplyConfig) -> Result<(), StoreError> {
        self.check()?;
        self.config_saves.set(self.config_saves.get() + 1);
        if let Some(c) = self.configs.borrow_mut().iter_mut().find(|c| c.id == config.id) {
            c.enabled = config.enabled;
        }
        Ok(())
    }

    fn get_send_record(&self, config_id: i32, sender: &str) -> Result<Option<SendRecord>, StoreError> {
        self.check()?;
        Ok(self.record(config_id, sender))
    }

    fn upsert_send_record(&self, config_id: i32, sender: &str, last_sent: DateTime<Utc>) -> Result<(), StoreError> {
        self.check()?;
        let mut records = self.records.borrow_mut();
        let record = records.entry((config_id, sender.to_string())).or_insert_with(|| {
            self.next_record_id.set(self.next_record_id.get() + 1);
            SendRecord {
                id: self.next_record_id.get(),
                config_id,
                last_sent,
                sender: sender.to_string(),
            }
        });
        record.last_sent = last_sent;
        Ok(())
    }
}

/// Keeps every message it is asked to send.
#[derive(Default)]
pub struct RecordingMailer {
    pub outbox: RefCell<Vec<lettre::Message>>,
}

impl RecordingMailer {
    pub fn count(&self) -> usize {
        self.outbox.borrow().len()
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, email: &lettre::Message) -> Result<(), SendingError> {
        self.outbox.borrow_mut().push(email.clone());
        Ok(())
    }
}

pub struct FailingMailer(pub SendingError);

impl Mailer for FailingMailer {
    fn send(&self, _email: &lettre::Message) -> Result<(), SendingError> {
        Err(self.0.clone())
    }
}
