use diesel::prelude::*;
use super::schema::{postfix_autoreply_armessage, postfix_autoreply_arhistoric};

/// A Modoboa mailbox together with the user owning it.
#[derive(Queryable, Debug, Clone, PartialEq)]
pub struct Mailbox {
    pub id: i32,
    pub address: String,
    pub domain: String,
    pub first_name: String,
    pub last_name: String,
    pub user_email: String,
}

impl Mailbox {
    pub fn full_address(&self) -> String {
        format!("{}@{}", self.address, self.domain)
    }

    pub fn full_name(&self) -> Option<String> {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }

    /// Address replies are sent from: the owner's email, or the mailbox
    /// itself when the owner has none.
    pub fn outgoing_address(&self) -> String {
        if self.user_email.trim().is_empty() {
            self.full_address()
        } else {
            self.user_email.trim().to_string()
        }
    }
}

#[derive(Identifiable, Queryable, Debug, Clone, PartialEq)]
#[diesel(table_name = postfix_autoreply_armessage)]
pub struct AutoreplyConfig {
    pub id: i32,
    pub mailbox_id: i32,
    pub subject: String,
    pub content: String,
    pub enabled: bool,
    pub from_date: chrono::DateTime<chrono::Utc>,
    pub until_date: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Identifiable, Queryable, Debug, Clone, PartialEq)]
#[diesel(table_name = postfix_autoreply_arhistoric)]
pub struct SendRecord {
    pub id: i32,
    pub config_id: i32,
    pub last_sent: chrono::DateTime<chrono::Utc>,
    pub sender: String,
}

#[derive(Insertable)]
#[diesel(table_name = postfix_autoreply_arhistoric)]
pub struct NewSendRecord<'a> {
    pub armessage_id: i32,
    pub sender: &'a str,
    pub last_sent: &'a chrono::DateTime<chrono::Utc>,
}
