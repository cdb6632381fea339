use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::query_builder::QueryFragment;
use diesel::query_dsl::methods::ExecuteDsl;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use crate::error::StoreError;
use crate::models::{AutoreplyConfig, Mailbox, NewSendRecord, SendRecord};
use crate::schema;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

type Pool = diesel::r2d2::Pool<diesel::r2d2::ConnectionManager<PgConnection>>;

/// Everything the dispatcher reads from and writes to the Modoboa database.
pub trait Store {
    fn lookup_mailbox(&self, local_part: &str, domain: &str) -> Result<Option<Mailbox>, StoreError>;

    fn get_config(&self, mailbox_id: i32) -> Result<Option<AutoreplyConfig>, StoreError>;

    /// Persists the `enabled` flag of `config`.
    fn save_config(&self, config: &AutoreplyConfig) -> Result<(), StoreError>;

    fn get_send_record(&self, config_id: i32, sender: &str) -> Result<Option<SendRecord>, StoreError>;

    /// Inserts or updates the record of `(config_id, sender)` in one statement.
    fn upsert_send_record(&self, config_id: i32, sender: &str, last_sent: chrono::DateTime<chrono::Utc>) -> Result<(), StoreError>;
}

/// Splits a recipient into local part and domain.
///
/// Auto-reply aliases have the form `user@domain@autoreply.domain`; the
/// transport domain is dropped so the real mailbox is looked up.
pub fn split_mailbox(address: &str) -> Option<(&str, &str)> {
    let address = address.trim().trim_start_matches('<').trim_end_matches('>');
    let mut parts = address.rsplitn(2, '@');
    let domain = parts.next()?;
    let local_part = parts.next()?;

    let (local_part, domain) = if local_part.contains('@') && domain.starts_with("autoreply.") {
        let mut parts = local_part.rsplitn(2, '@');
        let domain = parts.next()?;
        (parts.next()?, domain)
    } else {
        (local_part, domain)
    };

    if local_part.is_empty() || domain.is_empty() {
        None
    } else {
        Some((local_part, domain))
    }
}

pub struct PgStore {
    connection: Pool,
}

impl PgStore {
    pub fn connect(database_url: &str) -> Result<Self, StoreError> {
        let manager = diesel::r2d2::ConnectionManager::new(database_url);
        let connection = diesel::r2d2::Pool::builder()
            .max_size(2)
            .connection_timeout(std::time::Duration::from_secs(10))
            .build(manager)?;
        Ok(PgStore { connection })
    }

    pub fn run_migrations(&self) -> Result<(), StoreError> {
        let mut conn = self.connection.get()?;
        let applied = conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::Migration(e.to_string()))?;
        for version in applied {
            info!("Applied migration {}", version);
        }
        Ok(())
    }
}

impl Store for PgStore {
    fn lookup_mailbox(&self, local_part: &str, domain: &str) -> Result<Option<Mailbox>, StoreError> {
        use schema::{admin_domain, admin_mailbox, core_user};

        let mut conn = self.connection.get()?;
        let mailbox = admin_mailbox::table
            .inner_join(admin_domain::table)
            .inner_join(core_user::table)
            .filter(admin_mailbox::address.eq(local_part))
            .filter(admin_domain::name.eq(domain))
            .select((
                admin_mailbox::id,
                admin_mailbox::address,
                admin_domain::name,
                core_user::first_name,
                core_user::last_name,
                core_user::email,
            ))
            .first::<Mailbox>(&mut conn)
            .optional()?;
        Ok(mailbox)
    }

    fn get_config(&self, mailbox_id: i32) -> Result<Option<AutoreplyConfig>, StoreError> {
        let mut conn = self.connection.get()?;
        let config = config_query(mailbox_id)
            .first::<AutoreplyConfig>(&mut conn)
            .optional()?;
        Ok(config)
    }

    fn save_config(&self, config: &AutoreplyConfig) -> Result<(), StoreError> {
        use schema::postfix_autoreply_armessage::dsl::*;

        let mut conn = self.connection.get()?;
        diesel::update(postfix_autoreply_armessage.find(config.id))
            .set(enabled.eq(config.enabled))
            .execute(&mut conn)?;
        Ok(())
    }

    fn get_send_record(&self, config_id: i32, from: &str) -> Result<Option<SendRecord>, StoreError> {
        use schema::postfix_autoreply_arhistoric::dsl::*;

        let mut conn = self.connection.get()?;
        let record = postfix_autoreply_arhistoric
            .filter(armessage_id.eq(config_id))
            .filter(sender.eq(from))
            .first::<SendRecord>(&mut conn)
            .optional()?;
        Ok(record)
    }

    fn upsert_send_record(&self, config_id: i32, from: &str, at: chrono::DateTime<chrono::Utc>) -> Result<(), StoreError> {
        let mut conn = self.connection.get()?;
        let new_record = NewSendRecord {
            armessage_id: config_id,
            sender: from,
            last_sent: &at,
        };
        ExecuteDsl::execute(upsert_query(&new_record, at), &mut conn)?;
        Ok(())
    }
}

/// The enabled configuration of a mailbox first, newest first.
fn config_query(mailbox_id: i32) -> schema::postfix_autoreply_armessage::BoxedQuery<'static, Pg> {
    use schema::postfix_autoreply_armessage::dsl::*;

    postfix_autoreply_armessage
        .filter(mbox_id.eq(mailbox_id))
        .order((enabled.desc(), id.desc()))
        .into_boxed()
}

fn upsert_query<'a>(
    record: &'a NewSendRecord<'a>,
    at: chrono::DateTime<chrono::Utc>,
) -> impl ExecuteDsl<PgConnection> + QueryFragment<Pg> + 'a {
    use schema::postfix_autoreply_arhistoric::dsl::*;

    diesel::insert_into(postfix_autoreply_arhistoric)
        .values(record)
        .on_conflict((armessage_id, sender))
        .do_update()
        .set(last_sent.eq(at))
}
