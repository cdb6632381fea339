#[macro_use]
extern crate log;
#[macro_use]
extern crate diesel;

use std::io::Read;
use clap::Parser;

mod client;
mod config;
mod dispatcher;
mod error;
mod filter;
mod logging;
mod models;
mod proto;
mod schema;
mod sender;
mod store;
#[cfg(test)]
mod test_helpers;

// sysexits(3), understood by the Postfix pipe transport.
const EX_OK: i32 = 0;
const EX_USAGE: i32 = 64;
const EX_TEMPFAIL: i32 = 75;
const EX_CONFIG: i32 = 78;

/// Send vacation auto-replies for a message piped in by Postfix.
#[derive(Parser, Debug)]
#[command(name = "autoreply", version)]
struct Args {
    /// Log debug messages
    #[arg(short, long)]
    debug: bool,

    /// Create the auto-reply tables and exit
    #[arg(long)]
    init_db: bool,

    /// Envelope sender of the message
    #[arg(required_unless_present = "init_db", allow_hyphen_values = true)]
    sender: Option<String>,

    /// Envelope recipients of the message
    #[arg(required_unless_present = "init_db")]
    recipients: Vec<String>,
}

fn run(args: Args) -> i32 {
    let config = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return EX_CONFIG;
        }
    };

    let store = match store::PgStore::connect(&config.database_url) {
        Ok(s) => s,
        Err(e) => {
            error!("Unable to connect to the database: {}", e);
            return EX_TEMPFAIL;
        }
    };

    if args.init_db {
        return match store.run_migrations() {
            Ok(_) => {
                info!("Database ready");
                EX_OK
            }
            Err(e) => {
                error!("{}", e);
                EX_TEMPFAIL
            }
        };
    }

    let sender = args.sender.unwrap_or_default();
    let mut data = vec![];
    if let Err(e) = std::io::stdin().read_to_end(&mut data) {
        error!("Unable to read message from stdin: {}", e);
        return EX_TEMPFAIL;
    }

    let message = match proto::InboundMessage::parse(&sender, &args.recipients, &data) {
        Ok(m) => m,
        Err(e) => {
            error!("Dropping message from {}: {}", sender, e);
            return EX_OK;
        }
    };

    let mailer = client::SmtpMailer::new(&config.smtp);
    let dispatcher = dispatcher::Dispatcher::new(&store, &mailer, config.cooldown);
    let report = dispatcher.dispatch(&message, chrono::Utc::now());
    for (recipient, outcome) in &report.recipients {
        debug!("{}: {:?}", recipient, outcome);
    }
    exit_status(&report)
}

/// Any failed recipient requeues the whole message.
fn exit_status(report: &dispatcher::Report) -> i32 {
    if report.has_failures() {
        EX_TEMPFAIL
    } else {
        debug!("{} autoreply message(s) sent", report.sent());
        EX_OK
    }
}

fn main() {
    let args = match Args::try_parse() {
        Ok(a) => a,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(EX_USAGE);
        }
        Err(e) => e.exit(),
    };

    logging::init(args.debug);
    std::process::exit(run(args));
}
