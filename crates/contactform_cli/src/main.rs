//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `contactform_core` linkage and store connectivity.
//! - Keep output deterministic for quick local sanity checks.

use contactform_core::db::open_db_with_config;
use contactform_core::{
    core_version, init_logging, ping, ContactListQuery, ContactRepository,
    SqliteContactRepository, StoreConfig,
};
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("contactform_core ping={}", ping());
    println!("contactform_core version={}", core_version());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_probe module=cli status=error error={message}");
            eprintln!("contactform probe failed: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = StoreConfig::from_env().map_err(|err| err.to_string())?;
    init_logging(&config).map_err(|err| err.to_string())?;

    let conn = open_db_with_config(&config).map_err(|err| err.to_string())?;
    let repo = SqliteContactRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let contacts = repo
        .list_contacts(&ContactListQuery {
            include_deleted: true,
            ..ContactListQuery::default()
        })
        .map_err(|err| err.to_string())?;
    let deleted = contacts.iter().filter(|contact| contact.is_deleted()).count();

    println!("contactform_core db_path={}", config.db_path.display());
    println!("contactform_core contacts_active={}", contacts.len() - deleted);
    println!("contactform_core contacts_deleted={deleted}");
    Ok(())
}
