//! Repository layer over the relational schema.

mod tasks;
mod users;

pub use tasks::TaskStore;
pub use users::{ExportPage, UserStore, EXPORT_PAGE_SIZE};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use tapquest_core::{Error, Result};

fn parse_uuid(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| Error::Database(format!("Invalid UUID in database: {}", e)))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Database(format!("Invalid timestamp in database: {}", e)))
}

fn parse_opt_timestamp(raw: Option<String>) -> Result<Option<DateTime<Utc>>> {
    raw.as_deref().map(parse_timestamp).transpose()
}
