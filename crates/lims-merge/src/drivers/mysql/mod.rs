//! MySQL driver built on SQLx.
//!
//! One reader pool per source schema; the destination writer holds a
//! single transaction for the whole run.

mod reader;
mod writer;

pub use reader::MysqlSourceReader;
pub use writer::MysqlDestWriter;

use std::time::Duration;

/// Connection pool timeout.
pub(crate) const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Quote a MySQL identifier.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Placeholder list for an IN clause of `n` bound values.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
