//! Database driver implementations of the source and destination seams.

pub mod mysql;

pub use mysql::{MysqlDestWriter, MysqlSourceReader};
