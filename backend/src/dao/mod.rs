//! Module with index store interfaces

mod sqlitex;

pub use sqlitex::Sqlite;

pub type StorageBackend = Sqlite;
