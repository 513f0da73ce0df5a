// SQLite adapter for the persistence collaborator: stores tier ratings and
// per-category results, and answers the aggregator's latest-result lookups.

pub mod db;

pub use db::Database;
