//! Database module for PostgreSQL connection, schema types and seeding.

mod pool;
mod schema;
pub mod seed;

pub use pool::DatabasePool;
pub use schema::*;
