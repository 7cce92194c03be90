pub mod connection;
pub mod games;
pub mod models;
pub mod players;
pub mod setup;

pub use connection::{create_pool, get_connection, DbConn, DbPool};
pub use models::*;
