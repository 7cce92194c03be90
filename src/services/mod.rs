pub mod matchmaking;
pub mod results;
pub mod server;
