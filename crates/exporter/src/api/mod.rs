pub mod health;
pub mod lag;
pub mod metrics;
pub mod server;
pub mod state;
pub mod status;
