pub mod api;
pub mod cli;
pub mod config;
pub mod metrics;
pub mod normalizer;
pub mod poller;
pub mod registry;
pub mod run;
pub mod shutdown;
pub mod snapshot;
