// [apps/server/src/services/mod.rs]
//! Background daemons and the in-process event bus (SPEC_FULL §10).

pub mod command_catalog;
pub mod event_bus;
pub mod lease_reaper;
pub mod retention_daemon;

pub use command_catalog::seed_defaults;
pub use event_bus::EventBus;
pub use lease_reaper::spawn_lease_reaper;
pub use retention_daemon::spawn_retention_daemon;
