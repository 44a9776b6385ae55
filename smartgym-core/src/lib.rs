pub mod db;
pub mod goals;
pub mod guidance;
pub mod performance;
pub mod reminders;
pub mod runtime;
pub mod session;

#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();
#[cfg(feature = "uniffi")]
pub mod uniffi_interface;
