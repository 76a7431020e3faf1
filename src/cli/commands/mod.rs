pub mod decrypt;
pub mod diagnostics_helpers;
pub mod init;
pub mod keys;
pub mod log;
pub mod registry_helpers;
pub mod schemes;
