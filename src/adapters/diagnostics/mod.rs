pub mod json_diagnostics_log;
