pub mod attempt_orchestrator;
pub mod candidate_keys;
pub mod dm_resolver;
pub mod error_aggregator;
pub mod result_builder;
pub mod scheme_hints;
pub mod scheme_registry;
