pub mod decrypt_result;
pub mod event;
pub mod recipient;
pub mod resolution_entry;
pub mod resolve_context;
