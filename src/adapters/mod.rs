pub mod decryptors;
pub mod diagnostics;
pub mod key_stores;
