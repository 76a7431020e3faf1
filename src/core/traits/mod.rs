pub mod decryptor;
pub mod diagnostics;
