pub mod clipboard;
pub mod session_storage;
pub mod stan_core;
