//! Export core modules shared across CLI and WASM wrappers.

pub mod pdf_core;
