//! Foundation module - Core utilities and types
//!
//! Currently this is the logging setup shared by the library and the demo.

pub mod logging;
