//! Пролог потока: версии и таблица модулей.

pub mod table;
pub mod version;

pub use table::{ModuleVersionTable, TableSlot, HOST_MODULE_INDEX, MAX_MODULES};
pub use version::Version;
