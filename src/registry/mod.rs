//! Реестры процесса: загруженные модули и зарегистрированные entry-типы.

pub mod entries;
pub mod modules;

pub(crate) use entries::EntryRegistry;
pub use modules::{LoadedModule, ModuleRegistry};
