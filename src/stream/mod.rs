//! Контексты потоков чтения и записи плюс recovery-индекс.

pub mod reader;
pub mod recovery;
pub mod writer;

pub use reader::{ReadSeek, StreamReader};
pub use recovery::EntryRange;
pub use writer::StreamWriter;
