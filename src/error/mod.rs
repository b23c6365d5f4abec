//! Ошибки кодека и алиас результата.
//!
//! Таксономия повторяет поведение потока: повреждение формата фатально,
//! отсутствующий модуль восстанавливается через recovery-индекс, расхождение
//! версий отдаётся в patch-путь и без него — явная ошибка, а не «как-нибудь
//! значение по умолчанию».

use std::io;

use thiserror::Error;

use crate::header::Version;

/// Результат любой операции кодека.
pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug, Error)]
pub enum CodecError {
    /// Повреждённый или рассинхронизированный поток: короткое чтение,
    /// отрицательная длина, неизвестный индекс модуля и т.п.
    /// Восстановление невозможно — курсор уже сдвинут.
    #[error("corrupted stream: {reason}")]
    FormatCorruption { reason: String, offset: Option<u64> },

    /// Ошибка ввода-вывода, не связанная с концом потока.
    #[error("i/o failure: {0}")]
    Io(io::Error),

    /// Форма контейнера распознана, но сознательно не поддерживается.
    #[error("unsupported container shape `{shape}`: use `{alternative}` instead")]
    Unsupported {
        shape: &'static str,
        alternative: &'static str,
    },

    /// Идентификатор entry не зарегистрирован в кодеке (полиморфное чтение).
    #[error("unknown entry type `{namespace}::{name}`")]
    UnknownEntryType { namespace: String, name: String },

    /// Модуль, владеющий entry, не загружен, и пропустить запись нечем
    /// (нет recovery-индекса либо нет подходящей записи в нём).
    #[error("module `{namespace}` is not loaded and entry `{name}` cannot be skipped: {reason}")]
    MissingModule {
        namespace: String,
        name: String,
        reason: String,
    },

    /// Версия модуля при чтении не совпала с версией при записи, а у типа
    /// нет собственного patch-перехода.
    #[error(
        "version mismatch for `{namespace}::{name}`: written by {written}, loaded is {loaded}"
    )]
    VersionMismatch {
        namespace: String,
        name: String,
        written: Version,
        loaded: Version,
    },

    /// Двойная регистрация одного и того же entry-типа в билдере.
    #[error("entry `{namespace}::{name}` registered twice")]
    DuplicateEntry { namespace: String, name: String },

    /// Пространство имён не известно ни таблице потока, ни реестру модулей.
    #[error("module namespace `{namespace}` is not registered")]
    UnknownModule { namespace: String },
}

impl CodecError {
    /// Повреждение формата без привязки к смещению.
    pub fn corrupted(reason: impl Into<String>) -> Self {
        Self::FormatCorruption {
            reason: reason.into(),
            offset: None,
        }
    }

    /// Повреждение формата с известным смещением в основном потоке.
    pub fn corrupted_at(reason: impl Into<String>, offset: u64) -> Self {
        Self::FormatCorruption {
            reason: format!("{} (at offset {offset})", reason.into()),
            offset: Some(offset),
        }
    }
}

// Короткое чтение — это повреждение формата, а не обычная ошибка I/O:
// после частичного потребления курсор нельзя откатить.
impl From<io::Error> for CodecError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::corrupted("unexpected end of stream")
        } else {
            Self::Io(err)
        }
    }
}
