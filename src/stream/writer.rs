//! Пишущий контекст потока.

use std::io::{self, Write};

use tracing::trace;

use super::recovery::{write_range, EntryRange};
use crate::codec::Codec;
use crate::entry::{self, Entry};
use crate::error::{CodecError, CodecResult};
use crate::header::{ModuleVersionTable, HOST_MODULE_INDEX};
use crate::value::Pack;

/// Контекст одной операции сериализации: байтовый поток, таблица версий и
/// необязательный боковой recovery-поток.
///
/// Никакого глобального состояния: всё изменяемое живёт здесь. Смещения
/// считаются от начала операции (заголовок входит в счёт), поэтому читателю
/// достаточно запомнить собственную базовую позицию.
pub struct StreamWriter<'c, 's> {
    out: &'s mut dyn Write,
    written: u64,
    table: ModuleVersionTable,
    codec: &'c Codec,
    recovery: Option<&'s mut dyn Write>,
    entry_depth: usize,
}

impl<'c, 's> StreamWriter<'c, 's> {
    /// Создаёт контекст и сразу пишет заголовок-таблицу.
    ///
    /// Время жизни контекста и время жизни потоков независимы: кодек
    /// обычно живёт дольше одной операции записи.
    pub(crate) fn new(
        codec: &'c Codec,
        out: &'s mut dyn Write,
        recovery: Option<&'s mut dyn Write>,
    ) -> CodecResult<Self> {
        let table = ModuleVersionTable::from_registry(codec.modules());
        let mut header = Vec::new();
        table.write_to(&mut header)?;
        out.write_all(&header)?;
        Ok(Self {
            out,
            written: header.len() as u64,
            table,
            codec,
            recovery,
            entry_depth: 0,
        })
    }

    /// Сколько байт записано с начала операции.
    pub fn position(&self) -> u64 {
        self.written
    }

    /// Индекс модуля для записи идентификатора; хост — всегда −1.
    pub(crate) fn module_index(&self, namespace: &str) -> CodecResult<i32> {
        if namespace == self.codec.modules().host_namespace() {
            return Ok(HOST_MODULE_INDEX);
        }
        self.table
            .index_of(namespace)
            .ok_or_else(|| CodecError::UnknownModule {
                namespace: namespace.to_owned(),
            })
    }

    /// Пишет произвольное значение через диспетчер [`Pack`].
    pub fn write_value<T: Pack>(&mut self, value: &T) -> CodecResult<()> {
        value.pack(self)
    }

    /// Пишет одну entry верхнего уровня (ненулевую).
    pub fn write_entry(&mut self, value: &mut dyn Entry) -> CodecResult<()> {
        entry::write_entry(self, Some(value))
    }

    /// Пишет нулевой entry-слот.
    pub fn write_null_entry(&mut self) -> CodecResult<()> {
        entry::write_entry(self, None)
    }

    /// Входит в сериализацию entry; `true` для верхнего уровня.
    pub(crate) fn enter_entry(&mut self) -> bool {
        self.entry_depth += 1;
        self.entry_depth == 1
    }

    pub(crate) fn leave_entry(&mut self) {
        debug_assert!(self.entry_depth > 0);
        self.entry_depth -= 1;
    }

    /// Дописывает диапазон верхнеуровневой записи в recovery-поток.
    /// Без подключённого потока — no-op.
    pub(crate) fn record_entry_range(&mut self, range: EntryRange) -> CodecResult<()> {
        if let Some(recovery) = self.recovery.as_deref_mut() {
            write_range(recovery, range)?;
            trace!(start = range.start, end = range.end, "entry range recorded");
        }
        Ok(())
    }
}

// Низкоуровневые записи идут через `io::Write`, чтобы конвертеры могли
// пользоваться byteorder напрямую; счётчик позиции обновляется здесь.
impl Write for StreamWriter<'_, '_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.out.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
