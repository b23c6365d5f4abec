//! Читающий контекст потока.

use std::io::{self, Read, Seek, SeekFrom};

use tracing::warn;

use super::recovery::RecoveryIndex;
use crate::codec::Codec;
use crate::entry::{self, Entry, EntryType, Identifier};
use crate::error::{CodecError, CodecResult};
use crate::header::{ModuleVersionTable, Version, HOST_MODULE_INDEX};
use crate::value::Pack;

/// Основной поток чтения обязан уметь перемещать курсор: пропуск записи
/// отсутствующего модуля — это seek к концу её диапазона.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// Контекст одной операции десериализации.
///
/// Таблица версий читается при создании; recovery-индекс открывается лениво,
/// при первом запросе на пропуск. Позиции считаются относительно базового
/// смещения, запомненного до чтения заголовка, — так они сопоставимы со
/// смещениями пишущей стороны.
pub struct StreamReader<'c, 's> {
    src: &'s mut dyn ReadSeek,
    base: u64,
    table: ModuleVersionTable,
    codec: &'c Codec,
    recovery: RecoveryIndex<'s>,
}

impl<'c, 's> StreamReader<'c, 's> {
    pub(crate) fn new(
        codec: &'c Codec,
        src: &'s mut dyn ReadSeek,
        recovery: Option<&'s mut dyn Read>,
    ) -> CodecResult<Self> {
        let base = src.stream_position()?;
        let table = ModuleVersionTable::read_from(&mut *src)?;
        Ok(Self {
            src,
            base,
            table,
            codec,
            recovery: match recovery {
                Some(stream) => RecoveryIndex::Pending(stream),
                None => RecoveryIndex::Absent,
            },
        })
    }

    /// Текущая позиция относительно начала операции.
    pub fn position(&mut self) -> CodecResult<u64> {
        Ok(self.src.stream_position()? - self.base)
    }

    /// Версия приложения, записавшего поток.
    pub fn app_version(&self) -> Version {
        self.table.app_version()
    }

    pub(crate) fn codec(&self) -> &'c Codec {
        self.codec
    }

    /// Разрешает индекс модуля из потока в (пространство имён, версия на
    /// момент записи). Индекс −1 — хост: имя берётся из реестра читателя,
    /// версия — из заголовка потока.
    pub(crate) fn resolve_module_index(&self, index: i32) -> CodecResult<(String, Version)> {
        if index == HOST_MODULE_INDEX {
            return Ok((
                self.codec.modules().host_namespace().to_owned(),
                self.table.app_version(),
            ));
        }
        let slot = self.table.slot(index)?;
        Ok((slot.namespace.clone(), slot.version))
    }

    /// Читает произвольное значение через диспетчер [`Pack`].
    pub fn read_value<T: Pack>(&mut self) -> CodecResult<T> {
        T::unpack(self)
    }

    /// Читает entry верхнего уровня известного типа.
    ///
    /// `None` — в потоке нулевой слот либо запись пропущена из-за
    /// отсутствующего модуля.
    pub fn read_entry<T: EntryType>(&mut self) -> CodecResult<Option<T>> {
        entry::read_entry::<T>(self)
    }

    /// Читает entry, конкретный тип которой известен только потоку.
    /// Тип разрешается по идентификатору через таблицу регистраций.
    pub fn read_entry_dyn(&mut self) -> CodecResult<Option<Box<dyn Entry>>> {
        entry::read_entry_dyn(self)
    }

    /// Заполняет уже выделенный экземпляр вместо создания нового.
    /// `Ok(false)` — слот оказался нулевым или был пропущен.
    pub fn populate_entry(&mut self, target: &mut dyn Entry) -> CodecResult<bool> {
        entry::populate_entry(self, target)
    }

    /// Пропускает полезную нагрузку текущей записи по recovery-индексу.
    ///
    /// Основной поток обязан стоять на начале полей записи; ищется диапазон,
    /// чей `start` равен текущей позиции основного потока, и курсор уходит
    /// на его `end`.
    pub(crate) fn skip_current_entry(&mut self, ident: &Identifier) -> CodecResult<()> {
        let position = self.position()?;
        let Some(ranges) = self.recovery.ranges()? else {
            return Err(CodecError::MissingModule {
                namespace: ident.namespace.clone(),
                name: ident.name.clone(),
                reason: "no recovery index was supplied".to_owned(),
            });
        };
        let Some(range) = ranges.iter().find(|r| r.start == position).copied() else {
            return Err(CodecError::MissingModule {
                namespace: ident.namespace.clone(),
                name: ident.name.clone(),
                reason: format!("recovery index has no range starting at offset {position}"),
            });
        };
        self.src.seek(SeekFrom::Start(self.base + range.end))?;
        warn!(
            namespace = %ident.namespace,
            name = %ident.name,
            start = range.start,
            end = range.end,
            "entry skipped: owning module is not loaded"
        );
        Ok(())
    }
}

impl Read for StreamReader<'_, '_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.src.read(buf)
    }
}
