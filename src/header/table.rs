//! Таблица версий модулей — пролог каждого потока.
//!
//! Вместо повторения строк пространств имён каждая запись ссылается на модуль
//! маленьким целым индексом. Индексы назначаются порядком добавления при
//! записи; индекс −1 зарезервирован за самим приложением-хостом.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use tracing::debug;

use super::Version;
use crate::error::{CodecError, CodecResult};
use crate::registry::ModuleRegistry;
use crate::value::plain::{read_str, write_str};

/// Индекс, жёстко закреплённый за пространством имён приложения-хоста.
pub const HOST_MODULE_INDEX: i32 = -1;

/// Верхняя граница числа модулей в заголовке. Больше — повреждение формата,
/// а не реальная таблица.
pub const MAX_MODULES: i32 = 65_536;

/// Один слот таблицы: (пространство имён, версия на момент записи).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSlot {
    pub namespace: String,
    pub version: Version,
}

/// Пролог потока: версия приложения плюс индексированный список модулей.
///
/// После конструирования таблица только читается.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleVersionTable {
    app_version: Version,
    slots: Vec<TableSlot>,
}

impl ModuleVersionTable {
    /// Строит таблицу из реестра загруженных модулей в его фиксированном
    /// порядке перечисления. Хост в слоты не входит — у него индекс −1.
    pub fn from_registry(registry: &ModuleRegistry) -> Self {
        Self {
            app_version: registry.host_version(),
            slots: registry
                .iter()
                .map(|m| TableSlot {
                    namespace: m.namespace.clone(),
                    version: m.version,
                })
                .collect(),
        }
    }

    /// Версия приложения, записавшего поток.
    pub fn app_version(&self) -> Version {
        self.app_version
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Слот по индексу из потока. Индекс вне диапазона — фатальное
    /// повреждение формата: остальной поток уже нельзя трактовать.
    pub fn slot(&self, index: i32) -> CodecResult<&TableSlot> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.slots.get(i))
            .ok_or_else(|| {
                CodecError::corrupted(format!(
                    "module index {index} out of range (table has {} modules)",
                    self.slots.len()
                ))
            })
    }

    /// Индекс пространства имён при записи; хост отображается в −1.
    pub fn index_of(&self, namespace: &str) -> Option<i32> {
        self.slots
            .iter()
            .position(|s| s.namespace == namespace)
            .map(|i| i as i32)
    }

    /// Пишет заголовок: версия приложения, счётчик, затем (имя, версия)
    /// на каждый модуль.
    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> CodecResult<()> {
        self.app_version.write_to(w)?;
        w.write_i32::<LittleEndian>(self.slots.len() as i32)?;
        for slot in &self.slots {
            write_str(w, &slot.namespace)?;
            slot.version.write_to(w)?;
        }
        debug!(
            app_version = %self.app_version,
            modules = self.slots.len(),
            "module table written"
        );
        Ok(())
    }

    /// Читает заголовок в индексированный массив.
    pub fn read_from<R: Read + ?Sized>(r: &mut R) -> CodecResult<Self> {
        let app_version = Version::read_from(r)?;
        let count = r.read_i32::<LittleEndian>()?;
        if !(0..=MAX_MODULES).contains(&count) {
            return Err(CodecError::corrupted(format!(
                "implausible module count {count} in header"
            )));
        }
        let mut slots = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let namespace = read_str(r)?;
            let version = Version::read_from(r)?;
            slots.push(TableSlot { namespace, version });
        }
        debug!(app_version = %app_version, modules = slots.len(), "module table read");
        Ok(Self { app_version, slots })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn sample_registry() -> ModuleRegistry {
        let mut reg = ModuleRegistry::new("app.core", Version::new(2, 0, 0, 0));
        reg.load("mods.alpha", Version::new(1, 1, 0, 0));
        reg.load("mods.beta", Version::new(0, 9, 3, 7));
        reg
    }

    #[test]
    fn test_table_roundtrip() {
        let table = ModuleVersionTable::from_registry(&sample_registry());
        let mut buf = Vec::new();
        table.write_to(&mut buf).unwrap();

        let parsed = ModuleVersionTable::read_from(&mut Cursor::new(buf)).unwrap();
        assert_eq!(parsed, table);
        assert_eq!(parsed.app_version(), Version::new(2, 0, 0, 0));
        assert_eq!(parsed.slot(1).unwrap().namespace, "mods.beta");
    }

    #[test]
    fn test_index_assigned_by_append_order() {
        let table = ModuleVersionTable::from_registry(&sample_registry());
        assert_eq!(table.index_of("mods.alpha"), Some(0));
        assert_eq!(table.index_of("mods.beta"), Some(1));
        assert_eq!(table.index_of("mods.gamma"), None);
    }

    #[test]
    fn test_out_of_range_index_is_fatal() {
        let table = ModuleVersionTable::from_registry(&sample_registry());
        assert!(matches!(
            table.slot(2),
            Err(CodecError::FormatCorruption { .. })
        ));
        assert!(matches!(
            table.slot(-1),
            Err(CodecError::FormatCorruption { .. })
        ));
    }

    #[test]
    fn test_negative_module_count_rejected() {
        let mut buf = Vec::new();
        Version::new(1, 0, 0, 0).write_to(&mut buf).unwrap();
        buf.extend_from_slice(&(-3i32).to_le_bytes());

        assert!(matches!(
            ModuleVersionTable::read_from(&mut Cursor::new(buf)),
            Err(CodecError::FormatCorruption { .. })
        ));
    }
}
