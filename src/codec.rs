//! Явный контекст кодека.
//!
//! Никаких процессо-глобальных статиков: приложение один раз собирает
//! [`Codec`] при старте — хост, загруженные модули, entry-типы — и дальше
//! передаёт его по ссылке в каждую операцию. Контекст неизменяем и
//! безопасно делится между потоками; независимые потоки байтов никак не
//! пересекаются.

use std::io::{Read, Write};

use tracing::debug;

use crate::entry::{Entry, EntryType};
use crate::error::{CodecError, CodecResult};
use crate::header::Version;
use crate::registry::{EntryRegistry, ModuleRegistry};
use crate::stream::{ReadSeek, StreamReader, StreamWriter};

/// Неизменяемый контекст: реестр модулей плюс таблица регистраций entry.
pub struct Codec {
    modules: ModuleRegistry,
    entries: EntryRegistry,
}

impl Codec {
    /// Начинает сборку контекста с пространства имён и версии хоста.
    pub fn builder(
        host_namespace: impl Into<String>,
        host_version: impl Into<Version>,
    ) -> CodecBuilder {
        CodecBuilder {
            modules: ModuleRegistry::new(host_namespace, host_version.into()),
            entries: EntryRegistry::default(),
            error: None,
        }
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    pub(crate) fn entries(&self) -> &EntryRegistry {
        &self.entries
    }

    /// Зарегистрирован ли тип для полиморфного чтения.
    pub fn is_registered<T: EntryType>(&self) -> bool {
        self.entries.contains_type(std::any::TypeId::of::<T>())
    }

    /// Открывает пишущий контекст; заголовок-таблица уходит в поток сразу.
    ///
    /// Заём кодека и заём потоков не связаны: контекст переживает сколько
    /// угодно операций над короткоживущими буферами.
    pub fn writer<'s>(
        &self,
        out: &'s mut dyn Write,
        recovery: Option<&'s mut dyn Write>,
    ) -> CodecResult<StreamWriter<'_, 's>> {
        StreamWriter::new(self, out, recovery)
    }

    /// Открывает читающий контекст; заголовок-таблица разбирается сразу.
    pub fn reader<'s>(
        &self,
        src: &'s mut dyn ReadSeek,
        recovery: Option<&'s mut dyn Read>,
    ) -> CodecResult<StreamReader<'_, 's>> {
        StreamReader::new(self, src, recovery)
    }

    /// Сериализует одну entry верхнего уровня: заголовок плюс запись.
    pub fn serialize<'s>(
        &self,
        out: &'s mut dyn Write,
        value: &mut dyn Entry,
        recovery: Option<&'s mut dyn Write>,
    ) -> CodecResult<()> {
        let mut writer = self.writer(out, recovery)?;
        writer.write_entry(value)
    }

    /// Обратная сторона [`Codec::serialize`].
    pub fn deserialize<'s, T: EntryType>(
        &self,
        src: &'s mut dyn ReadSeek,
        recovery: Option<&'s mut dyn Read>,
    ) -> CodecResult<Option<T>> {
        let mut reader = self.reader(src, recovery)?;
        reader.read_entry::<T>()
    }
}

/// Сборка [`Codec`]. Ошибки регистрации копятся и отдаются из
/// [`CodecBuilder::build`], чтобы цепочку вызовов не рвать.
pub struct CodecBuilder {
    modules: ModuleRegistry,
    entries: EntryRegistry,
    error: Option<CodecError>,
}

impl CodecBuilder {
    /// Объявляет загруженный модуль контента.
    pub fn module(mut self, namespace: impl Into<String>, version: impl Into<Version>) -> Self {
        self.modules.load(namespace, version.into());
        self
    }

    /// Регистрирует entry-тип для полиморфного чтения.
    pub fn entry<T: EntryType>(mut self) -> Self {
        if self.error.is_none() {
            if let Err(err) = self.entries.register::<T>() {
                self.error = Some(err);
            }
        }
        self
    }

    /// Завершает сборку, проверяя, что каждый зарегистрированный тип
    /// принадлежит известному пространству имён.
    pub fn build(self) -> CodecResult<Codec> {
        if let Some(err) = self.error {
            return Err(err);
        }
        for vtable in self.entries.iter() {
            if self.modules.loaded_version(vtable.namespace).is_none() {
                return Err(CodecError::UnknownModule {
                    namespace: vtable.namespace.to_owned(),
                });
            }
        }
        debug!(
            host = self.modules.host_namespace(),
            modules = self.modules.len(),
            entries = self.entries.len(),
            "codec context built"
        );
        Ok(Codec {
            modules: self.modules,
            entries: self.entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Mapper;
    use crate::testkit::ver;

    #[derive(Default)]
    struct Widget {
        size: u32,
    }

    impl EntryType for Widget {
        const NAMESPACE: &'static str = "mods.ui";
        const NAME: &'static str = "Widget";

        fn map(&mut self, m: &mut Mapper<'_, '_, '_>) -> CodecResult<()> {
            m.field(&mut self.size)
        }
    }

    #[test]
    fn test_duplicate_entry_is_a_build_error() {
        let result = Codec::builder("app", ver(1))
            .module("mods.ui", ver(1))
            .entry::<Widget>()
            .entry::<Widget>()
            .build();
        assert!(matches!(result, Err(CodecError::DuplicateEntry { .. })));
    }

    #[test]
    fn test_entry_namespace_must_be_known() {
        let result = Codec::builder("app", ver(1)).entry::<Widget>().build();
        assert!(matches!(result, Err(CodecError::UnknownModule { .. })));
    }

    #[test]
    fn test_registration_is_visible() {
        let codec = Codec::builder("app", ver(1))
            .module("mods.ui", ver(1))
            .entry::<Widget>()
            .build()
            .unwrap();
        assert!(codec.is_registered::<Widget>());
    }
}
