//! Entry: значения со стабильной идентичностью (модуль, имя).
//!
//! Entry — точка расширения кодека: модули контента объявляют свои типы,
//! реализуют [`EntryType`] и регистрируются в [`crate::Codec`]. На проводе
//! entry — это флаг null, идентификатор и полезная нагрузка полей, чей
//! формат для версии V зафиксирован тем, что модуль объявил именно для V.

pub mod mapper;
mod wire;

use std::any::Any;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

pub use mapper::{Mapper, Patcher};
pub(crate) use wire::{populate_entry, read_entry, read_entry_dyn, write_entry};

use crate::error::CodecResult;
use crate::stream::{StreamReader, StreamWriter};
use crate::value::plain::{read_str, write_str};
use crate::value::Pack;

/// Идентификатор entry: пространство имён владеющего модуля плюс локальное
/// имя. На проводе пространство имён сворачивается в индекс таблицы версий.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Identifier {
    pub namespace: String,
    pub name: String,
}

impl Identifier {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.namespace, self.name)
    }
}

impl Pack for Identifier {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        let index = w.module_index(&self.namespace)?;
        w.write_i32::<LittleEndian>(index)?;
        write_str(w, &self.name)
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        let index = r.read_i32::<LittleEndian>()?;
        let (namespace, _version) = r.resolve_module_index(index)?;
        let name = read_str(r)?;
        Ok(Self { namespace, name })
    }
}

/// Непрозрачная ссылка на тип, квалифицированная модулем.
///
/// Кодек не интерпретирует её сам — это значение для чужих таблиц типов;
/// на проводе устроена так же, как [`Identifier`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TypeRef {
    pub namespace: String,
    pub name: String,
}

impl TypeRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl Pack for TypeRef {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        let index = w.module_index(&self.namespace)?;
        w.write_i32::<LittleEndian>(index)?;
        write_str(w, &self.name)
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        let index = r.read_i32::<LittleEndian>()?;
        let (namespace, _version) = r.resolve_module_index(index)?;
        let name = read_str(r)?;
        Ok(Self { namespace, name })
    }
}

/// Контракт конкретного entry-типа.
///
/// Вместо рефлексивного поиска конструкторов контракт проверяется
/// компилятором: `Default` даёт «построить», [`EntryType::map`] — один
/// список полей на обе стороны, [`EntryType::patch`] — переход между
/// версиями. По умолчанию patch честно сообщает о несовпадении версий,
/// а не подсовывает значение по умолчанию.
pub trait EntryType: Default + Sized + 'static {
    /// Пространство имён владеющего модуля (хостовое — тоже годится).
    const NAMESPACE: &'static str;

    /// Локальное имя типа внутри модуля.
    const NAME: &'static str;

    /// Проходит по объявленным полям; маппер сам знает направление.
    fn map(&mut self, m: &mut Mapper<'_, '_, '_>) -> CodecResult<()>;

    /// Переход с версии записи на загруженную версию.
    fn patch(&mut self, p: &mut Patcher<'_, '_, '_>) -> CodecResult<()> {
        Err(crate::error::CodecError::VersionMismatch {
            namespace: Self::NAMESPACE.to_owned(),
            name: Self::NAME.to_owned(),
            written: p.written_version(),
            loaded: p.loaded_version(),
        })
    }
}

/// Объектно-безопасная сторона entry — для полиморфных слотов и реестра.
///
/// Реализуется автоматически для любого [`EntryType`]; руками её писать
/// не нужно.
pub trait Entry: Any {
    /// Стабильный идентификатор (модуль, имя); он же — дискриминатор
    /// конкретного типа в полиморфных слотах.
    fn identifier(&self) -> Identifier;

    fn map_fields(&mut self, m: &mut Mapper<'_, '_, '_>) -> CodecResult<()>;

    fn patch_fields(&mut self, p: &mut Patcher<'_, '_, '_>) -> CodecResult<()>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: EntryType> Entry for T {
    fn identifier(&self) -> Identifier {
        Identifier::new(T::NAMESPACE, T::NAME)
    }

    fn map_fields(&mut self, m: &mut Mapper<'_, '_, '_>) -> CodecResult<()> {
        self.map(m)
    }

    fn patch_fields(&mut self, p: &mut Patcher<'_, '_, '_>) -> CodecResult<()> {
        self.patch(p)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
