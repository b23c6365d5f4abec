//! Таблица регистраций entry-типов.
//!
//! Вместо рефлексивного поиска конструкторов на лету каждый entry-тип
//! регистрируется один раз при сборке [`crate::Codec`]; здесь лежит плоская
//! таблица указателей на функции построения: по мапперу и по патчеру.
//! Операции «заполнить существующий экземпляр» не нуждаются в таблице —
//! они живут прямо на объектно-безопасном трейте [`Entry`]. После сборки
//! таблица неизменяема и читается без блокировок.

use std::any::TypeId;
use std::collections::HashMap;

use crate::entry::{Entry, EntryType, Mapper, Patcher};
use crate::error::{CodecError, CodecResult};
use crate::stream::StreamReader;

/// Связанные операции построения конкретного entry-типа.
pub(crate) struct EntryVtable {
    pub namespace: &'static str,
    pub name: &'static str,
    pub type_id: TypeId,
    /// Построить экземпляр маппером (версии совпали).
    pub build: fn(&mut StreamReader<'_, '_>) -> CodecResult<Box<dyn Entry>>,
    /// Построить экземпляр патчером (версии разошлись).
    pub build_patched: fn(&mut Patcher<'_, '_, '_>) -> CodecResult<Box<dyn Entry>>,
}

impl EntryVtable {
    fn of<T: EntryType>() -> Self {
        Self {
            namespace: T::NAMESPACE,
            name: T::NAME,
            type_id: TypeId::of::<T>(),
            build: build_entry::<T>,
            build_patched: build_patched_entry::<T>,
        }
    }
}

fn build_entry<T: EntryType>(r: &mut StreamReader<'_, '_>) -> CodecResult<Box<dyn Entry>> {
    let mut value = T::default();
    let mut mapper = Mapper::unpacking(r);
    value.map(&mut mapper)?;
    Ok(Box::new(value))
}

fn build_patched_entry<T: EntryType>(p: &mut Patcher<'_, '_, '_>) -> CodecResult<Box<dyn Entry>> {
    let mut value = T::default();
    value.patch(p)?;
    Ok(Box::new(value))
}

/// Таблица vtable-ов, ключованная идентификатором и `TypeId`.
#[derive(Default)]
pub(crate) struct EntryRegistry {
    vtables: Vec<EntryVtable>,
    by_identifier: HashMap<(String, String), usize>,
    by_type: HashMap<TypeId, usize>,
}

impl EntryRegistry {
    /// Регистрирует тип; двойная регистрация одного идентификатора — ошибка
    /// настройки, а не молчаливая перезапись.
    pub fn register<T: EntryType>(&mut self) -> CodecResult<()> {
        let vtable = EntryVtable::of::<T>();
        let key = (vtable.namespace.to_owned(), vtable.name.to_owned());
        if self.by_identifier.contains_key(&key) || self.by_type.contains_key(&vtable.type_id) {
            return Err(CodecError::DuplicateEntry {
                namespace: key.0,
                name: key.1,
            });
        }
        self.by_identifier.insert(key, self.vtables.len());
        self.by_type.insert(vtable.type_id, self.vtables.len());
        self.vtables.push(vtable);
        Ok(())
    }

    pub fn lookup(&self, namespace: &str, name: &str) -> Option<&EntryVtable> {
        // Ключ составной, поэтому поиск собирает пару; путь холодный —
        // по одному разу на полиморфный слот.
        self.by_identifier
            .get(&(namespace.to_owned(), name.to_owned()))
            .map(|&i| &self.vtables[i])
    }

    pub fn contains_type(&self, type_id: TypeId) -> bool {
        self.by_type.contains_key(&type_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntryVtable> {
        self.vtables.iter()
    }

    pub fn len(&self) -> usize {
        self.vtables.len()
    }
}
