//! Машина состояний entry на проводе.
//!
//! Запись: флаг null → идентификатор → поля → (диапазон в recovery-индекс).
//! Чтение: флаг null → идентификатор → сравнение версий → прямой маппинг,
//! patch-переход или пропуск по recovery-индексу. Пропуск локален: одна
//! отсутствующая запись не трогает байты соседних.

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::debug;

use super::{Entry, EntryType, Identifier, Mapper, Patcher};
use crate::error::{CodecError, CodecResult};
use crate::header::Version;
use crate::stream::{EntryRange, StreamReader, StreamWriter};
use crate::value::plain::read_str;
use crate::value::Pack;

/// Пишет entry-слот; `None` — нулевой слот, один байт.
pub(crate) fn write_entry(
    w: &mut StreamWriter<'_, '_>,
    value: Option<&mut dyn Entry>,
) -> CodecResult<()> {
    let Some(value) = value else {
        return false.pack(w);
    };
    true.pack(w)?;

    let ident = value.identifier();
    ident.pack(w)?;

    let start = w.position();
    let top_level = w.enter_entry();
    let mapped = {
        let mut mapper = Mapper::packing(w);
        value.map_fields(&mut mapper)
    };
    w.leave_entry();
    mapped?;

    let end = w.position();
    if top_level {
        w.record_entry_range(EntryRange { start, end })?;
    }
    Ok(())
}

/// Итог разбора заголовка entry.
enum EntryHeader {
    Null,
    Present {
        ident: Identifier,
        written: Version,
        loaded: Option<Version>,
    },
}

/// Читает флаг null и идентификатор, разрешая версии через таблицу потока
/// и реестр модулей читателя.
fn read_entry_header(r: &mut StreamReader<'_, '_>) -> CodecResult<EntryHeader> {
    // Строгий not-null guard: любой байт кроме 0 и 1 — повреждение.
    if !bool::unpack(r)? {
        return Ok(EntryHeader::Null);
    }
    let index = r.read_i32::<LittleEndian>()?;
    let (namespace, written) = r.resolve_module_index(index)?;
    let name = read_str(r)?;
    let loaded = r.codec().modules().loaded_version(&namespace);
    Ok(EntryHeader::Present {
        ident: Identifier { namespace, name },
        written,
        loaded,
    })
}

/// Читает entry известного типа.
pub(crate) fn read_entry<T: EntryType>(r: &mut StreamReader<'_, '_>) -> CodecResult<Option<T>> {
    let EntryHeader::Present {
        ident,
        written,
        loaded,
    } = read_entry_header(r)?
    else {
        return Ok(None);
    };

    let Some(loaded) = loaded else {
        r.skip_current_entry(&ident)?;
        return Ok(None);
    };

    if ident.namespace != T::NAMESPACE || ident.name != T::NAME {
        return Err(CodecError::corrupted(format!(
            "expected entry `{}::{}`, stream has `{ident}`",
            T::NAMESPACE,
            T::NAME
        )));
    }

    let mut value = T::default();
    if loaded == written {
        let mut mapper = Mapper::unpacking(r);
        value.map(&mut mapper)?;
    } else {
        debug!(ident = %ident, %written, %loaded, "entry version drift, patch path");
        let mut patcher = Patcher::new(r, written, loaded);
        value.patch(&mut patcher)?;
    }
    Ok(Some(value))
}

/// Читает entry, разрешая конкретный тип по идентификатору из таблицы
/// регистраций.
pub(crate) fn read_entry_dyn(r: &mut StreamReader<'_, '_>) -> CodecResult<Option<Box<dyn Entry>>> {
    let EntryHeader::Present {
        ident,
        written,
        loaded,
    } = read_entry_header(r)?
    else {
        return Ok(None);
    };

    let Some(loaded) = loaded else {
        r.skip_current_entry(&ident)?;
        return Ok(None);
    };

    let vtable = r
        .codec()
        .entries()
        .lookup(&ident.namespace, &ident.name)
        .ok_or_else(|| CodecError::UnknownEntryType {
            namespace: ident.namespace.clone(),
            name: ident.name.clone(),
        })?;

    let boxed = if loaded == written {
        (vtable.build)(r)?
    } else {
        debug!(ident = %ident, %written, %loaded, "entry version drift, patch path");
        let mut patcher = Patcher::new(r, written, loaded);
        (vtable.build_patched)(&mut patcher)?
    };
    Ok(Some(boxed))
}

/// Заполняет готовый экземпляр. `Ok(false)` — нулевой слот или пропуск.
pub(crate) fn populate_entry(
    r: &mut StreamReader<'_, '_>,
    target: &mut dyn Entry,
) -> CodecResult<bool> {
    let EntryHeader::Present {
        ident,
        written,
        loaded,
    } = read_entry_header(r)?
    else {
        return Ok(false);
    };

    let Some(loaded) = loaded else {
        r.skip_current_entry(&ident)?;
        return Ok(false);
    };

    let expected = target.identifier();
    if ident != expected {
        return Err(CodecError::corrupted(format!(
            "populate target is `{expected}`, stream has `{ident}`"
        )));
    }

    if loaded == written {
        let mut mapper = Mapper::unpacking(r);
        target.map_fields(&mut mapper)?;
    } else {
        debug!(ident = %ident, %written, %loaded, "entry version drift, patch path");
        let mut patcher = Patcher::new(r, written, loaded);
        target.patch_fields(&mut patcher)?;
    }
    Ok(true)
}
