//! Mapper и Patcher — пообъектные посетители полей.
//!
//! Entry-тип объявляет свои поля один раз, в [`crate::entry::EntryType::map`];
//! направление (запись или чтение) знает сам маппер. Patcher — та же идея
//! для перехода между версиями: у него в руках обе версии и доступ к полям
//! потока.

use super::{wire, Entry, EntryType};
use crate::error::CodecResult;
use crate::header::Version;
use crate::stream::{StreamReader, StreamWriter};
use crate::value::Pack;

enum Mode<'c, 's, 'b> {
    Pack(&'b mut StreamWriter<'c, 's>),
    Unpack(&'b mut StreamReader<'c, 's>),
}

/// Посетитель полей для совпадающих версий.
pub struct Mapper<'c, 's, 'b> {
    mode: Mode<'c, 's, 'b>,
}

impl<'c, 's, 'b> Mapper<'c, 's, 'b> {
    pub(crate) fn packing(w: &'b mut StreamWriter<'c, 's>) -> Self {
        Self {
            mode: Mode::Pack(w),
        }
    }

    pub(crate) fn unpacking(r: &'b mut StreamReader<'c, 's>) -> Self {
        Self {
            mode: Mode::Unpack(r),
        }
    }

    /// `true`, если маппер сериализует; полезно для полей, которые при
    /// чтении надо доинициализировать.
    pub fn is_packing(&self) -> bool {
        matches!(self.mode, Mode::Pack(_))
    }

    /// Обычное поле: закрытый тип, контейнер или массив.
    pub fn field<T: Pack>(&mut self, value: &mut T) -> CodecResult<()> {
        match &mut self.mode {
            Mode::Pack(w) => value.pack(w),
            Mode::Unpack(r) => {
                *value = T::unpack(r)?;
                Ok(())
            }
        }
    }

    /// Вложенный entry-слот известного типа.
    pub fn entry<T: EntryType>(&mut self, slot: &mut Option<T>) -> CodecResult<()> {
        match &mut self.mode {
            Mode::Pack(w) => {
                wire::write_entry(w, slot.as_mut().map(|e| e as &mut dyn Entry))
            }
            Mode::Unpack(r) => {
                *slot = wire::read_entry::<T>(r)?;
                Ok(())
            }
        }
    }

    /// Полиморфный слот: объявленный тип неинстанцируем, конкретный известен
    /// только на рантайме. Дискриминатор — идентификатор entry; писатель и
    /// читатель используют один и тот же протокол.
    pub fn entry_dyn(&mut self, slot: &mut Option<Box<dyn Entry>>) -> CodecResult<()> {
        match &mut self.mode {
            Mode::Pack(w) => {
                wire::write_entry(w, slot.as_mut().map(|e| e.as_mut()))
            }
            Mode::Unpack(r) => {
                *slot = wire::read_entry_dyn(r)?;
                Ok(())
            }
        }
    }
}

/// Посетитель полей для расходящихся версий.
///
/// Отдаёт типу обе версии и «сырое» чтение полей; стратегию перехода тип
/// выбирает сам в [`EntryType::patch`].
pub struct Patcher<'c, 's, 'b> {
    reader: &'b mut StreamReader<'c, 's>,
    written: Version,
    loaded: Version,
}

impl<'c, 's, 'b> Patcher<'c, 's, 'b> {
    pub(crate) fn new(
        reader: &'b mut StreamReader<'c, 's>,
        written: Version,
        loaded: Version,
    ) -> Self {
        Self {
            reader,
            written,
            loaded,
        }
    }

    /// Версия модуля на момент записи потока.
    pub fn written_version(&self) -> Version {
        self.written
    }

    /// Версия модуля, загруженная сейчас.
    pub fn loaded_version(&self) -> Version {
        self.loaded
    }

    /// Маппер в режиме чтения поверх того же потока — для полей, чья
    /// раскладка между версиями не менялась.
    pub fn mapper(&mut self) -> Mapper<'c, 's, '_> {
        Mapper::unpacking(self.reader)
    }

    /// Читает одно поле раскладки версии записи.
    pub fn field<T: Pack>(&mut self, value: &mut T) -> CodecResult<()> {
        self.mapper().field(value)
    }
}
