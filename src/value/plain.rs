//! Закрытые типы: фиксированный список конвертеров.
//!
//! Числа пишутся фиксированной шириной (LE), строки — длина i32 плюс UTF-8.
//! Список закрыт сознательно: всё остальное — контейнеры, массивы или entry.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc};
use uuid::Uuid;

use super::Pack;
use crate::error::{CodecError, CodecResult};
use crate::stream::{StreamReader, StreamWriter};

/// Предел длины строки; длиннее — повреждение формата, а не строка.
pub(crate) const MAX_STR_LEN: i32 = 16 * 1024 * 1024;

/// Пишет строку: длина i32, затем байты UTF-8. Длина 0 — байтов нет.
pub(crate) fn write_str<W: Write + ?Sized>(w: &mut W, s: &str) -> CodecResult<()> {
    let bytes = s.as_bytes();
    if bytes.len() > MAX_STR_LEN as usize {
        return Err(CodecError::corrupted(format!(
            "string of {} bytes exceeds the {MAX_STR_LEN} byte limit",
            bytes.len()
        )));
    }
    w.write_i32::<LittleEndian>(bytes.len() as i32)?;
    w.write_all(bytes)?;
    Ok(())
}

/// Читает строку; отрицательная длина и не-UTF-8 фатальны.
pub(crate) fn read_str<R: Read + ?Sized>(r: &mut R) -> CodecResult<String> {
    let len = r.read_i32::<LittleEndian>()?;
    if !(0..=MAX_STR_LEN).contains(&len) {
        return Err(CodecError::corrupted(format!(
            "implausible string length {len}"
        )));
    }
    let mut buf = vec![0u8; len as usize];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| CodecError::corrupted(format!("string is not valid UTF-8: {e}")))
}

macro_rules! plain_int {
    ($($ty:ty => $write:ident / $read:ident),+ $(,)?) => {
        $(
            impl Pack for $ty {
                fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
                    w.$write::<LittleEndian>(*self)?;
                    Ok(())
                }

                fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
                    Ok(r.$read::<LittleEndian>()?)
                }
            }
        )+
    };
}

plain_int! {
    u16 => write_u16 / read_u16,
    i16 => write_i16 / read_i16,
    u32 => write_u32 / read_u32,
    i32 => write_i32 / read_i32,
    u64 => write_u64 / read_u64,
    i64 => write_i64 / read_i64,
    f32 => write_f32 / read_f32,
    f64 => write_f64 / read_f64,
}

// Однобайтовые: у byteorder нет параметра порядка байт.
impl Pack for u8 {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        w.write_u8(*self)?;
        Ok(())
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        Ok(r.read_u8()?)
    }
}

impl Pack for i8 {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        w.write_i8(*self)?;
        Ok(())
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        Ok(r.read_i8()?)
    }
}

impl Pack for bool {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        w.write_u8(u8::from(*self))?;
        Ok(())
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        match r.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::corrupted(format!(
                "invalid boolean byte 0x{other:02x}"
            ))),
        }
    }
}

// Символ кодируется скалярным значением Unicode.
impl Pack for char {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        w.write_u32::<LittleEndian>(*self as u32)?;
        Ok(())
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        let scalar = r.read_u32::<LittleEndian>()?;
        char::from_u32(scalar).ok_or_else(|| {
            CodecError::corrupted(format!("0x{scalar:08x} is not a Unicode scalar value"))
        })
    }
}

impl Pack for String {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        write_str(w, self)
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        read_str(r)
    }
}

impl Pack for Uuid {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        w.write_all(self.as_bytes())?;
        Ok(())
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        let mut buf = [0u8; 16];
        r.read_exact(&mut buf)?;
        Ok(Uuid::from_bytes(buf))
    }
}

// Момент времени: секунды Unix + наносекунды внутри секунды.
impl Pack for DateTime<Utc> {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        w.write_i64::<LittleEndian>(self.timestamp())?;
        w.write_u32::<LittleEndian>(self.timestamp_subsec_nanos())?;
        Ok(())
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        let secs = r.read_i64::<LittleEndian>()?;
        let nanos = r.read_u32::<LittleEndian>()?;
        DateTime::<Utc>::from_timestamp(secs, nanos).ok_or_else(|| {
            CodecError::corrupted(format!("timestamp {secs}s/{nanos}ns out of range"))
        })
    }
}

impl Pack for NaiveDate {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        w.write_i32::<LittleEndian>(self.num_days_from_ce())?;
        Ok(())
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        let days = r.read_i32::<LittleEndian>()?;
        NaiveDate::from_num_days_from_ce_opt(days)
            .ok_or_else(|| CodecError::corrupted(format!("day number {days} out of range")))
    }
}

// Длительность: целые секунды (усечение к нулю) + дробные наносекунды
// со знаком. Сумма восстанавливает исходное значение точно.
impl Pack for TimeDelta {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        w.write_i64::<LittleEndian>(self.num_seconds())?;
        w.write_i32::<LittleEndian>(self.subsec_nanos())?;
        Ok(())
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        let secs = r.read_i64::<LittleEndian>()?;
        let nanos = r.read_i32::<LittleEndian>()?;
        let whole = TimeDelta::try_seconds(secs)
            .ok_or_else(|| CodecError::corrupted(format!("duration {secs}s out of range")))?;
        whole
            .checked_add(&TimeDelta::nanoseconds(nanos as i64))
            .ok_or_else(|| CodecError::corrupted("duration overflow".to_string()))
    }
}
