//! Recovery-индекс: боковой список диапазонов верхнеуровневых записей.
//!
//! Формат — просто пары `(start: i64, end: i64)` в порядке записи, без
//! заголовка. Диапазон покрывает полезную нагрузку полей entry: от смещения
//! сразу после идентификатора до смещения за последним байтом полей.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{CodecError, CodecResult};

/// Диапазон байтов одной верхнеуровневой записи в основном потоке.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryRange {
    pub start: u64,
    pub end: u64,
}

/// Дописывает пару диапазона в боковой поток.
pub(crate) fn write_range<W: Write + ?Sized>(
    w: &mut W,
    range: EntryRange,
) -> CodecResult<()> {
    w.write_i64::<LittleEndian>(range.start as i64)?;
    w.write_i64::<LittleEndian>(range.end as i64)?;
    Ok(())
}

/// Читает весь боковой поток в список диапазонов.
pub(crate) fn parse_ranges<R: Read + ?Sized>(r: &mut R) -> CodecResult<Vec<EntryRange>> {
    let mut bytes = Vec::new();
    r.read_to_end(&mut bytes)?;
    if bytes.len() % 16 != 0 {
        return Err(CodecError::corrupted(format!(
            "recovery index of {} bytes is not a whole number of (start, end) pairs",
            bytes.len()
        )));
    }
    let mut cursor = bytes.as_slice();
    let mut ranges = Vec::with_capacity(bytes.len() / 16);
    while !cursor.is_empty() {
        let start = cursor.read_i64::<LittleEndian>()?;
        let end = cursor.read_i64::<LittleEndian>()?;
        if start < 0 || end < start {
            return Err(CodecError::corrupted(format!(
                "recovery range {start}..{end} is not a valid byte span"
            )));
        }
        ranges.push(EntryRange {
            start: start as u64,
            end: end as u64,
        });
    }
    Ok(ranges)
}

/// Лениво открываемый источник recovery-индекса на стороне чтения.
///
/// Отсутствующий источник превращает любой запрос на пропуск в фатальную
/// ошибку — пропускать некуда.
pub(crate) enum RecoveryIndex<'a> {
    Absent,
    Pending(&'a mut dyn Read),
    Loaded(Vec<EntryRange>),
}

impl RecoveryIndex<'_> {
    /// Диапазоны индекса; `None` — индекс не подключали.
    pub fn ranges(&mut self) -> CodecResult<Option<&[EntryRange]>> {
        if let RecoveryIndex::Pending(source) = self {
            let parsed = parse_ranges(&mut **source)?;
            *self = RecoveryIndex::Loaded(parsed);
        }
        match self {
            RecoveryIndex::Absent => Ok(None),
            RecoveryIndex::Loaded(ranges) => Ok(Some(ranges)),
            RecoveryIndex::Pending(_) => unreachable!("recovery index was just loaded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_roundtrip() {
        let mut buf = Vec::new();
        write_range(&mut buf, EntryRange { start: 10, end: 42 }).unwrap();
        write_range(&mut buf, EntryRange { start: 42, end: 99 }).unwrap();

        let ranges = parse_ranges(&mut buf.as_slice()).unwrap();
        assert_eq!(
            ranges,
            [
                EntryRange { start: 10, end: 42 },
                EntryRange { start: 42, end: 99 }
            ]
        );
    }

    #[test]
    fn test_truncated_index_is_fatal() {
        let bytes = [0u8; 20];
        assert!(matches!(
            parse_ranges(&mut &bytes[..]),
            Err(CodecError::FormatCorruption { .. })
        ));
    }

    #[test]
    fn test_inverted_range_is_fatal() {
        let mut buf = Vec::new();
        write_range(&mut buf, EntryRange { start: 50, end: 10 }).unwrap();
        // write_range не проверяет порядок, читатель — обязан
        assert!(matches!(
            parse_ranges(&mut buf.as_slice()),
            Err(CodecError::FormatCorruption { .. })
        ));
    }
}
