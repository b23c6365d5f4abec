//! Четырёхкомпонентная версия модуля или приложения.

use std::fmt;
use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::CodecResult;

/// Версия вида `major.minor.patch.build`.
///
/// Сравнивается лексикографически по четырём компонентам; именно этот порядок
/// решает, совпала ли версия записи с загруженной версией модуля.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: i32,
    pub minor: i32,
    pub patch: i32,
    pub build: i32,
}

impl Version {
    pub const fn new(major: i32, minor: i32, patch: i32, build: i32) -> Self {
        Self {
            major,
            minor,
            patch,
            build,
        }
    }

    /// Записывает четыре компонента фиксированной ширины (LE).
    pub(crate) fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> CodecResult<()> {
        w.write_i32::<LittleEndian>(self.major)?;
        w.write_i32::<LittleEndian>(self.minor)?;
        w.write_i32::<LittleEndian>(self.patch)?;
        w.write_i32::<LittleEndian>(self.build)?;
        Ok(())
    }

    /// Читает четыре компонента; короткое чтение фатально.
    pub(crate) fn read_from<R: Read + ?Sized>(r: &mut R) -> CodecResult<Self> {
        Ok(Self {
            major: r.read_i32::<LittleEndian>()?,
            minor: r.read_i32::<LittleEndian>()?,
            patch: r.read_i32::<LittleEndian>()?,
            build: r.read_i32::<LittleEndian>()?,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.patch, self.build
        )
    }
}

impl From<(i32, i32, i32, i32)> for Version {
    fn from((major, minor, patch, build): (i32, i32, i32, i32)) -> Self {
        Self::new(major, minor, patch, build)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_version_ordering_is_lexicographic() {
        assert!(Version::new(1, 2, 0, 0) < Version::new(1, 10, 0, 0));
        assert!(Version::new(2, 0, 0, 0) > Version::new(1, 99, 99, 99));
        assert!(Version::new(1, 0, 0, 5) > Version::new(1, 0, 0, 4));
    }

    #[test]
    fn test_version_roundtrip() {
        let v = Version::new(3, 14, 15, 92);
        let mut buf = Vec::new();
        v.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), 16);

        let mut cur = Cursor::new(buf);
        assert_eq!(Version::read_from(&mut cur).unwrap(), v);
    }

    #[test]
    fn test_version_display() {
        assert_eq!(Version::new(1, 2, 3, 4).to_string(), "1.2.3.4");
    }
}
