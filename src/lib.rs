//! modbin — версионированный бинарный кодек графа объектов.
//!
//! Поток открывается таблицей версий модулей, за ней идут записи: плоские
//! значения, контейнеры, многомерные массивы и entry — значения со стабильной
//! идентичностью, способные пережить смену версии и отсутствие модуля-владельца.
//! Формат little-endian, без выравнивания; весь контекст операции собран в
//! явном [`Codec`], глобального состояния нет.
//!
//! ```no_run
//! use modbin::{Codec, Version};
//!
//! let codec = Codec::builder("app", Version::new(1, 0, 0, 0))
//!     .module("mods.terrain", Version::new(2, 1, 0, 0))
//!     .build()?;
//! # Ok::<(), modbin::CodecError>(())
//! ```

pub mod codec;
pub mod entry;
pub mod error;
pub mod header;
pub mod registry;
pub mod stream;
pub mod value;

pub use codec::{Codec, CodecBuilder};
pub use entry::{Entry, EntryType, Identifier, Mapper, Patcher, TypeRef};
pub use error::{CodecError, CodecResult};
pub use header::{Version, HOST_MODULE_INDEX};
pub use registry::{LoadedModule, ModuleRegistry};
pub use stream::{EntryRange, ReadSeek, StreamReader, StreamWriter};
pub use value::{Array2, Array3, ArrayN, Pack, Pixmap, F16};

/// Общие помощники для модульных тестов: кодек без модулей контента и
/// короткие обёртки записи/чтения.
#[cfg(test)]
pub(crate) mod testkit {
    use std::io::Cursor;

    use crate::{Codec, CodecResult, Pack, StreamWriter, Version};

    pub fn ver(major: i32) -> Version {
        Version::new(major, 0, 0, 0)
    }

    pub fn test_codec() -> Codec {
        Codec::builder("testapp", ver(1)).build().unwrap()
    }

    /// Пишет поток целиком (заголовок плюс то, что сделает `f`).
    pub fn write_codec(
        f: impl FnOnce(&mut StreamWriter<'_, '_>) -> CodecResult<()>,
    ) -> (Vec<u8>, CodecResult<()>) {
        let codec = test_codec();
        let mut out = Vec::new();
        let result = codec.writer(&mut out, None).and_then(|mut w| f(&mut w));
        (out, result)
    }

    /// Читает одно значение из байтов полезной нагрузки; заголовок
    /// дописывается автоматически.
    pub fn unpack_from<T: Pack>(payload: &[u8]) -> CodecResult<T> {
        let codec = test_codec();
        let mut bytes = Vec::new();
        codec.writer(&mut bytes, None)?;
        bytes.extend_from_slice(payload);
        let mut cursor = Cursor::new(bytes);
        let mut reader = codec.reader(&mut cursor, None)?;
        reader.read_value::<T>()
    }

    pub fn roundtrip<T: Pack>(value: &T) -> T {
        let codec = test_codec();
        let mut bytes = Vec::new();
        {
            let mut writer = codec.writer(&mut bytes, None).unwrap();
            writer.write_value(value).unwrap();
        }
        let mut cursor = Cursor::new(bytes);
        let mut reader = codec.reader(&mut cursor, None).unwrap();
        reader.read_value().unwrap()
    }
}
