//! Значения и единый рекурсивный алгоритм их кодирования.
//!
//! Трейт [`Pack`] — это и есть диспетчер: для каждой пары «значение/тип»
//! выбор между закрытым конвертером, формой контейнера и массивом происходит
//! на этапе компиляции через выбор реализации. Рекурсия по графу — обычная
//! рекурсия по стеку вызовов, глубиной в глубину графа. Entry-слоты ходят
//! через [`crate::entry`], а не через `Pack`: у них своя машина состояний.
//!
//! ## Модули
//!
//! - [`plain`] — закрытые типы: числа, строки, UUID, дата/время
//! - [`f16`] — половинная точность (binary16) как обёртка над битами
//! - [`image`] — доменный растровый формат [`Pixmap`]
//! - [`containers`] — открытые формы контейнеров и кортежи
//! - [`arrays`] — массивы рангов 2, 3 и N

pub mod arrays;
pub mod containers;
pub mod f16;
pub mod image;
pub mod plain;

pub use arrays::{Array2, Array3, ArrayN};
pub use f16::F16;
pub use image::Pixmap;

use crate::error::CodecResult;
use crate::stream::{StreamReader, StreamWriter};

/// Симметричная пара кодирования для одного типа значения.
///
/// Для каждого закрытого типа `T` и значения `v` выполняется
/// `unpack(pack(v)) == v` — бит-в-бит для чисел, по значению для строк,
/// UUID и дат.
pub trait Pack: Sized {
    /// Пишет значение в поток. Короткая запись фатальна и не повторяется.
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()>;

    /// Читает значение из потока, полностью перестраивая его в памяти.
    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self>;
}
