//! Доменный растровый формат.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::Pack;
use crate::error::{CodecError, CodecResult};
use crate::stream::{StreamReader, StreamWriter};

/// Предел стороны изображения; больше — повреждение формата.
const MAX_DIMENSION: i32 = 32_768;

/// Прямоугольник пикселей RGBA8, построчно.
///
/// Единственный формат изображения, который кодек понимает сам; всё
/// остальное — забота внешних конвертеров до/после сериализации.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pixmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Pixmap {
    /// Создаёт картинку; стороны не больше [`MAX_DIMENSION`], длина буфера
    /// обязана равняться `width * height * 4`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> CodecResult<Self> {
        if width > MAX_DIMENSION as u32 || height > MAX_DIMENSION as u32 {
            return Err(CodecError::corrupted(format!(
                "implausible pixmap dimensions {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(CodecError::corrupted(format!(
                "pixmap buffer is {} bytes, {width}x{height} RGBA needs {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Pack for Pixmap {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        w.write_i32::<LittleEndian>(self.width as i32)?;
        w.write_i32::<LittleEndian>(self.height as i32)?;
        w.write_i32::<LittleEndian>(self.data.len() as i32)?;
        w.write_all(&self.data)?;
        Ok(())
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        let width = r.read_i32::<LittleEndian>()?;
        let height = r.read_i32::<LittleEndian>()?;
        if !(0..=MAX_DIMENSION).contains(&width) || !(0..=MAX_DIMENSION).contains(&height) {
            return Err(CodecError::corrupted(format!(
                "implausible pixmap dimensions {width}x{height}"
            )));
        }
        let len = r.read_i32::<LittleEndian>()?;
        let expected = width as i64 * height as i64 * 4;
        if len as i64 != expected {
            return Err(CodecError::corrupted(format!(
                "pixmap payload of {len} bytes does not match {width}x{height} RGBA"
            )));
        }
        let mut data = vec![0u8; len as usize];
        r.read_exact(&mut data)?;
        Ok(Self {
            width: width as u32,
            height: height as u32,
            data,
        })
    }
}
