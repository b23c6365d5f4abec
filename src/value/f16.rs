//! Половинная точность (IEEE 754 binary16).
//!
//! Значение хранится как сырые 16 бит, поэтому на проводе и обратно оно
//! проходит бит-в-бит; преобразования в/из `f32` — явные и с округлением
//! к ближайшему чётному.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::Pack;
use crate::error::CodecResult;
use crate::stream::{StreamReader, StreamWriter};

/// 16-битное число с плавающей точкой, обёртка над битовым представлением.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct F16(u16);

impl F16 {
    pub const ZERO: F16 = F16(0);
    pub const INFINITY: F16 = F16(0x7c00);
    pub const NEG_INFINITY: F16 = F16(0xfc00);

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn to_bits(self) -> u16 {
        self.0
    }

    /// Сжатие из `f32` с округлением к ближайшему чётному; переполнение
    /// уходит в бесконечность, глубокая денормализация — в ноль.
    pub fn from_f32(value: f32) -> Self {
        let bits = value.to_bits();
        let sign = ((bits >> 16) & 0x8000) as u16;
        let exp = ((bits >> 23) & 0xff) as i32;
        let mant = bits & 0x007f_ffff;

        if exp == 0xff {
            // Бесконечность или NaN; полезную часть NaN сохраняем усечённой.
            let payload = if mant != 0 {
                0x0200 | ((mant >> 13) as u16 & 0x03ff)
            } else {
                0
            };
            return Self(sign | 0x7c00 | payload);
        }

        let unbiased = exp - 127;
        if unbiased > 15 {
            return Self(sign | 0x7c00);
        }

        if unbiased >= -14 {
            // Нормальное число.
            let mut e = (unbiased + 15) as u16;
            let mut m = (mant >> 13) as u16;
            let round = mant & 0x1fff;
            if round > 0x1000 || (round == 0x1000 && m & 1 == 1) {
                m += 1;
                if m == 0x400 {
                    m = 0;
                    e += 1;
                    if e >= 31 {
                        return Self(sign | 0x7c00);
                    }
                }
            }
            return Self(sign | (e << 10) | m);
        }

        if unbiased >= -24 {
            // Денормализованное число.
            let shift = (13 - 14 - unbiased) as u32; // 14..=23
            let full = mant | 0x0080_0000;
            let mut m = (full >> shift) as u16;
            let rem = full & ((1u32 << shift) - 1);
            let half = 1u32 << (shift - 1);
            if rem > half || (rem == half && m & 1 == 1) {
                // Перенос из 0x3ff в 0x400 корректно даёт наименьшее
                // нормальное число.
                m += 1;
            }
            return Self(sign | m);
        }

        Self(sign)
    }

    /// Расширение до `f32`; точное для любого значения binary16.
    pub fn to_f32(self) -> f32 {
        let sign = if self.0 & 0x8000 != 0 { -1.0f32 } else { 1.0 };
        let exp = ((self.0 >> 10) & 0x1f) as i32;
        let mant = (self.0 & 0x3ff) as f32;
        match exp {
            0 => sign * mant * (-24f32).exp2(),
            31 => {
                if self.0 & 0x3ff == 0 {
                    sign * f32::INFINITY
                } else {
                    f32::NAN
                }
            }
            _ => sign * (1.0 + mant / 1024.0) * ((exp - 15) as f32).exp2(),
        }
    }

    pub fn is_nan(self) -> bool {
        self.0 & 0x7c00 == 0x7c00 && self.0 & 0x3ff != 0
    }
}

impl From<f32> for F16 {
    fn from(value: f32) -> Self {
        Self::from_f32(value)
    }
}

impl From<F16> for f32 {
    fn from(value: F16) -> Self {
        value.to_f32()
    }
}

impl Pack for F16 {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        w.write_u16::<LittleEndian>(self.0)?;
        Ok(())
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        Ok(Self(r.read_u16::<LittleEndian>()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::roundtrip;

    #[test]
    fn test_known_constants() {
        assert_eq!(F16::from_f32(0.0).to_bits(), 0x0000);
        assert_eq!(F16::from_f32(-0.0).to_bits(), 0x8000);
        assert_eq!(F16::from_f32(1.0).to_bits(), 0x3c00);
        assert_eq!(F16::from_f32(-2.0).to_bits(), 0xc000);
        assert_eq!(F16::from_f32(65504.0).to_bits(), 0x7bff); // максимум
        assert_eq!(F16::from_f32(1e6).to_bits(), 0x7c00); // переполнение
    }

    #[test]
    fn test_f32_conversion_is_exact_for_halves() {
        for bits in [0x0001u16, 0x03ff, 0x0400, 0x3555, 0x7bff, 0x8400] {
            let h = F16::from_bits(bits);
            assert_eq!(F16::from_f32(h.to_f32()).to_bits(), bits);
        }
    }

    #[test]
    fn test_nan_survives() {
        let h = F16::from_f32(f32::NAN);
        assert!(h.is_nan());
        assert!(h.to_f32().is_nan());
    }

    #[test]
    fn test_wire_roundtrip_is_bit_exact() {
        let h = F16::from_bits(0x1234);
        assert_eq!(roundtrip(&h).to_bits(), 0x1234);
    }
}
