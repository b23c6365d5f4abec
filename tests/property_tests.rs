use std::io::Cursor;

use modbin::{Array2, Codec, Pack, Version, F16};
use proptest::prelude::*;

fn roundtrip<T: Pack>(value: &T) -> T {
    let codec = Codec::builder("app", Version::new(1, 0, 0, 0)).build().unwrap();
    let mut bytes = Vec::new();
    {
        let mut writer = codec.writer(&mut bytes, None).unwrap();
        writer.write_value(value).unwrap();
    }
    let mut cursor = Cursor::new(bytes);
    let mut reader = codec.reader(&mut cursor, None).unwrap();
    reader.read_value().unwrap()
}

fn matrix() -> impl Strategy<Value = Array2<i32>> {
    (0..6usize, 0..6usize).prop_flat_map(|(rows, cols)| {
        proptest::collection::vec(any::<i32>(), rows * cols)
            .prop_map(move |data| Array2::new(rows, cols, data).unwrap())
    })
}

proptest! {
    #[test]
    fn prop_byte_vectors_roundtrip(v in proptest::collection::vec(any::<u8>(), 0..512)) {
        prop_assert_eq!(roundtrip(&v), v);
    }

    #[test]
    fn prop_strings_roundtrip(s in any::<String>()) {
        prop_assert_eq!(roundtrip(&s), s);
    }

    #[test]
    fn prop_floats_roundtrip_bit_exact(bits in any::<u64>()) {
        let v = f64::from_bits(bits);
        prop_assert_eq!(roundtrip(&v).to_bits(), bits);
    }

    #[test]
    fn prop_half_floats_roundtrip_bit_exact(bits in any::<u16>()) {
        let h = F16::from_bits(bits);
        prop_assert_eq!(roundtrip(&h).to_bits(), bits);
    }

    #[test]
    fn prop_maps_roundtrip(m in proptest::collection::hash_map(any::<String>(), any::<i64>(), 0..32)) {
        prop_assert_eq!(roundtrip(&m), m);
    }

    #[test]
    fn prop_matrices_roundtrip(arr in matrix()) {
        prop_assert_eq!(roundtrip(&arr), arr);
    }

    #[test]
    fn prop_nested_options_roundtrip(v in any::<Option<Option<i32>>>()) {
        prop_assert_eq!(roundtrip(&v), v);
    }
}
