use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Cursor;

use chrono::{NaiveDate, TimeDelta, TimeZone, Utc};
use modbin::{Array2, ArrayN, Codec, Pack, Pixmap, Version, F16};
use rstest::rstest;
use uuid::Uuid;

fn codec() -> Codec {
    Codec::builder("app", Version::new(1, 2, 3, 4)).build().unwrap()
}

fn roundtrip<T: Pack>(value: &T) -> T {
    let codec = codec();
    let mut bytes = Vec::new();
    {
        let mut writer = codec.writer(&mut bytes, None).unwrap();
        writer.write_value(value).unwrap();
    }
    let mut cursor = Cursor::new(bytes);
    let mut reader = codec.reader(&mut cursor, None).unwrap();
    reader.read_value().unwrap()
}

#[rstest]
#[case("")]
#[case("ascii only")]
#[case("смешанный текст with תווים и 🎮")]
fn test_string_roundtrip(#[case] s: &str) {
    assert_eq!(roundtrip(&s.to_owned()), s);
}

#[test]
fn test_deep_container_roundtrip() {
    let mut world: HashMap<String, Vec<(u8, Option<String>)>> = HashMap::new();
    world.insert(
        "alpha".to_owned(),
        vec![(1, None), (2, Some("two".to_owned()))],
    );
    world.insert("beta".to_owned(), Vec::new());
    assert_eq!(roundtrip(&world), world);

    let sorted: BTreeMap<i64, HashSet<u32>> =
        [(0, HashSet::from([9, 8])), (-5, HashSet::new())].into();
    assert_eq!(roundtrip(&sorted), sorted);
}

#[test]
fn test_half_precision_matrix_roundtrip() {
    let data: Vec<F16> = (0..6).map(|i| F16::from_f32(i as f32 * 0.5)).collect();
    let arr = Array2::new(2, 3, data).unwrap();
    assert_eq!(roundtrip(&arr), arr);
}

#[test]
fn test_rank4_tensor_roundtrip() {
    let dims = vec![2, 1, 3, 2];
    let data: Vec<i32> = (0..12).collect();
    let tensor = ArrayN::new(dims, data).unwrap();
    let back = roundtrip(&tensor);
    assert_eq!(back, tensor);
    assert_eq!(back.get(&[1, 0, 2, 1]), Some(&11));
}

#[test]
fn test_pixmap_roundtrip() {
    let img = Pixmap::new(3, 2, vec![0xab; 3 * 2 * 4]).unwrap();
    assert_eq!(roundtrip(&img), img);
}

#[test]
fn test_time_types_roundtrip() {
    let ts = Utc.with_ymd_and_hms(2031, 1, 9, 23, 59, 59).unwrap();
    assert_eq!(roundtrip(&ts), ts);

    let date = NaiveDate::from_ymd_opt(-44, 3, 15).unwrap();
    assert_eq!(roundtrip(&date), date);

    let delta = TimeDelta::days(400) + TimeDelta::nanoseconds(17);
    assert_eq!(roundtrip(&delta), delta);
}

#[test]
fn test_uuid_and_tuple_roundtrip() {
    let value = (Uuid::new_v4(), vec![true, false], 7i16);
    assert_eq!(roundtrip(&value), value);
}
