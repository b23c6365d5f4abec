//! Открытые формы контейнеров.
//!
//! Каждая форма — это обобщённая функция, специализируемая компилятором под
//! встреченные аргументы типов; на рантайм не остаётся ничего, кроме самого
//! содержимого. Все контейнеры пишутся как счётчик i32 плюс элементы и
//! полностью перестраиваются при чтении — потокового декодирования нет.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::hash::Hash;
use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::Pack;
use crate::error::{CodecError, CodecResult};
use crate::stream::{StreamReader, StreamWriter};

/// Пишет счётчик элементов.
pub(crate) fn write_count<W: Write>(w: &mut W, count: usize) -> CodecResult<()> {
    let count = i32::try_from(count)
        .map_err(|_| CodecError::corrupted(format!("collection of {count} items does not fit")))?;
    w.write_i32::<LittleEndian>(count)?;
    Ok(())
}

/// Читает счётчик; отрицательное значение — повреждение формата.
pub(crate) fn read_count<R: Read>(r: &mut R) -> CodecResult<usize> {
    let count = r.read_i32::<LittleEndian>()?;
    usize::try_from(count)
        .map_err(|_| CodecError::corrupted(format!("negative collection count {count}")))
}

impl<T: Pack> Pack for Option<T> {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        match self {
            None => false.pack(w),
            Some(value) => {
                true.pack(w)?;
                value.pack(w)
            }
        }
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        if bool::unpack(r)? {
            Ok(Some(T::unpack(r)?))
        } else {
            Ok(None)
        }
    }
}

impl<T: Pack> Pack for Vec<T> {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        write_count(w, self.len())?;
        for item in self {
            item.pack(w)?;
        }
        Ok(())
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        let count = read_count(r)?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(T::unpack(r)?);
        }
        Ok(items)
    }
}

impl<T: Pack> Pack for VecDeque<T> {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        write_count(w, self.len())?;
        for item in self {
            item.pack(w)?;
        }
        Ok(())
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        let count = read_count(r)?;
        let mut items = VecDeque::with_capacity(count);
        for _ in 0..count {
            items.push_back(T::unpack(r)?);
        }
        Ok(items)
    }
}

// Множества и словари сохраняют состав, но не порядок обхода хеш-таблицы.
impl<T: Pack + Eq + Hash> Pack for HashSet<T> {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        write_count(w, self.len())?;
        for item in self {
            item.pack(w)?;
        }
        Ok(())
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        let count = read_count(r)?;
        let mut items = HashSet::with_capacity(count);
        for _ in 0..count {
            items.insert(T::unpack(r)?);
        }
        Ok(items)
    }
}

impl<T: Pack + Ord> Pack for BTreeSet<T> {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        write_count(w, self.len())?;
        for item in self {
            item.pack(w)?;
        }
        Ok(())
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        let count = read_count(r)?;
        let mut items = BTreeSet::new();
        for _ in 0..count {
            items.insert(T::unpack(r)?);
        }
        Ok(items)
    }
}

impl<K: Pack + Eq + Hash, V: Pack> Pack for HashMap<K, V> {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        write_count(w, self.len())?;
        for (key, value) in self {
            key.pack(w)?;
            value.pack(w)?;
        }
        Ok(())
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        let count = read_count(r)?;
        let mut items = HashMap::with_capacity(count);
        for _ in 0..count {
            let key = K::unpack(r)?;
            let value = V::unpack(r)?;
            items.insert(key, value);
        }
        Ok(items)
    }
}

impl<K: Pack + Ord, V: Pack> Pack for BTreeMap<K, V> {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        write_count(w, self.len())?;
        for (key, value) in self {
            key.pack(w)?;
            value.pack(w)?;
        }
        Ok(())
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        let count = read_count(r)?;
        let mut items = BTreeMap::new();
        for _ in 0..count {
            let key = K::unpack(r)?;
            let value = V::unpack(r)?;
            items.insert(key, value);
        }
        Ok(items)
    }
}

// Историческая форма: распознаётся, но сознательно не поддерживается.
impl<T: Pack> Pack for LinkedList<T> {
    fn pack(&self, _w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        Err(CodecError::Unsupported {
            shape: "LinkedList",
            alternative: "Vec",
        })
    }

    fn unpack(_r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        Err(CodecError::Unsupported {
            shape: "LinkedList",
            alternative: "Vec",
        })
    }
}

impl<T: Pack, const N: usize> Pack for [T; N] {
    fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
        write_count(w, N)?;
        for item in self {
            item.pack(w)?;
        }
        Ok(())
    }

    fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
        let count = read_count(r)?;
        if count != N {
            return Err(CodecError::corrupted(format!(
                "fixed array of {N} elements, stream has {count}"
            )));
        }
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(T::unpack(r)?);
        }
        items
            .try_into()
            .map_err(|_| CodecError::corrupted("fixed array length mismatch".to_string()))
    }
}

// Кортежи арности 1..=8. Арность пишется как счётчик и сверяется при чтении.
macro_rules! tuple_pack {
    ($len:expr => $(($idx:tt, $t:ident)),+) => {
        impl<$($t: Pack),+> Pack for ($($t,)+) {
            fn pack(&self, w: &mut StreamWriter<'_, '_>) -> CodecResult<()> {
                write_count(w, $len)?;
                $( self.$idx.pack(w)?; )+
                Ok(())
            }

            fn unpack(r: &mut StreamReader<'_, '_>) -> CodecResult<Self> {
                let arity = read_count(r)?;
                if arity != $len {
                    return Err(CodecError::corrupted(format!(
                        "tuple of arity {}, stream has {arity}",
                        $len
                    )));
                }
                Ok(($( $t::unpack(r)?, )+))
            }
        }
    };
}

tuple_pack!(1 => (0, A));
tuple_pack!(2 => (0, A), (1, B));
tuple_pack!(3 => (0, A), (1, B), (2, C));
tuple_pack!(4 => (0, A), (1, B), (2, C), (3, D));
tuple_pack!(5 => (0, A), (1, B), (2, C), (3, D), (4, E));
tuple_pack!(6 => (0, A), (1, B), (2, C), (3, D), (4, E), (5, F));
tuple_pack!(7 => (0, A), (1, B), (2, C), (3, D), (4, E), (5, F), (6, G));
tuple_pack!(8 => (0, A), (1, B), (2, C), (3, D), (4, E), (5, F), (6, G), (7, H));

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::roundtrip;

    #[test]
    fn test_vec_and_deque_keep_order() {
        let list = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(roundtrip(&list), list);

        let queue: VecDeque<i32> = (0..10).collect();
        assert_eq!(roundtrip(&queue), queue);
    }

    #[test]
    fn test_set_and_map_keep_membership() {
        let set: HashSet<i64> = [3, 1, 4, 1, 5].into_iter().collect();
        assert_eq!(roundtrip(&set), set);

        let map: HashMap<String, u32> = [("one".to_string(), 1), ("two".to_string(), 2)]
            .into_iter()
            .collect();
        assert_eq!(roundtrip(&map), map);

        let sorted: BTreeMap<i32, bool> = [(7, true), (-1, false)].into_iter().collect();
        assert_eq!(roundtrip(&sorted), sorted);
    }

    #[test]
    fn test_nested_containers() {
        let nested: Vec<Option<Vec<u16>>> = vec![Some(vec![1, 2]), None, Some(vec![])];
        assert_eq!(roundtrip(&nested), nested);
    }

    #[test]
    fn test_tuples_up_to_eight() {
        assert_eq!(roundtrip(&(42u8,)), (42u8,));
        let pair = ("key".to_string(), 99i64);
        assert_eq!(roundtrip(&pair), pair);
        let eight = (1u8, 2i16, 3u32, 4i64, 5.0f32, true, 'q', "z".to_string());
        assert_eq!(roundtrip(&eight), eight);
    }

    #[test]
    fn test_fixed_array_roundtrip() {
        let arr = [10u32, 20, 30];
        assert_eq!(roundtrip(&arr), arr);
    }

    #[test]
    fn test_linked_list_is_recognized_but_unsupported() {
        let list: LinkedList<i32> = [1, 2].into_iter().collect();
        let err = crate::testkit::write_codec(|w| list.pack(w)).1.unwrap_err();
        match err {
            CodecError::Unsupported { shape, alternative } => {
                assert_eq!(shape, "LinkedList");
                assert_eq!(alternative, "Vec");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
