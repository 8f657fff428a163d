//! [`Reflect`] implementations for the tree, scalar and container types.
use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::hash::{BuildHasher, Hash};

use indexmap::{IndexMap, IndexSet};

use crate::error::{Error, Result};
use crate::tree::{Primitive, TreeArray, TreeElement, TreeObject};
use super::*;

macro_rules! impl_reflect_kind {
    ($($ty:ty => $kind:expr),* $(,)?) => {$(
        impl Reflect for $ty {
            #[inline]
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::new::<$ty>($kind)
            }
        }
    )*};
}

impl_reflect_kind! {
    TreeElement => TypeKind::Tree(TreeKind::Element),
    Primitive => TypeKind::Tree(TreeKind::Primitive),
    TreeObject => TypeKind::Tree(TreeKind::Object),
    TreeArray => TypeKind::Tree(TreeKind::Array),
    String => TypeKind::String,
    bool => TypeKind::Bool,
    i8 => TypeKind::Number(NumberKind::I8),
    i16 => TypeKind::Number(NumberKind::I16),
    i32 => TypeKind::Number(NumberKind::I32),
    i64 => TypeKind::Number(NumberKind::I64),
    isize => TypeKind::Number(NumberKind::Isize),
    u8 => TypeKind::Number(NumberKind::U8),
    u16 => TypeKind::Number(NumberKind::U16),
    u32 => TypeKind::Number(NumberKind::U32),
    u64 => TypeKind::Number(NumberKind::U64),
    usize => TypeKind::Number(NumberKind::Usize),
    f32 => TypeKind::Number(NumberKind::F32),
    f64 => TypeKind::Number(NumberKind::F64),
}

impl<T: Reflect> Reflect for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(TypeKind::Option(OptionInfo::of::<T>()))
            .with_params([T::descriptor()])
    }
}

/* sequences */

macro_rules! impl_sequence {
    ($kind:ident, $ty:ty, [$($gen:tt)*], $set_like:literal, $from_items:expr) => {
        impl<$($gen)*> Sequence for $ty {
            type Item = T;
            const SET_LIKE: bool = $set_like;

            fn items(&self) -> Vec<&dyn Any> {
                self.iter().map(|item| item as &dyn Any).collect()
            }

            fn from_items(items: Vec<T>) -> Result<Self> {
                ($from_items)(items)
            }
        }

        impl<$($gen)*> Reflect for $ty {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::new::<Self>(TypeKind::$kind(SequenceInfo::of::<Self>()))
                    .with_params([T::descriptor()])
            }
        }
    };
}

impl_sequence!(Sequence, Vec<T>, [T: Reflect], false,
               |items: Vec<T>| Ok(items));
impl_sequence!(Sequence, VecDeque<T>, [T: Reflect], false,
               |items: Vec<T>| Ok(VecDeque::from(items)));
impl_sequence!(Sequence, BTreeSet<T>, [T: Reflect + Ord], true,
               |items: Vec<T>| Ok(items.into_iter().collect()));
impl_sequence!(Sequence, IndexSet<T, S>, [T: Reflect + Hash + Eq, S: BuildHasher + Default + 'static], true,
               |items: Vec<T>| Ok(items.into_iter().collect()));
#[cfg(feature = "std")]
impl_sequence!(Sequence, std::collections::HashSet<T, S>, [T: Reflect + Hash + Eq, S: BuildHasher + Default + 'static], true,
               |items: Vec<T>| Ok(items.into_iter().collect()));
impl_sequence!(Array, Box<[T]>, [T: Reflect], false,
               |items: Vec<T>| Ok(items.into_boxed_slice()));
impl_sequence!(Array, [T; N], [T: Reflect, const N: usize], false,
               |items: Vec<T>| <[T; N]>::try_from(items).map_err(|items: Vec<T>| {
                   Error::LengthMismatch { expected: N, found: items.len() }
               }));

/* maps */

macro_rules! impl_mapping {
    ($ty:ty, [$($gen:tt)*]) => {
        impl<$($gen)*> Mapping for $ty {
            type Key = K;
            type Value = V;

            fn entries(&self) -> Vec<(&dyn Any, &dyn Any)> {
                self.iter().map(|(k, v)| (k as &dyn Any, v as &dyn Any)).collect()
            }

            fn from_entries(entries: Vec<(K, V)>) -> Self {
                entries.into_iter().collect()
            }
        }

        impl<$($gen)*> Reflect for $ty {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::new::<Self>(TypeKind::Map(MapInfo::of::<Self>()))
                    .with_params([K::descriptor(), V::descriptor()])
            }
        }
    };
}

impl_mapping!(BTreeMap<K, V>, [K: Reflect + Ord, V: Reflect]);
impl_mapping!(IndexMap<K, V, S>, [K: Reflect + Hash + Eq, V: Reflect, S: BuildHasher + Default + 'static]);
#[cfg(feature = "std")]
impl_mapping!(std::collections::HashMap<K, V, S>, [K: Reflect + Hash + Eq, V: Reflect, S: BuildHasher + Default + 'static]);

#[cfg(test)]
mod tests {
    use alloc::vec;
    use super::*;

    fn build<S: Sequence + Reflect>(items: Vec<S::Item>) -> Result<S> {
        let (TypeKind::Sequence(info) | TypeKind::Array(info)) = *S::descriptor().kind() else {
            panic!("not a sequence");
        };
        let items = items.into_iter().map(|item| Box::new(item) as Box<dyn Any>).collect();
        info.build(items).and_then(unbox::<S>)
    }

    #[test]
    fn test_set_like_dedupes_in_first_seen_order() {
        let set: IndexSet<i32, foldhash::fast::FixedState> = build(vec![3, 1, 3, 2, 1]).unwrap();
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), [3, 1, 2]);
        let set: BTreeSet<i32> = build(vec![3, 1, 3]).unwrap();
        assert_eq!(set.len(), 2);
        assert!(matches!(TypeDescriptor::of::<BTreeSet<u8>>().kind(),
                         TypeKind::Sequence(info) if info.is_set_like()));
        assert!(matches!(TypeDescriptor::of::<Vec<u8>>().kind(),
                         TypeKind::Sequence(info) if !info.is_set_like()));
        let list: VecDeque<i32> = build(vec![3, 1, 3]).unwrap();
        assert_eq!(list, [3, 1, 3]);
    }

    #[test]
    fn test_boxed_slice_sized_to_input() {
        let slice: Box<[bool]> = build(vec![true, false, true]).unwrap();
        assert_eq!(&*slice, &[true, false, true]);
        let empty: Box<[bool]> = build(vec![]).unwrap();
        assert!(empty.is_empty());
        assert_eq!(build::<[u8; 3]>(vec![1, 2]).unwrap_err(),
                   Error::LengthMismatch { expected: 3, found: 2 });
    }

    #[test]
    fn test_map_entries_keep_order() {
        let mut map = IndexMap::<String, u8, foldhash::fast::FixedState>::default();
        map.insert("z".into(), 1);
        map.insert("a".into(), 2);
        let TypeKind::Map(info) = *TypeDescriptor::of::<IndexMap<String, u8, foldhash::fast::FixedState>>().kind() else {
            panic!("not a map");
        };
        let keys: Vec<_> = info.entries(&map).unwrap()
                               .into_iter()
                               .map(|(k, _)| k.downcast_ref::<String>().unwrap().as_str())
                               .collect();
        assert_eq!(keys, ["z", "a"]);
        let rebuilt = info.build(vec![
            (Box::new(String::from("b")) as Box<dyn Any>, Box::new(7u8) as Box<dyn Any>),
            (Box::new(String::from("b")), Box::new(9u8)),
        ]).unwrap();
        let rebuilt = unbox::<IndexMap<String, u8, foldhash::fast::FixedState>>(rebuilt).unwrap();
        assert_eq!(rebuilt.get("b"), Some(&9));
        assert!(info.build(vec![(Box::new(1u8) as Box<dyn Any>, Box::new(1u8) as Box<dyn Any>)]).is_err());
    }
}
