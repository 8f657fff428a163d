//! A format-agnostic object serializer built around an intermediate tree.
/*!

Values are converted to a [`TreeElement`] by a [`Serializer`] and the tree is
rendered to text by a pluggable [`Format`] (see the `uniser-json` crate):

```text
value -> Serializer::to_tree -> TreeElement -> Format::write -> text
text  -> Format::read -> TreeElement -> Serializer::from_tree -> value
```

How a type is converted is decided by a [`TypeAdapter`]. Adapters are looked up
in the resolution cache, then in the explicit registry, then produced on demand
by an ordered chain of [`TypeAdapterFactory`] implementations. Default chain:

| Factory               | Rust types                                   | Tree node
|-----------------------|----------------------------------------------|-------------------
| [`TreeFactory`]       | `TreeElement`, `Primitive`, `TreeObject`, `TreeArray` | (itself)
| [`StringFactory`]     | `String`                                     | string primitive
| [`BoolFactory`]       | `bool`                                       | boolean primitive
| [`NumberFactory`]     | `i8`-`i64`, `u8`-`u64`, `isize`, `usize`, `f32`, `f64` | number primitive
| [`EnumFactory`]       | [`impl_enum!`] enums                          | string primitive
| [`CollectionFactory`] | `Vec`, `VecDeque`, `BTreeSet`, `IndexSet`, `HashSet` | array
| [`ArrayFactory`]      | `Box<[T]>`, `[T; N]`                         | array
| [`MapFactory`]        | `BTreeMap`, `IndexMap`, `HashMap` with `String` keys | object

Types with no adapter are decomposed field by field when they describe
themselves as records (see [`impl_record!`]). `Option<T>` is the native
representation of absence: `None` is written as `null` and `null` is read back
as `None`.

```
use uniser::{impl_record, Serializer, TreeElement};

#[derive(Debug, Default, PartialEq)]
struct Point { x: i32, y: i32, label: String }

impl_record!(Point { x, y, label });

let serializer = Serializer::new();
let point = Point { x: 1, y: -2, label: "origin".into() };
let tree = serializer.to_tree(&point).unwrap();
assert_eq!(tree.try_object().unwrap().get("y"), Some(&TreeElement::from(-2)));
assert_eq!(serializer.from_tree::<Point>(&tree).unwrap(), Some(point));
```

The [`Serializer`] keeps its cache in a `RefCell` and shares adapters with `Rc`,
so an instance is bound to a single thread.
*/
#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

mod macros;
mod error;
mod foreign;
mod number;
mod sink;
mod tree;

pub mod adapter;
pub mod engine;
pub mod factories;
pub mod format;
pub mod reflect;

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
pub mod serde;

#[doc(hidden)]
pub mod __private;

pub use error::{Error, Result};
pub use number::{Number, NumberCast};
pub use sink::{SerError, SerResult, SerWrite, SliceWriter};
pub use tree::{ElementKind, Primitive, TreeArray, TreeElement, TreeObject};

pub use adapter::{AdapterRef, TypeAdapter, TypeAdapterFactory, Typed, TypedAdapter};
pub use engine::{Serializer, SerializerBuilder};
pub use factories::{
    default_factories,
    ArrayFactory,
    BoolFactory,
    CollectionFactory,
    EnumFactory,
    MapFactory,
    NumberFactory,
    StringFactory,
    TreeFactory,
};
pub use format::Format;
pub use reflect::{Annotation, Reflect, TypeDescriptor, TypeKind};
