//! The default adapter factories.
//!
//! [`default_factories`] returns them in the order they are consulted:
//! tree types first, then strings, booleans, numbers, enums, collections,
//! arrays and finally string-keyed maps.
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::marker::PhantomData;

use crate::adapter::{downcast_ref, AdapterRef, TypeAdapter, TypeAdapterFactory, Typed, TypedAdapter};
use crate::engine::Serializer;
use crate::error::{Error, Result};
use crate::number::NumberCast;
use crate::reflect::{
    Annotation,
    EnumInfo,
    MapInfo,
    NumberKind,
    SequenceInfo,
    TreeKind,
    TypeDescriptor,
    TypeKind,
};
use crate::tree::{Primitive, TreeArray, TreeElement, TreeObject};

/// The default factory chain in resolution order.
pub fn default_factories() -> Vec<Rc<dyn TypeAdapterFactory>> {
    alloc::vec![
        Rc::new(TreeFactory),
        Rc::new(StringFactory),
        Rc::new(BoolFactory),
        Rc::new(NumberFactory),
        Rc::new(EnumFactory),
        Rc::new(CollectionFactory),
        Rc::new(ArrayFactory),
        Rc::new(MapFactory),
    ]
}

fn shape_mismatch(type_name: &'static str, element: &TreeElement) -> Error {
    Error::ShapeMismatch { type_name, found: element.kind() }
}

/* tree */

/// Passes tree types through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeFactory;

struct TreeAdapter {
    kind: TreeKind,
    type_name: &'static str,
}

impl TypeAdapterFactory for TreeFactory {
    fn create_adapter(&self, _engine: &Serializer, ty: &TypeDescriptor, _annotations: &[Annotation])
        -> Option<AdapterRef>
    {
        match *ty.kind() {
            TypeKind::Tree(kind) => Some(Rc::new(TreeAdapter { kind, type_name: ty.name() })),
            _ => None
        }
    }
}

impl TypeAdapter for TreeAdapter {
    fn encode(&self, _engine: &Serializer, value: &dyn Any) -> Result<TreeElement> {
        Ok(match self.kind {
            TreeKind::Element => downcast_ref::<TreeElement>(value)?.clone(),
            TreeKind::Primitive => downcast_ref::<Primitive>(value)?.clone().into(),
            TreeKind::Object => downcast_ref::<TreeObject>(value)?.clone().into(),
            TreeKind::Array => downcast_ref::<TreeArray>(value)?.clone().into(),
        })
    }

    fn decode(&self, _engine: &Serializer, element: &TreeElement, _previous: Option<&dyn Any>)
        -> Result<Box<dyn Any>>
    {
        let value: Box<dyn Any> = match (self.kind, element) {
            (TreeKind::Element, element) => Box::new(element.clone()),
            (TreeKind::Primitive, TreeElement::Primitive(p)) => Box::new(p.clone()),
            (TreeKind::Object, TreeElement::Object(o)) => Box::new(o.clone()),
            (TreeKind::Array, TreeElement::Array(a)) => Box::new(a.clone()),
            _ => return Err(shape_mismatch(self.type_name, element))
        };
        Ok(value)
    }
}

/* string */

/// Converts `String` to and from a string primitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringFactory;

struct StringAdapter;

impl TypeAdapterFactory for StringFactory {
    fn create_adapter(&self, _engine: &Serializer, ty: &TypeDescriptor, _annotations: &[Annotation])
        -> Option<AdapterRef>
    {
        matches!(ty.kind(), TypeKind::String).then(|| Typed::<_, String>::shared(StringAdapter))
    }
}

impl TypedAdapter<String> for StringAdapter {
    fn encode(&self, _engine: &Serializer, value: &String) -> Result<TreeElement> {
        Ok(value.as_str().into())
    }

    fn decode(&self, _engine: &Serializer, element: &TreeElement, _previous: Option<&String>) -> Result<String> {
        element.as_str()
               .map(String::from)
               .ok_or_else(|| shape_mismatch(core::any::type_name::<String>(), element))
    }
}

/* bool */

/// Converts `bool` to and from a boolean primitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolFactory;

struct BoolAdapter;

impl TypeAdapterFactory for BoolFactory {
    fn create_adapter(&self, _engine: &Serializer, ty: &TypeDescriptor, _annotations: &[Annotation])
        -> Option<AdapterRef>
    {
        matches!(ty.kind(), TypeKind::Bool).then(|| Typed::<_, bool>::shared(BoolAdapter))
    }
}

impl TypedAdapter<bool> for BoolAdapter {
    fn encode(&self, _engine: &Serializer, value: &bool) -> Result<TreeElement> {
        Ok((*value).into())
    }

    fn decode(&self, _engine: &Serializer, element: &TreeElement, _previous: Option<&bool>) -> Result<bool> {
        element.as_bool().ok_or_else(|| shape_mismatch("bool", element))
    }
}

/* numbers */

/// Converts the native numeric types to and from a number primitive.
///
/// Decoding converts to the exact width of the target, truncating like `as` does.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberFactory;

struct NumberAdapter<N>(PhantomData<fn() -> N>);

impl TypeAdapterFactory for NumberFactory {
    fn create_adapter(&self, _engine: &Serializer, ty: &TypeDescriptor, _annotations: &[Annotation])
        -> Option<AdapterRef>
    {
        macro_rules! number_adapter {
            ($kind:expr, $($variant:ident => $ty:ty),*) => {
                match $kind {
                    $(NumberKind::$variant => Typed::<_, $ty>::shared(NumberAdapter::<$ty>(PhantomData)),)*
                }
            };
        }
        let TypeKind::Number(kind) = *ty.kind() else {
            return None
        };
        Some(number_adapter!(kind,
            I8 => i8, I16 => i16, I32 => i32, I64 => i64, Isize => isize,
            U8 => u8, U16 => u16, U32 => u32, U64 => u64, Usize => usize,
            F32 => f32, F64 => f64))
    }
}

impl<N: NumberCast> TypedAdapter<N> for NumberAdapter<N> {
    fn encode(&self, _engine: &Serializer, value: &N) -> Result<TreeElement> {
        Ok(Primitive::Number(value.into_number()).into())
    }

    fn decode(&self, _engine: &Serializer, element: &TreeElement, _previous: Option<&N>) -> Result<N> {
        element.as_number()
               .map(N::from_number)
               .ok_or_else(|| shape_mismatch(core::any::type_name::<N>(), element))
    }
}

/* enums */

/// Converts enum cases to and from a string primitive holding the case name.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumFactory;

struct EnumAdapter {
    info: EnumInfo,
    type_name: &'static str,
}

impl TypeAdapterFactory for EnumFactory {
    fn create_adapter(&self, _engine: &Serializer, ty: &TypeDescriptor, _annotations: &[Annotation])
        -> Option<AdapterRef>
    {
        match *ty.kind() {
            TypeKind::Enum(info) => Some(Rc::new(EnumAdapter { info, type_name: ty.name() })),
            _ => None
        }
    }
}

impl TypeAdapter for EnumAdapter {
    fn encode(&self, _engine: &Serializer, value: &dyn Any) -> Result<TreeElement> {
        self.info.case_of(value)
                 .map(TreeElement::from)
                 .ok_or(Error::ValueMismatch { expected: self.type_name })
    }

    fn decode(&self, _engine: &Serializer, element: &TreeElement, _previous: Option<&dyn Any>)
        -> Result<Box<dyn Any>>
    {
        let name = element.as_str().ok_or_else(|| shape_mismatch(self.type_name, element))?;
        self.info.from_case(name).ok_or_else(|| Error::UnknownEnumCase {
            type_name: self.type_name,
            case: name.into()
        })
    }
}

/* collections and arrays */

/// Converts growable collections to and from an array.
///
/// Items decoded as absent are skipped. Set-like targets drop duplicates.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionFactory;

/// Converts boxed slices and fixed size arrays to and from an array.
///
/// The decoded value has exactly as many items as the tree array,
/// so an absent item is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayFactory;

struct SequenceAdapter {
    info: SequenceInfo,
    item: TypeDescriptor,
    type_name: &'static str,
    skip_absent: bool,
}

impl SequenceAdapter {
    fn new(ty: &TypeDescriptor, info: SequenceInfo, skip_absent: bool) -> Option<Self> {
        let item = ty.param(0)?.clone();
        Some(SequenceAdapter { info, item, type_name: ty.name(), skip_absent })
    }
}

impl TypeAdapterFactory for CollectionFactory {
    fn create_adapter(&self, _engine: &Serializer, ty: &TypeDescriptor, _annotations: &[Annotation])
        -> Option<AdapterRef>
    {
        match *ty.kind() {
            TypeKind::Sequence(info) => SequenceAdapter::new(ty, info, true)
                                          .map(|adapter| Rc::new(adapter) as AdapterRef),
            _ => None
        }
    }
}

impl TypeAdapterFactory for ArrayFactory {
    fn create_adapter(&self, _engine: &Serializer, ty: &TypeDescriptor, _annotations: &[Annotation])
        -> Option<AdapterRef>
    {
        match *ty.kind() {
            TypeKind::Array(info) => SequenceAdapter::new(ty, info, false)
                                       .map(|adapter| Rc::new(adapter) as AdapterRef),
            _ => None
        }
    }
}

impl TypeAdapter for SequenceAdapter {
    fn encode(&self, engine: &Serializer, value: &dyn Any) -> Result<TreeElement> {
        let items = self.info.items(value).ok_or(Error::ValueMismatch { expected: self.type_name })?;
        items.into_iter()
             .map(|item| engine.to_tree_with(Some(item), &self.item, &[]))
             .collect::<Result<TreeArray>>()
             .map(TreeElement::Array)
    }

    fn decode(&self, engine: &Serializer, element: &TreeElement, _previous: Option<&dyn Any>)
        -> Result<Box<dyn Any>>
    {
        let array = element.as_array().ok_or_else(|| shape_mismatch(self.type_name, element))?;
        let mut items = Vec::with_capacity(array.len());
        for child in array {
            match engine.from_tree_with(child, &self.item, &[], None)? {
                Some(item) => items.push(item),
                None if self.skip_absent => {}
                None => return Err(shape_mismatch(self.item.name(), child))
            }
        }
        self.info.build(items)
    }
}

/* maps */

/// Converts maps with `String` keys to and from an object.
///
/// Entries decoded as absent are skipped. Maps with other key types are left
/// to the following factories or to the field decomposition fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapFactory;

struct MapAdapter {
    info: MapInfo,
    value: TypeDescriptor,
    type_name: &'static str,
}

impl TypeAdapterFactory for MapFactory {
    fn create_adapter(&self, _engine: &Serializer, ty: &TypeDescriptor, _annotations: &[Annotation])
        -> Option<AdapterRef>
    {
        let TypeKind::Map(info) = *ty.kind() else {
            return None
        };
        match ty.params() {
            [key, value] if key.is::<String>() => Some(Rc::new(MapAdapter {
                info,
                value: value.clone(),
                type_name: ty.name()
            })),
            _ => None
        }
    }
}

impl TypeAdapter for MapAdapter {
    fn encode(&self, engine: &Serializer, value: &dyn Any) -> Result<TreeElement> {
        let entries = self.info.entries(value).ok_or(Error::ValueMismatch { expected: self.type_name })?;
        let mut object = TreeObject::with_capacity(entries.len());
        for (key, value) in entries {
            let key = downcast_ref::<String>(key)?;
            object.insert(key.as_str(), engine.to_tree_with(Some(value), &self.value, &[])?);
        }
        Ok(object.into())
    }

    fn decode(&self, engine: &Serializer, element: &TreeElement, _previous: Option<&dyn Any>)
        -> Result<Box<dyn Any>>
    {
        let object = element.as_object().ok_or_else(|| shape_mismatch(self.type_name, element))?;
        let mut entries = Vec::with_capacity(object.len());
        for (key, child) in object {
            if let Some(value) = engine.from_tree_with(child, &self.value, &[], None)? {
                entries.push((Box::new(key.clone()) as Box<dyn Any>, value));
            }
        }
        self.info.build(entries)
    }
}
