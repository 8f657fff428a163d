//! Runtime type descriptions used to resolve adapters and decompose values.
//!
//! Every type the [`Serializer`](crate::Serializer) handles implements [`Reflect`].
//! The returned [`TypeDescriptor`] names the type, carries its generic parameters
//! and a [`TypeKind`] which tells factories and the engine what can be done with
//! a type-erased value of that type.
//!
//! Records and enums implement `Reflect` with [`impl_record!`](crate::impl_record)
//! and [`impl_enum!`](crate::impl_enum), standard containers are covered here.
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{type_name, Any, TypeId};
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::error::{Error, Result};

mod impls;

/// A type that can describe itself to the serializer.
pub trait Reflect: Any {
    fn descriptor() -> TypeDescriptor;
}

/// A structural description of a type.
///
/// Two descriptors are equal when they describe the same type with the same
/// generic parameters. The name and kind are informational.
#[derive(Clone)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
    kind: TypeKind,
    params: Vec<TypeDescriptor>,
}

impl TypeDescriptor {
    /// The descriptor of a reflected type.
    #[inline]
    pub fn of<T: Reflect>() -> Self {
        T::descriptor()
    }

    /// Create a descriptor of `T` with the given `kind` and no parameters.
    pub fn new<T: Any>(kind: TypeKind) -> Self {
        TypeDescriptor { id: TypeId::of::<T>(), name: type_name::<T>(), kind, params: Vec::new() }
    }

    /// Create a descriptor of a type that is only handled by explicit adapters.
    pub fn opaque<T: Any>() -> Self {
        Self::new::<T>(TypeKind::Opaque)
    }

    /// Replace the generic parameters.
    pub fn with_params<I: IntoIterator<Item=TypeDescriptor>>(mut self, params: I) -> Self {
        self.params = params.into_iter().collect();
        self
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    #[inline]
    pub fn params(&self) -> &[TypeDescriptor] {
        &self.params
    }

    #[inline]
    pub fn param(&self, index: usize) -> Option<&TypeDescriptor> {
        self.params.get(index)
    }

    /// `true` if this describes `T`
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.params == other.params
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.params.hash(state);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// What the serializer can do with a value of a described type.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub enum TypeKind {
    /// One of the tree types
    Tree(TreeKind),
    String,
    Bool,
    Number(NumberKind),
    /// A field-less enum with named cases
    Enum(EnumInfo),
    /// A growable collection
    Sequence(SequenceInfo),
    /// A boxed slice or a fixed size array
    Array(SequenceInfo),
    /// A key-value collection, parameters are the key and the value types
    Map(MapInfo),
    /// `Option<T>`, the parameter is `T`
    Option(OptionInfo),
    /// A struct with named fields
    Record(RecordInfo),
    /// Handled only by explicitly registered adapters or custom factories
    Opaque,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeKind {
    Element,
    Primitive,
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    I8, I16, I32, I64, Isize,
    U8, U16, U32, U64, Usize,
    F32, F64,
}

/* enums */

/// A field-less enum which maps its cases to names.
///
/// Implemented by [`impl_enum!`](crate::impl_enum).
pub trait ReflectEnum: Reflect + Sized {
    const CASES: &'static [&'static str];
    fn case_name(&self) -> &'static str;
    fn from_case_name(name: &str) -> Option<Self>;
}

#[derive(Clone, Copy)]
pub struct EnumInfo {
    cases: &'static [&'static str],
    case_of: fn(&dyn Any) -> Option<&'static str>,
    from_case: fn(&str) -> Option<Box<dyn Any>>,
}

impl EnumInfo {
    pub fn of<E: ReflectEnum>() -> Self {
        fn case_of<E: ReflectEnum>(value: &dyn Any) -> Option<&'static str> {
            value.downcast_ref::<E>().map(E::case_name)
        }
        fn from_case<E: ReflectEnum>(name: &str) -> Option<Box<dyn Any>> {
            E::from_case_name(name).map(|case| Box::new(case) as Box<dyn Any>)
        }
        EnumInfo { cases: E::CASES, case_of: case_of::<E>, from_case: from_case::<E> }
    }

    /// Names of all cases in declaration order.
    pub fn cases(&self) -> &'static [&'static str] {
        self.cases
    }

    /// The name of the case held by `value`, or `None` if `value` is of another type.
    pub fn case_of(&self, value: &dyn Any) -> Option<&'static str> {
        (self.case_of)(value)
    }

    /// The case with the exact `name`.
    pub fn from_case(&self, name: &str) -> Option<Box<dyn Any>> {
        (self.from_case)(name)
    }
}

impl fmt::Debug for EnumInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumInfo").field("cases", &self.cases).finish_non_exhaustive()
    }
}

/* sequences */

/// A collection of items that can be listed and rebuilt.
pub trait Sequence: Any + Sized {
    type Item: Reflect;
    /// Rebuilding drops duplicate items
    const SET_LIKE: bool = false;

    fn items(&self) -> Vec<&dyn Any>;
    fn from_items(items: Vec<Self::Item>) -> Result<Self>;
}

#[derive(Clone, Copy)]
pub struct SequenceInfo {
    set_like: bool,
    items: fn(&dyn Any) -> Option<Vec<&dyn Any>>,
    build: fn(Vec<Box<dyn Any>>) -> Result<Box<dyn Any>>,
}

impl SequenceInfo {
    pub fn of<S: Sequence>() -> Self {
        fn items<S: Sequence>(value: &dyn Any) -> Option<Vec<&dyn Any>> {
            value.downcast_ref::<S>().map(S::items)
        }
        fn build<S: Sequence>(items: Vec<Box<dyn Any>>) -> Result<Box<dyn Any>> {
            let items = items.into_iter()
                             .map(unbox::<S::Item>)
                             .collect::<Result<Vec<_>>>()?;
            S::from_items(items).map(|seq| Box::new(seq) as Box<dyn Any>)
        }
        SequenceInfo { set_like: S::SET_LIKE, items: items::<S>, build: build::<S> }
    }

    #[inline]
    pub fn is_set_like(&self) -> bool {
        self.set_like
    }

    /// Borrow the items of `value`, or `None` if `value` is of another type.
    pub fn items<'a>(&self, value: &'a dyn Any) -> Option<Vec<&'a dyn Any>> {
        (self.items)(value)
    }

    /// Build a collection from decoded items.
    pub fn build(&self, items: Vec<Box<dyn Any>>) -> Result<Box<dyn Any>> {
        (self.build)(items)
    }
}

impl fmt::Debug for SequenceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceInfo").field("set_like", &self.set_like).finish_non_exhaustive()
    }
}

/* maps */

/// A key-value collection that can be listed and rebuilt.
pub trait Mapping: Any + Sized {
    type Key: Reflect;
    type Value: Reflect;

    fn entries(&self) -> Vec<(&dyn Any, &dyn Any)>;
    fn from_entries(entries: Vec<(Self::Key, Self::Value)>) -> Self;
}

#[derive(Clone, Copy)]
pub struct MapInfo {
    entries: fn(&dyn Any) -> Option<Vec<(&dyn Any, &dyn Any)>>,
    build: fn(Vec<(Box<dyn Any>, Box<dyn Any>)>) -> Result<Box<dyn Any>>,
}

impl MapInfo {
    pub fn of<M: Mapping>() -> Self {
        fn entries<M: Mapping>(value: &dyn Any) -> Option<Vec<(&dyn Any, &dyn Any)>> {
            value.downcast_ref::<M>().map(M::entries)
        }
        fn build<M: Mapping>(entries: Vec<(Box<dyn Any>, Box<dyn Any>)>) -> Result<Box<dyn Any>> {
            let entries = entries.into_iter()
                                 .map(|(k, v)| Ok((unbox::<M::Key>(k)?, unbox::<M::Value>(v)?)))
                                 .collect::<Result<Vec<_>>>()?;
            Ok(Box::new(M::from_entries(entries)))
        }
        MapInfo { entries: entries::<M>, build: build::<M> }
    }

    /// Borrow the entries of `value`, or `None` if `value` is of another type.
    pub fn entries<'a>(&self, value: &'a dyn Any) -> Option<Vec<(&'a dyn Any, &'a dyn Any)>> {
        (self.entries)(value)
    }

    /// Build a map from decoded entries, in order.
    pub fn build(&self, entries: Vec<(Box<dyn Any>, Box<dyn Any>)>) -> Result<Box<dyn Any>> {
        (self.build)(entries)
    }
}

impl fmt::Debug for MapInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapInfo").finish_non_exhaustive()
    }
}

/* options */

#[derive(Clone, Copy)]
pub struct OptionInfo {
    get: fn(&dyn Any) -> Option<Option<&dyn Any>>,
    some: fn(Box<dyn Any>) -> Result<Box<dyn Any>>,
    none: fn() -> Box<dyn Any>,
}

impl OptionInfo {
    pub fn of<T: Reflect>() -> Self {
        fn get<T: Reflect>(value: &dyn Any) -> Option<Option<&dyn Any>> {
            value.downcast_ref::<Option<T>>()
                 .map(|opt| opt.as_ref().map(|v| v as &dyn Any))
        }
        fn some<T: Reflect>(value: Box<dyn Any>) -> Result<Box<dyn Any>> {
            unbox::<T>(value).map(|v| Box::new(Some(v)) as Box<dyn Any>)
        }
        fn none<T: Reflect>() -> Box<dyn Any> {
            Box::new(None::<T>)
        }
        OptionInfo { get: get::<T>, some: some::<T>, none: none::<T> }
    }

    /// The content of an `Option` value, or `None` if `value` is of another type.
    pub fn get<'a>(&self, value: &'a dyn Any) -> Option<Option<&'a dyn Any>> {
        (self.get)(value)
    }

    /// Wrap a decoded content in `Some`.
    pub fn some(&self, value: Box<dyn Any>) -> Result<Box<dyn Any>> {
        (self.some)(value)
    }

    /// A boxed `None`.
    pub fn none(&self) -> Box<dyn Any> {
        (self.none)()
    }
}

impl fmt::Debug for OptionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionInfo").finish_non_exhaustive()
    }
}

/* records */

/// A constructor of a default record instance.
pub type Constructor = fn() -> Box<dyn Any>;

/// Field layout of a record, created by [`impl_record!`](crate::impl_record).
#[derive(Clone, Copy)]
pub struct RecordInfo {
    fields: fn() -> Vec<FieldInfo>,
    construct: Option<Constructor>,
}

impl RecordInfo {
    /// `fields` is called each time the layout is inspected,
    /// so a record may contain collections of itself.
    pub fn new(fields: fn() -> Vec<FieldInfo>, construct: Option<Constructor>) -> Self {
        RecordInfo { fields, construct }
    }

    pub fn fields(&self) -> Vec<FieldInfo> {
        (self.fields)()
    }

    /// Look up a field by its external name.
    pub fn field(&self, name: &str) -> Option<FieldInfo> {
        self.fields().into_iter().find(|field| field.name == name)
    }

    /// A fresh default instance, or `None` if the record can't be constructed.
    pub fn construct(&self) -> Option<Box<dyn Any>> {
        self.construct.map(|construct| construct())
    }

    #[inline]
    pub fn is_constructible(&self) -> bool {
        self.construct.is_some()
    }
}

impl fmt::Debug for RecordInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordInfo")
         .field("constructible", &self.is_constructible())
         .finish_non_exhaustive()
    }
}

/// A single named field of a record.
#[derive(Clone, Copy)]
pub struct FieldInfo {
    name: &'static str,
    descriptor: fn() -> TypeDescriptor,
    annotations: &'static [Annotation],
    get: fn(&dyn Any) -> Option<&dyn Any>,
    get_mut: fn(&mut dyn Any) -> Option<&mut dyn Any>,
    set: fn(&mut dyn Any, Box<dyn Any>) -> Result<()>,
}

impl FieldInfo {
    pub fn new(
            name: &'static str,
            descriptor: fn() -> TypeDescriptor,
            annotations: &'static [Annotation],
            get: fn(&dyn Any) -> Option<&dyn Any>,
            get_mut: fn(&mut dyn Any) -> Option<&mut dyn Any>,
            set: fn(&mut dyn Any, Box<dyn Any>) -> Result<()>
        ) -> Self
    {
        FieldInfo { name, descriptor, annotations, get, get_mut, set }
    }

    /// The name used in the tree.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn descriptor(&self) -> TypeDescriptor {
        (self.descriptor)()
    }

    #[inline]
    pub fn annotations(&self) -> &'static [Annotation] {
        self.annotations
    }

    /// Borrow the field of `owner`, or `None` if `owner` is not of the record type.
    pub fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Any> {
        (self.get)(owner)
    }

    pub fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        (self.get_mut)(owner)
    }

    /// Replace the field of `owner` with `value`.
    pub fn set(&self, owner: &mut dyn Any, value: Box<dyn Any>) -> Result<()> {
        (self.set)(owner, value)
    }
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
         .field("name", &self.name)
         .field("annotations", &self.annotations)
         .finish_non_exhaustive()
    }
}

/// Metadata attached to a record field and passed to factories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Annotation {
    name: &'static str,
    value: Option<&'static str>,
}

impl Annotation {
    pub const fn new(name: &'static str) -> Self {
        Annotation { name, value: None }
    }

    pub const fn with_value(name: &'static str, value: &'static str) -> Self {
        Annotation { name, value: Some(value) }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn value(&self) -> Option<&'static str> {
        self.value
    }

    /// Find an annotation by name.
    pub fn find<'a>(annotations: &'a [Annotation], name: &str) -> Option<&'a Annotation> {
        annotations.iter().find(|ann| ann.name == name)
    }
}

/* helpers used by the macros and the engine */

/// Take a value of type `T` out of a box.
pub fn unbox<T: Any>(value: Box<dyn Any>) -> Result<T> {
    value.downcast::<T>()
         .map(|v| *v)
         .map_err(|_| Error::ValueMismatch { expected: type_name::<T>() })
}

/// Assign a boxed value to a typed slot.
pub fn assign<F: Any>(slot: &mut F, value: Box<dyn Any>) -> Result<()> {
    *slot = unbox::<F>(value)?;
    Ok(())
}

#[doc(hidden)]
pub fn construct_default<T: Default + Any>() -> Box<dyn Any> {
    Box::new(T::default())
}

#[doc(hidden)]
pub fn field_descriptor<O, F: Reflect>(_field: impl FnOnce(&O) -> &F) -> TypeDescriptor {
    F::descriptor()
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec;
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Node {
        name: String,
        children: Vec<Node>,
        weight: Option<f32>,
    }

    crate::impl_record!(Node { name as "label", children, weight @ [Annotation::with_value("unit", "kg")] });

    struct Handle(u32);

    crate::impl_record!(#[no_default] Handle {});

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Color { Red, Green, Blue }

    crate::impl_enum!(Color { Red, Green as "green", Blue });

    #[test]
    fn test_descriptor_equality() {
        assert_eq!(TypeDescriptor::of::<Vec<i32>>(), TypeDescriptor::of::<Vec<i32>>());
        assert_ne!(TypeDescriptor::of::<Vec<i32>>(), TypeDescriptor::of::<Vec<i64>>());
        assert_ne!(TypeDescriptor::of::<i32>(), TypeDescriptor::of::<u32>());
        let map = TypeDescriptor::of::<BTreeMap<String, bool>>();
        assert!(map.is::<BTreeMap<String, bool>>());
        assert_eq!(map.params(), &[TypeDescriptor::of::<String>(), TypeDescriptor::of::<bool>()]);
        assert!(matches!(map.kind(), TypeKind::Map(_)));
        assert!(matches!(TypeDescriptor::of::<u8>().kind(), TypeKind::Number(NumberKind::U8)));
        // equality ignores the kind
        let opaque = TypeDescriptor::opaque::<i32>();
        assert_eq!(opaque, TypeDescriptor::of::<i32>());
    }

    #[test]
    fn test_record_layout() {
        let TypeKind::Record(info) = *TypeDescriptor::of::<Node>().kind() else {
            panic!("not a record");
        };
        assert!(info.is_constructible());
        let names: Vec<_> = info.fields().iter().map(FieldInfo::name).collect();
        assert_eq!(names, ["label", "children", "weight"]);
        let weight = info.field("weight").unwrap();
        assert_eq!(weight.descriptor(), TypeDescriptor::of::<Option<f32>>());
        assert_eq!(Annotation::find(weight.annotations(), "unit").and_then(Annotation::value), Some("kg"));
        assert!(info.field("name").is_none());

        let mut node = info.construct().unwrap();
        let label = info.field("label").unwrap();
        label.set(&mut *node, Box::new(String::from("root"))).unwrap();
        assert_eq!(label.get(&*node).unwrap().downcast_ref::<String>().unwrap(), "root");
        assert_eq!(label.set(&mut *node, Box::new(1u8)), Err(Error::ValueMismatch {
            expected: type_name::<String>() }));
        let children = info.field("children").unwrap();
        children.get_mut(&mut *node).unwrap()
                .downcast_mut::<Vec<Node>>().unwrap()
                .push(Node::default());
        let node = unbox::<Node>(node).unwrap();
        assert_eq!(node.children.len(), 1);
        assert!(label.get(&5i32).is_none());

        let TypeKind::Record(info) = *TypeDescriptor::of::<Handle>().kind() else {
            panic!("not a record");
        };
        assert!(info.construct().is_none());
        assert!(info.fields().is_empty());
        assert_eq!(Handle(7).0, 7);
    }

    #[test]
    fn test_enum_cases() {
        let TypeKind::Enum(info) = *TypeDescriptor::of::<Color>().kind() else {
            panic!("not an enum");
        };
        assert_eq!(info.cases(), &["Red", "green", "Blue"]);
        assert_eq!(info.case_of(&Color::Green), Some("green"));
        assert_eq!(info.case_of(&1u8), None);
        let blue = info.from_case("Blue").unwrap();
        assert_eq!(blue.downcast_ref::<Color>(), Some(&Color::Blue));
        assert!(info.from_case("Green").is_none());
        assert!(info.from_case("blue").is_none());
    }

    #[test]
    fn test_sequence_and_option_infos() {
        let TypeKind::Array(info) = *TypeDescriptor::of::<[u8; 2]>().kind() else {
            panic!("not an array");
        };
        assert_eq!(info.items(&[1u8, 2]).unwrap().len(), 2);
        let built = info.build(vec![Box::new(1u8) as Box<dyn Any>, Box::new(2u8)]).unwrap();
        assert_eq!(built.downcast_ref::<[u8; 2]>(), Some(&[1, 2]));
        assert_eq!(info.build(vec![Box::new(1u8) as Box<dyn Any>]).unwrap_err(),
                   Error::LengthMismatch { expected: 2, found: 1 });

        let TypeKind::Option(info) = *TypeDescriptor::of::<Option<bool>>().kind() else {
            panic!("not an option");
        };
        assert!(matches!(info.get(&Some(true)), Some(Some(_))));
        assert!(matches!(info.get(&None::<bool>), Some(None)));
        assert!(info.get(&true).is_none());
        let some = info.some(Box::new(false)).unwrap();
        assert_eq!(some.downcast_ref::<Option<bool>>(), Some(&Some(false)));
        assert_eq!(info.none().downcast_ref::<Option<bool>>(), Some(&None));
    }
}
