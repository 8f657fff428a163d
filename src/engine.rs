//! The serializer engine.
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::cell::RefCell;
use core::fmt;

use foldhash::fast::FixedState;
use hashbrown::HashMap;

use crate::adapter::{AdapterRef, TypeAdapterFactory, Typed, TypedAdapter};
use crate::error::{Error, Result};
use crate::factories::default_factories;
use crate::format::Format;
use crate::reflect::{unbox, Annotation, RecordInfo, Reflect, TypeDescriptor, TypeKind};
use crate::tree::{TreeElement, TreeObject};

/// Resolution cache key: the requested type and the annotations of the slot.
#[derive(Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    ty: TypeDescriptor,
    annotations: Vec<Annotation>,
}

impl CacheKey {
    fn new(ty: &TypeDescriptor, annotations: &[Annotation]) -> Self {
        CacheKey { ty: ty.clone(), annotations: annotations.to_vec() }
    }
}

/// Converts values to tree nodes and back, and optionally to text with a [`Format`].
///
/// Adapters are resolved in this order:
///
/// 1. the resolution cache,
/// 2. adapters registered for the exact type,
/// 3. the factory chain, first match wins.
///
/// Resolved adapters are cached for the lifetime of the serializer.
/// Registering an adapter for a type that was already resolved does not
/// affect the cached resolution. Failed lookups are cached too, until an
/// adapter or a factory is registered.
///
/// Types with no adapter are decomposed field by field if they implement
/// [`Reflect`] with [`impl_record!`](crate::impl_record).
pub struct Serializer {
    format: Option<Box<dyn Format>>,
    adapters: HashMap<TypeDescriptor, AdapterRef, FixedState>,
    factories: Vec<Rc<dyn TypeAdapterFactory>>,
    cache: RefCell<HashMap<CacheKey, Option<AdapterRef>, FixedState>>,
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Serializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Serializer")
         .field("format", &self.format.as_ref().map(|format| format.extension()))
         .field("adapters", &self.adapters.keys().collect::<Vec<_>>())
         .field("factories", &self.factories.len())
         .field("cached", &self.cache.borrow().len())
         .finish()
    }
}

impl Serializer {
    /// A serializer with the default factory chain and no format.
    pub fn new() -> Self {
        SerializerBuilder::new().build()
    }

    /// A serializer with the default factory chain and the given `format`.
    pub fn with_format<F: Format + 'static>(format: F) -> Self {
        SerializerBuilder::new().format(format).build()
    }

    pub fn builder() -> SerializerBuilder {
        SerializerBuilder::new()
    }

    /// The configured format, if any.
    pub fn format(&self) -> Option<&dyn Format> {
        self.format.as_deref()
    }

    fn require_format(&self) -> Result<&dyn Format> {
        self.format().ok_or(Error::NoFormatConfigured)
    }

    /* adapters */

    /// Resolve an adapter for `ty` requested by a slot carrying `annotations`.
    pub fn get_adapter(&self, ty: &TypeDescriptor, annotations: &[Annotation]) -> Option<AdapterRef> {
        let key = CacheKey::new(ty, annotations);
        if let Some(entry) = self.cache.borrow().get(&key) {
            log::trace!("adapter cache hit for {ty}");
            return entry.clone()
        }
        let adapter = match self.adapters.get(ty) {
            Some(adapter) => {
                log::debug!("{ty} resolved from the registry");
                Some(adapter.clone())
            }
            None => {
                log::trace!("consulting {} factories for {ty}", self.factories.len());
                let found = self.factories.iter()
                    .enumerate()
                    .find_map(|(index, factory)| {
                        factory.create_adapter(self, ty, annotations).map(|adapter| (index, adapter))
                    });
                match found {
                    Some((index, adapter)) => {
                        log::debug!("{ty} resolved by factory #{index}");
                        Some(adapter)
                    }
                    None => {
                        log::trace!("no adapter for {ty}");
                        None
                    }
                }
            }
        };
        // a factory may have resolved the same key while creating this adapter
        let mut cache = self.cache.borrow_mut();
        cache.entry(key).or_insert(adapter).clone()
    }

    /// Register an `adapter` for the exact type `ty`, returning the previously
    /// registered one.
    ///
    /// Resolutions of `ty` that are already cached are not affected.
    pub fn register_type_adapter(&mut self, ty: TypeDescriptor, adapter: AdapterRef) -> Option<AdapterRef> {
        let cache = self.cache.get_mut();
        if cache.iter().any(|(key, entry)| key.ty == ty && entry.is_some()) {
            log::warn!("adapter registered for {ty} after it was resolved, the cached adapter stays in use");
        }
        cache.retain(|key, entry| entry.is_some() || key.ty != ty);
        self.adapters.insert(ty, adapter)
    }

    /// Register a typed `adapter` for `T`.
    pub fn register_adapter<T, A>(&mut self, adapter: A) -> Option<AdapterRef>
        where T: Reflect, A: TypedAdapter<T> + 'static
    {
        self.register_type_adapter(T::descriptor(), Typed::<A, T>::shared(adapter))
    }

    /// Append a factory to the end of the chain.
    pub fn register_type_adapter_factory<F: TypeAdapterFactory + 'static>(&mut self, factory: F) {
        self.forget_misses();
        self.factories.push(Rc::new(factory))
    }

    /// Insert a factory into the chain at `index`.
    ///
    /// __Panics__ if `index` is greater than the number of factories.
    pub fn insert_type_adapter_factory<F: TypeAdapterFactory + 'static>(&mut self, index: usize, factory: F) {
        self.forget_misses();
        self.factories.insert(index, Rc::new(factory))
    }

    /// Drop cached failed lookups, a new factory may resolve them.
    fn forget_misses(&mut self) {
        self.cache.get_mut().retain(|_, entry| entry.is_some());
    }

    pub fn factories(&self) -> &[Rc<dyn TypeAdapterFactory>] {
        &self.factories
    }

    /* encoding */

    /// Convert `value` to a tree.
    pub fn to_tree<T: Reflect>(&self, value: &T) -> Result<TreeElement> {
        self.to_tree_with(Some(value), &T::descriptor(), &[])
    }

    /// Convert a type-erased `value` of type `ty` to a tree.
    ///
    /// An absent value and `None` are converted to [`TreeElement::Null`].
    pub fn to_tree_with(&self, value: Option<&dyn Any>, ty: &TypeDescriptor, annotations: &[Annotation])
        -> Result<TreeElement>
    {
        let Some(value) = value else {
            return Ok(TreeElement::Null)
        };
        if let TypeKind::Option(info) = *ty.kind() {
            let inner = info.get(value).ok_or(Error::ValueMismatch { expected: ty.name() })?;
            return self.to_tree_with(inner, option_item(ty)?, annotations)
        }
        if let Some(adapter) = self.get_adapter(ty, annotations) {
            return adapter.encode(self, value)
        }
        match *ty.kind() {
            TypeKind::Record(info) => self.encode_fields(value, ty, &info),
            _ => Err(Error::NotDecomposable { type_name: ty.name() })
        }
    }

    fn encode_fields(&self, value: &dyn Any, ty: &TypeDescriptor, info: &RecordInfo) -> Result<TreeElement> {
        let fields = info.fields();
        let mut object = TreeObject::with_capacity(fields.len());
        for field in fields {
            let field_value = field.get(value).ok_or(Error::ValueMismatch { expected: ty.name() })?;
            let element = self.to_tree_with(Some(field_value), &field.descriptor(), field.annotations())?;
            object.insert(field.name(), element);
        }
        Ok(object.into())
    }

    /// Convert `value` to text with the configured format.
    pub fn to_value<T: Reflect>(&self, value: &T) -> Result<String> {
        let format = self.require_format()?;
        format.write(&self.to_tree(value)?)
    }

    /// Convert a type-erased `value` of type `ty` to text with the configured format.
    pub fn to_value_with(&self, value: Option<&dyn Any>, ty: &TypeDescriptor) -> Result<String> {
        let format = self.require_format()?;
        format.write(&self.to_tree_with(value, ty, &[])?)
    }

    /* decoding */

    /// Create a value of type `T` from a tree.
    ///
    /// Returns `None` when `element` is [`TreeElement::Null`], unless `T` is an `Option`.
    pub fn from_tree<T: Reflect>(&self, element: &TreeElement) -> Result<Option<T>> {
        self.from_tree_with(element, &T::descriptor(), &[], None)?
            .map(unbox::<T>)
            .transpose()
    }

    /// Create a type-erased value of type `ty` from a tree.
    ///
    /// `previous` is the current value of the slot being decoded into and is
    /// passed on to the adapter.
    pub fn from_tree_with(
            &self,
            element: &TreeElement,
            ty: &TypeDescriptor,
            annotations: &[Annotation],
            previous: Option<&dyn Any>
        ) -> Result<Option<Box<dyn Any>>>
    {
        if let TypeKind::Option(info) = *ty.kind() {
            if element.is_null() {
                return Ok(Some(info.none()))
            }
            let previous = previous.and_then(|prev| info.get(prev)).flatten();
            let value = match self.from_tree_with(element, option_item(ty)?, annotations, previous)? {
                Some(inner) => info.some(inner)?,
                None => info.none()
            };
            return Ok(Some(value))
        }
        if element.is_null() {
            return Ok(None)
        }
        if let Some(adapter) = self.get_adapter(ty, annotations) {
            return adapter.decode(self, element, previous).map(Some)
        }
        let Some(object) = element.as_object() else {
            return Err(Error::UnsupportedShape { type_name: ty.name(), found: element.kind() })
        };
        let TypeKind::Record(info) = *ty.kind() else {
            return Err(Error::NotDecomposable { type_name: ty.name() })
        };
        let mut instance = info.construct().ok_or(Error::ConstructionFailure { type_name: ty.name() })?;
        self.populate(object, &mut *instance, ty, &info)?;
        Ok(Some(instance))
    }

    /// Decode the fields present in `object` into `instance`, leaving the others untouched.
    fn populate(&self, object: &TreeObject, instance: &mut dyn Any, ty: &TypeDescriptor, info: &RecordInfo)
        -> Result<()>
    {
        for field in info.fields() {
            let Some(child) = object.get(field.name()) else {
                continue
            };
            let field_ty = field.descriptor();
            if let (TypeKind::Record(nested), TreeElement::Object(child_object)) = (*field_ty.kind(), child) {
                match self.get_adapter(&field_ty, field.annotations()) {
                    Some(adapter) => {
                        let value = adapter.decode(self, child, field.get(instance))?;
                        field.set(instance, value)?;
                    }
                    None => {
                        let slot = field.get_mut(instance).ok_or(Error::ValueMismatch { expected: ty.name() })?;
                        self.populate(child_object, slot, &field_ty, &nested)?;
                    }
                }
                continue
            }
            let decoded = self.from_tree_with(child, &field_ty, field.annotations(), field.get(instance))?;
            // null decoded into a field that can't hold it leaves the field as is
            if let Some(value) = decoded {
                field.set(instance, value)?;
            }
        }
        Ok(())
    }

    /// Decode `element` into an existing `target`.
    ///
    /// Records without an adapter are populated in place: fields with a matching
    /// key are decoded, the others keep their values. Anything else is replaced
    /// with the decoded value, unless `element` is null.
    pub fn from_tree_into<T: Reflect>(&self, element: &TreeElement, target: &mut T) -> Result<()> {
        let ty = T::descriptor();
        if let (TypeKind::Record(info), TreeElement::Object(object)) = (*ty.kind(), element) {
            return match self.get_adapter(&ty, &[]) {
                Some(adapter) => {
                    *target = unbox::<T>(adapter.decode(self, element, Some(&*target))?)?;
                    Ok(())
                }
                None => self.populate(object, target, &ty, &info)
            }
        }
        if let Some(value) = self.from_tree_with(element, &ty, &[], Some(&*target))? {
            *target = unbox::<T>(value)?;
        }
        Ok(())
    }

    /// Create a value of type `T` from text with the configured format.
    pub fn from_value<T: Reflect>(&self, text: &str) -> Result<Option<T>> {
        let format = self.require_format()?;
        self.from_tree(&format.read(text)?)
    }

    /// Decode text with the configured format into an existing `target`.
    pub fn from_value_into<T: Reflect>(&self, text: &str, target: &mut T) -> Result<()> {
        let format = self.require_format()?;
        self.from_tree_into(&format.read(text)?, target)
    }
}

fn option_item(ty: &TypeDescriptor) -> Result<&TypeDescriptor> {
    ty.param(0).ok_or(Error::NotDecomposable { type_name: ty.name() })
}

/// Assembles a [`Serializer`].
///
/// Custom factories are consulted after the default ones, unless
/// [`without_default_factories`](Self::without_default_factories) is called.
pub struct SerializerBuilder {
    format: Option<Box<dyn Format>>,
    adapters: Vec<(TypeDescriptor, AdapterRef)>,
    factories: Vec<Rc<dyn TypeAdapterFactory>>,
    default_factories: bool,
}

impl Default for SerializerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SerializerBuilder {
    pub fn new() -> Self {
        SerializerBuilder {
            format: None,
            adapters: Vec::new(),
            factories: Vec::new(),
            default_factories: true,
        }
    }

    pub fn format<F: Format + 'static>(mut self, format: F) -> Self {
        self.format = Some(Box::new(format));
        self
    }

    /// Register an adapter for the exact type `ty`.
    pub fn type_adapter(mut self, ty: TypeDescriptor, adapter: AdapterRef) -> Self {
        self.adapters.push((ty, adapter));
        self
    }

    /// Register a typed adapter for `T`.
    pub fn adapter<T, A>(self, adapter: A) -> Self
        where T: Reflect, A: TypedAdapter<T> + 'static
    {
        self.type_adapter(T::descriptor(), Typed::<A, T>::shared(adapter))
    }

    /// Append a factory.
    pub fn factory<F: TypeAdapterFactory + 'static>(mut self, factory: F) -> Self {
        self.factories.push(Rc::new(factory));
        self
    }

    /// Leave the default factories out of the chain.
    pub fn without_default_factories(mut self) -> Self {
        self.default_factories = false;
        self
    }

    pub fn build(self) -> Serializer {
        let mut factories = if self.default_factories {
            default_factories()
        }
        else {
            Vec::new()
        };
        factories.extend(self.factories);
        Serializer {
            format: self.format,
            adapters: self.adapters.into_iter().collect(),
            factories,
            cache: RefCell::new(HashMap::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::ToString;
    use alloc::vec;
    use core::cell::Cell;
    use crate::adapter::downcast_ref;
    use crate::reflect::Annotation;
    use crate::tree::TreeArray;
    use crate::ElementKind;
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Inner {
        id: u32,
        tag: Option<String>,
    }

    crate::impl_record!(Inner { id, tag });

    #[derive(Debug, Default, PartialEq)]
    struct Outer {
        count: i32,
        name: String,
        tags: Vec<String>,
        scores: BTreeMap<String, i32>,
        inner: Inner,
        note: Option<String>,
        skipped: u8,
    }

    crate::impl_record!(Outer { count, name as "title", tags, scores, inner, note });

    #[derive(Debug, PartialEq)]
    struct Fixed {
        level: u8,
    }

    crate::impl_record!(#[no_default] Fixed { level });

    #[derive(Debug)]
    struct Opaque;

    impl Reflect for Opaque {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::opaque::<Self>()
        }
    }

    fn sample() -> Outer {
        Outer {
            count: -3,
            name: "outer".into(),
            tags: vec!["a".into(), "b".into()],
            scores: [("x".to_string(), 1), ("y".to_string(), 2)].into_iter().collect(),
            inner: Inner { id: 9, tag: Some("t".into()) },
            note: None,
            skipped: 5,
        }
    }

    #[test]
    fn test_field_decomposition() {
        let engine = Serializer::new();
        let tree = engine.to_tree(&sample()).unwrap();
        let object = tree.try_object().unwrap();
        let keys: Vec<_> = object.keys().map(String::as_str).collect();
        assert_eq!(keys, ["count", "title", "tags", "scores", "inner", "note"]);
        assert_eq!(object.get("count"), Some(&TreeElement::from(-3)));
        assert_eq!(object.get("note"), Some(&TreeElement::Null));
        assert_eq!(object.get("inner").unwrap().try_object().unwrap().get("tag"),
                   Some(&TreeElement::from("t")));

        let decoded = engine.from_tree::<Outer>(&tree).unwrap().unwrap();
        assert_eq!(decoded, Outer { skipped: 0, ..sample() });
    }

    #[test]
    fn test_absent_values() {
        let engine = Serializer::new();
        assert_eq!(engine.to_tree_with(None, &TypeDescriptor::of::<Outer>(), &[]).unwrap(), TreeElement::Null);
        assert_eq!(engine.to_tree(&None::<i32>).unwrap(), TreeElement::Null);
        assert_eq!(engine.to_tree(&Some(4i32)).unwrap(), TreeElement::from(4));
        assert_eq!(engine.from_tree::<Outer>(&TreeElement::Null).unwrap(), None);
        assert_eq!(engine.from_tree::<i32>(&TreeElement::Null).unwrap(), None);
        assert_eq!(engine.from_tree::<Option<i32>>(&TreeElement::Null).unwrap(), Some(None));
        assert_eq!(engine.from_tree::<Option<i32>>(&TreeElement::from(1)).unwrap(), Some(Some(1)));
    }

    #[test]
    fn test_absent_keys_leave_defaults() {
        let engine = Serializer::new();
        let mut object = TreeObject::new();
        object.insert("title", "partial");
        object.insert("count", TreeElement::Null);
        object.insert("unknown", true);
        let decoded = engine.from_tree::<Outer>(&object.into()).unwrap().unwrap();
        assert_eq!(decoded, Outer { name: "partial".into(), ..Outer::default() });
    }

    #[test]
    fn test_unsupported_shapes() {
        let engine = Serializer::new();
        assert_eq!(engine.from_tree::<Outer>(&TreeElement::from(1)).unwrap_err(),
                   Error::UnsupportedShape { type_name: core::any::type_name::<Outer>(), found: ElementKind::Number });
        assert_eq!(engine.from_tree::<Outer>(&TreeArray::new().into()).unwrap_err(),
                   Error::UnsupportedShape { type_name: core::any::type_name::<Outer>(), found: ElementKind::Array });
        assert_eq!(engine.from_tree::<Fixed>(&TreeObject::new().into()).unwrap_err(),
                   Error::ConstructionFailure { type_name: core::any::type_name::<Fixed>() });
        assert_eq!(engine.to_tree(&Opaque).unwrap_err(),
                   Error::NotDecomposable { type_name: core::any::type_name::<Opaque>() });
        assert_eq!(engine.from_tree::<Opaque>(&TreeObject::new().into()).unwrap_err(),
                   Error::NotDecomposable { type_name: core::any::type_name::<Opaque>() });
        assert!(matches!(engine.from_tree::<Opaque>(&TreeElement::from("x")),
                         Err(Error::UnsupportedShape { .. })));
    }

    #[test]
    fn test_from_tree_into_keeps_absent_fields() {
        let engine = Serializer::new();
        let mut fixed = Fixed { level: 1 };
        engine.from_tree_into(&TreeObject::new().into(), &mut fixed).unwrap();
        assert_eq!(fixed, Fixed { level: 1 });
        let mut object = TreeObject::new();
        object.insert("level", 7);
        engine.from_tree_into(&object.into(), &mut fixed).unwrap();
        assert_eq!(fixed, Fixed { level: 7 });
        assert_eq!(engine.to_tree(&fixed).unwrap().to_string(), r#"{"level": 7}"#);

        let mut outer = sample();
        let mut inner = TreeObject::new();
        inner.insert("id", 10);
        let mut object = TreeObject::new();
        object.insert("inner", inner);
        object.insert("note", "set");
        engine.from_tree_into(&object.into(), &mut outer).unwrap();
        assert_eq!(outer.inner, Inner { id: 10, tag: Some("t".into()) });
        assert_eq!(outer.note.as_deref(), Some("set"));
        assert_eq!(outer.skipped, 5);

        let mut number = 5u16;
        engine.from_tree_into(&TreeElement::Null, &mut number).unwrap();
        assert_eq!(number, 5);
        engine.from_tree_into(&TreeElement::from(6), &mut number).unwrap();
        assert_eq!(number, 6);
    }

    struct Countdown;

    impl TypedAdapter<i32> for Countdown {
        fn encode(&self, _engine: &Serializer, value: &i32) -> Result<TreeElement> {
            Ok(TreeElement::from(value.to_string()))
        }

        fn decode(&self, _engine: &Serializer, element: &TreeElement, previous: Option<&i32>) -> Result<i32> {
            let value = element.try_str()?.parse::<i32>().map_err(Error::custom)?;
            Ok(value - previous.copied().unwrap_or(0))
        }
    }

    #[test]
    fn test_registry_precedes_factories() {
        let mut engine = Serializer::new();
        assert!(engine.register_adapter::<i32, _>(Countdown).is_none());
        assert_eq!(engine.to_tree(&12i32).unwrap(), TreeElement::from("12"));
        assert_eq!(engine.to_tree(&12i64).unwrap(), TreeElement::from(12));
        let mut object = TreeObject::new();
        object.insert("count", "10");
        let mut outer = Outer { count: 4, ..Outer::default() };
        engine.from_tree_into(&object.into(), &mut outer).unwrap();
        // the previous value is passed to the adapter
        assert_eq!(outer.count, 6);
    }

    #[test]
    fn test_cache_is_not_invalidated() {
        let mut engine = Serializer::new();
        assert_eq!(engine.to_tree(&12i32).unwrap(), TreeElement::from(12));
        engine.register_adapter::<i32, _>(Countdown);
        assert_eq!(engine.to_tree(&12i32).unwrap(), TreeElement::from(12));
        let fresh = Serializer::builder().adapter::<i32, _>(Countdown).build();
        assert_eq!(fresh.to_tree(&12i32).unwrap(), TreeElement::from("12"));
    }

    #[test]
    fn test_factories_resolve_once_per_key() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut engine = Serializer::new();
        engine.insert_type_adapter_factory(0, move |_: &Serializer, _: &TypeDescriptor, _: &[Annotation]|
                                                    -> Option<AdapterRef> {
            counter.set(counter.get() + 1);
            None
        });
        engine.to_tree(&vec![1u8, 2, 3]).unwrap();
        engine.to_tree(&vec![4u8]).unwrap();
        // Vec<u8> and u8
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_unresolved_records_are_cached() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut engine = Serializer::new();
        engine.insert_type_adapter_factory(0, move |_: &Serializer, ty: &TypeDescriptor, _: &[Annotation]|
                                                    -> Option<AdapterRef> {
            if ty.is::<Inner>() {
                counter.set(counter.get() + 1);
            }
            None
        });
        let inner = Inner { id: 3, tag: None };
        let tree = engine.to_tree(&inner).unwrap();
        engine.to_tree(&inner).unwrap();
        assert_eq!(engine.from_tree::<Inner>(&tree).unwrap(), Some(inner));
        let mut object = TreeObject::new();
        object.insert("inner", tree.clone());
        let mut outer = Outer::default();
        engine.from_tree_into(&object.into(), &mut outer).unwrap();
        assert_eq!(outer.inner.id, 3);
        assert_eq!(calls.get(), 1);
        // a new factory may resolve what the chain could not
        engine.register_type_adapter_factory(|_: &Serializer, _: &TypeDescriptor, _: &[Annotation]|
                                                  -> Option<AdapterRef> { None });
        engine.to_tree(&Inner::default()).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_registration_replaces_cached_miss() {
        let mut engine = Serializer::new();
        assert!(engine.get_adapter(&TypeDescriptor::of::<Inner>(), &[]).is_none());
        engine.register_adapter::<Inner, _>(Tagged);
        assert_eq!(engine.to_tree(&Inner { id: 1, tag: None }).unwrap(), TreeElement::from("inner 1"));
    }

    struct Tagged;

    impl TypedAdapter<Inner> for Tagged {
        fn encode(&self, _engine: &Serializer, value: &Inner) -> Result<TreeElement> {
            Ok(TreeElement::from(alloc::format!("inner {}", value.id)))
        }

        fn decode(&self, _engine: &Serializer, element: &TreeElement, _previous: Option<&Inner>) -> Result<Inner> {
            let id = element.try_str()?.trim_start_matches("inner ").parse().map_err(Error::custom)?;
            Ok(Inner { id, tag: None })
        }
    }

    struct Hex;

    impl TypedAdapter<u64> for Hex {
        fn encode(&self, _engine: &Serializer, value: &u64) -> Result<TreeElement> {
            Ok(TreeElement::from(alloc::format!("{value:x}")))
        }

        fn decode(&self, _engine: &Serializer, element: &TreeElement, _previous: Option<&u64>) -> Result<u64> {
            u64::from_str_radix(element.try_str()?, 16).map_err(Error::custom)
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Masks {
        plain: u64,
        mask: u64,
    }

    crate::impl_record!(Masks { plain, mask @ [Annotation::new("hex")] });

    #[test]
    fn test_annotations_reach_factories() {
        let engine = Serializer::builder()
            .without_default_factories()
            .factory(|_: &Serializer, ty: &TypeDescriptor, annotations: &[Annotation]| -> Option<AdapterRef> {
                (ty.is::<u64>() && Annotation::find(annotations, "hex").is_some())
                    .then(|| Typed::<_, u64>::shared(Hex))
            })
            .factory(crate::factories::NumberFactory)
            .build();
        let masks = Masks { plain: 255, mask: 255 };
        let tree = engine.to_tree(&masks).unwrap();
        assert_eq!(tree.to_string(), r#"{"plain": 255, "mask": "ff"}"#);
        assert_eq!(engine.from_tree::<Masks>(&tree).unwrap(), Some(masks));
    }

    #[test]
    fn test_no_format_configured() {
        let engine = Serializer::new();
        assert!(engine.format().is_none());
        assert_eq!(engine.to_value(&1u8).unwrap_err(), Error::NoFormatConfigured);
        assert_eq!(engine.from_value::<u8>("1").unwrap_err(), Error::NoFormatConfigured);
        let mut target = 0u8;
        assert_eq!(engine.from_value_into("1", &mut target).unwrap_err(), Error::NoFormatConfigured);
    }

    /// Renders trees with `Display`, reads nothing but `null` and integers.
    struct DebugFormat;

    impl Format for DebugFormat {
        fn extension(&self) -> &'static str {
            "txt"
        }

        fn write(&self, element: &TreeElement) -> Result<String> {
            Ok(element.to_string())
        }

        fn read(&self, text: &str) -> Result<TreeElement> {
            match text {
                "null" => Ok(TreeElement::Null),
                text => text.parse::<i64>()
                            .map(TreeElement::from)
                            .map_err(|_| Error::parse(0, "not an integer"))
            }
        }
    }

    #[test]
    fn test_value_level_calls_compose_with_format() {
        let engine = Serializer::with_format(DebugFormat);
        assert_eq!(engine.format().map(|format| format.extension()), Some("txt"));
        assert_eq!(engine.to_value(&vec![1u8, 2]).unwrap(), "[1, 2]");
        assert_eq!(engine.to_value_with(None, &TypeDescriptor::of::<u8>()).unwrap(), "null");
        assert_eq!(engine.from_value::<i8>("-4").unwrap(), Some(-4));
        assert_eq!(engine.from_value::<i8>("null").unwrap(), None);
        assert_eq!(engine.from_value::<i8>("x").unwrap_err(), Error::parse(0, "not an integer"));
        let mut target = 1u32;
        engine.from_value_into("3", &mut target).unwrap();
        assert_eq!(target, 3);
    }

    #[test]
    fn test_erased_value_mismatch() {
        let engine = Serializer::new();
        let adapter = engine.get_adapter(&TypeDescriptor::of::<String>(), &[]).unwrap();
        assert!(matches!(adapter.encode(&engine, &1u8), Err(Error::ValueMismatch { .. })));
        assert_eq!(downcast_ref::<u8>(&1u8), Ok(&1));
    }
}
