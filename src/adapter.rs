//! Type adapters and adapter factories.
use alloc::boxed::Box;
use alloc::rc::Rc;
use core::any::{type_name, Any};
use core::marker::PhantomData;

use crate::engine::Serializer;
use crate::error::{Error, Result};
use crate::reflect::{Annotation, TypeDescriptor};
use crate::tree::TreeElement;

/// Converts values of a single type to tree nodes and back.
///
/// Values cross this boundary type-erased. The engine guarantees that `value`
/// is of the type the adapter was resolved for and never passes an absent value
/// to `encode`. The engine is passed to every call, so an adapter of a
/// container can resolve the adapters of its items lazily.
pub trait TypeAdapter {
    /// Produce the tree node representing `value`.
    fn encode(&self, engine: &Serializer, value: &dyn Any) -> Result<TreeElement>;
    /// Produce a value from `element`.
    ///
    /// `previous` holds the current value of the slot being decoded into, if any.
    fn decode(&self, engine: &Serializer, element: &TreeElement, previous: Option<&dyn Any>)
        -> Result<Box<dyn Any>>;
}

/// A shared adapter handle, as stored in the registry and the resolution cache.
pub type AdapterRef = Rc<dyn TypeAdapter>;

/// A [`TypeAdapter`] with typed signatures.
///
/// Wrap it with [`Typed`] to register it.
pub trait TypedAdapter<T: Any> {
    fn encode(&self, engine: &Serializer, value: &T) -> Result<TreeElement>;
    fn decode(&self, engine: &Serializer, element: &TreeElement, previous: Option<&T>) -> Result<T>;
}

/// Erases the value type of a [`TypedAdapter`].
pub struct Typed<A, T> {
    adapter: A,
    marker: PhantomData<fn() -> T>,
}

impl<A, T> Typed<A, T> {
    pub fn new(adapter: A) -> Self {
        Typed { adapter, marker: PhantomData }
    }

    pub fn into_inner(self) -> A {
        self.adapter
    }
}

impl<A: TypedAdapter<T> + 'static, T: Any> Typed<A, T> {
    /// Wrap `adapter` into a shared handle.
    pub fn shared(adapter: A) -> AdapterRef {
        Rc::new(Typed::new(adapter))
    }
}

impl<A: TypedAdapter<T>, T: Any> TypeAdapter for Typed<A, T> {
    fn encode(&self, engine: &Serializer, value: &dyn Any) -> Result<TreeElement> {
        self.adapter.encode(engine, downcast_ref::<T>(value)?)
    }

    fn decode(&self, engine: &Serializer, element: &TreeElement, previous: Option<&dyn Any>)
        -> Result<Box<dyn Any>>
    {
        let previous = previous.and_then(|prev| prev.downcast_ref::<T>());
        self.adapter.decode(engine, element, previous).map(|value| Box::new(value) as Box<dyn Any>)
    }
}

/// Borrow a type-erased value as `T` or fail with [`Error::ValueMismatch`].
pub fn downcast_ref<T: Any>(value: &dyn Any) -> Result<&T> {
    value.downcast_ref::<T>().ok_or(Error::ValueMismatch { expected: type_name::<T>() })
}

/// Produces adapters on demand.
///
/// Factories are consulted in order when neither the resolution cache nor the
/// registry holds an adapter for a type, and the first one returning an adapter wins.
/// `annotations` are those of the record field being converted, if any.
pub trait TypeAdapterFactory {
    fn create_adapter(&self, engine: &Serializer, ty: &TypeDescriptor, annotations: &[Annotation])
        -> Option<AdapterRef>;
}

impl<F> TypeAdapterFactory for F
    where F: Fn(&Serializer, &TypeDescriptor, &[Annotation]) -> Option<AdapterRef>
{
    fn create_adapter(&self, engine: &Serializer, ty: &TypeDescriptor, annotations: &[Annotation])
        -> Option<AdapterRef>
    {
        self(engine, ty, annotations)
    }
}
