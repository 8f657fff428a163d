//! The intermediate tree exchanged between the engine and formats.
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use foldhash::fast::FixedState;
use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::number::Number;

type Entries = IndexMap<String, TreeElement, FixedState>;

/// Kind of a tree node, as reported in errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Null,
    String,
    Bool,
    Number,
    Object,
    Array,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            ElementKind::Null => "null",
            ElementKind::String => "string",
            ElementKind::Bool => "boolean",
            ElementKind::Number => "number",
            ElementKind::Object => "object",
            ElementKind::Array => "array",
        })
    }
}

/// A node of the intermediate tree.
///
/// `Display` renders a debugging aid, use a [`Format`](crate::Format) for interchange.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TreeElement {
    /// Absence of a value
    #[default]
    Null,
    Primitive(Primitive),
    Object(TreeObject),
    Array(TreeArray),
}

/// A string, a boolean or a number.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    String(String),
    Bool(bool),
    Number(Number),
}

/// An insertion ordered mapping of string keys to tree nodes.
///
/// Inserting an existing key replaces its value and keeps its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeObject {
    entries: Entries,
}

/// An ordered sequence of tree nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeArray {
    elements: Vec<TreeElement>,
}

impl Primitive {
    pub fn kind(&self) -> ElementKind {
        match self {
            Primitive::String(_) => ElementKind::String,
            Primitive::Bool(_) => ElementKind::Bool,
            Primitive::Number(_) => ElementKind::Number,
        }
    }

    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, Primitive::String(_))
    }

    #[inline]
    pub fn is_bool(&self) -> bool {
        matches!(self, Primitive::Bool(_))
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self, Primitive::Number(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Primitive::String(s) => Some(s),
            _ => None
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Primitive::Bool(b) => Some(b),
            _ => None
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match *self {
            Primitive::Number(n) => Some(n),
            _ => None
        }
    }

    /// Return the held string or fail with [`Error::TypeMismatch`].
    pub fn try_str(&self) -> Result<&str> {
        self.as_str().ok_or_else(|| self.mismatch(ElementKind::String))
    }

    /// Return the held boolean or fail with [`Error::TypeMismatch`].
    pub fn try_bool(&self) -> Result<bool> {
        self.as_bool().ok_or_else(|| self.mismatch(ElementKind::Bool))
    }

    /// Return the held number or fail with [`Error::TypeMismatch`].
    pub fn try_number(&self) -> Result<Number> {
        self.as_number().ok_or_else(|| self.mismatch(ElementKind::Number))
    }

    fn mismatch(&self, expected: ElementKind) -> Error {
        Error::TypeMismatch { expected, found: self.kind() }
    }
}

impl TreeElement {
    pub fn kind(&self) -> ElementKind {
        match self {
            TreeElement::Null => ElementKind::Null,
            TreeElement::Primitive(p) => p.kind(),
            TreeElement::Object(_) => ElementKind::Object,
            TreeElement::Array(_) => ElementKind::Array,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, TreeElement::Null)
    }

    #[inline]
    pub fn is_primitive(&self) -> bool {
        matches!(self, TreeElement::Primitive(_))
    }

    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, TreeElement::Object(_))
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, TreeElement::Array(_))
    }

    /// `true` if this is a primitive holding a string
    pub fn is_string(&self) -> bool {
        self.as_primitive().is_some_and(Primitive::is_string)
    }

    /// `true` if this is a primitive holding a boolean
    pub fn is_bool(&self) -> bool {
        self.as_primitive().is_some_and(Primitive::is_bool)
    }

    /// `true` if this is a primitive holding a number
    pub fn is_number(&self) -> bool {
        self.as_primitive().is_some_and(Primitive::is_number)
    }

    pub fn as_primitive(&self) -> Option<&Primitive> {
        match self {
            TreeElement::Primitive(p) => Some(p),
            _ => None
        }
    }

    pub fn as_object(&self) -> Option<&TreeObject> {
        match self {
            TreeElement::Object(o) => Some(o),
            _ => None
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut TreeObject> {
        match self {
            TreeElement::Object(o) => Some(o),
            _ => None
        }
    }

    pub fn as_array(&self) -> Option<&TreeArray> {
        match self {
            TreeElement::Array(a) => Some(a),
            _ => None
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut TreeArray> {
        match self {
            TreeElement::Array(a) => Some(a),
            _ => None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_primitive().and_then(Primitive::as_str)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_primitive().and_then(Primitive::as_bool)
    }

    pub fn as_number(&self) -> Option<Number> {
        self.as_primitive().and_then(Primitive::as_number)
    }

    /// Narrow to a primitive or fail with [`Error::TypeMismatch`].
    pub fn try_primitive(&self) -> Result<&Primitive> {
        match self {
            TreeElement::Primitive(p) => Ok(p),
            // any primitive would do, report a string as the expected kind
            other => Err(other.mismatch(ElementKind::String))
        }
    }

    /// Narrow to an object or fail with [`Error::TypeMismatch`].
    pub fn try_object(&self) -> Result<&TreeObject> {
        self.as_object().ok_or_else(|| self.mismatch(ElementKind::Object))
    }

    /// Narrow to a mutable object or fail with [`Error::TypeMismatch`].
    pub fn try_object_mut(&mut self) -> Result<&mut TreeObject> {
        let found = self.kind();
        self.as_object_mut().ok_or(Error::TypeMismatch { expected: ElementKind::Object, found })
    }

    /// Narrow to an array or fail with [`Error::TypeMismatch`].
    pub fn try_array(&self) -> Result<&TreeArray> {
        self.as_array().ok_or_else(|| self.mismatch(ElementKind::Array))
    }

    /// Narrow to a mutable array or fail with [`Error::TypeMismatch`].
    pub fn try_array_mut(&mut self) -> Result<&mut TreeArray> {
        let found = self.kind();
        self.as_array_mut().ok_or(Error::TypeMismatch { expected: ElementKind::Array, found })
    }

    /// Narrow to a string primitive or fail with [`Error::TypeMismatch`].
    pub fn try_str(&self) -> Result<&str> {
        self.as_str().ok_or_else(|| self.mismatch(ElementKind::String))
    }

    /// Narrow to a boolean primitive or fail with [`Error::TypeMismatch`].
    pub fn try_bool(&self) -> Result<bool> {
        self.as_bool().ok_or_else(|| self.mismatch(ElementKind::Bool))
    }

    /// Narrow to a number primitive or fail with [`Error::TypeMismatch`].
    pub fn try_number(&self) -> Result<Number> {
        self.as_number().ok_or_else(|| self.mismatch(ElementKind::Number))
    }

    fn mismatch(&self, expected: ElementKind) -> Error {
        Error::TypeMismatch { expected, found: self.kind() }
    }
}

impl TreeObject {
    pub fn new() -> Self {
        TreeObject { entries: Entries::default() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        TreeObject { entries: Entries::with_capacity_and_hasher(capacity, FixedState::default()) }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&TreeElement> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut TreeElement> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert an entry, returning the replaced value if the key existed.
    pub fn insert<K, V>(&mut self, key: K, value: V) -> Option<TreeElement>
        where K: Into<String>, V: Into<TreeElement>
    {
        self.entries.insert(key.into(), value.into())
    }

    /// Remove an entry preserving the order of the remaining ones.
    pub fn remove(&mut self, key: &str) -> Option<TreeElement> {
        self.entries.shift_remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, TreeElement> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, String, TreeElement> {
        self.entries.iter_mut()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, TreeElement> {
        self.entries.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, TreeElement> {
        self.entries.values()
    }
}

impl TreeArray {
    pub fn new() -> Self {
        TreeArray { elements: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        TreeArray { elements: Vec::with_capacity(capacity) }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TreeElement> {
        self.elements.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut TreeElement> {
        self.elements.get_mut(index)
    }

    pub fn push<V: Into<TreeElement>>(&mut self, value: V) {
        self.elements.push(value.into())
    }

    /// Insert at `index`, shifting later elements.
    ///
    /// __Panics__ if `index > len`.
    pub fn insert<V: Into<TreeElement>>(&mut self, index: usize, value: V) {
        self.elements.insert(index, value.into())
    }

    /// Replace the element at `index`, returning the previous one,
    /// or `None` if `index` is out of bounds.
    pub fn set<V: Into<TreeElement>>(&mut self, index: usize, value: V) -> Option<TreeElement> {
        self.elements.get_mut(index).map(|slot| core::mem::replace(slot, value.into()))
    }

    /// Remove the element at `index`, or return `None` if out of bounds.
    pub fn remove(&mut self, index: usize) -> Option<TreeElement> {
        (index < self.elements.len()).then(|| self.elements.remove(index))
    }

    pub fn contains(&self, value: &TreeElement) -> bool {
        self.elements.contains(value)
    }

    pub fn clear(&mut self) {
        self.elements.clear()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, TreeElement> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, TreeElement> {
        self.elements.iter_mut()
    }

    pub fn as_slice(&self) -> &[TreeElement] {
        &self.elements
    }
}

impl<'a> IntoIterator for &'a TreeObject {
    type Item = (&'a String, &'a TreeElement);
    type IntoIter = indexmap::map::Iter<'a, String, TreeElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for TreeObject {
    type Item = (String, TreeElement);
    type IntoIter = indexmap::map::IntoIter<String, TreeElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<TreeElement>> FromIterator<(K, V)> for TreeObject {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut object = TreeObject::new();
        for (key, value) in iter {
            object.insert(key, value);
        }
        object
    }
}

impl<'a> IntoIterator for &'a TreeArray {
    type Item = &'a TreeElement;
    type IntoIter = core::slice::Iter<'a, TreeElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl IntoIterator for TreeArray {
    type Item = TreeElement;
    type IntoIter = alloc::vec::IntoIter<TreeElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<V: Into<TreeElement>> FromIterator<V> for TreeArray {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        TreeArray { elements: iter.into_iter().map(Into::into).collect() }
    }
}

impl From<Vec<TreeElement>> for TreeArray {
    fn from(elements: Vec<TreeElement>) -> Self {
        TreeArray { elements }
    }
}

impl From<String> for Primitive {
    fn from(v: String) -> Self {
        Primitive::String(v)
    }
}

impl From<&str> for Primitive {
    fn from(v: &str) -> Self {
        Primitive::String(v.into())
    }
}

impl From<bool> for Primitive {
    fn from(v: bool) -> Self {
        Primitive::Bool(v)
    }
}

impl From<Number> for Primitive {
    fn from(v: Number) -> Self {
        Primitive::Number(v)
    }
}

impl From<Primitive> for TreeElement {
    fn from(v: Primitive) -> Self {
        TreeElement::Primitive(v)
    }
}

impl From<TreeObject> for TreeElement {
    fn from(v: TreeObject) -> Self {
        TreeElement::Object(v)
    }
}

impl From<TreeArray> for TreeElement {
    fn from(v: TreeArray) -> Self {
        TreeElement::Array(v)
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty),*) => {$(
        impl From<$ty> for TreeElement {
            #[inline]
            fn from(v: $ty) -> Self {
                TreeElement::Primitive(v.into())
            }
        }
    )*};
}

macro_rules! impl_from_number {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Primitive {
            #[inline]
            fn from(v: $ty) -> Self {
                Primitive::Number(v.into())
            }
        }
    )*};
}

impl_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);
impl_from_scalar!(String, &str, bool, Number,
                  i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::String(s) => fmt::Debug::fmt(s, f),
            Primitive::Bool(b) => fmt::Display::fmt(b, f),
            Primitive::Number(n) => fmt::Display::fmt(n, f),
        }
    }
}

impl fmt::Display for TreeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:?}: {}", key, value)?;
        }
        f.write_str("}")
    }
}

impl fmt::Display for TreeArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            fmt::Display::fmt(value, f)?;
        }
        f.write_str("]")
    }
}

impl fmt::Display for TreeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeElement::Null => f.write_str("null"),
            TreeElement::Primitive(p) => fmt::Display::fmt(p, f),
            TreeElement::Object(o) => fmt::Display::fmt(o, f),
            TreeElement::Array(a) => fmt::Display::fmt(a, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;
    use super::*;

    fn sample() -> TreeObject {
        let mut root = TreeObject::new();
        root.insert("a", 1);
        root.insert("b", "x");
        root.insert("c", [TreeElement::from(true), TreeElement::Null, TreeElement::from(3.5)]
                         .into_iter().collect::<TreeArray>());
        root.insert("d", [("e", "f")].into_iter().collect::<TreeObject>());
        root
    }

    #[test]
    fn test_primitive_exclusive() {
        let s = Primitive::from("1");
        assert!(s.is_string() && !s.is_number() && !s.is_bool());
        assert_eq!(s.as_number(), None);
        assert_eq!(s.try_bool(), Err(Error::TypeMismatch {
            expected: ElementKind::Bool, found: ElementKind::String }));
        assert_ne!(Primitive::from("1"), Primitive::from(1));
        assert_ne!(Primitive::from(true), Primitive::from(1));
        assert_eq!(Primitive::from(1u8), Primitive::from(1i64));
    }

    #[test]
    fn test_narrowing() {
        let tree = TreeElement::from(sample());
        assert!(tree.is_object());
        let object = tree.try_object().unwrap();
        assert_eq!(object.len(), 4);
        assert!(object.get("a").unwrap().is_number());
        assert_eq!(object.get("b").unwrap().try_str(), Ok("x"));
        assert_eq!(object.get("c").unwrap().try_array().unwrap().len(), 3);
        assert_eq!(tree.try_array(), Err(Error::TypeMismatch {
            expected: ElementKind::Array, found: ElementKind::Object }));
        assert_eq!(TreeElement::Null.try_primitive().unwrap_err(), Error::TypeMismatch {
            expected: ElementKind::String, found: ElementKind::Null });
        assert!(TreeElement::Null.as_str().is_none());
        assert_eq!(TreeElement::from(false).try_bool(), Ok(false));
        assert_eq!(TreeElement::from(-2).try_number(), Ok(Number::NegInt(-2)));
    }

    #[test]
    fn test_object_order_and_last_write_wins() {
        let mut object = sample();
        assert_eq!(object.insert("a", "replaced"), Some(TreeElement::from(1)));
        let keys: Vec<_> = object.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "b", "c", "d"]);
        assert_eq!(object.get("a"), Some(&TreeElement::from("replaced")));
        assert_eq!(object.remove("b"), Some(TreeElement::from("x")));
        let keys: Vec<_> = object.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "c", "d"]);
        assert!(!object.contains_key("b"));
        assert_eq!(object.remove("b"), None);
    }

    #[test]
    fn test_array_ops() {
        let mut array = TreeArray::new();
        array.push(1);
        array.push(1);
        array.push("two");
        array.insert(0, TreeElement::Null);
        assert_eq!(array.len(), 4);
        assert!(array.contains(&TreeElement::from("two")));
        assert_eq!(array.set(1, false), Some(TreeElement::from(1)));
        assert_eq!(array.set(9, false), None);
        assert_eq!(array.remove(0), Some(TreeElement::Null));
        assert_eq!(array.remove(9), None);
        assert_eq!(array.as_slice(), &[TreeElement::from(false), TreeElement::from(1), TreeElement::from("two")]);
        let collected: TreeArray = vec![TreeElement::from(1), TreeElement::from(1)].into();
        assert_eq!(collected.len(), 2);
    }

    #[test]
    fn test_display_is_debug_oriented() {
        let tree = TreeElement::from(sample());
        assert_eq!(tree.to_string(), r#"{"a": 1, "b": "x", "c": [true, null, 3.5], "d": {"e": "f"}}"#);
        assert_eq!(TreeElement::from(TreeObject::new()).to_string(), "{}");
    }
}
