//! JSON text format for the [`uniser`] tree serializer.
/*!

[`JsonFormat`] plugs into a [`Serializer`] and renders trees as JSON text:

| Tree node             | JSON
|-----------------------|--------------------
| `Null`                | `null`
| string primitive      | `string`
| boolean primitive     | `true`, `false`
| `PosInt`, `NegInt`    | integer `number`
| `Float`               | `number` with a fraction or an exponent, `null` when not finite
| `Object`              | `object`, members in insertion order
| `Array`               | `array`

JSON numbers without a fraction or an exponent are read back as integers when
they fit in 64 bits, and all other numbers as floats.

```
use uniser::{impl_record, Serializer};
use uniser_json::JsonFormat;

#[derive(Debug, Default, PartialEq)]
struct Entry { id: u32, tags: Vec<String> }

impl_record!(Entry { id, tags });

let serializer = Serializer::with_format(JsonFormat::compact());
let entry = Entry { id: 7, tags: vec!["a".into(), "b".into()] };
let text = serializer.to_value(&entry).unwrap();
assert_eq!(text, r#"{"id":7,"tags":["a","b"]}"#);
assert_eq!(serializer.from_value::<Entry>(&text).unwrap(), Some(entry));

let pretty = Serializer::with_format(JsonFormat::pretty());
assert_eq!(pretty.to_value(&vec![1, 2]).unwrap(), "[\n\t1,\n\t2\n]");
```

The writer renders to any [`SerWrite`] sink, so trees can also be written into
fixed buffers with [`to_writer`] or [`to_slice`].

[`Serializer`]: uniser::Serializer
*/
#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

pub mod ser;
pub mod de;

use alloc::borrow::Cow;
use alloc::string::String;

use uniser::{Format, TreeElement};

pub use uniser;
pub use uniser::SerWrite;

pub use ser::{
    to_slice,
    to_string,
    to_string_pretty,
    to_string_with_indent,
    to_writer,
    to_writer_pretty,
    to_writer_with_indent,
    DEFAULT_INDENT,
};
pub use de::{
    from_slice,
    from_slice_with_max_depth,
    from_str,
    from_str_with_max_depth,
    DEFAULT_MAX_DEPTH,
};

/// The JSON [`Format`].
///
/// Compact by default. The pretty layout puts every member of a non-empty
/// container on its own line. Reading gives up on containers nested deeper
/// than [`DEFAULT_MAX_DEPTH`], unless configured otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFormat {
    indent: Option<Cow<'static, str>>,
    max_depth: usize,
}

impl Default for JsonFormat {
    fn default() -> Self {
        JsonFormat::compact()
    }
}

impl JsonFormat {
    /// The compact layout, with no whitespace.
    pub fn compact() -> Self {
        JsonFormat { indent: None, max_depth: DEFAULT_MAX_DEPTH }
    }

    /// The pretty layout, indented with tabs.
    pub fn pretty() -> Self {
        JsonFormat::with_indent(DEFAULT_INDENT)
    }

    /// The pretty layout, indented with `indent`.
    pub fn with_indent<S: Into<Cow<'static, str>>>(indent: S) -> Self {
        JsonFormat { indent: Some(indent.into()), max_depth: DEFAULT_MAX_DEPTH }
    }

    /// Limit nesting of arrays and objects when reading.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn is_pretty(&self) -> bool {
        self.indent.is_some()
    }

    pub fn indent(&self) -> Option<&str> {
        self.indent.as_deref()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Format for JsonFormat {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn write(&self, element: &TreeElement) -> uniser::Result<String> {
        let text = match self.indent() {
            Some(indent) => to_string_with_indent(element, indent)?,
            None => to_string(element)?
        };
        Ok(text)
    }

    fn read(&self, text: &str) -> uniser::Result<TreeElement> {
        Ok(from_str_with_max_depth(text, self.max_depth)?)
    }
}
