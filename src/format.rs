//! The seam between the engine and a textual format.
use alloc::string::String;

use crate::error::Result;
use crate::tree::TreeElement;

/// Renders trees to text and parses text into trees.
///
/// A format knows nothing about the engine and works on trees alone.
pub trait Format {
    /// The file extension of documents in this format, without the dot.
    fn extension(&self) -> &'static str;
    /// Render `element` to text.
    fn write(&self, element: &TreeElement) -> Result<String>;
    /// Parse text into a tree, failing with [`Error::Parse`](crate::Error::Parse).
    fn read(&self, text: &str) -> Result<TreeElement>;
}

impl<F: Format + ?Sized> Format for &F {
    fn extension(&self) -> &'static str {
        (**self).extension()
    }

    fn write(&self, element: &TreeElement) -> Result<String> {
        (**self).write(element)
    }

    fn read(&self, text: &str) -> Result<TreeElement> {
        (**self).read(text)
    }
}
