//! JSON writer for trees.
use alloc::{string::String, vec::Vec};

use uniser::{Number, Primitive, SerError, SerWrite, SliceWriter, TreeArray, TreeElement, TreeObject};

/// The indentation unit of the pretty layout.
pub const DEFAULT_INDENT: &str = "\t";

/// Render `element` as compact JSON text.
pub fn to_string(element: &TreeElement) -> Result<String, SerError> {
    let mut vec = Vec::new();
    to_writer(&mut vec, element)?;
    // SAFETY: only whole `str` slices and ASCII bytes are ever written
    Ok(unsafe { String::from_utf8_unchecked(vec) })
}

/// Render `element` as pretty JSON text, indented with tabs.
pub fn to_string_pretty(element: &TreeElement) -> Result<String, SerError> {
    to_string_with_indent(element, DEFAULT_INDENT)
}

/// Render `element` as pretty JSON text, indented with `indent`.
pub fn to_string_with_indent(element: &TreeElement, indent: &str) -> Result<String, SerError> {
    let mut vec = Vec::new();
    to_writer_with_indent(&mut vec, element, indent)?;
    // SAFETY: `indent` is a `str` too
    Ok(unsafe { String::from_utf8_unchecked(vec) })
}

/// Write `element` as compact JSON text to the provided writer.
pub fn to_writer<W: SerWrite>(writer: W, element: &TreeElement) -> Result<(), W::Error> {
    Writer::new(writer).write_element(element)
}

/// Render `element` as compact JSON text into `buf` and return the rendered part.
pub fn to_slice<'a>(buf: &'a mut [u8], element: &TreeElement) -> Result<&'a str, SerError> {
    let mut writer = SliceWriter::new(buf);
    to_writer(&mut writer, element)?;
    let (text, _) = writer.split();
    // SAFETY: only whole `str` slices and ASCII bytes are ever written
    Ok(unsafe { core::str::from_utf8_unchecked(text) })
}

/// Write `element` as pretty JSON text, indented with tabs, to the provided writer.
pub fn to_writer_pretty<W: SerWrite>(writer: W, element: &TreeElement) -> Result<(), W::Error> {
    Writer::pretty(writer).write_element(element)
}

/// Write `element` as pretty JSON text, indented with `indent`, to the provided writer.
pub fn to_writer_with_indent<W: SerWrite>(writer: W, element: &TreeElement, indent: &str)
    -> Result<(), W::Error>
{
    Writer::with_indent(writer, indent).write_element(element)
}

/// JSON tree writer.
///
/// In the compact layout no whitespace is emitted. In the pretty layout every
/// member of a non-empty container starts on its own line, indented once per
/// nesting level, and keys are followed by `": "`. Empty containers are
/// always written as `{}` and `[]`.
///
/// Strings are escaped the same way in both layouts: `"` and `\` get a backslash,
/// control characters become `\b`, `\t`, `\n`, `\f`, `\r` or `\u00xx` (lower case hex),
/// and anything else is written verbatim.
pub struct Writer<'i, W> {
    output: W,
    indent: Option<&'i str>,
    depth: usize,
}

impl<W> Writer<'static, W> {
    /// Create a writer of the compact layout.
    pub fn new(output: W) -> Self {
        Writer { output, indent: None, depth: 0 }
    }

    /// Create a writer of the pretty layout, indented with tabs.
    pub fn pretty(output: W) -> Self {
        Writer { output, indent: Some(DEFAULT_INDENT), depth: 0 }
    }
}

impl<'i, W> Writer<'i, W> {
    /// Create a writer of the pretty layout, indented with `indent`.
    pub fn with_indent(output: W, indent: &'i str) -> Self {
        Writer { output, indent: Some(indent), depth: 0 }
    }

    pub fn is_pretty(&self) -> bool {
        self.indent.is_some()
    }

    /// Destruct self returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.output
    }
}

impl<W: SerWrite> Writer<'_, W> {
    /// Write a single tree node with all of its descendants.
    pub fn write_element(&mut self, element: &TreeElement) -> Result<(), W::Error> {
        match element {
            TreeElement::Null => self.output.write(b"null"),
            TreeElement::Primitive(primitive) => self.write_primitive(primitive),
            TreeElement::Object(object) => self.write_object(object),
            TreeElement::Array(array) => self.write_array(array),
        }
    }

    pub fn write_primitive(&mut self, primitive: &Primitive) -> Result<(), W::Error> {
        match primitive {
            Primitive::String(s) => self.write_string(s),
            Primitive::Bool(true) => self.output.write(b"true"),
            Primitive::Bool(false) => self.output.write(b"false"),
            Primitive::Number(number) => self.write_number(*number),
        }
    }

    /// Write a number.
    ///
    /// Floats that would print as integers get a `.0` suffix, so they are read
    /// back as floats. Non-finite floats have no JSON form and are written as `null`.
    pub fn write_number(&mut self, number: Number) -> Result<(), W::Error> {
        match number {
            Number::PosInt(n) => write_unsigned(&mut self.output, n),
            Number::NegInt(n) => {
                if n < 0 {
                    self.output.write_byte(b'-')?;
                }
                write_unsigned(&mut self.output, n.unsigned_abs())
            }
            Number::Float(v) if v.is_finite() => {
                let mut buffer = ryu_js::Buffer::new();
                let s = buffer.format_finite(v);
                self.output.write_str(s)?;
                if !s.bytes().any(|b| matches!(b, b'.'|b'e'|b'E')) {
                    self.output.write(b".0")?;
                }
                Ok(())
            }
            Number::Float(v) => {
                log::debug!("non-finite number {v} written as null");
                self.output.write(b"null")
            }
        }
    }

    /// Write a quoted and escaped string.
    pub fn write_string(&mut self, value: &str) -> Result<(), W::Error> {
        self.output.write_byte(b'"')?;
        format_escaped_str_contents(&mut self.output, value)?;
        self.output.write_byte(b'"')
    }

    fn write_object(&mut self, object: &TreeObject) -> Result<(), W::Error> {
        if object.is_empty() {
            return self.output.write(b"{}")
        }
        self.output.write_byte(b'{')?;
        self.depth += 1;
        for (index, (key, value)) in object.iter().enumerate() {
            if index != 0 {
                self.output.write_byte(b',')?;
            }
            self.write_line_break()?;
            self.write_string(key)?;
            if self.is_pretty() {
                self.output.write(b": ")?;
            }
            else {
                self.output.write_byte(b':')?;
            }
            self.write_element(value)?;
        }
        self.depth -= 1;
        self.write_line_break()?;
        self.output.write_byte(b'}')
    }

    fn write_array(&mut self, array: &TreeArray) -> Result<(), W::Error> {
        if array.is_empty() {
            return self.output.write(b"[]")
        }
        self.output.write_byte(b'[')?;
        self.depth += 1;
        for (index, value) in array.iter().enumerate() {
            if index != 0 {
                self.output.write_byte(b',')?;
            }
            self.write_line_break()?;
            self.write_element(value)?;
        }
        self.depth -= 1;
        self.write_line_break()?;
        self.output.write_byte(b']')
    }

    fn write_line_break(&mut self) -> Result<(), W::Error> {
        if let Some(indent) = self.indent {
            self.output.write_byte(b'\n')?;
            for _ in 0..self.depth {
                self.output.write_str(indent)?;
            }
        }
        Ok(())
    }
}

fn write_unsigned<W: SerWrite>(output: &mut W, mut n: u64) -> Result<(), W::Error> {
    // u64::MAX has 20 digits
    let mut buf = [0u8; 20];
    let mut pos = buf.len();
    loop {
        pos -= 1;
        buf[pos] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break
        }
    }
    output.write(&buf[pos..])
}

#[inline(always)]
fn hex_4bit(c: u8) -> u8 {
    if c <= 9 {
        0x30 + c
    } else {
        0x61 + (c - 10)
    }
}

/// Lower case hex for value in 0..256, encoded as ASCII bytes
#[inline(always)]
fn hex(c: u8) -> [u8;2] {
    [hex_4bit(c >> 4), hex_4bit(c & 0x0F)]
}

fn format_escaped_str_contents<W>(
    writer: &mut W,
    value: &str,
) -> Result<(), W::Error>
    where W: ?Sized + SerWrite
{
    let bytes = value.as_bytes();

    let mut start = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        let escape = match byte {
            0x00..=0x1F => ESCAPE[byte as usize],
            QU|BS => byte,
            _ => continue
        };

        if start < i {
            writer.write_str(&value[start..i])?;
        }

        if escape == UU {
            writer.write(b"\\u00")?;
            writer.write(&hex(byte))?;
        }
        else {
            writer.write(&[b'\\', escape])?;
        }

        start = i + 1;
    }

    if start == bytes.len() {
        return Ok(());
    }

    writer.write_str(&value[start..])
}

const BB: u8 = b'b'; // \x08
const TT: u8 = b't'; // \x09
const NN: u8 = b'n'; // \x0A
const FF: u8 = b'f'; // \x0C
const RR: u8 = b'r'; // \x0D
const QU: u8 = b'"'; // \x22
const BS: u8 = b'\\'; // \x5C
const UU: u8 = b'u'; // \x00...\x1F except the ones above

// Lookup table of escape sequences. A value of b'x' at index i means that byte
// i is escaped as "\x" in JSON.
static ESCAPE: [u8; 32] = [
    //   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
    UU, UU, UU, UU, UU, UU, UU, UU, BB, TT, NN, UU, FF, RR, UU, UU, // 0
    UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, // 1
];

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeElement {
        let mut d = TreeObject::new();
        d.insert("e", "f");
        let c: TreeArray = [TreeElement::from(true), TreeElement::Null, 3.5.into()]
            .into_iter().collect();
        let mut root = TreeObject::new();
        root.insert("a", 1);
        root.insert("b", "x");
        root.insert("c", c);
        root.insert("d", d);
        root.into()
    }

    #[test]
    fn test_json_compact() {
        assert_eq!(to_string(&sample()).unwrap(),
                   r#"{"a":1,"b":"x","c":[true,null,3.5],"d":{"e":"f"}}"#);
        assert_eq!(to_string(&TreeElement::Null).unwrap(), "null");
        assert_eq!(to_string(&TreeObject::new().into()).unwrap(), "{}");
        assert_eq!(to_string(&TreeArray::new().into()).unwrap(), "[]");
    }

    #[test]
    fn test_json_pretty() {
        assert_eq!(to_string_pretty(&sample()).unwrap(),
                   "{\n\t\"a\": 1,\n\t\"b\": \"x\",\n\t\"c\": [\n\t\ttrue,\n\t\tnull,\n\t\t3.5\n\t],\n\t\"d\": {\n\t\t\"e\": \"f\"\n\t}\n}");
        let mut root = TreeObject::new();
        root.insert("o", TreeObject::new());
        root.insert("a", TreeArray::new());
        assert_eq!(to_string_with_indent(&root.into(), "  ").unwrap(),
                   "{\n  \"o\": {},\n  \"a\": []\n}");
        assert_eq!(to_string_pretty(&TreeArray::new().into()).unwrap(), "[]");
        assert_eq!(to_string_pretty(&"x".into()).unwrap(), r#""x""#);
    }

    #[test]
    fn test_json_numbers() {
        let numbers: TreeArray = [
            TreeElement::from(0u64), u64::MAX.into(), i64::MIN.into(), (-12).into(),
            3.14.into(), 1000.0.into(), (-0.02).into(), 1e21.into(), 5e-7.into(),
            f64::NAN.into(), f64::INFINITY.into(), f64::NEG_INFINITY.into()
        ].into_iter().collect();
        assert_eq!(to_string(&numbers.into()).unwrap(),
            "[0,18446744073709551615,-9223372036854775808,-12,3.14,1000.0,-0.02,1e+21,5e-7,null,null,null]");
    }

    #[test]
    fn test_json_escapes() {
        let text = "Quote: \" Backslash: \\ Newline:\n Tab:\t Slash:/ Unicode:☺ \x08\x0c\r\x00\x1f";
        assert_eq!(to_string(&text.into()).unwrap(),
            r#""Quote: \" Backslash: \\ Newline:\n Tab:\t Slash:/ Unicode:☺ \b\f\r\u0000\u001f""#);
        assert_eq!(to_string(&"".into()).unwrap(), r#""""#);
    }

    #[test]
    fn test_json_slice_writer() {
        let mut buf = [0u8; 8];
        let mut writer = SliceWriter::new(&mut buf);
        to_writer(&mut writer, &TreeElement::from("short")).unwrap();
        assert_eq!(writer.as_ref(), br#""short""#);
        let mut writer = SliceWriter::new(&mut buf);
        assert_eq!(to_writer(&mut writer, &TreeElement::from("too long")),
                   Err(SerError::BufferFull));
    }

    #[test]
    fn test_json_to_slice() {
        let mut buf = [0u8; 16];
        let c = sample().try_object().unwrap().get("c").cloned().unwrap();
        assert_eq!(to_slice(&mut buf, &c), Ok("[true,null,3.5]"));
        assert_eq!(to_slice(&mut buf, &"\x01\x7f".into()), Ok("\"\\u0001\x7f\""));
        assert_eq!(to_slice(&mut buf[..3], &TreeElement::Null), Err(SerError::BufferFull));
    }
}
