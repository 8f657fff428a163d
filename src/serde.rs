//! Serde support for the tree types.
//!
//! Trees serialize as the self-describing data they hold and deserialize from
//! any self-describing format, so they can be exchanged with other serde formats.
use alloc::string::String;
use core::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::number::Number;
use crate::tree::{Primitive, TreeArray, TreeElement, TreeObject};

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Number::PosInt(n) => serializer.serialize_u64(n),
            Number::NegInt(n) => serializer.serialize_i64(n),
            Number::Float(f) => serializer.serialize_f64(f),
        }
    }
}

impl Serialize for Primitive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Primitive::String(s) => serializer.serialize_str(s),
            Primitive::Bool(b) => serializer.serialize_bool(*b),
            Primitive::Number(n) => n.serialize(serializer),
        }
    }
}

impl Serialize for TreeObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for TreeArray {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for value in self {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

impl Serialize for TreeElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TreeElement::Null => serializer.serialize_unit(),
            TreeElement::Primitive(p) => p.serialize(serializer),
            TreeElement::Object(o) => o.serialize(serializer),
            TreeElement::Array(a) => a.serialize(serializer),
        }
    }
}

struct TreeVisitor;

impl<'de> Visitor<'de> for TreeVisitor {
    type Value = TreeElement;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any self-describing value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(v.into())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(v.into())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(v.into())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(v.into())
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(v.into())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(v.into())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(TreeElement::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(TreeElement::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        TreeElement::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut array = TreeArray::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(value) = access.next_element::<TreeElement>()? {
            array.push(value);
        }
        Ok(array.into())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut object = TreeObject::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, TreeElement>()? {
            object.insert(key, value);
        }
        Ok(object.into())
    }
}

impl<'de> Deserialize<'de> for TreeElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TreeVisitor)
    }
}

impl<'de> Deserialize<'de> for TreeObject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match TreeElement::deserialize(deserializer)? {
            TreeElement::Object(object) => Ok(object),
            other => Err(de::Error::custom(format_args!("expected an object, found {}", other.kind())))
        }
    }
}

impl<'de> Deserialize<'de> for TreeArray {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match TreeElement::deserialize(deserializer)? {
            TreeElement::Array(array) => Ok(array),
            other => Err(de::Error::custom(format_args!("expected an array, found {}", other.kind())))
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec::Vec;
    use super::*;

    #[test]
    fn test_serde_json_round_trip() {
        let text = r#"{"a":1,"b":"x","c":[true,null,3.5,-7],"d":{"e":"f"}}"#;
        let tree: TreeElement = serde_json::from_str(text).unwrap();
        let object = tree.try_object().unwrap();
        let keys: Vec<_> = object.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "b", "c", "d"]);
        assert_eq!(object.get("c").unwrap().try_array().unwrap().get(3),
                   Some(&TreeElement::from(Number::NegInt(-7))));
        assert_eq!(serde_json::to_string(&tree).unwrap(), text);
    }

    #[test]
    fn test_serde_narrowed_containers() {
        let array: TreeArray = serde_json::from_str("[1,2]").unwrap();
        assert_eq!(array.len(), 2);
        let err = serde_json::from_str::<TreeObject>("[1,2]").unwrap_err();
        assert!(err.to_string().starts_with("expected an object, found array"));
        let object: TreeObject = serde_json::from_str("{}").unwrap();
        assert!(object.is_empty());
    }
}
