//! Custom adapters: a registered one for a whole type and a factory reacting
//! to a field annotation.
use std::net::Ipv4Addr;

use uniser::adapter::TypedAdapter;
use uniser::reflect::{Annotation, TypeDescriptor};
use uniser::{impl_record, AdapterRef, Reflect, Serializer, TreeElement, Typed};
use uniser_json::JsonFormat;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Addr(Ipv4Addr);

impl Default for Addr {
    fn default() -> Self {
        Addr(Ipv4Addr::UNSPECIFIED)
    }
}

impl Reflect for Addr {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::opaque::<Addr>()
    }
}

/// Dotted quad strings.
struct AddrAdapter;

impl TypedAdapter<Addr> for AddrAdapter {
    fn encode(&self, _engine: &Serializer, value: &Addr) -> uniser::Result<TreeElement> {
        Ok(value.0.to_string().into())
    }

    fn decode(&self, _engine: &Serializer, element: &TreeElement, _previous: Option<&Addr>)
        -> uniser::Result<Addr>
    {
        element.try_str()?.parse().map(Addr).map_err(uniser::Error::custom)
    }
}

/// Hex strings, for `u32` fields annotated with `hex`.
struct Hex;

impl TypedAdapter<u32> for Hex {
    fn encode(&self, _engine: &Serializer, value: &u32) -> uniser::Result<TreeElement> {
        Ok(format!("{value:#010x}").into())
    }

    fn decode(&self, _engine: &Serializer, element: &TreeElement, _previous: Option<&u32>)
        -> uniser::Result<u32>
    {
        let text = element.try_str()?;
        u32::from_str_radix(text.trim_start_matches("0x"), 16).map_err(uniser::Error::custom)
    }
}

fn hex_factory(_: &Serializer, ty: &TypeDescriptor, annotations: &[Annotation]) -> Option<AdapterRef> {
    (ty.is::<u32>() && Annotation::find(annotations, "hex").is_some())
        .then(|| Typed::<_, u32>::shared(Hex))
}

#[derive(Debug, Default, PartialEq)]
struct Route {
    gateway: Addr,
    flags: u32,
    metric: u32,
}

impl_record!(Route { gateway, flags @ [Annotation::new("hex")], metric });

fn main() -> uniser::Result<()> {
    let mut serializer = Serializer::with_format(JsonFormat::pretty());
    serializer.register_adapter::<Addr, _>(AddrAdapter);
    // numbers are claimed by a default factory, so go first
    serializer.insert_type_adapter_factory(0, hex_factory);

    let route = Route { gateway: Addr(Ipv4Addr::new(10, 0, 0, 1)), flags: 0x8001, metric: 20 };
    let text = serializer.to_value(&route)?;
    println!("{text}");

    let back = serializer.from_value::<Route>(&text)?;
    assert_eq!(back, Some(route));
    Ok(())
}
