/// Implement [`Reflect`](crate::Reflect) for a struct with named fields.
///
/// Listed fields are visited in order. A field may be given an external name
/// with `as "name"` and annotations with `@ [..]`. Fields not listed are left
/// out of the tree.
///
/// The record is constructed with `Default` when decoded, unless `#[no_default]`
/// is given, in which case it can only be decoded into an existing instance.
///
/// ```
/// use uniser::impl_record;
/// use uniser::reflect::Annotation;
///
/// #[derive(Default)]
/// struct Config {
///     name: String,
///     retries: u32,
///     mask: u64,
///     cache: Vec<u8>,
/// }
///
/// impl_record!(Config {
///     name,
///     retries as "maxRetries",
///     mask @ [Annotation::new("hex")],
/// });
/// ```
#[macro_export]
macro_rules! impl_record {
    (#[no_default] $ty:ident { $($fields:tt)* }) => {
        $crate::__impl_record!($ty, $crate::__private::None, { $($fields)* });
    };
    ($ty:ident { $($fields:tt)* }) => {
        $crate::__impl_record!($ty,
            $crate::__private::Some(
                $crate::reflect::construct_default::<$ty> as $crate::reflect::Constructor
            ),
            { $($fields)* });
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __impl_record {
    ($ty:ident, $construct:expr, {
        $( $field:ident $(as $name:literal)? $(@ [$($ann:expr),* $(,)?])? ),* $(,)?
    }) => {
        impl $crate::reflect::Reflect for $ty {
            fn descriptor() -> $crate::reflect::TypeDescriptor {
                fn fields() -> $crate::__private::Vec<$crate::reflect::FieldInfo> {
                    $crate::__private::Vec::from([$({
                        fn descriptor() -> $crate::reflect::TypeDescriptor {
                            $crate::reflect::field_descriptor(|owner: &$ty| &owner.$field)
                        }
                        fn get(owner: &dyn $crate::__private::Any)
                            -> $crate::__private::Option<&dyn $crate::__private::Any>
                        {
                            owner.downcast_ref::<$ty>()
                                 .map(|owner| &owner.$field as &dyn $crate::__private::Any)
                        }
                        fn get_mut(owner: &mut dyn $crate::__private::Any)
                            -> $crate::__private::Option<&mut dyn $crate::__private::Any>
                        {
                            owner.downcast_mut::<$ty>()
                                 .map(|owner| &mut owner.$field as &mut dyn $crate::__private::Any)
                        }
                        fn set(owner: &mut dyn $crate::__private::Any,
                               value: $crate::__private::Box<dyn $crate::__private::Any>)
                            -> $crate::Result<()>
                        {
                            match owner.downcast_mut::<$ty>() {
                                $crate::__private::Some(owner) => {
                                    $crate::reflect::assign(&mut owner.$field, value)
                                }
                                $crate::__private::None => $crate::__private::Err(
                                    $crate::Error::ValueMismatch {
                                        expected: $crate::__private::type_name::<$ty>()
                                    })
                            }
                        }
                        const ANNOTATIONS: &[$crate::reflect::Annotation] = &[$($($ann),*)?];
                        $crate::reflect::FieldInfo::new(
                            $crate::__external_name!($field $($name)?),
                            descriptor, ANNOTATIONS, get, get_mut, set)
                    }),*])
                }
                $crate::reflect::TypeDescriptor::new::<$ty>(
                    $crate::reflect::TypeKind::Record(
                        $crate::reflect::RecordInfo::new(fields, $construct)))
            }
        }
    };
}

/// Implement [`Reflect`](crate::Reflect) for a field-less enum.
///
/// Every case must be listed. A case may be given an external name with `as "name"`.
///
/// ```
/// use uniser::{impl_enum, Serializer, TreeElement};
///
/// #[derive(Debug, PartialEq)]
/// enum Level { Low, High }
///
/// impl_enum!(Level { Low, High as "HIGH" });
/// # let _ = Level::Low;
///
/// let serializer = Serializer::new();
/// assert_eq!(serializer.to_tree(&Level::High).unwrap(), TreeElement::from("HIGH"));
/// ```
#[macro_export]
macro_rules! impl_enum {
    ($ty:ident { $( $case:ident $(as $name:literal)? ),* $(,)? }) => {
        impl $crate::reflect::ReflectEnum for $ty {
            const CASES: &'static [&'static str] = &[$( $crate::__external_name!($case $($name)?) ),*];

            fn case_name(&self) -> &'static str {
                match self {
                    $( $ty::$case => $crate::__external_name!($case $($name)?), )*
                }
            }

            fn from_case_name(name: &str) -> $crate::__private::Option<Self> {
                $(
                    if name == $crate::__external_name!($case $($name)?) {
                        return $crate::__private::Some($ty::$case);
                    }
                )*
                $crate::__private::None
            }
        }

        impl $crate::reflect::Reflect for $ty {
            fn descriptor() -> $crate::reflect::TypeDescriptor {
                $crate::reflect::TypeDescriptor::new::<$ty>(
                    $crate::reflect::TypeKind::Enum($crate::reflect::EnumInfo::of::<$ty>()))
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __external_name {
    ($ident:ident) => { ::core::stringify!($ident) };
    ($ident:ident $name:literal) => { $name };
}
