//! [`SerWrite`] sinks over collections from `alloc`, `std` and the optional
//! fixed-capacity vector crates.
//!
//! Growable sinks never fail. Fixed-capacity vectors report [`SerError::BufferFull`]
//! and reject a write that does not fit as a whole.
use alloc::{vec::Vec, collections::VecDeque};
#[cfg(feature = "std")]
use std::io::Cursor;

use crate::sink::{SerError, SerResult, SerWrite};

macro_rules! impl_growable_sink {
    ($($ty:ty => |$sink:ident, $buf:ident| $extend:expr, |$this:ident, $byte:ident| $push:expr;)*) => {$(
        impl SerWrite for $ty {
            type Error = SerError;

            #[inline]
            fn write(&mut self, $buf: &[u8]) -> SerResult<()> {
                let $sink = self;
                $extend;
                Ok(())
            }
            #[inline]
            fn write_byte(&mut self, $byte: u8) -> SerResult<()> {
                let $this = self;
                $push;
                Ok(())
            }
        }
    )*};
}

impl_growable_sink! {
    Vec<u8> => |sink, buf| sink.extend_from_slice(buf), |sink, byte| sink.push(byte);
    VecDeque<u8> => |sink, buf| sink.extend(buf.iter().copied()), |sink, byte| sink.push_back(byte);
}

/// Bounded sinks: `$extend` and `$push` return a `Result` with any error type.
macro_rules! impl_bounded_sink {
    ($(#[cfg(feature = $feature:literal)] $ty:ident::<$cap:ident> => $extend:ident, $push:ident;)*) => {$(
        #[cfg(feature = $feature)]
        #[cfg_attr(docsrs, doc(cfg(feature = $feature)))]
        impl<const $cap: usize> SerWrite for $ty<u8, $cap> {
            type Error = SerError;

            fn write(&mut self, buf: &[u8]) -> SerResult<()> {
                self.$extend(buf).map_err(|_| SerError::BufferFull)
            }
            #[inline]
            fn write_byte(&mut self, byte: u8) -> SerResult<()> {
                self.$push(byte).map_err(|_| SerError::BufferFull)
            }
        }
    )*};
}

#[cfg(feature = "arrayvec")]
use arrayvec::ArrayVec;
#[cfg(feature = "heapless")]
use heapless::Vec as HeaplessVec;

impl_bounded_sink! {
    #[cfg(feature = "arrayvec")] ArrayVec::<CAP> => try_extend_from_slice, try_push;
    #[cfg(feature = "heapless")] HeaplessVec::<CAP> => extend_from_slice, push;
}

/// Writes past the end of the underlying buffer fail, unless it can grow.
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl<T> SerWrite for Cursor<T>
    where Cursor<T>: std::io::Write
{
    type Error = SerError;

    #[inline]
    fn write(&mut self, buf: &[u8]) -> SerResult<()> {
        std::io::Write::write_all(self, buf).map_err(|_| SerError::BufferFull)
    }
}
