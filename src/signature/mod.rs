#[cfg(test)]
mod tests;

#[macro_use]
mod stack;

use self::validation::validate;
mod validation;

pub use self::iter::{Iter, Type};
mod iter;

pub use self::signature::Signature;
mod signature;

pub(crate) use self::signature_builder::SignatureBuilder;
mod signature_builder;

pub use self::signature_buf::SignatureBuf;
mod signature_buf;

pub use self::signature_error::SignatureError;
use self::signature_error::SignatureErrorKind;
mod signature_error;

/// The maximum size of a signature.
#[doc(hidden)]
pub const MAX_SIGNATURE: usize = 256;

/// The maximum individual container depth.
#[doc(hidden)]
pub const MAX_CONTAINER_DEPTH: usize = 32;

/// The maximum total depth of any containers.
#[doc(hidden)]
pub const MAX_DEPTH: usize = MAX_CONTAINER_DEPTH * 2;

use crate::buf::UnalignedBuf;
use crate::error::Result;

use crate::{Body, BodyBuf, Read, Write};

impl crate::write::sealed::Sealed for Signature {}

impl Write for Signature {
    const SIGNATURE: &'static Signature = Signature::SIGNATURE;

    #[inline]
    fn write_to(&self, buf: &mut BodyBuf) {
        buf.store_frame(self.len() as u8);
        buf.extend_from_slice_nul(self.as_bytes());
    }

    #[inline]
    fn write_to_unaligned(&self, buf: &mut UnalignedBuf) {
        buf.store(self.len() as u8);
        buf.extend_from_slice_nul(self.as_bytes());
    }
}

impl_traits_for_write!(Signature, Signature::new(b"us")?, "qg", Signature);

impl crate::read::sealed::Sealed for Signature {}

impl Read for Signature {
    #[inline]
    fn read_from<'de>(buf: &mut Body<'de>) -> Result<&'de Self> {
        let len = buf.load::<u8>()? as usize;
        let bytes = buf.load_slice_nul(len)?;
        Ok(Signature::new(bytes)?)
    }
}

/// Return the stride needed to skip over read buffer.
pub(crate) fn skip(this: &Signature, read: &mut Body<'_>) -> Result<()> {
    use crate::proto::Type as TypeCode;

    #[derive(Debug, Clone, Copy)]
    enum Step {
        Fixed(usize),
        StringNul,
        Variant,
        ByteNul,
    }

    let mut stack = self::stack::Stack::<bool, MAX_DEPTH>::new();
    let mut arrays = 0;

    for &b in this.as_bytes() {
        let t = TypeCode::new(b);

        let step = match t {
            TypeCode::BYTE => Step::Fixed(1),
            TypeCode::BOOLEAN => Step::Fixed(1),
            TypeCode::INT16 => Step::Fixed(2),
            TypeCode::UINT16 => Step::Fixed(2),
            TypeCode::INT32 => Step::Fixed(4),
            TypeCode::UINT32 => Step::Fixed(4),
            TypeCode::INT64 => Step::Fixed(8),
            TypeCode::UINT64 => Step::Fixed(8),
            TypeCode::DOUBLE => Step::Fixed(8),
            TypeCode::STRING => Step::StringNul,
            TypeCode::OBJECT_PATH => Step::StringNul,
            TypeCode::SIGNATURE => Step::ByteNul,
            TypeCode::VARIANT => Step::Variant,
            TypeCode::UNIX_FD => Step::Fixed(4),
            TypeCode::ARRAY => {
                if arrays == 0 {
                    let n = read.load::<u32>()? as usize;
                    read.advance(n)?;
                }

                arrays += 1;
                stack.try_push(true);
                continue;
            }
            TypeCode::OPEN_PAREN => {
                stack.try_push(false);
                continue;
            }
            TypeCode::CLOSE_PAREN => {
                stack.pop();
                Step::Fixed(0)
            }
            TypeCode::OPEN_BRACE => {
                stack.try_push(false);
                continue;
            }
            TypeCode::CLOSE_BRACE => {
                stack.pop();
                Step::Fixed(0)
            }
            _ => unreachable!(),
        };

        let in_array = arrays > 0;

        // Unwind arrays.
        while let Some(true) = stack.peek() {
            arrays -= 1;
            stack.pop();
        }

        if in_array {
            continue;
        }

        match step {
            Step::Fixed(n) => {
                read.advance(n)?;
            }
            Step::StringNul => {
                let n = read.load::<u32>()? as usize;
                read.advance(n.saturating_add(1))?;
            }
            Step::ByteNul => {
                let n = read.load::<u8>()? as usize;
                read.advance(n.saturating_add(1))?;
            }
            Step::Variant => {
                let _ = read.load::<u8>()?;
                let sig = read.read::<Signature>()?;
                skip(sig, read)?;
            }
        }
    }

    Ok(())
}
