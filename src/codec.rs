//! Binary form.
//!
//! ```text
//! Tag:          ┌──────────┬──────────────────┐
//!               │ len: u16 │ UTF-8 name bytes │   len = 0 for the empty tag
//!               └──────────┴──────────────────┘
//! TagContainer: ┌────────────┬─────┬─────┬─────┐
//!               │ count: u32 │ Tag │ Tag │ ... │   explicit tags only
//!               └────────────┴─────┴─────┴─────┘
//! ```
//!
//! Integers are little-endian. Parent tags are never written; decoding
//! rederives them.

use std::mem::size_of;

use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::container::TagContainer;
use crate::error::CodecError;
use crate::resolver::TagResolver;
use crate::tag::Tag;

#[derive(FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct NameHeader {
    len: U16,
}

#[derive(FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct ContainerHeader {
    count: U32,
}

fn read_header<T: FromBytes>(bytes: &[u8]) -> Result<(T, &[u8]), CodecError> {
    T::read_from_prefix(bytes).map_err(|_| CodecError::Truncated {
        needed: size_of::<T>(),
        remaining: bytes.len(),
    })
}

fn read_name(bytes: &[u8]) -> Result<(&str, &[u8]), CodecError> {
    let (header, rest) = read_header::<NameHeader>(bytes)?;
    let len = usize::from(header.len.get());
    if rest.len() < len {
        return Err(CodecError::Truncated {
            needed: len,
            remaining: rest.len(),
        });
    }
    let (name, rest) = rest.split_at(len);
    let name = std::str::from_utf8(name).map_err(|_| CodecError::InvalidUtf8)?;
    Ok((name, rest))
}

impl Tag {
    /// Append the binary form to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        let name = self.name().unwrap_or_default();
        let len = u16::try_from(name.len()).map_err(|_| CodecError::NameTooLong(name.len()))?;
        out.extend_from_slice(NameHeader { len: U16::new(len) }.as_bytes());
        out.extend_from_slice(name.as_bytes());
        Ok(())
    }

    /// Decode one tag from the front of `bytes`, returning the rest.
    ///
    /// The name goes through [`TagResolver::import`], so redirects apply.
    pub fn read_from<'a, R: TagResolver + ?Sized>(
        bytes: &'a [u8],
        resolver: &R,
    ) -> Result<(Tag, &'a [u8]), CodecError> {
        let (name, rest) = read_name(bytes)?;
        Ok((resolver.import(name), rest))
    }
}

impl TagContainer {
    /// Append the binary form to `out`. On error `out` is left as it was.
    pub fn write_to(&self, out: &mut Vec<u8>) -> Result<(), CodecError> {
        let count = u32::try_from(self.len()).map_err(|_| CodecError::TooManyTags(self.len()))?;
        let start = out.len();
        out.extend_from_slice(ContainerHeader { count: U32::new(count) }.as_bytes());
        for tag in self.iter() {
            if let Err(err) = tag.write_to(out) {
                out.truncate(start);
                return Err(err);
            }
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Decode a container from the front of `bytes`, returning the rest.
    ///
    /// Names the resolver rejects are dropped.
    pub fn read_from<'a, R: TagResolver + ?Sized>(
        bytes: &'a [u8],
        resolver: &R,
    ) -> Result<(TagContainer, &'a [u8]), CodecError> {
        let (header, mut rest) = read_header::<ContainerHeader>(bytes)?;
        let count = header.count.get() as usize;

        // Each tag takes at least its header
        let mut tags = Vec::with_capacity(count.min(rest.len() / size_of::<NameHeader>()));
        for _ in 0..count {
            let (tag, tail) = Tag::read_from(rest, resolver)?;
            tags.push(tag);
            rest = tail;
        }
        Ok((TagContainer::create_from_array(&tags), rest))
    }

    /// Decode a container, ignoring trailing bytes.
    pub fn from_bytes<R: TagResolver + ?Sized>(
        bytes: &[u8],
        resolver: &R,
    ) -> Result<TagContainer, CodecError> {
        Self::read_from(bytes, resolver).map(|(container, _)| container)
    }
}
