//! Container encodings.
//!
//! Sequences, sets and maps share one layout: a 4-byte little-endian
//! element count followed by each element (or key/value pair) in iteration
//! order. Element types only need to implement the codec traits, so nested
//! containers compose without extra code.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::hash::{BuildHasher, Hash};

use crate::codec::{Decode, Encode};
use crate::cursor::{Reader, Writer, LEN_PREFIX_SIZE};
use crate::error::Result;

fn counted_size<'a, T, I>(items: I) -> usize
where
    T: Encode + 'a,
    I: IntoIterator<Item = &'a T>,
{
    LEN_PREFIX_SIZE
        + items
            .into_iter()
            .map(|item| item.serialized_size())
            .sum::<usize>()
}

fn encode_counted<'a, T, I>(writer: &mut Writer<'_>, len: usize, items: I) -> Result<()>
where
    T: Encode + 'a,
    I: IntoIterator<Item = &'a T>,
{
    writer.put_len(len)?;
    for item in items {
        item.encode(writer)?;
    }
    Ok(())
}

fn encode_pairs<'a, K, V, I>(writer: &mut Writer<'_>, len: usize, pairs: I) -> Result<()>
where
    K: Encode + 'a,
    V: Encode + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    writer.put_len(len)?;
    for (key, value) in pairs {
        key.encode(writer)?;
        value.encode(writer)?;
    }
    Ok(())
}

fn pairs_size<'a, K, V, I>(pairs: I) -> usize
where
    K: Encode + 'a,
    V: Encode + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    LEN_PREFIX_SIZE
        + pairs
            .into_iter()
            .map(|(key, value)| key.serialized_size() + value.serialized_size())
            .sum::<usize>()
}

/// Decode a count prefix, then `count` elements, handing each to `push`.
fn decode_counted<T, F>(reader: &mut Reader<'_>, mut push: F) -> Result<()>
where
    T: Decode,
    F: FnMut(T),
{
    let count = reader.get_count()?;
    for _ in 0..count {
        push(T::decode(reader)?);
    }
    Ok(())
}

fn decode_pairs<K, V, F>(reader: &mut Reader<'_>, mut insert: F) -> Result<()>
where
    K: Decode,
    V: Decode,
    F: FnMut(K, V),
{
    let count = reader.get_count()?;
    for _ in 0..count {
        let key = K::decode(reader)?;
        let value = V::decode(reader)?;
        insert(key, value);
    }
    Ok(())
}

// Sequences.

impl<T: Encode> Encode for [T] {
    fn serialized_size(&self) -> usize {
        counted_size(self)
    }

    fn encode(&self, writer: &mut Writer<'_>) -> Result<()> {
        encode_counted(writer, self.len(), self)
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn serialized_size(&self) -> usize {
        self.as_slice().serialized_size()
    }

    fn encode(&self, writer: &mut Writer<'_>) -> Result<()> {
        self.as_slice().encode(writer)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let mut out = Vec::new();
        decode_counted(reader, |item| out.push(item))?;
        Ok(out)
    }
}

impl<T: Encode> Encode for VecDeque<T> {
    fn serialized_size(&self) -> usize {
        counted_size(self)
    }

    fn encode(&self, writer: &mut Writer<'_>) -> Result<()> {
        encode_counted(writer, self.len(), self)
    }
}

impl<T: Decode> Decode for VecDeque<T> {
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let mut out = VecDeque::new();
        decode_counted(reader, |item| out.push_back(item))?;
        Ok(out)
    }
}

impl<T: Encode> Encode for LinkedList<T> {
    fn serialized_size(&self) -> usize {
        counted_size(self)
    }

    fn encode(&self, writer: &mut Writer<'_>) -> Result<()> {
        encode_counted(writer, self.len(), self)
    }
}

impl<T: Decode> Decode for LinkedList<T> {
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let mut out = LinkedList::new();
        decode_counted(reader, |item| out.push_back(item))?;
        Ok(out)
    }
}

// Sets.

impl<T: Encode> Encode for BTreeSet<T> {
    fn serialized_size(&self) -> usize {
        counted_size(self)
    }

    fn encode(&self, writer: &mut Writer<'_>) -> Result<()> {
        encode_counted(writer, self.len(), self)
    }
}

impl<T: Decode + Ord> Decode for BTreeSet<T> {
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let mut out = BTreeSet::new();
        decode_counted(reader, |item| {
            out.insert(item);
        })?;
        Ok(out)
    }
}

impl<T: Encode, S> Encode for HashSet<T, S> {
    fn serialized_size(&self) -> usize {
        counted_size(self)
    }

    fn encode(&self, writer: &mut Writer<'_>) -> Result<()> {
        encode_counted(writer, self.len(), self)
    }
}

impl<T, S> Decode for HashSet<T, S>
where
    T: Decode + Eq + Hash,
    S: BuildHasher + Default,
{
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let mut out = HashSet::with_hasher(S::default());
        decode_counted(reader, |item| {
            out.insert(item);
        })?;
        Ok(out)
    }
}

// Maps.

impl<K: Encode, V: Encode> Encode for BTreeMap<K, V> {
    fn serialized_size(&self) -> usize {
        pairs_size(self)
    }

    fn encode(&self, writer: &mut Writer<'_>) -> Result<()> {
        encode_pairs(writer, self.len(), self)
    }
}

impl<K: Decode + Ord, V: Decode> Decode for BTreeMap<K, V> {
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let mut out = BTreeMap::new();
        decode_pairs(reader, |key, value| {
            out.insert(key, value);
        })?;
        Ok(out)
    }
}

impl<K: Encode, V: Encode, S> Encode for HashMap<K, V, S> {
    fn serialized_size(&self) -> usize {
        pairs_size(self)
    }

    fn encode(&self, writer: &mut Writer<'_>) -> Result<()> {
        encode_pairs(writer, self.len(), self)
    }
}

impl<K, V, S> Decode for HashMap<K, V, S>
where
    K: Decode + Eq + Hash,
    V: Decode,
    S: BuildHasher + Default,
{
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let mut out = HashMap::with_hasher(S::default());
        decode_pairs(reader, |key, value| {
            out.insert(key, value);
        })?;
        Ok(out)
    }
}

// Pairs: the element type of multi-maps expressed as `Vec<(K, V)>`.

impl<A: Encode, B: Encode> Encode for (A, B) {
    fn serialized_size(&self) -> usize {
        self.0.serialized_size() + self.1.serialized_size()
    }

    fn encode(&self, writer: &mut Writer<'_>) -> Result<()> {
        self.0.encode(writer)?;
        self.1.encode(writer)
    }
}

impl<A: Decode, B: Decode> Decode for (A, B) {
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let first = A::decode(reader)?;
        let second = B::decode(reader)?;
        Ok((first, second))
    }
}
