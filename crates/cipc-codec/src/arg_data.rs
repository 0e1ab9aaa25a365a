use crate::codec::Decode;
use crate::cursor::Reader;
use crate::error::Result;

/// Borrowed view over encoded argument or return-value bytes.
///
/// The view cannot outlive the buffer it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgData<'a> {
    data: &'a [u8],
}

impl<'a> ArgData<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Cursor for decoding successive values in declared order.
    pub fn reader(&self) -> Reader<'a> {
        Reader::new(self.data)
    }

    /// Decode a single value from the start of the view.
    pub fn decode<T: Decode>(&self) -> Result<T> {
        self.reader().decode()
    }
}

impl<'a> From<&'a [u8]> for ArgData<'a> {
    fn from(data: &'a [u8]) -> Self {
        Self::new(data)
    }
}

impl AsRef<[u8]> for ArgData<'_> {
    fn as_ref(&self) -> &[u8] {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::to_vec;
    use crate::error::CodecError;

    #[test]
    fn reader_walks_arguments_in_order() {
        let mut bytes = to_vec(&0xDEADBEEFu32).unwrap();
        bytes.extend(to_vec("name").unwrap());
        bytes.extend(to_vec(&vec![1i16, -1]).unwrap());

        let args = ArgData::new(&bytes);
        let mut reader = args.reader();
        assert_eq!(reader.decode::<u32>().unwrap(), 0xDEADBEEF);
        assert_eq!(reader.decode::<String>().unwrap(), "name");
        assert_eq!(reader.decode::<Vec<i16>>().unwrap(), vec![1, -1]);
        assert!(reader.is_empty());
    }

    #[test]
    fn decode_past_end_fails() {
        let bytes = [0x01, 0x02];
        let args = ArgData::from(&bytes[..]);
        assert_eq!(args.len(), 2);
        assert!(matches!(
            args.decode::<u32>(),
            Err(CodecError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn empty_view() {
        let args = ArgData::new(&[]);
        assert!(args.is_empty());
        assert!(args.reader().is_empty());
    }
}
