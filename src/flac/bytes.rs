/// Bounds-checked reader over a block body.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len).filter(|end| *end <= self.data.len())?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Some(slice)
    }

    pub fn u32_le(&mut self) -> Option<u32> {
        self.take(4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn u32_be(&mut self) -> Option<u32> {
        self.take(4)
            .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_in_order() {
        let data = [1, 0, 0, 0, 0, 0, 0, 2, 9];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.u32_le(), Some(1));
        assert_eq!(reader.u32_be(), Some(2));
        assert_eq!(reader.take(1), Some(&[9u8][..]));
        assert_eq!(reader.take(1), None);
    }

    #[test]
    fn test_overflowing_length() {
        let mut reader = ByteReader::new(&[0, 1]);
        assert_eq!(reader.take(usize::MAX), None);
        assert_eq!(reader.u32_le(), None);
    }
}
