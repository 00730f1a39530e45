use crate::codec::sizes;
use crate::error::codec::CodecError;

/// Forward-only cursor over an inbound frame.
///
/// Every read is bounds-checked; running past the end yields
/// [`CodecError::OutOfBounds`] and leaves the cursor where it was.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Borrow the next `count` bytes and advance past them.
    #[track_caller]
    pub fn take(&mut self, count: usize) -> Result<&'a [u8], CodecError> {
        let end = self
            .offset
            .checked_add(count)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| CodecError::out_of_bounds(self.offset, count, self.remaining()))?;
        let slice = &self.data[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    /// Everything after the cursor; the cursor ends at the frame end.
    pub fn take_rest(&mut self) -> &'a [u8] {
        let slice = &self.data[self.offset..];
        self.offset = self.data.len();
        slice
    }

    #[track_caller]
    pub fn skip(&mut self, count: usize) -> Result<(), CodecError> {
        self.take(count).map(|_| ())
    }

    #[track_caller]
    fn array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(self.take(N)?);
        Ok(bytes)
    }

    #[track_caller]
    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.array::<{ sizes::U8 }>()?[0])
    }

    #[track_caller]
    pub fn read_i8(&mut self) -> Result<i8, CodecError> {
        Ok(i8::from_be_bytes(self.array()?))
    }

    #[track_caller]
    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_be_bytes(self.array()?))
    }

    #[track_caller]
    pub fn read_i16(&mut self) -> Result<i16, CodecError> {
        Ok(i16::from_be_bytes(self.array()?))
    }

    #[track_caller]
    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    #[track_caller]
    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        Ok(i32::from_be_bytes(self.array()?))
    }

    #[track_caller]
    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_be_bytes(self.array()?))
    }

    #[track_caller]
    pub fn read_i64(&mut self) -> Result<i64, CodecError> {
        Ok(i64::from_be_bytes(self.array()?))
    }

    #[track_caller]
    pub fn read_f32(&mut self) -> Result<f32, CodecError> {
        Ok(f32::from_be_bytes(self.array()?))
    }

    /// Read `units` UTF-16BE code units. Zero units is `None`.
    ///
    /// Unpaired surrogates are replaced rather than rejected.
    #[track_caller]
    pub fn read_utf16(&mut self, units: usize) -> Result<Option<String>, CodecError> {
        if units == 0 {
            return Ok(None);
        }
        let byte_count = units
            .checked_mul(sizes::UTF16_UNIT)
            .ok_or_else(|| CodecError::out_of_bounds(self.offset, usize::MAX, self.remaining()))?;
        let bytes = self.take(byte_count)?;
        let code_units: Vec<u16> = bytes
            .chunks_exact(sizes::UTF16_UNIT)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        Ok(Some(String::from_utf16_lossy(&code_units)))
    }

    #[track_caller]
    pub fn read_string_u8(&mut self) -> Result<Option<String>, CodecError> {
        let units = self.read_u8()?;
        self.read_utf16(usize::from(units))
    }

    #[track_caller]
    pub fn read_string_u16(&mut self) -> Result<Option<String>, CodecError> {
        let units = self.read_u16()?;
        self.read_utf16(usize::from(units))
    }

    #[track_caller]
    pub fn read_string_u32(&mut self) -> Result<Option<String>, CodecError> {
        let units = self.read_u32()?;
        self.read_utf16(units as usize)
    }

    /// Signed 32-bit prefix; negative lengths are malformed.
    #[track_caller]
    pub fn read_string_i32(&mut self) -> Result<Option<String>, CodecError> {
        let units = self.read_i32()?;
        let units = usize::try_from(units).map_err(|_| CodecError::negative_length(units))?;
        self.read_utf16(units)
    }
}
