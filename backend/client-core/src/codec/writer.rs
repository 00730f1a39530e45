use crate::codec::{sizes, utf16_len};
use crate::error::codec::CodecError;

/// Writer over a buffer allocated at exactly the declared packet size.
///
/// Writing past the declared size is an error, and so is finishing short of it.
#[derive(Debug)]
pub struct ByteWriter {
    buffer: Vec<u8>,
    capacity: usize,
}

impl ByteWriter {
    pub fn with_size(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn written(&self) -> usize {
        self.buffer.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[track_caller]
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        if self.buffer.len() + bytes.len() > self.capacity {
            return Err(CodecError::write_overflow(
                self.buffer.len(),
                bytes.len(),
                self.capacity,
            ));
        }
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    #[track_caller]
    pub fn write_u8(&mut self, value: u8) -> Result<(), CodecError> {
        self.write_bytes(&[value])
    }

    #[track_caller]
    pub fn write_u16(&mut self, value: u16) -> Result<(), CodecError> {
        self.write_bytes(&value.to_be_bytes())
    }

    #[track_caller]
    pub fn write_u32(&mut self, value: u32) -> Result<(), CodecError> {
        self.write_bytes(&value.to_be_bytes())
    }

    #[track_caller]
    pub fn write_i32(&mut self, value: i32) -> Result<(), CodecError> {
        self.write_bytes(&value.to_be_bytes())
    }

    #[track_caller]
    pub fn write_u64(&mut self, value: u64) -> Result<(), CodecError> {
        self.write_bytes(&value.to_be_bytes())
    }

    #[track_caller]
    pub fn write_f32(&mut self, value: f32) -> Result<(), CodecError> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Raw UTF-16BE code units, no prefix.
    #[track_caller]
    pub fn write_utf16(&mut self, text: &str) -> Result<(), CodecError> {
        let needed = utf16_len(text) * sizes::UTF16_UNIT;
        if self.buffer.len() + needed > self.capacity {
            return Err(CodecError::write_overflow(
                self.buffer.len(),
                needed,
                self.capacity,
            ));
        }
        for unit in text.encode_utf16() {
            self.buffer.extend_from_slice(&unit.to_be_bytes());
        }
        Ok(())
    }

    /// u8 code-unit count then the units; `None` writes a zero count.
    #[track_caller]
    pub fn write_string_u8(&mut self, text: Option<&str>) -> Result<(), CodecError> {
        let units = text.map_or(0, utf16_len);
        let prefix = u8::try_from(units).map_err(|_| CodecError::string_too_long(units, 8))?;
        self.write_u8(prefix)?;
        text.map_or(Ok(()), |text| self.write_utf16(text))
    }

    #[track_caller]
    pub fn write_string_u16(&mut self, text: Option<&str>) -> Result<(), CodecError> {
        let units = text.map_or(0, utf16_len);
        let prefix = u16::try_from(units).map_err(|_| CodecError::string_too_long(units, 16))?;
        self.write_u16(prefix)?;
        text.map_or(Ok(()), |text| self.write_utf16(text))
    }

    #[track_caller]
    pub fn write_string_u32(&mut self, text: Option<&str>) -> Result<(), CodecError> {
        let units = text.map_or(0, utf16_len);
        let prefix = u32::try_from(units).map_err(|_| CodecError::string_too_long(units, 32))?;
        self.write_u32(prefix)?;
        text.map_or(Ok(()), |text| self.write_utf16(text))
    }

    /// Hand back the buffer, checking it was filled to the declared size.
    #[track_caller]
    pub fn finish(self) -> Result<Vec<u8>, CodecError> {
        if self.buffer.len() != self.capacity {
            return Err(CodecError::size_mismatch(self.capacity, self.buffer.len()));
        }
        Ok(self.buffer)
    }
}
