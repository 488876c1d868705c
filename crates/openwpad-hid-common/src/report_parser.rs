//! Bounds-checked report reading and writing

use crate::{HidCommonError, HidCommonResult};

/// Borrowing reader over a raw report.
///
/// Sequential reads advance a cursor; the `*_at` accessors read at a fixed
/// offset and leave the cursor alone. Every read is bounds-checked, so a
/// short report surfaces as [`HidCommonError::TooShort`] instead of a panic.
pub struct ReportReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ReportReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            buffer: data,
            position: 0,
        }
    }

    /// Fail unless the report holds at least `need` bytes.
    pub fn require(data: &'a [u8], need: usize) -> HidCommonResult<Self> {
        if data.len() < need {
            return Err(HidCommonError::TooShort {
                got: data.len(),
                need,
            });
        }
        Ok(Self::new(data))
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn read_u8(&mut self) -> HidCommonResult<u8> {
        let value = self.u8_at(self.position)?;
        self.position += 1;
        Ok(value)
    }

    pub fn read_i8(&mut self) -> HidCommonResult<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16_le(&mut self) -> HidCommonResult<u16> {
        let value = self.u16_le_at(self.position)?;
        self.position += 2;
        Ok(value)
    }

    pub fn read_i16_le(&mut self) -> HidCommonResult<i16> {
        Ok(self.read_u16_le()? as i16)
    }

    pub fn read_u16_be(&mut self) -> HidCommonResult<u16> {
        let value = self.u16_be_at(self.position)?;
        self.position += 2;
        Ok(value)
    }

    pub fn read_i16_be(&mut self) -> HidCommonResult<i16> {
        let value = self.i16_be_at(self.position)?;
        self.position += 2;
        Ok(value)
    }

    pub fn read_u32_le(&mut self) -> HidCommonResult<u32> {
        let value = self.u32_le_at(self.position)?;
        self.position += 4;
        Ok(value)
    }

    pub fn read_u32_be(&mut self) -> HidCommonResult<u32> {
        let value = self.u32_be_at(self.position)?;
        self.position += 4;
        Ok(value)
    }

    pub fn read_bytes(&mut self, count: usize) -> HidCommonResult<&'a [u8]> {
        let bytes = self.bytes_at(self.position, count)?;
        self.position += count;
        Ok(bytes)
    }

    pub fn peek_u8(&self) -> HidCommonResult<u8> {
        self.u8_at(self.position)
    }

    pub fn skip(&mut self, count: usize) {
        self.position = self.position.saturating_add(count).min(self.buffer.len());
    }

    pub fn u8_at(&self, offset: usize) -> HidCommonResult<u8> {
        self.buffer
            .get(offset)
            .copied()
            .ok_or_else(|| self.too_short(offset.saturating_add(1)))
    }

    pub fn u16_le_at(&self, offset: usize) -> HidCommonResult<u16> {
        let b = self.array_at::<2>(offset)?;
        Ok(u16::from_le_bytes(b))
    }

    pub fn i16_le_at(&self, offset: usize) -> HidCommonResult<i16> {
        let b = self.array_at::<2>(offset)?;
        Ok(i16::from_le_bytes(b))
    }

    pub fn u16_be_at(&self, offset: usize) -> HidCommonResult<u16> {
        let b = self.array_at::<2>(offset)?;
        Ok(u16::from_be_bytes(b))
    }

    pub fn i16_be_at(&self, offset: usize) -> HidCommonResult<i16> {
        let b = self.array_at::<2>(offset)?;
        Ok(i16::from_be_bytes(b))
    }

    pub fn u32_le_at(&self, offset: usize) -> HidCommonResult<u32> {
        let b = self.array_at::<4>(offset)?;
        Ok(u32::from_le_bytes(b))
    }

    pub fn u32_be_at(&self, offset: usize) -> HidCommonResult<u32> {
        let b = self.array_at::<4>(offset)?;
        Ok(u32::from_be_bytes(b))
    }

    pub fn bytes_at(&self, offset: usize, count: usize) -> HidCommonResult<&'a [u8]> {
        let end = offset.saturating_add(count);
        self.buffer
            .get(offset..end)
            .ok_or_else(|| self.too_short(end))
    }

    pub fn array_at<const N: usize>(&self, offset: usize) -> HidCommonResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes_at(offset, N)?);
        Ok(out)
    }

    pub fn slice(&self) -> &'a [u8] {
        self.buffer
    }

    fn too_short(&self, need: usize) -> HidCommonError {
        HidCommonError::TooShort {
            got: self.buffer.len(),
            need,
        }
    }
}

/// Growable report writer.
pub struct ReportBuilder {
    buffer: Vec<u8>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.buffer.push(value);
        self
    }

    pub fn write_i8(&mut self, value: i8) -> &mut Self {
        self.buffer.push(value as u8);
        self
    }

    pub fn write_u16_le(&mut self, value: u16) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_u16_be(&mut self, value: u16) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn write_i16_be(&mut self, value: i16) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn write_u32_le(&mut self, value: u32) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_u32_be(&mut self, value: u32) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn write_i32_be(&mut self, value: i32) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> &mut Self {
        self.buffer.extend_from_slice(data);
        self
    }

    pub fn write_zeros(&mut self, count: usize) -> &mut Self {
        self.buffer.resize(self.buffer.len().saturating_add(count), 0);
        self
    }

    /// Zero-pad up to `len` bytes; longer buffers are left untouched.
    pub fn pad_to(&mut self, len: usize) -> &mut Self {
        if self.buffer.len() < len {
            self.buffer.resize(len, 0);
        }
        self
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_sequential() -> HidCommonResult<()> {
        let data = [0x01, 0x34, 0x12, 0x12, 0x34, 0xFF];
        let mut reader = ReportReader::new(&data);
        assert_eq!(reader.read_u8()?, 0x01);
        assert_eq!(reader.read_u16_le()?, 0x1234);
        assert_eq!(reader.read_u16_be()?, 0x1234);
        assert_eq!(reader.read_i8()?, -1);
        assert_eq!(reader.remaining(), 0);
        assert!(reader.read_u8().is_err());
        Ok(())
    }

    #[test]
    fn test_reader_fixed_offsets() -> HidCommonResult<()> {
        let data = [0x00, 0x00, 0xC0, 0xFF, 0x78, 0x56, 0x34, 0x12];
        let reader = ReportReader::new(&data);
        assert_eq!(reader.i16_le_at(2)?, -64);
        assert_eq!(reader.u32_le_at(4)?, 0x1234_5678);
        assert_eq!(reader.u32_be_at(4)?, 0x7856_3412);
        assert_eq!(reader.position(), 0);
        Ok(())
    }

    #[test]
    fn test_reader_short_read_reports_need() {
        let data = [0u8; 4];
        let reader = ReportReader::new(&data);
        assert_eq!(
            reader.u16_le_at(3),
            Err(HidCommonError::TooShort { got: 4, need: 5 })
        );
        assert_eq!(
            ReportReader::require(&data, 27).err(),
            Some(HidCommonError::TooShort { got: 4, need: 27 })
        );
    }

    #[test]
    fn test_reader_skip_clamps() -> HidCommonResult<()> {
        let data = [1, 2, 3];
        let mut reader = ReportReader::new(&data);
        reader.skip(2);
        assert_eq!(reader.peek_u8()?, 3);
        reader.skip(100);
        assert_eq!(reader.remaining(), 0);
        Ok(())
    }

    #[test]
    fn test_builder_endianness() {
        let mut builder = ReportBuilder::new();
        builder
            .write_u16_be(0x1234)
            .write_u16_le(0x1234)
            .write_i16_be(-2)
            .write_u32_be(0x0004_0001);
        assert_eq!(
            builder.as_slice(),
            &[0x12, 0x34, 0x34, 0x12, 0xFF, 0xFE, 0x00, 0x04, 0x00, 0x01]
        );
    }

    #[test]
    fn test_builder_pad_to() {
        let mut builder = ReportBuilder::with_capacity(8);
        builder.write_u8(0xAA).pad_to(4);
        assert_eq!(builder.as_slice(), &[0xAA, 0, 0, 0]);
        builder.pad_to(2);
        assert_eq!(builder.len(), 4);
    }
}
