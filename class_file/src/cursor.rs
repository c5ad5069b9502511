//! Counted big-endian reading and writing over in-memory byte buffers.
//!
//! Nothing in here knows about the class file format.

use anyhow::{anyhow, Context, Result};
use crate::error::ClassFileError;

/// Reads big-endian primitives from a byte slice, counting the bytes consumed.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
	data: &'a [u8],
	position: usize,
}

impl<'a> ByteReader<'a> {
	pub fn new(data: &'a [u8]) -> ByteReader<'a> {
		ByteReader { data, position: 0 }
	}

	/// The number of bytes read so far.
	pub fn bytes_consumed(&self) -> usize {
		self.position
	}

	pub fn remaining(&self) -> usize {
		self.data.len() - self.position
	}

	pub fn is_empty(&self) -> bool {
		self.remaining() == 0
	}

	pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], ClassFileError> {
		if n > self.remaining() {
			return Err(ClassFileError::TruncatedInput { offset: self.position, needed: n, available: self.remaining() });
		}
		let slice = &self.data[self.position..self.position + n];
		self.position += n;
		Ok(slice)
	}

	fn read_n<const N: usize>(&mut self) -> Result<[u8; N], ClassFileError> {
		let mut buf = [0u8; N];
		buf.copy_from_slice(self.read_bytes(N)?);
		Ok(buf)
	}

	pub fn read_u8(&mut self) -> Result<u8, ClassFileError> {
		Ok(u8::from_be_bytes(self.read_n()?))
	}
	pub fn read_u16(&mut self) -> Result<u16, ClassFileError> {
		Ok(u16::from_be_bytes(self.read_n()?))
	}
	pub fn read_u32(&mut self) -> Result<u32, ClassFileError> {
		Ok(u32::from_be_bytes(self.read_n()?))
	}
	pub fn read_u64(&mut self) -> Result<u64, ClassFileError> {
		Ok(u64::from_be_bytes(self.read_n()?))
	}
	pub fn read_i8(&mut self) -> Result<i8, ClassFileError> {
		Ok(i8::from_be_bytes(self.read_n()?))
	}
	pub fn read_i16(&mut self) -> Result<i16, ClassFileError> {
		Ok(i16::from_be_bytes(self.read_n()?))
	}
	pub fn read_i32(&mut self) -> Result<i32, ClassFileError> {
		Ok(i32::from_be_bytes(self.read_n()?))
	}
	pub fn read_i64(&mut self) -> Result<i64, ClassFileError> {
		Ok(i64::from_be_bytes(self.read_n()?))
	}
	pub fn read_f32(&mut self) -> Result<f32, ClassFileError> {
		Ok(f32::from_be_bytes(self.read_n()?))
	}
	pub fn read_f64(&mut self) -> Result<f64, ClassFileError> {
		Ok(f64::from_be_bytes(self.read_n()?))
	}

	pub fn read_u8_as_usize(&mut self) -> Result<usize, ClassFileError> {
		Ok(self.read_u8()? as usize)
	}
	pub fn read_u16_as_usize(&mut self) -> Result<usize, ClassFileError> {
		Ok(self.read_u16()? as usize)
	}
	pub fn read_u32_as_usize(&mut self) -> Result<usize, ClassFileError> {
		Ok(self.read_u32()? as usize)
	}

	/// Splits off the next `n` bytes as their own reader, so that a structure can't read past its declared end.
	pub fn sub_reader(&mut self, n: usize) -> Result<ByteReader<'a>, ClassFileError> {
		Ok(ByteReader::new(self.read_bytes(n)?))
	}

	/// Reads a count with `get_size`, then that many elements with `get_element`.
	pub fn read_vec<T, S, E>(&mut self, get_size: S, mut get_element: E) -> Result<Vec<T>>
	where
		S: FnOnce(&mut Self) -> Result<usize, ClassFileError>,
		E: FnMut(&mut Self) -> Result<T>,
	{
		let size = get_size(self)?;
		// a count can't promise more elements than there are bytes left, don't let it allocate more than that
		let mut vec = Vec::with_capacity(size.min(self.remaining()));
		for i in 0..size {
			vec.push(get_element(self).with_context(|| anyhow!("while reading element {i} of {size}"))?);
		}
		Ok(vec)
	}
}

/// Writes big-endian primitives into a growing buffer, counting the bytes emitted.
#[derive(Debug, Clone, Default)]
pub struct ByteWriter {
	buf: Vec<u8>,
}

impl ByteWriter {
	pub fn new() -> ByteWriter {
		ByteWriter::default()
	}

	pub fn with_capacity(capacity: usize) -> ByteWriter {
		ByteWriter { buf: Vec::with_capacity(capacity) }
	}

	/// The number of bytes written so far.
	pub fn bytes_emitted(&self) -> usize {
		self.buf.len()
	}

	pub fn as_slice(&self) -> &[u8] {
		&self.buf
	}

	pub fn into_inner(self) -> Vec<u8> {
		self.buf
	}

	pub fn write_bytes(&mut self, bytes: &[u8]) {
		self.buf.extend_from_slice(bytes);
	}

	pub fn write_u8(&mut self, value: u8) {
		self.buf.push(value);
	}
	pub fn write_u16(&mut self, value: u16) {
		self.write_bytes(&value.to_be_bytes());
	}
	pub fn write_u32(&mut self, value: u32) {
		self.write_bytes(&value.to_be_bytes());
	}
	pub fn write_u64(&mut self, value: u64) {
		self.write_bytes(&value.to_be_bytes());
	}
	pub fn write_i8(&mut self, value: i8) {
		self.write_bytes(&value.to_be_bytes());
	}
	pub fn write_i16(&mut self, value: i16) {
		self.write_bytes(&value.to_be_bytes());
	}
	pub fn write_i32(&mut self, value: i32) {
		self.write_bytes(&value.to_be_bytes());
	}
	pub fn write_i64(&mut self, value: i64) {
		self.write_bytes(&value.to_be_bytes());
	}
	pub fn write_f32(&mut self, value: f32) {
		self.write_bytes(&value.to_be_bytes());
	}
	pub fn write_f64(&mut self, value: f64) {
		self.write_bytes(&value.to_be_bytes());
	}

	pub fn write_usize_as_u8(&mut self, value: usize) -> Result<()> {
		let value = u8::try_from(value)
			.map_err(|_| ClassFileError::malformed("count", format!("{value} doesn't fit into an u8")))?;
		self.write_u8(value);
		Ok(())
	}
	pub fn write_usize_as_u16(&mut self, value: usize) -> Result<()> {
		let value = u16::try_from(value)
			.map_err(|_| ClassFileError::malformed("count", format!("{value} doesn't fit into an u16")))?;
		self.write_u16(value);
		Ok(())
	}
	pub fn write_usize_as_u32(&mut self, value: usize) -> Result<()> {
		let value = u32::try_from(value)
			.map_err(|_| ClassFileError::malformed("count", format!("{value} doesn't fit into an u32")))?;
		self.write_u32(value);
		Ok(())
	}

	/// Writes the length of `slice` with `put_size`, then each element with `put_element`.
	pub fn write_slice<'t, T>(
		&mut self,
		slice: &'t [T],
		put_size: impl FnOnce(&mut Self, usize) -> Result<()>,
		mut put_element: impl FnMut(&mut Self, &'t T) -> Result<()>,
	) -> Result<()> {
		put_size(self, slice.len())?;
		for value in slice {
			put_element(self, value)?;
		}
		Ok(())
	}
}
