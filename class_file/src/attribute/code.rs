use anyhow::{Context, Result};
use crate::attribute::{attributes_length, list_length, read_attributes, read_list, write_attributes, write_list, AttributeInfo, Structure};
use crate::bytecode::{self, Instruction};
use crate::cursor::{ByteReader, ByteWriter};
use crate::pool::ConstantPool;

/// The `Code` attribute of a method.
///
/// The instructions are kept as raw bytes. [`CodeAttribute::instructions`] decodes them when needed.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeAttribute {
	pub max_stack: u16,
	pub max_locals: u16,
	pub code: Vec<u8>,
	pub exception_table: Vec<ExceptionTableEntry>,
	pub attributes: Vec<AttributeInfo>,
}

impl CodeAttribute {
	pub(crate) fn read(reader: &mut ByteReader, pool: &ConstantPool) -> Result<CodeAttribute> {
		let max_stack = reader.read_u16()?;
		let max_locals = reader.read_u16()?;
		let code_length = reader.read_u32_as_usize()?;
		let code = reader.read_bytes(code_length).context("while reading code array")?.to_vec();
		let exception_table = read_list(reader).context("while reading exception table")?;
		let attributes = read_attributes(reader, pool)?;

		Ok(CodeAttribute { max_stack, max_locals, code, exception_table, attributes })
	}

	pub(crate) fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u16(self.max_stack);
		writer.write_u16(self.max_locals);
		writer.write_usize_as_u32(self.code.len()).context("code length")?;
		writer.write_bytes(&self.code);
		write_list(writer, &self.exception_table)?;
		write_attributes(writer, &self.attributes)
	}

	pub(crate) fn length(&self) -> usize {
		2 + 2 + 4 + self.code.len() + list_length(&self.exception_table) + attributes_length(&self.attributes)
	}

	/// Decodes the code array.
	pub fn instructions(&self) -> Result<Vec<Instruction>> {
		bytecode::decode(&self.code)
	}

	/// Replaces the code array with the encoding of `instructions`.
	///
	/// This changes the length of this attribute, so the enclosing [`AttributeInfo`] needs an [`AttributeInfo::update_length`] afterwards.
	pub fn set_instructions(&mut self, instructions: &[Instruction]) -> Result<()> {
		self.code = bytecode::encode(instructions)?;
		Ok(())
	}
}

/// An exception handler covering the code from `start_pc` up to, but not including, `end_pc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionTableEntry {
	pub start_pc: u16,
	pub end_pc: u16,
	pub handler_pc: u16,
	/// Zero for a handler catching everything.
	pub catch_type: u16,
}

impl Structure for ExceptionTableEntry {
	fn read(reader: &mut ByteReader) -> Result<Self> {
		Ok(ExceptionTableEntry {
			start_pc: reader.read_u16()?,
			end_pc: reader.read_u16()?,
			handler_pc: reader.read_u16()?,
			catch_type: reader.read_u16()?,
		})
	}
	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u16(self.start_pc);
		writer.write_u16(self.end_pc);
		writer.write_u16(self.handler_pc);
		writer.write_u16(self.catch_type);
		Ok(())
	}
	fn length(&self) -> usize {
		8
	}
}
