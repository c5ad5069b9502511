//! Annotations and their element values.
//!
//! Lengths here are never stored, they're always computed from the contents.
use anyhow::{anyhow, Context, Result};
use crate::attribute::{list_length, read_list, write_list, Structure};
use crate::class_constants::element_value;
use crate::cursor::{ByteReader, ByteWriter};
use crate::error::ClassFileError;

/// How deep element values may nest in arrays and annotations. Anything deeper is rejected on read.
pub const MAX_NESTING: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
	/// Index of an `Utf8` entry holding a field descriptor.
	pub type_index: u16,
	pub element_value_pairs: Vec<ElementValuePair>,
}

impl Annotation {
	fn read_nested(reader: &mut ByteReader, depth: usize) -> Result<Annotation> {
		Ok(Annotation {
			type_index: reader.read_u16()?,
			element_value_pairs: reader.read_vec(ByteReader::read_u16_as_usize, |r| ElementValuePair::read_nested(r, depth))?,
		})
	}
}

impl Structure for Annotation {
	fn read(reader: &mut ByteReader) -> Result<Self> {
		Annotation::read_nested(reader, 0)
	}
	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u16(self.type_index);
		write_list(writer, &self.element_value_pairs)
	}
	fn length(&self) -> usize {
		2 + list_length(&self.element_value_pairs)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementValuePair {
	pub element_name_index: u16,
	pub value: ElementValue,
}

impl ElementValuePair {
	fn read_nested(reader: &mut ByteReader, depth: usize) -> Result<ElementValuePair> {
		let element_name_index = reader.read_u16()?;
		let value = ElementValue::read_nested(reader, depth)
			.with_context(|| anyhow!("while reading value of element with name index {element_name_index}"))?;
		Ok(ElementValuePair { element_name_index, value })
	}
}

impl Structure for ElementValuePair {
	fn read(reader: &mut ByteReader) -> Result<Self> {
		ElementValuePair::read_nested(reader, 0)
	}
	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u16(self.element_name_index);
		self.value.write(writer)
	}
	fn length(&self) -> usize {
		2 + self.value.length()
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementValue {
	/// A primitive or a string, the `tag` telling which one.
	Const { tag: u8, const_value_index: u16 },
	Enum { type_name_index: u16, const_name_index: u16 },
	Class { class_info_index: u16 },
	Annotation(Annotation),
	Array(Vec<ElementValue>),
}

impl ElementValue {
	pub fn tag(&self) -> u8 {
		match self {
			ElementValue::Const { tag, .. } => *tag,
			ElementValue::Enum { .. } => element_value::ENUM,
			ElementValue::Class { .. } => element_value::CLASS,
			ElementValue::Annotation(_) => element_value::ANNOTATION,
			ElementValue::Array(_) => element_value::ARRAY,
		}
	}

	/// Reads a value found `depth` arrays or annotations deep.
	fn read_nested(reader: &mut ByteReader, depth: usize) -> Result<ElementValue> {
		if depth >= MAX_NESTING {
			return Err(ClassFileError::malformed("element value", format!("nested more than {MAX_NESTING} levels deep")).into());
		}
		Ok(match reader.read_u8()? {
			tag @ (element_value::BYTE | element_value::CHAR | element_value::DOUBLE | element_value::FLOAT | element_value::INT | element_value::LONG | element_value::SHORT | element_value::BOOLEAN | element_value::STRING) => {
				ElementValue::Const { tag, const_value_index: reader.read_u16()? }
			},
			element_value::ENUM => ElementValue::Enum {
				type_name_index: reader.read_u16()?,
				const_name_index: reader.read_u16()?,
			},
			element_value::CLASS => ElementValue::Class { class_info_index: reader.read_u16()? },
			element_value::ANNOTATION => ElementValue::Annotation(Annotation::read_nested(reader, depth + 1)?),
			element_value::ARRAY => {
				ElementValue::Array(reader.read_vec(ByteReader::read_u16_as_usize, |r| ElementValue::read_nested(r, depth + 1))?)
			},
			tag => return Err(ClassFileError::malformed("element value", format!("unknown tag {tag:#04x}")).into()),
		})
	}
}

impl Structure for ElementValue {
	fn read(reader: &mut ByteReader) -> Result<Self> {
		ElementValue::read_nested(reader, 0)
	}

	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u8(self.tag());
		match self {
			ElementValue::Const { const_value_index, .. } => writer.write_u16(*const_value_index),
			ElementValue::Enum { type_name_index, const_name_index } => {
				writer.write_u16(*type_name_index);
				writer.write_u16(*const_name_index);
			},
			ElementValue::Class { class_info_index } => writer.write_u16(*class_info_index),
			ElementValue::Annotation(annotation) => annotation.write(writer)?,
			ElementValue::Array(values) => write_list(writer, values)?,
		}
		Ok(())
	}

	fn length(&self) -> usize {
		1 + match self {
			ElementValue::Const { .. } | ElementValue::Class { .. } => 2,
			ElementValue::Enum { .. } => 4,
			ElementValue::Annotation(annotation) => annotation.length(),
			ElementValue::Array(values) => list_length(values),
		}
	}
}

/// The annotations of one method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterAnnotations {
	pub annotations: Vec<Annotation>,
}

impl Structure for ParameterAnnotations {
	fn read(reader: &mut ByteReader) -> Result<Self> {
		Ok(ParameterAnnotations { annotations: read_list(reader)? })
	}
	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		write_list(writer, &self.annotations)
	}
	fn length(&self) -> usize {
		list_length(&self.annotations)
	}
}

/// Parameter annotations are preceded by an `u8` count.
pub(crate) fn read_parameter_annotations(reader: &mut ByteReader) -> Result<Vec<ParameterAnnotations>> {
	reader.read_vec(ByteReader::read_u8_as_usize, ParameterAnnotations::read)
}

pub(crate) fn write_parameter_annotations(writer: &mut ByteWriter, parameters: &[ParameterAnnotations]) -> Result<()> {
	writer.write_slice(parameters, ByteWriter::write_usize_as_u8, |w, parameter| parameter.write(w))
}
