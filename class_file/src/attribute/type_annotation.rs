use anyhow::Result;
use crate::attribute::annotation::Annotation;
use crate::attribute::{list_length, read_list, write_list, Structure};
use crate::class_constants::type_annotation as target;
use crate::cursor::{ByteReader, ByteWriter};
use crate::error::ClassFileError;

/// An annotation on a use of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAnnotation {
	/// Several target types share one layout of [`TargetInfo`], so it's stored separately.
	pub target_type: u8,
	pub target_info: TargetInfo,
	pub target_path: Vec<TypePathEntry>,
	pub annotation: Annotation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetInfo {
	TypeParameter { type_parameter_index: u8 },
	Supertype { supertype_index: u16 },
	TypeParameterBound { type_parameter_index: u8, bound_index: u8 },
	Empty,
	FormalParameter { formal_parameter_index: u8 },
	Throws { throws_type_index: u16 },
	LocalVar { table: Vec<LocalVarTargetEntry> },
	Catch { exception_table_index: u16 },
	Offset { offset: u16 },
	TypeArgument { offset: u16, type_argument_index: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVarTargetEntry {
	pub start_pc: u16,
	pub length: u16,
	pub index: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypePathEntry {
	pub type_path_kind: u8,
	pub type_argument_index: u8,
}

impl TargetInfo {
	fn read(target_type: u8, reader: &mut ByteReader) -> Result<TargetInfo> {
		Ok(match target_type {
			target::CLASS_TYPE_PARAMETER | target::METHOD_TYPE_PARAMETER => {
				TargetInfo::TypeParameter { type_parameter_index: reader.read_u8()? }
			},
			target::CLASS_EXTENDS => TargetInfo::Supertype { supertype_index: reader.read_u16()? },
			target::CLASS_TYPE_PARAMETER_BOUND | target::METHOD_TYPE_PARAMETER_BOUND => TargetInfo::TypeParameterBound {
				type_parameter_index: reader.read_u8()?,
				bound_index: reader.read_u8()?,
			},
			target::FIELD | target::METHOD_RETURN | target::METHOD_RECEIVER => TargetInfo::Empty,
			target::METHOD_FORMAL_PARAMETER => TargetInfo::FormalParameter { formal_parameter_index: reader.read_u8()? },
			target::THROWS => TargetInfo::Throws { throws_type_index: reader.read_u16()? },
			target::LOCAL_VARIABLE | target::RESOURCE_VARIABLE => TargetInfo::LocalVar { table: read_list(reader)? },
			target::EXCEPTION_PARAMETER => TargetInfo::Catch { exception_table_index: reader.read_u16()? },
			target::INSTANCE_OF | target::NEW | target::CONSTRUCTOR_REFERENCE | target::METHOD_REFERENCE => {
				TargetInfo::Offset { offset: reader.read_u16()? }
			},
			target::CAST |
			target::CONSTRUCTOR_INVOCATION_TYPE_ARGUMENT |
			target::METHOD_INVOCATION_TYPE_ARGUMENT |
			target::CONSTRUCTOR_REFERENCE_TYPE_ARGUMENT |
			target::METHOD_REFERENCE_TYPE_ARGUMENT => TargetInfo::TypeArgument {
				offset: reader.read_u16()?,
				type_argument_index: reader.read_u8()?,
			},
			target_type => {
				return Err(ClassFileError::malformed("type annotation", format!("unknown target type {target_type:#04x}")).into());
			},
		})
	}

	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		match self {
			TargetInfo::TypeParameter { type_parameter_index } => writer.write_u8(*type_parameter_index),
			TargetInfo::Supertype { supertype_index } => writer.write_u16(*supertype_index),
			TargetInfo::TypeParameterBound { type_parameter_index, bound_index } => {
				writer.write_u8(*type_parameter_index);
				writer.write_u8(*bound_index);
			},
			TargetInfo::Empty => {},
			TargetInfo::FormalParameter { formal_parameter_index } => writer.write_u8(*formal_parameter_index),
			TargetInfo::Throws { throws_type_index } => writer.write_u16(*throws_type_index),
			TargetInfo::LocalVar { table } => write_list(writer, table)?,
			TargetInfo::Catch { exception_table_index } => writer.write_u16(*exception_table_index),
			TargetInfo::Offset { offset } => writer.write_u16(*offset),
			TargetInfo::TypeArgument { offset, type_argument_index } => {
				writer.write_u16(*offset);
				writer.write_u8(*type_argument_index);
			},
		}
		Ok(())
	}

	fn length(&self) -> usize {
		match self {
			TargetInfo::Empty => 0,
			TargetInfo::TypeParameter { .. } | TargetInfo::FormalParameter { .. } => 1,
			TargetInfo::Supertype { .. } | TargetInfo::TypeParameterBound { .. } => 2,
			TargetInfo::Throws { .. } | TargetInfo::Catch { .. } | TargetInfo::Offset { .. } => 2,
			TargetInfo::TypeArgument { .. } => 3,
			TargetInfo::LocalVar { table } => list_length(table),
		}
	}
}

impl Structure for TypeAnnotation {
	fn read(reader: &mut ByteReader) -> Result<Self> {
		let target_type = reader.read_u8()?;
		let target_info = TargetInfo::read(target_type, reader)?;
		let target_path = reader.read_vec(ByteReader::read_u8_as_usize, TypePathEntry::read)?;
		let annotation = Annotation::read(reader)?;
		Ok(TypeAnnotation { target_type, target_info, target_path, annotation })
	}

	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u8(self.target_type);
		self.target_info.write(writer)?;
		writer.write_slice(&self.target_path, ByteWriter::write_usize_as_u8, |w, entry| entry.write(w))?;
		self.annotation.write(writer)
	}

	fn length(&self) -> usize {
		1 + self.target_info.length() + 1 + 2 * self.target_path.len() + self.annotation.length()
	}
}

impl Structure for LocalVarTargetEntry {
	fn read(reader: &mut ByteReader) -> Result<Self> {
		Ok(LocalVarTargetEntry {
			start_pc: reader.read_u16()?,
			length: reader.read_u16()?,
			index: reader.read_u16()?,
		})
	}
	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u16(self.start_pc);
		writer.write_u16(self.length);
		writer.write_u16(self.index);
		Ok(())
	}
	fn length(&self) -> usize {
		6
	}
}

impl Structure for TypePathEntry {
	fn read(reader: &mut ByteReader) -> Result<Self> {
		Ok(TypePathEntry { type_path_kind: reader.read_u8()?, type_argument_index: reader.read_u8()? })
	}
	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u8(self.type_path_kind);
		writer.write_u8(self.type_argument_index);
		Ok(())
	}
	fn length(&self) -> usize {
		2
	}
}
