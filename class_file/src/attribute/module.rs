use anyhow::Result;
use crate::attribute::{list_length, read_list, write_list, Structure};
use crate::cursor::{ByteReader, ByteWriter};

/// The body of a `Module` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleAttribute {
	pub module_name_index: u16,
	pub module_flags: u16,
	/// Zero if there's no version information.
	pub module_version_index: u16,
	pub requires: Vec<ModuleRequires>,
	pub exports: Vec<ModuleExports>,
	pub opens: Vec<ModuleOpens>,
	pub uses_index: Vec<u16>,
	pub provides: Vec<ModuleProvides>,
}

impl ModuleAttribute {
	pub(crate) fn read(reader: &mut ByteReader) -> Result<ModuleAttribute> {
		Ok(ModuleAttribute {
			module_name_index: reader.read_u16()?,
			module_flags: reader.read_u16()?,
			module_version_index: reader.read_u16()?,
			requires: read_list(reader)?,
			exports: read_list(reader)?,
			opens: read_list(reader)?,
			uses_index: read_list(reader)?,
			provides: read_list(reader)?,
		})
	}

	pub(crate) fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u16(self.module_name_index);
		writer.write_u16(self.module_flags);
		writer.write_u16(self.module_version_index);
		write_list(writer, &self.requires)?;
		write_list(writer, &self.exports)?;
		write_list(writer, &self.opens)?;
		write_list(writer, &self.uses_index)?;
		write_list(writer, &self.provides)
	}

	pub(crate) fn length(&self) -> usize {
		6 + list_length(&self.requires)
			+ list_length(&self.exports)
			+ list_length(&self.opens)
			+ list_length(&self.uses_index)
			+ list_length(&self.provides)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRequires {
	pub requires_index: u16,
	pub requires_flags: u16,
	pub requires_version_index: u16,
}

impl Structure for ModuleRequires {
	fn read(reader: &mut ByteReader) -> Result<Self> {
		Ok(ModuleRequires {
			requires_index: reader.read_u16()?,
			requires_flags: reader.read_u16()?,
			requires_version_index: reader.read_u16()?,
		})
	}
	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u16(self.requires_index);
		writer.write_u16(self.requires_flags);
		writer.write_u16(self.requires_version_index);
		Ok(())
	}
	fn length(&self) -> usize {
		6
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleExports {
	pub exports_index: u16,
	pub exports_flags: u16,
	pub exports_to_index: Vec<u16>,
}

impl Structure for ModuleExports {
	fn read(reader: &mut ByteReader) -> Result<Self> {
		Ok(ModuleExports {
			exports_index: reader.read_u16()?,
			exports_flags: reader.read_u16()?,
			exports_to_index: read_list(reader)?,
		})
	}
	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u16(self.exports_index);
		writer.write_u16(self.exports_flags);
		write_list(writer, &self.exports_to_index)
	}
	fn length(&self) -> usize {
		4 + list_length(&self.exports_to_index)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOpens {
	pub opens_index: u16,
	pub opens_flags: u16,
	pub opens_to_index: Vec<u16>,
}

impl Structure for ModuleOpens {
	fn read(reader: &mut ByteReader) -> Result<Self> {
		Ok(ModuleOpens {
			opens_index: reader.read_u16()?,
			opens_flags: reader.read_u16()?,
			opens_to_index: read_list(reader)?,
		})
	}
	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u16(self.opens_index);
		writer.write_u16(self.opens_flags);
		write_list(writer, &self.opens_to_index)
	}
	fn length(&self) -> usize {
		4 + list_length(&self.opens_to_index)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleProvides {
	pub provides_index: u16,
	pub provides_with_index: Vec<u16>,
}

impl Structure for ModuleProvides {
	fn read(reader: &mut ByteReader) -> Result<Self> {
		Ok(ModuleProvides {
			provides_index: reader.read_u16()?,
			provides_with_index: read_list(reader)?,
		})
	}
	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u16(self.provides_index);
		write_list(writer, &self.provides_with_index)
	}
	fn length(&self) -> usize {
		2 + list_length(&self.provides_with_index)
	}
}
