use anyhow::{anyhow, Context, Result};
use log::trace;
use crate::attribute::code::CodeAttribute;
use crate::attribute::{attributes_length, read_attributes, write_attributes, Attribute, AttributeInfo};
use crate::class_constants::MAGIC;
use crate::cursor::{ByteReader, ByteWriter};
use crate::error::ClassFileError;
use crate::pool::{ConstantPool, PoolEntry};

/// A field or a method.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberInfo {
	pub access_flags: u16,
	pub name_index: u16,
	pub descriptor_index: u16,
	pub attributes: Vec<AttributeInfo>,
}

impl MemberInfo {
	fn read(reader: &mut ByteReader, pool: &ConstantPool) -> Result<MemberInfo> {
		Ok(MemberInfo {
			access_flags: reader.read_u16()?,
			name_index: reader.read_u16()?,
			descriptor_index: reader.read_u16()?,
			attributes: read_attributes(reader, pool)?,
		})
	}

	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u16(self.access_flags);
		writer.write_u16(self.name_index);
		writer.write_u16(self.descriptor_index);
		write_attributes(writer, &self.attributes)
	}

	fn length(&self) -> usize {
		6 + attributes_length(&self.attributes)
	}

	pub fn name<'a>(&self, pool: &'a ConstantPool) -> Result<&'a str, ClassFileError> {
		pool.resolve_utf8(self.name_index)
	}

	pub fn descriptor<'a>(&self, pool: &'a ConstantPool) -> Result<&'a str, ClassFileError> {
		pool.resolve_utf8(self.descriptor_index)
	}

	/// The first `Code` attribute of this member.
	pub fn code(&self) -> Option<&CodeAttribute> {
		self.attributes.iter().find_map(|attribute| match &attribute.data {
			Attribute::Code(code) => Some(code),
			_ => None,
		})
	}

	/// The first `Code` attribute of this member, together with the [`AttributeInfo`] holding it, so that its length can be updated.
	pub fn code_mut(&mut self) -> Option<&mut AttributeInfo> {
		self.attributes.iter_mut().find(|attribute| matches!(attribute.data, Attribute::Code(_)))
	}
}

/// A class file.
///
/// The constant pool is the only place names and constants are stored in, everything else refers to it by index.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
	pub minor_version: u16,
	pub major_version: u16,
	pub constant_pool: ConstantPool,
	pub access_flags: u16,
	pub this_class: u16,
	/// Zero for `java/lang/Object`.
	pub super_class: u16,
	pub interfaces: Vec<u16>,
	pub fields: Vec<MemberInfo>,
	pub methods: Vec<MemberInfo>,
	pub attributes: Vec<AttributeInfo>,
}

impl ClassFile {
	/// Reads a complete class file. Bytes after the last attribute are an error.
	pub fn read(bytes: &[u8]) -> Result<ClassFile> {
		let mut reader = ByteReader::new(bytes);

		let magic = reader.read_u32()?;
		if magic != MAGIC {
			return Err(ClassFileError::BadMagic(magic).into());
		}
		let minor_version = reader.read_u16()?;
		let major_version = reader.read_u16()?;
		trace!("reading class file version {major_version}.{minor_version}");

		let constant_pool = ConstantPool::read(&mut reader).context("while reading constant pool")?;

		let access_flags = reader.read_u16()?;
		let this_class = reader.read_u16()?;
		let super_class = reader.read_u16()?;
		let interfaces = reader.read_vec(ByteReader::read_u16_as_usize, |r| Ok(r.read_u16()?))
			.context("while reading interfaces")?;

		let fields = reader.read_vec(ByteReader::read_u16_as_usize, |r| MemberInfo::read(r, &constant_pool))
			.context("while reading fields")?;
		let methods = reader.read_vec(ByteReader::read_u16_as_usize, |r| MemberInfo::read(r, &constant_pool))
			.context("while reading methods")?;
		trace!("read {} fields and {} methods", fields.len(), methods.len());

		let attributes = read_attributes(&mut reader, &constant_pool).context("while reading class attributes")?;

		if !reader.is_empty() {
			return Err(ClassFileError::TrailingBytes { count: reader.remaining() }.into());
		}

		Ok(ClassFile {
			minor_version,
			major_version,
			constant_pool,
			access_flags,
			this_class,
			super_class,
			interfaces,
			fields,
			methods,
			attributes,
		})
	}

	/// Writes the class file, in the same order as it's read.
	///
	/// Fails with [`ClassFileError::LengthMismatch`] if any attribute doesn't have its declared length, see [`ClassFile::update_lengths`].
	pub fn write(&self) -> Result<Vec<u8>> {
		let mut writer = ByteWriter::with_capacity(self.length());
		self.write_to(&mut writer)?;
		Ok(writer.into_inner())
	}

	pub fn write_to(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u32(MAGIC);
		writer.write_u16(self.minor_version);
		writer.write_u16(self.major_version);
		self.constant_pool.write(writer).context("while writing constant pool")?;
		writer.write_u16(self.access_flags);
		writer.write_u16(self.this_class);
		writer.write_u16(self.super_class);
		writer.write_slice(&self.interfaces, ByteWriter::write_usize_as_u16, |w, &interface| {
			w.write_u16(interface);
			Ok(())
		}).context("while writing interfaces")?;
		write_members(writer, &self.fields, "field")?;
		write_members(writer, &self.methods, "method")?;
		write_attributes(writer, &self.attributes).context("while writing class attributes")
	}

	/// The number of bytes [`ClassFile::write`] produces.
	pub fn length(&self) -> usize {
		4 + 2 + 2
			+ self.constant_pool.length()
			+ 2 + 2 + 2
			+ 2 + 2 * self.interfaces.len()
			+ 2 + self.fields.iter().map(MemberInfo::length).sum::<usize>()
			+ 2 + self.methods.iter().map(MemberInfo::length).sum::<usize>()
			+ attributes_length(&self.attributes)
	}

	fn all_attributes(&self) -> impl Iterator<Item = &AttributeInfo> {
		self.fields.iter()
			.chain(&self.methods)
			.flat_map(|member| &member.attributes)
			.chain(&self.attributes)
	}

	/// Recomputes the declared length of every attribute, nested ones included.
	pub fn update_lengths(&mut self) -> Result<()> {
		for member in self.fields.iter_mut().chain(self.methods.iter_mut()) {
			for attribute in &mut member.attributes {
				attribute.update_length()?;
			}
		}
		for attribute in &mut self.attributes {
			attribute.update_length()?;
		}
		Ok(())
	}

	/// Checks that every attribute, nested ones included, has the length it declares.
	pub fn check_lengths(&self) -> Result<()> {
		for attribute in self.all_attributes() {
			attribute.check_length()?;
		}
		Ok(())
	}

	pub fn entry_at(&self, index: u16) -> Result<&PoolEntry, ClassFileError> {
		self.constant_pool.get(index)
	}

	pub fn resolve_utf8(&self, index: u16) -> Result<&str, ClassFileError> {
		self.constant_pool.resolve_utf8(index)
	}

	/// See [`ConstantPool::resolve_name`].
	pub fn resolve_name(&self, index: u16) -> Result<&str, ClassFileError> {
		self.constant_pool.resolve_name(index)
	}

	pub fn this_class_name(&self) -> Result<&str, ClassFileError> {
		self.constant_pool.resolve_class_name(self.this_class)
	}

	/// [`None`] if there's no super class, which is only the case for `java/lang/Object`.
	pub fn super_class_name(&self) -> Result<Option<&str>, ClassFileError> {
		if self.super_class == 0 {
			Ok(None)
		} else {
			self.constant_pool.resolve_class_name(self.super_class).map(Some)
		}
	}

	/// Finds a method by name and descriptor. Methods with names or descriptors that don't resolve are skipped.
	pub fn find_method(&self, name: &str, descriptor: &str) -> Option<&MemberInfo> {
		self.methods.iter().find(|method| {
			method.name(&self.constant_pool).is_ok_and(|n| n == name) &&
				method.descriptor(&self.constant_pool).is_ok_and(|d| d == descriptor)
		})
	}

	pub fn find_method_mut(&mut self, name: &str, descriptor: &str) -> Option<&mut MemberInfo> {
		let pool = &self.constant_pool;
		self.methods.iter_mut().find(|method| {
			method.name(pool).is_ok_and(|n| n == name) &&
				method.descriptor(pool).is_ok_and(|d| d == descriptor)
		})
	}

	pub fn add_constant_utf8(&mut self, value: &str) -> Result<u16> {
		self.constant_pool.add_constant_utf8(value)
	}

	pub fn add_constant_class(&mut self, name: &str) -> Result<u16> {
		self.constant_pool.add_constant_class(name)
	}

	pub fn add_constant_name_and_type(&mut self, name: &str, descriptor: &str) -> Result<u16> {
		self.constant_pool.add_constant_name_and_type(name, descriptor)
	}

	pub fn add_constant_methodref(&mut self, class: &str, name: &str, descriptor: &str) -> Result<u16> {
		self.constant_pool.add_constant_methodref(class, name, descriptor)
	}
}

fn write_members(writer: &mut ByteWriter, members: &[MemberInfo], kind: &str) -> Result<()> {
	writer.write_usize_as_u16(members.len()).with_context(|| anyhow!("{kind} count"))?;
	for (i, member) in members.iter().enumerate() {
		member.write(writer).with_context(|| anyhow!("while writing {kind} {i}"))?;
	}
	Ok(())
}
