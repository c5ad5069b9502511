//! The constant pool: its entries, lookups by index, and adding new entries.
use std::fmt::{Debug, Formatter};
use anyhow::{anyhow, Context, Result};
use log::trace;
use crate::class_constants::pool;
use crate::class_constants::pool::method_handle_reference;
use crate::cursor::{ByteReader, ByteWriter};
use crate::error::ClassFileError;
use crate::jstring;

/// The amount of slots the `add_constant_*` methods ask the pool to grow by at once.
const GROWTH_HINT: usize = 16;

/// An entry of the constant pool.
///
/// Entries referring to other entries only store their indices. These are resolved through the [`ConstantPool`] owning them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PoolEntry {
	/// The `bytes` are authoritative and get written back unchanged, `text` is a decoded view of them.
	Utf8 { bytes: Vec<u8>, text: String },
	Integer { value: i32 },
	/// Stored as bits, so that every NaN survives unchanged.
	Float { bits: u32 },
	Long { value: i64 },
	Double { bits: u64 },
	Class { name_index: u16 },
	String { string_index: u16 },
	FieldRef { class_index: u16, name_and_type_index: u16 },
	MethodRef { class_index: u16, name_and_type_index: u16 },
	InterfaceMethodRef { class_index: u16, name_and_type_index: u16 },
	NameAndType { name_index: u16, descriptor_index: u16 },
	MethodHandle { reference_kind: u8, reference_index: u16 },
	MethodType { descriptor_index: u16 },
	Dynamic { bootstrap_method_attr_index: u16, name_and_type_index: u16 },
	InvokeDynamic { bootstrap_method_attr_index: u16, name_and_type_index: u16 },
	Module { name_index: u16 },
	Package { name_index: u16 },
}

impl PoolEntry {
	pub fn utf8(text: &str) -> PoolEntry {
		PoolEntry::Utf8 { bytes: jstring::encode(text), text: text.to_owned() }
	}

	pub fn utf8_from_bytes(bytes: Vec<u8>) -> PoolEntry {
		let text = jstring::decode_lossy(&bytes);
		PoolEntry::Utf8 { bytes, text }
	}

	pub fn tag(&self) -> u8 {
		match self {
			PoolEntry::Utf8 { .. } => pool::UTF8,
			PoolEntry::Integer { .. } => pool::INTEGER,
			PoolEntry::Float { .. } => pool::FLOAT,
			PoolEntry::Long { .. } => pool::LONG,
			PoolEntry::Double { .. } => pool::DOUBLE,
			PoolEntry::Class { .. } => pool::CLASS,
			PoolEntry::String { .. } => pool::STRING,
			PoolEntry::FieldRef { .. } => pool::FIELD_REF,
			PoolEntry::MethodRef { .. } => pool::METHOD_REF,
			PoolEntry::InterfaceMethodRef { .. } => pool::INTERFACE_METHOD_REF,
			PoolEntry::NameAndType { .. } => pool::NAME_AND_TYPE,
			PoolEntry::MethodHandle { .. } => pool::METHOD_HANDLE,
			PoolEntry::MethodType { .. } => pool::METHOD_TYPE,
			PoolEntry::Dynamic { .. } => pool::DYNAMIC,
			PoolEntry::InvokeDynamic { .. } => pool::INVOKE_DYNAMIC,
			PoolEntry::Module { .. } => pool::MODULE,
			PoolEntry::Package { .. } => pool::PACKAGE,
		}
	}

	pub fn kind_name(&self) -> &'static str {
		match self {
			PoolEntry::Utf8 { .. } => "Utf8",
			PoolEntry::Integer { .. } => "Integer",
			PoolEntry::Float { .. } => "Float",
			PoolEntry::Long { .. } => "Long",
			PoolEntry::Double { .. } => "Double",
			PoolEntry::Class { .. } => "Class",
			PoolEntry::String { .. } => "String",
			PoolEntry::FieldRef { .. } => "Fieldref",
			PoolEntry::MethodRef { .. } => "Methodref",
			PoolEntry::InterfaceMethodRef { .. } => "InterfaceMethodref",
			PoolEntry::NameAndType { .. } => "NameAndType",
			PoolEntry::MethodHandle { .. } => "MethodHandle",
			PoolEntry::MethodType { .. } => "MethodType",
			PoolEntry::Dynamic { .. } => "Dynamic",
			PoolEntry::InvokeDynamic { .. } => "InvokeDynamic",
			PoolEntry::Module { .. } => "Module",
			PoolEntry::Package { .. } => "Package",
		}
	}

	/// `true` for [`PoolEntry::Long`] and [`PoolEntry::Double`], which take up two pool slots.
	pub fn is_wide(&self) -> bool {
		matches!(self, PoolEntry::Long { .. } | PoolEntry::Double { .. })
	}

	/// Reads the tag byte and the entry following it. The `index` is only used for error messages.
	pub fn read(reader: &mut ByteReader, index: u16) -> Result<PoolEntry> {
		Ok(match reader.read_u8()? {
			pool::UTF8 => {
				let length = reader.read_u16_as_usize()?;
				PoolEntry::utf8_from_bytes(reader.read_bytes(length)?.to_vec())
			},
			pool::INTEGER => PoolEntry::Integer { value: reader.read_i32()? },
			pool::FLOAT => PoolEntry::Float { bits: reader.read_u32()? },
			pool::LONG => PoolEntry::Long { value: reader.read_i64()? },
			pool::DOUBLE => PoolEntry::Double { bits: reader.read_u64()? },
			pool::CLASS => PoolEntry::Class { name_index: reader.read_u16()? },
			pool::STRING => PoolEntry::String { string_index: reader.read_u16()? },
			pool::FIELD_REF => PoolEntry::FieldRef {
				class_index: reader.read_u16()?,
				name_and_type_index: reader.read_u16()?,
			},
			pool::METHOD_REF => PoolEntry::MethodRef {
				class_index: reader.read_u16()?,
				name_and_type_index: reader.read_u16()?,
			},
			pool::INTERFACE_METHOD_REF => PoolEntry::InterfaceMethodRef {
				class_index: reader.read_u16()?,
				name_and_type_index: reader.read_u16()?,
			},
			pool::NAME_AND_TYPE => PoolEntry::NameAndType {
				name_index: reader.read_u16()?,
				descriptor_index: reader.read_u16()?,
			},
			pool::METHOD_HANDLE => PoolEntry::MethodHandle {
				reference_kind: reader.read_u8()?,
				reference_index: reader.read_u16()?,
			},
			pool::METHOD_TYPE => PoolEntry::MethodType { descriptor_index: reader.read_u16()? },
			pool::DYNAMIC => PoolEntry::Dynamic {
				bootstrap_method_attr_index: reader.read_u16()?,
				name_and_type_index: reader.read_u16()?,
			},
			pool::INVOKE_DYNAMIC => PoolEntry::InvokeDynamic {
				bootstrap_method_attr_index: reader.read_u16()?,
				name_and_type_index: reader.read_u16()?,
			},
			pool::MODULE => PoolEntry::Module { name_index: reader.read_u16()? },
			pool::PACKAGE => PoolEntry::Package { name_index: reader.read_u16()? },
			tag => return Err(ClassFileError::UnknownPoolTag { tag, index }.into()),
		})
	}

	pub fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u8(self.tag());
		match *self {
			PoolEntry::Utf8 { ref bytes, .. } => {
				writer.write_usize_as_u16(bytes.len()).context("length of `Utf8` entry")?;
				writer.write_bytes(bytes);
			},
			PoolEntry::Integer { value } => writer.write_i32(value),
			PoolEntry::Float { bits } => writer.write_u32(bits),
			PoolEntry::Long { value } => writer.write_i64(value),
			PoolEntry::Double { bits } => writer.write_u64(bits),
			PoolEntry::Class { name_index } => writer.write_u16(name_index),
			PoolEntry::String { string_index } => writer.write_u16(string_index),
			PoolEntry::FieldRef { class_index, name_and_type_index } |
			PoolEntry::MethodRef { class_index, name_and_type_index } |
			PoolEntry::InterfaceMethodRef { class_index, name_and_type_index } => {
				writer.write_u16(class_index);
				writer.write_u16(name_and_type_index);
			},
			PoolEntry::NameAndType { name_index, descriptor_index } => {
				writer.write_u16(name_index);
				writer.write_u16(descriptor_index);
			},
			PoolEntry::MethodHandle { reference_kind, reference_index } => {
				writer.write_u8(reference_kind);
				writer.write_u16(reference_index);
			},
			PoolEntry::MethodType { descriptor_index } => writer.write_u16(descriptor_index),
			PoolEntry::Dynamic { bootstrap_method_attr_index, name_and_type_index } |
			PoolEntry::InvokeDynamic { bootstrap_method_attr_index, name_and_type_index } => {
				writer.write_u16(bootstrap_method_attr_index);
				writer.write_u16(name_and_type_index);
			},
			PoolEntry::Module { name_index } => writer.write_u16(name_index),
			PoolEntry::Package { name_index } => writer.write_u16(name_index),
		}
		Ok(())
	}

	/// The number of bytes [`PoolEntry::write`] produces, tag included.
	pub fn length(&self) -> usize {
		1 + match self {
			PoolEntry::Utf8 { bytes, .. } => 2 + bytes.len(),
			PoolEntry::Integer { .. } | PoolEntry::Float { .. } => 4,
			PoolEntry::Long { .. } | PoolEntry::Double { .. } => 8,
			PoolEntry::Class { .. } | PoolEntry::String { .. } | PoolEntry::MethodType { .. } => 2,
			PoolEntry::Module { .. } | PoolEntry::Package { .. } => 2,
			PoolEntry::MethodHandle { .. } => 3,
			PoolEntry::FieldRef { .. } | PoolEntry::MethodRef { .. } | PoolEntry::InterfaceMethodRef { .. } |
			PoolEntry::NameAndType { .. } | PoolEntry::Dynamic { .. } | PoolEntry::InvokeDynamic { .. } => 4,
		}
	}

	/// Renders the entry for humans, following the indices it holds through `pool`.
	pub fn resolved_text(&self, pool: &ConstantPool) -> Result<String, ClassFileError> {
		Ok(match *self {
			PoolEntry::Utf8 { ref text, .. } => text.clone(),
			PoolEntry::Integer { value } => value.to_string(),
			PoolEntry::Float { bits } => format!("{}f", f32::from_bits(bits)),
			PoolEntry::Long { value } => format!("{value}L"),
			PoolEntry::Double { bits } => format!("{}d", f64::from_bits(bits)),
			PoolEntry::Class { name_index } => pool.resolve_utf8(name_index)?.to_owned(),
			PoolEntry::String { string_index } => pool.resolve_utf8(string_index)?.to_owned(),
			PoolEntry::FieldRef { class_index, name_and_type_index } |
			PoolEntry::MethodRef { class_index, name_and_type_index } |
			PoolEntry::InterfaceMethodRef { class_index, name_and_type_index } => {
				let class = pool.resolve_class_name(class_index)?;
				let (name, descriptor) = pool.resolve_name_and_type(name_and_type_index)?;
				format!("{class}.{name}:{descriptor}")
			},
			PoolEntry::NameAndType { name_index, descriptor_index } => {
				format!("{}:{}", pool.resolve_utf8(name_index)?, pool.resolve_utf8(descriptor_index)?)
			},
			PoolEntry::MethodHandle { reference_kind, reference_index } => {
				let target = pool.resolved_text(reference_index)?;
				format!("{} {target}", reference_kind_name(reference_kind))
			},
			PoolEntry::MethodType { descriptor_index } => pool.resolve_utf8(descriptor_index)?.to_owned(),
			PoolEntry::Dynamic { bootstrap_method_attr_index, name_and_type_index } |
			PoolEntry::InvokeDynamic { bootstrap_method_attr_index, name_and_type_index } => {
				let (name, descriptor) = pool.resolve_name_and_type(name_and_type_index)?;
				format!("#{bootstrap_method_attr_index}:{name}:{descriptor}")
			},
			PoolEntry::Module { name_index } | PoolEntry::Package { name_index } => pool.resolve_utf8(name_index)?.to_owned(),
		})
	}
}

fn reference_kind_name(reference_kind: u8) -> &'static str {
	match reference_kind {
		method_handle_reference::GET_FIELD => "REF_getField",
		method_handle_reference::GET_STATIC => "REF_getStatic",
		method_handle_reference::PUT_FIELD => "REF_putField",
		method_handle_reference::PUT_STATIC => "REF_putStatic",
		method_handle_reference::INVOKE_VIRTUAL => "REF_invokeVirtual",
		method_handle_reference::INVOKE_STATIC => "REF_invokeStatic",
		method_handle_reference::INVOKE_SPECIAL => "REF_invokeSpecial",
		method_handle_reference::NEW_INVOKE_SPECIAL => "REF_newInvokeSpecial",
		method_handle_reference::INVOKE_INTERFACE => "REF_invokeInterface",
		_ => "REF_unknown",
	}
}

/// The constant pool of a class file. Indices start at `1`.
#[derive(Clone, PartialEq, Eq)]
pub struct ConstantPool {
	/// We store a [`None`] for the zero index, as well as for the upper indices of [`PoolEntry::Double`] and [`PoolEntry::Long`].
	entries: Vec<Option<PoolEntry>>,
}

impl Default for ConstantPool {
	fn default() -> Self {
		ConstantPool { entries: vec![None] }
	}
}

impl ConstantPool {
	/// Creates an empty pool, the first index given out is `1`.
	pub fn new() -> ConstantPool {
		ConstantPool::default()
	}

	/// Reads the constant pool. The first thing read is an `u16` specifying the `constant_pool_count`.
	pub fn read(reader: &mut ByteReader) -> Result<ConstantPool> {
		let constant_pool_count = reader.read_u16_as_usize()?;
		if constant_pool_count == 0 {
			return Err(ClassFileError::malformed("constant pool", "`constant_pool_count` must be at least 1").into());
		}

		let mut entries = Vec::with_capacity(constant_pool_count);
		entries.push(None);
		while entries.len() < constant_pool_count {
			let index = entries.len() as u16; // can't overflow, as `constant_pool_count` is an u16
			let entry = PoolEntry::read(reader, index)
				.with_context(|| anyhow!("while reading constant pool entry {index}"))?;
			let wide = entry.is_wide();
			entries.push(Some(entry));
			if wide {
				entries.push(None); // long and double take up two pool slots
			}
		}
		if entries.len() != constant_pool_count {
			return Err(ClassFileError::malformed("constant pool", "last entry is a `Long` or `Double` without room for its second slot").into());
		}

		trace!("read constant pool with {constant_pool_count} slots");

		Ok(ConstantPool { entries })
	}

	/// Writes the constant pool, starting with the `constant_pool_count`.
	pub fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_usize_as_u16(self.entries.len()).context("constant pool count")?;
		for (index, entry) in self.iter() {
			entry.write(writer).with_context(|| anyhow!("while writing constant pool entry {index}"))?;
		}
		Ok(())
	}

	/// The number of bytes [`ConstantPool::write`] produces.
	pub fn length(&self) -> usize {
		2 + self.iter().map(|(_, entry)| entry.length()).sum::<usize>()
	}

	/// The `constant_pool_count`: one more than the largest index.
	pub fn count(&self) -> u16 {
		self.entries.len() as u16
	}

	/// Iterates over all live entries together with their indices.
	pub fn iter(&self) -> impl Iterator<Item = (u16, &PoolEntry)> {
		self.entries.iter()
			.enumerate()
			.filter_map(|(index, entry)| entry.as_ref().map(|entry| (index as u16, entry)))
	}

	/// Gets the entry at `index`.
	///
	/// Index `0` and the slot following a [`PoolEntry::Long`] or [`PoolEntry::Double`] never hold an entry.
	pub fn get(&self, index: u16) -> Result<&PoolEntry, ClassFileError> {
		match self.entries.get(index as usize) {
			Some(Some(entry)) => Ok(entry),
			Some(None) if index == 0 => Err(ClassFileError::unresolved(index, "index zero is never a valid entry")),
			Some(None) => Err(ClassFileError::unresolved(index, "upper half of a `Long` or `Double` entry")),
			None => Err(ClassFileError::unresolved(index, format!("out of range, the pool has {} slots", self.entries.len()))),
		}
	}

	fn wrong_kind<T>(index: u16, expected: &str, got: &PoolEntry) -> Result<T, ClassFileError> {
		Err(ClassFileError::unresolved(index, format!("expected a `{expected}` entry, got `{}`", got.kind_name())))
	}

	pub fn resolve_utf8(&self, index: u16) -> Result<&str, ClassFileError> {
		match self.get(index)? {
			PoolEntry::Utf8 { text, .. } => Ok(text),
			entry => Self::wrong_kind(index, "Utf8", entry),
		}
	}

	pub fn resolve_utf8_bytes(&self, index: u16) -> Result<&[u8], ClassFileError> {
		match self.get(index)? {
			PoolEntry::Utf8 { bytes, .. } => Ok(bytes),
			entry => Self::wrong_kind(index, "Utf8", entry),
		}
	}

	pub fn resolve_class_name(&self, index: u16) -> Result<&str, ClassFileError> {
		match *self.get(index)? {
			PoolEntry::Class { name_index } => self.resolve_utf8(name_index),
			ref entry => Self::wrong_kind(index, "Class", entry),
		}
	}

	pub fn resolve_name_and_type(&self, index: u16) -> Result<(&str, &str), ClassFileError> {
		match *self.get(index)? {
			PoolEntry::NameAndType { name_index, descriptor_index } => {
				Ok((self.resolve_utf8(name_index)?, self.resolve_utf8(descriptor_index)?))
			},
			ref entry => Self::wrong_kind(index, "NameAndType", entry),
		}
	}

	/// Resolves the name an entry carries: the text of an `Utf8`, or the name of a `Class`, `String`, `NameAndType`, `MethodType`, `Module` or
	/// `Package` entry.
	pub fn resolve_name(&self, index: u16) -> Result<&str, ClassFileError> {
		match *self.get(index)? {
			PoolEntry::Utf8 { ref text, .. } => Ok(text),
			PoolEntry::Class { name_index } |
			PoolEntry::NameAndType { name_index, .. } |
			PoolEntry::Module { name_index } |
			PoolEntry::Package { name_index } => self.resolve_utf8(name_index),
			PoolEntry::String { string_index } => self.resolve_utf8(string_index),
			PoolEntry::MethodType { descriptor_index } => self.resolve_utf8(descriptor_index),
			ref entry => Self::wrong_kind(index, "named", entry),
		}
	}

	/// Renders the entry at `index` for humans, see [`PoolEntry::resolved_text`].
	pub fn resolved_text(&self, index: u16) -> Result<String, ClassFileError> {
		self.get(index)?.resolved_text(self)
	}

	/// Returns the index of an entry equal to `entry`, adding it to the end of the pool if there's none.
	///
	/// If the pool needs to grow, it grows by at least `size_hint` slots. Existing indices are never changed.
	pub fn add_or_get(&mut self, entry: PoolEntry, size_hint: usize) -> Result<u16> {
		if let Some((index, _)) = self.iter().find(|&(_, existing)| *existing == entry) {
			return Ok(index);
		}

		let slots = if entry.is_wide() { 2 } else { 1 };
		let index = self.entries.len();
		if index + slots > u16::MAX as usize {
			return Err(ClassFileError::malformed("constant pool", format!("no room left for a `{}` entry", entry.kind_name())).into());
		}

		if self.entries.capacity() - self.entries.len() < slots {
			self.entries.reserve(size_hint.max(slots));
		}
		self.entries.push(Some(entry));
		if slots == 2 {
			self.entries.push(None); // long and double take up two pool slots
		}

		Ok(index as u16)
	}

	pub fn add_constant_utf8(&mut self, value: &str) -> Result<u16> {
		self.add_or_get(PoolEntry::utf8(value), GROWTH_HINT)
	}

	pub fn add_constant_class(&mut self, name: &str) -> Result<u16> {
		let name_index = self.add_constant_utf8(name)?;
		self.add_or_get(PoolEntry::Class { name_index }, GROWTH_HINT)
	}

	pub fn add_constant_string(&mut self, value: &str) -> Result<u16> {
		let string_index = self.add_constant_utf8(value)?;
		self.add_or_get(PoolEntry::String { string_index }, GROWTH_HINT)
	}

	pub fn add_constant_integer(&mut self, value: i32) -> Result<u16> {
		self.add_or_get(PoolEntry::Integer { value }, GROWTH_HINT)
	}

	pub fn add_constant_float(&mut self, value: f32) -> Result<u16> {
		self.add_or_get(PoolEntry::Float { bits: value.to_bits() }, GROWTH_HINT)
	}

	pub fn add_constant_long(&mut self, value: i64) -> Result<u16> {
		self.add_or_get(PoolEntry::Long { value }, GROWTH_HINT)
	}

	pub fn add_constant_double(&mut self, value: f64) -> Result<u16> {
		self.add_or_get(PoolEntry::Double { bits: value.to_bits() }, GROWTH_HINT)
	}

	pub fn add_constant_name_and_type(&mut self, name: &str, descriptor: &str) -> Result<u16> {
		let name_index = self.add_constant_utf8(name)?;
		let descriptor_index = self.add_constant_utf8(descriptor)?;
		self.add_or_get(PoolEntry::NameAndType { name_index, descriptor_index }, GROWTH_HINT)
	}

	pub fn add_constant_fieldref(&mut self, class: &str, name: &str, descriptor: &str) -> Result<u16> {
		let class_index = self.add_constant_class(class)?;
		let name_and_type_index = self.add_constant_name_and_type(name, descriptor)?;
		self.add_or_get(PoolEntry::FieldRef { class_index, name_and_type_index }, GROWTH_HINT)
	}

	pub fn add_constant_methodref(&mut self, class: &str, name: &str, descriptor: &str) -> Result<u16> {
		let class_index = self.add_constant_class(class)?;
		let name_and_type_index = self.add_constant_name_and_type(name, descriptor)?;
		self.add_or_get(PoolEntry::MethodRef { class_index, name_and_type_index }, GROWTH_HINT)
	}

	pub fn add_constant_interface_methodref(&mut self, class: &str, name: &str, descriptor: &str) -> Result<u16> {
		let class_index = self.add_constant_class(class)?;
		let name_and_type_index = self.add_constant_name_and_type(name, descriptor)?;
		self.add_or_get(PoolEntry::InterfaceMethodRef { class_index, name_and_type_index }, GROWTH_HINT)
	}
}

impl Debug for ConstantPool {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let mut d = f.debug_map();
		for (index, entry) in self.iter() {
			match entry.resolved_text(self) {
				Ok(text) => d.entry(&index, &format_args!("{}: {text}", entry.kind_name())),
				Err(e) => d.entry(&index, &format_args!("{}: <{e}>", entry.kind_name())),
			};
		}
		d.finish()
	}
}
