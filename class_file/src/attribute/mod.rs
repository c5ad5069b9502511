//! Attributes, dispatched by the name their `attribute_name_index` resolves to.
//!
//! Every attribute keeps the `attribute_length` it was read with (or created with). Writing checks that the body still has exactly that
//! length, so call [`AttributeInfo::update_length`] after changing an attribute.
use anyhow::{anyhow, Context, Result};
use log::{debug, trace};
use crate::class_constants::attribute as names;
use crate::cursor::{ByteReader, ByteWriter};
use crate::error::ClassFileError;
use crate::pool::ConstantPool;

pub mod annotation;
pub mod code;
pub mod module;
pub mod stack_map;
pub mod type_annotation;

use annotation::{Annotation, ElementValue, ParameterAnnotations};
use code::CodeAttribute;
use module::ModuleAttribute;
use stack_map::StackMapFrame;
use type_annotation::TypeAnnotation;

/// A part of an attribute body whose layout doesn't depend on the constant pool.
pub(crate) trait Structure: Sized {
	fn read(reader: &mut ByteReader) -> Result<Self>;
	fn write(&self, writer: &mut ByteWriter) -> Result<()>;
	/// The number of bytes [`Structure::write`] produces.
	fn length(&self) -> usize;
}

impl Structure for u16 {
	fn read(reader: &mut ByteReader) -> Result<Self> {
		Ok(reader.read_u16()?)
	}
	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u16(*self);
		Ok(())
	}
	fn length(&self) -> usize {
		2
	}
}

/// Reads an `u16` count followed by that many elements.
pub(crate) fn read_list<T: Structure>(reader: &mut ByteReader) -> Result<Vec<T>> {
	reader.read_vec(ByteReader::read_u16_as_usize, T::read)
}

/// Writes an `u16` count followed by the elements.
pub(crate) fn write_list<T: Structure>(writer: &mut ByteWriter, list: &[T]) -> Result<()> {
	writer.write_slice(list, ByteWriter::write_usize_as_u16, |w, element| element.write(w))
}

/// The length of a list as written by [`write_list`].
pub(crate) fn list_length<T: Structure>(list: &[T]) -> usize {
	2 + list.iter().map(T::length).sum::<usize>()
}

pub(crate) fn read_attributes(reader: &mut ByteReader, pool: &ConstantPool) -> Result<Vec<AttributeInfo>> {
	reader.read_vec(ByteReader::read_u16_as_usize, |r| AttributeInfo::read(r, pool))
}

pub(crate) fn write_attributes(writer: &mut ByteWriter, attributes: &[AttributeInfo]) -> Result<()> {
	writer.write_slice(attributes, ByteWriter::write_usize_as_u16, |w, attribute| attribute.write(w))
}

pub(crate) fn attributes_length(attributes: &[AttributeInfo]) -> usize {
	2 + attributes.iter().map(AttributeInfo::length).sum::<usize>()
}

/// An attribute as found in the attribute tables of classes, fields, methods, `Code` attributes and record components.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeInfo {
	pub name_index: u16,
	/// The declared `attribute_length`.
	length: u32,
	pub data: Attribute,
}

impl AttributeInfo {
	/// Creates an attribute, adding its name to the pool. The declared length is computed from `data`.
	///
	/// Fails for [`Attribute::Unknown`], use [`AttributeInfo::unknown`] for these.
	pub fn new(pool: &mut ConstantPool, data: Attribute) -> Result<AttributeInfo> {
		let name = data.name()
			.ok_or_else(|| ClassFileError::malformed("attribute", "an unknown attribute has no name of its own"))?;
		let name_index = pool.add_constant_utf8(name)?;
		let length = data.computed_length().with_context(|| anyhow!("for new attribute {name:?}"))?;
		Ok(AttributeInfo { name_index, length, data })
	}

	/// Creates an opaque attribute with the given name, adding that name to the pool.
	pub fn unknown(pool: &mut ConstantPool, name: &str, info: Vec<u8>) -> Result<AttributeInfo> {
		let name_index = pool.add_constant_utf8(name)?;
		let data = Attribute::Unknown { info };
		let length = data.computed_length()?;
		Ok(AttributeInfo { name_index, length, data })
	}

	/// Reads `attribute_name_index`, `attribute_length` and exactly `attribute_length` bytes of body.
	pub fn read(reader: &mut ByteReader, pool: &ConstantPool) -> Result<AttributeInfo> {
		let name_index = reader.read_u16()?;
		let length = reader.read_u32()?;
		let mut body = reader.sub_reader(length as usize)?;

		let data = match pool.resolve_utf8(name_index) {
			Ok(name) => {
				trace!("reading attribute {name:?} of length {length}");
				let data = Attribute::read(name, &mut body, pool)
					.with_context(|| anyhow!("while reading attribute {name:?}"))?;
				if !body.is_empty() {
					return Err(ClassFileError::LengthMismatch {
						what: format!("attribute {name:?}"),
						declared: length,
						computed: body.bytes_consumed() as u32,
					}.into());
				}
				data
			},
			Err(e) => {
				debug!("treating attribute with unusable name as unknown: {e}");
				Attribute::Unknown { info: body.read_bytes(body.remaining())?.to_vec() }
			},
		};

		Ok(AttributeInfo { name_index, length, data })
	}

	/// Writes the attribute, failing with [`ClassFileError::LengthMismatch`] if the body no longer has the declared length.
	pub fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		self.check_length()?;
		writer.write_u16(self.name_index);
		writer.write_u32(self.length);
		self.data.write(writer)
	}

	/// The declared `attribute_length`.
	pub fn declared_length(&self) -> u32 {
		self.length
	}

	/// The number of bytes [`AttributeInfo::write`] produces, including the six bytes of header.
	pub fn length(&self) -> usize {
		6 + self.data.length()
	}

	/// Sets the declared length to the computed one, first doing so for all nested attributes.
	pub fn update_length(&mut self) -> Result<()> {
		for nested in self.data.nested_attributes_mut() {
			nested.update_length()?;
		}
		self.length = self.data.computed_length()?;
		Ok(())
	}

	/// Checks that this attribute, and all nested ones, have the length they declare.
	pub fn check_length(&self) -> Result<()> {
		for nested in self.data.nested_attributes() {
			nested.check_length()?;
		}
		let computed = self.data.computed_length()?;
		if computed != self.length {
			let what = match self.data.name() {
				Some(name) => format!("attribute {name:?}"),
				None => format!("attribute with name index {}", self.name_index),
			};
			return Err(ClassFileError::LengthMismatch { what, declared: self.length, computed }.into());
		}
		Ok(())
	}
}

/// The body of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
	ConstantValue { constantvalue_index: u16 },
	Code(CodeAttribute),
	StackMapTable { entries: Vec<StackMapFrame> },
	Exceptions { exception_index_table: Vec<u16> },
	InnerClasses { classes: Vec<InnerClassEntry> },
	EnclosingMethod { class_index: u16, method_index: u16 },
	Synthetic,
	Deprecated,
	Signature { signature_index: u16 },
	SourceFile { sourcefile_index: u16 },
	SourceDebugExtension { debug_extension: Vec<u8> },
	LineNumberTable { line_number_table: Vec<LineNumberEntry> },
	LocalVariableTable { local_variable_table: Vec<LocalVariableEntry> },
	LocalVariableTypeTable { local_variable_type_table: Vec<LocalVariableTypeEntry> },
	/// `RuntimeVisibleAnnotations` if `visible`, `RuntimeInvisibleAnnotations` otherwise.
	RuntimeAnnotations { visible: bool, annotations: Vec<Annotation> },
	/// `RuntimeVisibleParameterAnnotations` if `visible`, `RuntimeInvisibleParameterAnnotations` otherwise.
	RuntimeParameterAnnotations { visible: bool, parameter_annotations: Vec<ParameterAnnotations> },
	/// `RuntimeVisibleTypeAnnotations` if `visible`, `RuntimeInvisibleTypeAnnotations` otherwise.
	RuntimeTypeAnnotations { visible: bool, annotations: Vec<TypeAnnotation> },
	AnnotationDefault { default_value: ElementValue },
	BootstrapMethods { bootstrap_methods: Vec<BootstrapMethod> },
	MethodParameters { parameters: Vec<MethodParameter> },
	Module(ModuleAttribute),
	ModulePackages { package_index: Vec<u16> },
	ModuleMainClass { main_class_index: u16 },
	NestHost { host_class_index: u16 },
	NestMembers { classes: Vec<u16> },
	PermittedSubclasses { classes: Vec<u16> },
	Record { components: Vec<RecordComponent> },
	/// Any attribute not modeled here. The bytes are kept as they are.
	Unknown { info: Vec<u8> },
}

impl Attribute {
	/// The name this kind of attribute is stored under, [`None`] for [`Attribute::Unknown`].
	pub fn name(&self) -> Option<&'static str> {
		Some(match self {
			Attribute::ConstantValue { .. } => names::CONSTANT_VALUE,
			Attribute::Code(_) => names::CODE,
			Attribute::StackMapTable { .. } => names::STACK_MAP_TABLE,
			Attribute::Exceptions { .. } => names::EXCEPTIONS,
			Attribute::InnerClasses { .. } => names::INNER_CLASSES,
			Attribute::EnclosingMethod { .. } => names::ENCLOSING_METHOD,
			Attribute::Synthetic => names::SYNTHETIC,
			Attribute::Deprecated => names::DEPRECATED,
			Attribute::Signature { .. } => names::SIGNATURE,
			Attribute::SourceFile { .. } => names::SOURCE_FILE,
			Attribute::SourceDebugExtension { .. } => names::SOURCE_DEBUG_EXTENSION,
			Attribute::LineNumberTable { .. } => names::LINE_NUMBER_TABLE,
			Attribute::LocalVariableTable { .. } => names::LOCAL_VARIABLE_TABLE,
			Attribute::LocalVariableTypeTable { .. } => names::LOCAL_VARIABLE_TYPE_TABLE,
			Attribute::RuntimeAnnotations { visible: true, .. } => names::RUNTIME_VISIBLE_ANNOTATIONS,
			Attribute::RuntimeAnnotations { visible: false, .. } => names::RUNTIME_INVISIBLE_ANNOTATIONS,
			Attribute::RuntimeParameterAnnotations { visible: true, .. } => names::RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS,
			Attribute::RuntimeParameterAnnotations { visible: false, .. } => names::RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS,
			Attribute::RuntimeTypeAnnotations { visible: true, .. } => names::RUNTIME_VISIBLE_TYPE_ANNOTATIONS,
			Attribute::RuntimeTypeAnnotations { visible: false, .. } => names::RUNTIME_INVISIBLE_TYPE_ANNOTATIONS,
			Attribute::AnnotationDefault { .. } => names::ANNOTATION_DEFAULT,
			Attribute::BootstrapMethods { .. } => names::BOOTSTRAP_METHODS,
			Attribute::MethodParameters { .. } => names::METHOD_PARAMETERS,
			Attribute::Module(_) => names::MODULE,
			Attribute::ModulePackages { .. } => names::MODULE_PACKAGES,
			Attribute::ModuleMainClass { .. } => names::MODULE_MAIN_CLASS,
			Attribute::NestHost { .. } => names::NEST_HOST,
			Attribute::NestMembers { .. } => names::NEST_MEMBERS,
			Attribute::PermittedSubclasses { .. } => names::PERMITTED_SUBCLASSES,
			Attribute::Record { .. } => names::RECORD,
			Attribute::Unknown { .. } => return None,
		})
	}

	/// Reads the body of the attribute called `name`. Names not modeled here give [`Attribute::Unknown`].
	pub fn read(name: &str, reader: &mut ByteReader, pool: &ConstantPool) -> Result<Attribute> {
		Ok(match name {
			names::CONSTANT_VALUE => Attribute::ConstantValue { constantvalue_index: reader.read_u16()? },
			names::CODE => Attribute::Code(CodeAttribute::read(reader, pool)?),
			names::STACK_MAP_TABLE => Attribute::StackMapTable { entries: read_list(reader)? },
			names::EXCEPTIONS => Attribute::Exceptions { exception_index_table: read_list(reader)? },
			names::INNER_CLASSES => Attribute::InnerClasses { classes: read_list(reader)? },
			names::ENCLOSING_METHOD => Attribute::EnclosingMethod {
				class_index: reader.read_u16()?,
				method_index: reader.read_u16()?,
			},
			names::SYNTHETIC => Attribute::Synthetic,
			names::DEPRECATED => Attribute::Deprecated,
			names::SIGNATURE => Attribute::Signature { signature_index: reader.read_u16()? },
			names::SOURCE_FILE => Attribute::SourceFile { sourcefile_index: reader.read_u16()? },
			names::SOURCE_DEBUG_EXTENSION => Attribute::SourceDebugExtension {
				debug_extension: reader.read_bytes(reader.remaining())?.to_vec(),
			},
			names::LINE_NUMBER_TABLE => Attribute::LineNumberTable { line_number_table: read_list(reader)? },
			names::LOCAL_VARIABLE_TABLE => Attribute::LocalVariableTable { local_variable_table: read_list(reader)? },
			names::LOCAL_VARIABLE_TYPE_TABLE => Attribute::LocalVariableTypeTable { local_variable_type_table: read_list(reader)? },
			names::RUNTIME_VISIBLE_ANNOTATIONS => Attribute::RuntimeAnnotations { visible: true, annotations: read_list(reader)? },
			names::RUNTIME_INVISIBLE_ANNOTATIONS => Attribute::RuntimeAnnotations { visible: false, annotations: read_list(reader)? },
			names::RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS => Attribute::RuntimeParameterAnnotations {
				visible: true,
				parameter_annotations: annotation::read_parameter_annotations(reader)?,
			},
			names::RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS => Attribute::RuntimeParameterAnnotations {
				visible: false,
				parameter_annotations: annotation::read_parameter_annotations(reader)?,
			},
			names::RUNTIME_VISIBLE_TYPE_ANNOTATIONS => Attribute::RuntimeTypeAnnotations { visible: true, annotations: read_list(reader)? },
			names::RUNTIME_INVISIBLE_TYPE_ANNOTATIONS => Attribute::RuntimeTypeAnnotations { visible: false, annotations: read_list(reader)? },
			names::ANNOTATION_DEFAULT => Attribute::AnnotationDefault { default_value: ElementValue::read(reader)? },
			names::BOOTSTRAP_METHODS => Attribute::BootstrapMethods { bootstrap_methods: read_list(reader)? },
			names::METHOD_PARAMETERS => Attribute::MethodParameters {
				parameters: reader.read_vec(ByteReader::read_u8_as_usize, MethodParameter::read)?,
			},
			names::MODULE => Attribute::Module(ModuleAttribute::read(reader)?),
			names::MODULE_PACKAGES => Attribute::ModulePackages { package_index: read_list(reader)? },
			names::MODULE_MAIN_CLASS => Attribute::ModuleMainClass { main_class_index: reader.read_u16()? },
			names::NEST_HOST => Attribute::NestHost { host_class_index: reader.read_u16()? },
			names::NEST_MEMBERS => Attribute::NestMembers { classes: read_list(reader)? },
			names::PERMITTED_SUBCLASSES => Attribute::PermittedSubclasses { classes: read_list(reader)? },
			names::RECORD => Attribute::Record {
				components: reader.read_vec(ByteReader::read_u16_as_usize, |r| RecordComponent::read(r, pool))?,
			},
			_ => {
				debug!("keeping unknown attribute {name:?} as raw bytes");
				Attribute::Unknown { info: reader.read_bytes(reader.remaining())?.to_vec() }
			},
		})
	}

	/// Writes the body of the attribute, without name index and length.
	pub fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		match self {
			Attribute::ConstantValue { constantvalue_index } => writer.write_u16(*constantvalue_index),
			Attribute::Code(code) => code.write(writer)?,
			Attribute::StackMapTable { entries } => write_list(writer, entries)?,
			Attribute::Exceptions { exception_index_table } => write_list(writer, exception_index_table)?,
			Attribute::InnerClasses { classes } => write_list(writer, classes)?,
			Attribute::EnclosingMethod { class_index, method_index } => {
				writer.write_u16(*class_index);
				writer.write_u16(*method_index);
			},
			Attribute::Synthetic | Attribute::Deprecated => {},
			Attribute::Signature { signature_index } => writer.write_u16(*signature_index),
			Attribute::SourceFile { sourcefile_index } => writer.write_u16(*sourcefile_index),
			Attribute::SourceDebugExtension { debug_extension } => writer.write_bytes(debug_extension),
			Attribute::LineNumberTable { line_number_table } => write_list(writer, line_number_table)?,
			Attribute::LocalVariableTable { local_variable_table } => write_list(writer, local_variable_table)?,
			Attribute::LocalVariableTypeTable { local_variable_type_table } => write_list(writer, local_variable_type_table)?,
			Attribute::RuntimeAnnotations { annotations, .. } => write_list(writer, annotations)?,
			Attribute::RuntimeParameterAnnotations { parameter_annotations, .. } => {
				annotation::write_parameter_annotations(writer, parameter_annotations)?;
			},
			Attribute::RuntimeTypeAnnotations { annotations, .. } => write_list(writer, annotations)?,
			Attribute::AnnotationDefault { default_value } => default_value.write(writer)?,
			Attribute::BootstrapMethods { bootstrap_methods } => write_list(writer, bootstrap_methods)?,
			Attribute::MethodParameters { parameters } => {
				writer.write_slice(parameters, ByteWriter::write_usize_as_u8, |w, parameter| parameter.write(w))?;
			},
			Attribute::Module(module) => module.write(writer)?,
			Attribute::ModulePackages { package_index } => write_list(writer, package_index)?,
			Attribute::ModuleMainClass { main_class_index } => writer.write_u16(*main_class_index),
			Attribute::NestHost { host_class_index } => writer.write_u16(*host_class_index),
			Attribute::NestMembers { classes } => write_list(writer, classes)?,
			Attribute::PermittedSubclasses { classes } => write_list(writer, classes)?,
			Attribute::Record { components } => {
				writer.write_slice(components, ByteWriter::write_usize_as_u16, |w, component| component.write(w))?;
			},
			Attribute::Unknown { info } => writer.write_bytes(info),
		}
		Ok(())
	}

	/// The number of bytes [`Attribute::write`] produces.
	pub fn length(&self) -> usize {
		match self {
			Attribute::Synthetic | Attribute::Deprecated => 0,
			Attribute::ConstantValue { .. } | Attribute::Signature { .. } | Attribute::SourceFile { .. } => 2,
			Attribute::ModuleMainClass { .. } | Attribute::NestHost { .. } => 2,
			Attribute::EnclosingMethod { .. } => 4,
			Attribute::Code(code) => code.length(),
			Attribute::StackMapTable { entries } => list_length(entries),
			Attribute::Exceptions { exception_index_table } => list_length(exception_index_table),
			Attribute::InnerClasses { classes } => list_length(classes),
			Attribute::SourceDebugExtension { debug_extension } => debug_extension.len(),
			Attribute::LineNumberTable { line_number_table } => list_length(line_number_table),
			Attribute::LocalVariableTable { local_variable_table } => list_length(local_variable_table),
			Attribute::LocalVariableTypeTable { local_variable_type_table } => list_length(local_variable_type_table),
			Attribute::RuntimeAnnotations { annotations, .. } => list_length(annotations),
			Attribute::RuntimeParameterAnnotations { parameter_annotations, .. } => {
				1 + parameter_annotations.iter().map(Structure::length).sum::<usize>()
			},
			Attribute::RuntimeTypeAnnotations { annotations, .. } => list_length(annotations),
			Attribute::AnnotationDefault { default_value } => default_value.length(),
			Attribute::BootstrapMethods { bootstrap_methods } => list_length(bootstrap_methods),
			Attribute::MethodParameters { parameters } => 1 + parameters.iter().map(Structure::length).sum::<usize>(),
			Attribute::Module(module) => module.length(),
			Attribute::ModulePackages { package_index } => list_length(package_index),
			Attribute::NestMembers { classes } => list_length(classes),
			Attribute::PermittedSubclasses { classes } => list_length(classes),
			Attribute::Record { components } => 2 + components.iter().map(RecordComponent::length).sum::<usize>(),
			Attribute::Unknown { info } => info.len(),
		}
	}

	/// [`Attribute::length`] as it's stored in `attribute_length`.
	pub fn computed_length(&self) -> Result<u32> {
		let length = self.length();
		u32::try_from(length)
			.map_err(|_| ClassFileError::malformed("attribute", format!("body of {length} bytes is too large")).into())
	}

	fn nested_attributes(&self) -> Box<dyn Iterator<Item = &AttributeInfo> + '_> {
		match self {
			Attribute::Code(code) => Box::new(code.attributes.iter()),
			Attribute::Record { components } => Box::new(components.iter().flat_map(|c| c.attributes.iter())),
			_ => Box::new(std::iter::empty()),
		}
	}

	fn nested_attributes_mut(&mut self) -> Box<dyn Iterator<Item = &mut AttributeInfo> + '_> {
		match self {
			Attribute::Code(code) => Box::new(code.attributes.iter_mut()),
			Attribute::Record { components } => Box::new(components.iter_mut().flat_map(|c| c.attributes.iter_mut())),
			_ => Box::new(std::iter::empty()),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClassEntry {
	pub inner_class_info_index: u16,
	pub outer_class_info_index: u16,
	pub inner_name_index: u16,
	pub inner_class_access_flags: u16,
}

impl Structure for InnerClassEntry {
	fn read(reader: &mut ByteReader) -> Result<Self> {
		Ok(InnerClassEntry {
			inner_class_info_index: reader.read_u16()?,
			outer_class_info_index: reader.read_u16()?,
			inner_name_index: reader.read_u16()?,
			inner_class_access_flags: reader.read_u16()?,
		})
	}
	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u16(self.inner_class_info_index);
		writer.write_u16(self.outer_class_info_index);
		writer.write_u16(self.inner_name_index);
		writer.write_u16(self.inner_class_access_flags);
		Ok(())
	}
	fn length(&self) -> usize {
		8
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineNumberEntry {
	pub start_pc: u16,
	pub line_number: u16,
}

impl Structure for LineNumberEntry {
	fn read(reader: &mut ByteReader) -> Result<Self> {
		Ok(LineNumberEntry { start_pc: reader.read_u16()?, line_number: reader.read_u16()? })
	}
	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u16(self.start_pc);
		writer.write_u16(self.line_number);
		Ok(())
	}
	fn length(&self) -> usize {
		4
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariableEntry {
	pub start_pc: u16,
	pub length: u16,
	pub name_index: u16,
	pub descriptor_index: u16,
	pub index: u16,
}

impl Structure for LocalVariableEntry {
	fn read(reader: &mut ByteReader) -> Result<Self> {
		Ok(LocalVariableEntry {
			start_pc: reader.read_u16()?,
			length: reader.read_u16()?,
			name_index: reader.read_u16()?,
			descriptor_index: reader.read_u16()?,
			index: reader.read_u16()?,
		})
	}
	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u16(self.start_pc);
		writer.write_u16(self.length);
		writer.write_u16(self.name_index);
		writer.write_u16(self.descriptor_index);
		writer.write_u16(self.index);
		Ok(())
	}
	fn length(&self) -> usize {
		10
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariableTypeEntry {
	pub start_pc: u16,
	pub length: u16,
	pub name_index: u16,
	pub signature_index: u16,
	pub index: u16,
}

impl Structure for LocalVariableTypeEntry {
	fn read(reader: &mut ByteReader) -> Result<Self> {
		Ok(LocalVariableTypeEntry {
			start_pc: reader.read_u16()?,
			length: reader.read_u16()?,
			name_index: reader.read_u16()?,
			signature_index: reader.read_u16()?,
			index: reader.read_u16()?,
		})
	}
	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u16(self.start_pc);
		writer.write_u16(self.length);
		writer.write_u16(self.name_index);
		writer.write_u16(self.signature_index);
		writer.write_u16(self.index);
		Ok(())
	}
	fn length(&self) -> usize {
		10
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapMethod {
	/// Index of a `MethodHandle` pool entry.
	pub bootstrap_method_ref: u16,
	pub bootstrap_arguments: Vec<u16>,
}

impl Structure for BootstrapMethod {
	fn read(reader: &mut ByteReader) -> Result<Self> {
		Ok(BootstrapMethod {
			bootstrap_method_ref: reader.read_u16()?,
			bootstrap_arguments: read_list(reader)?,
		})
	}
	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u16(self.bootstrap_method_ref);
		write_list(writer, &self.bootstrap_arguments)
	}
	fn length(&self) -> usize {
		2 + list_length(&self.bootstrap_arguments)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodParameter {
	/// Zero for a parameter without name.
	pub name_index: u16,
	pub access_flags: u16,
}

impl Structure for MethodParameter {
	fn read(reader: &mut ByteReader) -> Result<Self> {
		Ok(MethodParameter { name_index: reader.read_u16()?, access_flags: reader.read_u16()? })
	}
	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u16(self.name_index);
		writer.write_u16(self.access_flags);
		Ok(())
	}
	fn length(&self) -> usize {
		4
	}
}

/// A component of a record, carrying its own attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordComponent {
	pub name_index: u16,
	pub descriptor_index: u16,
	pub attributes: Vec<AttributeInfo>,
}

impl RecordComponent {
	fn read(reader: &mut ByteReader, pool: &ConstantPool) -> Result<RecordComponent> {
		Ok(RecordComponent {
			name_index: reader.read_u16()?,
			descriptor_index: reader.read_u16()?,
			attributes: read_attributes(reader, pool)?,
		})
	}

	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u16(self.name_index);
		writer.write_u16(self.descriptor_index);
		write_attributes(writer, &self.attributes)
	}

	fn length(&self) -> usize {
		4 + attributes_length(&self.attributes)
	}
}

#[cfg(test)]
mod testing {
	use anyhow::Result;
	use pretty_assertions::assert_eq;
	use crate::attribute::{Attribute, AttributeInfo, LineNumberEntry};
	use crate::cursor::{ByteReader, ByteWriter};
	use crate::error::{error_kind, ClassFileError};
	use crate::pool::ConstantPool;

	fn read(pool: &ConstantPool, bytes: &[u8]) -> Result<AttributeInfo> {
		let mut reader = ByteReader::new(bytes);
		let attribute = AttributeInfo::read(&mut reader, pool)?;
		assert!(reader.is_empty());
		Ok(attribute)
	}

	fn write(attribute: &AttributeInfo) -> Result<Vec<u8>> {
		let mut writer = ByteWriter::new();
		attribute.write(&mut writer)?;
		Ok(writer.into_inner())
	}

	#[test]
	fn line_number_table() -> Result<()> {
		let mut pool = ConstantPool::new();
		let name = pool.add_constant_utf8("LineNumberTable")?;
		let bytes = [
			0x00, name as u8, 0x00, 0x00, 0x00, 0x0a,
			0x00, 0x02,
			0x00, 0x00, 0x00, 0x03,
			0x00, 0x04, 0x00, 0x05,
		];

		let attribute = read(&pool, &bytes)?;
		assert_eq!(attribute.data, Attribute::LineNumberTable {
			line_number_table: vec![
				LineNumberEntry { start_pc: 0, line_number: 3 },
				LineNumberEntry { start_pc: 4, line_number: 5 },
			],
		});
		assert_eq!(attribute.length(), bytes.len());
		assert_eq!(write(&attribute)?, bytes);
		Ok(())
	}

	#[test]
	fn unknown_name_keeps_bytes() -> Result<()> {
		let mut pool = ConstantPool::new();
		let name = pool.add_constant_utf8("org.example.Custom")?;
		let bytes = [0x00, name as u8, 0x00, 0x00, 0x00, 0x03, 0xde, 0xad, 0x00];

		let attribute = read(&pool, &bytes)?;
		assert_eq!(attribute.data, Attribute::Unknown { info: vec![0xde, 0xad, 0x00] });
		assert_eq!(write(&attribute)?, bytes);
		Ok(())
	}

	#[test]
	fn unusable_name_index_is_unknown() -> Result<()> {
		let pool = ConstantPool::new();
		let bytes = [0x00, 0x09, 0x00, 0x00, 0x00, 0x01, 0x42];

		let attribute = read(&pool, &bytes)?;
		assert_eq!(attribute.data, Attribute::Unknown { info: vec![0x42] });
		Ok(())
	}

	#[test]
	fn body_shorter_than_declared() -> Result<()> {
		let mut pool = ConstantPool::new();
		let name = pool.add_constant_utf8("SourceFile")?;
		// SourceFile only takes two bytes
		let bytes = [0x00, name as u8, 0x00, 0x00, 0x00, 0x03, 0x00, 0x01, 0x00];

		let error = AttributeInfo::read(&mut ByteReader::new(&bytes), &pool).unwrap_err();
		assert_eq!(error_kind(&error), Some(&ClassFileError::LengthMismatch {
			what: "attribute \"SourceFile\"".to_owned(),
			declared: 3,
			computed: 2,
		}));
		Ok(())
	}

	#[test]
	fn stale_length_is_caught_and_updated() -> Result<()> {
		let mut pool = ConstantPool::new();
		let mut attribute = AttributeInfo::new(&mut pool, Attribute::Exceptions { exception_index_table: vec![3] })?;
		assert_eq!(attribute.declared_length(), 4);

		if let Attribute::Exceptions { exception_index_table } = &mut attribute.data {
			exception_index_table.push(4);
		}
		let error = write(&attribute).unwrap_err();
		assert!(matches!(error_kind(&error), Some(ClassFileError::LengthMismatch { declared: 4, computed: 6, .. })));

		attribute.update_length()?;
		assert_eq!(write(&attribute)?, [0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x00, 0x02, 0x00, 0x03, 0x00, 0x04]);
		Ok(())
	}
}
