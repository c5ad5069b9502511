//! A crate for reading and writing [Java Class Files](https://docs.oracle.com/javase/specs/jvms/se22/html/jvms-4.html), keeping every byte.
//!
//! Reading a class file and writing it again gives back exactly the bytes read. To get there, the model stays close to the binary
//! format: everything refers to the constant pool by index, attributes keep their declared length, attributes with unknown names keep their
//! bytes, and the instructions of a `Code` attribute are only decoded when asked for.
//!
//! ```
//! # use anyhow::Result;
//! # fn main() -> Result<()> {
//! use class_file::{flags, ClassFile, ConstantPool};
//!
//! let mut constant_pool = ConstantPool::new();
//! let this_class = constant_pool.add_constant_class("org/example/Main")?;
//! let super_class = constant_pool.add_constant_class("java/lang/Object")?;
//!
//! let class = ClassFile {
//!     minor_version: 0,
//!     major_version: 52,
//!     constant_pool,
//!     access_flags: flags::ACC_SUPER,
//!     this_class,
//!     super_class,
//!     interfaces: vec![],
//!     fields: vec![],
//!     methods: vec![],
//!     attributes: vec![],
//! };
//!
//! let bytes = class.write()?;
//! assert_eq!(bytes.len(), class.length());
//! assert_eq!(ClassFile::read(&bytes)?.write()?, bytes);
//! # Ok(())
//! # }
//! ```
//!
//! All fallible functions return [`anyhow::Result`]. Use [`error_kind`] to find out which [`ClassFileError`] caused an error.

pub mod attribute;
pub mod bytecode;
pub mod class;
pub mod class_constants;
pub mod cursor;
pub mod error;
mod jstring;
pub mod pool;

use std::io::{Read, Write};
use anyhow::{Context, Result};

pub use attribute::{Attribute, AttributeInfo};
pub use bytecode::{Instruction, InstructionKind, Operands};
pub use class::{ClassFile, MemberInfo};
pub use class_constants::flags;
pub use error::{error_kind, ClassFileError};
pub use pool::{ConstantPool, PoolEntry};

/// Reads a single java class file from the reader.
///
/// The format can't be decoded while streaming, so this reads everything first.
pub fn read_class(reader: &mut impl Read) -> Result<ClassFile> {
	let mut bytes = Vec::new();
	reader.read_to_end(&mut bytes).context("failed to read class file bytes")?;
	ClassFile::read(&bytes)
}

pub fn write_class(writer: &mut impl Write, class: &ClassFile) -> Result<()> {
	let bytes = class.write()?;
	writer.write_all(&bytes).context("failed to write class file bytes")
}
