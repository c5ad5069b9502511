//! The error conditions of the codec.
//!
//! Everything in this crate returns [`anyhow::Result`], with context attached at each structural boundary. The root cause of such an error is
//! always one of the variants of [`ClassFileError`], so callers that need to react on the kind of failure can use [`error_kind`].

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassFileError {
	/// Fewer bytes were available than a structure declared. Always fatal.
	#[error("truncated input: needed {needed} byte(s) at offset {offset}, but only {available} remain")]
	TruncatedInput { offset: usize, needed: usize, available: usize },
	/// There's no instruction layout for this opcode, so the rest of the code array can't be decoded.
	#[error("unrecognized opcode {opcode:#04x} at bytecode offset {offset}")]
	UnrecognizedOpcode { opcode: u8, offset: u32 },
	/// A pool index is out of range, hits an unusable slot, or hits an entry of the wrong kind.
	///
	/// This one is recoverable: it's only produced when resolving indices, never by decoding itself.
	#[error("unresolved constant pool index {index}: {reason}")]
	UnresolvedPoolIndex { index: u16, reason: String },
	/// A declared length disagrees with the number of bytes actually making up the structure.
	#[error("length mismatch for {what}: declared {declared}, computed {computed}")]
	LengthMismatch { what: String, declared: u32, computed: u32 },
	#[error("wrong magic: got {0:#010x}, expected 0xcafebabe")]
	BadMagic(u32),
	#[error("unknown constant pool tag {tag} at pool index {index}")]
	UnknownPoolTag { tag: u8, index: u16 },
	#[error("{count} trailing byte(s) after the end of the class file")]
	TrailingBytes { count: usize },
	#[error("malformed {what}: {reason}")]
	Malformed { what: &'static str, reason: String },
}

impl ClassFileError {
	pub(crate) fn unresolved(index: u16, reason: impl Into<String>) -> ClassFileError {
		ClassFileError::UnresolvedPoolIndex { index, reason: reason.into() }
	}

	pub(crate) fn malformed(what: &'static str, reason: impl Into<String>) -> ClassFileError {
		ClassFileError::Malformed { what, reason: reason.into() }
	}
}

/// Finds the [`ClassFileError`] an error chain was caused by, looking through any context attached to it.
pub fn error_kind(error: &anyhow::Error) -> Option<&ClassFileError> {
	error.downcast_ref::<ClassFileError>()
}
