use anyhow::Result;
use crate::attribute::{list_length, read_list, write_list, Structure};
use crate::cursor::{ByteReader, ByteWriter};
use crate::error::ClassFileError;

/// A frame of a `StackMapTable` attribute. The `frame_type` byte is derived from the variant and its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackMapFrame {
	/// `offset_delta` must be below 64.
	Same { offset_delta: u8 },
	/// `offset_delta` must be below 64.
	SameLocals1StackItem { offset_delta: u8, stack: VerificationType },
	SameLocals1StackItemExtended { offset_delta: u16, stack: VerificationType },
	/// Removes the last `k` locals, `k` being one to three.
	Chop { k: u8, offset_delta: u16 },
	SameExtended { offset_delta: u16 },
	/// Adds one to three locals.
	Append { offset_delta: u16, locals: Vec<VerificationType> },
	Full { offset_delta: u16, locals: Vec<VerificationType>, stack: Vec<VerificationType> },
}

impl StackMapFrame {
	pub fn frame_type(&self) -> Result<u8, ClassFileError> {
		match *self {
			StackMapFrame::Same { offset_delta } if offset_delta < 64 => Ok(offset_delta),
			StackMapFrame::SameLocals1StackItem { offset_delta, .. } if offset_delta < 64 => Ok(64 + offset_delta),
			StackMapFrame::SameLocals1StackItemExtended { .. } => Ok(247),
			StackMapFrame::Chop { k, .. } if (1..=3).contains(&k) => Ok(251 - k),
			StackMapFrame::SameExtended { .. } => Ok(251),
			StackMapFrame::Append { ref locals, .. } if (1..=3).contains(&locals.len()) => Ok(251 + locals.len() as u8),
			StackMapFrame::Full { .. } => Ok(255),
			ref frame => Err(ClassFileError::malformed("stack map frame", format!("{frame:?} has no frame type"))),
		}
	}

	/// The `offset_delta`, which for the first frame is the offset of the instruction it applies to, and for all others is one less than the
	/// distance to the instruction of the previous frame.
	pub fn offset_delta(&self) -> u16 {
		match *self {
			StackMapFrame::Same { offset_delta } |
			StackMapFrame::SameLocals1StackItem { offset_delta, .. } => offset_delta as u16,
			StackMapFrame::SameLocals1StackItemExtended { offset_delta, .. } |
			StackMapFrame::Chop { offset_delta, .. } |
			StackMapFrame::SameExtended { offset_delta } |
			StackMapFrame::Append { offset_delta, .. } |
			StackMapFrame::Full { offset_delta, .. } => offset_delta,
		}
	}
}

impl Structure for StackMapFrame {
	fn read(reader: &mut ByteReader) -> Result<Self> {
		Ok(match reader.read_u8()? {
			frame_type @ 0..=63 => StackMapFrame::Same { offset_delta: frame_type },
			frame_type @ 64..=127 => StackMapFrame::SameLocals1StackItem {
				offset_delta: frame_type - 64,
				stack: VerificationType::read(reader)?,
			},
			247 => StackMapFrame::SameLocals1StackItemExtended {
				offset_delta: reader.read_u16()?,
				stack: VerificationType::read(reader)?,
			},
			frame_type @ 248..=250 => StackMapFrame::Chop { k: 251 - frame_type, offset_delta: reader.read_u16()? },
			251 => StackMapFrame::SameExtended { offset_delta: reader.read_u16()? },
			frame_type @ 252..=254 => {
				let offset_delta = reader.read_u16()?;
				let mut locals = Vec::with_capacity((frame_type - 251) as usize);
				for _ in 251..frame_type {
					locals.push(VerificationType::read(reader)?);
				}
				StackMapFrame::Append { offset_delta, locals }
			},
			255 => StackMapFrame::Full {
				offset_delta: reader.read_u16()?,
				locals: read_list(reader)?,
				stack: read_list(reader)?,
			},
			frame_type => {
				return Err(ClassFileError::malformed("stack map frame", format!("frame type {frame_type} is reserved")).into());
			},
		})
	}

	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		writer.write_u8(self.frame_type()?);
		match self {
			StackMapFrame::Same { .. } => {},
			StackMapFrame::SameLocals1StackItem { stack, .. } => stack.write(writer)?,
			StackMapFrame::SameLocals1StackItemExtended { offset_delta, stack } => {
				writer.write_u16(*offset_delta);
				stack.write(writer)?;
			},
			StackMapFrame::Chop { offset_delta, .. } | StackMapFrame::SameExtended { offset_delta } => writer.write_u16(*offset_delta),
			StackMapFrame::Append { offset_delta, locals } => {
				writer.write_u16(*offset_delta);
				for local in locals {
					local.write(writer)?;
				}
			},
			StackMapFrame::Full { offset_delta, locals, stack } => {
				writer.write_u16(*offset_delta);
				write_list(writer, locals)?;
				write_list(writer, stack)?;
			},
		}
		Ok(())
	}

	fn length(&self) -> usize {
		1 + match self {
			StackMapFrame::Same { .. } => 0,
			StackMapFrame::SameLocals1StackItem { stack, .. } => stack.length(),
			StackMapFrame::SameLocals1StackItemExtended { stack, .. } => 2 + stack.length(),
			StackMapFrame::Chop { .. } | StackMapFrame::SameExtended { .. } => 2,
			StackMapFrame::Append { locals, .. } => 2 + locals.iter().map(Structure::length).sum::<usize>(),
			StackMapFrame::Full { locals, stack, .. } => 2 + list_length(locals) + list_length(stack),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationType {
	Top,
	Integer,
	Float,
	Double,
	Long,
	Null,
	UninitializedThis,
	/// Index of a `Class` pool entry.
	Object { cpool_index: u16 },
	/// Offset of the `new` instruction that created the object.
	Uninitialized { offset: u16 },
}

impl Structure for VerificationType {
	fn read(reader: &mut ByteReader) -> Result<Self> {
		Ok(match reader.read_u8()? {
			0 => VerificationType::Top,
			1 => VerificationType::Integer,
			2 => VerificationType::Float,
			3 => VerificationType::Double,
			4 => VerificationType::Long,
			5 => VerificationType::Null,
			6 => VerificationType::UninitializedThis,
			7 => VerificationType::Object { cpool_index: reader.read_u16()? },
			8 => VerificationType::Uninitialized { offset: reader.read_u16()? },
			tag => return Err(ClassFileError::malformed("verification type", format!("unknown tag {tag}")).into()),
		})
	}

	fn write(&self, writer: &mut ByteWriter) -> Result<()> {
		match *self {
			VerificationType::Top => writer.write_u8(0),
			VerificationType::Integer => writer.write_u8(1),
			VerificationType::Float => writer.write_u8(2),
			VerificationType::Double => writer.write_u8(3),
			VerificationType::Long => writer.write_u8(4),
			VerificationType::Null => writer.write_u8(5),
			VerificationType::UninitializedThis => writer.write_u8(6),
			VerificationType::Object { cpool_index } => {
				writer.write_u8(7);
				writer.write_u16(cpool_index);
			},
			VerificationType::Uninitialized { offset } => {
				writer.write_u8(8);
				writer.write_u16(offset);
			},
		}
		Ok(())
	}

	fn length(&self) -> usize {
		match self {
			VerificationType::Object { .. } | VerificationType::Uninitialized { .. } => 3,
			_ => 1,
		}
	}
}
