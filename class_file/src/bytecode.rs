//! Decoding and encoding of the instruction stream of a `Code` attribute.
//!
//! Decoding walks the code array once, carrying a [`DecodeState`] from one instruction to the next: an instruction following a `wide`
//! takes a two-byte local variable index (and a two-byte increment for `iinc`). Encoding walks the instructions in the same way, so that
//! `encode(decode(code)) == code` for any code array this decodes.
use anyhow::{anyhow, Context, Result};
use crate::class_constants::opcode;
use crate::cursor::{ByteReader, ByteWriter};
use crate::error::ClassFileError;

/// The layout of the operands following an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionKind {
	NoOperand,
	/// One byte, or two after `wide`.
	ImmediateByte,
	ImmediateShort,
	/// A signed two-byte offset.
	Branch,
	/// A signed four-byte offset.
	WideBranch,
	/// An index and a signed constant, one byte each, or two bytes each after `wide`.
	Increment,
	TableSwitch,
	LookupSwitch,
	InvokeInterface,
	InvokeDynamic,
	MultiNewArray,
}

/// Gives the operand layout of an opcode, [`None`] for opcodes that may not appear in a class file.
pub fn kind_of(opcode: u8) -> Option<InstructionKind> {
	Some(match opcode {
		opcode::NOP..=opcode::DCONST_1 |
		opcode::ILOAD_0..=opcode::SALOAD |
		opcode::ISTORE_0..=opcode::LXOR |
		opcode::I2L..=opcode::DCMPG |
		opcode::IRETURN..=opcode::RETURN |
		opcode::ARRAYLENGTH |
		opcode::ATHROW |
		opcode::MONITORENTER |
		opcode::MONITOREXIT |
		opcode::WIDE => InstructionKind::NoOperand,
		opcode::BIPUSH |
		opcode::LDC |
		opcode::ILOAD..=opcode::ALOAD |
		opcode::ISTORE..=opcode::ASTORE |
		opcode::RET |
		opcode::NEWARRAY => InstructionKind::ImmediateByte,
		opcode::SIPUSH |
		opcode::LDC_W |
		opcode::LDC2_W |
		opcode::GETSTATIC..=opcode::INVOKESTATIC |
		opcode::NEW |
		opcode::ANEWARRAY |
		opcode::CHECKCAST |
		opcode::INSTANCEOF => InstructionKind::ImmediateShort,
		opcode::IFEQ..=opcode::JSR |
		opcode::IFNULL |
		opcode::IFNONNULL => InstructionKind::Branch,
		opcode::GOTO_W |
		opcode::JSR_W => InstructionKind::WideBranch,
		opcode::IINC => InstructionKind::Increment,
		opcode::TABLESWITCH => InstructionKind::TableSwitch,
		opcode::LOOKUPSWITCH => InstructionKind::LookupSwitch,
		opcode::INVOKEINTERFACE => InstructionKind::InvokeInterface,
		opcode::INVOKEDYNAMIC => InstructionKind::InvokeDynamic,
		opcode::MULTIANEWARRAY => InstructionKind::MultiNewArray,
		_ => return None,
	})
}

const MNEMONICS: [&str; 0xca] = [
	// 0x00
	"nop", "aconst_null", "iconst_m1", "iconst_0", "iconst_1", "iconst_2", "iconst_3", "iconst_4",
	"iconst_5", "lconst_0", "lconst_1", "fconst_0", "fconst_1", "fconst_2", "dconst_0", "dconst_1",
	// 0x10
	"bipush", "sipush", "ldc", "ldc_w", "ldc2_w", "iload", "lload", "fload",
	"dload", "aload", "iload_0", "iload_1", "iload_2", "iload_3", "lload_0", "lload_1",
	// 0x20
	"lload_2", "lload_3", "fload_0", "fload_1", "fload_2", "fload_3", "dload_0", "dload_1",
	"dload_2", "dload_3", "aload_0", "aload_1", "aload_2", "aload_3", "iaload", "laload",
	// 0x30
	"faload", "daload", "aaload", "baload", "caload", "saload", "istore", "lstore",
	"fstore", "dstore", "astore", "istore_0", "istore_1", "istore_2", "istore_3", "lstore_0",
	// 0x40
	"lstore_1", "lstore_2", "lstore_3", "fstore_0", "fstore_1", "fstore_2", "fstore_3", "dstore_0",
	"dstore_1", "dstore_2", "dstore_3", "astore_0", "astore_1", "astore_2", "astore_3", "iastore",
	// 0x50
	"lastore", "fastore", "dastore", "aastore", "bastore", "castore", "sastore", "pop",
	"pop2", "dup", "dup_x1", "dup_x2", "dup2", "dup2_x1", "dup2_x2", "swap",
	// 0x60
	"iadd", "ladd", "fadd", "dadd", "isub", "lsub", "fsub", "dsub",
	"imul", "lmul", "fmul", "dmul", "idiv", "ldiv", "fdiv", "ddiv",
	// 0x70
	"irem", "lrem", "frem", "drem", "ineg", "lneg", "fneg", "dneg",
	"ishl", "lshl", "ishr", "lshr", "iushr", "lushr", "iand", "land",
	// 0x80
	"ior", "lor", "ixor", "lxor", "iinc", "i2l", "i2f", "i2d",
	"l2i", "l2f", "l2d", "f2i", "f2l", "f2d", "d2i", "d2l",
	// 0x90
	"d2f", "i2b", "i2c", "i2s", "lcmp", "fcmpl", "fcmpg", "dcmpl",
	"dcmpg", "ifeq", "ifne", "iflt", "ifge", "ifgt", "ifle", "if_icmpeq",
	// 0xa0
	"if_icmpne", "if_icmplt", "if_icmpge", "if_icmpgt", "if_icmple", "if_acmpeq", "if_acmpne", "goto",
	"jsr", "ret", "tableswitch", "lookupswitch", "ireturn", "lreturn", "freturn", "dreturn",
	// 0xb0
	"areturn", "return", "getstatic", "putstatic", "getfield", "putfield", "invokevirtual", "invokespecial",
	"invokestatic", "invokeinterface", "invokedynamic", "new", "newarray", "anewarray", "arraylength", "athrow",
	// 0xc0
	"checkcast", "instanceof", "monitorenter", "monitorexit", "wide", "multianewarray", "ifnull", "ifnonnull",
	"goto_w", "jsr_w",
];

/// The name of an opcode as used in disassembly listings.
pub fn mnemonic(opcode: u8) -> Option<&'static str> {
	MNEMONICS.get(opcode as usize).copied()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operands {
	None,
	ImmediateByte(u8),
	/// The operand of an [`InstructionKind::ImmediateShort`] instruction, or of a widened [`InstructionKind::ImmediateByte`] one.
	ImmediateShort(u16),
	/// Relative to the offset of the instruction.
	Branch(i16),
	/// Relative to the offset of the instruction.
	WideBranch(i32),
	Increment { index: u8, constant: i8 },
	/// The widened form of [`Operands::Increment`].
	WideIncrement { index: u16, constant: i16 },
	/// `offsets` holds `high - low + 1` jump offsets. All offsets are relative to the offset of the instruction.
	TableSwitch { default: i32, low: i32, high: i32, offsets: Vec<i32> },
	/// Pairs of match and jump offset. All offsets are relative to the offset of the instruction.
	LookupSwitch { default: i32, pairs: Vec<(i32, i32)> },
	InvokeInterface { index: u16, count: u8 },
	InvokeDynamic { index: u16 },
	MultiNewArray { index: u16, dimensions: u8 },
}

/// Whether the previous instruction was a `wide`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
	Normal,
	WidePending,
}

impl DecodeState {
	fn after(instruction: &Instruction) -> DecodeState {
		if instruction.opcode == opcode::WIDE {
			DecodeState::WidePending
		} else {
			DecodeState::Normal
		}
	}
}

/// An instruction, at some offset in the code array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
	offset: u32,
	pub opcode: u8,
	pub operands: Operands,
}

/// The number of padding bytes after a switch opcode at `offset`, so that the operands start at a multiple of four.
fn switch_padding(offset: u32) -> u32 {
	(4 - (offset + 1) % 4) % 4
}

impl Instruction {
	/// Creates an instruction at offset zero. It gets its real offset from [`decode`]ing the code array it was [`encode`]d into.
	pub fn new(opcode: u8, operands: Operands) -> Instruction {
		Instruction { offset: 0, opcode, operands }
	}

	/// The offset of the opcode byte in the code array.
	pub fn offset(&self) -> u32 {
		self.offset
	}

	pub fn kind(&self) -> Option<InstructionKind> {
		kind_of(self.opcode)
	}

	pub fn mnemonic(&self) -> Option<&'static str> {
		mnemonic(self.opcode)
	}

	/// The number of bytes this instruction takes up at its offset, opcode and switch padding included.
	pub fn size(&self) -> u32 {
		1 + match &self.operands {
			Operands::None => 0,
			Operands::ImmediateByte(_) => 1,
			Operands::ImmediateShort(_) | Operands::Branch(_) | Operands::Increment { .. } => 2,
			Operands::MultiNewArray { .. } => 3,
			Operands::WideBranch(_) | Operands::WideIncrement { .. } | Operands::InvokeInterface { .. } | Operands::InvokeDynamic { .. } => 4,
			Operands::TableSwitch { offsets, .. } => switch_padding(self.offset) + 12 + 4 * offsets.len() as u32,
			Operands::LookupSwitch { pairs, .. } => switch_padding(self.offset) + 8 + 8 * pairs.len() as u32,
		}
	}

	/// The absolute offsets this instruction may jump to, in the order they're stored.
	pub fn branch_targets(&self) -> Vec<i64> {
		let base = self.offset as i64;
		match &self.operands {
			Operands::Branch(delta) => vec![base + *delta as i64],
			Operands::WideBranch(delta) => vec![base + *delta as i64],
			Operands::TableSwitch { default, offsets, .. } => {
				std::iter::once(default).chain(offsets).map(|delta| base + *delta as i64).collect()
			},
			Operands::LookupSwitch { default, pairs } => {
				std::iter::once(default).chain(pairs.iter().map(|(_, delta)| delta)).map(|delta| base + *delta as i64).collect()
			},
			_ => Vec::new(),
		}
	}

	fn read(reader: &mut ByteReader, offset: u32, state: DecodeState) -> Result<Instruction> {
		let opcode = reader.read_u8()?;
		let kind = kind_of(opcode).ok_or(ClassFileError::UnrecognizedOpcode { opcode, offset })?;
		let wide = state == DecodeState::WidePending;

		let operands = match kind {
			InstructionKind::NoOperand => Operands::None,
			InstructionKind::ImmediateByte if wide => Operands::ImmediateShort(reader.read_u16()?),
			InstructionKind::ImmediateByte => Operands::ImmediateByte(reader.read_u8()?),
			InstructionKind::ImmediateShort => Operands::ImmediateShort(reader.read_u16()?),
			InstructionKind::Branch => Operands::Branch(reader.read_i16()?),
			InstructionKind::WideBranch => Operands::WideBranch(reader.read_i32()?),
			InstructionKind::Increment if wide => Operands::WideIncrement { index: reader.read_u16()?, constant: reader.read_i16()? },
			InstructionKind::Increment => Operands::Increment { index: reader.read_u8()?, constant: reader.read_i8()? },
			InstructionKind::TableSwitch => {
				reader.read_bytes(switch_padding(offset) as usize)?;
				let default = reader.read_i32()?;
				let low = reader.read_i32()?;
				let high = reader.read_i32()?;
				if low > high {
					return Err(ClassFileError::malformed("tableswitch", format!("`low` ({low}) is greater than `high` ({high})")).into());
				}
				let n = (high as i64 - low as i64 + 1) as usize;
				let mut offsets = Vec::with_capacity(n.min(reader.remaining() / 4));
				for _ in 0..n {
					offsets.push(reader.read_i32()?);
				}
				Operands::TableSwitch { default, low, high, offsets }
			},
			InstructionKind::LookupSwitch => {
				reader.read_bytes(switch_padding(offset) as usize)?;
				let default = reader.read_i32()?;
				let npairs = reader.read_i32()?;
				if npairs < 0 {
					return Err(ClassFileError::malformed("lookupswitch", format!("`npairs` ({npairs}) is negative")).into());
				}
				let n = npairs as usize;
				let mut pairs = Vec::with_capacity(n.min(reader.remaining() / 8));
				for _ in 0..n {
					pairs.push((reader.read_i32()?, reader.read_i32()?));
				}
				Operands::LookupSwitch { default, pairs }
			},
			InstructionKind::InvokeInterface => {
				let index = reader.read_u16()?;
				let count = reader.read_u8()?;
				reader.read_u8()?; // reserved
				Operands::InvokeInterface { index, count }
			},
			InstructionKind::InvokeDynamic => {
				let index = reader.read_u16()?;
				reader.read_u16()?; // reserved
				Operands::InvokeDynamic { index }
			},
			InstructionKind::MultiNewArray => Operands::MultiNewArray { index: reader.read_u16()?, dimensions: reader.read_u8()? },
		};

		Ok(Instruction { offset, opcode, operands })
	}

	fn write(&self, writer: &mut ByteWriter, offset: u32, state: DecodeState) -> Result<()> {
		let kind = kind_of(self.opcode).ok_or(ClassFileError::UnrecognizedOpcode { opcode: self.opcode, offset })?;
		let wide = state == DecodeState::WidePending;

		writer.write_u8(self.opcode);
		match (kind, &self.operands) {
			(InstructionKind::NoOperand, Operands::None) => {},
			(InstructionKind::ImmediateByte, &Operands::ImmediateByte(value)) if !wide => writer.write_u8(value),
			(InstructionKind::ImmediateByte, &Operands::ImmediateShort(value)) if wide => writer.write_u16(value),
			(InstructionKind::ImmediateShort, &Operands::ImmediateShort(value)) => writer.write_u16(value),
			(InstructionKind::Branch, &Operands::Branch(delta)) => writer.write_i16(delta),
			(InstructionKind::WideBranch, &Operands::WideBranch(delta)) => writer.write_i32(delta),
			(InstructionKind::Increment, &Operands::Increment { index, constant }) if !wide => {
				writer.write_u8(index);
				writer.write_i8(constant);
			},
			(InstructionKind::Increment, &Operands::WideIncrement { index, constant }) if wide => {
				writer.write_u16(index);
				writer.write_i16(constant);
			},
			(InstructionKind::TableSwitch, Operands::TableSwitch { default, low, high, offsets }) => {
				if low > high || (*high as i64 - *low as i64 + 1) as usize != offsets.len() {
					return Err(ClassFileError::malformed("tableswitch",
						format!("{} jump offsets don't match the range {low}..={high}", offsets.len())).into());
				}
				for _ in 0..switch_padding(offset) {
					writer.write_u8(0);
				}
				writer.write_i32(*default);
				writer.write_i32(*low);
				writer.write_i32(*high);
				for delta in offsets {
					writer.write_i32(*delta);
				}
			},
			(InstructionKind::LookupSwitch, Operands::LookupSwitch { default, pairs }) => {
				let npairs = i32::try_from(pairs.len())
					.map_err(|_| ClassFileError::malformed("lookupswitch", format!("{} pairs are too many", pairs.len())))?;
				for _ in 0..switch_padding(offset) {
					writer.write_u8(0);
				}
				writer.write_i32(*default);
				writer.write_i32(npairs);
				for &(key, delta) in pairs {
					writer.write_i32(key);
					writer.write_i32(delta);
				}
			},
			(InstructionKind::InvokeInterface, &Operands::InvokeInterface { index, count }) => {
				writer.write_u16(index);
				writer.write_u8(count);
				writer.write_u8(0);
			},
			(InstructionKind::InvokeDynamic, &Operands::InvokeDynamic { index }) => {
				writer.write_u16(index);
				writer.write_u16(0);
			},
			(InstructionKind::MultiNewArray, &Operands::MultiNewArray { index, dimensions }) => {
				writer.write_u16(index);
				writer.write_u8(dimensions);
			},
			(kind, operands) => {
				let name = mnemonic(self.opcode).unwrap_or("?");
				let after = if wide { " after `wide`" } else { "" };
				return Err(ClassFileError::malformed("instruction",
					format!("`{name}` ({kind:?}){after} can't take operands {operands:?}")).into());
			},
		}
		Ok(())
	}
}

/// Decodes a code array into its instructions, each knowing its offset.
pub fn decode(code: &[u8]) -> Result<Vec<Instruction>> {
	if u32::try_from(code.len()).is_err() {
		return Err(ClassFileError::malformed("code", format!("{} bytes are too many", code.len())).into());
	}

	let mut reader = ByteReader::new(code);
	let mut instructions = Vec::new();
	let mut state = DecodeState::Normal;
	while !reader.is_empty() {
		let offset = reader.bytes_consumed() as u32; // can't overflow, checked above
		let instruction = Instruction::read(&mut reader, offset, state)
			.with_context(|| anyhow!("at bytecode offset {offset}"))?;
		state = DecodeState::after(&instruction);
		instructions.push(instruction);
	}
	Ok(instructions)
}

/// Encodes instructions into a code array.
///
/// The offsets stored in the instructions are ignored, each instruction is placed right after the previous one. Switch padding is
/// computed from these new offsets. Branch offsets are written as they are.
pub fn encode(instructions: &[Instruction]) -> Result<Vec<u8>> {
	let mut writer = ByteWriter::new();
	let mut state = DecodeState::Normal;
	for instruction in instructions {
		let offset = u32::try_from(writer.bytes_emitted())
			.map_err(|_| ClassFileError::malformed("code", "more than 4 GiB of instructions"))?;
		instruction.write(&mut writer, offset, state)
			.with_context(|| anyhow!("at bytecode offset {offset}"))?;
		state = DecodeState::after(instruction);
	}
	Ok(writer.into_inner())
}

#[cfg(test)]
mod testing {
	use anyhow::Result;
	use pretty_assertions::assert_eq;
	use crate::bytecode::{decode, encode, kind_of, mnemonic, Instruction, InstructionKind, Operands};
	use crate::class_constants::opcode;
	use crate::error::{error_kind, ClassFileError};

	fn assert_sizes_add_up(code: &[u8], instructions: &[Instruction]) {
		let mut offset = 0;
		for instruction in instructions {
			assert_eq!(instruction.offset(), offset);
			offset += instruction.size();
		}
		assert_eq!(offset as usize, code.len());
	}

	#[test]
	fn wide_iload() -> Result<()> {
		let code = [opcode::WIDE, opcode::ILOAD, 0x01, 0x02];

		let instructions = decode(&code)?;
		assert_eq!(instructions, vec![
			Instruction { offset: 0, opcode: opcode::WIDE, operands: Operands::None },
			Instruction { offset: 1, opcode: opcode::ILOAD, operands: Operands::ImmediateShort(258) },
		]);
		assert_sizes_add_up(&code, &instructions);
		assert_eq!(encode(&instructions)?, code);
		Ok(())
	}

	#[test]
	fn wide_iinc() -> Result<()> {
		let code = [opcode::WIDE, opcode::IINC, 0x01, 0x00, 0xff, 0xfe, opcode::IINC, 0x02, 0x03];

		let instructions = decode(&code)?;
		assert_eq!(instructions[1].operands, Operands::WideIncrement { index: 256, constant: -2 });
		// the state resets after one instruction
		assert_eq!(instructions[2].operands, Operands::Increment { index: 2, constant: 3 });
		assert_sizes_add_up(&code, &instructions);
		assert_eq!(encode(&instructions)?, code);
		Ok(())
	}

	#[test]
	fn widened_operand_needs_wide() {
		let instructions = [Instruction::new(opcode::ILOAD, Operands::ImmediateShort(258))];
		let error = encode(&instructions).unwrap_err();
		assert!(matches!(error_kind(&error), Some(ClassFileError::Malformed { what: "instruction", .. })));

		let instructions = [
			Instruction::new(opcode::WIDE, Operands::None),
			Instruction::new(opcode::ILOAD, Operands::ImmediateByte(1)),
		];
		assert!(encode(&instructions).is_err());
	}

	fn tableswitch_after_nops(nops: usize) -> Vec<u8> {
		let mut code = vec![opcode::NOP; nops];
		code.push(opcode::TABLESWITCH);
		while code.len() % 4 != 0 {
			code.push(0);
		}
		code.extend_from_slice(&20i32.to_be_bytes()); // default
		code.extend_from_slice(&0i32.to_be_bytes()); // low
		code.extend_from_slice(&1i32.to_be_bytes()); // high
		code.extend_from_slice(&24i32.to_be_bytes());
		code.extend_from_slice(&(-6i32).to_be_bytes());
		code.push(opcode::RETURN);
		code
	}

	#[test]
	fn tableswitch_padding_follows_offset() -> Result<()> {
		// The table starts at the first multiple of four after the opcode byte. So an opcode at offset 7 gets
		// no padding at all (the table is at 8), not one byte, and it's the opcode at offset 6 that gets one.
		for (nops, padding) in [(4, 3), (5, 2), (6, 1), (7, 0)] {
			let code = tableswitch_after_nops(nops);
			let instructions = decode(&code)?;
			let switch = &instructions[nops];

			assert_eq!(switch.offset() as usize, nops);
			assert_eq!(switch.size(), 1 + padding + 12 + 8);
			assert_eq!(switch.operands, Operands::TableSwitch { default: 20, low: 0, high: 1, offsets: vec![24, -6] });
			let base = nops as i64;
			assert_eq!(switch.branch_targets(), vec![base + 20, base + 24, base - 6]);
			assert_sizes_add_up(&code, &instructions);
			assert_eq!(encode(&instructions)?, code);
		}
		Ok(())
	}

	#[test]
	fn lookupswitch() -> Result<()> {
		let mut code = vec![opcode::ICONST_0, opcode::LOOKUPSWITCH, 0, 0];
		code.extend_from_slice(&8i32.to_be_bytes());
		code.extend_from_slice(&2i32.to_be_bytes());
		code.extend_from_slice(&(-1i32).to_be_bytes());
		code.extend_from_slice(&30i32.to_be_bytes());
		code.extend_from_slice(&7i32.to_be_bytes());
		code.extend_from_slice(&31i32.to_be_bytes());

		let instructions = decode(&code)?;
		assert_eq!(instructions[1].operands, Operands::LookupSwitch { default: 8, pairs: vec![(-1, 30), (7, 31)] });
		assert_sizes_add_up(&code, &instructions);
		assert_eq!(encode(&instructions)?, code);
		Ok(())
	}

	#[test]
	fn reserved_bytes_are_written_as_zero() -> Result<()> {
		let code = [
			opcode::INVOKEINTERFACE, 0x00, 0x05, 0x02, 0x07,
			opcode::INVOKEDYNAMIC, 0x00, 0x06, 0x01, 0x01,
		];
		let instructions = decode(&code)?;
		assert_eq!(instructions[0].operands, Operands::InvokeInterface { index: 5, count: 2 });
		assert_eq!(instructions[1].operands, Operands::InvokeDynamic { index: 6 });
		assert_sizes_add_up(&code, &instructions);

		assert_eq!(encode(&instructions)?, [
			opcode::INVOKEINTERFACE, 0x00, 0x05, 0x02, 0x00,
			opcode::INVOKEDYNAMIC, 0x00, 0x06, 0x00, 0x00,
		]);
		Ok(())
	}

	#[test]
	fn branches_are_relative() -> Result<()> {
		let code = [opcode::NOP, opcode::GOTO, 0xff, 0xff, opcode::GOTO_W, 0x00, 0x00, 0x00, 0x05];
		let instructions = decode(&code)?;
		assert_eq!(instructions[1].operands, Operands::Branch(-1));
		assert_eq!(instructions[1].branch_targets(), vec![0]);
		assert_eq!(instructions[2].branch_targets(), vec![9]);
		assert_sizes_add_up(&code, &instructions);
		Ok(())
	}

	#[test]
	fn unrecognized_opcodes() {
		for (code, bad, offset) in [
			(vec![opcode::NOP, opcode::BREAKPOINT], opcode::BREAKPOINT, 1),
			(vec![0xcb], 0xcb, 0),
			(vec![opcode::ICONST_0, opcode::POP, opcode::IMPDEP2], opcode::IMPDEP2, 2),
		] {
			let error = decode(&code).unwrap_err();
			assert_eq!(error_kind(&error), Some(&ClassFileError::UnrecognizedOpcode { opcode: bad, offset }));
		}
	}

	#[test]
	fn truncated_operand() {
		let error = decode(&[opcode::SIPUSH, 0x01]).unwrap_err();
		assert!(matches!(error_kind(&error), Some(ClassFileError::TruncatedInput { .. })));
	}

	#[test]
	fn opcode_table() {
		assert_eq!(mnemonic(opcode::NOP), Some("nop"));
		assert_eq!(mnemonic(opcode::IINC), Some("iinc"));
		assert_eq!(mnemonic(opcode::GOTO), Some("goto"));
		assert_eq!(mnemonic(opcode::ARRAYLENGTH), Some("arraylength"));
		assert_eq!(mnemonic(opcode::JSR_W), Some("jsr_w"));
		assert_eq!(mnemonic(opcode::BREAKPOINT), None);

		assert_eq!(kind_of(opcode::BIPUSH), Some(InstructionKind::ImmediateByte));
		assert_eq!(kind_of(opcode::INVOKESTATIC), Some(InstructionKind::ImmediateShort));
		assert_eq!(kind_of(opcode::IFNONNULL), Some(InstructionKind::Branch));
		assert_eq!(kind_of(opcode::RET), Some(InstructionKind::ImmediateByte));
		// every opcode with a layout has a name, and the other way around
		for opcode in 0..=u8::MAX {
			assert_eq!(kind_of(opcode).is_some(), mnemonic(opcode).is_some(), "opcode {opcode:#04x}");
		}
	}
}
