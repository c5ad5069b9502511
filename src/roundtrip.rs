use std::sync::atomic::{AtomicBool, Ordering};
use anyhow::{bail, Context, Result};
use log::{debug, error, warn};
use class_file::{bytecode, ClassFile};
use crate::scan::Source;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Stats {
	pub(crate) checked: usize,
	pub(crate) mismatches: usize,
	pub(crate) failures: usize,
}

impl Stats {
	pub(crate) fn is_clean(&self) -> bool {
		self.mismatches == 0 && self.failures == 0
	}

	fn add(&mut self, other: Stats) {
		self.checked += other.checked;
		self.mismatches += other.mismatches;
		self.failures += other.failures;
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
	Identical,
	/// The re-encoded bytes differ from the input, starting at the given byte offset.
	Mismatch { first_difference: usize },
}

/// Checks that every instruction starts where the previous one ended, and that they cover the whole code array.
fn check_instruction_sizes(class: &ClassFile) -> Result<()> {
	for method in &class.methods {
		let Some(code) = method.code() else { continue };

		let instructions = code.instructions()
			.with_context(|| format!("failed to decode code of method {:?}", method.name(&class.constant_pool)))?;

		let mut offset = 0u64;
		for instruction in &instructions {
			if instruction.offset() as u64 != offset {
				bail!("instruction {instruction:?} is at offset {}, expected {offset}", instruction.offset());
			}
			offset += instruction.size() as u64;
		}
		if offset != code.code.len() as u64 {
			bail!("instructions take up {offset} bytes, but the code array has {} bytes", code.code.len());
		}

		let encoded = bytecode::encode(&instructions)?;
		if encoded != code.code {
			bail!("instructions of method {:?} re-encode differently", method.name(&class.constant_pool));
		}
	}
	Ok(())
}

/// Decodes and re-encodes a single class file.
pub(crate) fn check_class(bytes: &[u8]) -> Result<Outcome> {
	let class = ClassFile::read(bytes)?;
	check_instruction_sizes(&class)?;

	let written = class.write()?;
	if written == bytes {
		Ok(Outcome::Identical)
	} else {
		let first_difference = written.iter().zip(bytes)
			.position(|(a, b)| a != b)
			.unwrap_or(written.len().min(bytes.len()));
		Ok(Outcome::Mismatch { first_difference })
	}
}

fn check_sources(sources: &[Source], fail_fast: bool, stop: &AtomicBool) -> Stats {
	let mut stats = Stats::default();

	for source in sources {
		if stop.load(Ordering::Relaxed) {
			break;
		}

		let result = source.for_each_class(|name, bytes| {
			if stop.load(Ordering::Relaxed) {
				return;
			}
			stats.checked += 1;

			match check_class(bytes) {
				Ok(Outcome::Identical) => debug!("{name}: ok"),
				Ok(Outcome::Mismatch { first_difference }) => {
					warn!("{name}: re-encoded bytes differ from byte {first_difference} on");
					stats.mismatches += 1;
				},
				Err(e) => {
					error!("{name}: {e:#}");
					stats.failures += 1;
				},
			}

			if fail_fast && !stats.is_clean() {
				stop.store(true, Ordering::Relaxed);
			}
		});

		if let Err(e) = result {
			error!("{e:#}");
			stats.failures += 1;
			if fail_fast {
				stop.store(true, Ordering::Relaxed);
			}
		}
	}

	stats
}

/// Checks all class files in the sources, splitting the sources across `jobs` threads.
pub(crate) fn check_all(sources: &[Source], fail_fast: bool, jobs: usize) -> Stats {
	let stop = AtomicBool::new(false);

	if jobs <= 1 || sources.len() <= 1 {
		return check_sources(sources, fail_fast, &stop);
	}

	let chunk_size = sources.len().div_ceil(jobs);
	let stop = &stop;

	std::thread::scope(|scope| {
		let handles: Vec<_> = sources.chunks(chunk_size)
			.map(|chunk| scope.spawn(move || check_sources(chunk, fail_fast, stop)))
			.collect();

		let mut stats = Stats::default();
		for handle in handles {
			match handle.join() {
				Ok(s) => stats.add(s),
				Err(_) => {
					error!("a worker thread panicked");
					stats.failures += 1;
				},
			}
		}
		stats
	})
}

#[cfg(test)]
mod testing {
	use anyhow::Result;
	use pretty_assertions::assert_eq;
	use class_file::attribute::code::CodeAttribute;
	use class_file::{flags, Attribute, AttributeInfo, ClassFile, ConstantPool, MemberInfo};
	use crate::roundtrip::{check_class, Outcome, Stats};

	fn class_with_code(code: Vec<u8>) -> Result<ClassFile> {
		let mut constant_pool = ConstantPool::new();
		let this_class = constant_pool.add_constant_class("A")?;
		let super_class = constant_pool.add_constant_class("java/lang/Object")?;
		let name_index = constant_pool.add_constant_utf8("run")?;
		let descriptor_index = constant_pool.add_constant_utf8("()V")?;
		let code = AttributeInfo::new(&mut constant_pool, Attribute::Code(CodeAttribute {
			max_stack: 1,
			max_locals: 1,
			code,
			exception_table: vec![],
			attributes: vec![],
		}))?;

		Ok(ClassFile {
			minor_version: 0,
			major_version: 52,
			constant_pool,
			access_flags: flags::ACC_PUBLIC | flags::ACC_SUPER,
			this_class,
			super_class,
			interfaces: vec![],
			fields: vec![],
			methods: vec![MemberInfo {
				access_flags: flags::ACC_PUBLIC | flags::ACC_STATIC,
				name_index,
				descriptor_index,
				attributes: vec![code],
			}],
			attributes: vec![],
		})
	}

	#[test]
	fn identical() -> Result<()> {
		// iconst_0, istore 1 (wide), goto -4, return
		let class = class_with_code(vec![0x03, 0xc4, 0x36, 0x00, 0x01, 0xa7, 0xff, 0xfc, 0xb1])?;
		let bytes = class.write()?;

		assert_eq!(check_class(&bytes)?, Outcome::Identical);
		Ok(())
	}

	#[test]
	fn bad_instructions_fail() -> Result<()> {
		// sipush with one operand byte missing
		let class = class_with_code(vec![0x11, 0x00])?;
		let bytes = class.write()?;

		assert!(check_class(&bytes).is_err());
		Ok(())
	}

	#[test]
	fn nonzero_reserved_byte_is_a_failure() -> Result<()> {
		// invokedynamic #1 with a reserved byte that isn't zero
		let class = class_with_code(vec![0xba, 0x00, 0x01, 0x00, 0x07, 0xb1])?;
		let bytes = class.write()?;

		assert!(check_class(&bytes).is_err());
		Ok(())
	}

	#[test]
	fn stats_are_clean_without_problems() {
		let mut stats = Stats { checked: 3, mismatches: 0, failures: 0 };
		assert!(stats.is_clean());

		stats.add(Stats { checked: 2, mismatches: 1, failures: 0 });
		assert_eq!(stats, Stats { checked: 5, mismatches: 1, failures: 0 });
		assert!(!stats.is_clean());
	}
}
