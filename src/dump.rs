use std::io::Write;
use anyhow::Result;
use class_file::{AttributeInfo, ClassFile, ClassFileError, ConstantPool, MemberInfo, Operands};

/// Unresolvable indices don't stop the dump, they show up as a placeholder.
fn or_placeholder<T: ToString>(result: Result<T, ClassFileError>) -> String {
	match result {
		Ok(text) => text.to_string(),
		Err(e) => format!("<{e}>"),
	}
}

fn attribute_name(attribute: &AttributeInfo, pool: &ConstantPool) -> String {
	match attribute.data.name() {
		Some(name) => name.to_owned(),
		None => or_placeholder(pool.resolve_utf8(attribute.name_index)),
	}
}

fn dump_attributes(attributes: &[AttributeInfo], pool: &ConstantPool, indent: &str, out: &mut impl Write) -> Result<()> {
	for attribute in attributes {
		let name = attribute_name(attribute, pool);
		let unknown = if attribute.data.name().is_none() { " (unknown)" } else { "" };
		writeln!(out, "{indent}attribute {name}{unknown}, {} bytes", attribute.declared_length())?;
	}
	Ok(())
}

fn dump_code(member: &MemberInfo, pool: &ConstantPool, out: &mut impl Write) -> Result<()> {
	let Some(code) = member.code() else { return Ok(()) };

	writeln!(out, "    code: max_stack = {}, max_locals = {}", code.max_stack, code.max_locals)?;
	for instruction in code.instructions()? {
		let mnemonic = instruction.mnemonic().unwrap_or("???");
		let operands = match &instruction.operands {
			Operands::None => String::new(),
			Operands::ImmediateByte(value) => format!(" {value}"),
			Operands::ImmediateShort(value) => format!(" {value}"),
			Operands::Increment { index, constant } => format!(" {index} {constant}"),
			Operands::WideIncrement { index, constant } => format!(" {index} {constant}"),
			Operands::InvokeInterface { index, count } => format!(" #{index} {count}"),
			Operands::InvokeDynamic { index } => format!(" #{index}"),
			Operands::MultiNewArray { index, dimensions } => format!(" #{index} {dimensions}"),
			Operands::Branch(_) | Operands::WideBranch(_) | Operands::TableSwitch { .. } | Operands::LookupSwitch { .. } => {
				let targets: Vec<_> = instruction.branch_targets().iter().map(i64::to_string).collect();
				format!(" -> {}", targets.join(", "))
			},
		};
		writeln!(out, "    {:5}: {mnemonic}{operands}", instruction.offset())?;
	}
	for entry in &code.exception_table {
		let catch_type = if entry.catch_type == 0 {
			"any".to_owned()
		} else {
			or_placeholder(pool.resolve_class_name(entry.catch_type))
		};
		writeln!(out, "    catch {catch_type} in {}..{} at {}", entry.start_pc, entry.end_pc, entry.handler_pc)?;
	}
	dump_attributes(&code.attributes, pool, "    ", out)
}

fn dump_member(kind: &str, member: &MemberInfo, pool: &ConstantPool, code: bool, out: &mut impl Write) -> Result<()> {
	writeln!(out, "{kind} {}{} (flags {:#06x})",
		or_placeholder(member.name(pool)),
		or_placeholder(member.descriptor(pool)),
		member.access_flags,
	)?;
	dump_attributes(&member.attributes, pool, "  ", out)?;
	if code {
		dump_code(member, pool, out)?;
	}
	Ok(())
}

/// Writes a human readable listing of the class file to `out`.
pub(crate) fn dump(class: &ClassFile, code: bool, out: &mut impl Write) -> Result<()> {
	let pool = &class.constant_pool;

	writeln!(out, "class {} (version {}.{}, flags {:#06x})",
		or_placeholder(class.this_class_name()),
		class.major_version,
		class.minor_version,
		class.access_flags,
	)?;
	match class.super_class_name() {
		Ok(Some(name)) => writeln!(out, "  extends {name}")?,
		Ok(None) => {},
		Err(e) => writeln!(out, "  extends <{e}>")?,
	}
	for &interface in &class.interfaces {
		writeln!(out, "  implements {}", or_placeholder(pool.resolve_class_name(interface)))?;
	}

	writeln!(out, "constant pool, count {}:", pool.count())?;
	for (index, entry) in pool.iter() {
		writeln!(out, "  #{index} = {} {}", entry.kind_name(), or_placeholder(entry.resolved_text(pool)))?;
	}

	for field in &class.fields {
		dump_member("field", field, pool, false, out)?;
	}
	for method in &class.methods {
		dump_member("method", method, pool, code, out)?;
	}
	dump_attributes(&class.attributes, pool, "", out)
}

#[cfg(test)]
mod testing {
	use anyhow::Result;
	use pretty_assertions::assert_eq;
	use class_file::attribute::code::CodeAttribute;
	use class_file::{flags, Attribute, AttributeInfo, ClassFile, ConstantPool, MemberInfo};
	use crate::dump::dump;

	#[test]
	fn listing() -> Result<()> {
		let mut constant_pool = ConstantPool::new();
		let this_class = constant_pool.add_constant_class("A")?;
		let super_class = constant_pool.add_constant_class("java/lang/Object")?;
		let name_index = constant_pool.add_constant_utf8("run")?;
		let descriptor_index = constant_pool.add_constant_utf8("()V")?;
		let code = AttributeInfo::new(&mut constant_pool, Attribute::Code(CodeAttribute {
			max_stack: 0,
			max_locals: 0,
			// goto +3, return
			code: vec![0xa7, 0x00, 0x03, 0xb1],
			exception_table: vec![],
			attributes: vec![],
		}))?;
		let marker = AttributeInfo::unknown(&mut constant_pool, "Marker", vec![1, 2, 3])?;

		let class = ClassFile {
			minor_version: 0,
			major_version: 52,
			constant_pool,
			access_flags: flags::ACC_SUPER,
			this_class,
			super_class,
			interfaces: vec![],
			fields: vec![],
			methods: vec![MemberInfo {
				access_flags: flags::ACC_STATIC,
				name_index,
				descriptor_index,
				attributes: vec![code],
			}],
			attributes: vec![marker],
		};

		let mut out = Vec::new();
		dump(&class, true, &mut out)?;
		let out = String::from_utf8(out)?;

		assert_eq!(out, "\
class A (version 52.0, flags 0x0020)
  extends java/lang/Object
constant pool, count 9:
  #1 = Utf8 A
  #2 = Class A
  #3 = Utf8 java/lang/Object
  #4 = Class java/lang/Object
  #5 = Utf8 run
  #6 = Utf8 ()V
  #7 = Utf8 Code
  #8 = Utf8 Marker
method run()V (flags 0x0008)
  attribute Code, 16 bytes
    code: max_stack = 0, max_locals = 0
        0: goto -> 3
        3: return
attribute Marker (unknown), 3 bytes
");
		Ok(())
	}
}
