mod common;

use std::io::Cursor;
use anyhow::Result;
use pretty_assertions::assert_eq;
use class_file::attribute::annotation::ElementValue;
use class_file::attribute::stack_map::{StackMapFrame, VerificationType};
use class_file::attribute::LineNumberEntry;
use class_file::{error_kind, read_class, write_class, Attribute, ClassFile, ClassFileError, Operands, PoolEntry};
use common::{attribute, code, member, Bytes, ClassBuilder, Pool};

struct Indices {
	long: u16,
	modified_utf8: u16,
	method_handle: u16,
}

/// A class using most of the format: a wide pool entry, modified UTF-8, a field constant, a method with switches, `wide` and
/// `invokedynamic` plus nested attributes, annotations, bootstrap methods and an attribute nobody knows.
fn rich_class() -> (Vec<u8>, Indices) {
	let mut pool = Pool::new();
	let this_class = pool.class("A"); // #2
	let super_class = pool.class("java/lang/Object"); // #4
	let run = pool.utf8("run");
	let void = pool.utf8("()V");
	let code_name = pool.utf8("Code");
	let line_number_table = pool.utf8("LineNumberTable");
	let stack_map_table = pool.utf8("StackMapTable");
	let long = pool.long(0x0123_4567_89ab_cdef);
	let after_long = pool.integer(7);
	let hash_code = pool.method_ref("java/lang/Object", "hashCode", "()I");
	let method_handle = pool.method_handle(6, hash_code);
	let invoke_dynamic = pool.invoke_dynamic(0, "go", "()V");
	let string = pool.string("hello");
	let field_name = pool.utf8("L");
	let field_descriptor = pool.utf8("J");
	let constant_value = pool.utf8("ConstantValue");
	let source_file = pool.utf8("SourceFile");
	let source_file_name = pool.utf8("A.java");
	let annotations = pool.utf8("RuntimeVisibleAnnotations");
	let marker = pool.utf8("LMarker;");
	let value = pool.utf8("value");
	let kind = pool.utf8("Lfoo/Kind;");
	let one = pool.utf8("ONE");
	let bootstrap_methods = pool.utf8("BootstrapMethods");
	let custom = pool.utf8("Custom");
	// "\0" and U+1F600 as a surrogate pair
	let modified_utf8 = pool.utf8_raw(&[0xc0, 0x80, 0xed, 0xa0, 0xbd, 0xed, 0xb8, 0x80]);

	let [long_high, long_low] = long.to_be_bytes();
	let [indy_high, indy_low] = invoke_dynamic.to_be_bytes();
	let code_array = Bytes::new()
		.u1(0x1a) // 0: iload_0
		.u1(0xaa).raw(&[0, 0]).u4(38).u4(0).u4(1).u4(23).u4(33) // 1: tableswitch, padded
		.raw(&[0xc4, 0x84, 0x01, 0x2c, 0xff, 0xff]) // 24: wide iinc 300 -1
		.raw(&[0x14, long_high, long_low]) // 30: ldc2_w
		.u1(0x58) // 33: pop2
		.raw(&[0xba, indy_high, indy_low, 0, 0]) // 34: invokedynamic
		.u1(0xb1) // 39: return
		.finish();
	assert_eq!(code_array.len(), 40);

	let lines = Bytes::new().u2(2).u2(0).u2(10).u2(24).u2(11).finish();
	let frames = Bytes::new()
		.u2(2)
		.u1(24)
		.u1(255).u2(9).u2(1).u1(1).u2(1).u1(7).u2(this_class)
		.finish();
	let method_code = code(2, 301, &code_array, &[
		attribute(line_number_table, &lines),
		attribute(stack_map_table, &frames),
	]);

	let annotation_body = Bytes::new()
		.u2(1)
		.u2(marker).u2(2)
		.u2(value).u1(b'[').u2(2)
			.u1(b'I').u2(after_long)
			.u1(b'e').u2(kind).u2(one)
		.u2(value).u1(b'@').u2(marker).u2(0)
		.finish();
	let bootstrap_body = Bytes::new().u2(1).u2(method_handle).u2(1).u2(string).finish();

	let bytes = ClassBuilder {
		access_flags: 0x0021,
		this_class,
		super_class,
		interfaces: vec![],
		fields: vec![member(0x0018, field_name, field_descriptor, &[attribute(constant_value, &long.to_be_bytes())])],
		methods: vec![member(0x0009, run, void, &[attribute(code_name, &method_code)])],
		attributes: vec![
			attribute(source_file, &source_file_name.to_be_bytes()),
			attribute(annotations, &annotation_body),
			attribute(bootstrap_methods, &bootstrap_body),
			attribute(custom, &[1, 2, 3, 4, 5]),
		],
	}.build(pool);

	(bytes, Indices { long, modified_utf8, method_handle })
}

#[test]
fn rich_class_is_written_back_unchanged() -> Result<()> {
	let (bytes, _) = rich_class();

	let class = ClassFile::read(&bytes)?;
	assert_eq!(class.length(), bytes.len());
	assert_eq!(class.write()?, bytes);
	Ok(())
}

#[test]
fn rich_class_structure() -> Result<()> {
	let (bytes, indices) = rich_class();
	let class = ClassFile::read(&bytes)?;

	assert_eq!(class.this_class_name()?, "A");
	assert_eq!(class.super_class_name()?, Some("java/lang/Object"));

	assert_eq!(class.entry_at(indices.long)?, &PoolEntry::Long { value: 0x0123_4567_89ab_cdef });
	let upper_half = class.entry_at(indices.long + 1).unwrap_err();
	assert!(matches!(upper_half, ClassFileError::UnresolvedPoolIndex { .. }), "{upper_half:?}");
	assert!(class.entry_at(0).is_err());

	assert_eq!(class.resolve_utf8(indices.modified_utf8)?, "\0\u{1f600}");
	assert_eq!(
		class.constant_pool.resolved_text(indices.method_handle)?,
		"REF_invokeStatic java/lang/Object.hashCode:()I",
	);

	let attribute_names: Vec<_> = class.attributes.iter().map(|a| class.resolve_utf8(a.name_index)).collect::<Result<_, _>>()?;
	assert_eq!(attribute_names, vec!["SourceFile", "RuntimeVisibleAnnotations", "BootstrapMethods", "Custom"]);
	assert_eq!(class.attributes[3].data, Attribute::Unknown { info: vec![1, 2, 3, 4, 5] });

	let Attribute::RuntimeAnnotations { visible: true, annotations } = &class.attributes[1].data else {
		panic!("expected visible annotations, got {:?}", class.attributes[1].data);
	};
	assert_eq!(annotations.len(), 1);
	let pairs = &annotations[0].element_value_pairs;
	assert!(matches!(&pairs[0].value, ElementValue::Array(values) if values.len() == 2));
	assert!(matches!(&pairs[1].value, ElementValue::Annotation(nested) if nested.element_value_pairs.is_empty()));

	let method = class.find_method("run", "()V").expect("method run()V exists");
	let code = method.code().expect("run()V has code");
	assert_eq!(code.max_locals, 301);

	let Attribute::LineNumberTable { line_number_table } = &code.attributes[0].data else {
		panic!("expected a line number table, got {:?}", code.attributes[0].data);
	};
	assert_eq!(line_number_table, &vec![
		LineNumberEntry { start_pc: 0, line_number: 10 },
		LineNumberEntry { start_pc: 24, line_number: 11 },
	]);
	let Attribute::StackMapTable { entries } = &code.attributes[1].data else {
		panic!("expected a stack map table, got {:?}", code.attributes[1].data);
	};
	assert_eq!(entries, &vec![
		StackMapFrame::Same { offset_delta: 24 },
		StackMapFrame::Full { offset_delta: 9, locals: vec![VerificationType::Integer], stack: vec![VerificationType::Object { cpool_index: 2 }] },
	]);
	Ok(())
}

#[test]
fn rich_class_instructions() -> Result<()> {
	let (bytes, indices) = rich_class();
	let class = ClassFile::read(&bytes)?;
	let code = class.find_method("run", "()V").and_then(|m| m.code()).expect("run()V has code");

	let instructions = code.instructions()?;

	let offsets: Vec<_> = instructions.iter().map(|i| i.offset()).collect();
	assert_eq!(offsets, vec![0, 1, 24, 25, 30, 33, 34, 39]);
	let total: u32 = instructions.iter().map(|i| i.size()).sum();
	assert_eq!(total as usize, code.code.len());

	assert_eq!(instructions[1].branch_targets(), vec![39, 24, 34]);
	assert_eq!(instructions[3].operands, Operands::WideIncrement { index: 300, constant: -1 });
	assert_eq!(instructions[4].operands, Operands::ImmediateShort(indices.long));
	assert!(matches!(instructions[6].operands, Operands::InvokeDynamic { .. }));

	assert_eq!(class_file::bytecode::encode(&instructions)?, code.code);
	Ok(())
}

#[test]
fn every_prefix_is_truncated() -> Result<()> {
	let bytes = common::class_with_code(&[0xb1]);
	ClassFile::read(&bytes)?;

	for cut in 0..bytes.len() {
		let error = ClassFile::read(&bytes[..cut]).unwrap_err();
		assert!(
			matches!(error_kind(&error), Some(ClassFileError::TruncatedInput { .. })),
			"cut at {cut}: {error:?}",
		);
	}
	Ok(())
}

#[test]
fn through_io() -> Result<()> {
	let (bytes, _) = rich_class();

	let class = read_class(&mut Cursor::new(&bytes))?;
	let mut out = Vec::new();
	write_class(&mut out, &class)?;

	assert_eq!(out, bytes);
	Ok(())
}
