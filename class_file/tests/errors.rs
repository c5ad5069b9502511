mod common;

use anyhow::Result;
use pretty_assertions::assert_eq;
use class_file::{error_kind, ClassFile, ClassFileError};
use common::{attribute, member, Bytes, ClassBuilder, Pool};

fn kind_of_error(bytes: &[u8]) -> ClassFileError {
	match ClassFile::read(bytes) {
		Ok(class) => panic!("expected an error, got {class:?}"),
		Err(error) => error_kind(&error).cloned().unwrap_or_else(|| panic!("no class file error in {error:?}")),
	}
}

#[test]
fn bad_magic() {
	let mut bytes = common::class_with_code(&[0xb1]);
	bytes[0] = 0xde;

	assert_eq!(kind_of_error(&bytes), ClassFileError::BadMagic(0xdefebabe));
}

#[test]
fn unknown_pool_tag() {
	let mut pool = Pool::new();
	pool.utf8("A");
	pool.tagged(2, &[0, 0]);
	let bytes = ClassBuilder::default().build(pool);

	assert_eq!(kind_of_error(&bytes), ClassFileError::UnknownPoolTag { tag: 2, index: 2 });
}

#[test]
fn long_as_last_entry() {
	let mut pool = Pool::new();
	pool.utf8("A");
	pool.long(1);
	// the count only covers the first slot of the long
	let mut bytes = ClassBuilder::default().build(pool);
	bytes[9] -= 1;

	assert!(matches!(kind_of_error(&bytes), ClassFileError::Malformed { what: "constant pool", .. }));
}

#[test]
fn trailing_bytes() {
	let mut bytes = common::class_with_code(&[0xb1]);
	bytes.extend_from_slice(&[0, 0, 0]);

	assert_eq!(kind_of_error(&bytes), ClassFileError::TrailingBytes { count: 3 });
}

#[test]
fn attribute_body_longer_than_its_content() {
	let mut pool = Pool::new();
	let this_class = pool.class("A");
	let line_number_table = pool.utf8("LineNumberTable");
	let name = pool.utf8("run");
	let descriptor = pool.utf8("()V");
	// one entry, and one byte nobody reads
	let body = Bytes::new().u2(1).u2(0).u2(10).u1(0xff).finish();
	let bytes = ClassBuilder {
		this_class,
		methods: vec![member(0, name, descriptor, &[attribute(line_number_table, &body)])],
		..ClassBuilder::default()
	}.build(pool);

	assert_eq!(kind_of_error(&bytes), ClassFileError::LengthMismatch {
		what: "attribute \"LineNumberTable\"".to_owned(),
		declared: 7,
		computed: 6,
	});
}

#[test]
fn attribute_with_broken_name_index_is_kept() -> Result<()> {
	let mut pool = Pool::new();
	let this_class = pool.class("A");
	let bytes = ClassBuilder {
		this_class,
		// index 2 is the `Class` entry, not an `Utf8` one
		attributes: vec![attribute(2, &[9, 8, 7])],
		..ClassBuilder::default()
	}.build(pool);

	let class = ClassFile::read(&bytes)?;
	assert_eq!(class.attributes[0].data, class_file::Attribute::Unknown { info: vec![9, 8, 7] });
	assert_eq!(class.write()?, bytes);
	Ok(())
}

#[test]
fn unrecognized_opcode_shows_up_when_decoding_code() -> Result<()> {
	// nop, then the unassigned opcode 0xcb
	let bytes = common::class_with_code(&[0x00, 0xcb, 0xb1]);

	// the code array is only decoded when asked for
	let class = ClassFile::read(&bytes)?;
	assert_eq!(class.write()?, bytes);

	let code = class.methods[0].code().expect("method has code");
	let error = code.instructions().unwrap_err();
	assert_eq!(error_kind(&error), Some(&ClassFileError::UnrecognizedOpcode { opcode: 0xcb, offset: 1 }));
	Ok(())
}

#[test]
fn unresolved_indices_are_recoverable() -> Result<()> {
	let bytes = common::class_with_code(&[0xb1]);
	let class = ClassFile::read(&bytes)?;

	let text = class.constant_pool.resolved_text(100).unwrap_or_else(|e| format!("<{e}>"));
	assert_eq!(text, "<unresolved constant pool index 100: out of range, the pool has 8 slots>");

	// `#2` is a `Class` entry
	let error = class.resolve_utf8(2).unwrap_err();
	assert!(matches!(error, ClassFileError::UnresolvedPoolIndex { index: 2, .. }), "{error:?}");
	Ok(())
}

#[test]
fn deeply_nested_annotation_default() {
	let mut pool = Pool::new();
	let this_class = pool.class("A");
	let annotation_default = pool.utf8("AnnotationDefault");
	let name = pool.utf8("value");
	let descriptor = pool.utf8("()[[I");
	let one = pool.integer(1);
	let mut body = Bytes::new();
	for _ in 0..100_000 {
		body = body.u1(b'[').u2(1);
	}
	let body = body.u1(b'I').u2(one).finish();
	let bytes = ClassBuilder {
		this_class,
		methods: vec![member(0x0401, name, descriptor, &[attribute(annotation_default, &body)])],
		..ClassBuilder::default()
	}.build(pool);

	assert!(matches!(kind_of_error(&bytes), ClassFileError::Malformed { what: "element value", .. }));
}
