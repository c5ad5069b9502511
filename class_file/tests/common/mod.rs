//! Assembling class files byte by byte.
#![allow(dead_code)]

/// Big endian byte buffer, written to in the order of the class file format.
#[derive(Debug, Default, Clone)]
pub struct Bytes(Vec<u8>);

impl Bytes {
	pub fn new() -> Bytes {
		Bytes::default()
	}

	pub fn u1(mut self, value: u8) -> Bytes {
		self.0.push(value);
		self
	}

	pub fn u2(mut self, value: u16) -> Bytes {
		self.0.extend_from_slice(&value.to_be_bytes());
		self
	}

	pub fn u4(mut self, value: u32) -> Bytes {
		self.0.extend_from_slice(&value.to_be_bytes());
		self
	}

	pub fn raw(mut self, bytes: &[u8]) -> Bytes {
		self.0.extend_from_slice(bytes);
		self
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn finish(self) -> Vec<u8> {
		self.0
	}
}

/// A constant pool, handing out indices as entries are added. No deduplication happens here.
#[derive(Debug, Clone)]
pub struct Pool {
	bytes: Bytes,
	next: u16,
}

impl Default for Pool {
	fn default() -> Self {
		Pool { bytes: Bytes::new(), next: 1 }
	}
}

impl Pool {
	pub fn new() -> Pool {
		Pool::default()
	}

	fn add(&mut self, entry: Bytes, slots: u16) -> u16 {
		let index = self.next;
		let bytes = std::mem::take(&mut self.bytes);
		self.bytes = bytes.raw(&entry.finish());
		self.next += slots;
		index
	}

	/// Adds the raw bytes, they're not checked to be modified UTF-8.
	pub fn utf8_raw(&mut self, bytes: &[u8]) -> u16 {
		self.add(Bytes::new().u1(1).u2(bytes.len() as u16).raw(bytes), 1)
	}

	pub fn utf8(&mut self, text: &str) -> u16 {
		self.utf8_raw(text.as_bytes())
	}

	pub fn integer(&mut self, value: i32) -> u16 {
		self.add(Bytes::new().u1(3).u4(value as u32), 1)
	}

	pub fn long(&mut self, value: i64) -> u16 {
		self.add(Bytes::new().u1(5).raw(&value.to_be_bytes()), 2)
	}

	pub fn class(&mut self, name: &str) -> u16 {
		let name_index = self.utf8(name);
		self.add(Bytes::new().u1(7).u2(name_index), 1)
	}

	pub fn string(&mut self, value: &str) -> u16 {
		let string_index = self.utf8(value);
		self.add(Bytes::new().u1(8).u2(string_index), 1)
	}

	pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
		let name_index = self.utf8(name);
		let descriptor_index = self.utf8(descriptor);
		self.add(Bytes::new().u1(12).u2(name_index).u2(descriptor_index), 1)
	}

	pub fn method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
		let class_index = self.class(class);
		let name_and_type_index = self.name_and_type(name, descriptor);
		self.add(Bytes::new().u1(10).u2(class_index).u2(name_and_type_index), 1)
	}

	pub fn method_handle(&mut self, reference_kind: u8, reference_index: u16) -> u16 {
		self.add(Bytes::new().u1(15).u1(reference_kind).u2(reference_index), 1)
	}

	pub fn invoke_dynamic(&mut self, bootstrap_method_attr_index: u16, name: &str, descriptor: &str) -> u16 {
		let name_and_type_index = self.name_and_type(name, descriptor);
		self.add(Bytes::new().u1(18).u2(bootstrap_method_attr_index).u2(name_and_type_index), 1)
	}

	/// Adds an entry with any tag, for producing broken pools.
	pub fn tagged(&mut self, tag: u8, body: &[u8]) -> u16 {
		self.add(Bytes::new().u1(tag).raw(body), 1)
	}
}

/// An attribute: name index, `u4` length and the body.
pub fn attribute(name_index: u16, body: &[u8]) -> Vec<u8> {
	Bytes::new().u2(name_index).u4(body.len() as u32).raw(body).finish()
}

/// The body of a `Code` attribute.
pub fn code(max_stack: u16, max_locals: u16, code: &[u8], attributes: &[Vec<u8>]) -> Vec<u8> {
	Bytes::new()
		.u2(max_stack)
		.u2(max_locals)
		.u4(code.len() as u32)
		.raw(code)
		.u2(0)
		.u2(attributes.len() as u16)
		.raw(&attributes.concat())
		.finish()
}

pub fn member(access_flags: u16, name_index: u16, descriptor_index: u16, attributes: &[Vec<u8>]) -> Vec<u8> {
	Bytes::new()
		.u2(access_flags)
		.u2(name_index)
		.u2(descriptor_index)
		.u2(attributes.len() as u16)
		.raw(&attributes.concat())
		.finish()
}

/// Everything of a class file, apart from the pool, which is given to [`ClassBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct ClassBuilder {
	pub access_flags: u16,
	pub this_class: u16,
	pub super_class: u16,
	pub interfaces: Vec<u16>,
	pub fields: Vec<Vec<u8>>,
	pub methods: Vec<Vec<u8>>,
	pub attributes: Vec<Vec<u8>>,
}

impl ClassBuilder {
	pub fn build(&self, pool: Pool) -> Vec<u8> {
		let mut bytes = Bytes::new()
			.u4(0xcafebabe)
			.u2(0)
			.u2(52)
			.u2(pool.next)
			.raw(&pool.bytes.finish())
			.u2(self.access_flags)
			.u2(self.this_class)
			.u2(self.super_class)
			.u2(self.interfaces.len() as u16);
		for &interface in &self.interfaces {
			bytes = bytes.u2(interface);
		}
		bytes
			.u2(self.fields.len() as u16)
			.raw(&self.fields.concat())
			.u2(self.methods.len() as u16)
			.raw(&self.methods.concat())
			.u2(self.attributes.len() as u16)
			.raw(&self.attributes.concat())
			.finish()
	}
}

/// A class `A extends java/lang/Object` with a single `static void run()` method holding the given code.
///
/// Pool layout: `#1` `A`, `#2` class `A`, `#3` `java/lang/Object`, `#4` class `java/lang/Object`, `#5` `run`, `#6` `()V`, `#7` `Code`.
pub fn class_with_code(code_array: &[u8]) -> Vec<u8> {
	let mut pool = Pool::new();
	let this_class = pool.class("A");
	let super_class = pool.class("java/lang/Object");
	let name = pool.utf8("run");
	let descriptor = pool.utf8("()V");
	let code_name = pool.utf8("Code");

	ClassBuilder {
		access_flags: 0x0021,
		this_class,
		super_class,
		methods: vec![member(0x0008, name, descriptor, &[attribute(code_name, &code(1, 1, code_array, &[]))])],
		..ClassBuilder::default()
	}.build(pool)
}
