use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use anyhow::{anyhow, Context, Result};
use log::trace;
use walkdir::WalkDir;
use zip::ZipArchive;

/// A file that holds class files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Source {
	Class(PathBuf),
	Archive(PathBuf),
}

impl Source {
	fn from_path(path: &Path) -> Option<Source> {
		match path.extension().and_then(|x| x.to_str()) {
			Some("class") => Some(Source::Class(path.to_owned())),
			Some("jar" | "zip") => Some(Source::Archive(path.to_owned())),
			_ => None,
		}
	}

	pub(crate) fn path(&self) -> &Path {
		match self {
			Source::Class(path) | Source::Archive(path) => path,
		}
	}

	/// Calls `f` with the name and the bytes of every class file in this source.
	///
	/// Errors from reading the source itself are returned, `f` decides what to do with its own errors.
	pub(crate) fn for_each_class(&self, mut f: impl FnMut(&str, &[u8])) -> Result<()> {
		match self {
			Source::Class(path) => {
				let bytes = std::fs::read(path)
					.with_context(|| anyhow!("failed to read class file {path:?}"))?;
				f(&path.to_string_lossy(), &bytes);
				Ok(())
			},
			Source::Archive(path) => {
				let file = File::open(path)
					.with_context(|| anyhow!("failed to open archive {path:?}"))?;
				for_each_class_in_zip(file, |name, bytes| f(&format!("{}!{name}", path.display()), bytes))
					.with_context(|| anyhow!("failed to read archive {path:?}"))
			},
		}
	}
}

fn for_each_class_in_zip(reader: impl Read + Seek, mut f: impl FnMut(&str, &[u8])) -> Result<()> {
	let mut zip = ZipArchive::new(reader)?;

	let mut vec = Vec::new();
	for index in 0..zip.len() {
		let mut file = zip.by_index(index)?;
		if !file.is_dir() && file.name().ends_with(".class") {
			vec.clear();
			file.read_to_end(&mut vec)
				.with_context(|| anyhow!("failed to read entry {:?}", file.name()))?;
			f(file.name(), &vec);
		}
	}

	Ok(())
}

/// Collects all class files and archives in the given paths, descending into directories. The result is sorted by path.
pub(crate) fn find_sources(paths: &[PathBuf]) -> Result<Vec<Source>> {
	let mut sources = Vec::new();

	for path in paths {
		for entry in WalkDir::new(path).follow_links(true) {
			let entry = entry.with_context(|| anyhow!("failed to walk {path:?}"))?;
			if entry.file_type().is_file() {
				if let Some(source) = Source::from_path(entry.path()) {
					trace!("found {source:?}");
					sources.push(source);
				}
			}
		}
	}

	sources.sort_by(|a, b| a.path().cmp(b.path()));
	sources.dedup();
	Ok(sources)
}
