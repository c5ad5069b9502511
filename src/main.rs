use std::num::NonZeroUsize;
use std::path::PathBuf;
use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::{info, LevelFilter};

mod dump;
mod roundtrip;
mod scan;

#[derive(Debug, Parser)]
#[command(version, about = "Reads java class files and writes them back, byte for byte")]
struct Cli {
	/// Be verbose. Give twice for trace output.
	#[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
	verbose: u8,

	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Decodes and re-encodes class files, and reports every one that doesn't come back identical
	Roundtrip {
		/// Class files, jar or zip archives, or directories to search for them.
		#[arg(required = true)]
		paths: Vec<PathBuf>,
		/// Stop at the first class file that fails or doesn't round trip.
		#[arg(long = "fail-fast")]
		fail_fast: bool,
		/// Number of threads to check on.
		#[arg(short = 'j', long = "jobs", default_value = "1")]
		jobs: NonZeroUsize,
	},
	/// Prints the contents of a class file
	Dump {
		file: PathBuf,
		/// Also print the decoded instructions of every method.
		#[arg(long = "code")]
		code: bool,
	},
}

fn setup_logger(verbose: u8) -> Result<()> {
	let level = match verbose {
		0 => LevelFilter::Info,
		1 => LevelFilter::Debug,
		_ => LevelFilter::Trace,
	};

	fern::Dispatch::new()
		.format(|out, message, record| {
			out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message))
		})
		.level(level)
		.chain(std::io::stderr())
		.apply()
		.context("failed to set up logging")
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	setup_logger(cli.verbose)?;

	match cli.command {
		Command::Roundtrip { paths, fail_fast, jobs } => {
			let sources = scan::find_sources(&paths)?;
			info!("found {} files to check", sources.len());

			let stats = roundtrip::check_all(&sources, fail_fast, jobs.get());
			println!("checked: {}, mismatches: {}, failures: {}", stats.checked, stats.mismatches, stats.failures);

			if !stats.is_clean() {
				bail!("{} class files didn't round trip, {} failed to decode", stats.mismatches, stats.failures);
			}
			Ok(())
		},
		Command::Dump { file, code } => {
			let bytes = std::fs::read(&file)
				.with_context(|| format!("failed to read {file:?}"))?;
			let class = class_file::ClassFile::read(&bytes)
				.with_context(|| format!("failed to decode {file:?}"))?;

			let mut out = std::io::stdout().lock();
			dump::dump(&class, code, &mut out)
		},
	}
}
