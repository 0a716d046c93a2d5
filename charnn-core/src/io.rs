use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::{fs, io};

/// Extension of serialized models.
pub const MODEL_EXTENSION: &str = "bin";

/// Reads a whole corpus file into memory.
pub fn read_text<P: AsRef<Path>>(path: P) -> io::Result<String> {
	fs::read_to_string(path)
}

/// Model cached next to a corpus: `data/shakespeare.txt` is cached as
/// `data/shakespeare.bin`.
pub fn cache_path<P: AsRef<Path>>(corpus_path: P) -> io::Result<PathBuf> {
	let corpus_path = corpus_path.as_ref();
	if corpus_path.file_name().is_none() {
		return Err(io::Error::new(
			io::ErrorKind::InvalidInput,
			format!("{} does not name a corpus file", corpus_path.display()),
		));
	}
	Ok(corpus_path.with_extension(MODEL_EXTENSION))
}

/// Names of the models saved in `dir`, sorted.
///
/// A model name is the file stem of a `.bin` file; other entries are skipped.
pub fn list_models<P: AsRef<Path>>(dir: P) -> io::Result<Vec<String>> {
	let mut names: Vec<String> = fs::read_dir(dir)?
		.map(|entry| entry.map(|e| e.path()))
		.collect::<io::Result<Vec<_>>>()?
		.into_iter()
		.filter(|path| path.is_file() && path.extension() == Some(OsStr::new(MODEL_EXTENSION)))
		.filter_map(|path| path.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
		.collect();

	names.sort();
	Ok(names)
}
