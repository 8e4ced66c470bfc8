use std::path::{Path, PathBuf};
use std::{fs, io};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::PersistError;

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/words.dat` + `"bin"` → `data/words.bin`
pub(crate) fn build_output_path<P: AsRef<Path>>(input_path: P, output_extension: &str) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Serializes `value` with postcard and writes it to `path`.
pub(crate) fn write_binary<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<(), PersistError> {
	let bytes = postcard::to_stdvec(value).map_err(|e| PersistError::encoding("encoding binary file", e))?;
	fs::write(path, bytes).map_err(|e| PersistError::io("writing binary file", e))
}

/// Reads and deserializes a postcard file written by [`write_binary`].
pub(crate) fn read_binary<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, PersistError> {
	let bytes = fs::read(path).map_err(|e| PersistError::io("reading binary file", e))?;
	postcard::from_bytes(&bytes).map_err(|e| PersistError::encoding("decoding binary file", e))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn output_path_swaps_extension() {
		assert_eq!(build_output_path("data/words.dat", "bin").unwrap(), PathBuf::from("data/words.bin"));
		assert_eq!(build_output_path("words", "bin").unwrap(), PathBuf::from("words.bin"));
	}

	#[test]
	fn binary_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("values.bin");
		write_binary(&vec![1.5f64, -2.0], &path).unwrap();
		assert_eq!(read_binary::<Vec<f64>, _>(&path).unwrap(), vec![1.5, -2.0]);
		assert!(matches!(read_binary::<Vec<f64>, _>(dir.path().join("missing.bin")), Err(PersistError::Io { .. })));
	}
}
