//! Filesystem glue used by the scenario and export helpers.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::{fs, io};

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{Error, TestkitIoError};
use crate::TestkitResult;

/// Creates a directory and any missing parents. Existing directories
/// are not an error.
pub fn create_dir(dir: &Path) -> TestkitResult<()> {
    if !dir.is_dir() {
        fs::create_dir_all(dir).map_err(|e| {
            TestkitIoError::new(
                format!("could not create dir: {}", dir.to_string_lossy()),
                e,
            )
        })?;
    }
    Ok(())
}

pub fn remove_dir_all(dir: &Path) -> TestkitResult<()> {
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(|e| {
            TestkitIoError::new(
                format!(
                    "could not remove-all dir: {}",
                    dir.to_string_lossy()
                ),
                e,
            )
        })?;
    }
    Ok(())
}

pub fn create_file_with_path(path: &Path) -> TestkitResult<File> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                TestkitIoError::new(
                    format!(
                        "could not create dir path for: {}",
                        parent.to_string_lossy()
                    ),
                    e,
                )
            })?;
        }
    }
    File::create(path)
        .map_err(|e| {
            TestkitIoError::new(
                format!(
                    "could not create file: {}",
                    path.to_string_lossy()
                ),
                e,
            )
        })
        .map_err(Error::IoError)
}

/// Saves a file, creating parent dirs as needed.
pub fn save(content: &[u8], full_path: &Path) -> TestkitResult<()> {
    let mut f = create_file_with_path(full_path)?;
    f.write_all(content).map_err(|e| {
        TestkitIoError::new(
            format!("could not write to: {}", full_path.to_string_lossy()),
            e,
        )
    })?;
    Ok(())
}

/// Reads a file to Bytes.
pub fn read(path: &Path) -> TestkitResult<Bytes> {
    let mut f = File::open(path).map_err(|e| {
        TestkitIoError::new(
            format!("could not open: {}", path.to_string_lossy()),
            e,
        )
    })?;
    let mut bytes = Vec::new();
    f.read_to_end(&mut bytes).map_err(|e| {
        TestkitIoError::new(
            format!("could not read: {}", path.to_string_lossy()),
            e,
        )
    })?;
    Ok(Bytes::from(bytes))
}

/// Reads a file fully into a string.
pub fn read_to_string(path: &Path) -> TestkitResult<String> {
    let bytes = read(path)?;
    String::from_utf8(bytes.to_vec()).map_err(|e| {
        Error::IoError(TestkitIoError::new(
            format!("file is not valid UTF-8: {}", path.to_string_lossy()),
            io::Error::new(io::ErrorKind::InvalidData, e),
        ))
    })
}

/// Loads a file and deserializes it as JSON for the expected type.
pub fn load_json<O: DeserializeOwned>(full_path: &Path) -> TestkitResult<O> {
    let bytes = read(full_path)?;
    serde_json::from_slice(&bytes).map_err(Error::JsonError)
}

/// Lists the entry names directly under a directory, sorted.
pub fn files_in_dir(dir: &Path) -> TestkitResult<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| {
        TestkitIoError::new(
            format!("could not read dir: {}", dir.to_string_lossy()),
            e,
        )
    })? {
        let entry = entry.map_err(|e| {
            TestkitIoError::new(
                format!(
                    "could not read entry for dir: {}",
                    dir.to_string_lossy()
                ),
                e,
            )
        })?;
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    names.sort();
    Ok(names)
}

//------------ Tests ---------------------------------------------------------
