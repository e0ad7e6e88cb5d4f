//! Descriptor sources: the built-in batch and line-oriented text files

use crate::core::{Result, WorkQueueError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const BUILTIN: [&str; 9] = [
    "file1.txt",
    "file2.pdf",
    "file3.png",
    "file4.jpg",
    "file5.txt",
    "file6.pdf",
    "file7.png",
    "file8.java",
    "file9.txt",
];

/// The built-in demonstration batch.
///
/// Mixes supported kinds (through their `txt`/`png` aliases) with kinds that
/// are always rejected.
pub fn builtin_descriptors() -> Vec<String> {
    BUILTIN.iter().map(|d| d.to_string()).collect()
}

/// Read one descriptor per line from `path`.
///
/// # Errors
///
/// Returns `Input` if the file cannot be opened or read.
pub fn read_descriptors<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| WorkQueueError::input(path, e))?;
    let descriptors = from_reader(BufReader::new(file))
        .map_err(|e| WorkQueueError::input(path, e))?;
    log::debug!("read {} descriptors from {}", descriptors.len(), path.display());
    Ok(descriptors)
}

/// Collect trimmed, non-blank lines.
pub fn from_reader<R: BufRead>(reader: R) -> std::io::Result<Vec<String>> {
    let mut descriptors = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            descriptors.push(trimmed.to_string());
        }
    }
    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Classification, SupportedTypes};
    use std::io::{Cursor, Write};

    #[test]
    fn test_builtin_batch_classification() {
        let supported = SupportedTypes::all();
        let accepted = builtin_descriptors()
            .iter()
            .filter(|d| supported.classify(d).is_accepted())
            .count();
        assert_eq!(builtin_descriptors().len(), 9);
        assert_eq!(accepted, 7);
        assert!(matches!(
            supported.classify("file8.java"),
            Classification::Rejected(_)
        ));
    }

    #[test]
    fn test_reader_skips_blank_lines() {
        let input = Cursor::new("a.text\n\n  b.pdf  \r\n\t\nc.image");
        assert_eq!(from_reader(input).unwrap(), vec!["a.text", "b.pdf", "c.image"]);
    }

    #[test]
    fn test_read_from_file() {
        let path = std::env::temp_dir().join(format!("work-queue-input-{}.txt", std::process::id()));
        let mut file = File::create(&path).unwrap();
        writeln!(file, "report.pdf").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "photo.png").unwrap();
        drop(file);

        let descriptors = read_descriptors(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(descriptors, vec!["report.pdf", "photo.png"]);
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let err = read_descriptors("/nonexistent/descriptors.txt").unwrap_err();
        assert!(matches!(err, WorkQueueError::Input { .. }));
        assert!(err.to_string().contains("/nonexistent/descriptors.txt"));
    }
}
