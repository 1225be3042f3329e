//! Deterministic, idempotent lookup and copy of an archive entry.

use globset::{Glob, GlobMatcher};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

use crate::error::{ConfigError, PipelineError, PipelineResult};

/// Pattern used to find document artwork inside catalog archives.
pub const DOCUMENT_PATTERN: &str = "*.pdf";

/// Result of a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractOutcome {
    /// Where the entry was copied to
    pub path: PathBuf,
    /// Full name of the selected entry inside the archive
    pub entry: String,
    /// False when the destination already existed and nothing was written
    pub copied: bool,
    /// Other matching entries, in traversal order
    pub discarded: Vec<String>,
}

struct EntryInfo {
    index: usize,
    name: String,
    base_name: String,
    is_dir: bool,
}

/// Finds the first entry whose base name matches a glob and copies it out.
#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    pattern: String,
    matcher: GlobMatcher,
}

impl ArchiveExtractor {
    /// Compile `pattern`; an invalid glob is a configuration error.
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let glob = Glob::new(pattern).map_err(|e| {
            ConfigError::ValidationError(format!("invalid glob pattern {:?}: {}", pattern, e))
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            matcher: glob.compile_matcher(),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Copy the first matching entry of `archive` into `destination`.
    ///
    /// Entries are visited depth-first with siblings in lexicographic order,
    /// so repeated runs always select the same entry. An existing file at
    /// the destination is left untouched.
    pub fn extract(&self, archive: &Path, destination: &Path) -> PipelineResult<ExtractOutcome> {
        let file = File::open(archive).map_err(|e| PipelineError::io(archive, e))?;
        let mut zip = ZipArchive::new(file).map_err(|e| archive_err(archive, e))?;

        let mut entries = Vec::with_capacity(zip.len());
        for index in 0..zip.len() {
            let entry = zip.by_index_raw(index).map_err(|e| archive_err(archive, e))?;
            let name = entry.name().to_string();
            let Some(base_name) = base_name(&name) else {
                continue;
            };
            entries.push(EntryInfo {
                index,
                base_name: base_name.to_string(),
                is_dir: entry.is_dir(),
                name,
            });
        }
        entries.sort_by(|a, b| a.name.split('/').cmp(b.name.split('/')));

        let matches: Vec<&EntryInfo> = entries
            .iter()
            .filter(|e| self.matcher.is_match(&e.base_name))
            .collect();

        let Some(selected) = matches.iter().find(|e| !e.is_dir && is_plain_name(&e.base_name))
        else {
            tracing::debug!(
                "No entry matching {:?} in {:?} ({} entries)",
                self.pattern,
                archive,
                entries.len()
            );
            return Err(PipelineError::NoMatchingEntry {
                archive: archive.to_path_buf(),
                pattern: self.pattern.clone(),
            });
        };

        let discarded: Vec<String> = matches
            .iter()
            .filter(|e| e.index != selected.index)
            .map(|e| e.name.clone())
            .collect();
        if !discarded.is_empty() {
            tracing::warn!(
                "Multiple entries in {:?} match {:?}; using {:?}, discarding {:?}",
                archive,
                self.pattern,
                selected.name,
                discarded
            );
        }

        let target = destination.join(&selected.base_name);
        let copied = self.copy_entry(&mut zip, archive, selected.index, &target)?;
        if copied {
            tracing::info!("Extracted {:?} from {:?} to {:?}", selected.name, archive, target);
        } else {
            tracing::debug!("{:?} already extracted, skipping copy", target);
        }

        Ok(ExtractOutcome {
            path: target,
            entry: selected.name.clone(),
            copied,
            discarded,
        })
    }

    /// Returns false if `target` already exists.
    fn copy_entry(
        &self,
        zip: &mut ZipArchive<File>,
        archive: &Path,
        index: usize,
        target: &Path,
    ) -> PipelineResult<bool> {
        let output = match OpenOptions::new().write(true).create_new(true).open(target) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(PipelineError::io(target, e)),
        };

        let result = zip
            .by_index(index)
            .map_err(|e| archive_err(archive, e))
            .and_then(|mut entry| {
                let mut writer = BufWriter::new(output);
                io::copy(&mut entry, &mut writer)
                    .and_then(|_| writer.flush())
                    .map_err(|e| PipelineError::io(target, e))
            });

        if let Err(e) = result {
            if let Err(remove_err) = fs::remove_file(target) {
                tracing::warn!("Failed to remove partial file {:?}: {}", target, remove_err);
            }
            return Err(e);
        }
        Ok(true)
    }
}

fn archive_err(archive: &Path, e: zip::result::ZipError) -> PipelineError {
    PipelineError::Archive {
        archive: archive.to_path_buf(),
        message: e.to_string(),
    }
}

/// Last non-empty `/`-separated component of an entry name.
fn base_name(name: &str) -> Option<&str> {
    name.split('/').rev().find(|part| !part.is_empty())
}

/// Base names that are safe to join onto the destination directory.
fn is_plain_name(name: &str) -> bool {
    name != "." && name != ".." && !name.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn documents() -> ArchiveExtractor {
        ArchiveExtractor::new(DOCUMENT_PATTERN).unwrap()
    }

    enum Entry<'a> {
        File(&'a str, &'a [u8]),
        Dir(&'a str),
    }

    fn write_zip(path: &Path, entries: &[Entry<'_>]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        for entry in entries {
            match entry {
                Entry::File(name, bytes) => {
                    zip.start_file(*name, options).unwrap();
                    zip.write_all(bytes).unwrap();
                }
                Entry::Dir(name) => zip.add_directory(*name, options).unwrap(),
            }
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_round_trip_nested_entry() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("art.zip");
        let dest = dir.path().join("out");
        fs::create_dir(&dest).unwrap();
        let payload = b"%PDF-1.4 nested payload";
        write_zip(
            &archive,
            &[
                Entry::File("readme.txt", b"hello"),
                Entry::File("nested/dir/test.pdf", payload),
            ],
        );

        let outcome = documents().extract(&archive, &dest).unwrap();
        assert_eq!(outcome.path, dest.join("test.pdf"));
        assert_eq!(outcome.entry, "nested/dir/test.pdf");
        assert!(outcome.copied);
        assert!(outcome.discarded.is_empty());
        assert_eq!(fs::read(dest.join("test.pdf")).unwrap(), payload);
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("art.zip");
        let dest = dir.path().join("out");
        fs::create_dir(&dest).unwrap();
        write_zip(&archive, &[Entry::File("cover.pdf", b"%PDF-1.4 cover")]);

        let extractor = documents();
        let first = extractor.extract(&archive, &dest).unwrap();
        assert!(first.copied);
        let before = fs::metadata(&first.path).unwrap().modified().unwrap();

        let second = extractor.extract(&archive, &dest).unwrap();
        assert!(!second.copied);
        assert_eq!(second.path, first.path);
        let after = fs::metadata(&second.path).unwrap().modified().unwrap();
        assert_eq!(before, after);
        assert_eq!(fs::read(&second.path).unwrap(), b"%PDF-1.4 cover");
    }

    #[test]
    fn test_existing_destination_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("art.zip");
        let dest = dir.path().join("out");
        fs::create_dir(&dest).unwrap();
        write_zip(&archive, &[Entry::File("cover.pdf", b"from archive")]);
        fs::write(dest.join("cover.pdf"), b"already here").unwrap();

        let outcome = documents().extract(&archive, &dest).unwrap();
        assert!(!outcome.copied);
        assert_eq!(fs::read(dest.join("cover.pdf")).unwrap(), b"already here");
    }

    #[test]
    fn test_ambiguous_matches_select_first_in_traversal_order() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("art.zip");
        // Stored order differs from canonical order
        write_zip(
            &archive,
            &[
                Entry::File("z.pdf", b"z"),
                Entry::File("b/second.pdf", b"b"),
                Entry::File("a/first.pdf", b"a"),
            ],
        );

        let extractor = documents();
        for run in 0..3 {
            let dest = dir.path().join(format!("out{run}"));
            fs::create_dir(&dest).unwrap();
            let outcome = extractor.extract(&archive, &dest).unwrap();
            assert_eq!(outcome.entry, "a/first.pdf");
            assert_eq!(outcome.discarded, vec!["b/second.pdf", "z.pdf"]);
            assert_eq!(fs::read(dest.join("first.pdf")).unwrap(), b"a");
        }
    }

    #[test]
    fn test_directory_entries_are_never_selected() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("art.zip");
        let dest = dir.path().join("out");
        fs::create_dir(&dest).unwrap();
        write_zip(
            &archive,
            &[
                Entry::Dir("a.pdf/"),
                Entry::File("b/cover.pdf", b"cover"),
            ],
        );

        let outcome = documents().extract(&archive, &dest).unwrap();
        assert_eq!(outcome.entry, "b/cover.pdf");
        assert_eq!(outcome.discarded, vec!["a.pdf/"]);
    }

    #[test]
    fn test_no_match_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("art.zip");
        let dest = dir.path().join("out");
        fs::create_dir(&dest).unwrap();
        write_zip(&archive, &[Entry::File("cover.png", b"png")]);

        let err = documents().extract(&archive, &dest).unwrap_err();
        assert!(matches!(err, PipelineError::NoMatchingEntry { .. }));
        assert_eq!(fs::read_dir(&dest).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_archive_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = documents()
            .extract(&dir.path().join("missing.zip"), dir.path())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn test_corrupt_archive_is_archive_error() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("broken.zip");
        fs::write(&archive, b"not a zip at all").unwrap();
        let err = documents().extract(&archive, dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Archive { .. }));
    }

    #[test]
    fn test_invalid_glob_is_config_error() {
        let err = ArchiveExtractor::new("[").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_custom_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("art.zip");
        let dest = dir.path().join("out");
        fs::create_dir(&dest).unwrap();
        write_zip(
            &archive,
            &[
                Entry::File("cover.pdf", b"pdf"),
                Entry::File("scans/cover.png", b"png"),
            ],
        );

        let outcome = ArchiveExtractor::new("*.png")
            .unwrap()
            .extract(&archive, &dest)
            .unwrap();
        assert_eq!(outcome.path, dest.join("cover.png"));
    }
}
