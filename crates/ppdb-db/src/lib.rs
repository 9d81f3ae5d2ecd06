//! Load PPDB rule files and pronunciation vocabularies.
//!
//! Two inputs feed the paraphrase filter: a [`Vocabulary`] built from a
//! tab-separated pronunciation dictionary, and a stream of
//! [`TransformationRecord`]s read from a PPDB file. Both can be memory-mapped
//! or read into an owned buffer, chosen at runtime via [`LoadMode`]. PPDB
//! releases run to several gigabytes, so records are parsed lazily from the
//! backing bytes rather than collected up front.
//!
//! # Example
//! ```no_run
//! use ppdb_db::{LoadMode, PpdbFile, Vocabulary};
//!
//! # fn main() -> anyhow::Result<()> {
//! let vocab = Vocabulary::load("/path/to/cmudict.tsv")?;
//! let ppdb = PpdbFile::open_with_mode("/path/to/ppdb-2.0-s-lexical", LoadMode::Mmap)?;
//! for record in ppdb.records() {
//!     let record = record?;
//!     if let Some(word) = record.target.last() {
//!         println!("{} known? {}", word, vocab.contains(word));
//!     }
//! }
//! # Ok(()) }
//! ```

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use memmap2::Mmap;
use ppdb_types::{Expression, TransformationRecord};
use tracing::info;

/// Field separator used by PPDB rule lines.
pub const FIELD_SEPARATOR: &str = "|||";

/// Strategy for loading input files.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map the file (fast, zero-copy).
    #[default]
    Mmap,
    /// Read the file into an owned buffer (portable fallback).
    Owned,
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

/// Set of lowercase tokens known to the pronunciation dictionary.
#[derive(Clone, Debug, Default)]
pub struct Vocabulary {
    words: HashSet<String>,
}

impl Vocabulary {
    /// Load a tab-separated vocabulary file, memory-mapping it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_mode(path, LoadMode::Mmap)
    }

    /// Load a tab-separated vocabulary file; every field becomes a token.
    ///
    /// Each call builds a fresh set. Empty fields and line terminators are
    /// ignored.
    pub fn load_with_mode(path: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let path = path.as_ref();
        let buffer = load_file(path, mode)?;
        let mut words = HashSet::new();
        for (lineno, raw_line) in buffer.as_slice().split(|b| *b == b'\n').enumerate() {
            let line = std::str::from_utf8(strip_cr(raw_line))
                .with_context(|| format!("{}:{} invalid utf8", path.display(), lineno + 1))?;
            for field in line.split('\t').filter(|f| !f.is_empty()) {
                words.insert(field.to_lowercase());
            }
        }
        info!(
            "loaded {} vocabulary tokens from {}",
            words.len(),
            path.display()
        );
        Ok(Self { words })
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Vocabulary {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            words: iter
                .into_iter()
                .map(|word| word.as_ref().to_lowercase())
                .collect(),
        }
    }
}

/// A PPDB rule file opened for streaming.
pub struct PpdbFile {
    path: PathBuf,
    buffer: Buffer,
}

impl PpdbFile {
    /// Open a PPDB file, memory-mapping it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_mode(path, LoadMode::Mmap)
    }

    pub fn open_with_mode(path: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let buffer = load_file(&path, mode)?;
        Ok(Self { path, buffer })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lazily parse every non-blank line into a record.
    ///
    /// A malformed line yields an error naming the file and line number; the
    /// iterator keeps going, so callers decide whether to stop or skip.
    pub fn records(&self) -> impl Iterator<Item = Result<TransformationRecord>> + '_ {
        self.buffer
            .as_slice()
            .split(|b| *b == b'\n')
            .enumerate()
            .filter_map(move |(lineno, raw_line)| {
                let line = strip_cr(raw_line);
                if line.iter().all(u8::is_ascii_whitespace) {
                    return None;
                }
                let parsed = std::str::from_utf8(line)
                    .map_err(anyhow::Error::from)
                    .and_then(parse_record)
                    .with_context(|| format!("{}:{}", self.path.display(), lineno + 1));
                Some(parsed)
            })
    }
}

/// Parse one PPDB line: `LABEL ||| SOURCE ||| TARGET ||| features ...`.
pub fn parse_record(line: &str) -> Result<TransformationRecord> {
    let mut fields = line.split(FIELD_SEPARATOR).map(str::trim);
    let (Some(label), Some(source), Some(target)) = (fields.next(), fields.next(), fields.next())
    else {
        bail!("malformed PPDB line (expected at least 3 `{FIELD_SEPARATOR}` fields)");
    };

    let source = Expression::from_phrase(source);
    let target = Expression::from_phrase(target);
    if source.is_empty() || target.is_empty() {
        bail!("malformed PPDB line (empty phrase)");
    }

    Ok(TransformationRecord {
        label: label.to_string(),
        source,
        target,
    })
}

fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer> {
    match mode {
        LoadMode::Mmap => {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        LoadMode::Owned => {
            let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}
