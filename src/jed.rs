//! Fuse map files in the JEDEC-like line format

use std::fmt;
use std::fmt::Write;

/// Contents of a fuse map file: the fuse array plus its metadata
///
/// The array is allocated when the `QF` directive is read and filled with
/// the current default fuse value. Bit lines then write through a cursor
/// that `L` directives reposition. A later `F0`/`F1` directive rewrites
/// the whole array, not just fuses written afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JedFile {
    /// Part identifier from the `ST` directive
    pub part_number: Option<String>,
    /// Declared fuse count from the `QF` directive
    pub fuse_count: usize,
    /// Default value for fuses not explicitly written
    pub default_fuse: bool,
    /// The fuse array, of length `fuse_count`
    pub fuses: Vec<bool>,
    /// Declared checksum of the fuse section
    pub checksum_section: Option<u32>,
    /// Declared checksum of the whole file
    pub checksum_file: Option<u32>,
}

/// Errors returned by the fuse map decoder
///
/// The decoder is otherwise lenient: unrecognized lines are skipped, and a
/// file without a `QF` directive decodes to an empty fuse array, leaving
/// the caller to decide whether to proceed.
#[derive(Debug)]
pub enum JedError {
    /// The `QF` directive does not carry an integer fuse count
    BadFuseCount {
        /// 1-based line number of the offending directive
        line: usize,
        /// Text of the offending line
        field: String,
    },
}

impl fmt::Display for JedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JedError::BadFuseCount { line, field } => {
                write!(f, "line {}: invalid fuse count in {:?}", line, field)
            }
        }
    }
}

impl std::error::Error for JedError {}

impl JedFile {
    /// Decode a fuse map from its text format
    ///
    /// Each line is handled independently after trimming; blank lines and
    /// lines matching no directive are skipped. Bit lines advance a write
    /// cursor one fuse per `0`/`1` character; other characters and writes
    /// past the declared fuse count are ignored without error.
    pub fn parse(text: &str) -> Result<JedFile, JedError> {
        let mut ret = JedFile::default();
        let mut cursor = 0usize;
        for (line_no, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(rest) = line.strip_prefix("ST") {
                let part = rest.split('*').next().unwrap_or("").trim();
                ret.part_number = Some(part.to_string());
            } else if let Some(rest) = line.strip_prefix("QF") {
                let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
                let count: usize = digits.parse().map_err(|_| JedError::BadFuseCount {
                    line: line_no + 1,
                    field: line.to_string(),
                })?;
                ret.fuse_count = count;
                ret.fuses = vec![ret.default_fuse; count];
            } else if line.starts_with("F0") {
                ret.default_fuse = false;
                ret.fuses.fill(false);
            } else if line.starts_with("F1") {
                ret.default_fuse = true;
                ret.fuses.fill(true);
            } else if let Some(rest) = line.strip_prefix('C') {
                parse_checksums(rest, &mut ret);
            } else if let Some(rest) = line.strip_prefix('L') {
                let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
                if !digits.is_empty() && rest[digits.len()..].starts_with('*') {
                    cursor = digits.parse().unwrap_or(cursor);
                }
            } else if line.starts_with('0') || line.starts_with('1') {
                for c in line.chars() {
                    if (c == '0' || c == '1') && cursor < ret.fuse_count {
                        ret.fuses[cursor] = c == '1';
                        cursor += 1;
                    }
                }
            }
        }
        Ok(ret)
    }

    /// Checksum of the fuse section: byte-wise sum of the fuses packed
    /// 8 per byte, least significant bit first
    pub fn fuse_checksum(&self) -> u16 {
        let mut checksum: u16 = 0;
        for (i, fuse) in self.fuses.iter().enumerate() {
            if *fuse {
                checksum = checksum.wrapping_add(1 << (i % 8));
            }
        }
        checksum
    }

    /// Render the fuse map back to its text format
    ///
    /// All fuses are written explicitly after an `F0` reset, 80 per line,
    /// so `parse` recovers the exact array.
    pub fn emit(&self) -> String {
        let mut out = String::new();
        if let Some(ref part) = self.part_number {
            writeln!(out, "ST{part}*").unwrap();
        }
        writeln!(out, "QF{n}*", n = self.fuses.len()).unwrap();
        writeln!(out, "F0*").unwrap();
        writeln!(out, "L0*").unwrap();
        for chunk in self.fuses.chunks(80) {
            for fuse in chunk {
                write!(out, "{x}", x = u32::from(*fuse)).unwrap();
            }
            writeln!(out).unwrap();
        }
        writeln!(out, "C{checksum:04X}*", checksum = self.fuse_checksum()).unwrap();
        out
    }
}

fn parse_checksums(rest: &str, ret: &mut JedFile) {
    let data = rest.split('*').next().unwrap_or("");
    let mut values = data.split(',').filter_map(parse_checksum_value);
    if let Some(value) = values.next() {
        ret.checksum_section = Some(value);
    }
    if let Some(value) = values.next() {
        ret.checksum_file = Some(value);
    }
}

/// Base is hex if the token contains any letter, decimal otherwise
fn parse_checksum_value(token: &str) -> Option<u32> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    let base = if token.chars().any(|c| c.is_ascii_alphabetic()) {
        16
    } else {
        10
    };
    u32::from_str_radix(token, base).ok()
}
