//! The text format of a swap page file: one 64-bit word per line, written
//! as `0x` followed by the value in hex, right-aligned to 16 characters.

use std::io::{self, BufRead, Write};

//===========================================================================//

macro_rules! invalid_data {
    ($e:expr) => {
        return Err(::std::io::Error::new(::std::io::ErrorKind::InvalidData,
                                         $e))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err(::std::io::Error::new(::std::io::ErrorKind::InvalidData,
                                         format!($fmt, $($arg)+)))
    };
}

//===========================================================================//

/// Formats one word as a page file line (without the trailing newline).
///
/// The value is space-padded rather than zero-padded, so that page files
/// stay byte-for-byte identical to those written with `"0x%16lx"`.
pub fn encode_word(word: u64) -> String {
    format!("0x{word:16x}")
}

/// Parses one page file line (with or without its trailing newline).
///
/// Accepts `0x` followed by space- or zero-padded hex digits, or a plain
/// decimal number.  Returns `None` for anything else.
pub fn decode_word(line: &str) -> Option<u64> {
    let line = line.trim_end_matches(['\n', '\r']);
    if let Some(hex) =
        line.strip_prefix("0x").or_else(|| line.strip_prefix("0X"))
    {
        let digits = hex.trim_start_matches(' ');
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return None;
        }
        u64::from_str_radix(digits, 16).ok()
    } else if !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit()) {
        line.parse().ok()
    } else {
        None
    }
}

/// Writes a whole page, one line per word, in ascending word order.
pub fn write_page<W: Write>(writer: &mut W, words: &[u64]) -> io::Result<()> {
    for &word in words {
        writeln!(writer, "{}", encode_word(word))?;
    }
    writer.flush()
}

/// Writes a human-readable listing of the nonzero words of a page, each
/// prefixed with its byte offset within the page.
pub fn write_listing<W: Write>(
    writer: &mut W,
    words: &[u64],
) -> io::Result<()> {
    for (index, &word) in words.iter().enumerate() {
        if word != 0 {
            writeln!(writer, "+{:#06x}: {}", index * 8, encode_word(word))?;
        }
    }
    Ok(())
}

/// Reads exactly `word_count` lines from the page file, and decodes each of
/// them.  Any content after the last word is ignored.
pub fn read_page<R: BufRead>(
    reader: &mut R,
    word_count: usize,
) -> io::Result<Vec<u64>> {
    let mut words = Vec::with_capacity(word_count);
    let mut line = String::new();
    for line_number in 1..=word_count {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            invalid_data!(
                "expected {} lines, found only {}",
                word_count,
                line_number - 1
            );
        }
        match decode_word(&line) {
            Some(word) => words.push(word),
            None => invalid_data!(
                "line {} is not a 64-bit number: {:?}",
                line_number,
                line.trim_end()
            ),
        }
    }
    Ok(words)
}

//===========================================================================//


//===========================================================================//
