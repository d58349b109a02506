//! # Python-Compatible JSON Formatting
//!
//! A `serde_json::Formatter` that reproduces the byte output of Python's
//! `json` module with its default `ensure_ascii=True`:
//!
//! - Compact mode emits `", "` between items and `": "` after keys, the
//!   separators `json.dumps()` uses when no indent is requested.
//! - Indented mode (`indent=2`) emits `","` at line ends, two spaces per
//!   level, and prints empty containers as `{}` / `[]`.
//! - Every character outside printable ASCII is written as a `\uXXXX`
//!   escape with lowercase hex, using UTF-16 surrogate pairs above the BMP.
//!   DEL (`0x7f`) is escaped too.
//! - Floats are rendered with Python's `repr()`: the shortest digits that
//!   round-trip, in fixed notation when the decimal exponent lies in
//!   `[-4, 16)` and in `d.ddde±XX` notation otherwise. Integral floats keep
//!   a trailing `.0`.
//! - Integer literals carried by a `Value` are written verbatim, so values
//!   beyond the `u64`/`i64` range survive unchanged as they do in Python.
//!
//! Archives written by the legacy Python collectors are hashed and laid out with
//! these rules, so both the checksum path ([`crate::CanonicalBytes`]) and
//! the envelope writer go through this module.

use std::fmt::Write as _;
use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;

/// Formatter that writes JSON the way Python's `json` module does.
#[derive(Debug, Clone, Default)]
pub struct PythonFormatter {
    indent: Option<usize>,
    depth: usize,
    has_value: bool,
}

impl PythonFormatter {
    /// Single-line output with `", "` / `": "` separators.
    pub fn compact() -> Self {
        Self::default()
    }

    /// Multi-line output indented by `width` spaces per level.
    pub fn indented(width: usize) -> Self {
        Self {
            indent: Some(width),
            ..Self::default()
        }
    }

    fn newline<W: ?Sized + io::Write>(&self, writer: &mut W) -> io::Result<()> {
        if let Some(width) = self.indent {
            writer.write_all(b"\n")?;
            for _ in 0..width * self.depth {
                writer.write_all(b" ")?;
            }
        }
        Ok(())
    }

    fn begin_item<W: ?Sized + io::Write>(&self, writer: &mut W, first: bool) -> io::Result<()> {
        match self.indent {
            Some(_) => {
                if !first {
                    writer.write_all(b",")?;
                }
                self.newline(writer)
            }
            None if first => Ok(()),
            None => writer.write_all(b", "),
        }
    }

    fn open<W: ?Sized + io::Write>(&mut self, writer: &mut W, bracket: &[u8]) -> io::Result<()> {
        self.depth += 1;
        self.has_value = false;
        writer.write_all(bracket)
    }

    fn close<W: ?Sized + io::Write>(&mut self, writer: &mut W, bracket: &[u8]) -> io::Result<()> {
        self.depth -= 1;
        if self.has_value {
            self.newline(writer)?;
        }
        writer.write_all(bracket)
    }
}

impl Formatter for PythonFormatter {
    fn write_f32<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f32) -> io::Result<()> {
        self.write_f64(writer, f64::from(value))
    }

    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(python_float_repr(value).as_bytes())
    }

    fn write_number_str<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        value: &str,
    ) -> io::Result<()> {
        if !value.contains(['.', 'e', 'E']) {
            // Python parses `-0` as the int 0.
            if value.trim_start_matches('-').bytes().all(|b| b == b'0') {
                return writer.write_all(b"0");
            }
            return writer.write_all(value.as_bytes());
        }
        let parsed: f64 = value
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.write_f64(writer, parsed)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let bytes = fragment.as_bytes();
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if ch.is_ascii() && ch != '\x7f' {
                continue;
            }
            if start < i {
                writer.write_all(&bytes[start..i])?;
            }
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(&bytes[start..])
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.open(writer, b"[")
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.close(writer, b"]")
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.begin_item(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.open(writer, b"{")
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.close(writer, b"}")
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.begin_item(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }
}

/// Serialize `value` on one line with Python's default separators.
pub fn to_vec<T: ?Sized + Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    write_with(value, PythonFormatter::compact())
}

/// Serialize `value` with a two-space indent, as `json.dump(obj, f, indent=2)`.
///
/// No trailing newline is appended.
pub fn to_vec_pretty<T: ?Sized + Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    write_with(value, PythonFormatter::indented(2))
}

/// String form of [`to_vec_pretty`].
pub fn to_string_pretty<T: ?Sized + Serialize>(value: &T) -> serde_json::Result<String> {
    let bytes = to_vec_pretty(value)?;
    // The formatter escapes everything outside ASCII.
    String::from_utf8(bytes).map_err(<serde_json::Error as serde::ser::Error>::custom)
}

fn write_with<T: ?Sized + Serialize>(
    value: &T,
    formatter: PythonFormatter,
) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(128);
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    Ok(out)
}

/// Render a float exactly as Python's `repr(float)` does.
///
/// Non-finite values never reach this function through `serde_json`
/// (they serialize as `null`), but are rendered as Python would for
/// completeness.
pub fn python_float_repr(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    // `{:e}` yields the shortest round-trip digits, e.g. "-1.2345e-7".
    let sci = format!("{value:e}");
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let (negative, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let mut out = String::with_capacity(digits.len() + 8);
    if negative {
        out.push('-');
    }

    if (-4..16).contains(&exponent) {
        if exponent >= 0 {
            let int_len = exponent as usize + 1;
            if digits.len() <= int_len {
                out.push_str(&digits);
                out.extend(std::iter::repeat('0').take(int_len - digits.len()));
                out.push_str(".0");
            } else {
                out.push_str(&digits[..int_len]);
                out.push('.');
                out.push_str(&digits[int_len..]);
            }
        } else {
            out.push_str("0.");
            out.extend(std::iter::repeat('0').take((-exponent - 1) as usize));
            out.push_str(&digits);
        }
    } else {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        let sign = if exponent < 0 { '-' } else { '+' };
        let _ = write!(out, "e{sign}{:02}", exponent.abs());
    }
    out
}
