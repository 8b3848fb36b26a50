//! Column tables and the primitive field readers/writers shared by all
//! fixed-column records.

use super::hybrid36;
use super::records::{RecordError, RecordKind};
use std::borrow::Cow;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    /// Fixed decimal real with the given number of decimal places.
    Real(usize),
    /// Hybrid-36 counter spanning the whole column range.
    Hybrid36,
}

/// One field of a record layout. `start` and `end` are 1-based, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub start: usize,
    pub end: usize,
    pub field_type: FieldType,
    pub justify: Justify,
}

impl ColumnSpec {
    pub const fn new(
        name: &'static str,
        start: usize,
        end: usize,
        field_type: FieldType,
        justify: Justify,
    ) -> Self {
        Self {
            name,
            start,
            end,
            field_type,
            justify,
        }
    }

    pub const fn width(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn span(&self) -> ColumnSpan {
        ColumnSpan {
            start: self.start,
            end: self.end,
        }
    }
}

/// An inclusive, 1-based column range used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpan {
    pub start: usize,
    pub end: usize,
}

impl fmt::Display for ColumnSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Returns the raw text under `spec`, blank-padded to the full width when the
/// line is short.
pub fn raw_field<'a>(line: &'a str, spec: &ColumnSpec) -> Cow<'a, str> {
    let width = spec.width();
    let begin = spec.start - 1;
    if line.is_ascii() {
        let end = spec.end.min(line.len());
        let text = line.get(begin..end).unwrap_or("");
        if text.len() == width {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(format!("{text:<width$}"))
        }
    } else {
        let text: String = line.chars().skip(begin).take(width).collect();
        Cow::Owned(format!("{text:<width$}"))
    }
}

fn format_error(kind: RecordKind, spec: &ColumnSpec, raw: &str) -> RecordError {
    RecordError::FieldFormat {
        record: kind,
        field: spec.name,
        columns: spec.span(),
        raw: raw.to_string(),
    }
}

pub fn read_text(line: &str, spec: &ColumnSpec) -> String {
    raw_field(line, spec).trim().to_string()
}

pub fn read_char(line: &str, spec: &ColumnSpec) -> char {
    raw_field(line, spec).chars().next().unwrap_or(' ')
}

pub fn read_real(line: &str, spec: &ColumnSpec, kind: RecordKind) -> Result<f64, RecordError> {
    let raw = raw_field(line, spec);
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format_error(kind, spec, &raw))
}

pub fn read_optional_int(
    line: &str,
    spec: &ColumnSpec,
    kind: RecordKind,
) -> Result<Option<i64>, RecordError> {
    let raw = raw_field(line, spec);
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| format_error(kind, spec, &raw))
}

pub fn read_int(line: &str, spec: &ColumnSpec, kind: RecordKind) -> Result<i64, RecordError> {
    Ok(read_optional_int(line, spec, kind)?.unwrap_or(0))
}

pub fn read_hybrid36(
    line: &str,
    spec: &ColumnSpec,
    kind: RecordKind,
) -> Result<i64, RecordError> {
    let raw = raw_field(line, spec);
    hybrid36::decode(spec.width(), &raw).map_err(|_| format_error(kind, spec, &raw))
}

/// A fixed-width output line assembled field by field.
///
/// Columns not covered by any field remain blank; trailing blanks are
/// removed by [`LineWriter::finish`].
pub struct LineWriter {
    kind: RecordKind,
    buf: Vec<char>,
}

impl LineWriter {
    pub fn new(kind: RecordKind, keyword: &str) -> Self {
        let mut writer = Self {
            kind,
            buf: Vec::with_capacity(80),
        };
        writer.put_raw(1, keyword);
        writer
    }

    fn put_raw(&mut self, start: usize, text: &str) {
        let begin = start - 1;
        for (offset, c) in text.chars().enumerate() {
            let idx = begin + offset;
            if idx >= self.buf.len() {
                self.buf.resize(idx + 1, ' ');
            }
            self.buf[idx] = c;
        }
    }

    /// Writes `text`, truncated to the field width and justified per `spec`.
    pub fn text(&mut self, spec: &ColumnSpec, text: &str) -> &mut Self {
        let width = spec.width();
        let truncated: String = text.chars().take(width).collect();
        let padded = match spec.justify {
            Justify::Left => format!("{truncated:<width$}"),
            Justify::Right => format!("{truncated:>width$}"),
        };
        self.put_raw(spec.start, &padded);
        self
    }

    pub fn char(&mut self, spec: &ColumnSpec, c: char) -> &mut Self {
        let mut tmp = [0u8; 4];
        self.text(spec, c.encode_utf8(&mut tmp))
    }

    pub fn real(&mut self, spec: &ColumnSpec, value: f64) -> Result<&mut Self, RecordError> {
        let width = spec.width();
        let decimals = match spec.field_type {
            FieldType::Real(d) => d,
            _ => 0,
        };
        let text = format!("{value:>width$.decimals$}");
        self.checked_put(spec, text)
    }

    pub fn int(&mut self, spec: &ColumnSpec, value: i64) -> Result<&mut Self, RecordError> {
        let width = spec.width();
        self.checked_put(spec, format!("{value:>width$}"))
    }

    pub fn hybrid36(&mut self, spec: &ColumnSpec, value: i64) -> Result<&mut Self, RecordError> {
        let text = hybrid36::encode(spec.width(), value)?;
        self.put_raw(spec.start, &text);
        Ok(self)
    }

    fn checked_put(&mut self, spec: &ColumnSpec, text: String) -> Result<&mut Self, RecordError> {
        if text.chars().count() > spec.width() {
            return Err(RecordError::FieldOverflow {
                record: self.kind,
                field: spec.name,
                columns: spec.span(),
                text,
            });
        }
        self.put_raw(spec.start, &text);
        Ok(self)
    }

    /// Places literal text at a 1-based column without a layout entry.
    pub fn literal(&mut self, start: usize, text: &str) -> &mut Self {
        self.put_raw(start, text);
        self
    }

    pub fn finish(self) -> String {
        let line: String = self.buf.into_iter().collect();
        line.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: ColumnSpec = ColumnSpec::new("name", 13, 16, FieldType::Text, Justify::Left);
    const X: ColumnSpec = ColumnSpec::new("x", 31, 38, FieldType::Real(3), Justify::Right);
    const Z: ColumnSpec = ColumnSpec::new("z", 67, 70, FieldType::Integer, Justify::Right);

    #[test]
    fn raw_field_pads_short_lines() {
        assert_eq!(raw_field("ATOM", &NAME), "    ");
        assert_eq!(raw_field("ATOM      1  CA", &NAME), " CA ");
    }

    #[test]
    fn blank_numeric_fields_default() {
        assert_eq!(read_real("ATOM", &X, RecordKind::Atom).unwrap(), 0.0);
        assert_eq!(read_optional_int("CRYST1", &Z, RecordKind::Cryst1).unwrap(), None);
        assert_eq!(read_int("CRYST1", &Z, RecordKind::Cryst1).unwrap(), 0);
    }

    #[test]
    fn malformed_real_reports_columns_and_raw_text() {
        let line = format!("{:30}{:>8}", "ATOM", "1.2.3");
        let err = read_real(&line, &X, RecordKind::Atom).unwrap_err();
        match err {
            RecordError::FieldFormat {
                record,
                columns,
                raw,
                ..
            } => {
                assert_eq!(record, RecordKind::Atom);
                assert_eq!(columns.to_string(), "31-38");
                assert_eq!(raw, "   1.2.3");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn writer_justifies_and_trims() {
        let mut w = LineWriter::new(RecordKind::Atom, "ATOM  ");
        w.text(&NAME, "CA");
        assert_eq!(w.finish(), "ATOM        CA");

        let mut w = LineWriter::new(RecordKind::Atom, "ATOM  ");
        w.real(&X, 1.5).unwrap();
        assert_eq!(w.finish(), format!("ATOM{:26}{:>8}", "", "1.500"));
    }

    #[test]
    fn writer_rejects_too_wide_reals() {
        let mut w = LineWriter::new(RecordKind::Atom, "ATOM  ");
        let err = w.real(&X, 123456789.0).err().unwrap();
        assert!(matches!(err, RecordError::FieldOverflow { .. }));
    }
}
