//! Formatter.

use crate::bose::{Array, Bose, BoseError, Object};
use crate::cursor::Cursor;
use crate::memo::MemoTable;
use crate::DataType;
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Write};

/// Possible errors that can arise during formatting.
#[derive(Debug)]
pub enum FormatError {
    FmtError(fmt::Error),
    ValueError(BoseError),
}

impl Display for FormatError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::FmtError(e) => write!(f, "{}", e),
            FormatError::ValueError(e) => write!(f, "{}", e),
        }
    }
}

impl Error for FormatError {}

impl From<fmt::Error> for FormatError {
    #[inline]
    fn from(e: fmt::Error) -> Self {
        FormatError::FmtError(e)
    }
}

impl From<BoseError> for FormatError {
    #[inline]
    fn from(e: BoseError) -> Self {
        FormatError::ValueError(e)
    }
}

pub type FormatResult<T> = std::result::Result<T, FormatError>;

/// Renders an encoded value as JSON text on demand.
pub(crate) struct LazyFormat<'a> {
    bose: &'a Bose,
    pretty: bool,
}

impl<'a> LazyFormat<'a> {
    #[inline]
    pub(crate) fn new(bose: &'a Bose, pretty: bool) -> Self {
        LazyFormat { bose, pretty }
    }
}

impl<'a> Display for LazyFormat<'a> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = Printer {
            out: f,
            pretty: self.pretty,
            depth: 0,
        };
        printer.write_value(self.bose).map_err(|_| fmt::Error)
    }
}

impl Display for Bose {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        LazyFormat::new(self, false).fmt(f)
    }
}

impl Bose {
    /// Formats the value as JSON text into `out`.
    #[inline]
    pub fn format_to(&self, pretty: bool, out: &mut String) -> FormatResult<()> {
        let mut printer = Printer {
            out,
            pretty,
            depth: 0,
        };
        printer.write_value(self)
    }
}

struct Printer<'f, W: Write> {
    out: &'f mut W,
    pretty: bool,
    depth: usize,
}

impl<'f, W: Write> Printer<'f, W> {
    fn write_value(&mut self, bose: &Bose) -> FormatResult<()> {
        match bose.data_type()? {
            DataType::Null => self.out.write_str("null")?,
            DataType::Boolean => {
                self.out.write_str(if bose.boolean()? { "true" } else { "false" })?
            }
            DataType::Number => {
                let mut memo = MemoTable::new();
                let mut cursor = Cursor::new(bose.as_bytes());
                cursor.parse_integer(&mut memo)?;
                if cursor.info.is_negative() {
                    write!(self.out, "{}", cursor.value as i64)?;
                } else {
                    write!(self.out, "{}", cursor.value)?;
                }
            }
            DataType::String => self.write_string(&bose.string()?)?,
            DataType::Array => self.write_array(bose.array()?)?,
            DataType::Object => self.write_object(bose.object()?)?,
        }
        Ok(())
    }

    fn write_array(&mut self, array: Array) -> FormatResult<()> {
        self.out.write_char('[')?;
        self.depth += 1;
        let mut first = true;
        for item in array.iter()? {
            if !first {
                self.out.write_char(',')?;
            }
            self.break_line()?;
            self.write_value(item?)?;
            first = false;
        }
        self.depth -= 1;
        if !first {
            self.break_line()?;
        }
        self.out.write_char(']')?;
        Ok(())
    }

    fn write_object(&mut self, object: Object) -> FormatResult<()> {
        self.out.write_char('{')?;
        self.depth += 1;
        let mut first = true;
        for entry in object.iter()? {
            let (key, value) = entry?;
            if !first {
                self.out.write_char(',')?;
            }
            self.break_line()?;
            self.write_string(&key)?;
            self.out.write_char(':')?;
            if self.pretty {
                self.out.write_char(' ')?;
            }
            self.write_value(value)?;
            first = false;
        }
        self.depth -= 1;
        if !first {
            self.break_line()?;
        }
        self.out.write_char('}')?;
        Ok(())
    }

    fn write_string(&mut self, s: &str) -> FormatResult<()> {
        self.out.write_char('"')?;
        for ch in s.chars() {
            match ch {
                '"' => self.out.write_str("\\\"")?,
                '\\' => self.out.write_str("\\\\")?,
                '\n' => self.out.write_str("\\n")?,
                '\r' => self.out.write_str("\\r")?,
                '\t' => self.out.write_str("\\t")?,
                '\u{8}' => self.out.write_str("\\b")?,
                '\u{c}' => self.out.write_str("\\f")?,
                c if (c as u32) < 0x20 => write!(self.out, "\\u{:04x}", c as u32)?,
                c => self.out.write_char(c)?,
            }
        }
        self.out.write_char('"')?;
        Ok(())
    }

    fn break_line(&mut self) -> fmt::Result {
        if self.pretty {
            self.out.write_char('\n')?;
            for _ in 0..self.depth {
                self.out.write_str("  ")?;
            }
        }
        Ok(())
    }
}
