//! Plan output encodings.
//!
//! Two encodings are supported:
//! - shell: one `Command::shell()` rendering per line
//! - json: a two-space-indented array of `{Program, Args, Description}`
//!
//! The JSON encoder escapes `<`, `>`, `&`, U+2028 and U+2029 as `\uXXXX`
//! sequences, and backspace/form-feed as `\u0008`/`\u000c`, which keeps the
//! output byte-identical to what existing plan consumers already parse.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::ser::{CharEscape, Formatter, PrettyFormatter};

use crate::command::Command;

/// Render a plan as shell text, one command per line.
pub fn to_shell(plan: &[Command]) -> String {
    let mut out = String::new();
    for cmd in plan {
        out.push_str(&cmd.shell());
        out.push('\n');
    }
    out
}

/// Write a plan as indented JSON followed by a newline.
pub fn write_json<W: Write>(plan: &[Command], mut writer: W) -> io::Result<()> {
    let mut ser = serde_json::Serializer::with_formatter(&mut writer, HtmlSafeFormatter::new());
    plan.serialize(&mut ser)?;
    writer.write_all(b"\n")
}

/// Render a plan as indented JSON followed by a newline.
pub fn to_json(plan: &[Command]) -> io::Result<String> {
    let mut buf = Vec::new();
    write_json(plan, &mut buf)?;
    // The serializer only ever emits UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Pretty formatter that also escapes HTML-significant characters.
struct HtmlSafeFormatter<'a> {
    inner: PrettyFormatter<'a>,
}

impl HtmlSafeFormatter<'_> {
    fn new() -> Self {
        Self {
            inner: PrettyFormatter::with_indent(b"  "),
        }
    }
}

impl Formatter for HtmlSafeFormatter<'_> {
    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            let escaped = match ch {
                '<' => "\\u003c",
                '>' => "\\u003e",
                '&' => "\\u0026",
                '\u{2028}' => "\\u2028",
                '\u{2029}' => "\\u2029",
                _ => continue,
            };
            writer.write_all(&fragment.as_bytes()[start..i])?;
            writer.write_all(escaped.as_bytes())?;
            start = i + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }

    fn write_char_escape<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        char_escape: CharEscape,
    ) -> io::Result<()> {
        match char_escape {
            CharEscape::Backspace => writer.write_all(b"\\u0008"),
            CharEscape::FormFeed => writer.write_all(b"\\u000c"),
            other => self.inner.write_char_escape(writer, other),
        }
    }
}
