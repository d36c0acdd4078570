//! Plain text to format=flowed conversion (RFC 3676).
//!
//! Rewraps fixed plain text so that a receiving client can reflow it:
//! lines are wrapped to 78 characters with a trailing space marking each
//! soft break, quote prefixes are normalized to bare `>` runs, and lines
//! that would be misread as quotes, flowed continuations, or mbox `From `
//! separators are space-stuffed. The soft-break space is always an added
//! character, so serve the result as
//! `text/plain; format=flowed; delsp=yes`.

use std::io::{self, BufRead, Write};

use crate::codec::NewLineFormat;

/// Flowed and fixed lines alike stay within this width, counting quote
/// marks, stuffing, and the soft-break space but not the line terminator.
const MAX_LINE_LENGTH: usize = 78;

/// A plain text to format=flowed converter.
#[derive(Debug, Clone, Default)]
pub struct TextToFlowed {
    header: Option<String>,
    footer: Option<String>,
    newline: NewLineFormat,
}

impl TextToFlowed {
    /// Creates a new converter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Text written before the converted body, verbatim.
    pub fn with_header(mut self, header: &str) -> Self {
        self.header = Some(header.to_string());
        self
    }

    /// Text written after the converted body, verbatim.
    pub fn with_footer(mut self, footer: &str) -> Self {
        self.footer = Some(footer.to_string());
        self
    }

    /// Sets the newline sequence used between output lines.
    pub fn with_newline(mut self, newline: NewLineFormat) -> Self {
        self.newline = newline;
        self
    }

    /// Converts everything `reader` yields and writes the flowed text to
    /// `writer`.
    pub fn convert<R: BufRead, W: Write>(&self, reader: R, writer: &mut W) -> io::Result<()> {
        if let Some(header) = &self.header {
            writer.write_all(header.as_bytes())?;
        }

        let mut flowed = String::with_capacity(MAX_LINE_LENGTH + 2);
        for line in reader.lines() {
            flowed.clear();
            self.convert_line(&line?, &mut flowed);
            writer.write_all(flowed.as_bytes())?;
        }

        if let Some(footer) = &self.footer {
            writer.write_all(footer.as_bytes())?;
        }

        Ok(())
    }

    /// Converts an in-memory string.
    pub fn convert_string(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + text.len() / 8);

        if let Some(header) = &self.header {
            out.push_str(header);
        }

        for line in text.lines() {
            self.convert_line(line, &mut out);
        }

        if let Some(footer) = &self.footer {
            out.push_str(footer);
        }

        out
    }

    fn convert_line(&self, line: &str, out: &mut String) {
        // Trim spaces before user-inserted hard line breaks, else they
        // would read back as soft breaks.
        let chars: Vec<char> = line.trim_end_matches(' ').chars().collect();
        let (quote_depth, unquoted) = unquote(&chars);

        let mut index = 0;
        loop {
            flowed_line(unquoted, &mut index, quote_depth, out);
            out.push_str(self.newline.as_str());

            if index >= unquoted.len() {
                break;
            }
        }
    }
}

/// Strips the quote prefix, counting each `>` optionally followed by one
/// space as one quote level.
fn unquote(line: &[char]) -> (usize, &[char]) {
    if line.first() != Some(&'>') {
        return (0, line);
    }

    let mut depth = 0;
    let mut index = 0;

    loop {
        depth += 1;
        index += 1;

        if line.get(index) == Some(&' ') {
            index += 1;
        }

        if line.get(index) != Some(&'>') {
            break;
        }
    }

    (depth, &line[index..])
}

/// Emits the next output line for `line[index..]`, advancing `index` past
/// the consumed text. A soft break leaves a trailing space on the emitted
/// line.
fn flowed_line(line: &[char], index: &mut usize, quote_depth: usize, out: &mut String) {
    let start = out.len();

    for _ in 0..quote_depth {
        out.push('>');
    }

    // Space-stuff quoted lines and lines starting with a space or "From ".
    if quote_depth > 0
        || line.get(*index) == Some(&' ')
        || line[*index..].starts_with(&['F', 'r', 'o', 'm', ' '])
    {
        out.push(' ');
    }

    // The prefix is pure ASCII; past it, count chars rather than bytes.
    let mut width = out.len() - start;

    if width + (line.len() - *index) <= MAX_LINE_LENGTH {
        out.extend(line[*index..].iter());
        *index = line.len();
        return;
    }

    let prefix_width = width;

    loop {
        let next_space = line[*index..].iter().position(|&c| c == ' ');
        let word_end = match next_space {
            Some(offset) => *index + offset,
            None => line.len(),
        };
        let word_length = word_end - *index;
        // Leave room for the soft-break space, and for the word's own
        // trailing space unless it opens the line.
        let reserve = match next_space {
            Some(_) if width > prefix_width => 2,
            Some(_) => 1,
            None => 0,
        };

        if width + word_length + reserve <= MAX_LINE_LENGTH {
            out.extend(line[*index..word_end].iter());
            width += word_length;
            *index = word_end;
        } else if width == prefix_width {
            // Too wide even opening a fresh line; split it.
            let take = MAX_LINE_LENGTH.saturating_sub(width + 1).max(1);
            out.extend(line[*index..*index + take].iter());
            *index += take;
            break;
        } else {
            // The word moves to the next output line; soft-break here.
            break;
        }

        while width + 1 < MAX_LINE_LENGTH && line.get(*index) == Some(&' ') {
            out.push(' ');
            width += 1;
            *index += 1;
        }

        if *index >= line.len() || width + 1 >= MAX_LINE_LENGTH {
            break;
        }
    }

    if *index < line.len() {
        out.push(' ');
    }
}
