//! Header parameter values and their RFC 2047 / RFC 2231 encodings.
//!
//! A [`Parameter`] is one `name=value` pair from a structured header such
//! as Content-Type or Content-Disposition. Values that fit the header-safe
//! token set are emitted as-is; anything else is quoted, and values that
//! carry non-ASCII text are rendered either as RFC 2047 encoded-words
//! inside a quoted string or as RFC 2231 extended parameters with
//! percent-encoded octets and numbered continuation segments.

use std::fmt;

use ::base64::engine::general_purpose::STANDARD;
use ::base64::Engine;

use crate::codec::NewLineFormat;
use crate::error::{Error, Result};
use crate::grammar::{is_attr_char, is_token};

const UPPER_HEX: &[u8; 16] = b"0123456789ABCDEF";

/// How a parameter value should be encoded when plain text will not do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterEncodingMethod {
    /// No preference; the effective method comes from [`FormatOptions`].
    #[default]
    None,
    /// RFC 2047 encoded-words inside a quoted string.
    Rfc2047,
    /// RFC 2231 extended parameters (`name*=charset''pct-encoded`).
    Rfc2231,
}

/// Formatting configuration for header serialization.
///
/// Immutable per encode call; clone and mutate to customize.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Maximum header line length, counting any folding whitespace.
    pub max_line_length: usize,
    /// Newline sequence used when folding.
    pub newline: NewLineFormat,
    /// Quote parameter values even when they are valid bare tokens.
    pub always_quote_parameter_values: bool,
    /// Method used for values that need encoding and carry no per-parameter
    /// preference.
    pub parameter_encoding_method: ParameterEncodingMethod,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            max_line_length: 78,
            newline: NewLineFormat::default(),
            always_quote_parameter_values: false,
            parameter_encoding_method: ParameterEncodingMethod::Rfc2231,
        }
    }
}

/// A validated header parameter.
#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    value: String,
    charset: String,
    encoding_method: ParameterEncodingMethod,
    always_quote: bool,
}

/// The rendering actually chosen for one encode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EncodeMethod {
    Plain,
    Quoted,
    Rfc2047,
    Rfc2231,
}

impl Parameter {
    /// Creates a parameter, validating the name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the name is empty or contains
    /// characters outside the RFC 2045 token set (spaces, control
    /// characters, tspecials, non-ASCII).
    pub fn new(name: &str, value: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::InvalidParameter("empty parameter name".to_string()));
        }

        if !is_token(name) {
            return Err(Error::InvalidParameter(format!(
                "parameter name contains illegal characters: {name:?}"
            )));
        }

        Ok(Self {
            name: name.to_string(),
            value: value.to_string(),
            charset: "utf-8".to_string(),
            encoding_method: ParameterEncodingMethod::None,
            always_quote: false,
        })
    }

    /// The parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parameter value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Sets the charset tag written into RFC 2047/2231 encoded forms. The
    /// value text itself is always UTF-8; this changes only the label.
    pub fn with_charset(mut self, charset: &str) -> Result<Self> {
        if charset.is_empty() || !charset.is_ascii() {
            return Err(Error::InvalidParameter(format!(
                "invalid charset tag: {charset:?}"
            )));
        }
        self.charset = charset.to_ascii_lowercase();
        Ok(self)
    }

    /// Forces a specific encoding method for this parameter, overriding the
    /// [`FormatOptions`] preference.
    pub fn with_encoding_method(mut self, method: ParameterEncodingMethod) -> Self {
        self.encoding_method = method;
        self
    }

    /// Quotes the value even when it is a valid bare token.
    pub fn with_always_quote(mut self, always_quote: bool) -> Self {
        self.always_quote = always_quote;
        self
    }

    fn select_method(&self, options: &FormatOptions) -> EncodeMethod {
        let needs_encoding = self
            .value
            .chars()
            .any(|c| !c.is_ascii() || (c.is_ascii_control() && c != '\t'));
        let too_long = self.name.len() + 1 + self.value.len() >= options.max_line_length;

        // An explicit per-parameter method forces an encoded rendering;
        // the options-level method only says which to use when one is
        // needed anyway.
        if needs_encoding || too_long || self.encoding_method != ParameterEncodingMethod::None {
            let method = match self.encoding_method {
                ParameterEncodingMethod::None => options.parameter_encoding_method,
                forced => forced,
            };
            return match method {
                ParameterEncodingMethod::Rfc2047 => EncodeMethod::Rfc2047,
                _ => EncodeMethod::Rfc2231,
            };
        }

        if self.always_quote || options.always_quote_parameter_values || !is_token(&self.value) {
            EncodeMethod::Quoted
        } else {
            EncodeMethod::Plain
        }
    }

    /// Appends this parameter to a header being serialized.
    ///
    /// The caller is expected to have just written the `;` separating it
    /// from the preceding token; `line_length` is the current column and is
    /// updated as text and folds are appended. Folding always happens at a
    /// parameter or continuation boundary, never inside an escape.
    pub fn encode_into(
        &self,
        options: &FormatOptions,
        out: &mut String,
        line_length: &mut usize,
    ) {
        match self.select_method(options) {
            EncodeMethod::Plain => self.append_simple(options, &self.value, out, line_length),
            EncodeMethod::Quoted => {
                let quoted = quote(&self.value);
                self.append_simple(options, &quoted, out, line_length);
            }
            EncodeMethod::Rfc2047 => self.append_rfc2047(options, out, line_length),
            EncodeMethod::Rfc2231 => self.append_rfc2231(options, out, line_length),
        }
    }

    /// Renders this parameter on its own, without a preceding `;`.
    pub fn encoded(&self, options: &FormatOptions) -> String {
        let mut out = String::new();
        let mut line_length = 0;
        self.encode_into(options, &mut out, &mut line_length);

        // A standalone rendering starts at the text itself, not at the
        // space or fold a list context would lead with.
        if let Some(stripped) = out.strip_prefix(' ') {
            return stripped.to_string();
        }
        let fold = format!("{}\t", options.newline.as_str());
        match out.strip_prefix(fold.as_str()) {
            Some(stripped) => stripped.to_string(),
            None => out,
        }
    }

    /// Writes a space or a fold, then `name=value`.
    fn append_simple(
        &self,
        options: &FormatOptions,
        value_text: &str,
        out: &mut String,
        line_length: &mut usize,
    ) {
        let width = self.name.len() + 1 + value_text.len();
        fold_or_space(options, width, out, line_length);

        out.push_str(&self.name);
        out.push('=');
        out.push_str(value_text);
        *line_length += width;
    }

    fn append_rfc2231(&self, options: &FormatOptions, out: &mut String, line_length: &mut usize) {
        let encoded = percent_encode(self.value.as_bytes());
        let single_width = self.name.len() + 2 + self.charset.len() + 2 + encoded.len();

        // The whole value on one (possibly folded) line.
        if 1 + single_width < options.max_line_length {
            fold_or_space(options, single_width, out, line_length);
            out.push_str(&self.name);
            out.push_str("*=");
            out.push_str(&self.charset);
            out.push_str("''");
            out.push_str(&encoded);
            *line_length += single_width;
            return;
        }

        // Continuation series: name*0*=charset''seg; name*1*=seg; ...
        // Each segment goes on its own folded line, split so that a %XX
        // triplet is never divided.
        let bytes = encoded.as_bytes();
        let mut pos = 0;
        let mut index = 0;
        while pos < encoded.len() {
            let prefix = if index == 0 {
                format!("{}*0*={}''", self.name, self.charset)
            } else {
                format!("{}*{}*=", self.name, index)
            };

            // Room on a tab-indented line, keeping one column for the ';'
            // that a following segment appends.
            let budget = options
                .max_line_length
                .saturating_sub(1 + prefix.len() + 1)
                .max(3);

            let mut take = 0;
            while pos + take < bytes.len() {
                let unit = if bytes[pos + take] == b'%' { 3 } else { 1 };
                if take + unit > budget && take > 0 {
                    break;
                }
                take += unit;
            }

            out.push_str(options.newline.as_str());
            out.push('\t');
            out.push_str(&prefix);
            out.push_str(&encoded[pos..pos + take]);
            *line_length = 1 + prefix.len() + take;

            pos += take;
            index += 1;

            if pos < encoded.len() {
                out.push(';');
                *line_length += 1;
            }
        }
    }

    fn append_rfc2047(&self, options: &FormatOptions, out: &mut String, line_length: &mut usize) {
        let head_width = self.name.len() + 2;
        fold_or_space(options, head_width, out, line_length);
        out.push_str(&self.name);
        out.push_str("=\"");
        *line_length += head_width;

        // "=?" charset "?" b-or-q "?" payload "?="
        let overhead = self.charset.len() + 7;
        let mut rest = self.value.as_str();

        while !rest.is_empty() {
            let non_ascii = rest.bytes().filter(|b| !b.is_ascii()).count();
            let use_base64 = non_ascii * 2 > rest.len();

            let budget = options
                .max_line_length
                .saturating_sub(*line_length)
                .saturating_sub(overhead);

            let mut chunk_len = max_word_chunk(rest, use_base64, budget);
            if chunk_len == 0 {
                if *line_length > 1 {
                    // Nothing fits here; retry from a fresh folded line.
                    out.push_str(options.newline.as_str());
                    out.push('\t');
                    *line_length = 1;
                    continue;
                }
                // A single character exceeds even an empty line's budget;
                // emit it anyway rather than stall.
                chunk_len = rest.chars().next().map_or(0, char::len_utf8);
            }

            let (chunk, tail) = rest.split_at(chunk_len);
            let payload = if use_base64 {
                STANDARD.encode(chunk.as_bytes())
            } else {
                q_encode(chunk.as_bytes())
            };

            let word = format!(
                "=?{}?{}?{}?=",
                self.charset,
                if use_base64 { 'b' } else { 'q' },
                payload
            );
            *line_length += word.len();
            out.push_str(&word);

            rest = tail;
            if !rest.is_empty() {
                out.push_str(options.newline.as_str());
                out.push('\t');
                *line_length = 1;
            }
        }

        out.push('"');
        *line_length += 1;
    }
}

impl fmt::Display for Parameter {
    /// Formats as `name="value"`, always quoted, with no folding. For
    /// header-grade output use [`Parameter::encode_into`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, quote(&self.value))
    }
}

/// Folds (newline + tab) or writes a single space, whichever keeps `width`
/// more characters within the line budget.
fn fold_or_space(
    options: &FormatOptions,
    width: usize,
    out: &mut String,
    line_length: &mut usize,
) {
    if *line_length + 2 + width >= options.max_line_length {
        out.push_str(options.newline.as_str());
        out.push('\t');
        *line_length = 1;
    } else {
        out.push(' ');
        *line_length += 1;
    }
}

/// Quotes a value, backslash-escaping quotes and backslashes.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Percent-encodes every byte outside the RFC 2231 attribute-char set.
fn percent_encode(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len());
    for &b in bytes {
        if is_attr_char(b) {
            encoded.push(b as char);
        } else {
            encoded.push('%');
            encoded.push(UPPER_HEX[(b >> 4) as usize] as char);
            encoded.push(UPPER_HEX[(b & 0x0F) as usize] as char);
        }
    }
    encoded
}

/// Q-encodes bytes for use inside an encoded-word (RFC 2047 section 4.2).
fn q_encode(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b' ' => encoded.push('_'),
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'!' | b'*' | b'+' | b'-' | b'/' => {
                encoded.push(b as char);
            }
            _ => {
                encoded.push('=');
                encoded.push(UPPER_HEX[(b >> 4) as usize] as char);
                encoded.push(UPPER_HEX[(b & 0x0F) as usize] as char);
            }
        }
    }
    encoded
}

/// Longest prefix of `text`, on a char boundary, whose encoded-word payload
/// fits in `budget` characters.
fn max_word_chunk(text: &str, use_base64: bool, budget: usize) -> usize {
    let mut best = 0;
    let mut q_len = 0;

    for (pos, c) in text.char_indices() {
        let end = pos + c.len_utf8();
        let encoded_len = if use_base64 {
            (end + 2) / 3 * 4
        } else {
            let mut utf8 = [0u8; 4];
            q_len += c
                .encode_utf8(&mut utf8)
                .bytes()
                .map(|b| match b {
                    b' ' => 1,
                    b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'!' | b'*' | b'+' | b'-' | b'/' => 1,
                    _ => 3,
                })
                .sum::<usize>();
            q_len
        };

        if encoded_len <= budget {
            best = end;
        } else {
            break;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dos_options() -> FormatOptions {
        FormatOptions {
            newline: NewLineFormat::CrLf,
            ..FormatOptions::default()
        }
    }

    /// Encodes the way a header serializer does: the parameter follows
    /// "Content-Disposition: attachment;".
    fn encode_after_disposition(param: &Parameter, options: &FormatOptions) -> String {
        let mut out = String::from("Content-Disposition: attachment;");
        let mut line_length = out.len();
        param.encode_into(options, &mut out, &mut line_length);
        out
    }

    #[test]
    fn test_invalid_names() {
        assert!(Parameter::new("", "value").is_err());
        assert!(Parameter::new("x-invalid\x01", "value").is_err());
        assert!(Parameter::new("has space", "value").is_err());
        assert!(Parameter::new("name", "value").is_ok());
    }

    #[test]
    fn test_display() {
        let param = Parameter::new("name", "value").unwrap();
        assert_eq!(param.to_string(), "name=\"value\"");
    }

    #[test]
    fn test_encode_plain_token() {
        let param = Parameter::new("filename", "tps-report.doc").unwrap();
        assert_eq!(
            encode_after_disposition(&param, &dos_options()),
            "Content-Disposition: attachment; filename=tps-report.doc"
        );
        assert_eq!(
            param.encoded(&FormatOptions::default()),
            "filename=tps-report.doc"
        );
    }

    #[test]
    fn test_encode_always_quote() {
        let param = Parameter::new("filename", "tps-report.doc")
            .unwrap()
            .with_always_quote(true);
        assert_eq!(
            encode_after_disposition(&param, &dos_options()),
            "Content-Disposition: attachment; filename=\"tps-report.doc\""
        );
        assert_eq!(
            param.encoded(&FormatOptions::default()),
            "filename=\"tps-report.doc\""
        );
    }

    #[test]
    fn test_encode_format_options_always_quote() {
        let param = Parameter::new("filename", "tps-report.doc").unwrap();
        let options = FormatOptions {
            always_quote_parameter_values: true,
            ..dos_options()
        };
        assert_eq!(
            encode_after_disposition(&param, &options),
            "Content-Disposition: attachment; filename=\"tps-report.doc\""
        );
    }

    #[test]
    fn test_encode_non_token_is_quoted() {
        let param = Parameter::new("name", "hello world").unwrap();
        assert_eq!(
            param.encoded(&FormatOptions::default()),
            "name=\"hello world\""
        );

        let param = Parameter::new("name", "say \"hi\"").unwrap();
        assert_eq!(
            param.encoded(&FormatOptions::default()),
            "name=\"say \\\"hi\\\"\""
        );
    }

    #[test]
    fn test_encode_rfc2047() {
        let param = Parameter::new("filename", "测试文本.doc")
            .unwrap()
            .with_encoding_method(ParameterEncodingMethod::Rfc2047);
        assert_eq!(
            encode_after_disposition(&param, &dos_options()),
            "Content-Disposition: attachment; filename=\"=?utf-8?b?5rWL6K+V5paH5pysLmRv?=\r\n\t=?utf-8?q?c?=\""
        );
    }

    #[test]
    fn test_encode_format_options_rfc2047() {
        let param = Parameter::new("filename", "测试文本.doc").unwrap();
        let options = FormatOptions {
            parameter_encoding_method: ParameterEncodingMethod::Rfc2047,
            ..dos_options()
        };
        assert_eq!(
            encode_after_disposition(&param, &options),
            "Content-Disposition: attachment; filename=\"=?utf-8?b?5rWL6K+V5paH5pysLmRv?=\r\n\t=?utf-8?q?c?=\""
        );
    }

    #[test]
    fn test_encode_rfc2231() {
        let param = Parameter::new("filename", "测试文本.doc")
            .unwrap()
            .with_encoding_method(ParameterEncodingMethod::Rfc2231);
        assert_eq!(
            encode_after_disposition(&param, &dos_options()),
            "Content-Disposition: attachment;\r\n\tfilename*=utf-8''%E6%B5%8B%E8%AF%95%E6%96%87%E6%9C%AC.doc"
        );
    }

    #[test]
    fn test_encode_format_options_rfc2231() {
        let param = Parameter::new("filename", "测试文本.doc").unwrap();
        assert_eq!(
            encode_after_disposition(&param, &dos_options()),
            "Content-Disposition: attachment;\r\n\tfilename*=utf-8''%E6%B5%8B%E8%AF%95%E6%96%87%E6%9C%AC.doc"
        );
    }

    #[test]
    fn test_encode_rfc2231_bare() {
        let param = Parameter::new("filename", "测试文本.doc").unwrap();
        assert_eq!(
            param.encoded(&FormatOptions::default()),
            "filename*=utf-8''%E6%B5%8B%E8%AF%95%E6%96%87%E6%9C%AC.doc"
        );
    }

    #[test]
    fn test_rfc2231_continuations() {
        let value = "很长的文件名".repeat(4) + ".doc";
        let param = Parameter::new("filename", &value).unwrap();
        let options = dos_options();
        let encoded = encode_after_disposition(&param, &options);

        assert!(encoded.contains("filename*0*=utf-8''"));
        assert!(encoded.contains("filename*1*="));

        for line in encoded.split("\r\n") {
            assert!(
                line.len() <= options.max_line_length,
                "line too long: {} ({line:?})",
                line.len()
            );
            // A %XX triplet is never split: '%' cannot be one of the last
            // two characters of a continued segment.
            let line = line.strip_suffix(';').unwrap_or(line);
            if line.len() >= 2 {
                assert_ne!(&line[line.len() - 1..], "%");
                assert_ne!(&line[line.len() - 2..line.len() - 1], "%");
            }
        }
    }

    #[test]
    fn test_rfc2231_continuations_bare() {
        // A value long enough to force continuations still renders
        // standalone without a leading fold.
        let value = "很长的文件名".repeat(4) + ".doc";
        let param = Parameter::new("filename", &value).unwrap();
        let encoded = param.encoded(&FormatOptions::default());

        assert!(
            encoded.starts_with("filename*0*=utf-8''"),
            "unexpected prefix: {encoded:?}"
        );
    }

    #[test]
    fn test_charset_tag() {
        let param = Parameter::new("filename", "naïve.txt")
            .unwrap()
            .with_charset("UTF-8")
            .unwrap();
        // Tag is normalized to lowercase.
        assert!(param
            .encoded(&FormatOptions::default())
            .starts_with("filename*=utf-8''"));

        assert!(Parameter::new("a", "b").unwrap().with_charset("").is_err());
    }
}
