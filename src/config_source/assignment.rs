//! Legacy configuration files made of `NAME = <literal>` statements.
//!
//! This reads the shape of the historical `config.py` without executing it:
//!
//! ```text
//! # videos to convert
//! MOV_FILE_PATHS = [
//!     "/Users/me/Movies/clip.mov",
//!     r"C:\Videos\demo.mov",
//! ]
//! CONVERSION_OPTIONS = {"fps": 15, "optimize": True, "quality": 80}
//! ```
//!
//! Supported literals are strings (with the usual escapes and adjacent
//! literal concatenation), decimal/hex/octal/binary numbers,
//! `True`/`False`/`None`, lists, tuples and dicts with string keys, nested at
//! most [`MAX_DEPTH`] levels. Any other statement is rejected.

use super::{describe, load_error, ConfigSource, ConfigUnit};
use crate::error::ConfigError;
use serde_json::{Map, Number, Value};
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct AssignmentConfigSource;

impl ConfigSource for AssignmentConfigSource {
    fn name(&self) -> &'static str {
        "assignment"
    }

    fn load(&self, path: &Path) -> Result<ConfigUnit, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| load_error(path, e))?;
        let symbols = parse_assignments(&content).map_err(|e| load_error(path, e))?;
        Ok(ConfigUnit::new(symbols))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

/// Deepest accepted nesting of lists, tuples and dicts
pub const MAX_DEPTH: usize = 128;

/// Parse a whole file into its assigned symbols. Later assignments win.
pub fn parse_assignments(text: &str) -> Result<Map<String, Value>, ParseError> {
    Parser::new(text).module()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    depth: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            line: self.line,
            message: message.into(),
        }
    }

    /// Skip blanks and comments. Newlines are only skipped inside brackets
    /// or between statements.
    fn skip_trivia(&mut self, newlines: bool) {
        while let Some(c) = self.peek() {
            match c {
                '#' => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                '\\' if self.peek_at(1) == Some('\n') => {
                    self.bump();
                    self.bump();
                }
                '\n' if !newlines => break,
                c if c.is_whitespace() => {
                    self.bump();
                }
                _ => break,
            }
        }
    }

    fn module(mut self) -> Result<Map<String, Value>, ParseError> {
        let mut symbols = Map::new();

        loop {
            self.skip_trivia(true);
            let Some(c) = self.peek() else { break };

            if c == ';' {
                self.bump();
                continue;
            }

            // module docstring or other bare string
            if c == '"' || c == '\'' {
                self.string(false)?;
                self.end_of_statement("string")?;
                continue;
            }

            if !is_identifier_start(c) {
                return Err(self.error(format!("unexpected character '{}'", c)));
            }

            let name = self.identifier();
            self.skip_trivia(false);
            if self.peek() != Some('=') || self.peek_at(1) == Some('=') {
                return Err(self.error(format!("unsupported statement starting with '{}'", name)));
            }
            self.bump();
            self.skip_trivia(false);

            let value = self.value()?;
            self.end_of_statement(&name)?;
            symbols.insert(name, value);
        }

        Ok(symbols)
    }

    fn end_of_statement(&mut self, what: &str) -> Result<(), ParseError> {
        self.skip_trivia(false);
        match self.peek() {
            None | Some('\n') | Some(';') => Ok(()),
            Some(c) => Err(self.error(format!("unexpected '{}' after {}", c, what))),
        }
    }

    fn identifier(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek().filter(|c| c.is_alphanumeric() || *c == '_') {
            name.push(c);
            self.bump();
        }
        name
    }

    fn value(&mut self) -> Result<Value, ParseError> {
        match self.peek() {
            Some('[') => {
                self.bump();
                self.nested(|p| p.sequence(']'))
            }
            Some('(') => {
                self.bump();
                self.nested(|p| p.sequence(')'))
            }
            Some('{') => {
                self.bump();
                self.nested(Self::dict)
            }
            Some('"') | Some('\'') => {
                let first = self.string(false)?;
                self.concatenated(first).map(Value::String)
            }
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
            Some(c) if is_identifier_start(c) => {
                let word = self.identifier();
                match word.as_str() {
                    "True" => Ok(Value::Bool(true)),
                    "False" => Ok(Value::Bool(false)),
                    "None" => Ok(Value::Null),
                    "r" | "R" if matches!(self.peek(), Some('"') | Some('\'')) => {
                        let first = self.string(true)?;
                        self.concatenated(first).map(Value::String)
                    }
                    _ => Err(self.error(format!("unsupported expression '{}'", word))),
                }
            }
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
            None => Err(self.error("unexpected end of file")),
        }
    }

    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(format!("nesting too deep (limit {})", MAX_DEPTH)));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Join adjacent string literals (`"a" "b"`); inside brackets they may
    /// sit on separate lines
    fn concatenated(&mut self, mut out: String) -> Result<String, ParseError> {
        loop {
            let (pos, line) = (self.pos, self.line);
            self.skip_trivia(self.depth > 0);

            match (self.peek(), self.peek_at(1)) {
                (Some('"') | Some('\''), _) => out.push_str(&self.string(false)?),
                (Some('r') | Some('R'), Some('"') | Some('\'')) => {
                    self.bump();
                    out.push_str(&self.string(true)?);
                }
                _ => {
                    self.pos = pos;
                    self.line = line;
                    return Ok(out);
                }
            }
        }
    }

    fn sequence(&mut self, close: char) -> Result<Value, ParseError> {
        let mut items = Vec::new();
        let mut saw_comma = false;

        loop {
            self.skip_trivia(true);
            if self.peek() == Some(close) {
                self.bump();
                break;
            }

            items.push(self.value()?);
            self.skip_trivia(true);

            match self.bump() {
                Some(',') => saw_comma = true,
                Some(c) if c == close => break,
                Some(c) => {
                    return Err(self.error(format!("expected ',' or '{}', found '{}'", close, c)))
                }
                None => return Err(self.error(format!("missing closing '{}'", close))),
            }
        }

        // `(x)` is a parenthesized value, `(x,)` a tuple
        if close == ')' && !saw_comma && items.len() == 1 {
            if let Some(item) = items.pop() {
                return Ok(item);
            }
        }

        Ok(Value::Array(items))
    }

    fn dict(&mut self) -> Result<Value, ParseError> {
        let mut map = Map::new();

        loop {
            self.skip_trivia(true);
            if self.peek() == Some('}') {
                self.bump();
                break;
            }

            let key = match self.value()? {
                Value::String(key) => key,
                other => {
                    return Err(self.error(format!(
                        "dictionary keys must be strings, found {}",
                        describe(&other)
                    )))
                }
            };

            self.skip_trivia(true);
            if self.bump() != Some(':') {
                return Err(self.error(format!("expected ':' after key '{}'", key)));
            }
            self.skip_trivia(true);
            let value = self.value()?;
            map.insert(key, value);

            self.skip_trivia(true);
            match self.bump() {
                Some(',') => {}
                Some('}') => break,
                Some(c) => return Err(self.error(format!("expected ',' or '}}', found '{}'", c))),
                None => return Err(self.error("missing closing '}'")),
            }
        }

        Ok(Value::Object(map))
    }

    fn string(&mut self, raw: bool) -> Result<String, ParseError> {
        let quote = self.bump().ok_or_else(|| self.error("expected a string"))?;
        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.bump();
            self.bump();
        }

        let mut out = String::new();
        loop {
            let c = self.bump().ok_or_else(|| self.error("unterminated string"))?;
            match c {
                c if c == quote => {
                    if !triple {
                        break;
                    }
                    if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
                        self.bump();
                        self.bump();
                        break;
                    }
                    out.push(c);
                }
                '\n' if !triple => return Err(self.error("unterminated string")),
                '\\' => {
                    let escaped = self.bump().ok_or_else(|| self.error("unterminated string"))?;
                    if raw {
                        out.push('\\');
                        out.push(escaped);
                        continue;
                    }
                    self.escape(escaped, &mut out)?;
                }
                c => out.push(c),
            }
        }

        Ok(out)
    }

    fn escape(&mut self, escaped: char, out: &mut String) -> Result<(), ParseError> {
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'v' => out.push('\u{0b}'),
            '\\' | '\'' | '"' => out.push(escaped),
            '\n' => {}
            'x' => out.push(self.code_point(2, 'x')?),
            'u' => out.push(self.code_point(4, 'u')?),
            'U' => out.push(self.code_point(8, 'U')?),
            '0'..='7' => {
                let mut value = escaped.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            self.bump();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value).ok_or_else(|| self.error("invalid octal escape"))?);
            }
            'N' => return Err(self.error("named unicode escapes (\\N{...}) are not supported")),
            // unknown escapes keep the backslash
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    /// Exactly `len` hex digits following `\x`, `\u` or `\U`
    fn code_point(&mut self, len: usize, kind: char) -> Result<char, ParseError> {
        let mut digits = String::with_capacity(len);
        for _ in 0..len {
            match self.peek().filter(char::is_ascii_hexdigit) {
                Some(c) => {
                    digits.push(c);
                    self.bump();
                }
                None => return Err(self.error(format!("truncated \\{} escape", kind))),
            }
        }

        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error(format!("invalid \\{} escape '{}'", kind, digits)))
    }

    fn number(&mut self) -> Result<Value, ParseError> {
        let mut literal = String::new();
        if let Some(sign) = self.peek().filter(|c| matches!(c, '-' | '+')) {
            literal.push(sign);
            self.bump();
        }

        let radix = match (self.peek(), self.peek_at(1)) {
            (Some('0'), Some('x' | 'X')) => Some(16),
            (Some('0'), Some('o' | 'O')) => Some(8),
            (Some('0'), Some('b' | 'B')) => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            self.bump();
            self.bump();
            return self.radix_integer(literal.starts_with('-'), radix);
        }

        while let Some(c) = self.peek() {
            let exponent_sign =
                matches!(c, '-' | '+') && literal.ends_with(|p: char| p == 'e' || p == 'E');
            if c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '_') || exponent_sign {
                if c != '_' {
                    literal.push(c);
                }
                self.bump();
            } else {
                break;
            }
        }

        if let Ok(int) = literal.parse::<i64>() {
            return Ok(Value::Number(int.into()));
        }

        literal
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| self.error(format!("invalid number '{}'", literal)))
    }

    fn radix_integer(&mut self, negative: bool, radix: u32) -> Result<Value, ParseError> {
        let mut digits = String::new();
        while let Some(c) = self.peek().filter(|c| c.is_ascii_alphanumeric() || *c == '_') {
            if c != '_' {
                digits.push(c);
            }
            self.bump();
        }

        let value = i64::from_str_radix(&digits, radix)
            .map_err(|_| self.error(format!("invalid base-{} integer '{}'", radix, digits)))?;
        let value = if negative { -value } else { value };
        Ok(Value::Number(value.into()))
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_parse_legacy_config_shape() {
        let text = r#"
# mov2gif configuration
# paths may be relative or absolute
MOV_FILE_PATHS = [
    # add the videos to convert here [MP4, MOV]
    "/path/to/your/movie1.mov",
    '/path/to/your/movie2.mov',  # trailing comment
]

# conversion options
CONVERSION_OPTIONS = {
    "fps": 15,  # frame rate
    "optimize": True,
    "quality": 80,
}
"#;
        let symbols = parse_assignments(text).unwrap();
        assert_eq!(
            symbols["MOV_FILE_PATHS"],
            json!(["/path/to/your/movie1.mov", "/path/to/your/movie2.mov"])
        );
        assert_eq!(
            symbols["CONVERSION_OPTIONS"],
            json!({"fps": 15, "optimize": true, "quality": 80})
        );
    }

    #[test]
    fn test_parse_scalars_and_tuples() {
        let symbols = parse_assignments(
            "A = 'x'\nB = (1, 2.5, -3)\nC = ('solo')\nD = None; E = False\nF = []\n",
        )
        .unwrap();
        assert_eq!(symbols["A"], json!("x"));
        assert_eq!(symbols["B"], json!([1, 2.5, -3]));
        assert_eq!(symbols["C"], json!("solo"));
        assert_eq!(symbols["D"], Value::Null);
        assert_eq!(symbols["E"], json!(false));
        assert_eq!(symbols["F"], json!([]));
    }

    #[test]
    fn test_string_escapes() {
        let symbols = parse_assignments(
            "A = \"a\\\"b\"\nB = r\"C:\\Videos\\demo.mov\"\nC = \"\"\"doc\nstring\"\"\"\n",
        )
        .unwrap();
        assert_eq!(symbols["A"], json!("a\"b"));
        assert_eq!(symbols["B"], json!("C:\\Videos\\demo.mov"));
        assert_eq!(symbols["C"], json!("doc\nstring"));
    }

    #[test]
    fn test_later_assignment_wins() {
        let symbols = parse_assignments("MOV_FILE_PATHS = ['a']\nMOV_FILE_PATHS = ['b']\n").unwrap();
        assert_eq!(symbols["MOV_FILE_PATHS"], json!(["b"]));
    }

    #[test]
    fn test_docstring_is_ignored() {
        let symbols = parse_assignments("\"\"\"settings\"\"\"\nA = 1\n").unwrap();
        assert_eq!(symbols.len(), 1);
    }

    #[test]
    fn test_rejects_code() {
        let err = parse_assignments("import os\nMOV_FILE_PATHS = []\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("import"));

        assert!(parse_assignments("MOV_FILE_PATHS = os.listdir('.')\n").is_err());
        assert!(parse_assignments("A == 1\n").is_err());
    }

    #[test]
    fn test_reports_line_of_error() {
        let err = parse_assignments("A = 1\nB = [\n  1\n  2\n]\n").unwrap_err();
        assert_eq!(err.line, 4);
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let text = format!("MOV_FILE_PATHS = {}", "[".repeat(500_000));
        let err = parse_assignments(&text).unwrap_err();
        assert!(err.message.contains("nesting too deep"));

        let mixed = format!("A = {}", "{\"k\": [".repeat(MAX_DEPTH));
        assert!(parse_assignments(&mixed).unwrap_err().message.contains("nesting too deep"));
    }

    #[test]
    fn test_nesting_up_to_the_limit() {
        let text = format!("A = {}{}\n", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(parse_assignments(&text).is_ok());

        let text = format!("A = {}{}\n", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
        assert!(parse_assignments(&text).is_err());
    }

    #[test]
    fn test_numeric_and_unicode_escapes() {
        let symbols = parse_assignments(concat!(
            "A = \"/Movies/caf\\u00e9.mov\"\n",
            "B = '\\x41\\101\\0'\n",
            "C = \"\\U0001F600\\a\\b\\f\\v\"\n",
            "D = \"C:\\Videos\"\n",
        ))
        .unwrap();
        assert_eq!(symbols["A"], json!("/Movies/café.mov"));
        assert_eq!(symbols["B"], json!("AA\u{0}"));
        assert_eq!(symbols["C"], json!("😀\u{07}\u{08}\u{0c}\u{0b}"));
        // unknown escapes keep their backslash
        assert_eq!(symbols["D"], json!("C:\\Videos"));
    }

    #[test]
    fn test_bad_escapes_are_errors() {
        assert!(parse_assignments("A = '\\N{EM DASH}'\n").is_err());
        assert!(parse_assignments("A = '\\u00'\n").is_err());
        assert!(parse_assignments("A = '\\xZZ'\n").is_err());
        assert!(parse_assignments("A = '\\UFFFFFFFF'\n").is_err());
    }

    #[test]
    fn test_adjacent_strings_are_joined() {
        let symbols = parse_assignments(concat!(
            "A = \"/Movies/\" 'clip.mov'\n",
            "B = [\n    \"/Movies/\"\n    \"long.mov\",\n    r\"C:\\x\" \".mov\",\n]\n",
            "C = {\"a\" \"b\": 1}\n",
        ))
        .unwrap();
        assert_eq!(symbols["A"], json!("/Movies/clip.mov"));
        assert_eq!(symbols["B"], json!(["/Movies/long.mov", "C:\\x.mov"]));
        assert_eq!(symbols["C"], json!({"ab": 1}));

        // outside brackets a newline ends the statement
        let symbols = parse_assignments("A = 'x'\nB = 'y'\n").unwrap();
        assert_eq!(symbols["A"], json!("x"));
    }

    #[test]
    fn test_radix_integers() {
        let symbols = parse_assignments("A = 0x1F\nB = 0o17\nC = 0b101\nD = -0x10\nE = 1_000\n").unwrap();
        assert_eq!(symbols["A"], json!(31));
        assert_eq!(symbols["B"], json!(15));
        assert_eq!(symbols["C"], json!(5));
        assert_eq!(symbols["D"], json!(-16));
        assert_eq!(symbols["E"], json!(1000));
        assert!(parse_assignments("A = 0xZZ\n").is_err());
    }

    #[test]
    fn test_unterminated_list() {
        assert!(parse_assignments("MOV_FILE_PATHS = [\"/a.mov\",\n").is_err());
    }

    #[test]
    fn test_source_wraps_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.py");
        std::fs::write(&path, "MOV_FILE_PATHS = [\n").unwrap();

        assert!(matches!(
            AssignmentConfigSource.load(&path),
            Err(ConfigError::Load { .. })
        ));
    }
}
