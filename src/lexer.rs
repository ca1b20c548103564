use crate::error::Span;
use crate::mode::{KeywordTable, Mode};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords (spelling depends on the mode)
    Start,
    End,
    Print,
    If,
    Then,
    Else,
    Repeat,
    Times,
    Function,
    VariableAssign,
    List,

    // Punctuation
    Assign,
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Comma,
    Colon,
    Dot,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Greater,
    Less,
    EqualEqual,
    BangEqual,
    And,
    Or,
    Not,

    // Literals
    Boolean,
    String,
    Number,
    Array,
    Identifier,

    // Special
    Eof,
}

impl TokenKind {
    /// Human-readable name used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Start => "start keyword",
            TokenKind::End => "end keyword",
            TokenKind::Print => "print keyword",
            TokenKind::If => "'jo'",
            TokenKind::Then => "'to'",
            TokenKind::Else => "'nahi to'",
            TokenKind::Repeat => "'repeat'",
            TokenKind::Times => "'vaar'",
            TokenKind::Function => "'function'",
            TokenKind::VariableAssign => "variable declaration keyword",
            TokenKind::List => "list keyword",
            TokenKind::Assign => "'='",
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Dot => "'.'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Greater => "'>'",
            TokenKind::Less => "'<'",
            TokenKind::EqualEqual => "'=='",
            TokenKind::BangEqual => "'!='",
            TokenKind::And => "'and'",
            TokenKind::Or => "'or'",
            TokenKind::Not => "'not'",
            TokenKind::Boolean => "boolean",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Array => "array literal",
            TokenKind::Identifier => "identifier",
            TokenKind::Eof => "end of input",
        }
    }
}

/// One element of a bracketed array literal, classified at lex time.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayItem {
    Number(f64),
    Str(String),
    Boolean(bool),
    Identifier(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Text(String),
    Number(f64),
    Str(String),
    Boolean(bool),
    Array(Vec<ArrayItem>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    pub line: usize,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, value: TokenValue, line: usize, span: Span) -> Self {
        Self {
            kind,
            value,
            line,
            span,
        }
    }

    /// Identifier or keyword text, empty for literal tokens.
    pub fn text(&self) -> &str {
        match &self.value {
            TokenValue::Text(text) => text,
            _ => "",
        }
    }
}

/// Why a source line was dropped from the token stream.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    UnterminatedString,
    UnterminatedArray,
    UnexpectedCharacter(char),
    InvalidWord(String),
    InvalidArrayItem(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    pub line: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SegmentKind {
    Word,
    Quoted,
    ArrayLiteral,
    Punct,
}

/// A slice of one line; `start` is relative to the line.
#[derive(Debug)]
struct Segment<'a> {
    text: &'a str,
    start: usize,
    kind: SegmentKind,
}

impl Segment<'_> {
    fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// Line-oriented lexer. Lines it cannot classify are skipped, never reported
/// as errors; see [`Lexer::skipped_lines`].
pub struct Lexer {
    source: String,
    phrases: Vec<(Vec<&'static str>, TokenKind)>,
    skipped: Vec<SkippedLine>,
}

impl Lexer {
    pub fn new(source: String, mode: Mode) -> Self {
        Self {
            source,
            phrases: keyword_phrases(mode.keywords()),
            skipped: Vec::new(),
        }
    }

    pub fn scan_tokens(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut skipped = Vec::new();
        let mut offset = 0;
        let mut line_no = 0;

        for line in self.source.split('\n') {
            line_no += 1;
            match self.scan_line(line, line_no, offset) {
                Ok(line_tokens) => tokens.extend(line_tokens),
                Err(reason) => {
                    debug!("skipping line {}: {:?}", line_no, reason);
                    skipped.push(SkippedLine {
                        line: line_no,
                        reason,
                    });
                }
            }
            offset += line.len() + 1;
        }

        let end = self.source.len();
        tokens.push(Token::new(
            TokenKind::Eof,
            TokenValue::Text(String::new()),
            line_no.max(1),
            Span::new(end, end),
        ));
        self.skipped = skipped;
        tokens
    }

    /// Lines dropped by the last [`Lexer::scan_tokens`] call.
    pub fn skipped_lines(&self) -> &[SkippedLine] {
        &self.skipped
    }

    fn scan_line(&self, line: &str, line_no: usize, offset: usize) -> Result<Vec<Token>, SkipReason> {
        let code = strip_comment(line);
        if code.trim().is_empty() {
            return Ok(Vec::new());
        }

        let segments = split_segments(code)?;
        let mut tokens = Vec::new();
        let mut i = 0;

        while i < segments.len() {
            if let Some((kind, consumed)) = self.match_phrase(&segments[i..]) {
                let words = &segments[i..i + consumed];
                let text = words.iter().map(|s| s.text).collect::<Vec<_>>().join(" ");
                let span = Span::new(offset + words[0].start, offset + words[consumed - 1].end());
                tokens.push(Token::new(kind, TokenValue::Text(text), line_no, span));
                i += consumed;
                continue;
            }

            let segment = &segments[i];
            let (kind, value) = classify(segment)?;
            let span = Span::new(offset + segment.start, offset + segment.end());
            tokens.push(Token::new(kind, value, line_no, span));
            i += 1;
        }

        Ok(tokens)
    }

    /// Longest keyword phrase starting at the first segment.
    fn match_phrase(&self, segments: &[Segment]) -> Option<(TokenKind, usize)> {
        self.phrases.iter().find_map(|(words, kind)| {
            let matches = segments.len() >= words.len()
                && words
                    .iter()
                    .zip(segments)
                    .all(|(word, segment)| segment.kind == SegmentKind::Word && segment.text == *word);
            if matches {
                Some((*kind, words.len()))
            } else {
                None
            }
        })
    }
}

/// Tokenize `source` with the vocabulary of `mode`.
pub fn tokenize(source: &str, mode: Mode) -> Vec<Token> {
    Lexer::new(source.to_string(), mode).scan_tokens()
}

fn keyword_phrases(keywords: &'static KeywordTable) -> Vec<(Vec<&'static str>, TokenKind)> {
    let mut entries = vec![
        (keywords.start, TokenKind::Start),
        (keywords.end, TokenKind::End),
        (keywords.print, TokenKind::Print),
        (keywords.if_, TokenKind::If),
        (keywords.then, TokenKind::Then),
        (keywords.else_, TokenKind::Else),
        (keywords.repeat, TokenKind::Repeat),
        (keywords.times, TokenKind::Times),
        (keywords.function, TokenKind::Function),
        (keywords.list_prefix, TokenKind::List),
    ];
    if let Some(declaration) = keywords.declaration_phrase() {
        entries.push((declaration, TokenKind::VariableAssign));
    }

    let mut phrases: Vec<(Vec<&'static str>, TokenKind)> = entries
        .into_iter()
        .map(|(phrase, kind)| (phrase.split_whitespace().collect(), kind))
        .collect();
    // Longest first, so "loda ayia nakh list" wins over "loda ayia nakh".
    phrases.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    phrases
}

fn strip_comment(line: &str) -> &str {
    let mut quote = None;
    for (i, c) in line.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '#' => return &line[..i],
            None => {}
        }
    }
    line
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn split_segments(line: &str) -> Result<Vec<Segment<'_>>, SkipReason> {
    let mut segments = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c == '"' || c == '\'' {
            chars.next();
            let end = loop {
                match chars.next() {
                    Some((i, ch)) if ch == c => break i + ch.len_utf8(),
                    Some(_) => {}
                    None => return Err(SkipReason::UnterminatedString),
                }
            };
            segments.push(Segment {
                text: &line[start..end],
                start,
                kind: SegmentKind::Quoted,
            });
            continue;
        }

        // `[` right after a word indexes it; anywhere else it opens a literal.
        let follows_word = line[..start].chars().next_back().map_or(false, is_word_char);
        if c == '[' && !follows_word {
            let end = array_literal_end(line, start)?;
            while chars.peek().map_or(false, |&(i, _)| i < end) {
                chars.next();
            }
            segments.push(Segment {
                text: &line[start..end],
                start,
                kind: SegmentKind::ArrayLiteral,
            });
            continue;
        }

        if is_word_char(c) {
            chars.next();
            let numeric = c.is_ascii_digit();
            let mut end = start + c.len_utf8();
            while let Some(&(i, ch)) = chars.peek() {
                if is_word_char(ch) || (numeric && ch == '.') {
                    end = i + ch.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            segments.push(Segment {
                text: &line[start..end],
                start,
                kind: SegmentKind::Word,
            });
            continue;
        }

        chars.next();
        let end = match c {
            '=' | '!' => {
                if chars.peek().map(|&(_, next)| next) == Some('=') {
                    chars.next();
                    start + 2
                } else if c == '=' {
                    start + 1
                } else {
                    return Err(SkipReason::UnexpectedCharacter(c));
                }
            }
            '{' | '}' | '(' | ')' | '[' | ']' | ',' | '+' | '-' | '*' | '/' | '>' | '<' | ':' | '.' => {
                start + 1
            }
            other => return Err(SkipReason::UnexpectedCharacter(other)),
        };
        segments.push(Segment {
            text: &line[start..end],
            start,
            kind: SegmentKind::Punct,
        });
    }

    Ok(segments)
}

/// Byte index just past the `]` closing the literal opened at `start`.
fn array_literal_end(line: &str, start: usize) -> Result<usize, SkipReason> {
    let mut quote = None;
    let mut depth = 0;
    for (i, c) in line[start..].char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(start + i + 1);
                    }
                }
                _ => {}
            },
        }
    }
    Err(SkipReason::UnterminatedArray)
}

fn classify(segment: &Segment) -> Result<(TokenKind, TokenValue), SkipReason> {
    let text = segment.text;
    let lexeme = || TokenValue::Text(text.to_string());

    match segment.kind {
        SegmentKind::Quoted => Ok((TokenKind::String, TokenValue::Str(unquote(text).to_string()))),
        SegmentKind::ArrayLiteral => Ok((TokenKind::Array, TokenValue::Array(parse_array(text)?))),
        SegmentKind::Punct => {
            let kind = match text {
                "=" => TokenKind::Assign,
                "{" => TokenKind::LeftBrace,
                "}" => TokenKind::RightBrace,
                "(" => TokenKind::LeftParen,
                ")" => TokenKind::RightParen,
                "[" => TokenKind::LeftBracket,
                "]" => TokenKind::RightBracket,
                "," => TokenKind::Comma,
                ":" => TokenKind::Colon,
                "." => TokenKind::Dot,
                "+" => TokenKind::Plus,
                "-" => TokenKind::Minus,
                "*" => TokenKind::Star,
                "/" => TokenKind::Slash,
                ">" => TokenKind::Greater,
                "<" => TokenKind::Less,
                "==" => TokenKind::EqualEqual,
                "!=" => TokenKind::BangEqual,
                _ => return Err(SkipReason::InvalidWord(text.to_string())),
            };
            Ok((kind, lexeme()))
        }
        SegmentKind::Word => match text {
            "and" => Ok((TokenKind::And, lexeme())),
            "or" => Ok((TokenKind::Or, lexeme())),
            "not" => Ok((TokenKind::Not, lexeme())),
            "true" => Ok((TokenKind::Boolean, TokenValue::Boolean(true))),
            "false" => Ok((TokenKind::Boolean, TokenValue::Boolean(false))),
            _ => {
                if let Some(number) = parse_number(text) {
                    Ok((TokenKind::Number, TokenValue::Number(number)))
                } else if is_identifier(text) {
                    Ok((TokenKind::Identifier, lexeme()))
                } else {
                    Err(SkipReason::InvalidWord(text.to_string()))
                }
            }
        },
    }
}

/// Strips exactly one leading and one trailing quote.
fn unquote(text: &str) -> &str {
    &text[1..text.len() - 1]
}

fn is_quoted(text: &str) -> bool {
    text.len() >= 2
        && ((text.starts_with('"') && text.ends_with('"'))
            || (text.starts_with('\'') && text.ends_with('\'')))
}

/// Plain decimal literal: digits with at most one `.`. Rejects `inf`, `NaN`,
/// exponents and signs even though `f64::from_str` would accept them.
pub fn parse_number(text: &str) -> Option<f64> {
    let well_formed = text.chars().any(|c| c.is_ascii_digit())
        && text.chars().all(|c| c.is_ascii_digit() || c == '.')
        && text.matches('.').count() <= 1;
    if !well_formed {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => chars.all(is_word_char),
        _ => false,
    }
}

fn parse_array(text: &str) -> Result<Vec<ArrayItem>, SkipReason> {
    let inner = &text[1..text.len() - 1];
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    split_items(inner)
        .into_iter()
        .map(|item| {
            let item = item.trim();
            if is_quoted(item) {
                Ok(ArrayItem::Str(unquote(item).to_string()))
            } else if item == "true" || item == "false" {
                Ok(ArrayItem::Boolean(item == "true"))
            } else if let Some(number) = parse_number(item) {
                Ok(ArrayItem::Number(number))
            } else if let Some(number) = item.strip_prefix('-').and_then(parse_number) {
                Ok(ArrayItem::Number(-number))
            } else if is_identifier(item) {
                Ok(ArrayItem::Identifier(item.to_string()))
            } else {
                Err(SkipReason::InvalidArrayItem(item.to_string()))
            }
        })
        .collect()
}

/// Splits on commas that are not inside quotes.
fn split_items(inner: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut quote = None;
    let mut item_start = 0;
    for (i, c) in inner.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == ',' => {
                items.push(&inner[item_start..i]);
                item_start = i + 1;
            }
            None => {}
        }
    }
    items.push(&inner[item_start..]);
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str, mode: Mode) -> Vec<TokenKind> {
        tokenize(source, mode).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn conditional_line_without_spaces_around_parens() {
        use TokenKind::*;
        assert_eq!(
            kinds("jo (umar > 18) to { print: \"adult\" } nahi to { print: \"minor\" }", Mode::Plain),
            vec![
                If, LeftParen, Identifier, Greater, Number, RightParen, Then, LeftBrace, Print,
                Colon, String, RightBrace, Else, LeftBrace, Print, Colon, String, RightBrace, Eof
            ]
        );
    }

    #[test]
    fn colorful_phrases_consume_several_words() {
        use TokenKind::*;
        let tokens = tokenize("loda ayia nakh list lodo = [1, 2]\nloda ayia nakh umar = 25\nlakh chodya: umar", Mode::Colorful);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![List, Identifier, Assign, Array, VariableAssign, Identifier, Assign, Number, Print, Colon, Identifier, Eof]
        );
        assert_eq!(tokens[0].text(), "loda ayia nakh list");
        assert_eq!(tokens[4].line, 2);
    }

    #[test]
    fn plain_mode_does_not_know_colorful_keywords() {
        assert_eq!(
            kinds("sharu:", Mode::Plain),
            vec![TokenKind::Identifier, TokenKind::Colon, TokenKind::Eof]
        );
        assert_eq!(
            kinds("list x = []", Mode::Colorful)[0],
            TokenKind::Identifier
        );
    }

    #[test]
    fn comments_and_blank_lines_are_dropped() {
        let tokens = tokenize("# heading\n\n  print: \"a # not a comment\" # trailing\n", Mode::Plain);
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[2].value, TokenValue::Str("a # not a comment".to_string()));
        assert_eq!(tokens[2].line, 3);
    }

    #[test]
    fn numbers_reject_float_lookalikes() {
        assert_eq!(parse_number("3.14"), Some(3.14));
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("1e5"), None);
        assert_eq!(parse_number("1.2.3"), None);
        assert_eq!(kinds("inf", Mode::Plain)[0], TokenKind::Identifier);
    }

    #[test]
    fn array_literal_versus_index() {
        let tokens = tokenize("list a = [\"x, y\", -2, true, naam]\nprint: a[0]", Mode::Plain);
        assert_eq!(
            tokens[3].value,
            TokenValue::Array(vec![
                ArrayItem::Str("x, y".to_string()),
                ArrayItem::Number(-2.0),
                ArrayItem::Boolean(true),
                ArrayItem::Identifier("naam".to_string()),
            ])
        );
        let tail: Vec<_> = tokens[4..].iter().map(|t| t.kind).collect();
        assert_eq!(
            tail,
            vec![
                TokenKind::Print,
                TokenKind::Colon,
                TokenKind::Identifier,
                TokenKind::LeftBracket,
                TokenKind::Number,
                TokenKind::RightBracket,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn unrecognized_lines_are_skipped_and_recorded() {
        let mut lexer = Lexer::new("start:\n  print: \"oops\n  x = 1 @ 2\n  y = 3\nend:".to_string(), Mode::Plain);
        let tokens = lexer.scan_tokens();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Start,
                TokenKind::Colon,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::End,
                TokenKind::Colon,
                TokenKind::Eof
            ]
        );
        assert_eq!(
            lexer.skipped_lines(),
            &[
                SkippedLine { line: 2, reason: SkipReason::UnterminatedString },
                SkippedLine { line: 3, reason: SkipReason::UnexpectedCharacter('@') },
            ]
        );
    }

    #[test]
    fn property_access_and_operators() {
        use TokenKind::*;
        assert_eq!(
            kinds("x = a.length != 3 == not b", Mode::Plain),
            vec![Identifier, Assign, Identifier, Dot, Identifier, BangEqual, Number, EqualEqual, Not, Identifier, Eof]
        );
    }

    #[test]
    fn spans_point_into_the_source() {
        let source = "start:\n  print: \"hi\"\nend:";
        let tokens = tokenize(source, Mode::Plain);
        let string = &tokens[4];
        assert_eq!(&source[string.span.start..string.span.end], "\"hi\"");
    }
}
