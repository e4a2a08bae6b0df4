//! Context-aware scanning of component source text.
//!
//! Every byte of the input is classified as code, literal (string or template
//! literal text), comment or markup, so bracket matching and reference
//! rewriting never look inside strings, comments or JSX text. Template literal
//! holes (`${ ... }`) and JSX expression containers (`{ ... }`) are code.
//! Regex literals are treated as code.

/// Classification of a single source byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ByteClass {
    Code,
    Literal,
    Comment,
    /// JSX tags and child text.
    Markup,
}

/// Scanner state inside code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanContext {
    /// Normal code context.
    Code,
    /// Inside a single-quoted string.
    SingleQuoteString,
    /// Inside a double-quoted string.
    DoubleQuoteString,
    /// Inside a single-line comment.
    LineComment,
    /// Inside a block comment.
    BlockComment,
}

/// What closes a run of code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hole {
    /// The top level; never closed.
    Root,
    /// A `${` hole in a template literal.
    Template,
    /// A `{` expression container in JSX.
    Jsx,
}

/// One level of the scanner's nesting stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Code, with the brace depth inside the enclosing hole.
    Code { braces: usize, hole: Hole },
    /// Template literal text.
    TemplateLiteral,
    /// Inside a JSX tag; `depth` counts elements open around it.
    JsxTag { depth: usize, closing: bool },
    /// JSX child text between tags.
    JsxText { depth: usize },
}

/// Per-byte classification of a source text.
#[derive(Debug, Clone)]
pub(crate) struct CodeMap<'a> {
    source: &'a str,
    classes: Vec<ByteClass>,
}

impl<'a> CodeMap<'a> {
    /// Scans `source`, assuming it starts in code context.
    ///
    /// Falls back to a scan without JSX when tags do not balance, so an
    /// unexpected `<` never turns the rest of the text into markup.
    pub(crate) fn new(source: &'a str) -> Self {
        let classes = match scan(source, true) {
            Some(classes) => classes,
            None => scan(source, false).unwrap_or_default(),
        };
        Self { source, classes }
    }

    pub(crate) fn source(&self) -> &'a str {
        self.source
    }

    pub(crate) fn len(&self) -> usize {
        self.source.len()
    }

    /// Whether the byte at `idx` is code.
    pub(crate) fn is_code(&self, idx: usize) -> bool {
        self.classes.get(idx) == Some(&ByteClass::Code)
    }

    /// Whether the byte at `idx` is whitespace or comment.
    pub(crate) fn is_trivia(&self, idx: usize) -> bool {
        match self.classes.get(idx) {
            Some(ByteClass::Comment) => true,
            Some(ByteClass::Code) => self.source.as_bytes()[idx].is_ascii_whitespace(),
            _ => false,
        }
    }

    /// The code byte at `idx`, if that byte is code.
    pub(crate) fn code_byte(&self, idx: usize) -> Option<u8> {
        if self.is_code(idx) {
            Some(self.source.as_bytes()[idx])
        } else {
            None
        }
    }

    /// Skips whitespace and comments starting at `from`, stopping at `end`.
    pub(crate) fn skip_trivia(&self, from: usize, end: usize) -> usize {
        let mut pos = from;
        while pos < end && self.is_trivia(pos) {
            pos += 1;
        }
        pos
    }

    /// Finds the bracket closing the one opened at `open`.
    ///
    /// Counts `()`, `[]` and `{}` at code positions only. Returns `None` when
    /// `open` is not an opening bracket or the text ends first.
    pub(crate) fn matching(&self, open: usize) -> Option<usize> {
        if !matches!(self.code_byte(open), Some(b'(' | b'[' | b'{')) {
            return None;
        }
        let mut depth = 0usize;
        for idx in open..self.len() {
            match self.code_byte(idx) {
                Some(b'(' | b'[' | b'{') => depth += 1,
                Some(b')' | b']' | b'}') => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(idx);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Finds the first code occurrence of `needle` in `[from, end)`.
    pub(crate) fn find_code(&self, from: usize, end: usize, needle: &str) -> Option<usize> {
        let end = end.min(self.len());
        let mut idx = from;
        while idx + needle.len() <= end {
            if self.is_code(idx) && self.source.as_bytes()[idx..].starts_with(needle.as_bytes()) {
                return Some(idx);
            }
            idx += 1;
        }
        None
    }

    /// Splits `[start, end)` on a separator byte occurring at bracket depth zero.
    pub(crate) fn split_top_level(&self, start: usize, end: usize, sep: u8) -> Vec<(usize, usize)> {
        let mut parts = Vec::new();
        let mut depth = 0usize;
        let mut part_start = start;
        for idx in start..end {
            match self.code_byte(idx) {
                Some(b'(' | b'[' | b'{') => depth += 1,
                Some(b')' | b']' | b'}') => depth = depth.saturating_sub(1),
                Some(b) if b == sep && depth == 0 => {
                    parts.push((part_start, idx));
                    part_start = idx + 1;
                }
                _ => {}
            }
        }
        parts.push((part_start, end));
        parts
    }

    /// Finds the first byte `needle` at bracket depth zero in `[start, end)`.
    pub(crate) fn find_top_level(&self, start: usize, end: usize, needle: u8) -> Option<usize> {
        let mut depth = 0usize;
        for idx in start..end {
            match self.code_byte(idx) {
                Some(b'(' | b'[' | b'{') => depth += 1,
                Some(b')' | b']' | b'}') => depth = depth.saturating_sub(1),
                Some(b) if b == needle && depth == 0 => return Some(idx),
                _ => {}
            }
        }
        None
    }

    /// Positions of the keyword `word` at bracket depth zero in `[start, end)`.
    pub(crate) fn top_level_keywords(&self, start: usize, end: usize, word: &str) -> Vec<usize> {
        let mut found = Vec::new();
        let mut depth = 0usize;
        for idx in start..end {
            match self.code_byte(idx) {
                Some(b'(' | b'[' | b'{') => depth += 1,
                Some(b')' | b']' | b'}') => depth = depth.saturating_sub(1),
                Some(_) if depth == 0 && self.is_word_at(idx, word) => found.push(idx),
                _ => {}
            }
        }
        found
    }

    /// Whether `word` starts at `idx` with identifier boundaries on both sides.
    pub(crate) fn is_word_at(&self, idx: usize, word: &str) -> bool {
        // An ASCII match guarantees `idx` is a char boundary.
        if !self.source.as_bytes()[idx..].starts_with(word.as_bytes()) {
            return false;
        }
        let before_ok = self.source[..idx]
            .chars()
            .next_back()
            .map_or(true, |c| !is_ident_char(c) && c != '.');
        let after_ok = self.source[idx + word.len()..]
            .chars()
            .next()
            .map_or(true, |c| !is_ident_char(c));
        before_ok && after_ok
    }
}

/// Classifies every byte of `source`.
///
/// Returns `None` when `jsx` is set and a JSX element is left open.
fn scan(source: &str, jsx: bool) -> Option<Vec<ByteClass>> {
    let bytes = source.as_bytes();
    let mut classes = vec![ByteClass::Code; bytes.len()];
    let mut modes = vec![Mode::Code {
        braces: 0,
        hole: Hole::Root,
    }];
    let mut context = ScanContext::Code;
    let mut quote_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        let Some(&mode) = modes.last() else {
            break;
        };

        match mode {
            Mode::TemplateLiteral => {
                if b == b'\\' {
                    mark(&mut classes, i, 2, ByteClass::Literal);
                    i += 2;
                    continue;
                }
                if b == b'$' && next == Some(b'{') {
                    mark(&mut classes, i, 2, ByteClass::Literal);
                    modes.push(Mode::Code {
                        braces: 0,
                        hole: Hole::Template,
                    });
                    i += 2;
                    continue;
                }
                classes[i] = ByteClass::Literal;
                if b == b'`' {
                    modes.pop();
                }
            }
            Mode::JsxText { depth } => match b {
                b'{' => modes.push(Mode::Code {
                    braces: 0,
                    hole: Hole::Jsx,
                }),
                b'<' => {
                    classes[i] = ByteClass::Markup;
                    replace_top(
                        &mut modes,
                        Mode::JsxTag {
                            depth,
                            closing: next == Some(b'/'),
                        },
                    );
                }
                _ => classes[i] = ByteClass::Markup,
            },
            Mode::JsxTag { depth, closing } => match b {
                b'"' | b'\'' => {
                    // Attribute strings may span lines and have no escapes.
                    let end = source[i + 1..]
                        .find(b as char)
                        .map_or(bytes.len(), |offset| i + offset + 2);
                    mark(&mut classes, i, end - i, ByteClass::Literal);
                    i = end;
                    continue;
                }
                b'{' => modes.push(Mode::Code {
                    braces: 0,
                    hole: Hole::Jsx,
                }),
                b'/' if !closing && next == Some(b'>') => {
                    mark(&mut classes, i, 2, ByteClass::Markup);
                    end_tag(&mut modes, depth);
                    i += 2;
                    continue;
                }
                b'>' => {
                    classes[i] = ByteClass::Markup;
                    let depth = if closing {
                        depth.saturating_sub(1)
                    } else {
                        depth + 1
                    };
                    end_tag(&mut modes, depth);
                }
                _ => classes[i] = ByteClass::Markup,
            },
            Mode::Code { braces, hole } => match context {
                ScanContext::Code => match b {
                    b'\'' | b'"' => {
                        classes[i] = ByteClass::Literal;
                        quote_start = i;
                        context = if b == b'\'' {
                            ScanContext::SingleQuoteString
                        } else {
                            ScanContext::DoubleQuoteString
                        };
                    }
                    b'`' => {
                        classes[i] = ByteClass::Literal;
                        modes.push(Mode::TemplateLiteral);
                    }
                    b'/' if next == Some(b'/') => {
                        mark(&mut classes, i, 2, ByteClass::Comment);
                        context = ScanContext::LineComment;
                        i += 2;
                        continue;
                    }
                    b'/' if next == Some(b'*') => {
                        mark(&mut classes, i, 2, ByteClass::Comment);
                        context = ScanContext::BlockComment;
                        i += 2;
                        continue;
                    }
                    b'{' => replace_top(
                        &mut modes,
                        Mode::Code {
                            braces: braces + 1,
                            hole,
                        },
                    ),
                    b'}' if braces > 0 => replace_top(
                        &mut modes,
                        Mode::Code {
                            braces: braces - 1,
                            hole,
                        },
                    ),
                    b'}' => match hole {
                        Hole::Root => {}
                        Hole::Template => {
                            classes[i] = ByteClass::Literal;
                            modes.pop();
                        }
                        Hole::Jsx => {
                            modes.pop();
                        }
                    },
                    b'<' if jsx && opens_jsx(bytes, &classes, i) => {
                        classes[i] = ByteClass::Markup;
                        modes.push(Mode::JsxTag {
                            depth: 0,
                            closing: false,
                        });
                    }
                    _ => {}
                },
                ScanContext::SingleQuoteString | ScanContext::DoubleQuoteString => {
                    let quote = if context == ScanContext::SingleQuoteString {
                        b'\''
                    } else {
                        b'"'
                    };
                    if b == b'\\' {
                        mark(&mut classes, i, 2, ByteClass::Literal);
                        i += 2;
                        continue;
                    }
                    if b == b'\n' {
                        // Quoted strings cannot span lines: the quote was not
                        // a string opener, so rescan after it as code.
                        mark(&mut classes, quote_start, i - quote_start, ByteClass::Code);
                        context = ScanContext::Code;
                        i = quote_start + 1;
                        continue;
                    }
                    classes[i] = ByteClass::Literal;
                    if b == quote {
                        context = ScanContext::Code;
                    }
                }
                ScanContext::LineComment => {
                    if b == b'\n' {
                        context = ScanContext::Code;
                    } else {
                        classes[i] = ByteClass::Comment;
                    }
                }
                ScanContext::BlockComment => {
                    if b == b'*' && next == Some(b'/') {
                        mark(&mut classes, i, 2, ByteClass::Comment);
                        context = ScanContext::Code;
                        i += 2;
                        continue;
                    }
                    classes[i] = ByteClass::Comment;
                }
            },
        }

        i += 1;
    }

    let open_jsx = modes
        .iter()
        .any(|mode| matches!(mode, Mode::JsxTag { .. } | Mode::JsxText { .. }));
    (!open_jsx).then_some(classes)
}

fn replace_top(modes: &mut [Mode], mode: Mode) {
    if let Some(top) = modes.last_mut() {
        *top = mode;
    }
}

/// Leaves a tag; `depth` is the number of elements still open.
fn end_tag(modes: &mut Vec<Mode>, depth: usize) {
    modes.pop();
    if depth > 0 {
        modes.push(Mode::JsxText { depth });
    }
}

/// Whether the `<` at `idx` starts a JSX element rather than a comparison.
///
/// It must be followed by a tag name or `>` and stand where an expression
/// begins: at the start, after an operator or opening bracket, or after
/// `return`.
fn opens_jsx(bytes: &[u8], classes: &[ByteClass], idx: usize) -> bool {
    let starts_tag = bytes
        .get(idx + 1)
        .is_some_and(|b| b.is_ascii_alphabetic() || *b == b'>');
    if !starts_tag {
        return false;
    }

    let previous = (0..idx).rev().find(|&j| {
        classes[j] != ByteClass::Comment && !bytes[j].is_ascii_whitespace()
    });
    let Some(prev) = previous else {
        return true;
    };
    if classes[prev] != ByteClass::Code {
        return false;
    }
    match bytes[prev] {
        b'(' | b',' | b'=' | b'?' | b':' | b'&' | b'|' | b'{' | b'}' | b'[' | b'!' | b';'
        | b'>' => true,
        b if b.is_ascii_alphanumeric() || b == b'_' || b == b'$' => {
            let word_start = bytes[..=prev]
                .iter()
                .rposition(|b| !(b.is_ascii_alphanumeric() || *b == b'_' || *b == b'$'))
                .map_or(0, |p| p + 1);
            matches!(&bytes[word_start..=prev], b"return" | b"yield" | b"default")
        }
        _ => false,
    }
}

fn mark(classes: &mut [ByteClass], start: usize, len: usize, class: ByteClass) {
    for slot in classes.iter_mut().skip(start).take(len) {
        *slot = class;
    }
}

/// Whether `c` may appear inside a JavaScript identifier.
pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Whether `c` may start a JavaScript identifier.
pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

/// Whether the whole of `text` is a plain identifier.
pub(crate) fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(is_ident_start) && chars.all(is_ident_char)
}

/// Returns the end of the identifier starting at `idx` (equal to `idx` if none).
pub(crate) fn ident_end(source: &str, idx: usize) -> usize {
    let mut chars = source[idx..].char_indices();
    match chars.next() {
        Some((_, c)) if is_ident_start(c) => {}
        _ => return idx,
    }
    for (offset, c) in chars {
        if !is_ident_char(c) {
            return idx + offset;
        }
    }
    source.len()
}
