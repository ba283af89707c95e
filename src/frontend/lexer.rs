use std::io::BufRead;

/// The tokens of the language. The lexer hands these out one at a time;
/// the parser keeps exactly one of them as lookahead.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Input stream exhausted. Sticky: once returned, every later call
    /// returns it again.
    Eof,
    Def,
    Extern,
    Identifier(String),
    Number(f64),
    /// Any other single character: operators, parentheses, commas,
    /// semicolons. Classification happens in the parser.
    Char(char),
}

/// Streaming lexer over a character source, with the one-character
/// pushback the tokenizing rules need to avoid over-reading.
#[derive(Debug)]
pub struct Lexer<I> {
    chars: I,
    last: Option<char>,
}

impl<I: Iterator<Item = char>> Lexer<I> {
    pub fn new(chars: I) -> Self {
        // Seeding the pushback with a space lets next_token start in its
        // whitespace-skipping loop without a special first-call case.
        Self {
            chars,
            last: Some(' '),
        }
    }

    fn bump(&mut self) {
        self.last = self.chars.next();
    }

    /// Produce the next token, consuming characters from the source.
    pub fn next_token(&mut self) -> Token {
        loop {
            while matches!(self.last, Some(c) if c.is_whitespace()) {
                self.bump();
            }

            let c = match self.last {
                None => return Token::Eof,
                Some(c) => c,
            };

            // identifier ::= alphabetic alphanumeric*
            if c.is_alphabetic() {
                let mut ident = String::new();
                ident.push(c);
                self.bump();
                while let Some(c) = self.last {
                    if !c.is_alphanumeric() {
                        break;
                    }
                    ident.push(c);
                    self.bump();
                }
                return match ident.as_str() {
                    "def" => Token::Def,
                    "extern" => Token::Extern,
                    _ => Token::Identifier(ident),
                };
            }

            // number ::= [0-9.]+  -- deliberately lenient, see lenient_f64
            if c.is_ascii_digit() || c == '.' {
                let mut digits = String::new();
                while let Some(c) = self.last {
                    if !c.is_ascii_digit() && c != '.' {
                        break;
                    }
                    digits.push(c);
                    self.bump();
                }
                return Token::Number(lenient_f64(&digits));
            }

            // '#' comments run to the end of the line; the terminator is
            // left in the pushback and eaten as whitespace next round.
            if c == '#' {
                while let Some(c) = self.last {
                    if c == '\n' || c == '\r' {
                        break;
                    }
                    self.bump();
                }
                if self.last.is_none() {
                    return Token::Eof;
                }
                continue;
            }

            self.bump();
            return Token::Char(c);
        }
    }
}

/// Convert a run of digits and dots the way strtod would: the longest
/// leading slice that is a valid float wins, and no valid slice at all
/// means 0.0. The number rule accepts input like "1.2.3", which strtod
/// reads as 1.2; the REPL keeps that behavior rather than rejecting
/// the token.
fn lenient_f64(digits: &str) -> f64 {
    for end in (1..=digits.len()).rev() {
        if let Ok(value) = digits[..end].parse::<f64>() {
            return value;
        }
    }
    0.0
}

/// Adapter that feeds a `BufRead` source to the lexer one character at a
/// time, pulling a line at a time so an interactive session lexes input
/// as it is typed. A read error ends the stream like end-of-input.
#[derive(Debug)]
pub struct Chars<R> {
    reader: R,
    pending: std::vec::IntoIter<char>,
}

impl<R: BufRead> Chars<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::new().into_iter(),
        }
    }
}

impl<R: BufRead> Iterator for Chars<R> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        loop {
            if let Some(c) = self.pending.next() {
                return Some(c);
            }
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) | Err(_) => return None,
                Ok(_) => self.pending = line.chars().collect::<Vec<_>>().into_iter(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lex_all(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input.chars());
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token();
            let done = tok == Token::Eof;
            tokens.push(tok);
            if done {
                return tokens;
            }
        }
    }

    #[test]
    fn lexes_numbers() {
        assert_eq!(
            lex_all(" 2.3  4.654345   700   0.23423  "),
            vec![
                Token::Number(2.3),
                Token::Number(4.654345),
                Token::Number(700.0),
                Token::Number(0.23423),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn lexes_identifiers_and_keywords() {
        assert_eq!(
            lex_all("def extern foo bar2"),
            vec![
                Token::Def,
                Token::Extern,
                Token::Identifier("foo".to_string()),
                Token::Identifier("bar2".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn splits_punctuation_without_spaces() {
        assert_eq!(
            lex_all("a+b*(c,d);"),
            vec![
                Token::Identifier("a".to_string()),
                Token::Char('+'),
                Token::Identifier("b".to_string()),
                Token::Char('*'),
                Token::Char('('),
                Token::Identifier("c".to_string()),
                Token::Char(','),
                Token::Identifier("d".to_string()),
                Token::Char(')'),
                Token::Char(';'),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn skips_comments_to_end_of_line() {
        assert_eq!(
            lex_all("# comment\n1"),
            vec![Token::Number(1.0), Token::Eof]
        );
        assert_eq!(lex_all("# only a comment"), vec![Token::Eof]);
        assert_eq!(
            lex_all("x # trailing\n# another\ny"),
            vec![
                Token::Identifier("x".to_string()),
                Token::Identifier("y".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn number_rule_is_lenient_about_extra_dots() {
        // "1.2.3" is one token; strtod stops at the second dot.
        assert_eq!(lex_all("1.2.3"), vec![Token::Number(1.2), Token::Eof]);
        assert_eq!(lex_all("1..5"), vec![Token::Number(1.0), Token::Eof]);
        assert_eq!(lex_all("."), vec![Token::Number(0.0), Token::Eof]);
        assert_eq!(lex_all(".5"), vec![Token::Number(0.5), Token::Eof]);
    }

    #[test]
    fn eof_is_sticky() {
        let mut lexer = Lexer::new("x".chars());
        assert_eq!(lexer.next_token(), Token::Identifier("x".to_string()));
        assert_eq!(lexer.next_token(), Token::Eof);
        assert_eq!(lexer.next_token(), Token::Eof);
        assert_eq!(lexer.next_token(), Token::Eof);
    }

    #[test]
    fn chars_adapter_streams_lines() {
        let input = std::io::Cursor::new("def f(x)\nx + 1\n");
        let collected: String = Chars::new(input).collect();
        assert_eq!(collected, "def f(x)\nx + 1\n");
    }
}
