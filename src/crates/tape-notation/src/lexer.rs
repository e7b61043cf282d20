use crate::span::Span;
use crate::token::{Token, DEFAULT_RANDOM_RANGE, RANDOM_RANGE_LIMIT};
use logos::Logos;

/// Shapes a single lexeme may take. A lexeme is only recognised when one of
/// these covers it completely.
#[derive(Logos, Debug, Clone, PartialEq)]
enum Lexeme {
    #[token("-")]
    Rest,

    #[regex(r"-\*[0-9]+", parse_count)]
    RestRun(usize),

    #[token("[")]
    Open,

    #[token("]")]
    Close,

    #[regex(r"\]\*[0-9]+", parse_repeat)]
    CloseRepeat(usize),

    #[token("?")]
    Random,

    #[regex(r"\?<[0-9]+-[0-9]+>")]
    RandomRange,

    #[regex(r"[+-]?[0-9]+")]
    Integer,
}

fn parse_count(lex: &mut logos::Lexer<Lexeme>) -> Option<usize> {
    lex.slice()[2..].parse().ok()
}

fn parse_repeat(lex: &mut logos::Lexer<Lexeme>) -> Option<usize> {
    parse_count(lex).filter(|&n| n > 0)
}

/// Read `?<min-max>`, falling back to the full default range when the bounds
/// are out of order or above 127.
fn random_range(text: &str) -> Token {
    let bounds = text
        .strip_prefix("?<")
        .and_then(|rest| rest.strip_suffix('>'))
        .and_then(|inner| inner.split_once('-'))
        .and_then(|(min, max)| Some((min.parse::<u32>().ok()?, max.parse::<u32>().ok()?)));

    let (min, max) = match bounds {
        Some((min, max)) if min < max && max <= RANDOM_RANGE_LIMIT => (min, max),
        _ => {
            tracing::debug!(lexeme = text, "random range out of bounds, using 1-127");
            DEFAULT_RANDOM_RANGE
        }
    };

    Token::RandomRange { min, max }
}

/// Classify one whitespace-free lexeme into exactly one token
pub fn classify(text: &str) -> Token {
    let unknown = || Token::Unknown(text.to_string());

    let mut inner = Lexeme::lexer(text);
    let lexeme = match inner.next() {
        Some(Ok(lexeme)) if inner.span() == (0..text.len()) => lexeme,
        _ => return unknown(),
    };

    match lexeme {
        Lexeme::Rest => Token::Rest(1),
        Lexeme::RestRun(n) => Token::Rest(n),
        Lexeme::Open => Token::GroupStart,
        Lexeme::Close => Token::GroupEnd,
        Lexeme::CloseRepeat(n) => Token::GroupEndRepeat(n),
        Lexeme::Random => Token::Random,
        Lexeme::RandomRange => random_range(text),
        Lexeme::Integer if text.parse::<i64>().is_ok() => Token::Note(text.to_string()),
        Lexeme::Integer => unknown(),
    }
}

/// Lexer over a preprocessed pattern, one token per whitespace-delimited lexeme
pub struct Lexer<'source> {
    source: &'source str,
    pos: usize,
    peeked: Option<Option<(Token, Span)>>,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Lexer {
            source,
            pos: 0,
            peeked: None,
        }
    }

    pub fn next_token(&mut self) -> Option<(Token, Span)> {
        if let Some(peeked) = self.peeked.take() {
            return peeked;
        }

        let rest = &self.source[self.pos..];
        let offset = rest.len() - rest.trim_start().len();
        let start = self.pos + offset;
        if start >= self.source.len() {
            self.pos = self.source.len();
            return None;
        }

        let len = self.source[start..]
            .find(char::is_whitespace)
            .unwrap_or(self.source.len() - start);
        let span = Span::new(start, start + len);
        self.pos = span.end;

        Some((classify(span.slice(self.source)), span))
    }

    pub fn peek_token(&mut self) -> Option<(Token, Span)> {
        if self.peeked.is_none() {
            self.peeked = Some(self.next_token());
        }
        self.peeked.as_ref().and_then(|x| x.clone())
    }

    pub fn source(&self) -> &'source str {
        self.source
    }

    pub fn slice(&self, span: Span) -> &'source str {
        span.slice(self.source)
    }
}

impl Iterator for Lexer<'_> {
    type Item = (Token, Span);

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenize a preprocessed pattern
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).map(|(token, _)| token).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(s: &str) -> Token {
        Token::Note(s.to_string())
    }

    #[test]
    fn test_lex_rests() {
        assert_eq!(tokenize("- -*3 -*0"), vec![Token::Rest(1), Token::Rest(3), Token::Rest(0)]);
    }

    #[test]
    fn test_lex_notes() {
        assert_eq!(tokenize("1 60 -5 +7"), vec![note("1"), note("60"), note("-5"), note("+7")]);
    }

    #[test]
    fn test_lex_groups() {
        assert_eq!(
            tokenize("[ 1 ] ]*4"),
            vec![Token::GroupStart, note("1"), Token::GroupEnd, Token::GroupEndRepeat(4)]
        );
    }

    #[test]
    fn test_lex_zero_repeat_is_unknown() {
        assert_eq!(tokenize("]*0"), vec![Token::Unknown("]*0".into())]);
    }

    #[test]
    fn test_lex_random() {
        assert_eq!(
            tokenize("? ?<60-72>"),
            vec![Token::Random, Token::RandomRange { min: 60, max: 72 }]
        );
    }

    #[test]
    fn test_lex_random_range_fallback() {
        let fallback = Token::RandomRange { min: 1, max: 127 };
        assert_eq!(tokenize("?<72-60>"), vec![fallback.clone()]);
        assert_eq!(tokenize("?<5-5>"), vec![fallback.clone()]);
        assert_eq!(tokenize("?<0-200>"), vec![fallback.clone()]);
        assert_eq!(tokenize("?<0-99999999999>"), vec![fallback]);
        assert_eq!(tokenize("?<0-127>"), vec![Token::RandomRange { min: 0, max: 127 }]);
    }

    #[test]
    fn test_lex_unknown_lexemes() {
        assert_eq!(
            tokenize("foo 1a [1 -*x 99999999999999999999"),
            vec![
                Token::Unknown("foo".into()),
                Token::Unknown("1a".into()),
                Token::Unknown("[1".into()),
                Token::Unknown("-*x".into()),
                Token::Unknown("99999999999999999999".into()),
            ]
        );
    }

    #[test]
    fn test_lex_never_merges_lexemes() {
        let input = "  1\t[\n2 ]*2  ";
        assert_eq!(tokenize(input).len(), input.split_whitespace().count());
    }

    #[test]
    fn test_lexer_spans() {
        let input = "1  [ foo";
        let mut lexer = Lexer::new(input);

        let (token, span) = lexer.next_token().unwrap();
        assert_eq!(token, note("1"));
        assert_eq!(lexer.slice(span), "1");

        let (token, span) = lexer.next_token().unwrap();
        assert_eq!(token, Token::GroupStart);
        assert_eq!(span, Span::new(3, 4));

        let (_, span) = lexer.next_token().unwrap();
        assert_eq!(lexer.slice(span), "foo");
        assert!(lexer.next_token().is_none());
    }

    #[test]
    fn test_lexer_peek() {
        let mut lexer = Lexer::new("[ 1");

        let (token, _) = lexer.peek_token().unwrap();
        assert_eq!(token, Token::GroupStart);

        // Peek again - should be same
        let (token, _) = lexer.peek_token().unwrap();
        assert_eq!(token, Token::GroupStart);

        let (token, _) = lexer.next_token().unwrap();
        assert_eq!(token, Token::GroupStart);

        let (token, _) = lexer.next_token().unwrap();
        assert_eq!(token, note("1"));
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n ").is_empty());
    }
}
