use std::fmt::Display;
use std::rc::Rc;

use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    Number,
    Identifier,
    String,
    HostCode,
    InfixCall,

    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    Assign,
    Comma,
    Dot,
    Arrow,

    // Keywords
    If,
    Then,
    Else,
    End,
    Function,
    While,
    Do,
    Include,
    Data,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: Rc<str>,
    pub position: usize,
}

#[derive(Debug, PartialEq, Eq, Clone, Error)]
#[error("Illegal character {character:?} @ {position}")]
pub struct LexError {
    pub character: char,
    pub position: usize,
}

enum Pattern {
    Literal(&'static str),
    Keyword(&'static str),
    Scan(fn(&str) -> Option<usize>),
}

impl Pattern {
    /// Returns the length of the match at the start of the input, if any.
    fn matches(&self, input: &str) -> Option<usize> {
        match self {
            Pattern::Literal(expected) => input.starts_with(expected).then_some(expected.len()),
            Pattern::Keyword(keyword) => {
                let prefix = input.get(..keyword.len())?;
                prefix
                    .eq_ignore_ascii_case(keyword)
                    .then_some(keyword.len())
            }
            Pattern::Scan(scan) => scan(input),
        }
    }
}

/// Token patterns in priority order. The first pattern matching at the current
/// position wins, even when a later one would match a longer slice, so the
/// keywords have to come before `identifier`. A `None` kind is matched and
/// then dropped.
const PATTERNS: &[(Pattern, Option<TokenKind>)] = &[
    (Pattern::Scan(whitespace), None),
    (Pattern::Scan(comment), None),
    (Pattern::Literal("("), Some(TokenKind::LParen)),
    (Pattern::Literal(")"), Some(TokenKind::RParen)),
    (Pattern::Literal("["), Some(TokenKind::LBracket)),
    (Pattern::Literal("]"), Some(TokenKind::RBracket)),
    (Pattern::Literal("="), Some(TokenKind::Assign)),
    (Pattern::Literal(","), Some(TokenKind::Comma)),
    (Pattern::Literal("."), Some(TokenKind::Dot)),
    (Pattern::Literal("->"), Some(TokenKind::Arrow)),
    (Pattern::Scan(number), Some(TokenKind::Number)),
    (Pattern::Keyword("if"), Some(TokenKind::If)),
    (Pattern::Keyword("then"), Some(TokenKind::Then)),
    (Pattern::Keyword("else"), Some(TokenKind::Else)),
    (Pattern::Keyword("end"), Some(TokenKind::End)),
    (Pattern::Keyword("fun"), Some(TokenKind::Function)),
    (Pattern::Keyword("while"), Some(TokenKind::While)),
    (Pattern::Keyword("do"), Some(TokenKind::Do)),
    (Pattern::Keyword("include"), Some(TokenKind::Include)),
    (Pattern::Keyword("data"), Some(TokenKind::Data)),
    (Pattern::Scan(string), Some(TokenKind::String)),
    (Pattern::Scan(infix_call), Some(TokenKind::InfixCall)),
    (Pattern::Scan(host_code), Some(TokenKind::HostCode)),
    (Pattern::Scan(identifier), Some(TokenKind::Identifier)),
];

fn is_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn span_while(input: &str, predicate: impl Fn(char) -> bool) -> usize {
    input
        .char_indices()
        .find(|(_, ch)| !predicate(*ch))
        .map(|(idx, _)| idx)
        .unwrap_or(input.len())
}

fn non_empty(len: usize) -> Option<usize> {
    (len > 0).then_some(len)
}

fn whitespace(input: &str) -> Option<usize> {
    non_empty(span_while(input, |ch| matches!(ch, ' ' | '\t' | '\r' | '\n')))
}

fn comment(input: &str) -> Option<usize> {
    let rest = input.strip_prefix('#')?;
    Some(1 + span_while(rest, |ch| ch != '\n'))
}

fn number(input: &str) -> Option<usize> {
    let sign = usize::from(input.starts_with(['+', '-']));
    let digits = span_while(&input[sign..], |ch| ch.is_ascii_digit());
    non_empty(digits).map(|digits| sign + digits)
}

fn delimited(input: &str, open: char, close: char, allowed: impl Fn(char) -> bool) -> Option<usize> {
    let rest = input.strip_prefix(open)?;
    let body = span_while(rest, |ch| ch != close && allowed(ch));
    rest[body..]
        .starts_with(close)
        .then_some(1 + body + close.len_utf8())
}

fn string(input: &str) -> Option<usize> {
    delimited(input, '"', '"', |ch| ch != '\n')
}

fn host_code(input: &str) -> Option<usize> {
    delimited(input, '{', '}', |_| true)
}

fn identifier(input: &str) -> Option<usize> {
    let first = input.chars().next()?;
    if !is_letter(first) {
        return None;
    }
    Some(first.len_utf8() + span_while(&input[first.len_utf8()..], is_identifier_char))
}

fn infix_call(input: &str) -> Option<usize> {
    let rest = input.strip_prefix('`')?;
    let name = identifier(rest)?;
    rest[name..].starts_with('`').then_some(name + 2)
}

/// Lazily splits source text into tokens.
///
/// Every call to [`Tokenizer::new`] starts over from the beginning of the
/// input. The first [`LexError`] ends the stream.
#[derive(Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    position: usize,
    failed: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            failed: false,
        }
    }

    fn match_at(&self, rest: &str) -> Option<(usize, Option<TokenKind>)> {
        PATTERNS
            .iter()
            .find_map(|(pattern, kind)| pattern.matches(rest).map(|len| (len, *kind)))
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.failed && self.position < self.input.len() {
            let rest = &self.input[self.position..];
            let Some((len, kind)) = self.match_at(rest) else {
                self.failed = true;
                return Some(Err(LexError {
                    character: rest.chars().next().unwrap_or_default(),
                    position: self.position,
                }));
            };

            let start = self.position;
            self.position += len;
            if let Some(kind) = kind {
                return Some(Ok(Token {
                    kind,
                    text: rest[..len].into(),
                    position: start,
                }));
            }
        }
        None
    }
}

impl std::iter::FusedIterator for Tokenizer<'_> {}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use TokenKind::*;
        let name = match self {
            Number => "number",
            Identifier => "identifier",
            String => "string",
            HostCode => "host code",
            InfixCall => "infix call",
            LParen => "`(`",
            RParen => "`)`",
            LBracket => "`[`",
            RBracket => "`]`",
            Assign => "`=`",
            Comma => "`,`",
            Dot => "`.`",
            Arrow => "`->`",
            If => "`if`",
            Then => "`then`",
            Else => "`else`",
            End => "`end`",
            Function => "`fun`",
            While => "`while`",
            Do => "`do`",
            Include => "`include`",
            Data => "`data`",
        };
        write!(f, "{}", name)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:?} @ {}", self.kind, self.text, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Tokenizer::new(input)
            .map(|token| token.unwrap().kind)
            .collect()
    }

    #[test]
    fn test_punctuation() {
        let output = Tokenizer::new("()[]=,.->")
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(
            output,
            vec![
                Token {
                    kind: TokenKind::LParen,
                    text: "(".into(),
                    position: 0
                },
                Token {
                    kind: TokenKind::RParen,
                    text: ")".into(),
                    position: 1
                },
                Token {
                    kind: TokenKind::LBracket,
                    text: "[".into(),
                    position: 2
                },
                Token {
                    kind: TokenKind::RBracket,
                    text: "]".into(),
                    position: 3
                },
                Token {
                    kind: TokenKind::Assign,
                    text: "=".into(),
                    position: 4
                },
                Token {
                    kind: TokenKind::Comma,
                    text: ",".into(),
                    position: 5
                },
                Token {
                    kind: TokenKind::Dot,
                    text: ".".into(),
                    position: 6
                },
                Token {
                    kind: TokenKind::Arrow,
                    text: "->".into(),
                    position: 7
                },
            ]
        );
    }

    #[test]
    fn test_program() {
        let input = "
    # comment until the end of the line
    factorial = fun (n)
      if n `gt` 1 then
        n `mul` factorial(n `sub` 1)
      else
        1
      end
    end
    print({add}(2, -3), \"text\")
    ";
        let expected_output = vec![
            TokenKind::Identifier,
            TokenKind::Assign,
            TokenKind::Function,
            TokenKind::LParen,
            TokenKind::Identifier,
            TokenKind::RParen,
            TokenKind::If,
            TokenKind::Identifier,
            TokenKind::InfixCall,
            TokenKind::Number,
            TokenKind::Then,
            TokenKind::Identifier,
            TokenKind::InfixCall,
            TokenKind::Identifier,
            TokenKind::LParen,
            TokenKind::Identifier,
            TokenKind::InfixCall,
            TokenKind::Number,
            TokenKind::RParen,
            TokenKind::Else,
            TokenKind::Number,
            TokenKind::End,
            TokenKind::End,
            TokenKind::Identifier,
            TokenKind::LParen,
            TokenKind::HostCode,
            TokenKind::LParen,
            TokenKind::Number,
            TokenKind::Comma,
            TokenKind::Number,
            TokenKind::RParen,
            TokenKind::Comma,
            TokenKind::String,
            TokenKind::RParen,
        ];

        assert_eq!(kinds(input), expected_output);
    }

    #[test]
    fn test_record_and_list() {
        assert_eq!(
            kinds("p = data x -> 1 y -> [1, 2] end p.x"),
            vec![
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Data,
                TokenKind::Identifier,
                TokenKind::Arrow,
                TokenKind::Number,
                TokenKind::Identifier,
                TokenKind::Arrow,
                TokenKind::LBracket,
                TokenKind::Number,
                TokenKind::Comma,
                TokenKind::Number,
                TokenKind::RBracket,
                TokenKind::End,
                TokenKind::Identifier,
                TokenKind::Dot,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_token_text_keeps_delimiters() {
        let texts = Tokenizer::new("\"hi there\" `add` { mul } +42")
            .map(|token| token.unwrap().text)
            .collect::<Vec<_>>();

        assert_eq!(
            texts,
            vec![
                Rc::from("\"hi there\""),
                Rc::from("`add`"),
                Rc::from("{ mul }"),
                Rc::from("+42"),
            ]
        );
    }

    #[test]
    fn test_keywords_win_over_identifiers() {
        // `iffy` is `if` followed by `fy` because keywords are tried first.
        let tokens = Tokenizer::new("iffy END")
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(
            tokens,
            vec![
                Token {
                    kind: TokenKind::If,
                    text: "if".into(),
                    position: 0
                },
                Token {
                    kind: TokenKind::Identifier,
                    text: "fy".into(),
                    position: 2
                },
                Token {
                    kind: TokenKind::End,
                    text: "END".into(),
                    position: 5
                },
            ]
        );
    }

    #[test]
    fn test_illegal_character() {
        let mut tokenizer = Tokenizer::new("a = 1 ; b");

        assert_eq!(tokenizer.next().unwrap().unwrap().kind, TokenKind::Identifier);
        assert_eq!(tokenizer.next().unwrap().unwrap().kind, TokenKind::Assign);
        assert_eq!(tokenizer.next().unwrap().unwrap().kind, TokenKind::Number);
        assert_eq!(
            tokenizer.next(),
            Some(Err(LexError {
                character: ';',
                position: 6
            }))
        );
        assert_eq!(tokenizer.next(), None);
    }

    #[test]
    fn test_unterminated_delimiters() {
        for input in ["\"open", "\"line\nbreak\"", "{never closed", "`half"] {
            let result = Tokenizer::new(input).collect::<Result<Vec<_>, _>>();
            assert!(result.is_err(), "{input:?} should not tokenize");
        }
    }

    #[test]
    fn test_restartable() {
        let input = "a `add` b";
        let first = Tokenizer::new(input).collect::<Vec<_>>();
        let second = Tokenizer::new(input).collect::<Vec<_>>();
        assert_eq!(first, second);
    }

    mod reassembly {
        use super::super::Tokenizer;
        use proptest::prelude::*;

        fn fragment() -> impl Strategy<Value = String> {
            prop_oneof![
                Just("(".to_owned()),
                Just(")".to_owned()),
                Just("[".to_owned()),
                Just("]".to_owned()),
                Just("=".to_owned()),
                Just(",".to_owned()),
                Just(".".to_owned()),
                Just("->".to_owned()),
                Just("if".to_owned()),
                Just("end".to_owned()),
                Just("data".to_owned()),
                "[+-]?[0-9]{1,5}",
                "[A-Za-z_][A-Za-z0-9_]{0,6}",
                "\"[a-z ]{0,6}\"",
                "`[a-z_][a-z0-9_]{0,4}`",
                "\\{[a-z .]{0,6}\\}",
            ]
        }

        fn separator() -> impl Strategy<Value = String> {
            prop_oneof![
                Just(" ".to_owned()),
                Just("\n".to_owned()),
                Just("\t".to_owned()),
                "#[a-z ]{0,8}\n",
            ]
        }

        proptest! {
            #[test]
            fn token_texts_reproduce_source(
                parts in proptest::collection::vec((fragment(), separator()), 0..32)
            ) {
                let source: String = parts
                    .iter()
                    .map(|(fragment, separator)| format!("{fragment}{separator}"))
                    .collect();
                let expected: String = parts
                    .iter()
                    .map(|(fragment, _)| fragment.as_str())
                    .collect();

                let tokens = Tokenizer::new(&source).collect::<Result<Vec<_>, _>>();
                prop_assert!(tokens.is_ok(), "failed to tokenize {:?}", source);
                let tokens = tokens.unwrap();

                let reassembled: String = tokens.iter().map(|token| token.text.as_ref()).collect();
                prop_assert_eq!(reassembled, expected);

                let positions: Vec<usize> = tokens.iter().map(|token| token.position).collect();
                let mut sorted = positions.clone();
                sorted.sort();
                prop_assert_eq!(positions, sorted);
            }
        }
    }
}
