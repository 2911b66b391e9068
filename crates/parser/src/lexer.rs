use core::ops::Range;

use logos::Logos;

/// Raw token classes of relation and list files.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Any run of non-whitespace characters.
    #[regex(r"[^ \t\r\n]+")]
    Label,

    #[regex(r"\r?\n")]
    Newline,

    #[regex(r"[ \t\r]+")]
    Whitespace,
}

/// A token together with the source text it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Range<usize>,
}

/// Splits `input` into tokens, whitespace and newlines included.
///
/// # Errors
///
/// Returns the byte span of the first input the lexer cannot classify.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, Range<usize>> {
    let mut lexer = TokenKind::lexer(input);
    let mut tokens = Vec::new();
    while let Some(kind) = lexer.next() {
        let span = lexer.span();
        let kind = kind.map_err(|()| span.clone())?;
        tokens.push(Token {
            kind,
            text: lexer.slice(),
            span,
        });
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .expect("should tokenize")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_labels_and_separators() {
        use TokenKind::{Label, Newline, Whitespace};
        assert_eq!(
            kinds("a b\nc\td\r\n"),
            vec![Label, Whitespace, Label, Newline, Label, Whitespace, Label, Newline]
        );
    }

    #[test]
    fn test_label_text_and_span() {
        let tokens = tokenize("  exec_0.txt\n").expect("should tokenize");
        assert_eq!(tokens[1].kind, TokenKind::Label);
        assert_eq!(tokens[1].text, "exec_0.txt");
        assert_eq!(tokens[1].span, 2..12);
    }

    #[test]
    fn test_punctuation_is_part_of_label() {
        let tokens = tokenize("P0:st[x]->P1:ld(x)").expect("should tokenize");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "P0:st[x]->P1:ld(x)");
    }

    #[test]
    fn test_empty_input() {
        assert!(kinds("").is_empty());
    }
}
