use std::str::FromStr;

use super::symbols::{
    Operator, Token, DOUBLE_QUOTE, GREAT, LESS, PIPE, SINGLE_QUOTE, SPACE, TAB,
};
use crate::errors::SyntaxError;

/// Splits a line into words and operator tokens.
/// Quotes group whitespace and operator characters into a single word; no escapes are processed.
pub fn tokenize(input: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut tokens = Vec::new();
    let mut curr_token = String::new();
    // A quoted empty string still produces a word, so emptiness alone does not decide
    let mut in_word = false;
    let mut quote: Option<char> = None;

    let mut characters = input.chars().peekable();
    while let Some(character) = characters.next() {
        if let Some(delimiter) = quote {
            if character == delimiter {
                quote = None;
            } else {
                curr_token.push(character);
            }
            continue;
        }

        match character {
            SINGLE_QUOTE | DOUBLE_QUOTE => {
                quote = Some(character);
                in_word = true;
            }
            SPACE | TAB => delimit_token(&mut tokens, &mut curr_token, &mut in_word),
            PIPE | GREAT | LESS => {
                delimit_token(&mut tokens, &mut curr_token, &mut in_word);

                let mut symbol = character.to_string();
                if character == GREAT && characters.peek() == Some(&GREAT) {
                    symbol.push(GREAT);
                    characters.next();
                }

                // Every symbol assembled here has an Operator spelling
                if let Ok(operator) = Operator::from_str(&symbol) {
                    tokens.push(Token::Operator(operator));
                }
            }
            _ => {
                curr_token.push(character);
                in_word = true;
            }
        }
    }

    if let Some(delimiter) = quote {
        return Err(SyntaxError::UnclosedQuote(delimiter));
    }

    delimit_token(&mut tokens, &mut curr_token, &mut in_word);
    Ok(tokens)
}

fn delimit_token(tokens: &mut Vec<Token>, curr_token: &mut String, in_word: &mut bool) {
    if *in_word {
        tokens.push(Token::Word(std::mem::take(curr_token)));
        *in_word = false;
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn words(tokens: &[Token]) -> Vec<String> {
        tokens
            .iter()
            .filter_map(|t| match t {
                Token::Word(w) => Some(w.clone()),
                Token::Operator(_) => None,
            })
            .collect()
    }

    #[test]
    fn return_correct_tokens_with_quoted_whitespace() {
        //given
        let input = r#"echo "a b" c"#;

        //when
        let tokens = tokenize(input).unwrap();

        //then
        let expected = vec![Token::word("echo"), Token::word("a b"), Token::word("c")];
        assert_eq!(tokens, expected);
    }

    #[test]
    fn return_error_on_unclosed_quote() {
        //given
        let input = r#"echo "abc"#;

        //when
        let result = tokenize(input);

        //then
        assert_eq!(result, Err(SyntaxError::UnclosedQuote('"')));
    }

    #[test]
    fn split_operators_adjacent_to_words() {
        //given
        let input = "cat<in.txt|sort>>out.txt";

        //when
        let tokens = tokenize(input).unwrap();

        //then
        let expected = vec![
            Token::word("cat"),
            Token::Operator(Operator::Input),
            Token::word("in.txt"),
            Token::Operator(Operator::Pipe),
            Token::word("sort"),
            Token::Operator(Operator::Append),
            Token::word("out.txt"),
        ];
        assert_eq!(tokens, expected);
    }

    #[test]
    fn keep_operators_inside_quotes_as_text() {
        //given
        let input = r#"echo 'a | b > c' "it's""#;

        //when
        let tokens = tokenize(input).unwrap();

        //then
        let expected = vec![
            Token::word("echo"),
            Token::word("a | b > c"),
            Token::word("it's"),
        ];
        assert_eq!(tokens, expected);
    }

    #[test]
    fn backslashes_are_not_escapes() {
        //given
        let input = r"echo 'a\nb' c\ d";

        //when
        let tokens = tokenize(input).unwrap();

        //then
        let expected = vec![
            Token::word("echo"),
            Token::word(r"a\nb"),
            Token::word(r"c\"),
            Token::word("d"),
        ];
        assert_eq!(tokens, expected);
    }

    #[test]
    fn empty_quotes_produce_an_empty_word() {
        let tokens = tokenize(r#"echo "" x"#).unwrap();
        assert_eq!(
            tokens,
            vec![Token::word("echo"), Token::word(""), Token::word("x")]
        );
    }

    #[test]
    fn quotes_join_with_surrounding_text() {
        let tokens = tokenize(r#"a"b c"d"#).unwrap();
        assert_eq!(tokens, vec![Token::word("ab cd")]);
    }

    #[test]
    fn blank_input_has_no_tokens() {
        assert!(tokenize(" \t  ").unwrap().is_empty());
    }

    #[rstest]
    #[case("ls -la /tmp")]
    #[case("echo hello   world\tagain")]
    #[case("cat file.txt | sort | uniq")]
    #[case("sort < in > out")]
    #[case("echo 'quoted' \"words\"")]
    fn rejoined_words_tokenize_the_same(#[case] input: &str) {
        let first = tokenize(input).unwrap();
        let joined = words(&first).join(" ");

        let second = tokenize(&joined).unwrap();

        assert_eq!(words(&first), words(&second));
    }
}
