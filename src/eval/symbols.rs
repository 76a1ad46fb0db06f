use strum::{Display, EnumString};

// Separators
pub const SPACE: char = ' ';
pub const TAB: char = '\t';

// Quotes
pub const SINGLE_QUOTE: char = '\'';
pub const DOUBLE_QUOTE: char = '"';

// Operator characters
pub const PIPE: char = '|';
pub const GREAT: char = '>';
pub const LESS: char = '<';

/// The operators understood by the pipeline parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum Operator {
    #[strum(serialize = "|")]
    Pipe,
    #[strum(serialize = ">")]
    Truncate,
    #[strum(serialize = ">>")]
    Append,
    #[strum(serialize = "<")]
    Input,
}

/// A single unit of input produced by the tokenizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    Operator(Operator),
}

impl Token {
    #[cfg(test)]
    pub fn word(text: &str) -> Self {
        Token::Word(text.to_owned())
    }
}
