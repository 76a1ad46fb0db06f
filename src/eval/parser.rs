use std::path::PathBuf;

use super::symbols::{Operator, Token};
use crate::errors::ParseError;

/// One stage of a pipeline: a command name, its arguments and its redirections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
    pub stdin_file: Option<PathBuf>,
    pub stdout_file: Option<PathBuf>,
    // * Only meaningful when stdout_file is set
    pub append: bool,
}

impl Command {
    #[cfg(test)]
    pub fn new(name: &str, args: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            args: args.iter().map(|a| a.to_string()).collect(),
            ..Self::default()
        }
    }

    fn push_word(&mut self, word: String) {
        if self.name.is_empty() {
            self.name = word;
        } else {
            self.args.push(word);
        }
    }
}

/// An ordered chain of commands produced from a single line of input
/// An empty pipeline comes from a blank line and runs nothing
pub type Pipeline = Vec<Command>;

/// Groups a token stream into pipeline stages, resolving pipe and redirection operators
pub fn parse(tokens: Vec<Token>) -> Result<Pipeline, ParseError> {
    let mut pipeline = Pipeline::new();
    let mut current = Command::default();
    let mut after_pipe = false;

    let mut tokens = tokens.into_iter();
    while let Some(token) = tokens.next() {
        match token {
            Token::Operator(Operator::Pipe) => {
                if current.name.is_empty() {
                    return Err(ParseError::EmptyCommandBeforePipe);
                }

                pipeline.push(std::mem::take(&mut current));
                after_pipe = true;
            }
            Token::Operator(operator) => {
                let Some(Token::Word(target)) = tokens.next() else {
                    return Err(ParseError::MissingRedirectTarget(operator));
                };

                if operator == Operator::Input {
                    current.stdin_file = Some(PathBuf::from(target));
                } else {
                    current.stdout_file = Some(PathBuf::from(target));
                    current.append = operator == Operator::Append;
                }
            }
            Token::Word(word) => current.push_word(word),
        }
    }

    if !current.name.is_empty() {
        pipeline.push(current);
    } else if after_pipe {
        return Err(ParseError::EmptyCommandAfterPipe);
    }

    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::tokenizer::tokenize;

    fn parse_line(line: &str) -> Result<Pipeline, ParseError> {
        parse(tokenize(line).unwrap())
    }

    #[test]
    fn single_word_is_a_single_command() {
        //given
        let line = "pwd";

        //when
        let pipeline = parse_line(line).unwrap();

        //then
        assert_eq!(pipeline, vec![Command::new("pwd", &[])]);
    }

    #[test]
    fn words_become_name_then_arguments() {
        let pipeline = parse_line("ls -la /tmp").unwrap();
        assert_eq!(pipeline, vec![Command::new("ls", &["-la", "/tmp"])]);
    }

    #[test]
    fn pipes_split_stages_in_order() {
        //given
        let line = "cat notes.txt | sort | uniq -c";

        //when
        let pipeline = parse_line(line).unwrap();

        //then
        let expected = vec![
            Command::new("cat", &["notes.txt"]),
            Command::new("sort", &[]),
            Command::new("uniq", &["-c"]),
        ];
        assert_eq!(pipeline, expected);
    }

    #[test]
    fn redirections_attach_to_their_stage() {
        //given
        let line = "sort < in.txt | uniq >> out.txt";

        //when
        let pipeline = parse_line(line).unwrap();

        //then
        let mut sort = Command::new("sort", &[]);
        sort.stdin_file = Some(PathBuf::from("in.txt"));
        let mut uniq = Command::new("uniq", &[]);
        uniq.stdout_file = Some(PathBuf::from("out.txt"));
        uniq.append = true;
        assert_eq!(pipeline, vec![sort, uniq]);
    }

    #[test]
    fn truncating_redirect_clears_append() {
        let pipeline = parse_line("echo a >> first > second").unwrap();
        assert_eq!(pipeline[0].stdout_file, Some(PathBuf::from("second")));
        assert!(!pipeline[0].append);
    }

    #[test]
    fn redirect_may_precede_the_name() {
        let pipeline = parse_line("> out.txt echo hi").unwrap();
        let mut expected = Command::new("echo", &["hi"]);
        expected.stdout_file = Some(PathBuf::from("out.txt"));
        assert_eq!(pipeline, vec![expected]);
    }

    #[test]
    fn leading_pipe_is_an_error() {
        assert_eq!(parse_line("| ls"), Err(ParseError::EmptyCommandBeforePipe));
    }

    #[test]
    fn double_pipe_is_an_error() {
        assert_eq!(
            parse_line("ls | | wc"),
            Err(ParseError::EmptyCommandBeforePipe)
        );
    }

    #[test]
    fn trailing_pipe_is_an_error() {
        assert_eq!(parse_line("ls |"), Err(ParseError::EmptyCommandAfterPipe));
    }

    #[test]
    fn missing_redirect_target_is_an_error() {
        assert_eq!(
            parse_line("echo hi >"),
            Err(ParseError::MissingRedirectTarget(Operator::Truncate))
        );
        assert_eq!(
            parse_line("sort <"),
            Err(ParseError::MissingRedirectTarget(Operator::Input))
        );
        assert_eq!(
            parse_line("echo hi >> | cat"),
            Err(ParseError::MissingRedirectTarget(Operator::Append))
        );
    }

    #[test]
    fn blank_line_is_an_empty_pipeline() {
        assert_eq!(parse_line("   "), Ok(Vec::new()));
    }

    #[test]
    fn redirect_without_a_command_is_dropped() {
        assert_eq!(parse_line("> out.txt"), Ok(Vec::new()));
    }

    #[test]
    fn error_message_names_the_operator() {
        let error = parse_line("ls >").unwrap_err();
        assert_eq!(
            error.to_string(),
            "missing filename after redirection operator `>`"
        );
    }
}
