use thiserror::Error;

use super::lexer::{Lexer, Token};
use crate::shell::command::{CommandLine, CommandNode, ControlOp, Redirection, StdStream};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("syntax error near `{0}`: missing command")]
    EmptyCommand(&'static str),
    #[error("syntax error: expected filename after `{0}`")]
    MissingRedirectTarget(&'static str),
    #[error("syntax error: line ends with `{0}`")]
    DanglingOperator(&'static str),
    #[error("syntax error: unterminated {0} quote")]
    UnterminatedQuote(char),
}

fn control_symbol(op: ControlOp) -> &'static str {
    match op {
        ControlOp::None => "",
        ControlOp::Pipe => "|",
        ControlOp::Sequence => ";",
        ControlOp::Background => "&",
        ControlOp::And => "&&",
        ControlOp::Or => "||",
    }
}

fn redirect_symbol(target: StdStream) -> &'static str {
    match target {
        StdStream::Stdin => "<",
        StdStream::Stdout => ">",
        StdStream::Stderr => "2>",
    }
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current_token: Token,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token();
        Parser {
            lexer,
            current_token,
        }
    }

    fn next_token(&mut self) {
        self.current_token = self.lexer.next_token();
    }

    // 空行返回 Ok(None)
    pub fn parse(&mut self) -> Result<Option<CommandLine>, ParseError> {
        let mut line = CommandLine::new();
        let mut current = CommandNode::default();

        loop {
            match std::mem::replace(&mut self.current_token, Token::EOF) {
                Token::EOF => break,
                Token::UnterminatedQuote(quote) => {
                    return Err(ParseError::UnterminatedQuote(quote));
                }
                Token::Word(word) => {
                    current.arguments.push(word);
                    self.next_token();
                }
                Token::Redirect(target) => {
                    let redirection = self.parse_redirection(target)?;
                    current.redirections.push(redirection);
                }
                Token::Control(op) => {
                    if current.arguments.is_empty() {
                        return Err(ParseError::EmptyCommand(control_symbol(op)));
                    }
                    current.op = op;
                    line.push(std::mem::take(&mut current));
                    self.next_token();
                }
            }
        }

        if !current.arguments.is_empty() {
            line.push(current);
        } else if !current.redirections.is_empty() {
            return Err(ParseError::EmptyCommand(redirect_symbol(
                current.redirections[0].target,
            )));
        }

        let Some(last) = line.last_mut() else {
            return Ok(None);
        };
        match last.op {
            ControlOp::Pipe | ControlOp::And | ControlOp::Or => {
                return Err(ParseError::DanglingOperator(control_symbol(last.op)));
            }
            // 末尾的 `;` 等同于行尾
            ControlOp::Sequence => last.op = ControlOp::None,
            ControlOp::None | ControlOp::Background => {}
        }
        Ok(Some(line))
    }

    fn parse_redirection(&mut self, target: StdStream) -> Result<Redirection, ParseError> {
        self.next_token(); // 跳过重定向操作符

        match &self.current_token {
            Token::Word(filename) => {
                let redirection = Redirection {
                    target,
                    filename: filename.clone(),
                };
                self.next_token();
                Ok(redirection)
            }
            Token::UnterminatedQuote(quote) => Err(ParseError::UnterminatedQuote(*quote)),
            _ => Err(ParseError::MissingRedirectTarget(redirect_symbol(target))),
        }
    }
}
