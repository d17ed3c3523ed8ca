use std::iter::Peekable;
use std::str::Chars;

use crate::shell::command::{ControlOp, StdStream};

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Word(String),
    Redirect(StdStream),
    Control(ControlOp),
    UnterminatedQuote(char),
    EOF,
}

pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.chars().peekable(),
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        match self.peek_char() {
            None => Token::EOF,
            Some(c) => match c {
                '|' => {
                    self.read_char();
                    if self.peek_char() == Some('|') {
                        self.read_char();
                        Token::Control(ControlOp::Or)
                    } else {
                        Token::Control(ControlOp::Pipe)
                    }
                }
                '&' => {
                    self.read_char();
                    if self.peek_char() == Some('&') {
                        self.read_char();
                        Token::Control(ControlOp::And)
                    } else {
                        Token::Control(ControlOp::Background)
                    }
                }
                ';' => {
                    self.read_char();
                    Token::Control(ControlOp::Sequence)
                }
                '<' => {
                    self.read_char();
                    Token::Redirect(StdStream::Stdin)
                }
                '>' => {
                    self.read_char();
                    Token::Redirect(StdStream::Stdout)
                }
                _ => self.read_word(),
            },
        }
    }

    fn read_char(&mut self) -> Option<char> {
        self.input.next()
    }

    fn peek_char(&mut self) -> Option<char> {
        self.input.peek().copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if !c.is_whitespace() {
                break;
            }
            self.read_char();
        }
    }

    // 引号可以出现在单词中间，如 a"b c"d => `ab cd`
    fn read_word(&mut self) -> Token {
        let mut word = String::new();
        let mut quoted = false;

        while let Some(c) = self.peek_char() {
            if c.is_whitespace() || ";<>|&".contains(c) {
                break;
            }
            self.read_char();
            match c {
                '"' | '\'' => {
                    quoted = true;
                    if !self.read_quoted(c, &mut word) {
                        return Token::UnterminatedQuote(c);
                    }
                }
                '\\' => {
                    if let Some(escaped) = self.read_char() {
                        word.push(escaped);
                    }
                }
                _ => word.push(c),
            }
        }

        // 2> 只有在 `2` 是一个独立的未加引号单词时才是重定向
        if !quoted && word == "2" && self.peek_char() == Some('>') {
            self.read_char();
            return Token::Redirect(StdStream::Stderr);
        }

        Token::Word(word)
    }

    fn read_quoted(&mut self, quote: char, word: &mut String) -> bool {
        let mut escaped = false;

        while let Some(c) = self.read_char() {
            match (escaped, c) {
                (true, _) => {
                    word.push(c);
                    escaped = false;
                }
                (false, '\\') if quote == '"' => escaped = true,
                (false, c) if c == quote => return true,
                (false, c) => word.push(c),
            }
        }
        false
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        match self.next_token() {
            Token::EOF => None,
            token => Some(token),
        }
    }
}
