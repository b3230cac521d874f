/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::error::SpecificationError;

/// <https://urlpattern.spec.whatwg.org/#tokenize>
///
/// Regular expression groups are outside the supported grammar: an opening parenthesis is a
/// tokenizing error.
pub(super) fn tokenize<'a>(
    input: &'a str,
    policy: TokenizePolicy,
    field: &'static str,
) -> Result<Vec<Token<'a>>, SpecificationError> {
    let mut tokenizer = Tokenizer {
        input,
        policy,
        field,
        index: 0,
        next_index: 0,
        token_list: vec![],
        code_point: char::MIN,
    };

    while tokenizer.index < tokenizer.input.len() {
        tokenizer.seek_and_get_the_next_code_point(tokenizer.index);

        match tokenizer.code_point {
            '*' => tokenizer.add_a_token_with_default_position_and_length(TokenType::Asterisk),
            '+' | '?' => {
                tokenizer.add_a_token_with_default_position_and_length(TokenType::OtherModifier)
            },
            '\\' => {
                if tokenizer.is_done() {
                    tokenizer.process_a_tokenizing_error(tokenizer.next_index, tokenizer.index)?;
                    continue;
                }

                let escaped_index = tokenizer.next_index;
                tokenizer.get_the_next_code_point();
                tokenizer.add_a_token_with_default_length(
                    TokenType::EscapedChar,
                    tokenizer.next_index,
                    escaped_index,
                );
            },
            '{' => tokenizer.add_a_token_with_default_position_and_length(TokenType::Open),
            '}' => tokenizer.add_a_token_with_default_position_and_length(TokenType::Close),
            ':' => {
                let name_start = tokenizer.next_index;
                let mut name_position = name_start;
                while name_position < tokenizer.input.len() {
                    tokenizer.seek_and_get_the_next_code_point(name_position);
                    let first_code_point = name_position == name_start;
                    if !is_a_valid_name_code_point(tokenizer.code_point, first_code_point) {
                        break;
                    }
                    name_position = tokenizer.next_index;
                }

                if name_position <= name_start {
                    tokenizer.process_a_tokenizing_error(name_start, tokenizer.index)?;
                    continue;
                }

                tokenizer.add_a_token_with_default_length(
                    TokenType::Name,
                    name_position,
                    name_start,
                );
            },
            '(' => {
                if tokenizer.policy == TokenizePolicy::Strict {
                    return Err(SpecificationError::RegexpGroup);
                }
                tokenizer.process_a_tokenizing_error(tokenizer.next_index, tokenizer.index)?;
            },
            _ => tokenizer.add_a_token_with_default_position_and_length(TokenType::Char),
        }
    }

    tokenizer.add_a_token_with_default_length(TokenType::End, tokenizer.index, tokenizer.index);
    Ok(tokenizer.token_list)
}

/// <https://urlpattern.spec.whatwg.org/#tokenizer>
struct Tokenizer<'a> {
    input: &'a str,

    policy: TokenizePolicy,

    /// Which pattern field is being tokenized, for error reporting.
    field: &'static str,

    /// Byte offset into `input`, always on a char boundary.
    index: usize,

    /// Byte offset just past `code_point`.
    next_index: usize,

    token_list: Vec<Token<'a>>,

    code_point: char,
}

/// <https://urlpattern.spec.whatwg.org/#token>
#[derive(Clone, Copy, Debug)]
pub(super) struct Token<'a> {
    /// Byte offset of the token in the tokenized input.
    pub(super) index: usize,

    /// For names this excludes the leading colon, for escaped chars the backslash.
    pub(super) value: &'a str,

    pub(super) token_type: TokenType,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum TokenType {
    /// `{`
    Open,

    /// `}`
    Close,

    /// `:name`
    Name,

    Char,

    /// `\` followed by any code point
    EscapedChar,

    /// `?` or `+`
    OtherModifier,

    /// `*`
    Asterisk,

    End,

    /// Only produced with [`TokenizePolicy::Lenient`].
    InvalidChar,
}

/// <https://urlpattern.spec.whatwg.org/#tokenize-policy>
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum TokenizePolicy {
    /// Fail on the first malformed token. Used when compiling a single field.
    Strict,

    /// Turn malformed tokens into [`TokenType::InvalidChar`]. Used when splitting a pattern
    /// string into its fields, where `:` is also the port separator.
    Lenient,
}

impl Tokenizer<'_> {
    fn is_done(&self) -> bool {
        self.input[self.next_index..].is_empty()
    }

    /// <https://urlpattern.spec.whatwg.org/#get-the-next-code-point>
    fn get_the_next_code_point(&mut self) {
        // Callers check `is_done` or compare against the input length first.
        self.code_point = self.input[self.next_index..]
            .chars()
            .next()
            .unwrap_or(char::MIN);
        self.next_index += self.code_point.len_utf8();
    }

    /// <https://urlpattern.spec.whatwg.org/#seek-and-get-the-next-code-point>
    fn seek_and_get_the_next_code_point(&mut self, index: usize) {
        self.next_index = index;
        self.get_the_next_code_point();
    }

    /// <https://urlpattern.spec.whatwg.org/#add-a-token>
    fn add_a_token(
        &mut self,
        token_type: TokenType,
        next_position: usize,
        value_position: usize,
        value_length: usize,
    ) {
        self.token_list.push(Token {
            token_type,
            index: self.index,
            value: &self.input[value_position..][..value_length],
        });
        self.index = next_position;
    }

    fn add_a_token_with_default_position_and_length(&mut self, token_type: TokenType) {
        self.add_a_token_with_default_length(token_type, self.next_index, self.index);
    }

    fn add_a_token_with_default_length(
        &mut self,
        token_type: TokenType,
        next_position: usize,
        value_position: usize,
    ) {
        let computed_length = next_position - value_position;
        self.add_a_token(token_type, next_position, value_position, computed_length);
    }

    /// <https://urlpattern.spec.whatwg.org/#process-a-tokenizing-error>
    fn process_a_tokenizing_error(
        &mut self,
        next_position: usize,
        value_position: usize,
    ) -> Result<(), SpecificationError> {
        if self.policy == TokenizePolicy::Strict {
            return Err(SpecificationError::Tokenize {
                field: self.field,
                position: value_position,
            });
        }

        self.add_a_token_with_default_length(TokenType::InvalidChar, next_position, value_position);
        Ok(())
    }
}

/// <https://urlpattern.spec.whatwg.org/#is-a-valid-name-code-point>
fn is_a_valid_name_code_point(code_point: char, first: bool) -> bool {
    if first {
        code_point.is_alphabetic() || code_point == '_' || code_point == '$'
    } else {
        code_point.is_alphanumeric() || code_point == '_' || code_point == '$'
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(input: &str, policy: TokenizePolicy) -> Vec<TokenType> {
        tokenize(input, policy, "hostname")
            .unwrap()
            .into_iter()
            .map(|token| token.token_type)
            .collect()
    }

    #[test]
    fn tokenizes_optional_group() {
        let tokens = tokenize("{:subdomain.}?example.com", TokenizePolicy::Strict, "hostname")
            .unwrap();
        assert_eq!(tokens[0].token_type, TokenType::Open);
        assert_eq!(tokens[1].token_type, TokenType::Name);
        assert_eq!(tokens[1].value, "subdomain");
        assert_eq!(tokens[1].index, 1);
        assert_eq!(tokens[2].value, ".");
        assert_eq!(tokens[3].token_type, TokenType::Close);
        assert_eq!(tokens[4].token_type, TokenType::OtherModifier);
        assert_eq!(tokens.last().unwrap().token_type, TokenType::End);
    }

    #[test]
    fn escaped_char_keeps_only_the_escaped_code_point() {
        let tokens = tokenize("\\:", TokenizePolicy::Strict, "hostname").unwrap();
        assert_eq!(tokens[0].token_type, TokenType::EscapedChar);
        assert_eq!(tokens[0].value, ":");
        assert_eq!(tokens[1].token_type, TokenType::End);
    }

    #[test]
    fn lone_colon_depends_on_policy() {
        assert_eq!(
            tokenize("a:80", TokenizePolicy::Strict, "hostname").unwrap_err(),
            SpecificationError::Tokenize {
                field: "hostname",
                position: 1
            }
        );
        assert_eq!(
            types("a:80", TokenizePolicy::Lenient),
            vec![
                TokenType::Char,
                TokenType::InvalidChar,
                TokenType::Char,
                TokenType::Char,
                TokenType::End,
            ]
        );
    }

    #[test]
    fn regexp_groups_are_rejected() {
        assert_eq!(
            tokenize(":id(\\d+)", TokenizePolicy::Strict, "port").unwrap_err(),
            SpecificationError::RegexpGroup
        );
        assert_eq!(
            types("(", TokenizePolicy::Lenient),
            vec![TokenType::InvalidChar, TokenType::End]
        );
    }
}
