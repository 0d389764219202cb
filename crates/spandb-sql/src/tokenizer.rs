//! Tokenizer for DDL statement text.
//!
//! Produces a flat token list: bare and backtick-quoted identifiers,
//! keywords, integer literals, and the punctuation the DDL grammar uses.
//! `--` line comments are skipped.

use spandb_commons::{Result, SchemaError};

pub fn tokenize(input: &str) -> Result<Vec<String>> {
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut it = input.chars().peekable();

    while let Some(ch) = it.next() {
        match ch {
            '`' => {
                if !current.is_empty() {
                    return Err(SchemaError::ddl_parse(
                        "quote (`) cannot start in the middle of a token",
                    ));
                }
                let mut quoted = String::new();
                let mut closed = false;
                for qc in it.by_ref() {
                    if qc == '`' {
                        closed = true;
                        break;
                    }
                    quoted.push(qc);
                }
                if !closed {
                    return Err(SchemaError::ddl_parse("unclosed quote (`) in statement"));
                }
                if quoted.is_empty() {
                    return Err(SchemaError::ddl_parse("empty quoted identifier"));
                }
                tokens.push(quoted);
            }

            '-' if it.peek() == Some(&'-') => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                // Line comment runs to the end of the line.
                for cc in it.by_ref() {
                    if cc == '\n' {
                        break;
                    }
                }
            }

            c if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }

            '(' | ')' | ',' | '<' | '>' | '=' | ';' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(ch.to_string());
            }

            c if c.is_ascii_alphanumeric() || c == '_' => {
                current.push(c);
            }

            other => {
                return Err(SchemaError::ddl_parse(format!(
                    "unexpected character {:?} in statement",
                    other
                )));
            }
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    Ok(tokens)
}
