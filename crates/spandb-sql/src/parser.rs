//! Recursive-descent DDL parser.
//!
//! Entry point is [`parse_ddl_statement`]; each statement family lives in its
//! own submodule and works over the shared token cursor.

mod alter;
mod common;
mod create;
mod drop;

use crate::ast::DdlStatement;
use crate::tokenizer::tokenize;
use common::Tokens;
use spandb_commons::{Result, SchemaError};

/// Parses the text of a single DDL statement.
pub fn parse_ddl_statement(statement: &str) -> Result<DdlStatement> {
    let mut tokens = tokenize(statement)?;
    while tokens.last().map(String::as_str) == Some(";") {
        tokens.pop();
    }
    if tokens.is_empty() {
        return Err(SchemaError::ddl_parse("statement contains no tokens"));
    }

    let mut cursor = Tokens::new(&tokens);
    let parsed = if cursor.peek_keyword("CREATE") {
        create::parse_create(&mut cursor)?
    } else if cursor.peek_keyword("ALTER") {
        alter::parse_alter(&mut cursor)?
    } else if cursor.peek_keyword("DROP") {
        drop::parse_drop(&mut cursor)?
    } else {
        return Err(SchemaError::ddl_parse(format!(
            "unsupported statement starting with {}",
            cursor.peek().unwrap_or("")
        )));
    };
    cursor.expect_end()?;
    Ok(parsed)
}
