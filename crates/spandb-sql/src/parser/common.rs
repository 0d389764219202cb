//! Token cursor and grammar pieces shared by the statement parsers.

use crate::ast::{ColumnDef, ColumnOptions, ForeignKeyClause, KeyPart, OnDeleteAction};
use spandb_commons::validation::validate_schema_identifier;
use spandb_commons::{Result, ScalarType, SchemaError};

/// Cursor over the token list of one statement.
pub(crate) struct Tokens<'a> {
    tokens: &'a [String],
    pos: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(tokens: &'a [String]) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    pub fn peek_keyword(&self, keyword: &str) -> bool {
        self.peek()
            .map(|t| t.eq_ignore_ascii_case(keyword))
            .unwrap_or(false)
    }

    pub fn next(&mut self) -> Result<&'a str> {
        let token = self
            .peek()
            .ok_or_else(|| SchemaError::ddl_parse("unexpected end of statement"))?;
        self.pos += 1;
        Ok(token)
    }

    /// Consumes the next token if it matches `keyword` (case-insensitive).
    pub fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.error(format!("expected {}", keyword)))
        }
    }

    pub fn eat_punct(&mut self, punct: &str) -> bool {
        if self.peek() == Some(punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn expect_punct(&mut self, punct: &str) -> Result<()> {
        if self.eat_punct(punct) {
            Ok(())
        } else {
            Err(self.error(format!("expected {:?}", punct)))
        }
    }

    /// Consumes the next token as a schema identifier.
    pub fn identifier(&mut self) -> Result<String> {
        let token = self.next()?;
        validate_schema_identifier(token)?;
        Ok(token.to_string())
    }

    pub fn integer(&mut self) -> Result<i64> {
        let token = self.next()?;
        token
            .parse::<i64>()
            .map_err(|_| SchemaError::ddl_parse(format!("expected an integer, got {}", token)))
    }

    pub fn expect_end(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(SchemaError::ddl_parse(format!(
                "unexpected trailing token {}",
                token
            ))),
        }
    }

    pub fn error(&self, msg: impl Into<String>) -> SchemaError {
        match self.peek() {
            Some(token) => SchemaError::ddl_parse(format!("{}, got {}", msg.into(), token)),
            None => SchemaError::ddl_parse(format!("{} at end of statement", msg.into())),
        }
    }
}

/// Parses `name TYPE [NOT NULL] [OPTIONS (...)]`.
pub(crate) fn parse_column_def(t: &mut Tokens) -> Result<ColumnDef> {
    let column_name = t.identifier()?;
    let (column_type, max_length) = parse_column_type(t)?;
    let mut not_null = false;
    if t.eat_keyword("NOT") {
        t.expect_keyword("NULL")?;
        not_null = true;
    }
    let options = if t.eat_keyword("OPTIONS") {
        Some(parse_column_options(t)?)
    } else {
        None
    };
    Ok(ColumnDef {
        column_name,
        column_type,
        not_null,
        max_length,
        options,
    })
}

fn parse_column_type(t: &mut Tokens) -> Result<(ScalarType, Option<i64>)> {
    if t.eat_keyword("ARRAY") {
        t.expect_punct("<")?;
        let (element, max_length) = parse_column_type(t)?;
        if matches!(element, ScalarType::Array(_)) {
            return Err(SchemaError::ddl_parse("arrays of arrays are not supported"));
        }
        t.expect_punct(">")?;
        return Ok((ScalarType::Array(Box::new(element)), max_length));
    }

    let token = t.next()?;
    let scalar = match token.to_ascii_uppercase().as_str() {
        "INT64" => ScalarType::Int64,
        "FLOAT64" => ScalarType::Float64,
        "BOOL" => ScalarType::Bool,
        "DATE" => ScalarType::Date,
        "TIMESTAMP" => ScalarType::Timestamp,
        "STRING" => ScalarType::String,
        "BYTES" => ScalarType::Bytes,
        other => {
            return Err(SchemaError::ddl_parse(format!(
                "unknown column type {}",
                other
            )))
        }
    };

    // STRING and BYTES carry a mandatory length clause.
    let mut max_length = None;
    if matches!(scalar, ScalarType::String | ScalarType::Bytes) {
        t.expect_punct("(")?;
        if !t.eat_keyword("MAX") {
            max_length = Some(t.integer()?);
        }
        t.expect_punct(")")?;
    }
    Ok((scalar, max_length))
}

fn parse_column_options(t: &mut Tokens) -> Result<ColumnOptions> {
    t.expect_punct("(")?;
    let mut allow_commit_timestamp = None;
    loop {
        let name = t.next()?;
        if !name.eq_ignore_ascii_case("allow_commit_timestamp") {
            return Err(SchemaError::ddl_parse(format!(
                "unknown column option {}",
                name
            )));
        }
        t.expect_punct("=")?;
        let value = t.next()?;
        allow_commit_timestamp = match value.to_ascii_uppercase().as_str() {
            "TRUE" => Some(true),
            "FALSE" => Some(false),
            "NULL" => None,
            other => {
                return Err(SchemaError::ddl_parse(format!(
                    "allow_commit_timestamp must be true, false or null, got {}",
                    other
                )))
            }
        };
        if !t.eat_punct(",") {
            break;
        }
    }
    t.expect_punct(")")?;
    Ok(ColumnOptions {
        allow_commit_timestamp,
    })
}

/// Parses `( column [ASC|DESC], ... )`. An empty list parses; the updater's
/// validation rejects key-less tables.
pub(crate) fn parse_key_parts(t: &mut Tokens) -> Result<Vec<KeyPart>> {
    t.expect_punct("(")?;
    let mut parts = Vec::new();
    if t.eat_punct(")") {
        return Ok(parts);
    }
    loop {
        let column_name = t.identifier()?;
        let mut descending = false;
        if t.eat_keyword("DESC") {
            descending = true;
        } else {
            t.eat_keyword("ASC");
        }
        parts.push(KeyPart {
            column_name,
            descending,
        });
        if !t.eat_punct(",") {
            break;
        }
    }
    t.expect_punct(")")?;
    Ok(parts)
}

/// Parses `( ident, ... )` with at least one entry.
pub(crate) fn parse_identifier_list(t: &mut Tokens) -> Result<Vec<String>> {
    t.expect_punct("(")?;
    let mut names = Vec::new();
    loop {
        names.push(t.identifier()?);
        if !t.eat_punct(",") {
            break;
        }
    }
    t.expect_punct(")")?;
    Ok(names)
}

/// Parses the remainder of a foreign key clause after `FOREIGN KEY`.
pub(crate) fn parse_foreign_key_tail(
    t: &mut Tokens,
    constraint_name: Option<String>,
) -> Result<ForeignKeyClause> {
    let referencing_columns = parse_identifier_list(t)?;
    t.expect_keyword("REFERENCES")?;
    let referenced_table = t.identifier()?;
    let referenced_columns = parse_identifier_list(t)?;
    Ok(ForeignKeyClause {
        constraint_name,
        referencing_columns,
        referenced_table,
        referenced_columns,
    })
}

/// Parses `CASCADE` or `NO ACTION`.
pub(crate) fn parse_on_delete_action(t: &mut Tokens) -> Result<OnDeleteAction> {
    if t.eat_keyword("CASCADE") {
        Ok(OnDeleteAction::Cascade)
    } else {
        t.expect_keyword("NO")?;
        t.expect_keyword("ACTION")?;
        Ok(OnDeleteAction::NoAction)
    }
}
