//! DROP TABLE and DROP INDEX parsing.

use super::common::Tokens;
use crate::ast::{DdlStatement, DropIndex, DropTable};
use spandb_commons::Result;

pub(crate) fn parse_drop(t: &mut Tokens) -> Result<DdlStatement> {
    t.expect_keyword("DROP")?;
    if t.eat_keyword("TABLE") {
        Ok(DdlStatement::DropTable(DropTable {
            table_name: t.identifier()?,
        }))
    } else if t.eat_keyword("INDEX") {
        Ok(DdlStatement::DropIndex(DropIndex {
            index_name: t.identifier()?,
        }))
    } else {
        Err(t.error("expected TABLE or INDEX after DROP"))
    }
}
