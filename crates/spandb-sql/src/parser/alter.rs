//! ALTER TABLE parsing.

use super::common::{parse_column_def, parse_foreign_key_tail, parse_on_delete_action, Tokens};
use crate::ast::{AlterTable, AlterTableOp, DdlStatement};
use spandb_commons::Result;

pub(crate) fn parse_alter(t: &mut Tokens) -> Result<DdlStatement> {
    t.expect_keyword("ALTER")?;
    t.expect_keyword("TABLE")?;
    let table_name = t.identifier()?;

    let op = if t.eat_keyword("ADD") {
        if t.eat_keyword("COLUMN") {
            AlterTableOp::AddColumn(parse_column_def(t)?)
        } else if t.eat_keyword("CONSTRAINT") {
            let name = t.identifier()?;
            t.expect_keyword("FOREIGN")?;
            t.expect_keyword("KEY")?;
            AlterTableOp::AddForeignKey(parse_foreign_key_tail(t, Some(name))?)
        } else if t.eat_keyword("FOREIGN") {
            t.expect_keyword("KEY")?;
            AlterTableOp::AddForeignKey(parse_foreign_key_tail(t, None)?)
        } else {
            return Err(t.error("expected COLUMN, CONSTRAINT or FOREIGN KEY after ADD"));
        }
    } else if t.eat_keyword("ALTER") {
        t.expect_keyword("COLUMN")?;
        let def = parse_column_def(t)?;
        AlterTableOp::AlterColumn {
            column_name: def.column_name.clone(),
            def,
        }
    } else if t.eat_keyword("DROP") {
        if t.eat_keyword("COLUMN") {
            AlterTableOp::DropColumn {
                column_name: t.identifier()?,
            }
        } else if t.eat_keyword("CONSTRAINT") {
            AlterTableOp::DropConstraint {
                constraint_name: t.identifier()?,
            }
        } else {
            return Err(t.error("expected COLUMN or CONSTRAINT after DROP"));
        }
    } else if t.eat_keyword("SET") {
        t.expect_keyword("ON")?;
        t.expect_keyword("DELETE")?;
        AlterTableOp::SetOnDelete(parse_on_delete_action(t)?)
    } else {
        return Err(t.error("expected ADD, ALTER, DROP or SET"));
    };

    Ok(DdlStatement::AlterTable(AlterTable { table_name, op }))
}
