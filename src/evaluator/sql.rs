/// SQL evaluator
///
/// Renders statements clause by clause. SELECT/INSERT/UPDATE/DELETE are
/// shared by every dialect; the SHOW variants are dialect specific. SQLite
/// has no SHOW, so its variants query the catalog and expose the same
/// column names MySQL returns, keeping WHERE filters on `Field` or
/// `Key_name` portable.

use crate::core::{DataAccessError, Value};
use crate::statement::{
    InlineLiterals, JoinConstraint, LiteralSink, Predicate, Statement, StatementKind,
};

use super::{BindCollector, CompiledStatement, Dialect, StatementEvaluator};

/// Words that must be quoted when used as a column name.
const RESERVED: &[&str] = &[
    "ALL", "AND", "AS", "BY", "CASE", "CHECK", "COLUMN", "CREATE", "DEFAULT", "DELETE", "DESC",
    "DISTINCT", "DROP", "FROM", "GROUP", "HAVING", "IN", "INDEX", "INSERT", "INTO", "IS", "JOIN",
    "KEY", "LIKE", "LIMIT", "NOT", "NULL", "OR", "ORDER", "PRIMARY", "SELECT", "SET", "TABLE",
    "TO", "UNIQUE", "UPDATE", "VALUES", "WHERE",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct SqlStatementEvaluator {
    dialect: Dialect,
}

impl SqlStatementEvaluator {
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    #[must_use]
    pub const fn mysql() -> Self {
        Self::new(Dialect::MySql)
    }

    #[must_use]
    pub const fn sqlite() -> Self {
        Self::new(Dialect::Sqlite)
    }

    /// Quotes a column name with backticks unless it is a plain, unreserved identifier.
    #[must_use]
    pub fn quote_identifier(name: &str) -> String {
        let mut chars = name.chars();
        let plain = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

        if plain && !RESERVED.contains(&name.to_ascii_uppercase().as_str()) {
            name.to_string()
        } else {
            format!("`{}`", name.replace('`', "``"))
        }
    }

    fn render(
        &self,
        statement: &Statement,
        sink: &mut dyn LiteralSink,
    ) -> Result<String, DataAccessError> {
        match statement.kind() {
            Some(StatementKind::Select) => Self::evaluate_select(statement, sink),
            Some(StatementKind::Insert) => Self::evaluate_insert(statement, sink),
            Some(StatementKind::Update) => Self::evaluate_update(statement, sink),
            Some(StatementKind::Delete) => Self::evaluate_delete(statement, sink),
            Some(StatementKind::ShowTables) => Ok(self.evaluate_show_tables(statement, sink)),
            Some(StatementKind::ShowColumns) => self.evaluate_show_columns(statement, sink),
            Some(StatementKind::ShowIndexes) => self.evaluate_show_indexes(statement, sink),
            None => Err(DataAccessError::UnrecognizedStatement),
        }
    }

    /// Field list of a SELECT, `*` when empty.
    fn evaluate_what(statement: &Statement) -> String {
        let fields = statement.fields();
        if fields.is_empty() {
            return "*".to_string();
        }
        fields
            .iter()
            .map(|f| {
                if f.has_alias() {
                    format!("{} AS {}", f.expression, f.alias)
                } else {
                    f.expression.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn evaluate_joins(statement: &Statement, sink: &mut dyn LiteralSink) -> String {
        let mut sql = String::new();
        for join in statement.joins() {
            sql.push_str(&format!(" {} JOIN {}", join.kind, join.table));
            match &join.constraint {
                JoinConstraint::On(predicate) => {
                    sql.push_str(" ON ");
                    sql.push_str(&predicate.render(sink));
                }
                JoinConstraint::Using(columns) => {
                    sql.push_str(&format!(" USING ({})", columns.join(", ")));
                }
                JoinConstraint::None => {}
            }
        }
        sql
    }

    /// Renders ` <keyword> <tree>`, or nothing for an absent or empty tree.
    fn evaluate_predicate(
        keyword: &str,
        root: Option<&Predicate>,
        sink: &mut dyn LiteralSink,
    ) -> String {
        let Some(root) = root else {
            return String::new();
        };
        let rendered = root.render(sink);
        if rendered.is_empty() {
            String::new()
        } else {
            format!(" {keyword} {rendered}")
        }
    }

    fn evaluate_where(statement: &Statement, sink: &mut dyn LiteralSink) -> String {
        Self::evaluate_predicate("WHERE", statement.where_root(), sink)
    }

    fn evaluate_group_by(statement: &Statement) -> String {
        if statement.has_group_by() {
            format!(" GROUP BY {}", statement.group_by_fields().join(","))
        } else {
            String::new()
        }
    }

    fn evaluate_ordering(statement: &Statement) -> String {
        if statement.has_ordering() {
            format!(" ORDER BY {}", statement.order().join(", "))
        } else {
            String::new()
        }
    }

    fn evaluate_limit(statement: &Statement) -> Result<String, DataAccessError> {
        if statement.has_limit() {
            let limit = statement.limit_bounds()?;
            Ok(format!(" LIMIT {},{}", limit.offset, limit.length))
        } else {
            Ok(String::new())
        }
    }

    fn evaluate_select(
        statement: &Statement,
        sink: &mut dyn LiteralSink,
    ) -> Result<String, DataAccessError> {
        let fields = Self::evaluate_what(statement);
        let table = statement.table()?;
        let joins = Self::evaluate_joins(statement, sink);
        let filter = Self::evaluate_where(statement, sink);
        let group_by = Self::evaluate_group_by(statement);
        let having = Self::evaluate_predicate("HAVING", statement.having_root(), sink);
        let ordering = Self::evaluate_ordering(statement);
        let limit = Self::evaluate_limit(statement)?;

        Ok(format!(
            "SELECT {fields} FROM {table}{joins}{filter}{group_by}{having}{ordering}{limit}"
        ))
    }

    fn evaluate_insert(
        statement: &Statement,
        sink: &mut dyn LiteralSink,
    ) -> Result<String, DataAccessError> {
        let table = statement.table()?;
        let columns = statement.columns();
        if columns.is_empty() {
            return Err(DataAccessError::EmptyAssignment(StatementKind::Insert));
        }

        let names: Vec<String> = columns
            .iter()
            .map(|(name, _)| Self::quote_identifier(name))
            .collect();
        let mut values = Vec::with_capacity(columns.len());
        for (_, operand) in columns {
            values.push(operand.render(sink));
        }

        Ok(format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            names.join(","),
            values.join(",")
        ))
    }

    fn evaluate_update(
        statement: &Statement,
        sink: &mut dyn LiteralSink,
    ) -> Result<String, DataAccessError> {
        let table = statement.table()?;
        let sets = statement.sets();
        if sets.is_empty() {
            return Err(DataAccessError::EmptyAssignment(StatementKind::Update));
        }

        let mut assignments = Vec::with_capacity(sets.len());
        for (field, operand) in sets {
            assignments.push(format!(
                "{} = {}",
                Self::quote_identifier(field),
                operand.render(sink)
            ));
        }
        let filter = Self::evaluate_where(statement, sink);

        Ok(format!("UPDATE {table} SET {}{filter}", assignments.join(", ")))
    }

    fn evaluate_delete(
        statement: &Statement,
        sink: &mut dyn LiteralSink,
    ) -> Result<String, DataAccessError> {
        let table = statement.table()?;
        let filter = Self::evaluate_where(statement, sink);
        Ok(format!("DELETE FROM {table}{filter}"))
    }

    fn evaluate_show_tables(&self, statement: &Statement, sink: &mut dyn LiteralSink) -> String {
        // For SHOW TABLES the table slot carries the optional LIKE pattern
        let pattern = statement.table().ok().map(|p| sink.literal(&Value::from(p)));

        match self.dialect {
            Dialect::MySql => match pattern {
                Some(p) => format!("SHOW FULL TABLES LIKE {p}"),
                None => "SHOW FULL TABLES".to_string(),
            },
            Dialect::Sqlite => {
                let mut sql = "SELECT name AS Tables_in_main, type AS Table_type \
                               FROM sqlite_master WHERE type IN ('table', 'view') \
                               AND name NOT LIKE 'sqlite_%'"
                    .to_string();
                if let Some(p) = pattern {
                    sql.push_str(&format!(" AND name LIKE {p}"));
                }
                sql.push_str(" ORDER BY name");
                sql
            }
        }
    }

    fn evaluate_show_columns(
        &self,
        statement: &Statement,
        sink: &mut dyn LiteralSink,
    ) -> Result<String, DataAccessError> {
        let table = statement.table()?;

        Ok(match self.dialect {
            Dialect::MySql => {
                let filter = Self::evaluate_where(statement, sink);
                format!("SHOW FULL COLUMNS FROM {table}{filter}")
            }
            Dialect::Sqlite => {
                let source = sink.literal(&Value::from(table));
                let filter = Self::evaluate_where(statement, sink);
                format!(
                    "SELECT * FROM (SELECT name AS Field, type AS Type, \
                     CASE \"notnull\" WHEN 0 THEN 'YES' ELSE 'NO' END AS \"Null\", \
                     dflt_value AS \"Default\", CASE pk WHEN 0 THEN '' ELSE 'PRI' END AS \"Key\" \
                     FROM pragma_table_info({source})){filter}"
                )
            }
        })
    }

    fn evaluate_show_indexes(
        &self,
        statement: &Statement,
        sink: &mut dyn LiteralSink,
    ) -> Result<String, DataAccessError> {
        let table = statement.table()?;

        Ok(match self.dialect {
            Dialect::MySql => {
                let filter = Self::evaluate_where(statement, sink);
                format!("SHOW INDEX FROM {table}{filter}")
            }
            Dialect::Sqlite => {
                let source = sink.literal(&Value::from(table));
                let filter = Self::evaluate_where(statement, sink);
                format!(
                    "SELECT * FROM (SELECT il.name AS Key_name, \
                     CASE il.\"unique\" WHEN 1 THEN 0 ELSE 1 END AS Non_unique, \
                     ii.seqno + 1 AS Seq_in_index, ii.name AS Column_name \
                     FROM pragma_index_list({source}) AS il, pragma_index_info(il.name) AS ii)\
                     {filter} ORDER BY Key_name, Seq_in_index"
                )
            }
        })
    }
}

impl StatementEvaluator for SqlStatementEvaluator {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn evaluate(&self, statement: &Statement) -> Result<String, DataAccessError> {
        self.render(statement, &mut InlineLiterals)
    }

    fn compile(&self, statement: &Statement) -> Result<CompiledStatement, DataAccessError> {
        let mut binds = BindCollector::default();
        let sql = self.render(statement, &mut binds)?;
        Ok(CompiledStatement {
            sql,
            params: binds.into_params(),
        })
    }
}
