/// The Statement builder
///
/// A `Statement` describes one database operation independent of any SQL
/// dialect. It is filled fluently, rendered once by a `StatementEvaluator`
/// and executed once by a `Connection`.
///
/// The kind is write-once: the first verb call decides it, a verb of another
/// kind fails afterwards. The target table is write-once as well.

use std::fmt;
use std::str::FromStr;

use crate::core::{DataAccessError, Value};

use super::condition::Operand;
use super::group::Predicate;
use super::join::{Join, JoinConstraint, JoinKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    ShowTables,
    ShowColumns,
    ShowIndexes,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::ShowTables => "SHOW TABLES",
            Self::ShowColumns => "SHOW COLUMNS",
            Self::ShowIndexes => "SHOW INDEXES",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = DataAccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            _ => Err(DataAccessError::InvalidSortOrder(s.to_string())),
        }
    }
}

/// One entry of a SELECT field list. The alias equals the expression when
/// none was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectField {
    pub expression: String,
    pub alias: String,
}

impl SelectField {
    #[must_use]
    pub fn has_alias(&self) -> bool {
        self.alias != self.expression
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub offset: u64,
    pub length: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    kind: Option<StatementKind>,
    fields: Vec<SelectField>,
    columns: Vec<(String, Operand)>,
    table: Option<String>,
    joins: Vec<Join>,
    filter: Option<Predicate>,
    having: Option<Predicate>,
    order: Vec<String>,
    group_by: Vec<String>,
    limit: Option<Limit>,
    sets: Vec<(String, Operand)>,
    distinct: bool,
    too_complicated: bool,
}

impl Statement {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn claim(
        &mut self,
        requested: StatementKind,
        method: &'static str,
        table: Option<String>,
    ) -> Result<(), DataAccessError> {
        if let Some(current) = self.kind {
            if current != requested {
                return Err(DataAccessError::KindConflict { current, requested });
            }
        }
        if let Some(table) = table {
            if let Some(existing) = &self.table {
                return Err(DataAccessError::TableAlreadySet {
                    method,
                    table: existing.clone(),
                });
            }
            self.table = Some(table);
        }
        self.kind = Some(requested);
        Ok(())
    }

    /// Adds a field to be retrieved, aliased to itself.
    pub fn select(&mut self, expression: impl Into<String>) -> Result<&mut Self, DataAccessError> {
        let expression = expression.into();
        let alias = expression.clone();
        self.select_as(expression, alias)
    }

    /// Adds a field to be retrieved under the given alias. Selecting the same
    /// alias again replaces the earlier expression in place.
    pub fn select_as(
        &mut self,
        expression: impl Into<String>,
        alias: impl Into<String>,
    ) -> Result<&mut Self, DataAccessError> {
        self.claim(StatementKind::Select, "select", None)?;
        let expression = expression.into();
        let alias = alias.into();

        if expression.to_ascii_lowercase().contains("distinct") {
            self.distinct = true;
        }

        match self.fields.iter_mut().find(|f| f.alias == alias) {
            Some(field) => field.expression = expression,
            None => self.fields.push(SelectField { expression, alias }),
        }
        Ok(self)
    }

    /// Sets the source table of a SELECT.
    pub fn from(&mut self, table: impl Into<String>) -> Result<&mut Self, DataAccessError> {
        self.claim(StatementKind::Select, "from", Some(table.into()))?;
        Ok(self)
    }

    pub fn insert_into(&mut self, table: impl Into<String>) -> Result<&mut Self, DataAccessError> {
        self.claim(StatementKind::Insert, "insert_into", Some(table.into()))?;
        Ok(self)
    }

    pub fn update(&mut self, table: impl Into<String>) -> Result<&mut Self, DataAccessError> {
        self.claim(StatementKind::Update, "update", Some(table.into()))?;
        Ok(self)
    }

    pub fn delete_from(&mut self, table: impl Into<String>) -> Result<&mut Self, DataAccessError> {
        self.claim(StatementKind::Delete, "delete_from", Some(table.into()))?;
        Ok(self)
    }

    /// Lists tables, optionally filtered by a LIKE pattern.
    pub fn show_tables(&mut self, pattern: Option<&str>) -> Result<&mut Self, DataAccessError> {
        self.claim(
            StatementKind::ShowTables,
            "show_tables",
            pattern.map(ToString::to_string),
        )?;
        Ok(self)
    }

    pub fn show_columns(&mut self, table: impl Into<String>) -> Result<&mut Self, DataAccessError> {
        self.claim(StatementKind::ShowColumns, "show_columns", Some(table.into()))?;
        Ok(self)
    }

    pub fn show_indexes(&mut self, table: impl Into<String>) -> Result<&mut Self, DataAccessError> {
        self.claim(StatementKind::ShowIndexes, "show_indexes", Some(table.into()))?;
        Ok(self)
    }

    /// Adds an INSERT column together with its value.
    pub fn column(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
        quote: bool,
    ) -> &mut Self {
        self.columns.push((name.into(), Operand::new(value, quote)));
        self
    }

    /// Adds an UPDATE assignment. Assigning the same field again replaces the value.
    pub fn set(
        &mut self,
        field: impl Into<String>,
        value: impl Into<Value>,
        quote: bool,
    ) -> &mut Self {
        let field = field.into();
        let operand = Operand::new(value, quote);
        match self.sets.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = operand,
            None => self.sets.push((field, operand)),
        }
        self
    }

    /// Sets the WHERE root, replacing any previous one.
    pub fn where_(&mut self, predicate: impl Into<Predicate>) -> &mut Self {
        self.filter = Some(predicate.into());
        self
    }

    /// Sets the HAVING root, replacing any previous one.
    pub fn having(&mut self, predicate: impl Into<Predicate>) -> &mut Self {
        self.having = Some(predicate.into());
        self
    }

    pub fn join(
        &mut self,
        table: impl Into<String>,
        kind: JoinKind,
        constraint: impl Into<JoinConstraint>,
    ) -> &mut Self {
        self.joins.push(Join {
            table: table.into(),
            kind,
            constraint: constraint.into(),
        });
        self
    }

    /// Joins with `USING (columns)` instead of an ON predicate.
    pub fn join_using<I, S>(
        &mut self,
        table: impl Into<String>,
        kind: JoinKind,
        columns: I,
    ) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = columns.into_iter().map(Into::into).collect();
        self.join(table, kind, JoinConstraint::Using(columns))
    }

    pub fn cross_join(&mut self, table: impl Into<String>) -> &mut Self {
        self.join(table, JoinKind::Cross, JoinConstraint::None)
    }

    /// Restricts the result to `length` rows starting at `offset`.
    pub fn limit<O, L>(&mut self, offset: O, length: L) -> Result<&mut Self, DataAccessError>
    where
        O: TryInto<u64> + fmt::Display + Copy,
        L: TryInto<u64> + fmt::Display + Copy,
    {
        let (Ok(off), Ok(len)) = (offset.try_into(), length.try_into()) else {
            return Err(DataAccessError::InvalidLimit(format!(
                "offset {offset}, length {length}"
            )));
        };
        self.limit = Some(Limit {
            offset: off,
            length: len,
        });
        Ok(self)
    }

    /// Orders ascending by the given field.
    pub fn order_by(&mut self, field: impl AsRef<str>) -> &mut Self {
        self.order_by_dir(field, SortOrder::Asc)
    }

    pub fn order_by_dir(&mut self, field: impl AsRef<str>, direction: SortOrder) -> &mut Self {
        self.order.push(format!("{} {direction}", field.as_ref()));
        self
    }

    pub fn group_by(&mut self, field: impl Into<String>) -> &mut Self {
        self.group_by.push(field.into());
        self
    }

    /// Flags the statement as using DISTINCT.
    pub const fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    /// Flags the statement as too complicated to be handled further.
    pub const fn set_too_complicated(&mut self) -> &mut Self {
        self.too_complicated = true;
        self
    }

    /// Independent deep copy; no part of the predicate tree is shared.
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    #[must_use]
    pub const fn kind(&self) -> Option<StatementKind> {
        self.kind
    }

    /// The target table, or an error when no verb has set one yet.
    pub fn table(&self) -> Result<&str, DataAccessError> {
        self.table.as_deref().ok_or(DataAccessError::MissingTable)
    }

    #[must_use]
    pub fn has_table(&self) -> bool {
        self.table.is_some()
    }

    #[must_use]
    pub fn fields(&self) -> &[SelectField] {
        &self.fields
    }

    #[must_use]
    pub fn columns(&self) -> &[(String, Operand)] {
        &self.columns
    }

    #[must_use]
    pub fn sets(&self) -> &[(String, Operand)] {
        &self.sets
    }

    #[must_use]
    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    #[must_use]
    pub const fn has_where(&self) -> bool {
        self.filter.is_some()
    }

    #[must_use]
    pub const fn where_root(&self) -> Option<&Predicate> {
        self.filter.as_ref()
    }

    pub const fn where_mut(&mut self) -> Option<&mut Predicate> {
        self.filter.as_mut()
    }

    /// The WHERE tree rendered with inline literals, or "" when unset.
    #[must_use]
    pub fn where_clause(&self) -> String {
        self.filter.as_ref().map(ToString::to_string).unwrap_or_default()
    }

    #[must_use]
    pub const fn has_having(&self) -> bool {
        self.having.is_some()
    }

    #[must_use]
    pub const fn having_root(&self) -> Option<&Predicate> {
        self.having.as_ref()
    }

    #[must_use]
    pub fn having_clause(&self) -> String {
        self.having.as_ref().map(ToString::to_string).unwrap_or_default()
    }

    #[must_use]
    pub fn has_ordering(&self) -> bool {
        !self.order.is_empty()
    }

    #[must_use]
    pub fn order(&self) -> &[String] {
        &self.order
    }

    #[must_use]
    pub fn has_group_by(&self) -> bool {
        !self.group_by.is_empty()
    }

    #[must_use]
    pub fn group_by_fields(&self) -> &[String] {
        &self.group_by
    }

    #[must_use]
    pub const fn has_limit(&self) -> bool {
        self.limit.is_some()
    }

    /// The limit, or an error when none was set.
    pub fn limit_bounds(&self) -> Result<Limit, DataAccessError> {
        self.limit.ok_or(DataAccessError::MissingLimit)
    }

    #[must_use]
    pub const fn is_distinct(&self) -> bool {
        self.distinct
    }

    #[must_use]
    pub const fn is_too_complicated(&self) -> bool {
        self.too_complicated
    }
}
