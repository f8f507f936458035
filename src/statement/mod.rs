// Module declarations
mod builder;
mod condition;
mod group;
mod join;

// Re-export all public types
pub use builder::{Limit, SelectField, SortOrder, Statement, StatementKind};
pub use condition::{Condition, InlineLiterals, LiteralSink, Operand};
pub use group::{ConditionGroup, JoinOperator, Predicate};
pub use join::{Join, JoinConstraint, JoinKind};
