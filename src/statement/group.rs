/// Composite predicates
///
/// A `ConditionGroup` joins its children with a fixed operator. Nested
/// groups are parenthesized by the parent while it renders its children,
/// never by the group itself.

use std::fmt;

use super::condition::{Condition, InlineLiterals, LiteralSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOperator {
    And,
    Or,
}

impl JoinOperator {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for JoinOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the predicate tree: the root of a WHERE/HAVING clause or a
/// child of a group.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Condition(Condition),
    Group(ConditionGroup),
}

impl Predicate {
    pub fn render(&self, sink: &mut dyn LiteralSink) -> String {
        match self {
            Self::Condition(c) => c.render(sink),
            Self::Group(g) => g.render(sink),
        }
    }
}

impl From<Condition> for Predicate {
    fn from(c: Condition) -> Self {
        Self::Condition(c)
    }
}

impl From<ConditionGroup> for Predicate {
    fn from(g: ConditionGroup) -> Self {
        Self::Group(g)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&mut InlineLiterals))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionGroup {
    operator: JoinOperator,
    children: Vec<Predicate>,
}

impl ConditionGroup {
    /// Empty group joined with AND.
    #[must_use]
    pub const fn and() -> Self {
        Self {
            operator: JoinOperator::And,
            children: Vec::new(),
        }
    }

    /// Empty group joined with OR.
    #[must_use]
    pub const fn or() -> Self {
        Self {
            operator: JoinOperator::Or,
            children: Vec::new(),
        }
    }

    /// AND group over the given children.
    pub fn all<I, P>(children: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Predicate>,
    {
        let mut group = Self::and();
        group.extend(children);
        group
    }

    /// OR group over the given children.
    pub fn any<I, P>(children: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Predicate>,
    {
        let mut group = Self::or();
        group.extend(children);
        group
    }

    pub fn add(&mut self, child: impl Into<Predicate>) -> &mut Self {
        self.children.push(child.into());
        self
    }

    /// Builder form of `add`.
    #[must_use]
    pub fn with(mut self, child: impl Into<Predicate>) -> Self {
        self.add(child);
        self
    }

    #[must_use]
    pub const fn operator(&self) -> JoinOperator {
        self.operator
    }

    #[must_use]
    pub fn children(&self) -> &[Predicate] {
        &self.children
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn render(&self, sink: &mut dyn LiteralSink) -> String {
        let mut parts = Vec::with_capacity(self.children.len());
        for child in &self.children {
            match child {
                Predicate::Condition(c) => parts.push(c.render(sink)),
                Predicate::Group(g) => {
                    // empty subgroups contribute nothing
                    let inner = g.render(sink);
                    if !inner.is_empty() {
                        parts.push(format!("({inner})"));
                    }
                }
            }
        }
        parts.join(&format!(" {} ", self.operator))
    }
}

impl<P: Into<Predicate>> Extend<P> for ConditionGroup {
    fn extend<I: IntoIterator<Item = P>>(&mut self, iter: I) {
        self.children.extend(iter.into_iter().map(Into::into));
    }
}

impl fmt::Display for ConditionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&mut InlineLiterals))
    }
}
