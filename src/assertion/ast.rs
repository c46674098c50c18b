//! Assertion expression tree and its JSON wire shape
//!
//! The shape is shared with the check-execution service, so every tag and
//! field name here is part of a wire contract.

use serde::{Deserialize, Serialize, Serializer};
use std::str::FromStr;

use crate::error::{Result, RuleError};

/// Predicate used to compare an observed value, or to assert presence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "cmp", rename_all = "snake_case")]
pub enum Comparison {
    /// Value is present
    Always,
    /// Value is absent
    Never,
    LessThan,
    GreaterThan,
    Equals,
    NotEqual,
}

impl Comparison {
    pub const ALL: [Comparison; 6] = [
        Comparison::Equals,
        Comparison::NotEqual,
        Comparison::LessThan,
        Comparison::GreaterThan,
        Comparison::Always,
        Comparison::Never,
    ];

    /// Comparisons that need an expected value (valid for status codes)
    pub const VALUE_BEARING: [Comparison; 4] = [
        Comparison::Equals,
        Comparison::NotEqual,
        Comparison::LessThan,
        Comparison::GreaterThan,
    ];

    /// `always` and `never` check presence and take no operand
    #[inline]
    pub fn is_presence(self) -> bool {
        matches!(self, Comparison::Always | Comparison::Never)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Comparison::Always => "always",
            Comparison::Never => "never",
            Comparison::LessThan => "less_than",
            Comparison::GreaterThan => "greater_than",
            Comparison::Equals => "equals",
            Comparison::NotEqual => "not_equal",
        }
    }

    /// Compact symbol shown next to the operand
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Equals => "=",
            Comparison::NotEqual => "\u{2260}",
            Comparison::LessThan => "<",
            Comparison::GreaterThan => ">",
            Comparison::Always => "\u{22A4}",
            Comparison::Never => "\u{2205}",
        }
    }

    /// Human readable label
    pub fn label(self) -> &'static str {
        match self {
            Comparison::Equals => "equal",
            Comparison::NotEqual => "not equal to",
            Comparison::LessThan => "less than",
            Comparison::GreaterThan => "greater than",
            Comparison::Always => "present",
            Comparison::Never => "not present",
        }
    }
}

impl FromStr for Comparison {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self> {
        Comparison::ALL
            .into_iter()
            .find(|cmp| cmp.as_str() == s)
            .ok_or_else(|| RuleError::UnknownKind(format!("comparison '{}'", s)))
    }
}

/// Glob pattern wrapper, kept as an object on the wire
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GlobPattern {
    pub value: String,
}

/// Source of the string compared by one side of a header check
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "header_op", rename_all = "snake_case")]
pub enum HeaderOperand {
    /// Only valid with `always` / `never`
    None,
    Literal { value: String },
    Glob { pattern: GlobPattern },
}

impl HeaderOperand {
    pub fn literal(value: impl Into<String>) -> Self {
        HeaderOperand::Literal {
            value: value.into(),
        }
    }

    pub fn glob(pattern: impl Into<String>) -> Self {
        HeaderOperand::Glob {
            pattern: GlobPattern {
                value: pattern.into(),
            },
        }
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, HeaderOperand::None)
    }
}

/// Logical combinator of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    /// All children must hold
    And,
    /// At least one child must hold
    Or,
}

impl GroupKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupKind::And => "and",
            GroupKind::Or => "or",
        }
    }
}

/// `and` / `or` node holding ordered children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupOp {
    #[serde(rename = "op")]
    pub kind: GroupKind,
    pub children: Vec<Op>,
}

impl GroupOp {
    pub fn new(kind: GroupKind, children: Vec<Op>) -> Self {
        Self { kind, children }
    }

    pub fn and(children: Vec<Op>) -> Self {
        Self::new(GroupKind::And, children)
    }

    pub fn or(children: Vec<Op>) -> Self {
        Self::new(GroupKind::Or, children)
    }
}

/// Negates exactly one operand
#[derive(Debug, Clone, PartialEq)]
pub struct NotOp {
    pub operand: Box<Op>,
}

impl NotOp {
    pub fn new(operand: Op) -> Self {
        Self {
            operand: Box::new(operand),
        }
    }
}

/// Compares the response status code against a literal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCodeOp {
    pub operator: Comparison,
    pub value: u16,
}

/// Asserts a JSON path expression matches the response body
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JsonPathOp {
    pub value: String,
}

/// Compares a header key and its value independently
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderCheckOp {
    pub key_op: Comparison,
    pub key_operand: HeaderOperand,
    pub value_op: Comparison,
    pub value_operand: HeaderOperand,
}

/// Which half of a header check an edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderSide {
    Key,
    Value,
}

impl HeaderSide {
    pub fn as_str(self) -> &'static str {
        match self {
            HeaderSide::Key => "key",
            HeaderSide::Value => "value",
        }
    }
}

impl HeaderCheckOp {
    pub fn comparison(&self, side: HeaderSide) -> Comparison {
        match side {
            HeaderSide::Key => self.key_op,
            HeaderSide::Value => self.value_op,
        }
    }

    pub fn operand(&self, side: HeaderSide) -> &HeaderOperand {
        match side {
            HeaderSide::Key => &self.key_operand,
            HeaderSide::Value => &self.value_operand,
        }
    }
}

/// Tag of an [`Op`], using the wire names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    And,
    Or,
    Not,
    StatusCodeCheck,
    JsonPath,
    HeaderCheck,
}

impl OpKind {
    pub const ALL: [OpKind; 6] = [
        OpKind::And,
        OpKind::Or,
        OpKind::Not,
        OpKind::StatusCodeCheck,
        OpKind::JsonPath,
        OpKind::HeaderCheck,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OpKind::And => "and",
            OpKind::Or => "or",
            OpKind::Not => "not",
            OpKind::StatusCodeCheck => "status_code_check",
            OpKind::JsonPath => "json_path",
            OpKind::HeaderCheck => "header_check",
        }
    }
}

impl FromStr for OpKind {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self> {
        OpKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| RuleError::UnknownKind(format!("op '{}'", s)))
    }
}

/// One node of the assertion tree
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "WireOp")]
pub enum Op {
    Group(GroupOp),
    Not(NotOp),
    StatusCode(StatusCodeOp),
    JsonPath(JsonPathOp),
    Header(HeaderCheckOp),
}

impl Op {
    pub fn kind(&self) -> OpKind {
        match self {
            Op::Group(group) => match group.kind {
                GroupKind::And => OpKind::And,
                GroupKind::Or => OpKind::Or,
            },
            Op::Not(_) => OpKind::Not,
            Op::StatusCode(_) => OpKind::StatusCodeCheck,
            Op::JsonPath(_) => OpKind::JsonPath,
            Op::Header(_) => OpKind::HeaderCheck,
        }
    }

    pub fn as_group(&self) -> Option<&GroupOp> {
        match self {
            Op::Group(group) => Some(group),
            _ => None,
        }
    }

    /// Leaves are every variant except groups and `not`
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Op::Group(_) | Op::Not(_))
    }
}

impl From<GroupOp> for Op {
    fn from(group: GroupOp) -> Self {
        Op::Group(group)
    }
}

impl From<NotOp> for Op {
    fn from(not: NotOp) -> Self {
        Op::Not(not)
    }
}

impl From<StatusCodeOp> for Op {
    fn from(op: StatusCodeOp) -> Self {
        Op::StatusCode(op)
    }
}

impl From<JsonPathOp> for Op {
    fn from(op: JsonPathOp) -> Self {
        Op::JsonPath(op)
    }
}

impl From<HeaderCheckOp> for Op {
    fn from(op: HeaderCheckOp) -> Self {
        Op::Header(op)
    }
}

// Wire form: a flat object discriminated by `op`.

#[derive(Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum WireOp {
    And { children: Vec<Op> },
    Or { children: Vec<Op> },
    Not { operand: Box<Op> },
    StatusCodeCheck(StatusCodeOp),
    JsonPath(JsonPathOp),
    HeaderCheck(HeaderCheckOp),
}

#[derive(Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum WireOpRef<'a> {
    And { children: &'a [Op] },
    Or { children: &'a [Op] },
    Not { operand: &'a Op },
    StatusCodeCheck(&'a StatusCodeOp),
    JsonPath(&'a JsonPathOp),
    HeaderCheck(&'a HeaderCheckOp),
}

impl From<WireOp> for Op {
    fn from(wire: WireOp) -> Self {
        match wire {
            WireOp::And { children } => Op::Group(GroupOp::and(children)),
            WireOp::Or { children } => Op::Group(GroupOp::or(children)),
            WireOp::Not { operand } => Op::Not(NotOp { operand }),
            WireOp::StatusCodeCheck(op) => Op::StatusCode(op),
            WireOp::JsonPath(op) => Op::JsonPath(op),
            WireOp::HeaderCheck(op) => Op::Header(op),
        }
    }
}

impl Serialize for Op {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let wire = match self {
            Op::Group(group) => match group.kind {
                GroupKind::And => WireOpRef::And {
                    children: &group.children,
                },
                GroupKind::Or => WireOpRef::Or {
                    children: &group.children,
                },
            },
            Op::Not(not) => WireOpRef::Not {
                operand: &not.operand,
            },
            Op::StatusCode(op) => WireOpRef::StatusCodeCheck(op),
            Op::JsonPath(op) => WireOpRef::JsonPath(op),
            Op::Header(op) => WireOpRef::HeaderCheck(op),
        };
        wire.serialize(serializer)
    }
}

/// A whole uptime check rule; the root is conventionally an `and` group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assertion {
    pub root: Op,
}

impl Default for Assertion {
    fn default() -> Self {
        Self {
            root: Op::Group(GroupOp::and(Vec::new())),
        }
    }
}

impl Assertion {
    pub fn new(root: GroupOp) -> Self {
        Self {
            root: Op::Group(root),
        }
    }

    /// Decode from JSON at any nesting depth.
    ///
    /// Each group costs two levels of serde_json's recursion limit, so the
    /// limit is lifted and the stack is grown on demand instead.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut de = serde_json::Deserializer::from_str(json);
        de.disable_recursion_limit();
        let assertion = Assertion::deserialize(serde_stacker::Deserializer::new(&mut de))?;
        de.end()?;
        Ok(assertion)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
