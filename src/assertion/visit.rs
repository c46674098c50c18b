//! Tree-wide traversals: walking, measuring and validating
//!
//! Every traversal matches all variants of [`Op`] exhaustively, so adding a
//! variant fails to compile until each one is updated.

use std::fmt;
use tracing::debug;

use crate::assertion::ast::{Assertion, GroupKind, HeaderCheckOp, HeaderSide, Op};

/// Lowest and highest valid HTTP status code
pub const STATUS_CODE_RANGE: std::ops::RangeInclusive<u16> = 100..=599;

/// Pre-order walk calling `visit(op, path)` for every node
pub fn walk<F>(op: &Op, visit: &mut F)
where
    F: FnMut(&Op, &[usize]),
{
    let mut path = Vec::new();
    walk_inner(op, &mut path, visit);
}

fn walk_inner<F>(op: &Op, path: &mut Vec<usize>, visit: &mut F)
where
    F: FnMut(&Op, &[usize]),
{
    visit(op, path.as_slice());
    match op {
        Op::Group(group) => {
            for (i, child) in group.children.iter().enumerate() {
                path.push(i);
                walk_inner(child, path, visit);
                path.pop();
            }
        }
        Op::Not(not) => {
            path.push(0);
            walk_inner(&not.operand, path, visit);
            path.pop();
        }
        Op::StatusCode(_) | Op::JsonPath(_) | Op::Header(_) => {}
    }
}

/// Depth of the tree; a lone leaf has depth 1
pub fn depth(op: &Op) -> usize {
    match op {
        Op::Group(group) => 1 + group.children.iter().map(depth).max().unwrap_or(0),
        Op::Not(not) => 1 + depth(&not.operand),
        Op::StatusCode(_) | Op::JsonPath(_) | Op::Header(_) => 1,
    }
}

/// Number of leaf checks in the tree
pub fn leaf_count(op: &Op) -> usize {
    match op {
        Op::Group(group) => group.children.iter().map(leaf_count).sum(),
        Op::Not(not) => leaf_count(&not.operand),
        Op::StatusCode(_) | Op::JsonPath(_) | Op::Header(_) => 1,
    }
}

/// What is wrong with a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// The root must be an `and` group
    RootNotAnd,
    /// Status codes only take value-bearing comparisons
    StatusCodePresenceComparison,
    StatusCodeOutOfRange(u16),
    /// Key is a presence check but the value side disagrees
    HeaderPresenceMismatch,
    /// A side's operand does not fit its comparison
    HeaderOperandMismatch(HeaderSide),
    EmptyJsonPath,
}

/// A broken invariant at `path` (child indices from the root)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: Vec<usize>,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {:?}: ", self.path)?;
        match &self.kind {
            ViolationKind::RootNotAnd => write!(f, "root must be an 'and' group"),
            ViolationKind::StatusCodePresenceComparison => {
                write!(f, "status code check cannot use a presence comparison")
            }
            ViolationKind::StatusCodeOutOfRange(code) => {
                write!(f, "status code {} is outside 100-599", code)
            }
            ViolationKind::HeaderPresenceMismatch => {
                write!(f, "header value must follow a presence check on the key")
            }
            ViolationKind::HeaderOperandMismatch(side) => {
                write!(f, "header {} operand does not match its comparison", side.as_str())
            }
            ViolationKind::EmptyJsonPath => write!(f, "json path expression is empty"),
        }
    }
}

/// Collect every broken invariant in the assertion
pub fn validate(assertion: &Assertion) -> Vec<Violation> {
    let mut violations = Vec::new();

    if !matches!(&assertion.root, Op::Group(group) if group.kind == GroupKind::And) {
        violations.push(Violation {
            path: Vec::new(),
            kind: ViolationKind::RootNotAnd,
        });
    }

    walk(&assertion.root, &mut |op, path| {
        for kind in check_op(op) {
            violations.push(Violation {
                path: path.to_vec(),
                kind,
            });
        }
    });

    if !violations.is_empty() {
        debug!(count = violations.len(), "assertion has violations");
    }
    violations
}

fn check_op(op: &Op) -> Vec<ViolationKind> {
    match op {
        Op::Group(_) | Op::Not(_) => Vec::new(),
        Op::StatusCode(status) => {
            let mut found = Vec::new();
            if status.operator.is_presence() {
                found.push(ViolationKind::StatusCodePresenceComparison);
            }
            if !STATUS_CODE_RANGE.contains(&status.value) {
                found.push(ViolationKind::StatusCodeOutOfRange(status.value));
            }
            found
        }
        Op::JsonPath(path) if path.value.trim().is_empty() => vec![ViolationKind::EmptyJsonPath],
        Op::JsonPath(_) => Vec::new(),
        Op::Header(header) => check_header(header),
    }
}

fn check_header(header: &HeaderCheckOp) -> Vec<ViolationKind> {
    let mut found = Vec::new();
    if header.key_op.is_presence() && header.value_op != header.key_op {
        found.push(ViolationKind::HeaderPresenceMismatch);
    }
    for side in [HeaderSide::Key, HeaderSide::Value] {
        if header.comparison(side).is_presence() != header.operand(side).is_none() {
            found.push(ViolationKind::HeaderOperandMismatch(side));
        }
    }
    found
}
