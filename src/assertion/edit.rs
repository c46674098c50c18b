//! Copy-on-write edits over the assertion tree
//!
//! Every function returns a new value and leaves its input untouched, so a
//! caller can keep the previous tree around for undo.

use tracing::debug;

use crate::assertion::ast::{
    Comparison, GroupKind, GroupOp, HeaderCheckOp, HeaderOperand, HeaderSide, JsonPathOp, NotOp,
    Op, OpKind, StatusCodeOp,
};
use crate::error::{Result, RuleError};

/// Default status code for a new status code check
pub const DEFAULT_STATUS_CODE: u16 = 200;

/// Append `op` to the end of the group's children
pub fn add_child(group: &GroupOp, op: Op) -> GroupOp {
    let mut children = Vec::with_capacity(group.children.len() + 1);
    children.extend_from_slice(&group.children);
    children.push(op);
    GroupOp::new(group.kind, children)
}

/// Replace the child at `index`
pub fn replace_child_at(group: &GroupOp, index: usize, op: Op) -> Result<GroupOp> {
    check_index(group, index)?;
    let mut children = group.children.clone();
    children[index] = op;
    Ok(GroupOp::new(group.kind, children))
}

/// Remove the child at `index`, shifting later children down
pub fn remove_child_at(group: &GroupOp, index: usize) -> Result<GroupOp> {
    check_index(group, index)?;
    let children = group
        .children
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, child)| child.clone())
        .collect();
    Ok(GroupOp::new(group.kind, children))
}

/// Switch between `and` and `or`, keeping children
pub fn set_group_kind(group: &GroupOp, kind: GroupKind) -> GroupOp {
    GroupOp::new(kind, group.children.clone())
}

pub fn set_status_code_comparison(op: &StatusCodeOp, operator: Comparison) -> StatusCodeOp {
    StatusCodeOp {
        operator,
        value: op.value,
    }
}

pub fn set_status_code_value(op: &StatusCodeOp, value: u16) -> StatusCodeOp {
    StatusCodeOp {
        operator: op.operator,
        value,
    }
}

/// Set the JSON path expression; the input op is taken only to mirror the
/// other leaf setters, since the expression is its only field
pub fn set_json_path_expression(_op: &JsonPathOp, value: impl Into<String>) -> JsonPathOp {
    JsonPathOp {
        value: value.into(),
    }
}

/// Set the comparison for one side of a header check.
///
/// A presence comparison on the key locks the value side to the same
/// comparison with no operands; the value side cannot be edited while the
/// key is a presence check.
pub fn set_header_comparison(op: &HeaderCheckOp, side: HeaderSide, cmp: Comparison) -> HeaderCheckOp {
    let mut next = op.clone();
    match side {
        HeaderSide::Key => {
            let was_presence = op.key_op.is_presence();
            next.key_op = cmp;
            if was_presence && !cmp.is_presence() {
                // Leaving presence mode restores an editable value side
                next.value_op = Comparison::Equals;
                next.key_operand = HeaderOperand::literal("");
                next.value_operand = HeaderOperand::literal("");
            }
        }
        HeaderSide::Value => {
            if op.key_op.is_presence() {
                debug!(?cmp, "ignoring value comparison while header key is a presence check");
                return next;
            }
            next.value_op = cmp;
        }
    }
    normalize_header(next)
}

/// Set the operand for one side of a header check; ignored on presence sides
pub fn set_header_operand(op: &HeaderCheckOp, side: HeaderSide, operand: HeaderOperand) -> HeaderCheckOp {
    let mut next = op.clone();
    if op.comparison(side).is_presence() || (side == HeaderSide::Value && op.key_op.is_presence()) {
        debug!(?side, "ignoring operand for presence side of header check");
        return next;
    }
    match side {
        HeaderSide::Key => next.key_operand = operand,
        HeaderSide::Value => next.value_operand = operand,
    }
    normalize_header(next)
}

/// Re-establish the header check invariants.
///
/// Presence on the key forces the same presence on the value and clears both
/// operands. Each presence side carries `none`; each value-bearing side
/// carries a literal or glob.
pub fn normalize_header(mut op: HeaderCheckOp) -> HeaderCheckOp {
    if op.key_op.is_presence() {
        op.value_op = op.key_op;
    }
    op.key_operand = normalize_operand(op.key_op, op.key_operand);
    op.value_operand = normalize_operand(op.value_op, op.value_operand);
    op
}

fn normalize_operand(cmp: Comparison, operand: HeaderOperand) -> HeaderOperand {
    match (cmp.is_presence(), operand) {
        (true, _) => HeaderOperand::None,
        (false, HeaderOperand::None) => HeaderOperand::literal(""),
        (false, operand) => operand,
    }
}

/// Canonical empty instance of each op kind
pub fn create_default(kind: OpKind) -> Op {
    match kind {
        OpKind::StatusCodeCheck => Op::StatusCode(StatusCodeOp {
            operator: Comparison::Equals,
            value: DEFAULT_STATUS_CODE,
        }),
        OpKind::JsonPath => Op::JsonPath(JsonPathOp::default()),
        OpKind::HeaderCheck => Op::Header(HeaderCheckOp {
            key_op: Comparison::Equals,
            key_operand: HeaderOperand::literal(""),
            value_op: Comparison::Equals,
            value_operand: HeaderOperand::literal(""),
        }),
        OpKind::And => Op::Group(GroupOp::and(Vec::new())),
        OpKind::Or => Op::Group(GroupOp::or(Vec::new())),
        OpKind::Not => Op::Not(NotOp::new(Op::Group(GroupOp::and(Vec::new())))),
    }
}

fn check_index(group: &GroupOp, index: usize) -> Result<()> {
    if index >= group.children.len() {
        return Err(RuleError::IndexOutOfRange {
            index,
            len: group.children.len(),
        });
    }
    Ok(())
}
