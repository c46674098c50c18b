//! Addressing nested ops by child-index path
//!
//! A path is a list of child indices starting at the root group. A `not`
//! node has exactly one child, at index 0. The empty path is the root.

use crate::assertion::ast::{GroupOp, NotOp, Op};
use crate::assertion::edit;
use crate::error::{Result, RuleError};

/// Borrow the op at `path`
pub fn op_at_path<'a>(root: &'a Op, path: &[usize]) -> Result<&'a Op> {
    let mut current = root;
    for (depth, &index) in path.iter().enumerate() {
        current = child(current, index).map_err(|err| at_depth(err, path, depth))?;
    }
    Ok(current)
}

/// Replace the op at `path`; the empty path replaces nothing and is rejected
pub fn replace_at_path(root: &GroupOp, path: &[usize], op: Op) -> Result<GroupOp> {
    update_at_path(root, path, |_| Ok(op))
}

/// Remove the op at `path` from its parent group
pub fn remove_at_path(root: &GroupOp, path: &[usize]) -> Result<GroupOp> {
    let Some((&last, parent_path)) = path.split_last() else {
        return Err(invalid(path, "the root group cannot be removed"));
    };

    if parent_path.is_empty() {
        return edit::remove_child_at(root, last);
    }

    update_at_path(root, parent_path, |parent| match parent {
        Op::Group(group) => Ok(Op::Group(edit::remove_child_at(group, last)?)),
        Op::Not(_) => Err(invalid(path, "the operand of a not cannot be removed")),
        _ => Err(invalid(path, "parent is not a group")),
    })
}

/// Append `op` to the group at `path`
pub fn add_child_at_path(root: &GroupOp, path: &[usize], op: Op) -> Result<GroupOp> {
    if path.is_empty() {
        return Ok(edit::add_child(root, op));
    }

    update_at_path(root, path, |target| match target {
        Op::Group(group) => Ok(Op::Group(edit::add_child(group, op))),
        _ => Err(invalid(path, "target is not a group")),
    })
}

/// Rebuild the spine from the root down to `path`, replacing the op there with
/// the result of `f`. Siblings along the way are cloned unchanged.
pub fn update_at_path<F>(root: &GroupOp, path: &[usize], f: F) -> Result<GroupOp>
where
    F: FnOnce(&Op) -> Result<Op>,
{
    let Some((&first, rest)) = path.split_first() else {
        return Err(invalid(path, "empty path does not address a child"));
    };

    let target = root
        .children
        .get(first)
        .ok_or_else(|| out_of_range(first, root.children.len()))?;
    let updated = update_op(target, rest, f, path, 1)?;
    edit::replace_child_at(root, first, updated)
}

fn update_op<F>(op: &Op, rest: &[usize], f: F, full: &[usize], depth: usize) -> Result<Op>
where
    F: FnOnce(&Op) -> Result<Op>,
{
    let Some((&index, tail)) = rest.split_first() else {
        return f(op);
    };

    match op {
        Op::Group(group) => {
            let target = group
                .children
                .get(index)
                .ok_or_else(|| out_of_range(index, group.children.len()))?;
            let updated = update_op(target, tail, f, full, depth + 1)?;
            Ok(Op::Group(edit::replace_child_at(group, index, updated)?))
        }
        Op::Not(not) => {
            if index != 0 {
                return Err(out_of_range(index, 1));
            }
            let updated = update_op(&not.operand, tail, f, full, depth + 1)?;
            Ok(Op::Not(NotOp::new(updated)))
        }
        Op::StatusCode(_) | Op::JsonPath(_) | Op::Header(_) => {
            Err(invalid(&full[..=depth], "cannot descend below a leaf"))
        }
    }
}

fn child(op: &Op, index: usize) -> Result<&Op> {
    match op {
        Op::Group(group) => group
            .children
            .get(index)
            .ok_or_else(|| out_of_range(index, group.children.len())),
        Op::Not(not) if index == 0 => Ok(&not.operand),
        Op::Not(_) => Err(out_of_range(index, 1)),
        Op::StatusCode(_) | Op::JsonPath(_) | Op::Header(_) => Err(RuleError::InvalidPath {
            path: Vec::new(),
            reason: "cannot descend below a leaf".to_string(),
        }),
    }
}

fn out_of_range(index: usize, len: usize) -> RuleError {
    RuleError::IndexOutOfRange { index, len }
}

/// Attach the failing path prefix to path errors
fn at_depth(err: RuleError, path: &[usize], depth: usize) -> RuleError {
    match err {
        RuleError::InvalidPath { reason, .. } => RuleError::InvalidPath {
            path: path[..=depth].to_vec(),
            reason,
        },
        other => other,
    }
}

fn invalid(path: &[usize], reason: &str) -> RuleError {
    RuleError::InvalidPath {
        path: path.to_vec(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::ast::{Comparison, GroupKind, JsonPathOp, StatusCodeOp};

    fn status(value: u16) -> Op {
        Op::StatusCode(StatusCodeOp {
            operator: Comparison::Equals,
            value,
        })
    }

    /// and[ status 200, or[ status 301, not(status 500) ] ]
    fn sample_root() -> GroupOp {
        GroupOp::and(vec![
            status(200),
            Op::Group(GroupOp::or(vec![status(301), Op::Not(NotOp::new(status(500)))])),
        ])
    }

    #[test]
    fn test_op_at_path() {
        let root = Op::Group(sample_root());
        assert_eq!(op_at_path(&root, &[]).unwrap(), &root);
        assert_eq!(op_at_path(&root, &[1, 0]).unwrap(), &status(301));
        assert_eq!(op_at_path(&root, &[1, 1, 0]).unwrap(), &status(500));
    }

    #[test]
    fn test_op_at_path_errors() {
        let root = Op::Group(sample_root());
        assert_eq!(
            op_at_path(&root, &[5]),
            Err(RuleError::IndexOutOfRange { index: 5, len: 2 })
        );
        assert_eq!(
            op_at_path(&root, &[1, 1, 1]),
            Err(RuleError::IndexOutOfRange { index: 1, len: 1 })
        );
        assert!(matches!(
            op_at_path(&root, &[0, 0]),
            Err(RuleError::InvalidPath { ref path, .. }) if path == &vec![0, 0]
        ));
    }

    #[test]
    fn test_replace_nested() {
        let root = sample_root();
        let next = replace_at_path(&root, &[1, 1, 0], status(503)).unwrap();

        let next_op = Op::Group(next);
        assert_eq!(op_at_path(&next_op, &[1, 1, 0]).unwrap(), &status(503));
        assert_eq!(op_at_path(&next_op, &[0]).unwrap(), &status(200));
        // input tree is unchanged
        assert_eq!(op_at_path(&Op::Group(root), &[1, 1, 0]).unwrap(), &status(500));
    }

    #[test]
    fn test_remove_nested() {
        let next = remove_at_path(&sample_root(), &[1, 0]).unwrap();
        let group = next.children[1].as_group().unwrap();
        assert_eq!(group.kind, GroupKind::Or);
        assert_eq!(group.children.len(), 1);
        assert!(matches!(group.children[0], Op::Not(_)));
    }

    #[test]
    fn test_remove_root_rejected() {
        assert!(matches!(
            remove_at_path(&sample_root(), &[]),
            Err(RuleError::InvalidPath { .. })
        ));
        assert!(matches!(
            remove_at_path(&sample_root(), &[1, 1, 0]),
            Err(RuleError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_add_child_at_path() {
        let json_path = Op::JsonPath(JsonPathOp {
            value: "$.a".to_string(),
        });
        let next = add_child_at_path(&sample_root(), &[1], json_path.clone()).unwrap();
        let group = next.children[1].as_group().unwrap();
        assert_eq!(group.children.last(), Some(&json_path));

        let next = add_child_at_path(&sample_root(), &[], json_path.clone()).unwrap();
        assert_eq!(next.children.len(), 3);

        assert!(matches!(
            add_child_at_path(&sample_root(), &[0], json_path),
            Err(RuleError::InvalidPath { .. })
        ));
    }
}
