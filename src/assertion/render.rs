//! Compact one-line rendering of assertion trees

use std::fmt;

use crate::assertion::ast::{Assertion, Comparison, GroupKind, GroupOp, HeaderOperand, Op};

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for HeaderOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderOperand::None => Ok(()),
            HeaderOperand::Literal { value } => write!(f, "{:?}", value),
            HeaderOperand::Glob { pattern } => write!(f, "glob {:?}", pattern.value),
        }
    }
}

impl fmt::Display for GroupOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.kind {
            GroupKind::And => "all",
            GroupKind::Or => "any",
        };
        write!(f, "{}(", name)?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", child)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Group(group) => write!(f, "{}", group),
            Op::Not(not) => write!(f, "not({})", not.operand),
            Op::StatusCode(op) => write!(f, "status_code {} {}", op.operator, op.value),
            Op::JsonPath(op) => write!(f, "json_path({})", op.value),
            Op::Header(op) => {
                f.write_str("header(key ")?;
                write_side(f, op.key_op, &op.key_operand)?;
                f.write_str(", value ")?;
                write_side(f, op.value_op, &op.value_operand)?;
                f.write_str(")")
            }
        }
    }
}

fn write_side(f: &mut fmt::Formatter<'_>, cmp: Comparison, operand: &HeaderOperand) -> fmt::Result {
    if operand.is_none() {
        write!(f, "{}", cmp)
    } else {
        write!(f, "{} {}", cmp, operand)
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::ast::{HeaderCheckOp, JsonPathOp, NotOp, StatusCodeOp};

    #[test]
    fn test_render_tree() {
        let assertion = Assertion::new(GroupOp::and(vec![
            Op::StatusCode(StatusCodeOp {
                operator: Comparison::NotEqual,
                value: 500,
            }),
            Op::Group(GroupOp::or(vec![
                Op::JsonPath(JsonPathOp {
                    value: "$.ok".to_string(),
                }),
                Op::Not(NotOp::new(Op::Header(HeaderCheckOp {
                    key_op: Comparison::Equals,
                    key_operand: HeaderOperand::literal("x-cache"),
                    value_op: Comparison::Equals,
                    value_operand: HeaderOperand::glob("HIT*"),
                }))),
            ])),
        ]));

        assert_eq!(
            assertion.to_string(),
            "all(status_code \u{2260} 500, any(json_path($.ok), not(header(key = \"x-cache\", value = glob \"HIT*\"))))"
        );
    }

    #[test]
    fn test_render_presence_header() {
        let op = Op::Header(HeaderCheckOp {
            key_op: Comparison::Never,
            key_operand: HeaderOperand::None,
            value_op: Comparison::Never,
            value_operand: HeaderOperand::None,
        });
        assert_eq!(op.to_string(), "header(key \u{2205}, value \u{2205})");
        assert_eq!(GroupOp::and(Vec::new()).to_string(), "all()");
    }
}
