//! Human-readable rendering of expression trees.
//!
//! Quotes are transparent, static calls and members are prefixed with the
//! simple name of their declaring type, and lambda parameters are annotated
//! with their types:
//!
//! `(x: Query<ItemTo>) => Queryable.Where<ItemTo>(x, (i: ItemTo) => (i.Id == 1))`

use std::fmt;

use super::{Expr, ExprKind, UnaryOp};
use crate::types::Type;

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 { write!(f, ", ")?; }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_type_args(f: &mut fmt::Formatter<'_>, args: &[Type]) -> fmt::Result {
    if args.is_empty() {
        return Ok(());
    }
    write!(f, "<")?;
    write_list(f, args)?;
    write!(f, ">")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Parameter(p) => write!(f, "{}", p.name.as_deref().unwrap_or("_")),
            ExprKind::Constant(c) => write!(f, "{}", c.value),
            ExprKind::Lambda(l) => {
                write!(f, "(")?;
                for (i, p) in l.params.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{p}: {}", p.ty())?;
                }
                write!(f, ") => {}", l.body)
            }
            ExprKind::Call(c) => {
                match &c.object {
                    Some(obj) => write!(f, "{obj}")?,
                    None => write!(f, "{}", c.method.declaring_type().name())?,
                }
                write!(f, ".{}", c.method.name())?;
                write_type_args(f, c.method.generic_arguments())?;
                write!(f, "(")?;
                write_list(f, &c.args)?;
                write!(f, ")")
            }
            ExprKind::Member(m) => match &m.object {
                Some(obj) => write!(f, "{obj}.{}", m.member.name),
                None => write!(f, "{}.{}", m.member.declaring_type.name(), m.member.name),
            },
            ExprKind::Unary(u) => match u.op {
                UnaryOp::Quote => write!(f, "{}", u.operand),
                UnaryOp::Convert => write!(f, "Convert({}, {})", u.operand, u.ty),
                UnaryOp::TypeAs => write!(f, "({} as {})", u.operand, u.ty),
                UnaryOp::Not => write!(f, "!{}", u.operand),
                UnaryOp::Negate => write!(f, "-{}", u.operand),
            },
            ExprKind::Binary(b) => write!(f, "({} {} {})", b.left, b.op.symbol(), b.right),
            ExprKind::Conditional(c) => write!(f, "IIF({}, {}, {})", c.test, c.if_true, c.if_false),
            ExprKind::Invoke(i) => {
                write!(f, "Invoke({}", i.target)?;
                for arg in &i.args {
                    write!(f, ", {arg}")?;
                }
                write!(f, ")")
            }
            ExprKind::Default { ty } => write!(f, "default({ty})"),
        }
    }
}
