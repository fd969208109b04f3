//! Type-substitution rewriting of expression trees.
//!
//! A pass walks the tree from the root, rewriting children before rebuilding
//! each node, and returns a freshly built tree in which every occurrence of a
//! substituted type (including inside generic arguments, method
//! instantiations and member declaring types) has been replaced.
//!
//! Parameter and constant nodes are memoized by identity for the duration of
//! one pass, so a lambda's body keeps referring to the parameters the rebuilt
//! lambda declares. The memo never outlives the top-level call that made it.
//!
//! ```ignore
//! let config = SubstitutionConfig::new()
//!     .substitute(Type::named("ItemFrom"), Type::named("ItemTo"));
//! let rewritten = exprmap::visit(Some(&expr), &config, &catalog)?;
//! ```

pub mod coerce;
pub mod members;
pub mod memo;
pub mod subst;

use tracing::{debug, trace};

use crate::config::SubstitutionConfig;
use crate::diagnostics::RewriteError;
use crate::expr::{BuildError, Expr, ExprKind, UnaryOp};
use crate::reflection::Reflect;

pub use coerce::{coerce_argument, coerce_arguments};
pub use members::resolve_member;
pub use memo::IdentityMemo;
pub use subst::{rebind_method, rebind_optional, resolve_type};

/// Rewrite `node` under `config`. Absence is preserved: `None` in, `None` out.
pub fn visit(
    node: Option<&Expr>,
    config: &SubstitutionConfig,
    reflect: &dyn Reflect,
) -> Result<Option<Expr>, RewriteError> {
    node.map(|n| Rewriter::new(config, reflect).rewrite(n)).transpose()
}

/// Borrowed, read-only context for rewrite passes. One `Rewriter` can run any
/// number of independent passes; each pass gets its own memo.
#[derive(Clone, Copy)]
pub struct Rewriter<'a> {
    config: &'a SubstitutionConfig,
    reflect: &'a dyn Reflect,
}

impl<'a> Rewriter<'a> {
    pub fn new(config: &'a SubstitutionConfig, reflect: &'a dyn Reflect) -> Self {
        Self { config, reflect }
    }

    /// Run one pass over `root`.
    pub fn rewrite(&self, root: &Expr) -> Result<Expr, RewriteError> {
        self.rewrite_with_memo(root).map(|(expr, _)| expr)
    }

    /// Run one pass over `root`, also returning the memo it built.
    pub fn rewrite_with_memo(&self, root: &Expr) -> Result<(Expr, IdentityMemo), RewriteError> {
        let mut memo = IdentityMemo::new();
        debug!(
            root = %root.node_kind(),
            substitutions = self.config.substitutions().len(),
            "rewrite pass started"
        );
        let result = self.rewrite_node(root, &mut memo);
        match &result {
            Ok(_) => debug!(memoized = memo.len(), "rewrite pass finished"),
            Err(err) => debug!(memoized = memo.len(), error = %err, "rewrite pass failed"),
        }
        result.map(|expr| (expr, memo))
    }

    fn rewrite_optional(&self, node: Option<&Expr>, memo: &mut IdentityMemo) -> Result<Option<Expr>, RewriteError> {
        node.map(|n| self.rewrite_node(n, memo)).transpose()
    }

    fn rewrite_all(&self, nodes: &[Expr], memo: &mut IdentityMemo) -> Result<Vec<Expr>, RewriteError> {
        nodes.iter().map(|n| self.rewrite_node(n, memo)).collect()
    }

    fn rewrite_node(&self, node: &Expr, memo: &mut IdentityMemo) -> Result<Expr, RewriteError> {
        match node.kind() {
            ExprKind::Call(call) => {
                let args = self.rewrite_all(&call.args, memo)?;
                let object = self.rewrite_optional(call.object.as_ref(), memo)?;
                if call.method.is_generic() {
                    let method = rebind_method(&call.method, self.config).map_err(BuildError::from)?;
                    let args = coerce_arguments(args, &method.parameter_types(), method.name())?;
                    Ok(Expr::call(object, method, args)?)
                } else {
                    Ok(node.update_call(object, args)?)
                }
            }

            ExprKind::Lambda(lambda) => {
                // Parameters first, so references in the body hit the memo.
                let params = self.rewrite_all(&lambda.params, memo)?;
                let body = self.rewrite_node(&lambda.body, memo)?;
                Ok(Expr::lambda_with(body, lambda.name.clone(), lambda.tail_call, params)?)
            }

            ExprKind::Parameter(param) => {
                if let Some(seen) = memo.lookup(node) {
                    return Ok(seen.clone());
                }
                let ty = resolve_type(&param.ty, self.config);
                let replacement = Expr::parameter_with(ty, param.name.clone(), param.is_by_ref);
                trace!(
                    name = param.name.as_deref().unwrap_or("_"),
                    from = %param.ty,
                    to = %replacement.ty(),
                    "parameter replaced"
                );
                memo.record(node, replacement.clone());
                Ok(replacement)
            }

            ExprKind::Member(access) => {
                let object = self.rewrite_optional(access.object.as_ref(), memo)?;
                let member = resolve_member(&access.member, self.config, self.reflect)?;
                Ok(Expr::member(object, member)?)
            }

            ExprKind::Constant(constant) => {
                if let Some(seen) = memo.lookup(node) {
                    return Ok(seen.clone());
                }
                let replacement = Expr::constant(self.config.transform_constant(&constant.value));
                trace!(from = %constant.value, to = %replacement, "constant replaced");
                memo.record(node, replacement.clone());
                Ok(replacement)
            }

            ExprKind::Unary(unary) => {
                let operand = self.rewrite_node(&unary.operand, memo)?;
                let method = rebind_optional(unary.method.as_ref(), self.config).map_err(BuildError::from)?;
                let ty = match unary.op {
                    UnaryOp::Quote => unary.ty.clone(),
                    _ => resolve_type(&unary.ty, self.config),
                };
                Ok(Expr::unary(unary.op, operand, ty, method)?)
            }

            ExprKind::Binary(binary) => {
                let left = self.rewrite_node(&binary.left, memo)?;
                let right = self.rewrite_node(&binary.right, memo)?;
                let conversion = self.rewrite_optional(binary.conversion.as_ref(), memo)?;
                let method = rebind_optional(binary.method.as_ref(), self.config).map_err(BuildError::from)?;
                Ok(Expr::make_binary(binary.op, left, right, binary.lifted_to_null, method, conversion)?)
            }

            ExprKind::Conditional(_) | ExprKind::Invoke(_) | ExprKind::Default { .. } => {
                Err(RewriteError::unsupported(node.node_kind()))
            }
        }
    }
}
