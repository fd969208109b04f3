//! Repairs the static typing of lambda-shaped arguments after a generic call
//! has been re-closed over new type arguments.

use crate::expr::{BuildError, Expr, ExprKind};
use crate::types::Type;

/// Retype each argument against the rebound method's parameter types.
pub fn coerce_arguments(args: Vec<Expr>, param_types: &[Type], method: &str) -> Result<Vec<Expr>, BuildError> {
    if args.len() != param_types.len() {
        return Err(BuildError::ArgumentCount {
            method: method.to_string(),
            expected: param_types.len(),
            found: args.len(),
        });
    }
    args.into_iter()
        .zip(param_types)
        .map(|(arg, need)| coerce_argument(arg, need))
        .collect()
}

/// Lambdas are rebuilt with their delegate type forced to `need` (unwrapped
/// from `Expression<..>` when quoted); unary wrappers are repaired through
/// their operand; anything else is returned as is.
pub fn coerce_argument(arg: Expr, need: &Type) -> Result<Expr, BuildError> {
    match arg.kind() {
        ExprKind::Lambda(lambda) => {
            let delegate = if need.is_expression() { &need.generic_args()[0] } else { need };
            if delegate == &lambda.delegate_type {
                return Ok(arg);
            }
            Expr::lambda_typed(
                delegate.clone(),
                lambda.body.clone(),
                lambda.name.clone(),
                lambda.tail_call,
                lambda.params.clone(),
            )
        }
        ExprKind::Unary(unary) => {
            let operand = coerce_argument(unary.operand.clone(), need)?;
            arg.update_unary(operand)
        }
        _ => Ok(arg),
    }
}
