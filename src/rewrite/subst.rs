//! Type substitution and generic method re-closing.

use tracing::trace;

use crate::config::SubstitutionConfig;
use crate::types::{MethodRef, Type, TypeError};

/// Replacement for `ty` under the substitution table.
///
/// A table hit is returned verbatim. Otherwise a generic instantiation is
/// rebuilt from its definition over recursively resolved arguments, and any
/// other type is returned unchanged.
pub fn resolve_type(ty: &Type, config: &SubstitutionConfig) -> Type {
    if let Some(to) = config.lookup(ty) {
        return to.clone();
    }
    match ty {
        Type::Generic(def, args) => {
            Type::generic(def.clone(), args.iter().map(|a| resolve_type(a, config)).collect())
        }
        _ => ty.clone(),
    }
}

/// Re-close a generic method over its substituted type arguments.
/// Non-generic methods and open definitions pass through unchanged.
pub fn rebind_method(method: &MethodRef, config: &SubstitutionConfig) -> Result<MethodRef, TypeError> {
    if !method.is_generic() || method.is_generic_definition() {
        return Ok(method.clone());
    }
    let args = method
        .generic_arguments()
        .iter()
        .map(|a| resolve_type(a, config))
        .collect::<Vec<_>>();
    let rebound = MethodRef::make_generic(method.definition(), args)?;
    trace!(from = %method, to = %rebound, "rebound generic method");
    Ok(rebound)
}

/// `rebind_method` lifted over absence (operator overloads are optional).
pub fn rebind_optional(method: Option<&MethodRef>, config: &SubstitutionConfig) -> Result<Option<MethodRef>, TypeError> {
    method.map(|m| rebind_method(m, config)).transpose()
}
