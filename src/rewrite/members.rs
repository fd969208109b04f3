use tracing::trace;

use super::subst::resolve_type;
use crate::config::SubstitutionConfig;
use crate::diagnostics::RewriteError;
use crate::reflection::Reflect;
use crate::types::Member;

/// Migrate `member` to the substituted form of its declaring type.
///
/// Order: caller override, then no-op if the declaring type is unchanged,
/// then a same-named property, then a same-named field.
pub fn resolve_member(
    member: &Member,
    config: &SubstitutionConfig,
    reflect: &dyn Reflect,
) -> Result<Member, RewriteError> {
    if let Some(overridden) = config.override_member(member) {
        trace!(from = %member, to = %overridden, "member override");
        return Ok(overridden);
    }

    let resolved = resolve_type(&member.declaring_type, config);
    if config.same_type(&resolved, &member.declaring_type) {
        return Ok(member.clone());
    }

    if let Some(prop) = reflect.property(&resolved, &member.name) {
        return Ok(prop);
    }
    if let Some(field) = reflect.field(&resolved, &member.name) {
        return Ok(field);
    }

    Err(RewriteError::unresolved_member(
        member.name.clone(),
        member.declaring_type.clone(),
        resolved,
    ))
}
