use serde::{Deserialize, Serialize};

use crate::expr::Value;
use crate::types::{Member, Type};

/// How substitution-table keys are matched against types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Match on simple name. Distinct types sharing a simple name collide.
    #[default]
    ByName,
    /// Match on the full type identity.
    Exact,
}

pub type ConstantTransform = Box<dyn Fn(&Value) -> Value + Send + Sync>;
pub type MemberOverride = Box<dyn Fn(&Member) -> Option<Member> + Send + Sync>;

/// Drives one or more rewrite passes. Read-only while a pass runs, so one
/// configuration may serve concurrent passes on different threads.
#[derive(Default)]
pub struct SubstitutionConfig {
    substitutions: Vec<(Type, Type)>,
    match_mode: MatchMode,
    constant_transform: Option<ConstantTransform>,
    member_override: Option<MemberOverride>,
}

impl std::fmt::Debug for SubstitutionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubstitutionConfig")
            .field("substitutions", &self.substitutions)
            .field("match_mode", &self.match_mode)
            .field("constant_transform", &self.constant_transform.is_some())
            .field("member_override", &self.member_override.is_some())
            .finish()
    }
}

impl SubstitutionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `(from, to)` pair. Earlier pairs win when several match.
    pub fn substitute(mut self, from: Type, to: Type) -> Self {
        self.substitutions.push((from, to));
        self
    }

    pub fn match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    /// Transform applied to each distinct constant node's value. Defaults to identity.
    pub fn with_constant_transform(mut self, f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        self.constant_transform = Some(Box::new(f));
        self
    }

    /// Consulted before name-based member resolution; `Some` wins unconditionally.
    pub fn with_member_override(mut self, f: impl Fn(&Member) -> Option<Member> + Send + Sync + 'static) -> Self {
        self.member_override = Some(Box::new(f));
        self
    }

    pub fn substitutions(&self) -> &[(Type, Type)] {
        &self.substitutions
    }

    pub fn mode(&self) -> MatchMode {
        self.match_mode
    }

    /// Destination type for `ty`, if the table has a matching source entry.
    pub fn lookup(&self, ty: &Type) -> Option<&Type> {
        self.substitutions
            .iter()
            .find(|(from, _)| self.same_type(from, ty))
            .map(|(_, to)| to)
    }

    /// Type equality under the configured match mode. By name, generic
    /// arguments are compared by name as well.
    pub fn same_type(&self, a: &Type, b: &Type) -> bool {
        match self.match_mode {
            MatchMode::ByName => {
                a.name() == b.name()
                    && a.generic_args().len() == b.generic_args().len()
                    && a.generic_args().iter().zip(b.generic_args()).all(|(x, y)| self.same_type(x, y))
            }
            MatchMode::Exact => a == b,
        }
    }

    pub fn transform_constant(&self, value: &Value) -> Value {
        match &self.constant_transform {
            Some(f) => f(value),
            None => value.clone(),
        }
    }

    pub fn override_member(&self, member: &Member) -> Option<Member> {
        self.member_override.as_ref().and_then(|f| f(member))
    }
}
