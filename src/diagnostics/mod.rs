use crate::expr::{BuildError, NodeKind};
use crate::span::Span;
use crate::types::Type;
use thiserror::Error;

/// Malformed type text, with the byte span it was found at.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("type syntax error: {msg}")]
pub struct TypeSyntaxError {
    pub msg: String,
    pub span: Span,
}

impl TypeSyntaxError {
    pub fn new(msg: impl Into<String>, span: Span) -> Self {
        Self { msg: msg.into(), span }
    }
}

/// Terminal failure of a rewrite pass. A pass is all-or-nothing: any of
/// these aborts it and no partial tree is returned.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error(
        "cannot resolve member '{member}' of '{declaring_type}': \
         no property or field named '{member}' on '{resolved_type}'"
    )]
    UnresolvedMember {
        member: String,
        declaring_type: Type,
        resolved_type: Type,
    },

    #[error("unsupported expression node kind: {kind}")]
    UnsupportedNodeKind { kind: NodeKind },

    #[error("invalid rewritten node: {0}")]
    Build(#[from] BuildError),
}

impl RewriteError {
    pub fn unresolved_member(member: impl Into<String>, declaring_type: Type, resolved_type: Type) -> Self {
        Self::UnresolvedMember { member: member.into(), declaring_type, resolved_type }
    }

    pub fn unsupported(kind: NodeKind) -> Self {
        Self::UnsupportedNodeKind { kind }
    }
}

/// Render a span-carrying error against its source with ariadne.
pub fn render_span_error(source: &str, filename: &str, msg: &str, span: Span) {
    use ariadne::{Label, Report, ReportKind, Source};

    let result = Report::build(ReportKind::Error, (), span.start)
        .with_message(format!("{filename}: {msg}"))
        .with_label(Label::new(span.range()).with_message(msg))
        .finish()
        .eprint(Source::from(source));
    if result.is_err() {
        eprintln!("error: {filename}: {msg}");
    }
}
