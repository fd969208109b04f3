//! TOML substitution manifests.
//!
//! ```toml
//! match_mode = "exact"          # optional, defaults to "by_name"
//!
//! [[type]]
//! name = "Models.ItemFrom"
//! properties = [{ name = "Id", type = "long" }, { name = "GroupId", type = "long?" }]
//! fields = [{ name = "code", type = "string" }]
//!
//! [[substitute]]
//! from = "Models.ItemFrom"
//! to = "Models.ItemTo"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::config::{MatchMode, SubstitutionConfig};
use crate::diagnostics::TypeSyntaxError;
use crate::parser::parse_type;
use crate::reflection::{ClassDef, TypeCatalog};
use crate::span::Span;
use crate::types::Type;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid manifest: {msg}")]
    Toml { msg: String, span: Option<Span> },
    #[error(transparent)]
    TypeSyntax(TypeSyntaxError),
    #[error("unknown type '{name}' in substitution")]
    UnknownType { name: String, span: Span },
}

impl ManifestError {
    /// Byte span in the manifest text, when the error has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            ManifestError::Io { .. } => None,
            ManifestError::Toml { span, .. } => *span,
            ManifestError::TypeSyntax(err) => Some(err.span),
            ManifestError::UnknownType { span, .. } => Some(*span),
        }
    }
}

/// A loaded manifest: the declared classes (on top of the prelude) and the
/// substitution table.
#[derive(Debug)]
pub struct Manifest {
    pub catalog: TypeCatalog,
    pub config: SubstitutionConfig,
}

// ---- TOML deserialization types ----

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlManifest {
    #[serde(default)]
    match_mode: MatchMode,
    #[serde(default, rename = "type")]
    types: Vec<ClassDef>,
    #[serde(default)]
    substitute: Vec<TomlSubstitute>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlSubstitute {
    from: toml::Spanned<String>,
    to: toml::Spanned<String>,
}

pub fn load_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let source = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&source)
}

pub fn parse_manifest(source: &str) -> Result<Manifest, ManifestError> {
    let raw: TomlManifest = toml::from_str(source).map_err(|e| ManifestError::Toml {
        msg: e.message().to_string(),
        span: e.span().map(|r| Span::new(r.start, r.end)),
    })?;

    let mut catalog = TypeCatalog::with_prelude();
    for class in raw.types {
        catalog.add_class(class);
    }

    let mut config = SubstitutionConfig::new().match_mode(raw.match_mode);
    for pair in &raw.substitute {
        let from = declared_type(&pair.from, &catalog)?;
        let to = declared_type(&pair.to, &catalog)?;
        config = config.substitute(from, to);
    }

    Ok(Manifest { catalog, config })
}

/// Parse a spanned type string and require it to name a declared class.
fn declared_type(text: &toml::Spanned<String>, catalog: &TypeCatalog) -> Result<Type, ManifestError> {
    let span = text.span();
    // Skip the opening quote of the TOML string.
    let base = span.start + 1;
    let ty = parse_type(text.get_ref()).map_err(|e| {
        ManifestError::TypeSyntax(TypeSyntaxError::new(e.msg, e.span.offset(base)))
    })?;
    if !catalog.contains(&ty) {
        return Err(ManifestError::UnknownType {
            name: ty.to_string(),
            span: Span::new(span.start, span.end),
        });
    }
    Ok(ty)
}
