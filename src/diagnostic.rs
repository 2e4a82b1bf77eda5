//! Located, structured errors raised while expanding one declaration.
//!
//! Every diagnostic is an error. A declaration that produces one is not generated, but
//! its siblings in the same invocation still are.

use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum DiagnosticKind {
  // ── shape errors ──
  #[error("this directive can only be applied to a struct")]
  RequiresStruct,
  #[error("`#[persistable]` requires a struct with named fields")]
  RequiresNamedFields,
  #[error("option set requires a nested `enum {0}` listing its cases")]
  RequiresOptionsEnum(String),
  #[error("option case `{0}` cannot carry associated data")]
  OptionCaseHasData(String),
  #[error("option case `{0}` cannot have an explicit discriminant; its bit is its position")]
  OptionCaseHasDiscriminant(String),
  #[error("option case `{0}` maps to the same constant as an earlier case")]
  DuplicateOption(String),
  #[error("option case `{0}` would collide with the generated `OPTION_NAMES` constant")]
  ReservedOptionName(String),
  #[error("generic types are not supported by this directive")]
  UnsupportedGenerics,
  #[error("{count} option cases do not fit in the {bits} bits of `{storage}`")]
  TooManyOptions { count: usize, bits: u32, storage: String },
  // ── argument errors ──
  #[error("option set requires a raw storage type argument, e.g. `#[option_set(u8)]`")]
  RequiresOptionsEnumRawType,
  #[error("`{0}` expects a string literal")]
  ExpectedStringLiteral(String),
  #[error("unknown argument `{0}`")]
  UnknownArgument(String),
  #[error("legacy key `{0}` is the field's own name")]
  LegacyKeyMatchesName(String),
  #[error("key `{0}` is already used by another field")]
  DuplicateKey(String),
  #[error("`skip` cannot be combined with `legacy`")]
  ConflictingFieldArguments,
  #[error("{0}")]
  MalformedDirective(String),
  // ── empty input ──
  #[error("`enum {0}` declares no cases; an option set needs at least one")]
  EmptyOptions(String),
}

impl DiagnosticKind {
  /// Stable `domain.discriminant` identifier, independent of the message wording.
  pub(crate) fn id(&self) -> &'static str {
    match self {
      Self::RequiresStruct => "shapegen.requiresStruct",
      Self::RequiresNamedFields => "shapegen.requiresNamedFields",
      Self::RequiresOptionsEnum(_) => "shapegen.requiresOptionsEnum",
      Self::OptionCaseHasData(_) => "shapegen.optionCaseHasData",
      Self::OptionCaseHasDiscriminant(_) => "shapegen.optionCaseHasDiscriminant",
      Self::DuplicateOption(_) => "shapegen.duplicateOption",
      Self::ReservedOptionName(_) => "shapegen.reservedOptionName",
      Self::UnsupportedGenerics => "shapegen.unsupportedGenerics",
      Self::TooManyOptions { .. } => "shapegen.tooManyOptions",
      Self::RequiresOptionsEnumRawType => "shapegen.requiresOptionsEnumRawType",
      Self::ExpectedStringLiteral(_) => "shapegen.expectedStringLiteral",
      Self::UnknownArgument(_) => "shapegen.unknownArgument",
      Self::LegacyKeyMatchesName(_) => "shapegen.legacyKeyMatchesName",
      Self::DuplicateKey(_) => "shapegen.duplicateKey",
      Self::ConflictingFieldArguments => "shapegen.conflictingFieldArguments",
      Self::MalformedDirective(_) => "shapegen.malformedDirective",
      Self::EmptyOptions(_) => "shapegen.emptyOptions",
    }
  }
}

#[derive(Clone, Debug)]
pub(crate) struct Diagnostic {
  pub kind: DiagnosticKind,
  pub span: Span,
}

impl Diagnostic {
  pub(crate) fn new(kind: DiagnosticKind, span: Span) -> Self {
    Self { kind, span }
  }

  pub(crate) fn to_syn_error(&self) -> syn::Error {
    syn::Error::new(self.span, format!("{} [{}]", self.kind, self.kind.id()))
  }
}

// syn parse failures inside a directive keep their span but get our identifier.
impl From<syn::Error> for Diagnostic {
  fn from(err: syn::Error) -> Self {
    Self::new(DiagnosticKind::MalformedDirective(err.to_string()), err.span())
  }
}

/// Append-only sink shared by every declaration of one invocation.
#[derive(Default)]
pub(crate) struct Sink {
  diagnostics: Vec<Diagnostic>,
}

impl Sink {
  pub(crate) fn extend(&mut self, diags: impl IntoIterator<Item = Diagnostic>) {
    self.diagnostics.extend(diags);
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.diagnostics.is_empty()
  }

  #[cfg(test)]
  pub(crate) fn diagnostics(&self) -> &[Diagnostic] {
    &self.diagnostics
  }

  pub(crate) fn to_compile_errors(&self) -> TokenStream2 {
    let es = self.diagnostics.iter().map(|d| d.to_syn_error().to_compile_error());
    quote! { #( #es )* }
  }
}
