//! Which capabilities a generated type still needs.
//!
//! A capability is a trait the generated code relies on. It is either granted by adding
//! the trait to the type's `#[derive(...)]`, or by an `impl` block we write ourselves.

use syn::punctuated::Punctuated;
use syn::{Attribute, Path, Token};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Grant {
  Derive,
  Impl,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Capability {
  pub name: &'static str,
  pub grant: Grant,
}

impl Capability {
  pub(crate) const fn derive(name: &'static str) -> Self {
    Self { name, grant: Grant::Derive }
  }

  pub(crate) const fn implemented(name: &'static str) -> Self {
    Self { name, grant: Grant::Impl }
  }
}

/// Trait names already listed in `#[derive(...)]` attributes, by last path segment.
pub(crate) fn declared_capabilities(attrs: &[Attribute]) -> Vec<String> {
  let mut out = Vec::new();
  for a in attrs.iter().filter(|a| a.path().is_ident("derive")) {
    // malformed derive lists are rustc's to report
    let Ok(paths) = a.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated) else { continue };
    out.extend(paths.iter().filter_map(|p| p.segments.last().map(|s| s.ident.to_string())));
  }
  out
}

/// The subset of `required` not already declared, in `required` order.
pub(crate) fn merge(declared: &[String], required: &[Capability]) -> Vec<Capability> {
  required.iter().filter(|c| !declared.iter().any(|d| d == c.name)).copied().collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use syn::parse_quote;

  const REQUIRED: &[Capability] =
    &[Capability::derive("Clone"), Capability::derive("Copy"), Capability::implemented("Debug")];

  #[test]
  fn reads_every_derive_by_last_segment() {
    let attrs: Vec<Attribute> = vec![
      parse_quote!(#[derive(Clone, core::fmt::Debug)]),
      parse_quote!(#[doc = "not a derive"]),
      parse_quote!(#[derive(::serde::Serialize)]),
    ];
    assert_eq!(declared_capabilities(&attrs), ["Clone", "Debug", "Serialize"]);
  }

  #[test]
  fn only_missing_capabilities_survive() {
    let declared = vec!["Debug".to_owned(), "Clone".to_owned()];
    assert_eq!(merge(&declared, REQUIRED), [Capability::derive("Copy")]);
  }

  #[test]
  fn nothing_missing_means_nothing_emitted() {
    let declared: Vec<String> = ["Clone", "Copy", "Debug", "Hash"].map(String::from).to_vec();
    assert!(merge(&declared, REQUIRED).is_empty());
  }
}
