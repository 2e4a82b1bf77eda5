//! Normalized form of one decorated declaration.
//!
//! The extractor turns raw syntax into a [`DeclarationModel`] once; generators only ever
//! match on its two shapes.

use proc_macro2::Span;
use syn::ext::IdentExt;
use syn::{Attribute, Expr, Ident, Item, Type, Visibility};

pub(crate) mod args;
pub(crate) mod attrs;
pub(crate) mod extract;

/// Raw input handed over by rustc, before any analysis.
pub(crate) enum SourceDeclaration {
  /// One declaration from an `option_set! { ... }` body.
  FlagHost(extract::FlagHost),
  /// The item under `#[persistable]`, with the directive's own arguments.
  FieldHost { args: proc_macro2::TokenStream, item: Item },
}

pub(crate) enum DeclarationModel {
  FlagList(FlagListModel),
  FieldList(FieldListModel),
}

pub(crate) struct FlagListModel {
  pub type_name: Ident,
  pub access_level: Visibility,
  pub raw_storage_type: Type,
  pub cases: Vec<Ident>,
  /// Outer attributes of the host, directive removed.
  pub attrs: Vec<Attribute>,
  /// Nested items that are not the case list.
  pub carried: Vec<Item>,
}

#[derive(Clone)]
pub(crate) struct Field {
  pub name: Ident,
  pub ty: Type,
  pub is_optional: bool,
  pub default_expr: Option<Expr>,
  pub legacy_keys: Vec<LegacyKey>,
}

#[derive(Clone)]
pub(crate) struct LegacyKey {
  pub key: String,
  pub span: Span,
}

/// A `#[persist(skip)]` field: never encoded or decoded.
#[derive(Clone)]
pub(crate) struct Transient {
  pub name: Ident,
  pub default_expr: Option<Expr>,
}

pub(crate) struct FieldListModel {
  pub type_name: Ident,
  pub access_level: Visibility,
  pub is_unit: bool,
  pub fields: Vec<Field>,
  pub transient: Vec<Transient>,
  /// The host item with `#[persist]` helper attributes stripped.
  pub cleaned: syn::ItemStruct,
}

impl Field {
  /// Stored key: the field name without any `r#` prefix.
  pub(crate) fn key(&self) -> String {
    self.name.unraw().to_string()
  }

  /// Required fields are constructor parameters and must be present when decoding.
  pub(crate) fn is_required(&self) -> bool {
    !self.is_optional && self.default_expr.is_none()
  }
}

impl FieldListModel {
  /// Current keys first, then every legacy alias, in declaration order.
  pub(crate) fn all_keys(&self) -> Vec<String> {
    let current = self.fields.iter().map(Field::key);
    let legacy = self.fields.iter().flat_map(|f| f.legacy_keys.iter().map(|l| l.key.clone()));
    current.chain(legacy).collect()
  }
}
