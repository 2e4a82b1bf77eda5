use syn::spanned::Spanned;
use syn::{Attribute, Expr, Fields, ItemStruct, Token};

use crate::decl::LegacyKey;
use crate::decl::args::string_literal;
use crate::diagnostic::{Diagnostic, DiagnosticKind};

pub(crate) const FIELD_ATTR: &str = "persist";

#[derive(Default)]
pub(crate) struct FieldDirective {
  pub skip: bool,
  pub default_expr: Option<Expr>,
  pub legacy_keys: Vec<LegacyKey>,
}

/// Collect every `#[persist(...)]` on one field. Argument problems are pushed to
/// `errors`; parsing continues so one pass reports all of them.
pub(crate) fn parse_field_attrs(attrs: &[Attribute], errors: &mut Vec<Diagnostic>) -> FieldDirective {
  let mut out = FieldDirective::default();
  for a in attrs.iter().filter(|a| a.path().is_ident(FIELD_ATTR)) {
    let parsed = a.parse_nested_meta(|meta| {
      if meta.path.is_ident("skip") {
        out.skip = true;
      } else if meta.path.is_ident("default") {
        out.default_expr = Some(meta.value()?.parse()?);
      } else if meta.path.is_ident("legacy") {
        let value: Expr = meta.value()?.parse()?;
        match string_literal(&value) {
          Some(key) => out.legacy_keys.push(LegacyKey { key, span: value.span() }),
          None => errors.push(Diagnostic::new(DiagnosticKind::ExpectedStringLiteral("legacy".into()), value.span())),
        }
      } else {
        let name = meta.path.get_ident().map(|i| i.to_string()).unwrap_or_else(|| "?".into());
        errors.push(Diagnostic::new(DiagnosticKind::UnknownArgument(name), meta.path.span()));
        // consume whatever follows so the remaining arguments still parse
        if meta.input.peek(Token![=]) {
          let _: Expr = meta.value()?.parse()?;
        } else if meta.input.peek(syn::token::Paren) {
          let _: proc_macro2::TokenTree = meta.input.parse()?;
        }
      }
      Ok(())
    });
    if let Err(e) = parsed {
      errors.push(e.into());
    }
  }
  if out.skip && !out.legacy_keys.is_empty() {
    errors.push(Diagnostic::new(DiagnosticKind::ConflictingFieldArguments, out.legacy_keys[0].span));
  }
  out
}

pub(crate) fn strip_field_attrs(mut item: ItemStruct) -> ItemStruct {
  if let Fields::Named(named) = &mut item.fields {
    for f in named.named.iter_mut() {
      f.attrs.retain(|a| !a.path().is_ident(FIELD_ATTR));
    }
  }
  item
}
