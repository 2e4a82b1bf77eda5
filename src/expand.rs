use proc_macro2::TokenStream as TokenStream2;
use quote::{ToTokens, quote};
use syn::Item;

use crate::assemble::assemble;
use crate::decl::attrs::strip_field_attrs;
use crate::decl::extract::{FlagHosts, extract};
use crate::decl::{DeclarationModel, SourceDeclaration};
use crate::diagnostic::{Diagnostic, Sink};
use crate::{bitmask, persist};

// ── driver ────────────────────────────────────────────────────────────────

/// Output of one macro invocation: generated code for every declaration that expanded,
/// and the diagnostics of every one that did not.
pub(crate) struct Expansion {
  pub tokens: TokenStream2,
  pub sink: Sink,
}

impl Expansion {
  fn emit(self) -> TokenStream2 {
    let Self { mut tokens, sink } = self;
    if !sink.is_empty() {
      tokens.extend(sink.to_compile_errors());
    }
    tokens
  }
}

fn expand_one(decl: &SourceDeclaration) -> Result<TokenStream2, Vec<Diagnostic>> {
  Ok(match extract(decl)? {
    DeclarationModel::FlagList(m) => assemble(bitmask::host_struct(&m), bitmask::generate(&m)),
    DeclarationModel::FieldList(m) => {
      let decls = persist::generate(&m);
      assemble(m.cleaned, decls)
    }
  })
}

/// Expand each declaration on its own; a failing one never stops its siblings.
pub(crate) fn expand_all(decls: impl IntoIterator<Item = SourceDeclaration>) -> Expansion {
  let mut sink = Sink::default();
  let mut tokens = TokenStream2::new();
  for decl in decls {
    match expand_one(&decl) {
      Ok(ts) => tokens.extend(ts),
      Err(diags) => {
        sink.extend(diags);
        // keep the type itself around so code naming it still resolves
        if let SourceDeclaration::FieldHost { item, .. } = decl {
          tokens.extend(reemit(item));
        }
      }
    }
  }
  Expansion { tokens, sink }
}

fn reemit(item: Item) -> TokenStream2 {
  match item {
    Item::Struct(st) => strip_field_attrs(st).into_token_stream(),
    other => quote!(#other),
  }
}

pub(crate) fn option_sets(input: TokenStream2) -> TokenStream2 {
  match syn::parse2::<FlagHosts>(input) {
    Ok(FlagHosts(hosts)) => expand_all(hosts.into_iter().map(SourceDeclaration::FlagHost)).emit(),
    Err(err) => err.to_compile_error(),
  }
}

pub(crate) fn persistable(args: TokenStream2, item: Item) -> TokenStream2 {
  expand_all([SourceDeclaration::FieldHost { args, item }]).emit()
}
