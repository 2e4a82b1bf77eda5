use proc_macro2::TokenStream as TokenStream2;
use quote::{ToTokens, quote};
use syn::{Ident, ItemStruct, parse_quote};

use crate::conformance::{Capability, Grant, declared_capabilities, merge};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Target {
  /// Goes into the type's inherent `impl` block.
  Member,
  /// Stands next to the type: a trait impl, a derive, or a carried item.
  Extension,
}

pub(crate) struct GeneratedDeclaration {
  pub target: Target,
  pub grants: Vec<Capability>,
  pub tokens: TokenStream2,
}

impl GeneratedDeclaration {
  pub(crate) fn member(tokens: TokenStream2) -> Self {
    Self { target: Target::Member, grants: Vec::new(), tokens }
  }

  pub(crate) fn extension(grant: Capability, tokens: TokenStream2) -> Self {
    Self { target: Target::Extension, grants: vec![grant], tokens }
  }

  /// A capability granted purely by `#[derive]`.
  pub(crate) fn derive(name: &'static str) -> Self {
    Self::extension(Capability::derive(name), TokenStream2::new())
  }

  /// Emitted as-is; grants nothing, so merging never drops it.
  pub(crate) fn carried(item: impl ToTokens) -> Self {
    Self { target: Target::Extension, grants: Vec::new(), tokens: item.into_token_stream() }
  }
}

/// Splice generated declarations around `host`.
///
/// Capabilities the host already derives are dropped; the remaining derivable ones become
/// one extra `#[derive(...)]` on the host.
pub(crate) fn assemble(mut host: ItemStruct, decls: Vec<GeneratedDeclaration>) -> TokenStream2 {
  let declared = declared_capabilities(&host.attrs);
  let required: Vec<Capability> = decls.iter().flat_map(|d| d.grants.iter().copied()).collect();
  let missing = merge(&declared, &required);

  let derives: Vec<Ident> = missing
    .iter()
    .filter(|c| c.grant == Grant::Derive)
    .map(|c| Ident::new(c.name, proc_macro2::Span::call_site()))
    .collect();
  if !derives.is_empty() {
    host.attrs.push(parse_quote!(#[derive( #( #derives ),* )]));
  }

  let name = &host.ident;
  let mut members = Vec::new();
  let mut extensions = Vec::new();
  for d in decls {
    match d.target {
      Target::Member => members.push(d.tokens),
      Target::Extension if d.grants.is_empty() => extensions.push(d.tokens),
      Target::Extension => {
        let wanted = d.grants.iter().any(|g| g.grant == Grant::Impl && missing.contains(g));
        if wanted {
          extensions.push(d.tokens);
        }
      }
    }
  }

  let inherent = if members.is_empty() {
    quote! {}
  } else {
    quote! {
      impl #name {
        #( #members )*
      }
    }
  };
  quote! {
    #host
    #inherent
    #( #extensions )*
  }
}
