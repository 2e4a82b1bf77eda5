//! Bitmask-backed option sets from a flag list.
//!
//! Case `i` (declaration order) owns bit `1 << i` of the raw storage value. Names come in
//! two spellings: the display form (`NextDay`, `Read`) and the wire form (`next_day`,
//! `read`).

use convert_case::{Case, Casing};
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::ext::IdentExt;
use syn::{Ident, Item, ItemStruct, parse_quote};

use crate::assemble::GeneratedDeclaration;
use crate::conformance::Capability;
use crate::decl::FlagListModel;

/// Derived capabilities every option set relies on.
const DERIVES: [&str; 5] = ["Clone", "Copy", "PartialEq", "Eq", "Hash"];

/// Generated associated constant no case may map onto.
pub(crate) const RESERVED_CONST: &str = "OPTION_NAMES";

pub(crate) struct FlagCase {
  pub konst: Ident,
  pub position: usize,
  pub display: String,
  pub wire: String,
}

impl FlagCase {
  pub(crate) fn new(ident: &Ident, position: usize) -> Self {
    let spelled = ident.unraw().to_string();
    let mut chars = spelled.chars();
    let display = chars.next().map(|c| c.to_uppercase().chain(chars).collect()).unwrap_or_default();
    Self {
      konst: Ident::new(&spelled.to_case(Case::UpperSnake), ident.span()),
      position,
      display,
      wire: spelled.to_case(Case::Snake),
    }
  }
}

pub(crate) fn cases(model: &FlagListModel) -> Vec<FlagCase> {
  model.cases.iter().enumerate().map(|(i, c)| FlagCase::new(c, i)).collect()
}

/// The struct that carries the raw bits.
pub(crate) fn host_struct(model: &FlagListModel) -> ItemStruct {
  let FlagListModel { type_name, access_level, raw_storage_type, attrs, .. } = model;
  parse_quote! {
    #( #attrs )*
    #access_level struct #type_name {
      raw_value: #raw_storage_type,
    }
  }
}

pub(crate) fn generate(model: &FlagListModel) -> Vec<GeneratedDeclaration> {
  let cases = cases(model);
  let mut out: Vec<GeneratedDeclaration> = DERIVES.into_iter().map(GeneratedDeclaration::derive).collect();
  out.extend(storage_members(model));
  out.extend(flag_constants(model, &cases));
  out.extend(set_algebra(model, &cases));
  out.extend(naming(model, &cases));
  out.extend(operators(model));
  out.extend(formatting(model));
  for item in &model.carried {
    out.push(match item {
      Item::Fn(_) | Item::Const(_) => GeneratedDeclaration::member(quote!(#item)),
      other => GeneratedDeclaration::carried(other),
    });
  }
  out
}

fn storage_members(model: &FlagListModel) -> Vec<GeneratedDeclaration> {
  let vis = &model.access_level;
  let ty = &model.raw_storage_type;
  vec![
    GeneratedDeclaration::member(quote! {
      /// The empty set.
      #[inline]
      #vis const fn new() -> Self {
        Self { raw_value: 0 }
      }
    }),
    GeneratedDeclaration::member(quote! {
      /// Wrap raw bits as they are, including bits no option owns.
      #[inline]
      #vis const fn from_raw_value(raw_value: #ty) -> Self {
        Self { raw_value }
      }
    }),
    GeneratedDeclaration::member(quote! {
      #[inline]
      #vis const fn raw_value(self) -> #ty {
        self.raw_value
      }
    }),
  ]
}

fn flag_constants(model: &FlagListModel, cases: &[FlagCase]) -> Vec<GeneratedDeclaration> {
  let vis = &model.access_level;
  let mut out: Vec<_> = cases
    .iter()
    .map(|c| {
      let FlagCase { konst, position, display, .. } = c;
      let doc = format!("The `{display}` option, bit `1 << {position}`.");
      let shift = proc_macro2::Literal::usize_unsuffixed(*position);
      GeneratedDeclaration::member(quote! {
        #[doc = #doc]
        #vis const #konst: Self = Self { raw_value: 1 << #shift };
      })
    })
    .collect();
  let display = cases.iter().map(|c| &c.display);
  out.push(GeneratedDeclaration::member(quote! {
    /// Display names of every option, in declaration order.
    #vis const OPTION_NAMES: &'static [&'static str] = &[ #( #display ),* ];
  }));
  out
}

fn set_algebra(model: &FlagListModel, cases: &[FlagCase]) -> Vec<GeneratedDeclaration> {
  let vis = &model.access_level;
  let konsts: Vec<_> = cases.iter().map(|c| &c.konst).collect();
  vec![
    GeneratedDeclaration::member(quote! {
      /// Every declared option.
      #[inline]
      #vis const fn all() -> Self {
        Self { raw_value: 0 #( | Self::#konsts.raw_value )* }
      }
    }),
    GeneratedDeclaration::member(quote! {
      #[inline]
      #vis const fn is_empty(self) -> bool {
        self.raw_value == 0
      }
    }),
    GeneratedDeclaration::member(quote! {
      /// `true` when every bit of `other` is set in `self`.
      #[inline]
      #vis const fn contains(self, other: Self) -> bool {
        (self.raw_value & other.raw_value) == other.raw_value
      }
    }),
    GeneratedDeclaration::member(quote! {
      #[inline]
      #vis const fn union(self, other: Self) -> Self {
        Self { raw_value: self.raw_value | other.raw_value }
      }
    }),
    GeneratedDeclaration::member(quote! {
      #[inline]
      #vis const fn intersection(self, other: Self) -> Self {
        Self { raw_value: self.raw_value & other.raw_value }
      }
    }),
    GeneratedDeclaration::member(quote! {
      #[inline]
      #vis const fn difference(self, other: Self) -> Self {
        Self { raw_value: self.raw_value & !other.raw_value }
      }
    }),
    GeneratedDeclaration::member(quote! {
      /// Adds `other`; returns `false` if it was already fully present.
      #vis fn insert(&mut self, other: Self) -> bool {
        let fresh = !self.contains(other);
        self.raw_value |= other.raw_value;
        fresh
      }
    }),
    GeneratedDeclaration::member(quote! {
      /// Removes `other`; returns `true` if any of its bits were set.
      #vis fn remove(&mut self, other: Self) -> bool {
        let present = (self.raw_value & other.raw_value) != 0;
        self.raw_value &= !other.raw_value;
        present
      }
    }),
    GeneratedDeclaration::member(quote! {
      /// Contained single options, in declaration order.
      #vis fn iter(self) -> impl ::core::iter::Iterator<Item = Self> {
        [ #( Self::#konsts ),* ].into_iter().filter(move |flag| self.contains(*flag))
      }
    }),
  ]
}

fn naming(model: &FlagListModel, cases: &[FlagCase]) -> Vec<GeneratedDeclaration> {
  let vis = &model.access_level;
  let lookups = cases.iter().map(|FlagCase { konst, display, wire, .. }| {
    quote! {
      if self.raw_value == Self::#konst.raw_value {
        return ::core::option::Option::Some(if display { #display } else { #wire });
      }
    }
  });
  let from_name = cases.iter().map(|FlagCase { konst, display, wire, .. }| {
    if display == wire {
      quote!( #display => ::core::option::Option::Some(Self::#konst), )
    } else {
      quote!( #display | #wire => ::core::option::Option::Some(Self::#konst), )
    }
  });
  let joins = cases.iter().map(|FlagCase { konst, display, .. }| {
    quote! {
      if self.contains(Self::#konst) {
        names.push(#display);
      }
    }
  });
  vec![
    GeneratedDeclaration::member(quote! {
      /// Name of a single option: the display form (`NextDay`) when `display` is set,
      /// the wire form (`next_day`) otherwise. `None` for empty or combined sets.
      #vis fn name(self, display: bool) -> ::core::option::Option<&'static str> {
        #( #lookups )*
        ::core::option::Option::None
      }
    }),
    GeneratedDeclaration::member(quote! {
      /// Inverse of [`Self::name`]; accepts either spelling.
      #[allow(unreachable_patterns)]
      #vis fn from_name(name: &str) -> ::core::option::Option<Self> {
        match name {
          #( #from_name )*
          _ => ::core::option::Option::None,
        }
      }
    }),
    GeneratedDeclaration::member(quote! {
      /// Display names of the contained options in declaration order, joined by `", "`.
      #vis fn joined(self) -> ::std::string::String {
        let mut names: ::std::vec::Vec<&'static str> = ::std::vec::Vec::new();
        #( #joins )*
        names.join(", ")
      }
    }),
  ]
}

fn operators(model: &FlagListModel) -> Vec<GeneratedDeclaration> {
  let name = &model.type_name;
  let binary = |tr: &'static str, assign_tr: &'static str, op: TokenStream2| {
    let m = Ident::new(&tr.to_lowercase(), Span::call_site());
    let am = Ident::new(&format!("{}_assign", tr.to_lowercase()), Span::call_site());
    let (tr_id, assign_id) = (Ident::new(tr, Span::call_site()), Ident::new(assign_tr, Span::call_site()));
    [
      GeneratedDeclaration::extension(
        Capability::implemented(tr),
        quote! {
          impl ::core::ops::#tr_id for #name {
            type Output = Self;
            #[inline]
            fn #m(self, rhs: Self) -> Self {
              Self { raw_value: #op }
            }
          }
        },
      ),
      GeneratedDeclaration::extension(
        Capability::implemented(assign_tr),
        quote! {
          impl ::core::ops::#assign_id for #name {
            #[inline]
            fn #am(&mut self, rhs: Self) {
              *self = ::core::ops::#tr_id::#m(*self, rhs);
            }
          }
        },
      ),
    ]
  };
  let mut out = Vec::new();
  out.extend(binary("BitOr", "BitOrAssign", quote!(self.raw_value | rhs.raw_value)));
  out.extend(binary("BitAnd", "BitAndAssign", quote!(self.raw_value & rhs.raw_value)));
  out.extend(binary("Sub", "SubAssign", quote!(self.raw_value & !rhs.raw_value)));
  out.push(GeneratedDeclaration::extension(
    Capability::implemented("FromIterator"),
    quote! {
      impl ::core::iter::FromIterator<#name> for #name {
        fn from_iter<I: ::core::iter::IntoIterator<Item = #name>>(iter: I) -> Self {
          iter.into_iter().fold(Self::new(), |acc, flag| acc.union(flag))
        }
      }
    },
  ));
  out.push(GeneratedDeclaration::extension(
    Capability::implemented("Extend"),
    quote! {
      impl ::core::iter::Extend<#name> for #name {
        fn extend<I: ::core::iter::IntoIterator<Item = #name>>(&mut self, iter: I) {
          for flag in iter {
            self.insert(flag);
          }
        }
      }
    },
  ));
  out
}

fn formatting(model: &FlagListModel) -> Vec<GeneratedDeclaration> {
  let name = &model.type_name;
  let name_str = name.unraw().to_string();
  vec![
    GeneratedDeclaration::extension(
      Capability::implemented("Default"),
      quote! {
        impl ::core::default::Default for #name {
          #[inline]
          fn default() -> Self {
            Self::new()
          }
        }
      },
    ),
    GeneratedDeclaration::extension(
      Capability::implemented("Debug"),
      quote! {
        impl ::core::fmt::Debug for #name {
          fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
            f.write_str(#name_str)?;
            f.write_str("(")?;
            for (i, flag) in (*self).iter().enumerate() {
              if i > 0 {
                f.write_str(" | ")?;
              }
              f.write_str(flag.name(true).unwrap_or("?"))?;
            }
            f.write_str(")")
          }
        }
      },
    ),
  ]
}
