//! Persistence support from a field list.
//!
//! Decoding accepts every current key plus the legacy aliases declared with
//! `#[persist(legacy = "...")]`; encoding only ever writes current keys, so stored data
//! drifts toward the current schema each time it is rewritten.

use proc_macro2::{Literal, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::Ident;
use syn::ext::IdentExt;

use crate::assemble::GeneratedDeclaration;
use crate::conformance::Capability;
use crate::decl::{Field, FieldListModel, Transient};

// ── key table ─────────────────────────────────────────────────────────────

/// One entry of the keyed lookup: a current key or a legacy alias of field `field`.
struct KeyEntry {
  key: String,
  variant: Ident,
  field: usize,
  legacy: Option<usize>,
}

fn key_table(model: &FieldListModel) -> Vec<KeyEntry> {
  let mut out: Vec<KeyEntry> = model
    .fields
    .iter()
    .enumerate()
    .map(|(i, f)| KeyEntry { key: f.key(), variant: format_ident!("__k{}", i), field: i, legacy: None })
    .collect();
  for (i, f) in model.fields.iter().enumerate() {
    for (a, l) in f.legacy_keys.iter().enumerate() {
      out.push(KeyEntry { key: l.key.clone(), variant: format_ident!("__k{}_legacy{}", i, a), field: i, legacy: Some(a) });
    }
  }
  out
}

fn slot(field: usize) -> Ident {
  format_ident!("__field{}", field)
}

fn legacy_slot(field: usize, alias: usize) -> Ident {
  format_ident!("__field{}_legacy{}", field, alias)
}

fn transient_init(t: &Transient) -> TokenStream2 {
  let name = &t.name;
  match &t.default_expr {
    Some(expr) => quote!( #name: #expr ),
    None => quote!( #name: ::core::default::Default::default() ),
  }
}

// ── entry ─────────────────────────────────────────────────────────────────

pub(crate) fn generate(model: &FieldListModel) -> Vec<GeneratedDeclaration> {
  let mut out = Vec::new();
  out.push(field_keys(model));
  out.extend(constructor(model));
  out.extend(raw_value_members(model));
  out.push(encode(model));
  out.push(decode(model));
  out.extend(string_round_trip(model));
  out
}

fn field_keys(model: &FieldListModel) -> GeneratedDeclaration {
  let vis = &model.access_level;
  let keys = model.fields.iter().map(Field::key);
  GeneratedDeclaration::member(quote! {
    /// Keys written when encoding, in declaration order. Legacy aliases are read-only
    /// and not listed.
    #vis const FIELD_KEYS: &'static [&'static str] = &[ #( #keys ),* ];
  })
}

fn constructor(model: &FieldListModel) -> Vec<GeneratedDeclaration> {
  let vis = &model.access_level;
  let required: Vec<&Field> = model.fields.iter().filter(|f| f.is_required()).collect();
  let params = required.iter().map(|f| {
    let (n, ty) = (&f.name, &f.ty);
    quote!( #n: #ty )
  });
  let inits = model.fields.iter().map(|f| {
    let n = &f.name;
    match (&f.default_expr, f.is_optional) {
      (Some(expr), _) => quote!( #n: #expr ),
      (None, true) => quote!( #n: ::core::option::Option::None ),
      (None, false) => quote!( #n ),
    }
  });
  let transient = model.transient.iter().map(transient_init);
  let body = if model.is_unit {
    quote!(Self)
  } else {
    quote!(Self { #( #inits, )* #( #transient, )* })
  };

  let mut out = vec![GeneratedDeclaration::member(quote! {
    /// Builds a value from its required fields. Optional fields start as `None` and
    /// defaulted fields at their declared default; see the `with_*` setters.
    #[allow(clippy::new_without_default)]
    #vis fn new( #( #params ),* ) -> Self {
      #body
    }
  })];
  for f in model.fields.iter().filter(|f| !f.is_required()) {
    let (n, ty) = (&f.name, &f.ty);
    let setter = format_ident!("with_{}", n.unraw());
    out.push(GeneratedDeclaration::member(quote! {
      #[must_use]
      #vis fn #setter(mut self, #n: #ty) -> Self {
        self.#n = #n;
        self
      }
    }));
  }
  out
}

fn raw_value_members(model: &FieldListModel) -> Vec<GeneratedDeclaration> {
  let vis = &model.access_level;
  vec![
    GeneratedDeclaration::member(quote! {
      /// The value as a single JSON string, for stores that only hold strings.
      /// Falls back to `{}` if a field refuses to serialize.
      #vis fn raw_value(&self) -> ::std::string::String {
        ::serde_json::to_string(self).unwrap_or_else(|_| ::std::string::String::from("{}"))
      }
    }),
    GeneratedDeclaration::member(quote! {
      /// Inverse of [`Self::raw_value`]; `None` when `raw` does not decode.
      #vis fn from_raw_value(raw: &str) -> ::core::option::Option<Self> {
        ::serde_json::from_str(raw).ok()
      }
    }),
  ]
}

fn encode(model: &FieldListModel) -> GeneratedDeclaration {
  let name = &model.type_name;
  let name_str = name.unraw().to_string();
  let len = Literal::usize_unsuffixed(model.fields.len());
  let writes = model.fields.iter().map(|f| {
    let (n, key) = (&f.name, f.key());
    quote!( ::serde::ser::SerializeStruct::serialize_field(&mut state, #key, &self.#n)?; )
  });
  GeneratedDeclaration::extension(
    Capability::implemented("Serialize"),
    quote! {
      impl ::serde::Serialize for #name {
        fn serialize<__S>(&self, serializer: __S) -> ::core::result::Result<__S::Ok, __S::Error>
        where
          __S: ::serde::Serializer,
        {
          #[allow(unused_mut)]
          let mut state = ::serde::Serializer::serialize_struct(serializer, #name_str, #len)?;
          #( #writes )*
          ::serde::ser::SerializeStruct::end(state)
        }
      }
    },
  )
}

fn decode(model: &FieldListModel) -> GeneratedDeclaration {
  let name = &model.type_name;
  let name_str = name.unraw().to_string();
  let expecting = format!("struct {name_str}");
  let table = key_table(model);
  let err = quote!(<__A::Error as ::serde::de::Error>);

  let variants = table.iter().map(|e| &e.variant);
  let key_arms = table.iter().map(|KeyEntry { key, variant, .. }| quote!( #key => __Key::#variant, ));
  let all_keys = model.all_keys();

  let slots = model.fields.iter().enumerate().flat_map(|(i, f)| {
    let ty = &f.ty;
    let current = slot(i);
    let legacy = (0..f.legacy_keys.len()).map(move |a| legacy_slot(i, a));
    std::iter::once(current).chain(legacy).map(move |s| quote!( let mut #s: ::core::option::Option<#ty> = ::core::option::Option::None; ))
  });

  let arms = table.iter().map(|e| {
    let KeyEntry { key, variant, field, legacy } = e;
    let ty = &model.fields[*field].ty;
    let current = slot(*field);
    match legacy {
      None => quote! {
        __Key::#variant => {
          if #current.is_some() {
            return ::core::result::Result::Err(#err::duplicate_field(#key));
          }
          #current = ::core::option::Option::Some(::serde::de::MapAccess::next_value::<#ty>(&mut map)?);
        }
      },
      Some(a) => {
        let own = legacy_slot(*field, *a);
        quote! {
          __Key::#variant => {
            if #own.is_some() {
              return ::core::result::Result::Err(#err::duplicate_field(#key));
            }
            if #current.is_some() {
              let _ = ::serde::de::MapAccess::next_value::<::serde::de::IgnoredAny>(&mut map)?;
            } else {
              #own = ::core::option::Option::Some(::serde::de::MapAccess::next_value::<#ty>(&mut map)?);
            }
          }
        }
      }
    }
  });

  let finish = model.fields.iter().enumerate().map(|(i, f)| {
    let current = slot(i);
    let fallbacks = (0..f.legacy_keys.len()).map(|a| legacy_slot(i, a));
    let key = f.key();
    let missing = match (&f.default_expr, f.is_optional) {
      (Some(expr), _) => quote!( #expr ),
      (None, true) => quote!( ::core::option::Option::None ),
      (None, false) => quote!( return ::core::result::Result::Err(#err::missing_field(#key)) ),
    };
    quote! {
      let #current = match #current #( .or(#fallbacks) )* {
        ::core::option::Option::Some(value) => value,
        ::core::option::Option::None => #missing,
      };
    }
  });

  // sequence form (non-self-describing formats): current fields in declaration order
  let seq_reads = model.fields.iter().enumerate().map(|(i, f)| {
    let (ty, current) = (&f.ty, slot(i));
    let index = Literal::usize_unsuffixed(i);
    let missing = match (&f.default_expr, f.is_optional) {
      (Some(expr), _) => quote!( #expr ),
      (None, true) => quote!( ::core::option::Option::None ),
      (None, false) => quote!( return ::core::result::Result::Err(#err::invalid_length(#index, &self)) ),
    };
    quote! {
      let #current = match ::serde::de::SeqAccess::next_element::<#ty>(&mut seq)? {
        ::core::option::Option::Some(value) => value,
        ::core::option::Option::None => #missing,
      };
    }
  });

  let inits = model.fields.iter().enumerate().map(|(i, f)| {
    let (n, s) = (&f.name, slot(i));
    quote!( #n: #s )
  });
  let transient = model.transient.iter().map(transient_init);
  let value = if model.is_unit {
    quote!(#name)
  } else {
    quote!(#name { #( #inits, )* #( #transient, )* })
  };

  GeneratedDeclaration::extension(
    Capability::implemented("Deserialize"),
    quote! {
      impl<'de> ::serde::Deserialize<'de> for #name {
        fn deserialize<__D>(deserializer: __D) -> ::core::result::Result<Self, __D::Error>
        where
          __D: ::serde::Deserializer<'de>,
        {
          #[allow(non_camel_case_types)]
          enum __Key {
            #( #variants, )*
            __ignore,
          }

          struct __KeyVisitor;

          impl<'de> ::serde::de::Visitor<'de> for __KeyVisitor {
            type Value = __Key;

            fn expecting(&self, formatter: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
              formatter.write_str("field identifier")
            }

            fn visit_str<__E>(self, value: &str) -> ::core::result::Result<__Key, __E>
            where
              __E: ::serde::de::Error,
            {
              ::core::result::Result::Ok(match value {
                #( #key_arms )*
                _ => __Key::__ignore,
              })
            }
          }

          impl<'de> ::serde::Deserialize<'de> for __Key {
            fn deserialize<__D2>(deserializer: __D2) -> ::core::result::Result<Self, __D2::Error>
            where
              __D2: ::serde::Deserializer<'de>,
            {
              ::serde::Deserializer::deserialize_identifier(deserializer, __KeyVisitor)
            }
          }

          struct __Visitor;

          impl<'de> ::serde::de::Visitor<'de> for __Visitor {
            type Value = #name;

            fn expecting(&self, formatter: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
              formatter.write_str(#expecting)
            }

            #[allow(unused_mut)]
            fn visit_map<__A>(self, mut map: __A) -> ::core::result::Result<#name, __A::Error>
            where
              __A: ::serde::de::MapAccess<'de>,
            {
              #( #slots )*
              while let ::core::option::Option::Some(key) = ::serde::de::MapAccess::next_key::<__Key>(&mut map)? {
                match key {
                  #( #arms )*
                  __Key::__ignore => {
                    let _ = ::serde::de::MapAccess::next_value::<::serde::de::IgnoredAny>(&mut map)?;
                  }
                }
              }
              #( #finish )*
              ::core::result::Result::Ok(#value)
            }

            #[allow(unused_mut)]
            fn visit_seq<__A>(self, mut seq: __A) -> ::core::result::Result<#name, __A::Error>
            where
              __A: ::serde::de::SeqAccess<'de>,
            {
              #( #seq_reads )*
              ::core::result::Result::Ok(#value)
            }
          }

          const FIELDS: &[&str] = &[ #( #all_keys ),* ];
          ::serde::Deserializer::deserialize_struct(deserializer, #name_str, FIELDS, __Visitor)
        }
      }
    },
  )
}

fn string_round_trip(model: &FieldListModel) -> Vec<GeneratedDeclaration> {
  let name = &model.type_name;
  vec![
    GeneratedDeclaration::extension(
      Capability::implemented("FromStr"),
      quote! {
        impl ::core::str::FromStr for #name {
          type Err = ::serde_json::Error;

          fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
            ::serde_json::from_str(s)
          }
        }
      },
    ),
    GeneratedDeclaration::extension(
      Capability::implemented("Display"),
      quote! {
        impl ::core::fmt::Display for #name {
          fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
            let text = ::serde_json::to_string(self).map_err(|_| ::core::fmt::Error)?;
            f.write_str(&text)
          }
        }
      },
    ),
  ]
}
