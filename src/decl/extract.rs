//! Raw syntax → [`DeclarationModel`].
//!
//! Both extractors only read their input. They report every violated precondition they
//! can find in one pass rather than stopping at the first.

use std::collections::HashSet;

use proc_macro2::{Span, TokenStream as TokenStream2};
use syn::parse::{Parse, ParseStream};
use syn::spanned::Spanned;
use syn::{Attribute, Fields, Generics, Ident, Item, Result as SynResult, Token, Type, Visibility};

use crate::bitmask::{FlagCase, RESERVED_CONST};
use crate::decl::args::{DIRECTIVE, DirectiveOpts, parse_persistable_args, primitive_bits};
use crate::decl::attrs::{parse_field_attrs, strip_field_attrs};
use crate::decl::{DeclarationModel, Field, FieldListModel, FlagListModel, SourceDeclaration, Transient};
use crate::diagnostic::{Diagnostic, DiagnosticKind};

// ── flag hosts: declarations inside `option_set! { ... }` ─────────────────

/// One declaration as written inside `option_set!`. A struct body holds nested items
/// (the case list among them) rather than fields.
pub(crate) struct FlagHost {
  pub attrs: Vec<Attribute>,
  pub vis: Visibility,
  pub shape: HostShape,
}

pub(crate) enum HostShape {
  Struct { ident: Ident, generics: Generics, body: Option<Vec<Item>> },
  Other(Box<Item>),
}

impl Parse for FlagHost {
  fn parse(input: ParseStream) -> SynResult<Self> {
    let fork = input.fork();
    fork.call(Attribute::parse_outer)?;
    fork.parse::<Visibility>()?;
    if !fork.peek(Token![struct]) {
      let item: Item = input.parse()?;
      return Ok(Self { attrs: Vec::new(), vis: Visibility::Inherited, shape: HostShape::Other(Box::new(item)) });
    }

    let attrs = input.call(Attribute::parse_outer)?;
    let vis: Visibility = input.parse()?;
    let _struct: Token![struct] = input.parse()?;
    let ident: Ident = input.parse()?;
    let mut generics: Generics = input.parse()?;
    // tuple struct: no room for a nested case list
    let tuple = input.peek(syn::token::Paren);
    if tuple {
      let _fields: proc_macro2::TokenTree = input.parse()?;
    }
    generics.where_clause = input.parse()?;
    let body = if !tuple && input.peek(syn::token::Brace) {
      let content;
      syn::braced!(content in input);
      let mut items = Vec::new();
      while !content.is_empty() {
        items.push(content.parse::<Item>()?);
      }
      Some(items)
    } else {
      let _semi: Token![;] = input.parse()?;
      None
    };
    Ok(Self { attrs, vis, shape: HostShape::Struct { ident, generics, body } })
  }
}

/// Every declaration of one `option_set!` invocation.
pub(crate) struct FlagHosts(pub Vec<FlagHost>);

impl Parse for FlagHosts {
  fn parse(input: ParseStream) -> SynResult<Self> {
    let mut out = Vec::new();
    while !input.is_empty() {
      out.push(input.parse()?);
    }
    Ok(Self(out))
  }
}

fn item_name_span(item: &Item) -> Span {
  match item {
    Item::Enum(i) => i.ident.span(),
    Item::Union(i) => i.ident.span(),
    Item::Trait(i) => i.ident.span(),
    Item::Fn(i) => i.sig.ident.span(),
    Item::Mod(i) => i.ident.span(),
    Item::Type(i) => i.ident.span(),
    Item::Struct(i) => i.ident.span(),
    other => other.span(),
  }
}

// ── entry ─────────────────────────────────────────────────────────────────

pub(crate) fn extract(decl: &SourceDeclaration) -> Result<DeclarationModel, Vec<Diagnostic>> {
  match decl {
    SourceDeclaration::FlagHost(host) => extract_flag_list(host).map(DeclarationModel::FlagList),
    SourceDeclaration::FieldHost { args, item } => extract_field_list(args, item).map(DeclarationModel::FieldList),
  }
}

fn extract_flag_list(host: &FlagHost) -> Result<FlagListModel, Vec<Diagnostic>> {
  let (ident, generics, body) = match &host.shape {
    HostShape::Struct { ident, generics, body } => (ident, generics, body),
    HostShape::Other(item) => return Err(vec![Diagnostic::new(DiagnosticKind::RequiresStruct, item_name_span(item))]),
  };

  let mut errors = Vec::new();
  let directive = host.attrs.iter().find(|a| a.path().is_ident(DIRECTIVE));
  let opts = DirectiveOpts::from_attr(directive, ident.span()).map_err(|e| errors.extend(e)).ok();
  let options_name = opts.as_ref().map_or(crate::decl::args::DEFAULT_OPTIONS_NAME, |o| o.options_name.as_str());

  if !generics.params.is_empty() || generics.where_clause.is_some() {
    errors.push(Diagnostic::new(DiagnosticKind::UnsupportedGenerics, generics.span()));
  }

  let items = body.as_deref().unwrap_or_default();
  let options_enum = items.iter().find_map(|i| match i {
    Item::Enum(e) if e.ident == options_name => Some(e),
    _ => None,
  });

  let mut cases = Vec::new();
  match options_enum {
    None => {
      // point at `options = "..."` when the name was spelled out
      let span = opts
        .as_ref()
        .filter(|o| o.options_name != crate::decl::args::DEFAULT_OPTIONS_NAME)
        .map_or(ident.span(), |o| o.options_span);
      errors.push(Diagnostic::new(DiagnosticKind::RequiresOptionsEnum(options_name.to_owned()), span))
    }
    Some(e) if e.variants.is_empty() => {
      errors.push(Diagnostic::new(DiagnosticKind::EmptyOptions(options_name.to_owned()), e.ident.span()))
    }
    Some(e) => {
      let mut seen = HashSet::new();
      for v in &e.variants {
        let name = v.ident.to_string();
        if !matches!(v.fields, Fields::Unit) {
          errors.push(Diagnostic::new(DiagnosticKind::OptionCaseHasData(name.clone()), v.fields.span()));
        }
        if let Some((_, expr)) = &v.discriminant {
          errors.push(Diagnostic::new(DiagnosticKind::OptionCaseHasDiscriminant(name.clone()), expr.span()));
        }
        // distinct spellings can still map to one constant (`NextDay`, `next_day`)
        let konst = FlagCase::new(&v.ident, cases.len()).konst.to_string();
        if konst == RESERVED_CONST {
          errors.push(Diagnostic::new(DiagnosticKind::ReservedOptionName(name), v.ident.span()));
          continue;
        }
        if !seen.insert(konst) {
          errors.push(Diagnostic::new(DiagnosticKind::DuplicateOption(name), v.ident.span()));
          continue;
        }
        cases.push(v.ident.clone());
      }
    }
  }

  if let Some(o) = &opts {
    let storage = &o.storage;
    match primitive_bits(storage) {
      Some(bits) if cases.len() > bits as usize => errors.push(Diagnostic::new(
        DiagnosticKind::TooManyOptions { count: cases.len(), bits, storage: quote::quote!(#storage).to_string() },
        storage.span(),
      )),
      _ => {}
    }
  }

  let Some(opts) = opts else { return Err(errors) };
  if !errors.is_empty() {
    return Err(errors);
  }

  let carried = items
    .iter()
    .filter(|i| !matches!(i, Item::Enum(e) if e.ident == opts.options_name))
    .cloned()
    .collect();
  let attrs = host.attrs.iter().filter(|a| !a.path().is_ident(DIRECTIVE)).cloned().collect();

  Ok(FlagListModel {
    type_name: ident.clone(),
    access_level: host.vis.clone(),
    raw_storage_type: opts.storage,
    cases,
    attrs,
    carried,
  })
}

// ── field hosts: `#[persistable]` ─────────────────────────────────────────

/// `Option<T>`, `std::option::Option<T>` or `core::option::Option<T>`.
pub(crate) fn is_option(ty: &Type) -> bool {
  let Type::Path(p) = ty else { return false };
  if p.qself.is_some() {
    return false;
  }
  let segs: Vec<_> = p.path.segments.iter().collect();
  let prefix_ok = match segs.len() {
    1 => true,
    3 => (segs[0].ident == "std" || segs[0].ident == "core") && segs[1].ident == "option",
    _ => false,
  };
  let Some(last) = segs.last() else { return false };
  prefix_ok && last.ident == "Option" && matches!(last.arguments, syn::PathArguments::AngleBracketed(_))
}

fn extract_field_list(args: &TokenStream2, item: &Item) -> Result<FieldListModel, Vec<Diagnostic>> {
  let mut errors = parse_persistable_args(args.clone()).err().unwrap_or_default();

  let Item::Struct(st) = item else {
    errors.push(Diagnostic::new(DiagnosticKind::RequiresStruct, item_name_span(item)));
    return Err(errors);
  };
  if !st.generics.params.is_empty() {
    errors.push(Diagnostic::new(DiagnosticKind::UnsupportedGenerics, st.generics.span()));
  }

  let named = match &st.fields {
    Fields::Named(n) => n.named.iter().collect(),
    Fields::Unit => Vec::new(),
    Fields::Unnamed(u) => {
      errors.push(Diagnostic::new(DiagnosticKind::RequiresNamedFields, u.span()));
      return Err(errors);
    }
  };

  let mut fields: Vec<Field> = Vec::new();
  let mut transient = Vec::new();
  for f in named {
    let Some(name) = f.ident.clone() else { continue };
    let directive = parse_field_attrs(&f.attrs, &mut errors);
    if directive.skip {
      transient.push(Transient { name, default_expr: directive.default_expr });
      continue;
    }
    fields.push(Field {
      is_optional: is_option(&f.ty),
      ty: f.ty.clone(),
      name,
      default_expr: directive.default_expr,
      legacy_keys: directive.legacy_keys,
    });
  }

  // legacy aliases share one keyed lookup with every current key
  let mut taken: HashSet<String> = fields.iter().map(Field::key).collect();
  for f in &fields {
    for legacy in &f.legacy_keys {
      if legacy.key == f.key() {
        errors.push(Diagnostic::new(DiagnosticKind::LegacyKeyMatchesName(legacy.key.clone()), legacy.span));
      } else if !taken.insert(legacy.key.clone()) {
        errors.push(Diagnostic::new(DiagnosticKind::DuplicateKey(legacy.key.clone()), legacy.span));
      }
    }
  }

  if !errors.is_empty() {
    return Err(errors);
  }
  Ok(FieldListModel {
    type_name: st.ident.clone(),
    access_level: st.vis.clone(),
    is_unit: matches!(st.fields, Fields::Unit),
    fields,
    transient,
    cleaned: strip_field_attrs(st.clone()),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use quote::quote;

  fn flag_host(tokens: TokenStream2) -> SourceDeclaration {
    SourceDeclaration::FlagHost(syn::parse2(tokens).unwrap())
  }

  fn field_host(tokens: TokenStream2) -> SourceDeclaration {
    SourceDeclaration::FieldHost { args: TokenStream2::new(), item: syn::parse2(tokens).unwrap() }
  }

  fn ids(decl: &SourceDeclaration) -> Vec<&'static str> {
    match extract(decl) {
      Ok(_) => Vec::new(),
      Err(errs) => errs.iter().map(|d| d.kind.id()).collect(),
    }
  }

  fn flag_model(decl: &SourceDeclaration) -> FlagListModel {
    match extract(decl) {
      Ok(DeclarationModel::FlagList(m)) => m,
      _ => panic!("expected a flag list"),
    }
  }

  fn field_model(decl: &SourceDeclaration) -> FieldListModel {
    match extract(decl) {
      Ok(DeclarationModel::FieldList(m)) => m,
      _ => panic!("expected a field list"),
    }
  }

  #[test]
  fn flag_list_keeps_case_order_and_carries_other_items() {
    let decl = flag_host(quote! {
      #[option_set(u8)]
      #[derive(Debug)]
      pub struct Permissions {
        enum Options { Read, Write, Execute }
        const MASK: u8 = 0b111;
        fn helper() {}
      }
    });
    let m = flag_model(&decl);
    assert_eq!(m.type_name, "Permissions");
    let cases: Vec<_> = m.cases.iter().map(|c| c.to_string()).collect();
    assert_eq!(cases, ["Read", "Write", "Execute"]);
    assert_eq!(m.carried.len(), 2);
    assert_eq!(m.attrs.len(), 1, "directive is removed, derive is kept");
  }

  #[test]
  fn custom_options_name_selects_the_nested_enum() {
    let decl = flag_host(quote! {
      #[option_set(u16, options = "Kind")]
      struct Shipping {
        enum Options { Ignored }
        enum Kind { NextDay, SecondDay }
      }
    });
    let m = flag_model(&decl);
    assert_eq!(m.cases.len(), 2);
    assert_eq!(m.carried.len(), 1);
  }

  #[test]
  fn missing_case_list_is_a_single_diagnostic() {
    let decl = flag_host(quote! {
      #[option_set(u8)]
      struct Nothing { const X: u8 = 1; }
    });
    let errs = extract(&decl).err().unwrap();
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].kind, DiagnosticKind::RequiresOptionsEnum("Options".into()));

    let unit = flag_host(quote! { #[option_set(u8)] struct Unit; });
    assert_eq!(ids(&unit), ["shapegen.requiresOptionsEnum"]);
  }

  #[test]
  fn non_struct_hosts_are_rejected() {
    let decl = flag_host(quote! { #[option_set(u8)] enum Options { A, B } });
    assert_eq!(ids(&decl), ["shapegen.requiresStruct"]);
    let field = field_host(quote! { enum E { A } });
    assert_eq!(ids(&field), ["shapegen.requiresStruct"]);
  }

  #[test]
  fn case_shape_errors_are_all_reported() {
    let decl = flag_host(quote! {
      #[option_set(u8)]
      struct Bad { enum Options { A(u8), B = 4, A } }
    });
    assert_eq!(
      ids(&decl),
      ["shapegen.optionCaseHasData", "shapegen.optionCaseHasDiscriminant", "shapegen.duplicateOption"]
    );
  }

  #[test]
  fn cases_colliding_on_their_constant_are_duplicates() {
    let decl = flag_host(quote! {
      #[option_set(u8)]
      struct P { enum Options { NextDay, next_day, Read, read } }
    });
    let errs = extract(&decl).err().unwrap();
    let kinds: Vec<_> = errs.iter().map(|d| d.kind.clone()).collect();
    assert_eq!(
      kinds,
      [DiagnosticKind::DuplicateOption("next_day".into()), DiagnosticKind::DuplicateOption("read".into())]
    );

    let reserved = flag_host(quote! {
      #[option_set(u8)]
      struct N { enum Options { Read, OptionNames } }
    });
    assert_eq!(ids(&reserved), ["shapegen.reservedOptionName"]);
  }

  #[test]
  fn empty_case_list_and_missing_storage() {
    let empty = flag_host(quote! { #[option_set(u8)] struct E { enum Options {} } });
    assert_eq!(ids(&empty), ["shapegen.emptyOptions"]);
    let untyped = flag_host(quote! { struct U { enum Options { A } } });
    assert_eq!(ids(&untyped), ["shapegen.requiresOptionsEnumRawType"]);
    let bare = flag_host(quote! { #[option_set] struct U { enum Options { A } } });
    assert_eq!(ids(&bare), ["shapegen.requiresOptionsEnumRawType"]);
  }

  #[test]
  fn too_many_cases_for_a_primitive_storage_type() {
    let decl = flag_host(quote! {
      #[option_set(u8)]
      struct Wide { enum Options { A, B, C, D, E, F, G, H, I } }
    });
    assert_eq!(ids(&decl), ["shapegen.tooManyOptions"]);
    let fits = flag_host(quote! {
      #[option_set(u8)]
      struct Full { enum Options { A, B, C, D, E, F, G, H } }
    });
    assert!(ids(&fits).is_empty());
    let unchecked = flag_host(quote! {
      #[option_set(Bits)]
      struct Alias { enum Options { A, B, C, D, E, F, G, H, I } }
    });
    assert!(ids(&unchecked).is_empty());
    let pointer_sized = flag_host(quote! {
      #[option_set(usize)]
      struct Ptr { enum Options { A0, A1, A2, A3, A4, A5, A6, A7, A8, A9, B0, B1, B2, B3, B4, B5, B6, B7, B8, B9,
        C0, C1, C2, C3, C4, C5, C6, C7, C8, C9, D0, D1, D2 } }
    });
    assert!(ids(&pointer_sized).is_empty());
  }

  #[test]
  fn generic_hosts_are_rejected() {
    let decl = flag_host(quote! { #[option_set(u8)] struct G<T> { enum Options { A } } });
    assert_eq!(ids(&decl), ["shapegen.unsupportedGenerics"]);
  }

  #[test]
  fn field_list_resolves_optionality_defaults_and_legacy_keys() {
    let decl = field_host(quote! {
      pub struct Record {
        id: String,
        #[persist(legacy = "label")]
        name: String,
        #[persist(default = 0)]
        count: i64,
        note: ::std::option::Option<String>,
        #[persist(skip)]
        cache: Vec<u8>,
      }
    });
    let m = field_model(&decl);
    let names: Vec<_> = m.fields.iter().map(Field::key).collect();
    assert_eq!(names, ["id", "name", "count", "note"]);
    assert!(m.fields[0].is_required());
    assert_eq!(m.fields[1].legacy_keys[0].key, "label");
    assert!(!m.fields[2].is_required());
    assert!(m.fields[3].is_optional);
    assert_eq!(m.transient.len(), 1);
    assert_eq!(m.all_keys(), ["id", "name", "count", "note", "label"]);
  }

  #[test]
  fn empty_and_unit_records_are_valid() {
    assert!(field_model(&field_host(quote! { struct Empty {} })).fields.is_empty());
    let unit = field_model(&field_host(quote! { struct Unit; }));
    assert!(unit.is_unit);
  }

  #[test]
  fn legacy_key_collisions() {
    let own = field_host(quote! { struct R { #[persist(legacy = "name")] name: String } });
    assert_eq!(ids(&own), ["shapegen.legacyKeyMatchesName"]);
    let other = field_host(quote! {
      struct R { id: String, #[persist(legacy = "id")] name: String }
    });
    assert_eq!(ids(&other), ["shapegen.duplicateKey"]);
    let twice = field_host(quote! {
      struct R { #[persist(legacy = "old")] a: u8, #[persist(legacy = "old")] b: u8 }
    });
    assert_eq!(ids(&twice), ["shapegen.duplicateKey"]);
  }

  #[test]
  fn tuple_structs_are_not_records() {
    assert_eq!(ids(&field_host(quote! { struct T(u8); })), ["shapegen.requiresNamedFields"]);
  }

  #[test]
  fn option_detection() {
    let yes: [Type; 3] =
      [syn::parse_quote!(Option<u8>), syn::parse_quote!(std::option::Option<u8>), syn::parse_quote!(core::option::Option<u8>)];
    assert!(yes.iter().all(is_option));
    let no: [Type; 3] = [syn::parse_quote!(Vec<u8>), syn::parse_quote!(my::Option<u8>), syn::parse_quote!(Option)];
    assert!(!no.iter().any(is_option));
  }
}
