use proc_macro2::{Span, TokenStream as TokenStream2};
use syn::spanned::Spanned;
use syn::{Attribute, Expr, ExprLit, Ident, Lit, Meta, Result as SynResult, Token, Type};

use crate::diagnostic::{Diagnostic, DiagnosticKind};

pub(crate) const DIRECTIVE: &str = "option_set";
pub(crate) const DEFAULT_OPTIONS_NAME: &str = "Options";

// Parsed options for #[option_set(...)]
pub(crate) struct DirectiveOpts {
  pub storage: Type,
  pub options_name: String,
  pub options_span: Span,
}

enum RawArg {
  Storage(Type),
  Named(Ident, Expr),
}

// Comma-separated arguments: a storage type and `name = value` pairs, in any order
struct RawArgs(Vec<RawArg>);

impl syn::parse::Parse for RawArgs {
  fn parse(input: syn::parse::ParseStream) -> SynResult<Self> {
    let mut out = Vec::new();
    while !input.is_empty() {
      if input.peek(Ident) && input.peek2(Token![=]) {
        let ident: Ident = input.parse()?;
        let _eq: Token![=] = input.parse()?;
        out.push(RawArg::Named(ident, input.parse()?));
      } else {
        out.push(RawArg::Storage(input.parse()?));
      }
      if input.is_empty() {
        break;
      }
      let _comma: Token![,] = input.parse()?;
    }
    Ok(Self(out))
  }
}

impl DirectiveOpts {
  /// Validate the arguments of the `#[option_set(...)]` attribute found on `host_span`.
  pub(crate) fn from_attr(attr: Option<&Attribute>, host_span: Span) -> Result<Self, Vec<Diagnostic>> {
    let Some(attr) = attr else {
      return Err(vec![Diagnostic::new(DiagnosticKind::RequiresOptionsEnumRawType, host_span)]);
    };
    let tokens = match &attr.meta {
      Meta::List(list) => list.tokens.clone(),
      Meta::Path(_) => TokenStream2::new(),
      Meta::NameValue(nv) => {
        return Err(vec![Diagnostic::new(DiagnosticKind::RequiresOptionsEnumRawType, nv.span())]);
      }
    };
    Self::parse(tokens, attr.span())
  }

  pub(crate) fn parse(tokens: TokenStream2, attr_span: Span) -> Result<Self, Vec<Diagnostic>> {
    let RawArgs(raw) = syn::parse2::<RawArgs>(tokens).map_err(|e| vec![Diagnostic::from(e)])?;

    let mut errors = Vec::new();
    let mut storage: Option<Type> = None;
    let mut options_name = DEFAULT_OPTIONS_NAME.to_owned();
    let mut options_span = attr_span;
    for arg in raw {
      match arg {
        RawArg::Storage(ty) if storage.is_none() => storage = Some(ty),
        RawArg::Storage(ty) => errors.push(Diagnostic::new(
          DiagnosticKind::MalformedDirective("only one raw storage type may be given".into()),
          ty.span(),
        )),
        RawArg::Named(ident, value) if ident == "options" => match string_literal(&value) {
          Some(s) => {
            options_name = s;
            options_span = value.span();
          }
          None => errors.push(Diagnostic::new(DiagnosticKind::ExpectedStringLiteral(ident.to_string()), value.span())),
        },
        RawArg::Named(ident, _) => {
          errors.push(Diagnostic::new(DiagnosticKind::UnknownArgument(ident.to_string()), ident.span()))
        }
      }
    }
    let Some(storage) = storage else {
      errors.push(Diagnostic::new(DiagnosticKind::RequiresOptionsEnumRawType, attr_span));
      return Err(errors);
    };
    if !errors.is_empty() {
      return Err(errors);
    }
    Ok(Self { storage, options_name, options_span })
  }
}

/// `#[persistable]` takes no arguments.
pub(crate) fn parse_persistable_args(tokens: TokenStream2) -> Result<(), Vec<Diagnostic>> {
  if tokens.is_empty() {
    return Ok(());
  }
  let RawArgs(raw) = syn::parse2::<RawArgs>(tokens).map_err(|e| vec![Diagnostic::from(e)])?;
  Err(
    raw
      .into_iter()
      .map(|arg| match arg {
        RawArg::Named(ident, _) => Diagnostic::new(DiagnosticKind::UnknownArgument(ident.to_string()), ident.span()),
        RawArg::Storage(ty) => {
          let text = quote::quote!(#ty).to_string();
          Diagnostic::new(DiagnosticKind::UnknownArgument(text), ty.span())
        }
      })
      .collect(),
  )
}

pub(crate) fn string_literal(expr: &Expr) -> Option<String> {
  match expr {
    Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) => Some(s.value()),
    _ => None,
  }
}

/// Bit width of a fixed-width integer storage type; `None` for anything else, including
/// `usize`/`isize`, whose width depends on the compile target.
pub(crate) fn primitive_bits(ty: &Type) -> Option<u32> {
  let Type::Path(p) = ty else { return None };
  if p.qself.is_some() {
    return None;
  }
  let ident = p.path.get_ident()?;
  Some(match ident.to_string().as_str() {
    "u8" | "i8" => 8,
    "u16" | "i16" => 16,
    "u32" | "i32" => 32,
    "u64" | "i64" => 64,
    "u128" | "i128" => 128,
    _ => return None,
  })
}
