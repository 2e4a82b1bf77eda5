//! shapegen: boilerplate synthesis from the shape of a declaration
//!
//! Two entry points, each reading one kind of shape and writing the code you would
//! otherwise type by hand:
//!
//! - `option_set! { ... }` turns a nested case list into a bitmask-backed option set.
//! - `#[persistable]` turns a struct's named fields into a JSON codec that still reads
//!   data written under older key names.
//!
//! Option sets
//! - Each declaration inside `option_set!` is a struct whose body holds items instead of
//!   fields. One of them must be an enum of unit cases, named `Options` by default.
//! - The directive `#[option_set(T)]` names the raw storage type; `#[option_set(T, options = "Kind")]`
//!   picks a different case-list name.
//! - Case `i` in declaration order owns bit `1 << i`. The generated struct wraps a single
//!   `raw_value: T` and gets:
//!   - one associated constant per case (`next_day` → `NEXT_DAY`), plus `OPTION_NAMES`;
//!   - `new`, `from_raw_value`, `raw_value`, `all`, `is_empty`, `contains`, `union`,
//!     `intersection`, `difference`, `insert`, `remove`, `iter`;
//!   - `name(display)`, `from_name` and `joined`, which lists names in declaration order;
//!   - `|`, `&`, `-` and their assigning forms, `FromIterator`, `Extend`, `Default`, `Debug`;
//!   - `#[derive(Clone, Copy, PartialEq, Eq, Hash)]`.
//! - Other items in the body (functions, constants, nested types) are carried over.
//! - Anything the struct already derives is not generated again.
//!
//! Persistence
//! - Named fields are encoded under their own name. Optional (`Option<T>`) fields may be
//!   absent or `null` and decode to `None`.
//! - `#[persist(legacy = "old_key")]` adds a read-only alias. Decoding prefers the current
//!   key and falls back to the aliases in declaration order. Encoding only writes current keys.
//! - `#[persist(default = EXPR)]` makes a field optional on decode.
//! - `#[persist(skip)]` leaves a field out of the stored form; it is rebuilt from its
//!   default (or `Default::default()`).
//! - Generated: `FIELD_KEYS`, `new`, `with_*` setters, `serde::Serialize`,
//!   `serde::Deserialize`, `FromStr`, `Display`, and `raw_value`/`from_raw_value` for
//!   stores that only hold strings.
//! - `new` is not a full memberwise constructor. It takes only the required fields (neither
//!   `Option<T>` nor given a `default`), in declaration order. Optional fields start as
//!   `None` and defaulted fields at their default; set them with `with_<field>(value)`.
//! - Decoding accepts both the map form (JSON and other self-describing formats) and the
//!   sequence form that non-self-describing formats write for structs.
//! - Generated code names `::serde` and `::serde_json`; the calling crate depends on both.
//!
//! Compile-time checks
//! - Option sets: non-struct hosts, generic hosts, a missing or empty case list, cases with
//!   payloads or explicit discriminants, repeated cases, a missing storage type, and more
//!   cases than a fixed-width integer storage type (`u8`…`u128`, `i8`…`i128`) has bits.
//! - Persistence: non-struct hosts, tuple structs, generic structs, malformed or unknown
//!   `#[persist]` arguments, an alias equal to its own field's key, and an alias that
//!   collides with any other key.
//! - Every diagnostic carries a stable identifier (`shapegen.requiresOptionsEnum`, ...).
//!   One failing declaration never stops its siblings from expanding.
//!
//! Example: delivery options
//! ```
//! shapegen::option_set! {
//!   #[option_set(u8)]
//!   pub struct ShippingOptions {
//!     enum Options { NextDay, SecondDay, Priority, Standard }
//!
//!     pub const EXPRESS: Self = Self::NEXT_DAY.union(Self::SECOND_DAY);
//!   }
//! }
//!
//! let mut opts = ShippingOptions::PRIORITY | ShippingOptions::NEXT_DAY;
//! assert_eq!(opts.raw_value(), 0b0101);
//! assert_eq!(opts.joined(), "NextDay, Priority");
//! assert!(ShippingOptions::EXPRESS.contains(ShippingOptions::SECOND_DAY));
//!
//! opts -= ShippingOptions::NEXT_DAY;
//! assert_eq!(opts.name(false), Some("priority"));
//! assert_eq!(format!("{opts:?}"), "ShippingOptions(Priority)");
//! ```
//!
//! Example: renaming a stored key without losing old data
//! ```
//! #[shapegen::persistable]
//! #[derive(Debug, PartialEq)]
//! pub struct Profile {
//!   id: String,
//!   #[persist(legacy = "label")]
//!   name: String,
//!   nickname: Option<String>,
//! }
//!
//! let old: Profile = r#"{"id":"7","label":"Ada"}"#.parse().unwrap();
//! assert_eq!(old, Profile::new("7".into(), "Ada".into()));
//! assert_eq!(old.to_string(), r#"{"id":"7","name":"Ada","nickname":null}"#);
//!
//! // `new` skips the optional field; the setter fills it in
//! let named = Profile::new("7".into(), "Ada".into()).with_nickname(Some("Countess".into()));
//! assert_eq!(named.to_string(), r#"{"id":"7","name":"Ada","nickname":"Countess"}"#);
//! ```

extern crate proc_macro;
use proc_macro::TokenStream;

mod assemble;
mod bitmask;
mod conformance;
mod decl;
mod diagnostic;
mod expand;
mod persist;

/// Bitmask option sets from nested case lists. See the crate docs.
#[proc_macro]
pub fn option_set(input: TokenStream) -> TokenStream {
  expand::option_sets(input.into()).into()
}

/// Serde persistence with legacy-key migration for a named-field struct. See the crate docs.
#[proc_macro_attribute]
pub fn persistable(args: TokenStream, input: TokenStream) -> TokenStream {
  expand::persistable(args.into(), syn::parse_macro_input!(input as syn::Item)).into()
}
