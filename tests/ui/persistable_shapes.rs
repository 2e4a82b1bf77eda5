#[shapegen::persistable]
pub struct Raw {
  r#type: String,
  #[persist(legacy = "kind")]
  r#ref: Option<u32>,
}

#[shapegen::persistable]
#[derive(Default)]
struct Cached {
  key: String,
  #[persist(skip)]
  hits: std::cell::Cell<u64>,
}

#[shapegen::persistable]
struct Nothing;

fn main() {
  let raw: Raw = r#"{"type":"t","kind":4}"#.parse().unwrap();
  assert_eq!(raw.r#ref, Some(4));
  assert_eq!(Raw::FIELD_KEYS, ["type", "ref"]);
  let raw = raw.with_ref(None);
  assert_eq!(raw.to_string(), r#"{"type":"t","ref":null}"#);

  let c = Cached::new("k".into());
  c.hits.set(2);
  assert_eq!(c.raw_value(), r#"{"key":"k"}"#);

  assert!(Nothing::from_raw_value("{}").is_some());
}
