use std::collections::HashMap;

#[shapegen::persistable]
#[derive(Debug)]
pub struct Settings {
  #[persist(legacy = "colour")]
  color: String,
  #[persist(default = 3)]
  retries: u32,
  proxy: Option<String>,
}

fn main() {
  // a string-only store, as written by an older release
  let mut store: HashMap<&str, String> = HashMap::new();
  store.insert("settings", r#"{"colour":"teal","proxy":null}"#.to_owned());

  let settings = Settings::from_raw_value(&store["settings"]).expect("stored settings decode");
  println!("loaded: {settings:?}");

  // writing back moves the data to the current keys
  store.insert("settings", settings.with_retries(5).raw_value());
  println!("stored: {}", store["settings"]);
  println!("keys:   {:?}", Settings::FIELD_KEYS);
}
