shapegen::option_set! {
  #[option_set(u8)]
  pub struct Permissions {
    enum Options { Read, Write, Execute }

    pub const READ_WRITE: Self = Self::READ.union(Self::WRITE);
  }
}

fn main() {
  let mut p = Permissions::READ_WRITE;
  println!("{p:?} raw=0b{:03b} joined={:?}", p.raw_value(), p.joined());

  p |= Permissions::EXECUTE;
  p -= Permissions::WRITE;
  for flag in p.iter() {
    println!("  {} (wire: {})", flag.name(true).unwrap_or("?"), flag.name(false).unwrap_or("?"));
  }

  // names round-trip through either spelling
  let parsed: Permissions = ["read", "Execute"].into_iter().filter_map(Permissions::from_name).collect();
  assert_eq!(parsed, p);
}
