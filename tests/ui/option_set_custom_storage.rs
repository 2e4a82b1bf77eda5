type Bits = u32;

shapegen::option_set! {
  #[option_set(Bits, options = "Channel")]
  struct Notify {
    enum Channel { Email, Sms, Push }
  }
}

fn main() {
  let all: Bits = Notify::all().raw_value();
  assert_eq!(all, 0b111);
}
