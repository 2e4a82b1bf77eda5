mod flags {
  shapegen::option_set! {
    #[option_set(u64)]
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct Features {
      enum Options { r#async, r#move, Tracing }
    }

    #[option_set(u8)]
    pub(crate) struct Crate {
      enum Options { One }
      impl Crate {
        pub fn only() -> Self { Self::ONE }
      }
    }
  }
}

fn main() {
  let f = flags::Features::ASYNC | flags::Features::MOVE;
  assert_eq!(f.joined(), "Async, Move");
  assert_eq!(flags::Features::from_name("move"), Some(flags::Features::MOVE));
  assert_eq!(flags::Features::default(), flags::Features::new());
  assert_eq!(flags::Crate::only().raw_value(), 1);
}
