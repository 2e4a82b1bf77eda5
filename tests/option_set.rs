#![allow(dead_code)]

use std::collections::HashSet;

shapegen::option_set! {
  #[option_set(u8)]
  pub struct Permissions {
    enum Options { read, write, execute }
  }

  #[option_set(u16, options = "Kind")]
  #[derive(Debug)]
  pub struct ShippingOptions {
    enum Kind { NextDay, SecondDay, Priority, Standard }

    pub const EXPRESS: Self = Self::NEXT_DAY.union(Self::SECOND_DAY);

    pub fn is_fast(self) -> bool {
      self.intersection(Self::EXPRESS.union(Self::PRIORITY)) != Self::new()
    }
  }

  #[option_set(u32)]
  struct Wide {
    enum Options { A, B, C, D, E, F, G, H, I, J }
  }
}

#[test]
fn read_write_execute_occupy_the_low_bits() {
  assert_eq!(Permissions::READ.raw_value(), 1);
  assert_eq!(Permissions::WRITE.raw_value(), 2);
  assert_eq!(Permissions::EXECUTE.raw_value(), 4);
  assert_eq!(Permissions::OPTION_NAMES, ["Read", "Write", "Execute"]);
  assert_eq!(Permissions::all().raw_value(), 0b111);
}

#[test]
fn joined_follows_declaration_order_not_insertion_order() {
  let a = Permissions::EXECUTE | Permissions::READ;
  let mut b = Permissions::new();
  b.insert(Permissions::READ);
  b.insert(Permissions::EXECUTE);
  let c: Permissions = [Permissions::EXECUTE, Permissions::READ, Permissions::EXECUTE].into_iter().collect();
  for set in [a, b, c] {
    assert_eq!(set.raw_value(), 5);
    assert_eq!(set.joined(), "Read, Execute");
  }
  assert_eq!(Permissions::new().joined(), "");
}

#[test]
fn every_case_owns_a_distinct_bit() {
  let bits: Vec<u32> = Wide::all().iter().map(Wide::raw_value).collect();
  assert_eq!(bits.len(), 10);
  assert!(bits.iter().all(|b| b.count_ones() == 1));
  assert_eq!(bits.iter().collect::<HashSet<_>>().len(), 10);
  assert_eq!(Wide::J.raw_value(), 1 << 9);
}

#[test]
fn names_in_both_spellings() {
  assert_eq!(ShippingOptions::NEXT_DAY.name(true), Some("NextDay"));
  assert_eq!(ShippingOptions::NEXT_DAY.name(false), Some("next_day"));
  assert_eq!(Permissions::WRITE.name(true), Some("Write"));
  assert_eq!(Permissions::WRITE.name(false), Some("write"));
  assert_eq!(ShippingOptions::EXPRESS.name(true), None);
  assert_eq!(ShippingOptions::new().name(true), None);

  assert_eq!(ShippingOptions::from_name("SecondDay"), Some(ShippingOptions::SECOND_DAY));
  assert_eq!(ShippingOptions::from_name("second_day"), Some(ShippingOptions::SECOND_DAY));
  assert_eq!(Permissions::from_name("read"), Some(Permissions::READ));
  assert_eq!(Permissions::from_name("Read"), Some(Permissions::READ));
  assert_eq!(Permissions::from_name("delete"), None);
}

#[test]
fn set_algebra() {
  let rw = Permissions::READ | Permissions::WRITE;
  assert!(rw.contains(Permissions::READ));
  assert!(!rw.contains(Permissions::READ | Permissions::EXECUTE));
  assert!(rw.contains(Permissions::new()));
  assert_eq!(rw & Permissions::WRITE, Permissions::WRITE);
  assert_eq!(rw - Permissions::WRITE, Permissions::READ);
  assert_eq!(rw.difference(Permissions::all()), Permissions::new());
  assert!(Permissions::new().is_empty());
  assert!(!rw.is_empty());

  let mut set = Permissions::default();
  assert!(set.insert(Permissions::READ));
  assert!(!set.insert(Permissions::READ));
  set |= Permissions::EXECUTE;
  assert!(set.remove(Permissions::READ));
  assert!(!set.remove(Permissions::WRITE));
  set &= Permissions::EXECUTE;
  assert_eq!(set, Permissions::EXECUTE);
  set -= Permissions::EXECUTE;
  assert!(set.is_empty());

  set.extend([Permissions::WRITE, Permissions::READ]);
  assert_eq!(set.iter().collect::<Vec<_>>(), [Permissions::READ, Permissions::WRITE]);
}

#[test]
fn raw_values_round_trip_including_unowned_bits() {
  let set = Permissions::from_raw_value(0b1010);
  assert_eq!(set.raw_value(), 0b1010);
  assert!(set.contains(Permissions::WRITE));
  assert_eq!(set.joined(), "Write");
}

#[test]
fn debug_lists_contained_options() {
  assert_eq!(format!("{:?}", Permissions::READ | Permissions::EXECUTE), "Permissions(Read | Execute)");
  assert_eq!(format!("{:?}", Permissions::new()), "Permissions()");
}

#[test]
fn declared_debug_is_kept() {
  // derived Debug shows the raw storage
  assert_eq!(format!("{:?}", ShippingOptions::PRIORITY), "ShippingOptions { raw_value: 4 }");
}

#[test]
fn carried_items_live_on_the_type() {
  assert_eq!(ShippingOptions::EXPRESS.raw_value(), 0b11);
  assert!(ShippingOptions::PRIORITY.is_fast());
  assert!(!ShippingOptions::STANDARD.is_fast());
}

#[test]
fn options_are_hashable_values() {
  let mut seen = HashSet::new();
  seen.insert(Permissions::READ);
  seen.insert(Permissions::from_raw_value(1));
  assert_eq!(seen.len(), 1);
}
