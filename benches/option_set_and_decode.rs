use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

shapegen::option_set! {
  #[option_set(u16)]
  struct Shipping {
    enum Options { NextDay, SecondDay, Priority, Standard, Gift, Insured, Signature, Fragile }
  }
}

#[shapegen::persistable]
struct Profile {
  id: u64,
  #[persist(legacy = "label")]
  name: String,
  #[persist(default = 0)]
  visits: u32,
  email: Option<String>,
}

const CURRENT: &str = r#"{"id":42,"name":"Ada Lovelace","visits":7,"email":"ada@example.org"}"#;
const LEGACY: &str = r#"{"id":42,"label":"Ada Lovelace","visits":7,"email":"ada@example.org"}"#;
const BOTH: &str = r#"{"id":42,"label":"old","name":"Ada Lovelace","visits":7,"email":"ada@example.org"}"#;

fn bench_option_set(c: &mut Criterion) {
  let mut group = c.benchmark_group("option_set");
  let all = Shipping::all();
  let some = Shipping::NEXT_DAY | Shipping::GIFT | Shipping::FRAGILE;

  group.bench_function(BenchmarkId::new("joined", "all"), |b| b.iter(|| black_box(black_box(all).joined())));
  group.bench_function(BenchmarkId::new("joined", "three"), |b| b.iter(|| black_box(black_box(some).joined())));
  group.bench_function(BenchmarkId::new("from_name", "wire"), |b| {
    b.iter(|| black_box(Shipping::from_name(black_box("fragile"))))
  });
  group.bench_function(BenchmarkId::new("collect", "eight"), |b| {
    b.iter(|| black_box(black_box(all).iter().collect::<Shipping>()))
  });

  group.finish();
}

fn bench_decode(c: &mut Criterion) {
  let mut group = c.benchmark_group("decode");

  for (label, text) in [("current_key", CURRENT), ("legacy_key", LEGACY), ("both_keys", BOTH)] {
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_with_input(BenchmarkId::new("profile", label), text, |b, text| {
      b.iter(|| black_box(serde_json::from_str::<Profile>(black_box(text)).unwrap()))
    });
  }

  group.finish();
}

criterion_group!(benches, bench_option_set, bench_decode);
criterion_main!(benches);
