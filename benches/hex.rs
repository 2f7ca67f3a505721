use criterion::{black_box, criterion_group, criterion_main, Criterion};

use md5hex::hash::{self, Digest};

fn hex_by_format(c: &mut Criterion) {
    let digest = hash::md5_contents("abc");
    c.bench_function("hex_by_format", |b| {
        b.iter(|| hash::md5_string(black_box(digest)))
    });
}

fn hex_by_table(c: &mut Criterion) {
    let digest = Digest::from(hash::md5_contents("abc"));
    c.bench_function("hex_by_table", |b| b.iter(|| black_box(digest).to_hex()));
}

criterion_group!(benches, hex_by_format, hex_by_table);
criterion_main!(benches);
