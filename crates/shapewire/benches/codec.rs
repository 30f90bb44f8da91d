use criterion::{criterion_group, criterion_main, Criterion};
use shapewire::{decode, encode};
use shapewire_schema::{ObjectField, Schema, Value};

fn gen_schema(field_count: usize) -> Schema {
    let fields = (0..field_count)
        .map(|i| ObjectField::new(format!("f{i}"), Schema::Number))
        .collect();
    Schema::object(fields).unwrap()
}

fn gen_value(field_count: usize) -> Value {
    Value::Object(
        (0..field_count)
            .map(|i| (format!("f{i}"), Value::Int(i as i64)))
            .collect(),
    )
}

fn bench_encode(c: &mut Criterion) {
    for &field_count in &[1usize, 10, 50, 100] {
        let schema = gen_schema(field_count);
        let value = gen_value(field_count);

        c.bench_function(&format!("encode_{field_count}_fields"), |b| {
            b.iter(|| encode(&schema, &value).unwrap())
        });
    }
}

fn bench_decode(c: &mut Criterion) {
    for &field_count in &[1usize, 10, 50, 100] {
        let schema = gen_schema(field_count);
        let value = gen_value(field_count);
        let bytes = encode(&schema, &value).unwrap();

        c.bench_function(&format!("decode_{field_count}_fields"), |b| {
            b.iter(|| decode(&schema, &bytes).unwrap())
        });
    }
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
