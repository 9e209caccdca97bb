use criterion::{black_box, criterion_group, criterion_main, Criterion};

use strukt::{decode, encode, size_of, Schema, Value};

fn person_schema() -> Schema {
    Schema::record(vec![
        ("name", Schema::simple("char[9]").unwrap()),
        ("age", Schema::simple("u8").unwrap()),
        ("balance", Schema::simple("f64").unwrap()),
        ("serial", Schema::simple("u64").unwrap()),
    ])
    .unwrap()
}

fn person_value() -> Value {
    Value::record([
        ("name", Value::chars("Anonymous")),
        ("age", Value::U8(33)),
        ("balance", Value::F64(1234.5)),
        ("serial", Value::U64(0xdead_beef_cafe)),
    ])
}

fn batch_schema() -> Schema {
    Schema::record(vec![
        ("header", person_schema()),
        ("readings", Schema::simple("f64[]").unwrap()),
        (
            "pair",
            Schema::tuple(vec![
                Schema::simple("u32").unwrap(),
                Schema::simple("char[]").unwrap(),
            ])
            .unwrap(),
        ),
    ])
    .unwrap()
}

fn batch_value() -> Value {
    Value::record([
        ("header", person_value()),
        (
            "readings",
            Value::Array((0..256).map(|i| Value::F64(f64::from(i) * 0.5)).collect()),
        ),
        (
            "pair",
            Value::Array(vec![Value::U32(42), Value::chars("trailing label")]),
        ),
    ])
}

fn encode_bench(c: &mut Criterion) {
    let flat = person_schema();
    let flat_val = person_value();
    c.bench_function("encode_fixed_record", |b| {
        b.iter(|| encode(black_box(&flat), black_box(&flat_val)).unwrap())
    });

    let nested = batch_schema();
    let nested_val = batch_value();
    c.bench_function("encode_nested_variable", |b| {
        b.iter(|| encode(black_box(&nested), black_box(&nested_val)).unwrap())
    });
}

fn decode_bench(c: &mut Criterion) {
    let nested = batch_schema();
    let bytes = encode(&nested, &batch_value()).unwrap();
    c.bench_function("decode_nested_variable", |b| {
        b.iter(|| decode(black_box(&nested), black_box(&bytes)).unwrap())
    });
}

fn size_bench(c: &mut Criterion) {
    let nested = batch_schema();
    c.bench_function("size_of_nested", |b| {
        b.iter(|| size_of(black_box(&nested)))
    });
}

criterion_group!(benches, encode_bench, decode_bench, size_bench);
criterion_main!(benches);
