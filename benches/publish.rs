//! Performance benchmarks for a3s-event-producer
//!
//! Run with: cargo bench

use a3s_event_producer::{
    EnvelopeEncoder, EventPublisher, MemoryProducer, MemorySchemaRegistry, ResolvePolicy,
    SchemaFormat, SchemaHandle, SchemaSource, TransactionDetail, TxEvent,
};
use criterion::{criterion_group, criterion_main, Criterion};

const TX_EVENT_SCHEMA: &str = include_str!("../schemas/tx_event.avsc");

fn sample_event() -> TxEvent {
    TxEvent::new(
        "4324",
        "BILLPAYMENT",
        TransactionDetail {
            tran_amount: 200.5,
            mer_fee_amt: 100.4,
            cus_fee_amt: 23.5,
        },
    )
    .with_company("PH0013", "ABC")
    .with_channel("BPP")
    .with_product("PH001")
    .with_classification("00", "CONFIRM", "SUCCESS")
}

fn bench_envelope_encode(c: &mut Criterion) {
    let schema =
        SchemaHandle::new(1, "TxEvent-value", 1, TX_EVENT_SCHEMA, SchemaFormat::Avro).unwrap();
    let encoder = EnvelopeEncoder::new();
    let event = sample_event();

    c.bench_function("EnvelopeEncoder::encode TxEvent", |b| {
        b.iter(|| encoder.encode(&schema, &event).unwrap());
    });

    let bytes = encoder.encode(&schema, &event).unwrap();
    c.bench_function("SchemaHandle::decode TxEvent", |b| {
        b.iter(|| schema.decode(&bytes[5..]).unwrap());
    });
}

fn bench_schema_parse(c: &mut Criterion) {
    c.bench_function("SchemaHandle::new", |b| {
        b.iter(|| {
            SchemaHandle::new(1, "TxEvent-value", 1, TX_EVENT_SCHEMA, SchemaFormat::Avro).unwrap()
        });
    });
}

fn bench_memory_publish(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let source = SchemaSource::Inline(TX_EVENT_SCHEMA.to_string());
    let event = sample_event();

    c.bench_function("MemoryProducer publish_event", |b| {
        b.to_async(&rt).iter(|| async {
            let publisher = EventPublisher::new(
                MemorySchemaRegistry::new(),
                MemoryProducer::default(),
                "TxEvent",
                ResolvePolicy::for_topic("TxEvent"),
            );
            publisher.publish_event(&source, &event).await.unwrap()
        });
    });
}

fn bench_memory_publish_throughput(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let source = SchemaSource::Inline(TX_EVENT_SCHEMA.to_string());
    let event = sample_event();

    let mut group = c.benchmark_group("publish_throughput");
    for count in [10, 100, 1000] {
        group.bench_function(format!("{} events", count), |b| {
            b.to_async(&rt).iter(|| async {
                let publisher = EventPublisher::new(
                    MemorySchemaRegistry::new(),
                    MemoryProducer::default(),
                    "TxEvent",
                    ResolvePolicy::for_topic("TxEvent"),
                );
                let schema = publisher.resolve_schema(&source).await.unwrap();
                for _ in 0..count {
                    publisher.publish(&schema, &event).await.unwrap();
                }
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_envelope_encode,
    bench_schema_parse,
    bench_memory_publish,
    bench_memory_publish_throughput,
);
criterion_main!(benches);
