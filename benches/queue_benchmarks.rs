use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_work_queue::prelude::*;
use std::sync::Arc;
use std::thread;

/// Drops events so long benchmark runs do not accumulate them
struct DiscardSink;

impl EventSink for DiscardSink {
    fn emit(&self, event: Event) {
        black_box(event);
    }
}

fn benchmark_uncontended_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("uncontended_queue");

    group.bench_function("push_pop_single", |b| {
        let queue = BoundedQueue::new(16);
        b.iter(|| {
            queue.push(black_box(1u64)).expect("Failed to push");
            black_box(queue.pop().expect("Failed to pop"));
        });
    });

    group.bench_function("try_push_full", |b| {
        let queue = BoundedQueue::new(1);
        queue.push(0u64).expect("Failed to push");
        b.iter(|| {
            black_box(queue.try_push(black_box(1u64)).is_err());
        });
    });

    group.finish();
}

fn benchmark_contended_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended_queue");
    const ITEMS: u64 = 10_000;
    group.throughput(Throughput::Elements(ITEMS));

    for capacity in [1usize, 8, 64] {
        for (producers, consumers) in [(1usize, 1usize), (4, 4)] {
            let id = format!("cap{}_p{}_c{}", capacity, producers, consumers);
            group.bench_with_input(BenchmarkId::from_parameter(id), &capacity, |b, &capacity| {
                b.iter(|| {
                    let queue = Arc::new(BoundedQueue::new(capacity));
                    let per_producer = ITEMS / producers as u64;

                    let consumer_threads: Vec<_> = (0..consumers)
                        .map(|_| {
                            let queue = Arc::clone(&queue);
                            thread::spawn(move || {
                                let mut sum = 0u64;
                                while let Ok(n) = queue.pop() {
                                    sum = sum.wrapping_add(n);
                                }
                                sum
                            })
                        })
                        .collect();

                    let producer_threads: Vec<_> = (0..producers)
                        .map(|_| {
                            let queue = Arc::clone(&queue);
                            thread::spawn(move || {
                                for n in 0..per_producer {
                                    queue.push(n).expect("Failed to push");
                                }
                            })
                        })
                        .collect();

                    for handle in producer_threads {
                        handle.join().expect("Producer panicked");
                    }
                    queue.close();
                    let total: u64 = consumer_threads
                        .into_iter()
                        .map(|h| h.join().expect("Consumer panicked"))
                        .sum();
                    black_box(total);
                });
            });
        }
    }

    group.finish();
}

fn benchmark_classification(c: &mut Criterion) {
    let supported = SupportedTypes::all();
    let descriptors = builtin_descriptors();

    c.bench_function("classify_builtin_batch", |b| {
        b.iter(|| {
            for descriptor in &descriptors {
                black_box(supported.classify(black_box(descriptor)));
            }
        });
    });
}

fn benchmark_orchestrated_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("orchestrated_run");
    let descriptors: Vec<String> = (0..1_000)
        .map(|i| match i % 4 {
            0 => format!("doc{}.pdf", i),
            1 => format!("note{}.text", i),
            2 => format!("scan{}.image", i),
            _ => format!("blob{}.bin", i),
        })
        .collect();
    group.throughput(Throughput::Elements(descriptors.len() as u64));

    for (producers, consumers) in [(1usize, 1usize), (3, 2), (8, 8)] {
        let orchestrator = Orchestrator::new(WorkQueueConfig::new(16, producers, consumers))
            .expect("Failed to create orchestrator")
            .with_sink(Arc::new(DiscardSink));
        group.bench_function(format!("p{}_c{}", producers, consumers), |b| {
            b.iter(|| {
                let report = orchestrator
                    .run(descriptors.iter().cloned())
                    .expect("Run failed");
                black_box(report.processed());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_uncontended_queue,
    benchmark_contended_queue,
    benchmark_classification,
    benchmark_orchestrated_run
);
criterion_main!(benches);
