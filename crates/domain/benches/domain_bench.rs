//! Benchmarks for order total computation and the status state machine.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use common::{OrderId, ProductId};
use domain::order::{OrderItem, items_total};
use domain::{Money, OrderStatus};

fn bench_items_total(c: &mut Criterion) {
    let order_id = OrderId::new();
    let items: Vec<OrderItem> = (0..50)
        .map(|i| OrderItem::new(order_id, ProductId::new(), i % 5 + 1, Money::from_cents(999)))
        .collect();

    c.bench_function("items_total_50_lines", |b| {
        b.iter(|| items_total(black_box(&items)))
    });
}

fn bench_transition_table(c: &mut Criterion) {
    let statuses = [
        OrderStatus::Pending,
        OrderStatus::Packed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    c.bench_function("transition_table_full_scan", |b| {
        b.iter(|| {
            let mut allowed = 0u32;
            for from in statuses {
                for to in statuses {
                    if black_box(from).can_transition(black_box(to)) {
                        allowed += 1;
                    }
                }
            }
            allowed
        })
    });
}

criterion_group!(benches, bench_items_total, bench_transition_table);
criterion_main!(benches);
