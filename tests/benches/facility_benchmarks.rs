//! # Weighbridge Benchmarks
//!
//! | Component | Operation | Target |
//! |-----------|-----------|--------|
//! | wb-01 Ticket Sequence | allocate next ticket | < 10µs |
//! | wb-03 Bridge Admission | request + release with a queue | < 10µs |
//! | wb-05 Reconciliation | sweep of one batch | < 1ms |

use std::sync::Arc;

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shared_types::{
    ClientName, ProductId, SessionId, TicketNumber, TruckId, WeighingPhase, Weight,
};
use wb_01_ticket_sequence::{InMemoryTicketCounterStore, SequenceAllocator, SequenceConfig};
use wb_03_bridge_admission::BridgeAdmissionController;
use wb_05_reconciliation::{
    CompletedSessionSource, HistoricalStore, InMemoryHistoricalStore, NoopObserver,
    ReconciliationError, ReconciliationService, TransferCandidate,
};

/// Source with nothing pending; the benchmark feeds the fast path directly.
struct EmptySource;

#[async_trait]
impl CompletedSessionSource for EmptySource {
    async fn pending(&self, _limit: usize) -> Result<Vec<TransferCandidate>, ReconciliationError> {
        Ok(Vec::new())
    }

    async fn confirm(&self, _session_id: SessionId) -> Result<(), ReconciliationError> {
        Ok(())
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

// ============================================================================
// WB-01: Ticket Sequence
// ============================================================================

fn bench_ticket_allocation(c: &mut Criterion) {
    let rt = runtime();
    let allocator = rt.block_on(async {
        SequenceAllocator::initialize(
            &SequenceConfig::default(),
            Arc::new(InMemoryTicketCounterStore::new()),
            &[],
        )
        .await
        .unwrap()
    });

    c.bench_function("wb-01-next-ticket", |b| {
        b.iter(|| black_box(rt.block_on(allocator.next()).unwrap()))
    });
}

// ============================================================================
// WB-03: Bridge Admission
// ============================================================================

fn bench_bridge_admission(c: &mut Criterion) {
    let mut group = c.benchmark_group("wb-03-bridge-admission");

    for waiting in [0usize, 8, 64] {
        group.bench_with_input(
            BenchmarkId::new("request_release", waiting),
            &waiting,
            |b, &waiting| {
                let bridge = BridgeAdmissionController::new();
                let holder = SessionId::new();
                bridge.request_occupancy(holder, WeighingPhase::Entry);
                for _ in 0..waiting {
                    bridge.request_occupancy(SessionId::new(), WeighingPhase::Entry);
                }

                b.iter(|| {
                    let session = SessionId::new();
                    black_box(bridge.request_occupancy(session, WeighingPhase::Exit));
                    black_box(bridge.withdraw(session));
                    black_box(bridge.release(SessionId::new()));
                })
            },
        );
    }
    group.finish();
}

// ============================================================================
// WB-05: Reconciliation
// ============================================================================

fn candidate(ticket: u64) -> TransferCandidate {
    TransferCandidate {
        session_id: SessionId::new(),
        ticket: TicketNumber(ticket),
        truck_id: TruckId::new(format!("T{}", ticket % 20)),
        client: ClientName::new(format!("C{}", ticket % 5)),
        product: ProductId::new("SAND"),
        tare: Weight::from_tons(10),
        gross: Weight::from_tons(35),
        net: Weight::from_tons(25),
        completed_at: 1_714_644_000_000,
    }
}

fn bench_reconciliation_transfer(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("wb-05-reconciliation");

    for batch in [1u64, 10, 50] {
        group.throughput(Throughput::Elements(batch));
        group.bench_with_input(BenchmarkId::new("transfer_batch", batch), &batch, |b, &batch| {
            b.iter(|| {
                rt.block_on(async {
                    let store = Arc::new(InMemoryHistoricalStore::new());
                    let service = ReconciliationService::new(
                        store.clone(),
                        Arc::new(EmptySource),
                        Arc::new(NoopObserver),
                        batch as usize,
                    );
                    for ticket in 0..batch {
                        black_box(service.transfer(&candidate(ticket + 1)).await);
                    }
                    black_box(store.max_ticket().await.unwrap())
                })
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_ticket_allocation,
    bench_bridge_admission,
    bench_reconciliation_transfer
);
criterion_main!(benches);
