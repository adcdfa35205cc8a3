//! Metrics for `frugalos_erasure_set`.

use prometrics::metrics::{Counter, CounterBuilder};

use crate::Result;

#[derive(Debug, Clone)]
pub struct BucketOpMetrics {
    pub(crate) make_bucket_quorum_failures_total: Counter,
    pub(crate) delete_bucket_quorum_failures_total: Counter,
    pub(crate) get_bucket_info_failures_total: Counter,
    pub(crate) rollbacks_total: Counter,
    pub(crate) rollback_disk_failures_total: Counter,
    pub(crate) quarantined_buckets_total: Counter,
}
impl BucketOpMetrics {
    pub(crate) fn new() -> Result<Self> {
        let make_bucket_quorum_failures_total = track!(quorum_failures_total("make_bucket"))?;
        let delete_bucket_quorum_failures_total =
            track!(quorum_failures_total("delete_bucket"))?;
        let get_bucket_info_failures_total = track!(CounterBuilder::new(
            "get_bucket_info_failures_total"
        )
        .namespace("frugalos")
        .subsystem("erasure_set")
        .help("Number of bucket lookups that no disk could answer")
        .default_registry()
        .finish())?;
        let rollbacks_total = track!(CounterBuilder::new("rollbacks_total")
            .namespace("frugalos")
            .subsystem("erasure_set")
            .help("Number of compensating rollbacks")
            .default_registry()
            .finish())?;
        let rollback_disk_failures_total =
            track!(CounterBuilder::new("rollback_disk_failures_total")
                .namespace("frugalos")
                .subsystem("erasure_set")
                .help("Number of per-disk failures ignored during rollbacks")
                .default_registry()
                .finish())?;
        let quarantined_buckets_total = track!(CounterBuilder::new("quarantined_buckets_total")
            .namespace("frugalos")
            .subsystem("erasure_set")
            .help("Number of non-empty bucket replicas moved aside on delete")
            .default_registry()
            .finish())?;
        Ok(BucketOpMetrics {
            make_bucket_quorum_failures_total,
            delete_bucket_quorum_failures_total,
            get_bucket_info_failures_total,
            rollbacks_total,
            rollback_disk_failures_total,
            quarantined_buckets_total,
        })
    }
}

fn quorum_failures_total(operation: &'static str) -> Result<Counter> {
    let counter = track!(CounterBuilder::new("quorum_failures_total")
        .namespace("frugalos")
        .subsystem("erasure_set")
        .help("Number of operations that could not reach a quorum")
        .label("operation", operation)
        .default_registry()
        .finish())?;
    Ok(counter)
}
