//! 失敗した操作を補償するための、ベストエフォートなロールバック.
use fibers::Spawn;
use futures::{Async, Future, Poll};
use slog::Logger;

use crate::disk::{Disk, DiskSlot};
use crate::fan_out::FanOut;
use crate::metrics::BucketOpMetrics;
use crate::{BoxFuture, CancelSignal, Error, ErrorKind};

/// 利用可能な全ディスクに補償処理を発行し、その完了を待つ`Future`.
///
/// 個々のディスクのエラーはログに出力されるのみで、呼び出し元には伝播しない.
/// そのため、この`Future`は決して失敗しない.
/// 補償処理はキャンセルされず、また、ロールバックが更にロールバックを起こすこともない.
pub struct Rollback {
    logger: Logger,
    operation: &'static str,
    future: FanOut<()>,
    metrics: Option<BucketOpMetrics>,
}
impl Rollback {
    /// 新しい`Rollback`インスタンスを生成する.
    ///
    /// `operation`はログ出力にのみ使用される.
    pub fn new<S, F>(
        logger: Logger,
        operation: &'static str,
        spawner: &S,
        disks: &[DiskSlot],
        action: F,
    ) -> Self
    where
        S: Spawn,
        F: Fn(usize, &dyn Disk, CancelSignal) -> BoxFuture<()> + Send + Sync + 'static,
    {
        let future = FanOut::new(spawner, disks, &CancelSignal::never(), action);
        Rollback {
            logger,
            operation,
            future,
            metrics: None,
        }
    }

    pub(crate) fn metrics(mut self, metrics: BucketOpMetrics) -> Self {
        metrics.rollbacks_total.increment();
        self.metrics = Some(metrics);
        self
    }
}
impl Future for Rollback {
    type Item = ();
    type Error = Error;
    fn poll(&mut self) -> Poll<Self::Item, Self::Error> {
        let results = match self.future.poll() {
            Ok(Async::NotReady) => return Ok(Async::NotReady),
            Ok(Async::Ready(results)) => results,
            Err(e) => {
                warn!(self.logger, "Rollback({}) aborted: {}", self.operation, e);
                return Ok(Async::Ready(()));
            }
        };
        for (index, result) in results.into_iter().enumerate() {
            let e = match result {
                Ok(()) => continue,
                Err(e) => e,
            };
            if *e.kind() == ErrorKind::DiskNotFound {
                continue;
            }
            debug!(
                self.logger,
                "Rollback({}) failed on disk[{}] (ignored): {}", self.operation, index, e
            );
            if let Some(ref metrics) = self.metrics {
                metrics.rollback_disk_failures_total.increment();
            }
        }
        Ok(Async::Ready(()))
    }
}

#[cfg(test)]
mod tests {
    use fibers_global;
    use slog::{Discard, Logger};
    use trackable::result::TestResult;

    use super::*;
    use crate::test_util::tests::{disks, Op};

    #[test]
    fn rollback_reaches_every_online_disk() -> TestResult {
        let (mut set, memories) = disks(4);
        set[1] = DiskSlot::Offline;
        let logger = Logger::root(Discard, o!());
        let rollback = Rollback::new(
            logger,
            "test",
            &fibers_global::handle(),
            &set,
            |_, disk, cancel| disk.make_volume("foo", cancel),
        );
        track!(fibers_global::execute(rollback))?;

        assert!(memories[0].has_volume("foo"));
        assert!(!memories[1].has_volume("foo"));
        assert!(memories[2].has_volume("foo"));
        assert!(memories[3].has_volume("foo"));
        assert_eq!(memories[1].make_volume_calls(), 0);
        Ok(())
    }

    #[test]
    fn rollback_swallows_disk_errors() -> TestResult {
        let (set, memories) = disks(3);
        memories[0].fail(Op::MakeVolume, ErrorKind::Timeout);
        memories[2].fail(Op::MakeVolume, ErrorKind::FaultyDisk);
        let metrics = track!(BucketOpMetrics::new())?;

        let logger = Logger::root(Discard, o!());
        let rollback = Rollback::new(
            logger,
            "test",
            &fibers_global::handle(),
            &set,
            |_, disk, cancel| disk.make_volume("foo", cancel),
        )
        .metrics(metrics.clone());
        track!(fibers_global::execute(rollback))?;

        assert!(!memories[0].has_volume("foo"));
        assert!(memories[1].has_volume("foo"));
        assert!((metrics.rollbacks_total.value() - 1.0).abs() < 1e-5);
        assert!((metrics.rollback_disk_failures_total.value() - 2.0).abs() < 1e-5);
        Ok(())
    }
}
