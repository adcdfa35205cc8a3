//! バケット操作.
//!
//! 各操作は全ディスクへのfan-out、クォーラムによる集約、必要に応じた補償処理の順に実行される.
use fibers::Spawn;
use futures::{self, Future};
use rand;
use rustracing_jaeger::span::SpanHandle;
use std::time::SystemTime;
use trackable::error::ErrorKindExt;

use crate::disk::{DiskSlot, VolumeInfo};
use crate::error::to_bucket_error;
use crate::fan_out::{count_successes, positions_of, FanOut};
use crate::name::check_bucket_name;
use crate::reduce::{reduce_read_quorum, reduce_write_quorum_errs, IgnoredErrors};
use crate::rollback::Rollback;
use crate::tracer::{start_bucket_span, SpanExt};
use crate::{BoxFuture, CancelSignal, Error, ErasureSet, ErrorKind, Result};

/// バケットの情報.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketInfo {
    /// バケット名.
    pub name: String,

    /// 作成日時.
    pub created: SystemTime,
}
impl From<VolumeInfo> for BucketInfo {
    fn from(f: VolumeInfo) -> Self {
        BucketInfo {
            name: f.name,
            created: f.created,
        }
    }
}

/// バケット作成時のオプション.
#[derive(Debug, Clone, Default)]
pub struct MakeBucketOptions {
    /// `true`の場合は、英大文字等を含む緩い規則でバケット名を検証する.
    pub relaxed_name_check: bool,
}

/// バケット削除時のオプション.
#[derive(Debug, Clone, Default)]
pub struct DeleteBucketOptions {
    /// 空ではないバケットも削除する.
    ///
    /// この場合、一つでも失敗したディスクがあれば全体を元に戻して失敗する.
    pub force: bool,

    /// 書き込みクォーラムが得られなかった場合でも、バケットを再作成しない.
    pub no_recreate: bool,
}

/// 削除のfan-out結果から決まる、後続の処理と最終的な結果.
#[derive(Debug)]
pub struct DeletePlan {
    /// 全ディスクでバケットを再作成するかどうか.
    pub rollback: bool,

    /// 退避先に移動するディスクの位置.
    pub quarantine: Vec<usize>,

    /// 呼び出し元に返す結果(ディスクレベルのエラー).
    pub outcome: Result<()>,
}
impl DeletePlan {
    /// 強制削除の計画を立てる.
    ///
    /// 一つでもエラーがあれば、最初のエラーを結果とし、全体を元に戻す.
    pub fn force(results: &[Result<()>]) -> Self {
        match results.iter().find_map(|r| r.as_ref().err()) {
            Some(e) => DeletePlan {
                rollback: true,
                quarantine: Vec::new(),
                outcome: Err(track!(e.clone())),
            },
            None => DeletePlan {
                rollback: false,
                quarantine: Vec::new(),
                outcome: Ok(()),
            },
        }
    }

    /// クォーラムに基づく削除の計画を立てる.
    ///
    /// `VolumeNotEmpty`を返したディスクは、削除済み(`VolumeNotFound`)と見做せる結果が
    /// 書き込みクォーラムに達していれば退避の対象となり、その場合の削除は成功する.
    /// 書き込みクォーラムを失った場合は、退避は行わずに(`no_recreate`でなければ)全体を元に戻す.
    pub fn quorum(results: &[Result<()>], write_quorum: usize, no_recreate: bool) -> Self {
        let reduced = reduce_write_quorum_errs(results, &IgnoredErrors::bucket_op(), write_quorum);
        let dangling = positions_of(results, ErrorKind::VolumeNotEmpty);
        let removable = count_successes(results)
            + positions_of(results, ErrorKind::VolumeNotFound).len()
            + dangling.len();

        let kind = reduced.as_ref().err().map(|e| *e.kind());
        let quarantine = match kind {
            None => true,
            Some(ErrorKind::VolumeNotFound) => !dangling.is_empty(),
            Some(ErrorKind::WriteQuorumLost) => !dangling.is_empty() && removable >= write_quorum,
            _ => false,
        };
        if quarantine {
            return DeletePlan {
                rollback: false,
                quarantine: dangling,
                outcome: Ok(()),
            };
        }
        DeletePlan {
            rollback: kind == Some(ErrorKind::WriteQuorumLost) && !no_recreate,
            quarantine: Vec::new(),
            outcome: reduced,
        }
    }
}

impl<S> ErasureSet<S>
where
    S: Spawn + Clone + Send + 'static,
{
    /// バケットを作成する.
    ///
    /// 書き込みクォーラムに達しなかった場合でも、作成に成功したディスクは元に戻さない.
    /// 必要であれば、呼び出し元が`undo_make_bucket`を使って取り除くこと.
    pub fn make_bucket(
        &self,
        bucket: &str,
        options: &MakeBucketOptions,
        cancel: &CancelSignal,
        parent: SpanHandle,
    ) -> BoxFuture<()> {
        let mut span = start_bucket_span(&parent, "make_bucket", bucket, self.disks.len());
        if let Err(e) = track!(check_bucket_name(bucket, !options.relaxed_name_check)) {
            span.log_error(&e);
            return Box::new(futures::failed(e));
        }

        let logger = self.logger.clone();
        let volume = bucket.to_owned();
        let fan_out = FanOut::new(
            &self.spawner,
            &self.disks,
            cancel,
            move |index, disk, cancel| -> BoxFuture<()> {
                let logger = logger.clone();
                let endpoint = disk.endpoint();
                Box::new(disk.make_volume(&volume, cancel).map_err(move |e| {
                    if *e.kind() != ErrorKind::VolumeExists {
                        warn!(
                            logger,
                            "Cannot make a volume on disk[{}] ({}): {}", index, endpoint, e
                        );
                    }
                    e
                }))
            },
        );

        let write_quorum = self.write_quorum();
        let metrics = self.metrics.clone();
        let bucket = bucket.to_owned();
        let future = fan_out
            .and_then(move |results| {
                let reduced =
                    reduce_write_quorum_errs(&results, &IgnoredErrors::bucket_op(), write_quorum);
                reduced.map_err(|e| {
                    if *e.kind() == ErrorKind::WriteQuorumLost {
                        metrics.make_bucket_quorum_failures_total.increment();
                    }
                    to_make_bucket_error(e, &bucket)
                })
            })
            .then(move |result| {
                if let Err(ref e) = result {
                    span.log_error(e);
                }
                result
            });
        Box::new(future)
    }

    /// バケットの情報を返す.
    ///
    /// 一つのディスクからでも情報が得られれば、それを返す.
    pub fn get_bucket_info(
        &self,
        bucket: &str,
        cancel: &CancelSignal,
        parent: SpanHandle,
    ) -> BoxFuture<BucketInfo> {
        let mut span = start_bucket_span(&parent, "get_bucket_info", bucket, self.disks.len());
        let volume = bucket.to_owned();
        let fan_out = FanOut::new(&self.spawner, &self.disks, cancel, move |_, disk, cancel| {
            disk.stat_volume(&volume, cancel)
        });

        let read_quorum = self.read_quorum();
        let metrics = self.metrics.clone();
        let bucket = bucket.to_owned();
        let future = fan_out
            .and_then(move |results| -> Result<BucketInfo> {
                // 失敗したディスクのエラーは全て意味があるので、何も無視しない
                let info = reduce_read_quorum(results, &IgnoredErrors::none(), read_quorum)
                    .map_err(|e| {
                        metrics.get_bucket_info_failures_total.increment();
                        to_bucket_error(e, &bucket)
                    })?;
                Ok(BucketInfo::from(info))
            })
            .then(move |result| {
                if let Err(ref e) = result {
                    span.log_error(e);
                }
                result
            });
        Box::new(future)
    }

    /// バケットを削除する.
    ///
    /// 削除の可否は`DeletePlan`の規則に従う.
    /// 再作成や退避が必要な場合は、それらの完了を待ってから結果を返す.
    pub fn delete_bucket(
        &self,
        bucket: &str,
        options: &DeleteBucketOptions,
        cancel: &CancelSignal,
        parent: SpanHandle,
    ) -> BoxFuture<()> {
        let mut span = start_bucket_span(&parent, "delete_bucket", bucket, self.disks.len());
        let volume = bucket.to_owned();
        let force = options.force;
        let fan_out = FanOut::new(&self.spawner, &self.disks, cancel, move |_, disk, cancel| {
            disk.delete_volume(&volume, force, cancel)
        });

        let this = self.clone();
        let options = options.clone();
        let bucket = bucket.to_owned();
        let future = fan_out
            .and_then(move |results| this.finish_delete_bucket(bucket, &options, &results))
            .then(move |result| {
                if let Err(ref e) = result {
                    span.log_error(e);
                }
                result
            });
        Box::new(future)
    }

    /// 作成途中のバケットを、利用可能な全ディスクから取り除く.
    ///
    /// 後続の処理が失敗した場合の補償処理であり、個々のディスクのエラーは無視される.
    pub fn undo_make_bucket(&self, bucket: &str) -> BoxFuture<()> {
        info!(self.logger, "Undoes make_bucket: bucket={:?}", bucket);
        let volume = bucket.to_owned();
        let rollback = Rollback::new(
            self.logger.clone(),
            "undo_make_bucket",
            &self.spawner,
            &self.disks,
            move |_, disk, cancel| disk.delete_volume(&volume, false, cancel),
        )
        .metrics(self.metrics.clone());
        Box::new(rollback)
    }

    fn undo_delete_bucket(&self, bucket: &str) -> Rollback {
        info!(self.logger, "Undoes delete_bucket: bucket={:?}", bucket);
        let volume = bucket.to_owned();
        Rollback::new(
            self.logger.clone(),
            "undo_delete_bucket",
            &self.spawner,
            &self.disks,
            move |_, disk, cancel| disk.make_volume(&volume, cancel),
        )
        .metrics(self.metrics.clone())
    }

    fn finish_delete_bucket(
        &self,
        bucket: String,
        options: &DeleteBucketOptions,
        results: &[Result<()>],
    ) -> BoxFuture<()> {
        let plan = if options.force {
            DeletePlan::force(results)
        } else {
            DeletePlan::quorum(results, self.write_quorum(), options.no_recreate)
        };
        debug!(
            self.logger,
            "Delete plan: bucket={:?}, force={}, rollback={}, quarantine={:?}, outcome={:?}",
            bucket,
            options.force,
            plan.rollback,
            plan.quarantine,
            plan.outcome.as_ref().err().map(|e| *e.kind())
        );
        if let Err(ref e) = plan.outcome {
            if *e.kind() == ErrorKind::WriteQuorumLost {
                self.metrics.delete_bucket_quorum_failures_total.increment();
            }
        }

        let rollback: BoxFuture<()> = if plan.rollback {
            Box::new(self.undo_delete_bucket(&bucket))
        } else {
            Box::new(futures::finished(()))
        };
        let quarantine: BoxFuture<()> = if plan.quarantine.is_empty() {
            Box::new(futures::finished(()))
        } else {
            self.quarantine(&bucket, plan.quarantine)
        };
        let outcome = plan.outcome.map_err(|e| to_bucket_error(e, &bucket));
        Box::new(rollback.join(quarantine).then(move |_| outcome))
    }

    /// 指定位置のディスク上のバケットを、退避先ボリュームに移動する.
    ///
    /// 移動の失敗はログに出力するのみで無視する.
    fn quarantine(&self, bucket: &str, targets: Vec<usize>) -> BoxFuture<()> {
        let trash = self.config.deleted_bucket_volume.clone();
        let volume = bucket.to_owned();

        // 位置を保つため、対象外のディスクは`Offline`として渡す
        let slots = self
            .disks
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                if targets.contains(&i) {
                    slot.clone()
                } else {
                    DiskSlot::Offline
                }
            })
            .collect::<Vec<_>>();
        let fan_out = FanOut::new(
            &self.spawner,
            &slots,
            &CancelSignal::never(),
            move |_, disk, cancel| {
                let name = format!("{}-{:016x}", volume, rand::random::<u64>());
                disk.rename_file(&volume, "", &trash, &name, cancel)
            },
        );

        let logger = self.logger.clone();
        let metrics = self.metrics.clone();
        let bucket = bucket.to_owned();
        let future = fan_out.then(move |result| -> Result<()> {
            let results = match result {
                Ok(results) => results,
                Err(e) => {
                    warn!(logger, "Quarantine aborted: bucket={:?}, {}", bucket, e);
                    return Ok(());
                }
            };
            for index in targets {
                match results[index] {
                    Ok(_) => {
                        info!(
                            logger,
                            "Moved non-empty bucket aside: bucket={:?}, disk[{}]", bucket, index
                        );
                        metrics.quarantined_buckets_total.increment();
                    }
                    Err(ref e) => {
                        warn!(
                            logger,
                            "Cannot move non-empty bucket aside: bucket={:?}, disk[{}]: {}",
                            bucket,
                            index,
                            e
                        );
                    }
                }
            }
            Ok(())
        });
        Box::new(future)
    }
}

fn to_make_bucket_error(e: Error, bucket: &str) -> Error {
    let e = to_bucket_error(e, bucket);
    match *e.kind() {
        ErrorKind::BucketExists | ErrorKind::InsufficientWriteQuorum | ErrorKind::Canceled => e,
        _ => ErrorKind::Other.takes_over(e).into(),
    }
}
