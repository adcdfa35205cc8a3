//! 全ディスクに対して同じアクションを並行に発行するための機能.
use fibers::sync::oneshot::Monitor;
use fibers::Spawn;
use futures::{self, Async, Future, Poll};
use std::sync::Arc;
use trackable::error::ErrorKindExt;

use crate::disk::{Disk, DiskSlot};
use crate::{BoxFuture, CancelSignal, Error, ErrorKind, Result};

/// `FanOut`が返す、ディスク毎の結果の列.
///
/// 要素は元のディスク集合と同じ順序で並び、長さも常に等しい.
pub type SlotResults<T> = Vec<Result<T>>;

/// 全ディスクに対するアクションの完了を待つ`Future`.
///
/// 利用可能なディスク毎に一つのfiberを起動し、全てのfiberが終了した時点で
/// 位置順に並んだ結果の列を返す.
/// この`Future`自体は失敗しない.
///
/// - `Offline`のディスクに対してはアクションを呼び出さず、`ErrorKind::DiskNotFound`を記録する
/// - キャンセル後に開始したfiberはアクションを呼び出さず、`ErrorKind::Canceled`を記録する
/// - 既に開始していたアクションは最後まで実行され、その結果も記録される
pub struct FanOut<T> {
    results: Vec<Option<Result<T>>>,
    pendings: Vec<(usize, Monitor<T, Error>)>,
}
impl<T> FanOut<T>
where
    T: Send + 'static,
{
    /// 新しい`FanOut`インスタンスを生成する.
    ///
    /// `action`には、ディスクの位置(インデックス)が明示的に渡される.
    pub fn new<S, F>(spawner: &S, disks: &[DiskSlot], cancel: &CancelSignal, action: F) -> Self
    where
        S: Spawn,
        F: Fn(usize, &dyn Disk, CancelSignal) -> BoxFuture<T> + Send + Sync + 'static,
    {
        let action = Arc::new(action);
        let mut results = Vec::with_capacity(disks.len());
        let mut pendings = Vec::new();
        for (index, slot) in disks.iter().enumerate() {
            let disk = match slot.disk() {
                None => {
                    let e = ErrorKind::DiskNotFound.cause(format!("disk[{}] is offline", index));
                    results.push(Some(Err(track!(Error::from(e)))));
                    continue;
                }
                Some(disk) => Arc::clone(disk),
            };
            let action = Arc::clone(&action);
            let cancel = cancel.clone();
            let future = futures::lazy(move || -> BoxFuture<T> {
                if cancel.is_canceled() {
                    let e = ErrorKind::Canceled.cause(format!("disk[{}] was not started", index));
                    return Box::new(futures::failed(track!(Error::from(e))));
                }
                action(index, &*disk, cancel)
            });
            results.push(None);
            pendings.push((index, spawner.spawn_monitor(future)));
        }
        FanOut { results, pendings }
    }
}
impl<T> Future for FanOut<T> {
    type Item = SlotResults<T>;
    type Error = Error;
    fn poll(&mut self) -> Poll<Self::Item, Self::Error> {
        let mut i = 0;
        while i < self.pendings.len() {
            let result = match self.pendings[i].1.poll() {
                Ok(Async::NotReady) => {
                    i += 1;
                    continue;
                }
                Ok(Async::Ready(value)) => Ok(value),
                Err(e) => Err(track!(Error::from(e))),
            };
            let (index, _) = self.pendings.swap_remove(i);
            self.results[index] = Some(result);
        }
        if !self.pendings.is_empty() {
            return Ok(Async::NotReady);
        }

        let results = self.results.drain(..).filter_map(|r| r).collect::<Vec<_>>();
        Ok(Async::Ready(results))
    }
}

/// 結果の列の中で成功した位置の数を返す.
pub fn count_successes<T>(results: &[Result<T>]) -> usize {
    results.iter().filter(|r| r.is_ok()).count()
}

/// 結果の列の中で、指定の種類のエラーとなった位置の一覧を返す.
pub fn positions_of<T>(results: &[Result<T>], kind: ErrorKind) -> Vec<usize> {
    results
        .iter()
        .enumerate()
        .filter(|(_, r)| r.as_ref().err().map_or(false, |e| *e.kind() == kind))
        .map(|(i, _)| i)
        .collect()
}
