//! ディスク毎の結果の列を、クォーラムに基づいて一つの結果に集約するための機能.
use trackable::error::ErrorKindExt;

use crate::fan_out::count_successes;
use crate::{Error, ErrorKind, Result};

/// クォーラムの判定時に数に含めないエラーの種類の集合.
///
/// 操作の種類毎に、呼び出しの都度値として組み立てて使う.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoredErrors(Vec<ErrorKind>);
impl IgnoredErrors {
    /// 何も無視しない集合を返す.
    pub fn none() -> Self {
        IgnoredErrors(Vec::new())
    }

    /// 全ての操作で無視されるエラーの集合を返す.
    pub fn base() -> Self {
        IgnoredErrors(vec![ErrorKind::DiskNotFound, ErrorKind::FaultyDisk])
    }

    /// バケット操作で無視されるエラーの集合を返す.
    pub fn bucket_op() -> Self {
        Self::base()
            .with(ErrorKind::DiskAccessDenied)
            .with(ErrorKind::UnformattedDisk)
    }

    /// バケットのメタデータ操作で無視されるエラーの集合を返す.
    pub fn bucket_metadata_op() -> Self {
        Self::bucket_op().with(ErrorKind::VolumeNotFound)
    }

    /// `kind`を加えた集合を返す.
    pub fn with(mut self, kind: ErrorKind) -> Self {
        if !self.contains(kind) {
            self.0.push(kind);
        }
        self
    }

    /// `kind`が集合に含まれるかどうかを判定する.
    pub fn contains(&self, kind: ErrorKind) -> bool {
        self.0.contains(&kind)
    }
}

/// 無視されないエラーの中で最も多くの位置に現れたものと、その出現数を返す.
///
/// 出現数が同じ場合は、最初の出現位置が小さい方が選ばれる.
pub fn dominant_error<'a, T>(
    results: &'a [Result<T>],
    ignored: &IgnoredErrors,
) -> Option<(&'a Error, usize)> {
    let errors = results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .filter(|e| !ignored.contains(*e.kind()))
        .collect::<Vec<_>>();

    let mut dominant: Option<(&Error, usize)> = None;
    for (i, e) in errors.iter().enumerate() {
        if errors[..i].iter().any(|prev| prev.kind() == e.kind()) {
            continue;
        }
        let count = errors[i..].iter().filter(|x| x.kind() == e.kind()).count();
        if dominant.map_or(true, |(_, max)| count > max) {
            dominant = Some((*e, count));
        }
    }
    dominant
}

/// 書き込み系の操作の結果を集約する.
///
/// 1. 成功数が`write_quorum`以上なら成功
/// 2. そうでなければ、支配的なエラーの出現数が`write_quorum`以上ならそのエラー
/// 3. それ以外は`ErrorKind::WriteQuorumLost`
pub fn reduce_write_quorum_errs<T>(
    results: &[Result<T>],
    ignored: &IgnoredErrors,
    write_quorum: usize,
) -> Result<()> {
    track!(reduce_quorum_errs(
        results,
        ignored,
        write_quorum,
        ErrorKind::WriteQuorumLost
    ))
}

/// 読み込み系の操作の結果を集約する.
///
/// 一つでも成功した位置があれば、最も小さい位置の値を返す(クォーラムは要求しない).
/// 全て失敗した場合は`reduce_write_quorum_errs`と同じ規則で一つのエラーを選ぶが、
/// 合意が得られなければ`ErrorKind::ReadQuorumLost`となる.
pub fn reduce_read_quorum<T>(
    mut results: Vec<Result<T>>,
    ignored: &IgnoredErrors,
    read_quorum: usize,
) -> Result<T> {
    if let Some(i) = results.iter().position(|r| r.is_ok()) {
        return results.swap_remove(i);
    }
    track!(reduce_quorum_errs(
        &results,
        ignored,
        read_quorum,
        ErrorKind::ReadQuorumLost
    ))?;
    track_panic!(ErrorKind::ReadQuorumLost, "disks={}", results.len())
}

fn reduce_quorum_errs<T>(
    results: &[Result<T>],
    ignored: &IgnoredErrors,
    quorum: usize,
    sentinel: ErrorKind,
) -> Result<()> {
    let successes = count_successes(results);
    if successes >= quorum {
        return Ok(());
    }
    if let Some((e, count)) = dominant_error(results, ignored) {
        if count >= quorum {
            return Err(track!(e.clone(), "count={}, quorum={}", count, quorum));
        }
    }
    let e = sentinel.cause(format!(
        "disks={}, successes={}, quorum={}",
        results.len(),
        successes,
        quorum
    ));
    Err(track!(Error::from(e)))
}
