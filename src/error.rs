use fibers::sync::oneshot::MonitorError;
use prometrics;
use serde_yaml;
use std::io;
use trackable::error::TrackableError;
use trackable::error::{ErrorKind as TrackableErrorKind, ErrorKindExt};

/// 発生し得るエラーの種類.
///
/// ディスク単位のエラー、クォーラム集約時のエラー、バケット操作の呼び出し元に返すエラーの三層がある.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// ディスクが存在しない、または到達不能.
    DiskNotFound,

    /// ディスクが故障している.
    FaultyDisk,

    /// ディスクへのアクセスが拒否された.
    DiskAccessDenied,

    /// ディスクがフォーマットされていない.
    UnformattedDisk,

    /// ボリュームが既に存在する.
    VolumeExists,

    /// ボリュームが存在しない.
    VolumeNotFound,

    /// ボリュームが空ではない.
    VolumeNotEmpty,

    /// ディスク操作がタイムアウトした.
    Timeout,

    /// 操作開始前にキャンセルされた.
    Canceled,

    /// 書き込みクォーラムを満たす合意が得られなかった.
    WriteQuorumLost,

    /// 読み込みクォーラムを満たす合意が得られなかった.
    ReadQuorumLost,

    /// バケット名が不正.
    BucketNameInvalid,

    /// バケットが既に存在する.
    BucketExists,

    /// バケットが存在しない.
    BucketNotFound,

    /// バケットが空ではない.
    BucketNotEmpty,

    /// 書き込みに必要な数のディスクが利用できない.
    InsufficientWriteQuorum,

    /// 読み込みに必要な数のディスクが利用できない.
    InsufficientReadQuorum,

    /// 入力値(設定等)が不正.
    InvalidInput,

    /// その他のエラー.
    Other,
}
impl TrackableErrorKind for ErrorKind {}

/// クレート固有の`Error`型.
#[derive(Debug, Clone, TrackableError)]
pub struct Error(TrackableError<ErrorKind>);
impl From<io::Error> for Error {
    fn from(f: io::Error) -> Self {
        let kind = match f.kind() {
            io::ErrorKind::TimedOut => ErrorKind::Timeout,
            io::ErrorKind::PermissionDenied => ErrorKind::DiskAccessDenied,
            _ => ErrorKind::Other,
        };
        kind.cause(f).into()
    }
}
impl From<prometrics::Error> for Error {
    fn from(f: prometrics::Error) -> Self {
        ErrorKind::Other.takes_over(f).into()
    }
}
impl From<serde_yaml::Error> for Error {
    fn from(f: serde_yaml::Error) -> Self {
        ErrorKind::InvalidInput.cause(f).into()
    }
}
impl From<MonitorError<Error>> for Error {
    fn from(f: MonitorError<Error>) -> Self {
        f.unwrap_or_else(|| {
            ErrorKind::Other
                .cause("Monitoring channel is disconnected")
                .into()
        })
    }
}

/// ディスク単位のエラーを、バケット操作の呼び出し元に返すエラーに変換する.
///
/// 対応するバケットレベルの種類がないエラーはそのまま返す.
pub(crate) fn to_bucket_error(e: Error, bucket: &str) -> Error {
    let kind = match *e.kind() {
        ErrorKind::VolumeExists => ErrorKind::BucketExists,
        ErrorKind::VolumeNotFound => ErrorKind::BucketNotFound,
        ErrorKind::VolumeNotEmpty => ErrorKind::BucketNotEmpty,
        ErrorKind::WriteQuorumLost => ErrorKind::InsufficientWriteQuorum,
        ErrorKind::ReadQuorumLost => ErrorKind::InsufficientReadQuorum,
        _ => return track!(e, "bucket={:?}", bucket),
    };
    track!(Error::from(kind.takes_over(e)), "bucket={:?}", bucket)
}
