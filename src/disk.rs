use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use crate::{BoxFuture, CancelSignal};

/// 一つのディスク(バックエンド)が提供する操作群.
///
/// 各操作はディスク毎に独立して失敗し得る.
/// 失敗時には`ErrorKind::VolumeExists`等の区別可能な種類のエラーを返すこと.
///
/// 渡される`CancelSignal`は操作全体で共有されている.
/// 実行中の呼び出しがそれを参照するかどうかは実装に任される.
pub trait Disk: Send + Sync + 'static {
    /// ログ等に使用される、ディスクを識別するための文字列を返す.
    fn endpoint(&self) -> String;

    /// ボリュームを作成する.
    fn make_volume(&self, volume: &str, cancel: CancelSignal) -> BoxFuture<()>;

    /// ボリュームの情報を返す.
    fn stat_volume(&self, volume: &str, cancel: CancelSignal) -> BoxFuture<VolumeInfo>;

    /// ボリュームを削除する.
    ///
    /// `force`が`false`の場合、空ではないボリュームに対しては`ErrorKind::VolumeNotEmpty`を返す.
    fn delete_volume(&self, volume: &str, force: bool, cancel: CancelSignal) -> BoxFuture<()>;

    /// `src_volume`内の`src_path`を`dst_volume`内の`dst_path`に移動する.
    ///
    /// `src_path`が空文字列の場合は、ボリュームそのものを移動する.
    fn rename_file(
        &self,
        src_volume: &str,
        src_path: &str,
        dst_volume: &str,
        dst_path: &str,
        cancel: CancelSignal,
    ) -> BoxFuture<()>;
}

/// 共有されたディスクへの参照.
pub type DiskHandle = Arc<dyn Disk>;

/// ディスク集合内の一つの位置.
///
/// 到達不能なディスクは`Offline`として表現され、エラーではない.
#[derive(Clone)]
pub enum DiskSlot {
    /// 利用可能なディスク.
    Online(DiskHandle),

    /// 現時点では利用できないディスク.
    Offline,
}
impl DiskSlot {
    /// 利用可能ならディスクへの参照を返す.
    pub fn disk(&self) -> Option<&DiskHandle> {
        match *self {
            DiskSlot::Online(ref disk) => Some(disk),
            DiskSlot::Offline => None,
        }
    }

    /// 利用可能なディスクかどうかを判定する.
    pub fn is_online(&self) -> bool {
        self.disk().is_some()
    }
}
impl<D: Disk> From<D> for DiskSlot {
    fn from(f: D) -> Self {
        DiskSlot::Online(Arc::new(f))
    }
}
impl fmt::Debug for DiskSlot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DiskSlot::Online(ref disk) => write!(f, "Online({})", disk.endpoint()),
            DiskSlot::Offline => write!(f, "Offline"),
        }
    }
}

/// ボリュームの情報.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInfo {
    /// ボリューム名.
    pub name: String,

    /// 作成日時.
    pub created: SystemTime,
}
