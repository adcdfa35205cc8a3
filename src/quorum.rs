//! ディスク数からクォーラムの閾値を決めるためのポリシー.
use std::cmp;

/// ディスク数から読み込み・書き込みのクォーラムを計算する.
///
/// 返り値は常に`1`以上である.
pub trait QuorumPolicy: Send + Sync + 'static {
    /// 書き込みクォーラムを返す.
    fn write_quorum(&self, disks: usize) -> usize;

    /// 読み込みクォーラムを返す.
    fn read_quorum(&self, disks: usize) -> usize;
}

/// パリティ数に基づくデフォルトのポリシー.
///
/// - 読み込みクォーラム: `disks - parity`
/// - 書き込みクォーラム: データ数(`disks - parity`)、ただしデータ数とパリティ数が等しい場合は`+1`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParityQuorum {
    parity: Option<usize>,
}
impl ParityQuorum {
    /// ディスク数から自動的にパリティ数を決める`ParityQuorum`インスタンスを生成する.
    pub fn new() -> Self {
        Self::default()
    }

    /// パリティ数を固定した`ParityQuorum`インスタンスを生成する.
    ///
    /// パリティ数はディスク数の半分を上限として切り詰められる.
    pub fn with_parity(parity: usize) -> Self {
        ParityQuorum {
            parity: Some(parity),
        }
    }

    /// `disks`個のディスクに対するパリティ数を返す.
    pub fn parity(&self, disks: usize) -> usize {
        match self.parity {
            Some(p) => cmp::min(p, disks / 2),
            None => default_parity(disks),
        }
    }
}
impl QuorumPolicy for ParityQuorum {
    fn write_quorum(&self, disks: usize) -> usize {
        let parity = self.parity(disks);
        let data = disks - parity;
        let quorum = if data == parity { data + 1 } else { data };
        cmp::max(quorum, 1)
    }

    fn read_quorum(&self, disks: usize) -> usize {
        cmp::max(disks - self.parity(disks), 1)
    }
}

fn default_parity(disks: usize) -> usize {
    match disks {
        0 | 1 => 0,
        2 | 3 => 1,
        4 | 5 => 2,
        6 | 7 => 3,
        _ => 4,
    }
}
