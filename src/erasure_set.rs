use fibers::Spawn;
use slog::Logger;
use std::sync::Arc;

use crate::config::ErasureSetConfig;
use crate::disk::DiskSlot;
use crate::metrics::BucketOpMetrics;
use crate::quorum::QuorumPolicy;
use crate::Result;

/// `ErasureSet`のビルダ.
pub struct ErasureSetBuilder {
    logger: Logger,
    config: ErasureSetConfig,
    quorum: Option<Arc<dyn QuorumPolicy>>,
}
impl ErasureSetBuilder {
    /// 新しい`ErasureSetBuilder`インスタンスを生成する.
    pub fn new(logger: Logger) -> Self {
        ErasureSetBuilder {
            logger,
            config: ErasureSetConfig::default(),
            quorum: None,
        }
    }

    /// 設定を指定する.
    pub fn config(&mut self, config: ErasureSetConfig) -> &mut Self {
        self.config = config;
        self
    }

    /// クォーラムポリシーを指定する.
    ///
    /// 指定がない場合は`ErasureSetConfig::quorum_policy`が使われる.
    pub fn quorum_policy<Q: QuorumPolicy>(&mut self, policy: Q) -> &mut Self {
        self.quorum = Some(Arc::new(policy));
        self
    }

    /// `ErasureSet`を生成する.
    pub fn finish<S>(&self, spawner: S, disks: Vec<DiskSlot>) -> Result<ErasureSet<S>>
    where
        S: Spawn + Clone + Send + 'static,
    {
        let metrics = track!(BucketOpMetrics::new())?;
        let quorum: Arc<dyn QuorumPolicy> = match self.quorum {
            Some(ref quorum) => Arc::clone(quorum),
            None => Arc::new(self.config.quorum_policy()),
        };
        let online = disks.iter().filter(|d| d.is_online()).count();
        info!(
            self.logger,
            "Erasure set: disks={}, online={}, write_quorum={}, read_quorum={}",
            disks.len(),
            online,
            quorum.write_quorum(disks.len()),
            quorum.read_quorum(disks.len())
        );
        Ok(ErasureSet {
            logger: self.logger.clone(),
            spawner,
            disks: Arc::new(disks),
            config: Arc::new(self.config.clone()),
            quorum,
            metrics,
        })
    }
}

/// 一つの論理的なストレージ単位を構成するディスク集合.
///
/// バケット操作は[bucket](./bucket/index.html)モジュールで定義されている.
/// ディスク集合は生成後に変更されない.
#[derive(Clone)]
pub struct ErasureSet<S> {
    pub(crate) logger: Logger,
    pub(crate) spawner: S,
    pub(crate) disks: Arc<Vec<DiskSlot>>,
    pub(crate) config: Arc<ErasureSetConfig>,
    pub(crate) quorum: Arc<dyn QuorumPolicy>,
    pub(crate) metrics: BucketOpMetrics,
}
impl<S> ErasureSet<S>
where
    S: Spawn + Clone + Send + 'static,
{
    /// ディスク集合を返す.
    pub fn disks(&self) -> &[DiskSlot] {
        &self.disks
    }

    /// 設定を返す.
    pub fn config(&self) -> &ErasureSetConfig {
        &self.config
    }

    /// 書き込みクォーラムを返す.
    pub fn write_quorum(&self) -> usize {
        self.quorum.write_quorum(self.disks.len())
    }

    /// 読み込みクォーラムを返す.
    pub fn read_quorum(&self) -> usize {
        self.quorum.read_quorum(self.disks.len())
    }
}
