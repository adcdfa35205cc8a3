//! イレイジャーセットの設定.
use serde_yaml;

use crate::quorum::ParityQuorum;
use crate::Result;

/// `ErasureSet`の設定.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErasureSetConfig {
    /// パリティ数.
    ///
    /// 指定がない場合はディスク数から決める.
    #[serde(default)]
    pub parity_drives: Option<usize>,

    /// 空ではないまま残ったバケットの退避先ボリューム.
    #[serde(default = "default_deleted_bucket_volume")]
    pub deleted_bucket_volume: String,
}
impl ErasureSetConfig {
    /// YAML形式の文字列から設定を読み込む.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config = track!(serde_yaml::from_str(yaml).map_err(crate::Error::from))?;
        Ok(config)
    }

    /// 設定に対応するクォーラムポリシーを返す.
    pub fn quorum_policy(&self) -> ParityQuorum {
        match self.parity_drives {
            Some(parity) => ParityQuorum::with_parity(parity),
            None => ParityQuorum::new(),
        }
    }
}
impl Default for ErasureSetConfig {
    fn default() -> Self {
        Self {
            parity_drives: None,
            deleted_bucket_volume: default_deleted_bucket_volume(),
        }
    }
}

fn default_deleted_bucket_volume() -> String {
    ".frugalos.sys/tmp/.trash".to_owned()
}
