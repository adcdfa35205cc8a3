//! 複数のディスクからなる一つのイレイジャーセットに対して、バケット操作をクォーラム付きで実行するcrate.
//!
//! 各操作は以下の流れで処理される:
//!
//! 1. 全ディスクに対して同じアクションを並行に発行する ([fan_out])
//! 2. ディスク毎の結果をクォーラムに基づいて一つの結果に集約する ([reduce])
//! 3. 集約結果によっては、成功したディスクに対して補償処理を行う ([rollback])
//!
//! [fan_out]: ./fan_out/index.html
//! [reduce]: ./reduce/index.html
//! [rollback]: ./rollback/index.html
#![warn(missing_docs)]
extern crate fibers;
#[cfg(test)]
extern crate fibers_global;
extern crate futures;
extern crate prometrics;
extern crate rand;
extern crate rustracing;
extern crate rustracing_jaeger;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_yaml;
#[macro_use]
extern crate slog;
#[macro_use]
extern crate trackable;

use futures::Future;

pub use bucket::{BucketInfo, DeleteBucketOptions, MakeBucketOptions};
pub use cancel::{make_cancel_signal, CancelSignal, Canceler};
pub use config::ErasureSetConfig;
pub use disk::{Disk, DiskHandle, DiskSlot, VolumeInfo};
pub use erasure_set::{ErasureSet, ErasureSetBuilder};
pub use error::{Error, ErrorKind};
pub use quorum::{ParityQuorum, QuorumPolicy};
pub use reduce::IgnoredErrors;

pub mod bucket;
pub mod config;
pub mod fan_out;
pub mod name;
pub mod quorum;
pub mod reduce;
pub mod rollback;

mod cancel;
mod disk;
mod erasure_set;
mod error;
mod metrics;
mod tracer;

#[cfg(test)]
mod test_util;

/// クレート固有の`Result`型。
pub type Result<T> = ::std::result::Result<T, Error>;

/// ディスク操作やバケット操作が返す`Future`.
pub type BoxFuture<T> = Box<dyn Future<Item = T, Error = Error> + Send + 'static>;
