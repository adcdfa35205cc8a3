#[cfg(test)]
pub mod tests {
    use futures;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::SystemTime;
    use trackable::error::ErrorKindExt;

    use crate::disk::{Disk, DiskSlot, VolumeInfo};
    use crate::{BoxFuture, CancelSignal, Error, ErrorKind, Result};

    /// `MemoryDisk`に対する操作の種類.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Op {
        MakeVolume,
        StatVolume,
        DeleteVolume,
        RenameFile,
    }

    #[derive(Debug, Default)]
    struct Volume {
        created: Option<SystemTime>,
        files: BTreeMap<String, Vec<u8>>,
    }

    #[derive(Debug, Default)]
    struct State {
        volumes: BTreeMap<String, Volume>,
        faults: HashMap<Op, ErrorKind>,
    }

    #[derive(Debug, Default)]
    struct Calls {
        make_volume: AtomicUsize,
        stat_volume: AtomicUsize,
        delete_volume: AtomicUsize,
        rename_file: AtomicUsize,
    }

    /// メモリ上にボリュームを保持するテスト用のディスク.
    ///
    /// クローンは状態を共有する.
    #[derive(Debug, Clone)]
    pub struct MemoryDisk {
        endpoint: String,
        state: Arc<Mutex<State>>,
        calls: Arc<Calls>,
    }
    impl MemoryDisk {
        pub fn new(endpoint: &str) -> Self {
            MemoryDisk {
                endpoint: endpoint.to_owned(),
                state: Arc::new(Mutex::new(State::default())),
                calls: Arc::new(Calls::default()),
            }
        }

        /// 以降の`op`の呼び出しを`kind`のエラーで失敗させる.
        pub fn fail(&self, op: Op, kind: ErrorKind) {
            self.lock().faults.insert(op, kind);
        }

        /// `fail`で設定したエラーを取り除く.
        pub fn recover(&self, op: Op) {
            self.lock().faults.remove(&op);
        }

        pub fn put_file(&self, volume: &str, path: &str) {
            let mut state = self.lock();
            let volume = state.volumes.entry(volume.to_owned()).or_default();
            if volume.created.is_none() {
                volume.created = Some(SystemTime::now());
            }
            volume.files.insert(path.to_owned(), Vec::new());
        }

        pub fn has_volume(&self, volume: &str) -> bool {
            self.lock().volumes.contains_key(volume)
        }

        /// `volume`内のファイル名一覧を返す.
        pub fn files(&self, volume: &str) -> Vec<String> {
            self.lock()
                .volumes
                .get(volume)
                .map(|v| v.files.keys().cloned().collect())
                .unwrap_or_default()
        }

        pub fn make_volume_calls(&self) -> usize {
            self.calls.make_volume.load(Ordering::SeqCst)
        }

        pub fn stat_volume_calls(&self) -> usize {
            self.calls.stat_volume.load(Ordering::SeqCst)
        }

        pub fn delete_volume_calls(&self) -> usize {
            self.calls.delete_volume.load(Ordering::SeqCst)
        }

        pub fn rename_file_calls(&self) -> usize {
            self.calls.rename_file.load(Ordering::SeqCst)
        }

        fn lock(&self) -> ::std::sync::MutexGuard<State> {
            match self.state.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            }
        }

        fn run<T, F>(&self, op: Op, f: F) -> BoxFuture<T>
        where
            T: Send + 'static,
            F: FnOnce(&mut State) -> Result<T>,
        {
            let mut state = self.lock();
            let result = if let Some(kind) = state.faults.get(&op).cloned() {
                Err(track!(Error::from(
                    kind.cause(format!("injected: endpoint={}", self.endpoint))
                )))
            } else {
                f(&mut state)
            };
            Box::new(futures::done(result))
        }
    }
    impl Disk for MemoryDisk {
        fn endpoint(&self) -> String {
            self.endpoint.clone()
        }

        fn make_volume(&self, volume: &str, _cancel: CancelSignal) -> BoxFuture<()> {
            self.calls.make_volume.fetch_add(1, Ordering::SeqCst);
            self.run(Op::MakeVolume, |state| {
                if state.volumes.contains_key(volume) {
                    track_panic!(ErrorKind::VolumeExists, "volume={:?}", volume);
                }
                state.volumes.insert(
                    volume.to_owned(),
                    Volume {
                        created: Some(SystemTime::now()),
                        files: BTreeMap::new(),
                    },
                );
                Ok(())
            })
        }

        fn stat_volume(&self, volume: &str, _cancel: CancelSignal) -> BoxFuture<VolumeInfo> {
            self.calls.stat_volume.fetch_add(1, Ordering::SeqCst);
            self.run(Op::StatVolume, |state| {
                let v = track_assert_some!(
                    state.volumes.get(volume),
                    ErrorKind::VolumeNotFound,
                    "volume={:?}",
                    volume
                );
                Ok(VolumeInfo {
                    name: volume.to_owned(),
                    created: v.created.unwrap_or_else(SystemTime::now),
                })
            })
        }

        fn delete_volume(&self, volume: &str, force: bool, _cancel: CancelSignal) -> BoxFuture<()> {
            self.calls.delete_volume.fetch_add(1, Ordering::SeqCst);
            self.run(Op::DeleteVolume, |state| {
                {
                    let v = track_assert_some!(
                        state.volumes.get(volume),
                        ErrorKind::VolumeNotFound,
                        "volume={:?}",
                        volume
                    );
                    track_assert!(
                        force || v.files.is_empty(),
                        ErrorKind::VolumeNotEmpty,
                        "volume={:?}",
                        volume
                    );
                }
                state.volumes.remove(volume);
                Ok(())
            })
        }

        fn rename_file(
            &self,
            src_volume: &str,
            src_path: &str,
            dst_volume: &str,
            dst_path: &str,
            _cancel: CancelSignal,
        ) -> BoxFuture<()> {
            self.calls.rename_file.fetch_add(1, Ordering::SeqCst);
            self.run(Op::RenameFile, |state| {
                track_assert!(src_path.is_empty(), ErrorKind::Other, "src_path={:?}", src_path);
                let moved = track_assert_some!(
                    state.volumes.remove(src_volume),
                    ErrorKind::VolumeNotFound,
                    "volume={:?}",
                    src_volume
                );
                let trash = state.volumes.entry(dst_volume.to_owned()).or_default();
                if trash.created.is_none() {
                    trash.created = Some(SystemTime::now());
                }
                if moved.files.is_empty() {
                    trash.files.insert(dst_path.to_owned(), Vec::new());
                }
                for (name, data) in moved.files {
                    trash.files.insert(format!("{}/{}", dst_path, name), data);
                }
                Ok(())
            })
        }
    }

    /// `n`個の`MemoryDisk`からなるディスク集合を作る.
    pub fn disks(n: usize) -> (Vec<DiskSlot>, Vec<MemoryDisk>) {
        let memories = (0..n)
            .map(|i| MemoryDisk::new(&format!("disk{}", i)))
            .collect::<Vec<_>>();
        let slots = memories.iter().cloned().map(DiskSlot::from).collect();
        (slots, memories)
    }
}
