use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// キャンセル要求を受け取るための構造体.
///
/// 一つの操作内の全ディスク呼び出しに同じ値(のクローン)が渡される.
/// `make_cancel_signal`関数によって、対応する`Canceler`との組として生成される.
#[derive(Debug, Clone)]
pub struct CancelSignal(Arc<AtomicBool>);
impl CancelSignal {
    /// 決してキャンセルされない`CancelSignal`を返す.
    pub fn never() -> Self {
        CancelSignal(Arc::new(AtomicBool::new(false)))
    }

    /// キャンセル要求が発行済みかどうかを判定する.
    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// キャンセル要求を発行するための構造体.
#[derive(Debug, Clone)]
pub struct Canceler(Arc<AtomicBool>);
impl Canceler {
    /// 対応する全ての`CancelSignal`にキャンセル要求を伝える.
    ///
    /// 二回目以降の呼び出しは何もしない.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// `Canceler`と`CancelSignal`の組を生成する.
pub fn make_cancel_signal() -> (Canceler, CancelSignal) {
    let flag = Arc::new(AtomicBool::new(false));
    (Canceler(Arc::clone(&flag)), CancelSignal(flag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_reaches_every_clone() {
        let (canceler, signal) = make_cancel_signal();
        let cloned = signal.clone();
        assert!(!signal.is_canceled());
        assert!(!cloned.is_canceled());

        canceler.cancel();
        assert!(signal.is_canceled());
        assert!(cloned.is_canceled());

        canceler.cancel();
        assert!(signal.is_canceled());
    }

    #[test]
    fn never_signal_stays_active() {
        let signal = CancelSignal::never();
        assert!(!signal.is_canceled());
    }
}
