use rustracing::tag::{StdTag, Tag};
use rustracing_jaeger::span::{Span, SpanHandle};

use crate::Error;

/// バケット操作用のスパンを開始する.
pub(crate) fn start_bucket_span(
    parent: &SpanHandle,
    operation: &'static str,
    bucket: &str,
    disks: usize,
) -> Span {
    parent.child(operation, |span| {
        span.tag(StdTag::component(module_path!()))
            .tag(Tag::new("bucket", bucket.to_owned()))
            .tag(Tag::new("disks", disks as i64))
            .start()
    })
}

/// An extension of `Span`.
pub(crate) trait SpanExt {
    /// Logs the specified error into the given span.
    fn log_error(&mut self, e: &Error);
}
impl SpanExt for Span {
    fn log_error(&mut self, e: &Error) {
        self.set_tag(StdTag::error);
        self.log(|log| {
            let kind = format!("{:?}", e.kind());
            log.error().kind(kind).message(e.to_string());
        })
    }
}
