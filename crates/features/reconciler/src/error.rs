use std::borrow::Cow;

/// Faults that abort a whole cycle: the queue or the credentials could not be
/// read or written. Per-task faults are classified and never surface here.
#[zb_derive::zb_error]
pub enum ReconcileError {
    #[error("Store failure{}: {source}", format_context(.context))]
    Store { source: zb_store::StoreError, context: Option<Cow<'static, str>> },
}
