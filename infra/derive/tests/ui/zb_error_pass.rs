use std::borrow::Cow;
use zb_derive::zb_error;

#[zb_error]
pub enum DemoError {
    #[error("I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Rejected{}: {message}", format_context(.context))]
    Rejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<Vec<u8>, DemoError> {
    std::fs::read("missing.bin").context("Reading demo file")
}

fn main() {
    let err = read().expect_err("file should be missing");
    assert!(err.to_string().contains("(Reading demo file)"));

    let internal: DemoError = "boom".into();
    assert!(matches!(internal, DemoError::Internal { .. }));

    let rejected: Result<(), DemoError> =
        Err(DemoError::Rejected { message: "full".into(), context: None });
    let err = rejected.context("Registering").expect_err("still an error");
    assert_eq!(err.to_string(), "Rejected (Registering): full");
}
