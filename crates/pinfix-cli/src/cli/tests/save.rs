//! Tests for save.

use crate::cli::commands::save_report;
use pinfix_core::page::ClickOutcome;
use pinfix_core::protocol::ResolvedMetadataMessage;
use std::path::PathBuf;

fn dispatched() -> Option<ClickOutcome> {
    Some(ClickOutcome::Dispatched(ResolvedMetadataMessage {
        image_url: "https://i.pinimg.com/originals/ab/cd/ef123456.jpg".into(),
        title: "Chocolate Cake Recipe".into(),
        ..Default::default()
    }))
}

#[test]
fn save_report_names_the_uniquified_file() {
    let written = PathBuf::from("/tmp/dl/Pinterest/Chocolate Cake Recipe (1).jpg");
    let report = save_report(dispatched(), "#dl", &[written]).unwrap();
    assert_eq!(report, "saved /tmp/dl/Pinterest/Chocolate Cake Recipe (1).jpg");
}

#[test]
fn save_report_fails_when_dispatch_wrote_nothing() {
    let err = save_report(dispatched(), "#dl", &[]).unwrap_err();
    assert!(err.to_string().contains("ef123456.jpg"), "{err}");
}

#[test]
fn save_report_explains_non_dispatch_outcomes() {
    assert_eq!(save_report(Some(ClickOutcome::Debounced), "#dl", &[]).unwrap(), "click debounced");
    assert!(save_report(None, "#x", &[]).unwrap().contains("'#x'"));
}
