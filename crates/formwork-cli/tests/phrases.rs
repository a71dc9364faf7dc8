//! Phrase bundle loading.

use formwork_cli::phrases::read_phrases;
use formwork_model::Phrasebook;

#[test]
fn reads_key_text_rows() {
    let csv = "key,text\n\
               model.user.name.label,Name\n\
               control.error.required,\"{{label}} is required, please\"\n \
               ,ignored\n\
               model.user.name.label,Full name\n";
    let phrases = read_phrases(csv.as_bytes()).expect("phrases");

    assert_eq!(phrases.len(), 2);
    assert_eq!(
        phrases.phrase("model.user.name.label").as_deref(),
        Some("Full name")
    );
    assert_eq!(
        phrases.phrase("control.error.required").as_deref(),
        Some("{{label}} is required, please")
    );
}

#[test]
fn rejects_rows_without_text() {
    let csv = "key,text\nmodel.user.name.label\n";
    let error = read_phrases(csv.as_bytes()).expect_err("short row");
    assert!(format!("{error:#}").contains("phrase row 1"));
}
