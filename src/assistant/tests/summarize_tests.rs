use super::*;
use crate::assistant::fake::FakeAssistant;
use crate::session_gate::LocalSessionGate;
use crate::stats::{MemoryRemoteStore, PrincipalId};
use std::sync::Arc;
use tempfile::TempDir;

async fn ready_store() -> Arc<StatsStore> {
    let gate = LocalSessionGate::signed_in(PrincipalId::new("student-1").unwrap());
    let store = Arc::new(StatsStore::new(
        Arc::new(gate),
        Arc::new(MemoryRemoteStore::new()),
    ));
    store.initialize_stats().await;
    store
}

#[tokio::test]
async fn test_summarize_counts_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("biology.txt");
    std::fs::write(&path, "Cells are the basic unit of life.").unwrap();
    let store = ready_store().await;
    let fake = FakeAssistant::default();

    let report = summarize_file(&fake, &store, &UploadConfig::default(), &path)
        .await
        .unwrap();

    assert_eq!(report.file_name, "biology.txt");
    assert_eq!(report.size_label, "33 Bytes");
    assert_eq!(report.summary, "Summary of 33 chars");
    assert_eq!(report.stats, IncrementOutcome::Confirmed { value: 1 });
    assert_eq!(store.stats().documents_processed, 1);
    assert_eq!(fake.summarized.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_summary_does_not_count() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "some notes").unwrap();
    let store = ready_store().await;

    let result = summarize_file(
        &FakeAssistant::failing("No text provided"),
        &store,
        &UploadConfig::default(),
        &path,
    )
    .await;

    assert_eq!(result.unwrap_err().to_string(), "No text provided");
    assert_eq!(store.stats().documents_processed, 0);
}

#[tokio::test]
async fn test_rejected_upload_never_reaches_api() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("slides.pptx");
    std::fs::write(&path, "binary").unwrap();
    let store = ready_store().await;
    let fake = FakeAssistant::default();

    let err = summarize_file(&fake, &store, &UploadConfig::default(), &path)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Please upload only .txt or .pdf files");
    assert!(fake.summarized.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_document_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.txt");
    std::fs::write(&path, "  \n ").unwrap();
    let store = ready_store().await;

    let err = summarize_file(&FakeAssistant::default(), &store, &UploadConfig::default(), &path)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("No text found"));
}

/// Builds a one-page PDF showing `text` in Helvetica, with a valid xref table.
fn single_page_pdf(text: &str) -> Vec<u8> {
    let content = format!("BT /F1 24 Tf 72 700 Td ({}) Tj ET", text);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
         /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_at = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    pdf.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        pdf.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        )
        .as_bytes(),
    );
    pdf
}

#[test]
fn test_extracts_pdf_text() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("paper.pdf");
    std::fs::write(&path, single_page_pdf("Photosynthesis")).unwrap();
    let file = UploadCandidate::from_path(&path).unwrap();

    let text = extract_text(&path, &file).unwrap();
    assert!(text.contains("Photosynthesis"), "extracted: {:?}", text);
}

#[tokio::test]
async fn test_summarize_pdf_counts_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("chapter.pdf");
    std::fs::write(&path, single_page_pdf("Mitochondria")).unwrap();
    let store = ready_store().await;
    let fake = FakeAssistant::default();

    let report = summarize_file(&fake, &store, &UploadConfig::default(), &path)
        .await
        .unwrap();

    assert_eq!(report.file_name, "chapter.pdf");
    assert_eq!(report.stats, IncrementOutcome::Confirmed { value: 1 });
    let sent = fake.summarized.lock().unwrap();
    assert!(sent[0].contains("Mitochondria"));
}

#[test]
fn test_malformed_pdf_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.pdf");
    std::fs::write(&path, "%PDF-1.4\nnot really a pdf").unwrap();
    let file = UploadCandidate::from_path(&path).unwrap();

    let err = extract_text(&path, &file).unwrap_err();
    assert!(err.to_string().contains("Failed to extract text from broken.pdf"));
}
