//! End-to-end tests through the orchestrator.
//!
//! Every test gets its own storage root in a [`tempfile::TempDir`], so they
//! run in parallel without sharing files.

use doc2deck::{
    ConversionError, ConversionOptions, Doc2DeckError, ErrorKind, JobId, JobProgressCallback,
    JobState, LengthProfile, Orchestrator, SegmentationTable, ServiceConfig, StorageKind,
    TargetLength, Upload,
};
use std::collections::HashSet;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn orchestrator(tmp: &TempDir) -> Orchestrator {
    Orchestrator::new(
        ServiceConfig::builder()
            .storage_root(tmp.path().join("store"))
            .build()
            .unwrap(),
    )
}

fn upload(filename: &str, mime: Option<&str>, bytes: &[u8]) -> Upload {
    Upload::new(filename, mime.map(str::to_string), bytes.to_vec())
        .with_options(ConversionOptions::default())
}

/// Concatenated text of every slide part in the deck.
fn deck_text(path: &Path) -> String {
    let mut archive = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
        .map(str::to_string)
        .collect();
    names.sort();
    let mut text = String::new();
    for name in names {
        archive
            .by_name(&name)
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
    }
    text
}

fn files_in(orch: &Orchestrator, kind: StorageKind) -> usize {
    std::fs::read_dir(orch.storage().dir(kind))
        .map(|d| d.count())
        .unwrap_or(0)
}

fn docx(paragraphs: &[(&str, &str)]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|(style, text)| {
            let props = if style.is_empty() {
                String::new()
            } else {
                format!(r#"<w:pPr><w:pStyle w:val="{style}"/></w:pPr>"#)
            };
            format!("<w:p>{props}<w:r><w:t>{text}</w:t></w:r></w:p>")
        })
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("word/document.xml", zip::write::FileOptions::default())
        .unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap().into_inner()
}

/// A one-page PDF with one `Tj` text object per line, Helvetica, WinAnsi.
fn pdf(lines: &[&str]) -> Vec<u8> {
    let mut content = String::from("BT /F1 24 Tf 72 720 Td");
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            content.push_str(" 0 -36 Td");
        }
        content.push_str(&format!(" ({line}) Tj"));
    }
    content.push_str(" ET");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>".to_string(),
        format!("<< /Length {} >>\nstream\n{content}\nendstream", content.len()),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (i, obj) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{obj}\nendobj\n", i + 1).as_bytes());
    }
    let xref = out.len();
    out.extend_from_slice(
        format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes(),
    );
    for offset in offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    out
}

/// Blocks the runner when it announces `state` until the test resumes it.
struct PauseAt {
    state: JobState,
    reached: tokio::sync::mpsc::UnboundedSender<JobId>,
    resume: Mutex<mpsc::Receiver<()>>,
}

impl JobProgressCallback for PauseAt {
    fn on_state_change(&self, job: JobId, state: JobState, _progress: u8) {
        if state == self.state {
            let _ = self.reached.send(job);
            let _ = self.resume.lock().unwrap().recv();
        }
    }
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<(JobState, u8)>>,
}

impl JobProgressCallback for Recorder {
    fn on_state_change(&self, _job: JobId, state: JobState, progress: u8) {
        self.events.lock().unwrap().push((state, progress));
    }

    fn on_job_failed(&self, _job: JobId, _error: &ConversionError) {
        self.events.lock().unwrap().push((JobState::Failed, 0));
    }
}

// ── Local pipeline ───────────────────────────────────────────────────────────

#[tokio::test]
async fn hello_world_text_becomes_a_deck() {
    let tmp = tempfile::tempdir().unwrap();
    let orch = orchestrator(&tmp);

    let id = orch
        .intake(upload("hello.txt", Some("text/plain"), b"Hello world"))
        .await
        .unwrap();
    let snap = orch.run(id).await.unwrap();
    assert_eq!(snap.state, JobState::Completed);
    assert_eq!(snap.progress, 100);
    assert!(snap.error.is_none());

    let artifact = orch.retrieve(id).await.unwrap();
    assert_eq!(artifact.filename, "hello.pptx");
    assert!(deck_text(&artifact.path).contains("Hello world"));
    assert_eq!(files_in(&orch, StorageKind::Input), 0);
}

#[tokio::test]
async fn progress_is_reported_in_state_order() {
    let tmp = tempfile::tempdir().unwrap();
    let recorder = Arc::new(Recorder::default());
    let orch = Orchestrator::new(
        ServiceConfig::builder()
            .storage_root(tmp.path())
            .progress_callback(recorder.clone())
            .build()
            .unwrap(),
    );

    let id = orch
        .intake(upload("a.txt", None, b"Some text"))
        .await
        .unwrap();
    orch.run(id).await.unwrap();

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            (JobState::Validating, 10),
            (JobState::Extracting, 30),
            (JobState::Segmenting, 50),
            (JobState::Building, 80),
            (JobState::Completed, 100),
        ]
    );
}

#[tokio::test]
async fn word_document_headings_become_slide_titles() {
    let tmp = tempfile::tempdir().unwrap();
    let orch = orchestrator(&tmp);
    let bytes = docx(&[
        ("Heading1", "Quarterly Results"),
        ("", "Revenue grew in every region."),
        ("Heading1", "Outlook"),
        ("", "We expect steady demand."),
    ]);

    let id = orch
        .intake(upload("report.docx", None, &bytes))
        .await
        .unwrap();
    let snap = orch.run(id).await.unwrap();
    assert_eq!(snap.state, JobState::Completed, "{:?}", snap.error);

    let text = deck_text(&orch.retrieve(id).await.unwrap().path);
    assert!(text.contains("Quarterly Results"));
    assert!(text.contains("Outlook"));
    assert!(text.contains("We expect steady demand."));
}

#[tokio::test]
async fn overflow_goes_to_the_appendix() {
    let tmp = tempfile::tempdir().unwrap();
    let orch = orchestrator(&tmp);
    let paragraph = "This sentence pads the document with plenty of words. ".repeat(30);
    let body = vec![paragraph; 12].join("\n\n");
    let options = ConversionOptions {
        target_length: TargetLength::Short,
        include_appendix: true,
        ..ConversionOptions::default()
    };

    let id = orch
        .intake(Upload::new("long.txt", None, body.into_bytes()).with_options(options))
        .await
        .unwrap();
    orch.run(id).await.unwrap();

    let artifact = orch.retrieve(id).await.unwrap();
    assert!(deck_text(&artifact.path).contains("Appendix"));
}

#[tokio::test]
async fn pdf_text_becomes_a_deck_in_source_order() {
    let tmp = tempfile::tempdir().unwrap();
    let orch = orchestrator(&tmp);
    let bytes = pdf(&["First line of the PDF", "Second line of the PDF"]);

    let id = orch
        .intake(upload("paper.pdf", Some("application/pdf"), &bytes))
        .await
        .unwrap();
    let snap = orch.run(id).await.unwrap();
    assert_eq!(snap.state, JobState::Completed, "{:?}", snap.error);

    let text = deck_text(&orch.retrieve(id).await.unwrap().path);
    let first = text.find("First line").expect("first line in deck");
    let second = text.find("Second line").expect("second line in deck");
    assert!(first < second);
    assert_eq!(files_in(&orch, StorageKind::Input), 0);
}

#[tokio::test]
async fn corrupt_pdf_fails_extraction_and_releases_input() {
    let tmp = tempfile::tempdir().unwrap();
    let orch = orchestrator(&tmp);
    let truncated = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog /Pages 2 0 R";

    let id = orch
        .intake(upload("broken.pdf", Some("application/pdf"), truncated))
        .await
        .unwrap();
    let snap = orch.run(id).await.unwrap();
    assert_eq!(snap.state, JobState::Failed);
    assert_eq!(snap.error.as_ref().map(|e| e.kind()), Some(ErrorKind::Extraction));

    let err = orch.retrieve(id).await.unwrap_err();
    assert!(matches!(err, Doc2DeckError::JobFailed(_)));
    assert_eq!(files_in(&orch, StorageKind::Input), 0);
    assert_eq!(files_in(&orch, StorageKind::Output), 0);
}

#[tokio::test]
async fn zip_upload_is_rejected_without_storage() {
    let tmp = tempfile::tempdir().unwrap();
    let orch = orchestrator(&tmp);

    let err = orch
        .intake(upload("archive.zip", Some("application/zip"), b"PK\x03\x04"))
        .await
        .unwrap_err();
    assert_eq!(err.conversion_kind(), Some(ErrorKind::Validation));
    assert_eq!(files_in(&orch, StorageKind::Input), 0);
}

#[tokio::test]
async fn concurrent_jobs_use_distinct_paths() {
    let tmp = tempfile::tempdir().unwrap();
    let orch = orchestrator(&tmp);

    let mut ids = Vec::new();
    for i in 0..8 {
        let body = format!("Document number {i}");
        ids.push(
            orch.submit(upload("same-name.txt", None, body.as_bytes()))
                .await
                .unwrap(),
        );
    }

    let mut paths = HashSet::new();
    for (i, id) in ids.iter().enumerate() {
        let snap = orch.wait(*id).await.unwrap();
        assert_eq!(snap.state, JobState::Completed);
        let artifact = orch.retrieve(*id).await.unwrap();
        assert!(deck_text(&artifact.path).contains(&format!("Document number {i}")));
        paths.insert(artifact.path);
    }
    assert_eq!(paths.len(), 8);
    assert_eq!(files_in(&orch, StorageKind::Input), 0);
}

#[tokio::test]
async fn stage_timeout_fails_the_job_and_leaves_no_files() {
    let tmp = tempfile::tempdir().unwrap();
    let tiny = LengthProfile {
        max_chunks: 1_000_000,
        chunk_chars: 16,
    };
    let orch = Orchestrator::new(
        ServiceConfig::builder()
            .storage_root(tmp.path().join("store"))
            .stage_timeout(Duration::from_millis(500))
            .segmentation(SegmentationTable {
                short: tiny,
                medium: tiny,
                long: tiny,
                summary_chars: 280,
            })
            .build()
            .unwrap(),
    );
    let body: String = (0..60_000).map(|i| format!("line number {i:06}\n")).collect();

    let id = orch
        .intake(upload("big.txt", None, body.as_bytes()))
        .await
        .unwrap();
    let snap = orch.run(id).await.unwrap();
    assert_eq!(snap.state, JobState::Failed);
    assert!(snap.error.unwrap().to_string().contains("timed out"));

    let deadline = Instant::now() + Duration::from_secs(20);
    loop {
        let left = files_in(&orch, StorageKind::Input) + files_in(&orch, StorageKind::Output);
        if left == 0 {
            break;
        }
        assert!(Instant::now() < deadline, "{left} file(s) outlived the failed job");
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(files_in(&orch, StorageKind::Output), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn abandoning_a_running_job_cleans_up_at_the_next_stage() {
    let tmp = tempfile::tempdir().unwrap();
    let (reached_tx, mut reached) = tokio::sync::mpsc::unbounded_channel();
    let (resume, resume_rx) = mpsc::channel();
    let pause = Arc::new(PauseAt {
        state: JobState::Extracting,
        reached: reached_tx,
        resume: Mutex::new(resume_rx),
    });
    let orch = Orchestrator::new(
        ServiceConfig::builder()
            .storage_root(tmp.path().join("store"))
            .progress_callback(pause)
            .build()
            .unwrap(),
    );

    let id = orch
        .submit(upload("a.txt", None, b"Some text"))
        .await
        .unwrap();
    assert_eq!(reached.recv().await, Some(id));

    orch.abandon(id).await.unwrap();
    assert_eq!(orch.status(id).await.unwrap().state, JobState::Extracting);
    resume.send(()).unwrap();

    let err = orch.wait(id).await.unwrap_err();
    assert!(matches!(err, Doc2DeckError::JobNotFound(_)));
    assert_eq!(files_in(&orch, StorageKind::Input), 0);
    assert_eq!(files_in(&orch, StorageKind::Output), 0);
    assert_eq!(orch.job_count().await, 0);
}

#[tokio::test]
async fn unknown_and_unfinished_jobs() {
    let tmp = tempfile::tempdir().unwrap();
    let orch = orchestrator(&tmp);

    assert!(matches!(
        orch.status(JobId::new()).await,
        Err(Doc2DeckError::JobNotFound(_))
    ));

    let id = orch.intake(upload("a.txt", None, b"x")).await.unwrap();
    assert!(matches!(
        orch.retrieve(id).await,
        Err(Doc2DeckError::NotReady { .. })
    ));
}

// ── External converter ───────────────────────────────────────────────────────

#[cfg(unix)]
mod delegate {
    use super::*;
    use doc2deck::DelegateConfig;

    fn with_script(tmp: &TempDir, script: &str, recorder: Arc<Recorder>) -> Orchestrator {
        Orchestrator::new(
            ServiceConfig::builder()
                .storage_root(tmp.path().join("store"))
                .delegate(DelegateConfig::new("sh").arg("-c").arg(script).arg("sh"))
                .progress_callback(recorder)
                .build()
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn failing_converter_is_build_error_and_input_released() {
        let tmp = tempfile::tempdir().unwrap();
        let orch = with_script(&tmp, "echo 'Traceback' >&2; exit 1", Arc::default());

        let id = orch.intake(upload("a.txt", None, b"Hello")).await.unwrap();
        let snap = orch.run(id).await.unwrap();
        assert_eq!(snap.state, JobState::Failed);
        let error = snap.error.unwrap();
        assert_eq!(error.kind(), ErrorKind::Build);
        assert!(!error.to_string().contains("Traceback"));
        assert_eq!(files_in(&orch, StorageKind::Input), 0);
        assert_eq!(files_in(&orch, StorageKind::Output), 0);
    }

    #[tokio::test]
    async fn successful_converter_skips_local_stages() {
        let tmp = tempfile::tempdir().unwrap();

        // A real deck for the script to hand back.
        let template = tmp.path().join("template.pptx");
        let deck = doc2deck::convert_bytes(
            "t.txt",
            None,
            b"From the converter".to_vec(),
            ConversionOptions::default(),
            &ServiceConfig::default(),
        )
        .await
        .unwrap();
        std::fs::write(&template, deck).unwrap();

        let recorder = Arc::new(Recorder::default());
        let script = format!("cp '{}' \"$2\"", template.display());
        let orch = with_script(&tmp, &script, recorder.clone());

        let id = orch.intake(upload("a.txt", None, b"Hello")).await.unwrap();
        let snap = orch.run(id).await.unwrap();
        assert_eq!(snap.state, JobState::Completed);

        let states: Vec<JobState> = recorder
            .events
            .lock()
            .unwrap()
            .iter()
            .map(|(s, _)| *s)
            .collect();
        assert_eq!(
            states,
            vec![JobState::Validating, JobState::Building, JobState::Completed]
        );

        let artifact = orch.retrieve(id).await.unwrap();
        assert!(deck_text(&artifact.path).contains("From the converter"));
        assert_eq!(files_in(&orch, StorageKind::Input), 0);
    }
}
