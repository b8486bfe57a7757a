//! Tests for CorpusService

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use sse::application::services::{CorpusService, LayoutOverrides};
use sse::application::ApplicationError;
use sse::domain::{DomainError, LayoutConfig, Mark};
use sse::infrastructure::traits::RealFileSystem;

fn resources() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/resources/corpus")
}

fn service(corpus_dir: &Path) -> CorpusService {
    CorpusService::new(
        Arc::new(RealFileSystem),
        corpus_dir.to_path_buf(),
        LayoutConfig::default(),
    )
}

// ============================================================
// load()
// ============================================================

#[test]
fn given_corpus_file_when_loading_then_splits_metadata_and_records() {
    let corpus = service(&resources()).load(Path::new("rain.txt")).unwrap();

    assert_eq!(corpus.source.get("Work"), Some("The Test Corpus"));
    assert_eq!(corpus.source.get("Author"), Some("A. Writer"));
    assert_eq!(corpus.source.tags(), vec!["weather", "music"]);
    assert_eq!(corpus.records.len(), 3);
    assert_eq!(corpus.longest(), 8);
    assert_eq!(corpus.effective_word_cap(0), 8);
    assert_eq!(corpus.effective_word_cap(30), 30);
}

#[test]
fn given_file_without_separator_when_loading_then_reports_missing_marker() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("plain.txt");
    fs::write(&path, "The cat sat.\n(IC1The cat sat.\n)\n").unwrap();

    let err = service(tmp.path()).load(&path).unwrap_err();

    assert_eq!(err.domain(), Some(&DomainError::MissingSeparator));
    assert!(matches!(err, ApplicationError::InFile { .. }));
}

#[test]
fn given_unbalanced_file_when_loading_then_error_names_line() {
    let err = service(&resources())
        .load(Path::new("unbalanced.txt"))
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.ends_with("Check parentheses pairs\nLine 2: (IC1The cat sat."));
}

// ============================================================
// layout() / excerpt() / hover()
// ============================================================

#[test]
fn given_cap_override_when_laying_out_then_override_wins() {
    let svc = service(&resources());
    let corpus = svc.load(Path::new("rain.txt")).unwrap();

    let models = svc.layout(
        &corpus,
        LayoutOverrides {
            word_cap: Some(4),
            bar_height: None,
        },
    )
    .unwrap();

    let scales: Vec<_> = models.iter().map(|m| m.as_ref().unwrap().scale).collect();
    assert_eq!(scales, vec![1.5, 2.0, 1.0]);
}

#[test]
fn given_nan_bar_height_override_when_laying_out_then_rejected_before_layout() {
    let svc = service(&resources());
    let corpus = svc.load(Path::new("rain.txt")).unwrap();

    let err = svc
        .layout(
            &corpus,
            LayoutOverrides {
                word_cap: None,
                bar_height: Some(f64::NAN),
            },
        )
        .unwrap_err();

    assert!(matches!(
        err.domain(),
        Some(DomainError::InvalidBarHeight(_))
    ));
}

#[test]
fn given_corpus_when_excerpting_then_paragraphs_follow_leading_spaces() {
    let svc = service(&resources());
    let corpus = svc.load(Path::new("rain.txt")).unwrap();

    assert_eq!(
        svc.excerpt(&corpus),
        vec![
            "When the rain stops, we leave. She sang—softly—and the room went still.".to_string(),
            "It was late.".to_string(),
        ]
    );
}

#[test]
fn given_commented_node_when_hovering_then_shows_sentence_split_and_comments() {
    let svc = service(&resources());
    let corpus = svc.load(Path::new("rain.txt")).unwrap();

    let view = svc.hover(&corpus, 1, Some(2), None).unwrap();

    assert_eq!(view.before, "");
    assert_eq!(view.highlighted(), "When the rain stops,");
    assert_eq!(view.after, " we leave.");
    assert_eq!(view.comment, "conditional opening\ntime clause");
}

#[test]
fn given_node_with_tagged_child_when_hovering_then_marks_child_range() {
    let svc = service(&resources());
    let corpus = svc.load(Path::new("rain.txt")).unwrap();

    let view = svc.hover(&corpus, 2, Some(1), None).unwrap();

    let got: Vec<_> = view
        .segments
        .iter()
        .map(|s| (s.text.as_str(), s.mark))
        .collect();
    assert_eq!(
        got,
        vec![
            ("She sang—softly—", Mark::None),
            ("and the room went still.", Mark::Child),
        ]
    );
    assert_eq!(view.comment, "(independent clause)");
}

#[test]
fn given_unknown_record_or_node_when_hovering_then_fails() {
    let svc = service(&resources());
    let corpus = svc.load(Path::new("rain.txt")).unwrap();

    assert!(svc.hover(&corpus, 0, None, None).is_err());
    assert!(svc.hover(&corpus, 4, None, None).is_err());
    assert!(svc.hover(&corpus, 1, Some(99), None).is_err());
}

// ============================================================
// check_dir()
// ============================================================

#[test]
fn given_mixed_directory_when_checking_then_reports_each_corpus_file_in_order() {
    let checks = service(&resources()).check_dir(&resources()).unwrap();

    let names: Vec<_> = checks
        .iter()
        .map(|c| c.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["rain.txt", "unbalanced.txt"]);
    assert!(checks[0].is_ok());
    assert_eq!(*checks[0].result.as_ref().unwrap(), 3);
    assert!(!checks[1].is_ok());
}

#[test]
fn given_nested_directories_when_checking_then_walks_recursively() {
    let tmp = TempDir::new().unwrap();
    let sub = tmp.path().join("woolf");
    fs::create_dir_all(&sub).unwrap();
    let good = "Work: W\n###\n The cat sat.\n(IC1The cat sat.\n)\n";
    fs::write(tmp.path().join("a.txt"), good).unwrap();
    fs::write(sub.join("b.txt"), good).unwrap();

    let checks = service(tmp.path()).check_dir(tmp.path()).unwrap();

    assert_eq!(checks.len(), 2);
    assert!(checks.iter().all(|c| c.is_ok()));
}

#[test]
fn given_file_path_when_checking_dir_then_not_a_directory() {
    let err = service(&resources())
        .check_dir(&resources().join("rain.txt"))
        .unwrap_err();
    assert!(matches!(err, ApplicationError::NotADirectory(_)));
}
