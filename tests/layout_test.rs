//! Integration tests for the proportional layout engine.

use std::fs;
use std::path::PathBuf;

use sse::domain::{
    layout, layout_records, parse_document, DomainError, IntervalKind, LayoutConfig, Paint,
    Record, SourceFile,
};

fn rain_records() -> Vec<Record> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/resources/corpus/rain.txt");
    let source = SourceFile::parse(&fs::read_to_string(path).unwrap()).unwrap();
    parse_document(&source.body).unwrap()
}

fn auto_cap() -> LayoutConfig {
    LayoutConfig {
        word_cap: 0,
        ..LayoutConfig::default()
    }
}

#[test]
fn given_twenty_words_and_cap_ten_when_laying_out_then_doubles_height() {
    let sentence = (1..=20).map(|n| format!("w{n}")).collect::<Vec<_>>().join(" ");
    let records = parse_document(&format!("{sentence}\n(IC1{sentence}\n)")).unwrap();
    let tree = &records[0].tree;
    assert_eq!(tree.root_data().w_tree_count, 20);

    let model = layout(tree, 10, &LayoutConfig::default()).unwrap();

    assert_eq!(model.scale, 2.0);
    assert_eq!(model.bar_height, 90.0);
    assert_eq!(model.bar_width_pct, 100.0);
    assert_eq!(model.root.kind, IntervalKind::Root);
    assert_eq!(model.root.fill, Some(Paint::Solid("#808080".to_string())));
}

#[test]
fn given_auto_cap_when_laying_out_corpus_then_longest_sentence_fills_width() {
    let records = rain_records();
    let models: Vec<_> = layout_records(&records, &auto_cap())
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();

    let widths: Vec<_> = models.iter().map(|m| m.bar_width_pct).collect();
    assert_eq!(widths, vec![75.0, 100.0, 37.5]);
    assert!(models.iter().all(|m| m.scale == 1.0));
}

#[test]
fn given_nested_clause_when_laying_out_then_bands_and_spacers_follow_levels() {
    let records = rain_records();
    let model = layout(&records[0].tree, 8, &LayoutConfig::default()).unwrap();

    let got: Vec<_> = model
        .intervals
        .iter()
        .map(|i| (i.kind, i.level, i.x_pct, i.width_pct, i.y, i.height))
        .collect();
    assert_eq!(
        got,
        vec![
            (IntervalKind::Tagged, 1, 0.0, 75.0, 5.0, 37.0),
            (IntervalKind::Spacer, 2, 50.0, 25.0, 10.0, 29.0),
            (IntervalKind::Tagged, 2, 0.0, 50.0, 10.0, 29.0),
        ]
    );
    assert_eq!(model.intervals[0].fill, Some(Paint::Solid("#89CFF1".to_string())));
    assert_eq!(model.intervals[1].fill, None);
    assert_eq!(model.intervals[1].word_index, Some(5));
    // forward reference resolves to the DCf entry
    assert_eq!(model.intervals[2].fill, Some(Paint::Solid("#e38989".to_string())));
}

#[test]
fn given_attached_constituent_when_laying_out_then_uses_pattern_fill() {
    let records = rain_records();
    let model = layout(&records[1].tree, 8, &LayoutConfig::default()).unwrap();

    let cp = model
        .intervals
        .iter()
        .find(|i| i.kind == IntervalKind::Tagged && i.x_pct > 0.0)
        .unwrap();
    assert_eq!(cp.x_pct, 37.5);
    assert_eq!(cp.width_pct, 62.5);
    assert_eq!(cp.level, 1);
    assert_eq!(cp.fill, Some(Paint::Pattern("contrast_line1".to_string())));

    let spacer = model
        .intervals
        .iter()
        .find(|i| i.kind == IntervalKind::Spacer)
        .unwrap();
    assert_eq!((spacer.x_pct, spacer.width_pct), (0.0, 37.5));
    assert_eq!(spacer.word_index, Some(1));
}

#[test]
fn given_low_bar_when_laying_out_then_suggests_minimum_height() {
    let records = rain_records();
    let config = LayoutConfig {
        bar_height: 10.0,
        ..LayoutConfig::default()
    };

    let err = layout(&records[0].tree, 8, &config).unwrap_err();

    assert_eq!(err, DomainError::InsufficientBarHeight { suggested: 21 });
}

#[test]
fn given_zero_cap_when_laying_out_single_tree_then_rejects_cap() {
    let records = rain_records();
    let err = layout(&records[0].tree, 0, &LayoutConfig::default()).unwrap_err();
    assert!(matches!(err, DomainError::InvalidWordCap(_)));
}

#[test]
fn given_model_when_serializing_then_paint_is_tagged() {
    let records = rain_records();
    let model = layout(&records[1].tree, 8, &LayoutConfig::default()).unwrap();
    let json = serde_json::to_value(&model).unwrap();

    assert_eq!(json["root"]["kind"], "root");
    assert_eq!(json["intervals"][0]["fill"]["type"], "solid");
    assert!(json["intervals"][0].get("node").is_none());
}
