use std::collections::HashSet;
use std::path::Path;

use lidcorpus::io::JsonlReader;
use lidcorpus::pipelines::{CorpusPipeline, Pipeline};
use lidcorpus::processing::{Dedup, Ratios};
use lidcorpus::record::{Record, TaggedRecord};
use lidcorpus::sources::collect::{processed_path, write_records};

fn records(code: &str, source: &str, texts: &[String]) -> Vec<Record> {
    texts
        .iter()
        .map(|t| Record::new(t.clone(), code, source).with_domain("sentences"))
        .collect()
}

/// am: 30 Ethiopic tatoeba lines (2 repeated), 6 udhr lines of which 2 are romanized,
/// and a udhr line equal to a tatoeba one up to whitespace.
fn write_inputs(processed: &Path) {
    // `processed_path` appends `processed/` to the data prefix itself
    let prefix = processed.parent().unwrap();
    let mut tatoeba: Vec<String> = (0..30).map(|i| format!("ሰላም ለዓለም ሁሉ ይሁን {i}")).collect();
    tatoeba.push("ሰላም ለዓለም ሁሉ ይሁን 3".to_string());
    tatoeba.push("ሰላም ለዓለም ሁሉ ይሁን 4".to_string());
    write_records(
        &processed_path(prefix, "am", "tatoeba"),
        &records("am", "tatoeba", &tatoeba),
    )
    .unwrap();

    let mut udhr: Vec<String> = (0..4)
        .map(|i| format!("ሁሉም የሰው ልጆች ሲወለዱ ነጻና በክብርና በመብትም እኩልነት ያላቸው ናቸው {i}"))
        .collect();
    udhr.push("selam le alem hulu yihun".to_string());
    udhr.push("hulum yesew lijoch siweledu netsana".to_string());
    udhr.push("ሰላም   ለዓለም ሁሉ\nይሁን 0".to_string());
    write_records(
        &processed_path(prefix, "am", "udhr"),
        &records("am", "udhr", &udhr),
    )
    .unwrap();

    // Latin-default language: never romanized
    let tok: Vec<String> = (0..10).map(|i| format!("toki pona li pona mute {i}")).collect();
    write_records(
        &processed_path(prefix, "tok", "tatoeba"),
        &records("tok", "tatoeba", &tok),
    )
    .unwrap();
}

fn read<T: serde::de::DeserializeOwned>(path: &Path) -> Vec<T> {
    if !path.exists() {
        return Vec::new();
    }
    JsonlReader::new(path).unwrap().collect()
}

#[test_log::test]
fn dedup_tag_split() {
    let dir = tempfile::tempdir().unwrap();
    let processed = dir.path().join("processed");
    let splits = dir.path().join("splits");
    let reports = dir.path().join("reports");
    write_inputs(&processed);

    let mut pipeline = CorpusPipeline::new(&processed, &splits, &reports);
    pipeline.splitter.ratios = Ratios::new(0.5, 0.1, 0.4).unwrap();
    pipeline.splitter.strict = true;
    let summary = pipeline.run().unwrap();

    // dedup
    let am = summary.dedup.iter().find(|s| s.lang == "am").unwrap();
    assert_eq!(am.input_total, 39);
    assert_eq!(am.exact_dups, 3);
    assert_eq!(am.kept, 36);
    assert_eq!(summary.dedup.len(), 2);

    // script tagging
    let tagged: Vec<TaggedRecord> = read(&processed.join("am.dedup.tagged.jsonl"));
    assert_eq!(tagged.len(), 36);
    let romanized: Vec<&TaggedRecord> = tagged.iter().filter(|t| t.is_romanized).collect();
    assert_eq!(romanized.len(), 2);
    assert!(romanized.iter().all(|t| t.script.primary == "Latin"));
    let tok: Vec<TaggedRecord> = read(&processed.join("tok.dedup.tagged.jsonl"));
    assert!(tok.iter().all(|t| !t.is_romanized));

    // split: every record in exactly one of train/dev/test/dropped
    let mut seen = HashSet::new();
    let mut total = 0;
    for part in ["train", "dev", "test", "dropped"] {
        let recs: Vec<TaggedRecord> = read(&splits.join(part).join("am.jsonl"));
        for r in &recs {
            assert!(seen.insert(r.record.text.clone()), "{} twice", r.record.text);
            if part == "train" {
                assert!(!r.is_romanized);
            }
            assert_eq!(r.record.extra["split"], part);
        }
        total += recs.len();
    }
    assert_eq!(total, 36);

    let am_split = summary.split.iter().find(|s| s.lang == "am").unwrap();
    assert_eq!(
        am_split.train + am_split.dev + am_split.test + am_split.train_dropped_romanized,
        36
    );

    for report in ["dedup_summary.csv", "script_summary.csv", "split_summary.csv"] {
        assert!(reports.join(report).exists(), "{report} missing");
    }
    for part in ["train", "dev", "test"] {
        assert!(splits.join(format!("{part}.jsonl")).exists());
    }
}

#[test_log::test]
fn dedup_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let processed = dir.path().join("processed");
    write_inputs(&processed);

    let mut first = Dedup::new(&processed, &processed);
    first.near_dup = true;
    let summaries = first.run(&["am".to_string()]).unwrap();
    let kept = summaries[0].kept;

    // feed the output back as the only source
    let again = dir.path().join("again");
    std::fs::create_dir_all(&again).unwrap();
    std::fs::copy(
        processed.join("am.dedup.jsonl"),
        again.join("am.tatoeba.jsonl"),
    )
    .unwrap();
    let mut second = Dedup::new(&again, &again);
    second.near_dup = true;
    let summaries = second.run(&[]).unwrap();

    assert_eq!(summaries[0].kept, kept);
    assert_eq!(summaries[0].exact_dups, 0);
    assert_eq!(summaries[0].near_dups, 0);
}
