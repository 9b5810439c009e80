/*! Stratified splitting

Tagged records of a language are grouped in cells by source and length bucket.
Each cell is shuffled with a seeded RNG and cut into train/dev/test
following the requested ratios:

```text
n_train = round(n * train)
n_dev   = round(n * dev)
n_test  = n - n_train - n_dev
```

In strict mode, romanized records are removed from the train portion only.
They are written to a `dropped` file rather than lost.

Every input record ends up in exactly one of train, dev, test or dropped.
!*/
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use crate::error::Error;
use crate::io::writer::report;
use crate::io::{Corpus, JsonlWriter, SplitFiles, WriterTrait};
use crate::record::{SplitLabel, TaggedRecord};

/// Character length bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LengthBucket {
    Short,
    Medium,
    Long,
}

impl LengthBucket {
    pub const ALL: [LengthBucket; 3] = [LengthBucket::Short, LengthBucket::Medium, LengthBucket::Long];

    /// short: up to 60 chars, medium: 61 to 140, long: 141 and more.
    pub fn of(text: &str) -> Self {
        match text.chars().count() {
            0..=60 => LengthBucket::Short,
            61..=140 => LengthBucket::Medium,
            _ => LengthBucket::Long,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LengthBucket::Short => "short",
            LengthBucket::Medium => "medium",
            LengthBucket::Long => "long",
        }
    }
}

impl fmt::Display for LengthBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split ratios.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ratios {
    pub train: f64,
    pub dev: f64,
    pub test: f64,
}

impl Ratios {
    /// Checks that ratios are within `[0, 1]` and sum to 1.
    pub fn new(train: f64, dev: f64, test: f64) -> Result<Self, Error> {
        let ratios = Self { train, dev, test };
        if [train, dev, test].iter().any(|r| !(0.0..=1.0).contains(r)) {
            return Err(Error::Custom(format!("split ratios must be in [0, 1]: {ratios:?}")));
        }
        if (train + dev + test - 1.0).abs() > 1e-6 {
            return Err(Error::Custom(format!("split ratios must sum to 1: {ratios:?}")));
        }
        Ok(ratios)
    }

    /// `(n_train, n_dev, n_test)` for a cell of `n` records.
    pub fn counts(&self, n: usize) -> (usize, usize, usize) {
        let n_train = ((n as f64 * self.train).round() as usize).min(n);
        let n_dev = ((n as f64 * self.dev).round() as usize).min(n - n_train);
        (n_train, n_dev, n - n_train - n_dev)
    }
}

impl Default for Ratios {
    /// No train portion, 10% dev, 90% test.
    fn default() -> Self {
        Self {
            train: 0.0,
            dev: 0.1,
            test: 0.9,
        }
    }
}

/// Result of splitting one language.
#[derive(Debug, Default)]
pub struct SplitOutcome {
    pub train: Vec<TaggedRecord>,
    pub dev: Vec<TaggedRecord>,
    pub test: Vec<TaggedRecord>,
    /// Romanized records removed from train in strict mode.
    pub dropped: Vec<TaggedRecord>,
}

impl SplitOutcome {
    pub fn get(&self, split: SplitLabel) -> &[TaggedRecord] {
        match split {
            SplitLabel::Train => &self.train,
            SplitLabel::Dev => &self.dev,
            SplitLabel::Test => &self.test,
        }
    }

    fn bucket_count(&self, split: SplitLabel, bucket: LengthBucket) -> usize {
        self.get(split)
            .iter()
            .filter(|r| LengthBucket::of(&r.record.text) == bucket)
            .count()
    }

    pub fn total(&self) -> usize {
        self.train.len() + self.dev.len() + self.test.len() + self.dropped.len()
    }
}

/// Split `records` of a single language.
pub fn split_records(
    records: Vec<TaggedRecord>,
    ratios: &Ratios,
    seed: u64,
    strict: bool,
) -> SplitOutcome {
    let mut cells: BTreeMap<(String, LengthBucket), Vec<TaggedRecord>> = BTreeMap::new();
    for record in records {
        let key = (
            record.record.stratum_source().to_string(),
            LengthBucket::of(&record.record.text),
        );
        cells.entry(key).or_default().push(record);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut outcome = SplitOutcome::default();

    for (_, mut items) in cells {
        items.shuffle(&mut rng);
        let (n_train, n_dev, _) = ratios.counts(items.len());

        let test = items.split_off(n_train + n_dev);
        let dev = items.split_off(n_train);
        let train = items;

        for record in train {
            if strict && record.is_romanized {
                outcome.dropped.push(record);
            } else {
                outcome.train.push(record);
            }
        }
        outcome.dev.extend(dev);
        outcome.test.extend(test);
    }

    outcome
}

/// Summary row of `reports/split_summary.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitSummary {
    pub lang: String,
    pub total: usize,
    pub train: usize,
    pub dev: usize,
    pub test: usize,
    pub train_short: usize,
    pub train_medium: usize,
    pub train_long: usize,
    pub dev_short: usize,
    pub dev_medium: usize,
    pub dev_long: usize,
    pub test_short: usize,
    pub test_medium: usize,
    pub test_long: usize,
    pub train_dropped_romanized: usize,
}

impl SplitSummary {
    fn new(lang: &str, outcome: &SplitOutcome) -> Self {
        use LengthBucket::*;
        use SplitLabel::*;
        Self {
            lang: lang.to_string(),
            total: outcome.total(),
            train: outcome.train.len(),
            dev: outcome.dev.len(),
            test: outcome.test.len(),
            train_short: outcome.bucket_count(Train, Short),
            train_medium: outcome.bucket_count(Train, Medium),
            train_long: outcome.bucket_count(Train, Long),
            dev_short: outcome.bucket_count(Dev, Short),
            dev_medium: outcome.bucket_count(Dev, Medium),
            dev_long: outcome.bucket_count(Dev, Long),
            test_short: outcome.bucket_count(Test, Short),
            test_medium: outcome.bucket_count(Test, Medium),
            test_long: outcome.bucket_count(Test, Long),
            train_dropped_romanized: outcome.dropped.len(),
        }
    }
}

/// Splitting stage.
#[derive(Debug, Clone)]
pub struct Splitter {
    pub src: PathBuf,
    pub dst: PathBuf,
    pub in_suffix: String,
    pub ratios: Ratios,
    pub seed: u64,
    /// Drop romanized records from train.
    pub strict: bool,
    /// Also write `dst/{train,dev,test}.jsonl` with every language.
    pub concat: bool,
    pub report: Option<PathBuf>,
}

impl Splitter {
    pub fn new(src: &Path, dst: &Path) -> Self {
        Self {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
            in_suffix: ".dedup.tagged.jsonl".to_string(),
            ratios: Ratios::default(),
            seed: 7,
            strict: false,
            concat: true,
            report: None,
        }
    }

    /// Split a language and write its split files.
    /// Returns `None` if its input file is missing.
    pub fn split_lang(&self, lang: &str) -> Result<Option<(SplitSummary, SplitOutcome)>, Error> {
        let corpus = Corpus::new(&self.src, &self.in_suffix);
        let reader = match corpus.reader::<TaggedRecord>(lang)? {
            Some(r) => r,
            None => return Ok(None),
        };

        let outcome = split_records(reader.collect(), &self.ratios, self.seed, self.strict);

        let mut files = SplitFiles::new(&self.dst, lang)?;
        for split in SplitLabel::ALL {
            for record in outcome.get(split) {
                files.write_single(split, &with_split(record, split.as_str()))?;
            }
        }
        files.flush()?;

        let dropped_path = self.dst.join("dropped").join(format!("{lang}.jsonl"));
        if outcome.dropped.is_empty() {
            // leftover from a previous strict run
            match std::fs::remove_file(&dropped_path) {
                Ok(()) => info!("[{lang}] removed stale {dropped_path:?}"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => (),
                Err(e) => return Err(e.into()),
            }
        } else {
            let mut w = JsonlWriter::create(&dropped_path)?;
            for record in &outcome.dropped {
                w.write_single(&with_split(record, "dropped"))?;
            }
            w.flush()?;
        }

        let summary = SplitSummary::new(lang, &outcome);
        info!(
            "[{lang}] total={} -> train={} dev={} test={} (dropped_rom_train={})",
            summary.total, summary.train, summary.dev, summary.test, summary.train_dropped_romanized
        );
        Ok(Some((summary, outcome)))
    }

    /// Split `langs` (or every discovered language if empty).
    pub fn run(&self, langs: &[String]) -> Result<Vec<SplitSummary>, Error> {
        let corpus = Corpus::new(&self.src, &self.in_suffix);
        let langs = corpus.langs_or(langs)?;
        if langs.is_empty() {
            info!("no languages discovered in {:?}", self.src);
            return Ok(Vec::new());
        }

        let mut concat = if self.concat {
            let mut writers = BTreeMap::new();
            for split in SplitLabel::ALL {
                let path = self.dst.join(format!("{split}.jsonl"));
                writers.insert(split, JsonlWriter::create(&path)?);
            }
            Some(writers)
        } else {
            None
        };

        let mut summaries = Vec::with_capacity(langs.len());
        for lang in &langs {
            let Some((summary, outcome)) = self.split_lang(lang)? else {
                continue;
            };
            if let Some(writers) = &mut concat {
                for (split, w) in writers.iter_mut() {
                    for record in outcome.get(*split) {
                        w.write_single(&with_split(record, split.as_str()))?;
                    }
                }
            }
            if let Some(report_path) = &self.report {
                report::append_row(report_path, &summary)?;
            }
            summaries.push(summary);
        }

        if let Some(writers) = &mut concat {
            let mut total = 0;
            for w in writers.values_mut() {
                w.flush()?;
                total += w.count();
            }
            info!("wrote {total} examples across splits");
        }
        Ok(summaries)
    }
}

fn with_split(record: &TaggedRecord, split: &str) -> TaggedRecord {
    let mut record = record.clone();
    record.record.set_extra("split", split);
    record
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::io::JsonlReader;
    use crate::record::{Record, ScriptTag};

    fn tagged(text: &str, source: &str, romanized: bool) -> TaggedRecord {
        TaggedRecord {
            record: Record::new(text.to_string(), "am", source),
            script: ScriptTag {
                primary: "Latin".to_string(),
                primary_ratio: 1.0,
                counts: BTreeMap::new(),
            },
            is_romanized: romanized,
        }
    }

    fn corpus(n: usize) -> Vec<TaggedRecord> {
        (0..n)
            .map(|i| {
                let source = if i % 3 == 0 { "udhr" } else { "tatoeba" };
                let text = if i % 4 == 0 {
                    format!("{i} {}", "long sentence ".repeat(12))
                } else {
                    format!("sentence number {i}")
                };
                tagged(&text, source, i % 5 == 0)
            })
            .collect()
    }

    #[test]
    fn buckets() {
        assert_eq!(LengthBucket::of(&"a".repeat(60)), LengthBucket::Short);
        assert_eq!(LengthBucket::of(&"a".repeat(61)), LengthBucket::Medium);
        assert_eq!(LengthBucket::of(&"a".repeat(140)), LengthBucket::Medium);
        assert_eq!(LengthBucket::of(&"a".repeat(141)), LengthBucket::Long);
        // code points, not bytes
        assert_eq!(LengthBucket::of(&"ሰ".repeat(60)), LengthBucket::Short);
    }

    #[test]
    fn ratio_validation() {
        assert!(Ratios::new(0.8, 0.1, 0.1).is_ok());
        assert!(Ratios::new(0.8, 0.3, 0.1).is_err());
        assert!(Ratios::new(-0.1, 0.2, 0.9).is_err());
    }

    #[test]
    fn counts_sum_to_n() {
        let r = Ratios::new(0.8, 0.1, 0.1).unwrap();
        assert_eq!(r.counts(10), (8, 1, 1));
        assert_eq!(r.counts(1), (1, 0, 0));
        assert_eq!(Ratios::default().counts(10), (0, 1, 9));
        for n in 0..50 {
            let (a, b, c) = r.counts(n);
            assert_eq!(a + b + c, n);
        }
    }

    #[test]
    fn disjoint_and_exhaustive() {
        let ratios = Ratios::new(0.6, 0.2, 0.2).unwrap();
        for strict in [false, true] {
            let outcome = split_records(corpus(100), &ratios, 7, strict);
            assert_eq!(outcome.total(), 100);

            let mut seen = HashSet::new();
            for r in outcome
                .train
                .iter()
                .chain(&outcome.dev)
                .chain(&outcome.test)
                .chain(&outcome.dropped)
            {
                assert!(seen.insert(r.record.text.clone()));
            }
            assert_eq!(seen.len(), 100);

            if strict {
                assert!(!outcome.dropped.is_empty());
                assert!(outcome.train.iter().all(|r| !r.is_romanized));
            } else {
                assert!(outcome.dropped.is_empty());
            }
        }
    }

    #[test]
    fn strict_keeps_romanized_in_dev_and_test() {
        let ratios = Ratios::new(0.0, 0.5, 0.5).unwrap();
        let outcome = split_records(corpus(40), &ratios, 7, true);
        assert!(outcome.dropped.is_empty());
        assert!(outcome.dev.iter().chain(&outcome.test).any(|r| r.is_romanized));
    }

    #[test]
    fn seeded() {
        let ratios = Ratios::default();
        let a = split_records(corpus(50), &ratios, 7, false);
        let b = split_records(corpus(50), &ratios, 7, false);
        assert_eq!(a.dev, b.dev);
        assert_eq!(a.test, b.test);
    }

    #[test]
    fn split_lang_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("processed");
        let dst = dir.path().join("splits");
        let mut w = JsonlWriter::create(&src.join("am.dedup.tagged.jsonl")).unwrap();
        w.write(corpus(20)).unwrap();
        w.flush().unwrap();

        let mut splitter = Splitter::new(&src, &dst);
        splitter.report = Some(dir.path().join("reports/split_summary.csv"));
        let summaries = splitter.run(&[]).unwrap();
        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];
        assert_eq!(s.total, 20);
        assert_eq!(s.train, 0);
        assert_eq!(s.dev + s.test, 20);
        assert_eq!(s.dev_short + s.dev_medium + s.dev_long, s.dev);

        let dev: Vec<TaggedRecord> = JsonlReader::new(&dst.join("dev/am.jsonl")).unwrap().collect();
        assert_eq!(dev.len(), s.dev);
        assert!(dev.iter().all(|r| r.record.extra["split"] == "dev"));

        let all_test: Vec<TaggedRecord> = JsonlReader::new(&dst.join("test.jsonl")).unwrap().collect();
        assert_eq!(all_test.len(), s.test);
    }

    #[test]
    fn rerun_clears_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("processed");
        let dst = dir.path().join("splits");
        let mut w = JsonlWriter::create(&src.join("am.dedup.tagged.jsonl")).unwrap();
        w.write(corpus(30)).unwrap();
        w.flush().unwrap();

        let mut splitter = Splitter::new(&src, &dst);
        splitter.ratios = Ratios::new(0.8, 0.1, 0.1).unwrap();
        splitter.strict = true;
        let strict = splitter.run(&[]).unwrap();
        assert!(strict[0].train_dropped_romanized > 0);
        assert!(dst.join("dropped/am.jsonl").exists());

        splitter.strict = false;
        let lenient = splitter.run(&[]).unwrap();
        assert_eq!(lenient[0].train_dropped_romanized, 0);
        assert!(!dst.join("dropped/am.jsonl").exists());

        let on_disk: usize = SplitLabel::ALL
            .iter()
            .map(|split| {
                JsonlReader::<TaggedRecord>::new(&dst.join(split.as_str()).join("am.jsonl"))
                    .unwrap()
                    .count()
            })
            .sum();
        assert_eq!(on_disk, 30);
    }
}
