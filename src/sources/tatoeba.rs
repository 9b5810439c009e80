/*! Tatoeba sentence dump

Streams `sentences.csv` (`id<TAB>iso3<TAB>text`, optionally gzip or bzip2 compressed) and writes
`<prefix>/processed/<code>.tatoeba.jsonl` for each requested language,
up to `samples` sentences each. Reading stops as soon as every language is full.

Requested codes may be 2- or 3-letter codes, see [CodePair::resolve].
Codes resolving to the same ISO 639-3 code are requested once, first one wins.
!*/
use std::collections::{BTreeMap, HashMap};
use std::io::BufRead;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Serialize;

use crate::error::Error;
use crate::io::reader::open_compressed;
use crate::io::writer::report;
use crate::io::{JsonlWriter, WriterTrait};
use crate::lang::CodePair;
use crate::processing::Cleaner;
use crate::processing::NormalizationForm;
use crate::record::Record;

use super::collect::{processed_path, timestamp};

pub const LICENSE: &str = "CC-BY-2.0-FR";

/// Field delimiter of the dump, guessed from its first line.
/// Tab unless the first line has fewer than 3 tab-separated fields
/// and another of `,` `;` gives at least 3.
pub fn sniff_delimiter(first_line: &str) -> u8 {
    for d in ['\t', ',', ';'] {
        if first_line.split(d).count() >= 3 {
            return d as u8;
        }
    }
    b'\t'
}

/// Summary row of `reports/tatoeba_summary.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TatoebaSummary {
    pub project_code: String,
    pub iso3: String,
    pub kept: usize,
    pub seen_in_dump: usize,
    pub samples_cap: usize,
    pub input: String,
    pub min_chars: usize,
    pub max_chars: usize,
}

/// Conversion settings.
#[derive(Debug, Clone)]
pub struct Tatoeba {
    pub input: PathBuf,
    pub prefix: PathBuf,
    pub samples: usize,
    pub min_chars: usize,
    pub max_chars: usize,
    pub log_dir: Option<PathBuf>,
    pub summary_csv: Option<PathBuf>,
}

impl Tatoeba {
    pub fn new(input: &Path, prefix: &Path) -> Self {
        Self {
            input: input.to_path_buf(),
            prefix: prefix.to_path_buf(),
            samples: 120,
            min_chars: 10,
            max_chars: 400,
            log_dir: None,
            summary_csv: None,
        }
    }

    fn first_line(&self) -> Result<String, Error> {
        let mut line = String::new();
        open_compressed(&self.input)?.read_line(&mut line)?;
        Ok(line)
    }

    /// Convert the dump for `codes`.
    pub fn run(&self, codes: &[String]) -> Result<Vec<TatoebaSummary>, Error> {
        let mut pairs: Vec<CodePair> = Vec::with_capacity(codes.len());
        for pair in codes.iter().map(|c| CodePair::resolve(c)) {
            if pairs.iter().any(|p| p.iso3 == pair.iso3) {
                info!("skipping {}: {} already requested", pair.project, pair.iso3);
                continue;
            }
            pairs.push(pair);
        }
        for p in &pairs {
            info!("code mapping {:>5} -> {}", p.project, p.iso3);
        }
        let iso3_to_project: HashMap<&str, &str> = pairs
            .iter()
            .map(|p| (p.iso3.as_str(), p.project.as_str()))
            .collect();

        let cleaner = Cleaner::new(NormalizationForm::Nfc, self.min_chars, self.max_chars);
        let mut writers: BTreeMap<&str, JsonlWriter<Record>> = BTreeMap::new();
        for p in &pairs {
            let path = processed_path(&self.prefix, &p.project, "tatoeba");
            writers.insert(p.project.as_str(), JsonlWriter::create(&path)?);
        }

        let delimiter = sniff_delimiter(self.first_line()?.trim_end_matches(['\r', '\n']));
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .quoting(delimiter != b'\t')
            .from_reader(open_compressed(&self.input)?);

        let mut seen: HashMap<String, usize> = HashMap::new();
        for row in rdr.records() {
            let row = match row {
                Ok(r) => r,
                Err(e) => {
                    debug!("unreadable row: {e}");
                    continue;
                }
            };
            if row.len() < 3 {
                continue;
            }
            let (id, iso3, text) = (&row[0], row[1].trim().to_lowercase(), &row[2]);
            *seen.entry(iso3.clone()).or_insert(0) += 1;

            let project = match iso3_to_project.get(iso3.as_str()) {
                Some(p) => *p,
                None => continue,
            };
            let writer = match writers.get_mut(project) {
                Some(w) if w.count() < self.samples => w,
                _ => continue,
            };
            let text = match cleaner.clean(text) {
                Some(t) => t,
                None => continue,
            };

            let mut record = Record::new(text, project, "tatoeba")
                .with_domain("sentences")
                .with_license(LICENSE)
                .with_url(Some(format!("https://tatoeba.org/sentences/show/{id}")));
            record.set_extra("tatoeba_lang", iso3.as_str());
            writer.write_single(&record)?;

            if writers.values().all(|w| w.count() >= self.samples) {
                break;
            }
        }

        let mut summaries = Vec::with_capacity(pairs.len());
        for p in &pairs {
            let kept = match writers.get_mut(p.project.as_str()) {
                Some(w) => {
                    w.flush()?;
                    w.count()
                }
                None => 0,
            };
            let seen_in_dump = seen.get(&p.iso3).copied().unwrap_or(0);
            info!("[{}] (iso3={}) kept={kept} seen_in_dump={seen_in_dump}", p.project, p.iso3);
            summaries.push(TatoebaSummary {
                project_code: p.project.clone(),
                iso3: p.iso3.clone(),
                kept,
                seen_in_dump,
                samples_cap: self.samples,
                input: self.input.display().to_string(),
                min_chars: self.min_chars,
                max_chars: self.max_chars,
            });
        }

        if let Some(path) = &self.summary_csv {
            report::append_rows(path, &summaries)?;
        }
        if let Some(dir) = &self.log_dir {
            self.write_log(dir, &pairs, &summaries, &seen)?;
        }
        Ok(summaries)
    }

    fn write_log(
        &self,
        dir: &Path,
        pairs: &[CodePair],
        summaries: &[TatoebaSummary],
        seen: &HashMap<String, usize>,
    ) -> Result<(), Error> {
        std::fs::create_dir_all(dir)?;
        let ts = timestamp();
        let log = serde_json::json!({
            "timestamp": ts,
            "input": self.input.display().to_string(),
            "samples_cap": self.samples,
            "min_chars": self.min_chars,
            "max_chars": self.max_chars,
            "mapping": pairs
                .iter()
                .map(|p| serde_json::json!({"project_code": p.project, "iso3": p.iso3}))
                .collect::<Vec<_>>(),
            "kept_per_project": summaries
                .iter()
                .map(|s| (s.project_code.clone(), s.kept))
                .collect::<BTreeMap<_, _>>(),
            "total_seen_iso3": seen.iter().collect::<BTreeMap<_, _>>(),
        });
        let path = dir.join(format!("ingest_{ts}.json"));
        std::fs::write(&path, serde_json::to_string_pretty(&log)?)?;
        info!("log written: {path:?}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::JsonlReader;

    const DUMP: &str = "1\teng\tThis is a sentence.\n\
2\tpor\tIsto é uma frase.\n\
3\teng\tshort\n\
4\ttok\ttoki pona li pona mute.\n\
5\teng\t\"Quoted\" sentence here.\n\
6\teng\tA third English sentence.\n\
broken line\n\
7\tamh\tሰላም ለዓለም ሁሉ ይሁን።\n";

    #[test]
    fn sniffing() {
        assert_eq!(sniff_delimiter("1\teng\ttext"), b'\t');
        assert_eq!(sniff_delimiter("1,eng,text"), b',');
        assert_eq!(sniff_delimiter("1;eng;text"), b';');
        assert_eq!(sniff_delimiter("garbage"), b'\t');
    }

    #[test]
    fn convert() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("sentences.csv");
        std::fs::write(&input, DUMP).unwrap();

        let mut t = Tatoeba::new(&input, dir.path());
        t.samples = 2;
        t.summary_csv = Some(dir.path().join("reports/tatoeba_summary.csv"));
        t.log_dir = Some(dir.path().join("tatoeba/logs"));

        let codes = vec!["en".to_string(), "pt".to_string(), "tok".to_string(), "kat".to_string()];
        let summaries = t.run(&codes).unwrap();

        let by_code: HashMap<&str, &TatoebaSummary> =
            summaries.iter().map(|s| (s.project_code.as_str(), s)).collect();
        assert_eq!(by_code["en"].kept, 2);
        assert_eq!(by_code["pt"].kept, 1);
        assert_eq!(by_code["tok"].kept, 1);
        assert_eq!(by_code["ka"].kept, 0);
        assert_eq!(by_code["ka"].iso3, "kat");

        let en: Vec<Record> = JsonlReader::new(&dir.path().join("processed/en.tatoeba.jsonl"))
            .unwrap()
            .collect();
        assert_eq!(en[0].url.as_deref(), Some("https://tatoeba.org/sentences/show/1"));
        // quotes are part of the text in TSV
        assert_eq!(en[1].text, "\"Quoted\" sentence here.");
        assert_eq!(en[1].extra["tatoeba_lang"], "eng");
        assert_eq!(en[1].license.as_deref(), Some(LICENSE));

        assert!(dir.path().join("reports/tatoeba_summary.csv").exists());
        assert_eq!(std::fs::read_dir(dir.path().join("tatoeba/logs")).unwrap().count(), 1);
    }

    #[test]
    fn same_language_twice() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("sentences.csv");
        std::fs::write(&input, DUMP).unwrap();

        let mut t = Tatoeba::new(&input, dir.path());
        t.samples = 2;
        let summaries = t.run(&["en".to_string(), "eng".to_string()]).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].project_code, "en");
        assert_eq!(summaries[0].kept, 2);

        let en: Vec<Record> = JsonlReader::new(&dir.path().join("processed/en.tatoeba.jsonl"))
            .unwrap()
            .collect();
        assert_eq!(en.len(), 2);
    }

    #[test]
    fn bzip2_dump() {
        use std::io::Write;

        use bzip2::write::BzEncoder;
        use bzip2::Compression;

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("sentences.csv.bz2");
        let mut bz = BzEncoder::new(std::fs::File::create(&input).unwrap(), Compression::default());
        bz.write_all(DUMP.as_bytes()).unwrap();
        bz.finish().unwrap();

        let t = Tatoeba::new(&input, dir.path());
        let summaries = t.run(&["am".to_string(), "tok".to_string()]).unwrap();
        assert_eq!(summaries[0].kept, 1);
        assert_eq!(summaries[1].kept, 1);
    }
}
