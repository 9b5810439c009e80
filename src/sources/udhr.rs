/*! UDHR pointers (OHCHR pages)

Pointers are built from the sources table (`dataset/sources/sources.csv`, columns `code,source_name,url`),
keeping rows whose source name starts with `ohchr`.
Fetching scrapes every element matching the pointer's CSS selector (`p` by default),
normalizes its text and keeps paragraphs of at least `min_chars` characters,
up to `max_samples` per code.
!*/
use std::collections::BTreeMap;
use std::path::Path;

use log::{info, warn};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::io::JsonlReader;
use crate::processing::{normalize_text, NormalizationForm};
use crate::record::Record;

use super::collect::{processed_path, write_records};
use super::fetch::Fetch;

pub const LICENSE: &str = "OHCHR terms";

/// Pointer to an OHCHR UDHR page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UdhrPointer {
    pub code: String,
    pub lang: String,
    pub source: String,
    pub domain: String,
    pub url: String,
    #[serde(default = "default_selector")]
    pub selector: String,
    pub license: String,
}

fn default_selector() -> String {
    "p".to_string()
}

#[derive(Debug, Deserialize)]
struct SourceRow {
    code: String,
    source_name: String,
    url: String,
}

/// Pointers for `codes`, from the sources table at `sources_csv`.
/// Codes without an OHCHR row get no pointer.
pub fn build_pointers(codes: &[String], sources_csv: &Path) -> Result<Vec<UdhrPointer>, Error> {
    let mut rdr = csv::Reader::from_path(sources_csv)?;
    let mut rows = Vec::new();
    for row in rdr.deserialize::<SourceRow>() {
        let row = row?;
        if codes.contains(&row.code) && row.source_name.to_lowercase().starts_with("ohchr") {
            rows.push(row);
        }
    }

    let mut pointers = Vec::new();
    for code in codes {
        let before = pointers.len();
        pointers.extend(rows.iter().filter(|r| &r.code == code).map(|r| UdhrPointer {
            code: code.clone(),
            lang: code.clone(),
            source: "udhr".to_string(),
            domain: "legal".to_string(),
            url: r.url.clone(),
            selector: default_selector(),
            license: LICENSE.to_string(),
        }));
        info!("[{code}] {} pointer(s)", pointers.len() - before);
    }
    Ok(pointers)
}

/// Paragraph texts of `html` matching `selector`, and the page title.
pub fn extract_paragraphs(html: &str, selector: &str) -> Result<(Vec<String>, Option<String>), Error> {
    let selector = Selector::parse(selector)
        .map_err(|e| Error::Custom(format!("invalid selector {selector}: {e:?}")))?;
    let title_selector =
        Selector::parse("title").map_err(|e| Error::Custom(format!("{e:?}")))?;

    let document = Html::parse_document(html);
    let title = document
        .select(&title_selector)
        .next()
        .map(|t| join_text(t.text()))
        .filter(|t| !t.is_empty());

    let paragraphs = document
        .select(&selector)
        .map(|el| join_text(el.text()))
        .collect();
    Ok((paragraphs, title))
}

/// Join text nodes with single spaces, trimming each.
fn join_text<'a>(nodes: impl Iterator<Item = &'a str>) -> String {
    nodes
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Scrape `pointers`. Pages that fail to load are logged and skipped.
pub fn fetch_pointers<F: Fetch>(
    fetcher: &F,
    pointers: &[UdhrPointer],
    min_chars: usize,
    max_samples: usize,
) -> Result<Vec<Record>, Error> {
    let mut records = Vec::new();
    for p in pointers {
        if records.len() >= max_samples {
            break;
        }
        info!("[{}] GET {}", p.code, p.url);
        let html = match fetcher.fetch_text(&p.url) {
            Ok(h) => h,
            Err(e) => {
                warn!("[{}] could not fetch {}: {e}", p.code, p.url);
                continue;
            }
        };
        let (paragraphs, title) = extract_paragraphs(&html, &p.selector)?;
        for text in paragraphs {
            let text = normalize_text(&text, NormalizationForm::Nfc);
            if text.chars().count() < min_chars {
                continue;
            }
            let mut record = Record::new(text, &p.code, "udhr")
                .with_domain("legal")
                .with_license(LICENSE)
                .with_url(Some(p.url.clone()))
                .with_title(title.clone());
            record.lang = p.lang.clone();
            records.push(record);
            if records.len() >= max_samples {
                break;
            }
        }
    }
    Ok(records)
}

/// Scrape every pointer of `manifest`, writing `<prefix>/processed/<code>.udhr.jsonl` per code.
/// `max_samples` applies to each code.
pub fn fetch_manifest<F: Fetch>(
    fetcher: &F,
    manifest: &Path,
    prefix: &Path,
    min_chars: usize,
    max_samples: usize,
) -> Result<BTreeMap<String, usize>, Error> {
    let pointers: Vec<UdhrPointer> = JsonlReader::new(manifest)?.collect();
    if pointers.is_empty() {
        return Err(Error::Custom(format!("no pointers in {manifest:?}")));
    }

    let mut by_code: BTreeMap<&str, Vec<UdhrPointer>> = BTreeMap::new();
    for p in &pointers {
        by_code.entry(p.code.as_str()).or_default().push(p.clone());
    }

    let mut kept = BTreeMap::new();
    for (code, pointers) in by_code {
        let records = fetch_pointers(fetcher, &pointers, min_chars, max_samples)?;
        let out = processed_path(prefix, code, "udhr");
        let n = write_records(&out, &records)?;
        info!("[{code}] -> {out:?} kept={n}");
        kept.insert(code.to_string(), n);
    }
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::fetch::tests::FakeFetcher;

    const PAGE: &str = r#"<html><head><title> Universal Declaration - Amharic </title></head>
<body>
<p>short</p>
<p>ሁሉም የሰው ልጆች   ሲወለዱ ነጻና በክብርና በመብትም እኩልነት ያላቸው ናቸው። የተፈጥሮ <b>ማስተዋልና</b> ሕሊና ስላላቸው</p>
<div><p>አንዱ ሌላውን በወንድማማችነት መንፈስ መመልከት ይገባዋል። ሁሉም ሰው በዚህ ድንጋጌ የተዘረዘሩት መብቶችና ነጻነቶች ሁሉ</p></div>
</body></html>"#;

    #[test]
    fn build_from_sources_csv() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("sources.csv");
        std::fs::write(
            &csv,
            "code,source_name,url,notes\nam,OHCHR UDHR,https://ohchr.example/amh,\nam,other,https://x,\ndz,ohchr,https://ohchr.example/dzo,\n",
        )
        .unwrap();

        let pointers = build_pointers(&["am".to_string(), "ka".to_string()], &csv).unwrap();
        assert_eq!(pointers.len(), 1);
        assert_eq!(pointers[0].url, "https://ohchr.example/amh");
        assert_eq!(pointers[0].selector, "p");
        assert_eq!(pointers[0].domain, "legal");
    }

    #[test]
    fn paragraphs_and_title() {
        let (paras, title) = extract_paragraphs(PAGE, "p").unwrap();
        assert_eq!(paras.len(), 3);
        assert_eq!(title.as_deref(), Some("Universal Declaration - Amharic"));
        assert!(paras[1].contains("የተፈጥሮ ማስተዋልና ሕሊና"));
        assert!(extract_paragraphs(PAGE, "p[").is_err());
    }

    #[test]
    fn fetch_skips_failures_and_caps() {
        let pointer = |url: &str| UdhrPointer {
            code: "am".into(),
            lang: "am".into(),
            source: "udhr".into(),
            domain: "legal".into(),
            url: url.into(),
            selector: "p".into(),
            license: LICENSE.into(),
        };
        let fetcher = FakeFetcher::default().with("https://ok", PAGE);
        let pointers = vec![pointer("https://down"), pointer("https://ok")];

        let records = fetch_pointers(&fetcher, &pointers, 60, 150).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.url.as_deref() == Some("https://ok")));
        // whitespace runs collapsed
        assert!(!records[0].text.contains("  "));

        let records = fetch_pointers(&fetcher, &pointers, 60, 1).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn manifest_per_code() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("sources.csv");
        std::fs::write(&csv, "code,source_name,url\nam,ohchr,https://ok\n").unwrap();
        let pointers = build_pointers(&["am".to_string()], &csv).unwrap();
        let manifest = dir.path().join("am.jsonl");
        write_records(&manifest, &pointers).unwrap();

        let fetcher = FakeFetcher::default().with("https://ok", PAGE);
        let kept = fetch_manifest(&fetcher, &manifest, dir.path(), 60, 150).unwrap();
        assert_eq!(kept["am"], 2);
        assert!(dir.path().join("processed/am.udhr.jsonl").exists());

        let empty = dir.path().join("empty.jsonl");
        std::fs::write(&empty, "").unwrap();
        assert!(fetch_manifest(&fetcher, &empty, dir.path(), 60, 150).is_err());
    }
}
