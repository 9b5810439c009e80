/*! UDHR in XML bulk archive

Reads `udhr_<iso3>.xml` members of the cached bulk zip (`dataset/udhr/cache/udhr_xml.zip`).
Paragraphs are the elements whose name ends in `para` or `p`, with all their descendant text,
whitespace collapsed.
!*/
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::json;

use crate::error::Error;
use crate::lang::UDHR_ISO3;
use crate::processing::{normalize_text, NormalizationForm};
use crate::record::Record;

use super::collect::{processed_path, timestamp, write_records};

pub const LICENSE: &str = "UDHR text (public document); packaging: UDHR in XML";
pub const LICENSE_URL: &str = "https://efele.net/udhr/";

/// Name of the archive member for `iso3`: the exact `udhr_<iso3>.xml`,
/// or the first (sorted) `udhr_<iso3>*.xml`.
pub fn pick_member<'a>(names: impl Iterator<Item = &'a str>, iso3: &str) -> Option<String> {
    let exact = format!("udhr_{iso3}.xml");
    let prefix = format!("udhr_{iso3}");
    let mut candidates: Vec<&str> = Vec::new();
    for name in names {
        if name == exact {
            return Some(exact);
        }
        let lower = name.to_lowercase();
        if lower.starts_with(&prefix) && lower.ends_with(".xml") {
            candidates.push(name);
        }
    }
    candidates.sort_unstable();
    candidates.first().map(|s| s.to_string())
}

/// Paragraph texts of a UDHR XML document, in document order.
pub fn xml_paragraphs(xml: &str) -> Result<Vec<String>, Error> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs: Vec<String> = Vec::new();
    // indices in `paragraphs` of the currently open paragraph elements
    let mut open: Vec<usize> = Vec::new();
    // for each open element, whether it is a paragraph
    let mut stack: Vec<bool> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_lowercase();
                let is_para = name.ends_with("para") || name.ends_with('p');
                if is_para {
                    open.push(paragraphs.len());
                    paragraphs.push(String::new());
                }
                stack.push(is_para);
            }
            Event::End(_) => {
                if stack.pop() == Some(true) {
                    open.pop();
                }
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                for &idx in &open {
                    paragraphs[idx].push_str(&text);
                }
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c.into_inner()).to_string();
                for &idx in &open {
                    paragraphs[idx].push_str(&text);
                }
            }
            Event::Eof => break,
            _ => (),
        }
    }

    Ok(paragraphs
        .into_iter()
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty())
        .collect())
}

/// Extraction from the bulk archive.
#[derive(Debug, Clone)]
pub struct UdhrXml {
    pub zip: PathBuf,
    pub prefix: PathBuf,
    pub min_chars: usize,
    pub max_samples: usize,
}

impl UdhrXml {
    pub fn new(zip: &Path, prefix: &Path) -> Self {
        Self {
            zip: zip.to_path_buf(),
            prefix: prefix.to_path_buf(),
            min_chars: 80,
            max_samples: 120,
        }
    }

    /// Records of `code` out of the XML document `member`.
    pub fn records(&self, code: &str, member: &str, xml: &str) -> Result<Vec<Record>, Error> {
        let mut records = Vec::new();
        for para in xml_paragraphs(xml)? {
            let text = normalize_text(&para, NormalizationForm::Nfc);
            if text.chars().count() < self.min_chars {
                continue;
            }
            let mut r = Record::new(text, code, "udhr-xml")
                .with_domain("legal")
                .with_license(LICENSE);
            r.set_extra("license_url", LICENSE_URL);
            r.set_extra("provider", "efele.net");
            r.set_extra("trace", json!({ "xml": member }));
            records.push(r);
            if records.len() >= self.max_samples {
                break;
            }
        }
        Ok(records)
    }

    /// Extract `codes`, writing `<prefix>/processed/<code>.udhr.jsonl`.
    ///
    /// A missing archive is an error. Codes without a UDHR translation are skipped.
    pub fn run(&self, codes: &[String]) -> Result<BTreeMap<String, usize>, Error> {
        let size = std::fs::metadata(&self.zip).map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            return Err(Error::Custom(format!(
                "UDHR zip cache not found at {:?}, download it first",
                self.zip
            )));
        }

        let mut archive = zip::ZipArchive::new(File::open(&self.zip)?)?;
        let names: Vec<String> = archive.file_names().map(String::from).collect();

        let mut kept = BTreeMap::new();
        for code in codes {
            let iso3 = match UDHR_ISO3.get(code.as_str()) {
                Some(i) => *i,
                None => {
                    warn!("[{code}] no ISO 639-3 mapping, skipping");
                    kept.insert(code.clone(), 0);
                    continue;
                }
            };
            let member = match pick_member(names.iter().map(String::as_str), iso3) {
                Some(m) => m,
                None => {
                    warn!("[{code}] {iso3} not in {:?}", self.zip);
                    kept.insert(code.clone(), 0);
                    continue;
                }
            };

            let mut bytes = Vec::new();
            archive.by_name(&member)?.read_to_end(&mut bytes)?;
            let xml = String::from_utf8_lossy(&bytes);

            let records = self.records(code, &member, &xml)?;
            let out = processed_path(&self.prefix, code, "udhr");
            let n = write_records(&out, &records)?;
            info!("[{code}] ({iso3}) -> {out:?} kept={n}");
            kept.insert(code.clone(), n);
        }

        self.log_ingest(&kept)?;
        Ok(kept)
    }

    /// Append a line to `<prefix>/udhr/cache/ingest_log.txt`.
    fn log_ingest(&self, kept: &BTreeMap<String, usize>) -> Result<(), Error> {
        let path = self.prefix.join("udhr").join("cache").join("ingest_log.txt");
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut f = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(f, "{} kept {}", timestamp(), serde_json::to_string(kept)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use zip::write::FileOptions;

    use super::*;
    use crate::io::JsonlReader;

    const XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<udhr xmlns="http://www.unicode.org/udhr" key="amh" n="Amharic">
  <title>Universal Declaration of Human Rights</title>
  <preamble>
    <title>Preamble</title>
    <para>ሁሉም የሰው ልጆች ሲወለዱ ነጻና በክብርና በመብትም እኩልነት ያላቸው ናቸው። የተፈጥሮ ማስተዋልና ሕሊና ስላላቸው አንዱ ሌላውን በወንድማማችነት መንፈስ</para>
    <para>short</para>
  </preamble>
  <article number="1">
    <para>Everyone is entitled to all the rights &amp; freedoms set forth in this
      Declaration, without distinction of any kind, such as race.</para>
  </article>
</udhr>"#;

    #[test]
    fn member_selection() {
        let names = ["udhr_amh_2.xml", "udhr_amh.xml", "udhr_kat.xml"];
        assert_eq!(pick_member(names.iter().copied(), "amh").as_deref(), Some("udhr_amh.xml"));
        let names = ["udhr_dzo_b.xml", "udhr_dzo_a.xml"];
        assert_eq!(pick_member(names.iter().copied(), "dzo").as_deref(), Some("udhr_dzo_a.xml"));
        assert_eq!(pick_member(names.iter().copied(), "lao"), None);
    }

    #[test]
    fn paragraphs() {
        let paras = xml_paragraphs(XML).unwrap();
        assert_eq!(paras.len(), 3);
        assert_eq!(paras[1], "short");
        assert!(paras[2].contains("rights & freedoms set forth in this Declaration,"));
    }

    #[test]
    fn records_use_min_chars() {
        let x = UdhrXml::new(Path::new("unused.zip"), Path::new("dataset"));
        let records = x.records("am", "udhr_amh.xml", XML).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source.as_deref(), Some("udhr-xml"));
        assert_eq!(records[0].extra["trace"]["xml"], "udhr_amh.xml");
    }

    #[test]
    fn missing_zip_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let x = UdhrXml::new(&dir.path().join("udhr_xml.zip"), dir.path());
        assert!(x.run(&["am".to_string()]).is_err());
    }

    #[test]
    fn run_from_zip() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("udhr_xml.zip");
        let mut zw = zip::ZipWriter::new(File::create(&zip_path).unwrap());
        zw.start_file("udhr_amh.xml", FileOptions::default()).unwrap();
        zw.write_all(XML.as_bytes()).unwrap();
        zw.finish().unwrap();

        let x = UdhrXml::new(&zip_path, dir.path());
        let kept = x
            .run(&["am".to_string(), "ka".to_string(), "xx".to_string()])
            .unwrap();
        assert_eq!(kept["am"], 2);
        assert_eq!(kept["ka"], 0);
        assert_eq!(kept["xx"], 0);

        let records: Vec<Record> = JsonlReader::new(&dir.path().join("processed/am.udhr.jsonl"))
            .unwrap()
            .collect();
        assert_eq!(records.len(), 2);
        assert!(dir.path().join("udhr/cache/ingest_log.txt").exists());
    }
}
