/*! Wikipedia pointers

A pointer names a snippet of a Wikipedia article in a frozen dump:
`{lang, dump, page_id, rev_id?, title?, url_hint?, char_start, char_end, sha256_expected?}`.
Offsets are in Unicode code points.

- [WikiBuilder] samples pointers out of a local dump export (JSONL with `id|pageid|page_id`, `title`, `url`, `text`),
- [fetch_pointers] materializes them from an [ArticleSource]: the same dump ([DumpFile]) or the live MediaWiki API ([WikiApi]).

Pointers whose article cannot be found produce nothing.
When an expected hash is present and does not match, the record is kept with `status = "hash_mismatch"`.
!*/
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use url::Url;

use crate::error::Error;
use crate::io::JsonlReader;
use crate::processing::Cleaner;
use crate::record::Record;

use super::collect::{clean_records, group_by_code, write_outputs};
use super::fetch::{Fetch, HttpFetcher};

pub const LICENSE: &str = "CC-BY-SA";

/// Stringify ids that may come as numbers or strings.
fn id_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn de_id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let v = Value::deserialize(d)?;
    id_string(&v).ok_or_else(|| serde::de::Error::custom(format!("invalid id: {v}")))
}

fn de_opt_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref().and_then(id_string))
}

/// Pointer to a Wikipedia snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WikiPointer {
    pub lang: String,
    pub dump: String,
    #[serde(deserialize_with = "de_id")]
    pub page_id: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub rev_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url_hint: Option<String>,
    #[serde(default)]
    pub char_start: usize,
    #[serde(default)]
    pub char_end: Option<usize>,
    #[serde(default)]
    pub sha256_expected: Option<String>,
}

/// An article, as found in a dump or returned by the API.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub page_id: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub text: String,
}

impl Article {
    /// Read an article out of a dump row. Rows without an id are ignored.
    fn from_row(row: &Value) -> Option<Self> {
        let page_id = ["pageid", "page_id", "id"]
            .iter()
            .filter_map(|k| row.get(*k))
            .find(|v| !v.is_null())
            .and_then(id_string)?;
        let get_str = |k: &str| row.get(k).and_then(Value::as_str).map(String::from);
        Some(Self {
            page_id,
            title: get_str("title"),
            url: get_str("url"),
            text: get_str("text").unwrap_or_default(),
        })
    }
}

/// Hex SHA-256 of a snippet.
pub fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Characters `start..end` of `text`, clamped to its length.
pub fn char_slice(text: &str, start: usize, end: Option<usize>) -> String {
    let end = end.unwrap_or(usize::MAX);
    if end <= start {
        return String::new();
    }
    text.chars().skip(start).take(end - start).collect()
}

/// Article lookup by page id.
pub trait ArticleSource {
    fn article(&mut self, page_id: &str) -> Result<Option<Article>, Error>;
}

/// Local dump export, indexed by page id (first occurrence wins).
pub struct DumpFile {
    articles: Vec<Article>,
    by_str: HashMap<String, usize>,
    by_int: HashMap<u64, usize>,
}

impl DumpFile {
    pub fn open(path: &Path) -> Result<Self, Error> {
        Ok(Self::from_articles(read_dump(path)?))
    }

    pub fn from_articles(articles: impl IntoIterator<Item = Article>) -> Self {
        let articles: Vec<Article> = articles.into_iter().collect();
        let mut by_str = HashMap::new();
        let mut by_int = HashMap::new();
        for (idx, a) in articles.iter().enumerate() {
            by_str.entry(a.page_id.clone()).or_insert(idx);
            if let Ok(i) = a.page_id.trim().parse::<u64>() {
                by_int.entry(i).or_insert(idx);
            }
        }
        Self {
            articles,
            by_str,
            by_int,
        }
    }
}

impl ArticleSource for DumpFile {
    fn article(&mut self, page_id: &str) -> Result<Option<Article>, Error> {
        let idx = self.by_str.get(page_id).copied().or_else(|| {
            page_id
                .trim()
                .parse::<u64>()
                .ok()
                .and_then(|i| self.by_int.get(&i).copied())
        });
        Ok(idx.map(|i| self.articles[i].clone()))
    }
}

/// Articles of a dump export.
pub fn read_dump(path: &Path) -> Result<impl Iterator<Item = Article>, Error> {
    let rows: JsonlReader<Value> = JsonlReader::new(path)?;
    Ok(rows.filter_map(|row| Article::from_row(&row)))
}

/// MediaWiki `extracts` API of a given language edition.
pub struct WikiApi<F> {
    fetcher: F,
    lang: String,
}

impl<F: Fetch> WikiApi<F> {
    pub fn new(fetcher: F, lang: &str) -> Self {
        Self {
            fetcher,
            lang: lang.to_string(),
        }
    }

    pub fn query_url(&self, page_id: &str) -> Result<Url, Error> {
        let endpoint = format!("https://{}.wikipedia.org/w/api.php", self.lang);
        Url::parse_with_params(
            &endpoint,
            &[
                ("action", "query"),
                ("prop", "extracts"),
                ("explaintext", "1"),
                ("format", "json"),
                ("formatversion", "2"),
                ("pageids", page_id),
            ],
        )
        .map_err(|e| Error::Custom(format!("invalid url {endpoint}: {e}")))
    }
}

impl<F: Fetch> ArticleSource for WikiApi<F> {
    fn article(&mut self, page_id: &str) -> Result<Option<Article>, Error> {
        let url = self.query_url(page_id)?;
        let body: Value = serde_json::from_str(&self.fetcher.fetch_text(url.as_str())?)?;

        let page = match body.pointer("/query/pages/0") {
            Some(p) => p,
            None => return Ok(None),
        };
        if page.get("missing").is_some() || page.get("invalid").is_some() {
            return Ok(None);
        }
        let text = match page.get("extract").and_then(Value::as_str) {
            Some(t) => t.to_string(),
            None => return Ok(None),
        };
        Ok(Some(Article {
            page_id: page_id.to_string(),
            title: page.get("title").and_then(Value::as_str).map(String::from),
            url: Some(format!(
                "https://{}.wikipedia.org/?curid={page_id}",
                self.lang
            )),
            text,
        }))
    }
}

/// Either article source, as selected on the command line.
pub enum WikiSource {
    Dump(DumpFile),
    Api(WikiApi<HttpFetcher>),
}

impl ArticleSource for WikiSource {
    fn article(&mut self, page_id: &str) -> Result<Option<Article>, Error> {
        match self {
            WikiSource::Dump(d) => d.article(page_id),
            WikiSource::Api(a) => a.article(page_id),
        }
    }
}

/// Opens `<dumps>/<dump>.jsonl` when it exists, falls back to the API when allowed.
pub fn open_source(
    dumps: Option<&Path>,
    dump: &str,
    lang: &str,
    use_api: bool,
) -> Result<WikiSource, Error> {
    if let Some(dir) = dumps {
        for ext in ["jsonl", "jsonl.gz", "jsonl.bz2"] {
            let path: PathBuf = dir.join(format!("{dump}.{ext}"));
            if path.exists() {
                info!("[{lang}] indexing dump {path:?}");
                return Ok(WikiSource::Dump(DumpFile::open(&path)?));
            }
        }
    }
    if use_api {
        return Ok(WikiSource::Api(WikiApi::new(
            HttpFetcher::new(super::fetch::TIMEOUT)?,
            lang,
        )));
    }
    Err(Error::Custom(format!("no dump file for {dump} and API fallback disabled")))
}

/// Samples pointers from a local dump.
#[derive(Debug, Clone)]
pub struct WikiBuilder {
    pub dump: String,
    pub lang: String,
    pub samples: usize,
    pub min_chars: usize,
    pub max_chars: usize,
    pub seed: u64,
    /// Record the hash of each snippet for strict verification.
    pub with_hash: bool,
}

impl WikiBuilder {
    pub fn new(dump: &str, lang: &str) -> Self {
        Self {
            dump: dump.to_string(),
            lang: lang.to_string(),
            samples: 50,
            min_chars: 200,
            max_chars: 1200,
            seed: 13,
            with_hash: false,
        }
    }

    /// Pick pointers among `articles` having a title and a length within bounds.
    pub fn build(&self, articles: impl Iterator<Item = Article>) -> Result<Vec<WikiPointer>, Error> {
        let mut candidates: Vec<(Article, usize)> = articles
            .filter(|a| a.title.is_some() && !a.text.is_empty())
            .filter_map(|a| {
                let len = a.text.chars().count();
                (self.min_chars..=self.max_chars)
                    .contains(&len)
                    .then_some((a, len))
            })
            .collect();

        if candidates.is_empty() {
            return Err(Error::Custom(format!(
                "[{}] no candidates in {}, try adjusting min/max chars",
                self.lang, self.dump
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        candidates.shuffle(&mut rng);
        candidates.truncate(self.samples);

        Ok(candidates
            .into_iter()
            .map(|(a, len)| {
                let char_end = len.min(self.max_chars);
                let sha256_expected = self
                    .with_hash
                    .then(|| sha256_hex(&char_slice(&a.text, 0, Some(char_end))));
                WikiPointer {
                    lang: self.lang.clone(),
                    dump: self.dump.clone(),
                    page_id: a.page_id,
                    rev_id: None,
                    title: a.title,
                    url_hint: a.url,
                    char_start: 0,
                    char_end: Some(char_end),
                    sha256_expected,
                }
            })
            .collect())
    }
}

/// Counters of a fetch run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FetchStats {
    pub total: usize,
    pub fetched: usize,
    pub missing: usize,
    pub mismatches: usize,
}

/// Materialize `pointers`, opening a source per `(dump, lang)` group with `open`.
///
/// `code` overrides the project code of the records (defaults to the pointer language).
/// Sources that fail to open and lookups that fail are logged, their pointers counted as missing.
pub fn fetch_pointers<S, F>(
    pointers: &[WikiPointer],
    code: Option<&str>,
    mut open: F,
) -> (Vec<Record>, FetchStats)
where
    S: ArticleSource,
    F: FnMut(&str, &str) -> Result<S, Error>,
{
    // group by (dump, lang), in order of first appearance
    let mut order: Vec<(String, String)> = Vec::new();
    let mut groups: HashMap<(String, String), Vec<&WikiPointer>> = HashMap::new();
    for p in pointers {
        let key = (p.dump.clone(), p.lang.clone());
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(p);
    }

    let mut stats = FetchStats::default();
    let mut records = Vec::new();

    for key in order {
        let items = groups.remove(&key).unwrap_or_default();
        let (dump, lang) = key;
        stats.total += items.len();

        let mut source = match open(&dump, &lang) {
            Ok(s) => s,
            Err(e) => {
                warn!("[{lang}] could not open {dump}: {e}, skipping {} pointers", items.len());
                stats.missing += items.len();
                continue;
            }
        };

        for p in items {
            let article = match source.article(&p.page_id) {
                Ok(Some(a)) => a,
                Ok(None) => {
                    debug!("[{lang}] page {} not found in {dump}", p.page_id);
                    stats.missing += 1;
                    continue;
                }
                Err(e) => {
                    warn!("[{lang}] page {}: {e}", p.page_id);
                    stats.missing += 1;
                    continue;
                }
            };

            let snippet = char_slice(&article.text, p.char_start, p.char_end);
            let status = match &p.sha256_expected {
                Some(expected) if !expected.is_empty() && sha256_hex(&snippet) != *expected => {
                    stats.mismatches += 1;
                    "hash_mismatch"
                }
                _ => "ok",
            };

            let title = article.title.clone().unwrap_or_default();
            let mut record = Record::new(snippet, code.unwrap_or(&p.lang), "wikipedia")
                .with_domain("encyclopedic")
                .with_license(LICENSE)
                .with_url(article.url.clone())
                .with_title(article.title.clone());
            record.lang = p.lang.clone();
            record.set_extra(
                "attribution",
                format!("Text from '{title}' (Wikipedia), CC BY-SA; contributors listed in page history."),
            );
            record.set_extra("status", status);
            records.push(record);
            stats.fetched += 1;
        }
    }

    info!(
        "processed={} fetched={} missing={} hash_mismatches={}",
        stats.total, stats.fetched, stats.missing, stats.mismatches
    );
    (records, stats)
}

/// Fetch every pointer of `manifest` and write RAW and CLEAN files per project code.
///
/// An empty manifest is an error.
pub fn fetch_manifest(
    manifest: &Path,
    code: Option<&str>,
    dumps: Option<&Path>,
    use_api: bool,
    prefix: &Path,
    cleaner: &Cleaner,
) -> Result<FetchStats, Error> {
    let pointers: Vec<WikiPointer> = JsonlReader::new(manifest)?.collect();
    if pointers.is_empty() {
        return Err(Error::Custom(format!("no pointers in {manifest:?}")));
    }

    let (records, stats) =
        fetch_pointers(&pointers, code, |dump, lang| open_source(dumps, dump, lang, use_api));
    for (code, raw) in group_by_code(records) {
        let clean = clean_records(&raw, cleaner);
        write_outputs(prefix, &code, "wikipedia", &raw, &clean)?;
    }
    Ok(stats)
}
