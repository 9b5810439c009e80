/*! Source fetchers

Each fetcher turns an external source into per-language JSONL [crate::record::Record]s,
normalized inline (see [crate::processing::normalize]):

- [wikipedia]: pointer manifests built from a local dump, materialized from the dump or the MediaWiki API,
- [udhr]: pointers to OHCHR pages, scraped paragraphs,
- [udhr_xml]: paragraphs of the UDHR in XML bulk archive,
- [tatoeba]: the Tatoeba sentence dump,
- [jsonl]: any JSONL file carrying a `text` field,
- [udhr_text]: sentence lists of major languages, for experiments.

Pointer manifests never embed text: only coordinates of fetchable content.
!*/
pub mod collect;
pub mod fetch;
pub mod jsonl;
pub mod tatoeba;
pub mod udhr;
pub mod udhr_text;
pub mod udhr_xml;
pub mod wikipedia;

pub use fetch::{Fetch, HttpFetcher};
