//! Command line arguments and parameters management/parsing.
use std::path::PathBuf;

use structopt::StructOpt;

use lidcorpus::processing::NormalizationForm;
use lidcorpus::record::SplitLabel;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "lidcorpus",
    about = "multilingual corpus building and language identification benchmarking."
)]
/// Holds every command that is callable by the `lidcorpus` command.
pub enum LidCorpus {
    #[structopt(about = "Sample Wikipedia pointers from a local dump export")]
    WikiBuild(WikiBuild),
    #[structopt(about = "Materialize Wikipedia pointers")]
    WikiFetch(WikiFetch),
    #[structopt(about = "Build UDHR pointers from the sources table")]
    UdhrBuild(UdhrBuild),
    #[structopt(about = "Scrape UDHR pointers")]
    UdhrFetch(UdhrFetch),
    #[structopt(about = "Extract UDHR translations from the UDHR in XML archive")]
    UdhrXml(UdhrXml),
    #[structopt(about = "Extract major-language sentences from UDHR plain-text files")]
    UdhrText(UdhrText),
    #[structopt(about = "Convert a Tatoeba sentences dump")]
    Tatoeba(Tatoeba),
    #[structopt(about = "Ingest a JSONL file into RAW and CLEAN copies")]
    Ingest(Ingest),
    #[structopt(about = "Remove exact (and near) duplicates per language")]
    Dedup(Dedup),
    #[structopt(about = "Tag records with their script")]
    Script(Script),
    #[structopt(about = "Stratified train/dev/test split")]
    Split(Split),
    #[structopt(about = "Run dedup, script tagging and split")]
    Pipeline(Pipeline),
    #[structopt(about = "Run the language identification experiment")]
    Experiment(Experiment),
    #[structopt(about = "Combine experiment results into a comprehensive report")]
    Report(Report),
    #[structopt(about = "Download the language identification model")]
    DownloadModel(DownloadModel),
}

#[derive(Debug, StructOpt)]
/// Stratified split parameters, shared by `split` and `pipeline`.
pub struct SplitParams {
    #[structopt(long = "train", help = "train ratio", default_value = "0.0")]
    pub train: f64,
    #[structopt(long = "dev", help = "dev ratio", default_value = "0.1")]
    pub dev: f64,
    #[structopt(long = "test", help = "test ratio", default_value = "0.9")]
    pub test: f64,
    #[structopt(long = "seed", help = "shuffle seed", default_value = "7")]
    pub seed: u64,
    #[structopt(long = "strict", help = "drop romanized records from train")]
    pub strict: bool,
}

#[derive(Debug, StructOpt)]
/// Dedup parameters, shared by `dedup` and `pipeline`.
pub struct DedupParams {
    #[structopt(
        long = "sources",
        help = "sources, in retention order",
        default_value = "wikipedia,tatoeba,udhr",
        use_delimiter = true
    )]
    pub sources: Vec<String>,
    #[structopt(long = "near-dup", help = "also remove near duplicates")]
    pub near_dup: bool,
    #[structopt(long = "ngram", help = "character n-gram size", default_value = "5")]
    pub ngram: usize,
    #[structopt(
        long = "threshold",
        help = "Jaccard similarity threshold",
        default_value = "0.85"
    )]
    pub threshold: f64,
}

#[derive(Debug, StructOpt)]
pub struct WikiBuild {
    #[structopt(parse(from_os_str), help = "dump export (JSONL, may be gzip or bzip2 compressed)")]
    pub dump_file: PathBuf,
    #[structopt(long = "lang", help = "wikipedia language")]
    pub lang: String,
    #[structopt(long = "dump", help = "dump name, e.g. 20231101.am")]
    pub dump: String,
    #[structopt(long = "samples", default_value = "50")]
    pub samples: usize,
    #[structopt(long = "min-chars", default_value = "200")]
    pub min_chars: usize,
    #[structopt(long = "max-chars", default_value = "1200")]
    pub max_chars: usize,
    #[structopt(long = "seed", default_value = "13")]
    pub seed: u64,
    #[structopt(long = "with-hash", help = "store the sha256 of each snippet")]
    pub with_hash: bool,
    #[structopt(
        parse(from_os_str),
        long = "out-dir",
        default_value = "dataset/wikipedia/pointers"
    )]
    pub out_dir: PathBuf,
}

#[derive(Debug, StructOpt)]
pub struct WikiFetch {
    #[structopt(parse(from_os_str), help = "pointer manifest")]
    pub manifest: PathBuf,
    #[structopt(long = "code", help = "project code (defaults to the pointer language)")]
    pub code: Option<String>,
    #[structopt(
        parse(from_os_str),
        long = "dumps",
        help = "directory holding <dump>.jsonl[.gz|.bz2] exports"
    )]
    pub dumps: Option<PathBuf>,
    #[structopt(long = "api", help = "fall back to the MediaWiki API")]
    pub api: bool,
    #[structopt(parse(from_os_str), long = "prefix", default_value = "dataset")]
    pub prefix: PathBuf,
    #[structopt(long = "form", default_value = "NFC")]
    pub form: NormalizationForm,
    #[structopt(long = "min-chars", default_value = "1")]
    pub min_chars: usize,
    #[structopt(long = "max-chars", default_value = "100000")]
    pub max_chars: usize,
}

#[derive(Debug, StructOpt)]
pub struct UdhrBuild {
    #[structopt(long = "codes", use_delimiter = true, required = true)]
    pub codes: Vec<String>,
    #[structopt(
        parse(from_os_str),
        long = "sources",
        default_value = "dataset/sources/sources.csv"
    )]
    pub sources: PathBuf,
    #[structopt(
        parse(from_os_str),
        long = "out-dir",
        default_value = "dataset/udhr/pointers"
    )]
    pub out_dir: PathBuf,
}

#[derive(Debug, StructOpt)]
pub struct UdhrFetch {
    #[structopt(parse(from_os_str), help = "pointer manifest")]
    pub manifest: PathBuf,
    #[structopt(parse(from_os_str), long = "prefix", default_value = "dataset")]
    pub prefix: PathBuf,
    #[structopt(long = "min-chars", default_value = "60")]
    pub min_chars: usize,
    #[structopt(long = "max-samples", default_value = "150")]
    pub max_samples: usize,
}

#[derive(Debug, StructOpt)]
pub struct UdhrXml {
    #[structopt(long = "codes", use_delimiter = true, required = true)]
    pub codes: Vec<String>,
    #[structopt(
        parse(from_os_str),
        long = "zip",
        default_value = "dataset/udhr/cache/udhr_xml.zip"
    )]
    pub zip: PathBuf,
    #[structopt(parse(from_os_str), long = "prefix", default_value = "dataset")]
    pub prefix: PathBuf,
    #[structopt(long = "min-chars", default_value = "80")]
    pub min_chars: usize,
    #[structopt(long = "max-samples", default_value = "120")]
    pub max_samples: usize,
}

#[derive(Debug, StructOpt)]
pub struct UdhrText {
    #[structopt(parse(from_os_str), long = "dir", default_value = "udhr")]
    pub dir: PathBuf,
    #[structopt(
        parse(from_os_str),
        long = "out",
        default_value = "udhr_major_languages_sentences_extended.json"
    )]
    pub out: PathBuf,
    #[structopt(long = "max-sentences", default_value = "50")]
    pub max_sentences: usize,
}

#[derive(Debug, StructOpt)]
pub struct Tatoeba {
    #[structopt(parse(from_os_str), help = "sentences.csv[.gz|.bz2]")]
    pub input: PathBuf,
    #[structopt(long = "langs", use_delimiter = true, required = true)]
    pub langs: Vec<String>,
    #[structopt(long = "samples", default_value = "120")]
    pub samples: usize,
    #[structopt(long = "min-chars", default_value = "10")]
    pub min_chars: usize,
    #[structopt(long = "max-chars", default_value = "400")]
    pub max_chars: usize,
    #[structopt(parse(from_os_str), long = "prefix", default_value = "dataset")]
    pub prefix: PathBuf,
    #[structopt(
        parse(from_os_str),
        long = "summary",
        default_value = "reports/tatoeba_summary.csv"
    )]
    pub summary: PathBuf,
    #[structopt(
        parse(from_os_str),
        long = "log-dir",
        default_value = "dataset/tatoeba/logs"
    )]
    pub log_dir: PathBuf,
}

#[derive(Debug, StructOpt)]
pub struct Ingest {
    #[structopt(parse(from_os_str), help = "JSONL file with a text field")]
    pub input: PathBuf,
    #[structopt(long = "code")]
    pub code: String,
    #[structopt(long = "source")]
    pub source: String,
    #[structopt(long = "license")]
    pub license: String,
    #[structopt(long = "domain", default_value = "sentences")]
    pub domain: String,
    #[structopt(parse(from_os_str), long = "prefix", default_value = "dataset")]
    pub prefix: PathBuf,
    #[structopt(long = "form", default_value = "NFC")]
    pub form: NormalizationForm,
    #[structopt(long = "min-chars", default_value = "1")]
    pub min_chars: usize,
    #[structopt(long = "max-chars", default_value = "100000")]
    pub max_chars: usize,
}

#[derive(Debug, StructOpt)]
/// Dedup command and parameters.
pub struct Dedup {
    #[structopt(parse(from_os_str), long = "src", default_value = "dataset/processed")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), long = "dst", help = "defaults to src")]
    pub dst: Option<PathBuf>,
    #[structopt(long = "langs", use_delimiter = true, help = "default: discover")]
    pub langs: Vec<String>,
    #[structopt(flatten)]
    pub params: DedupParams,
    #[structopt(
        parse(from_os_str),
        long = "report",
        default_value = "reports/dedup_summary.csv"
    )]
    pub report: PathBuf,
}

#[derive(Debug, StructOpt)]
pub struct Script {
    #[structopt(parse(from_os_str), long = "src", default_value = "dataset/processed")]
    pub src: PathBuf,
    #[structopt(long = "langs", use_delimiter = true, help = "default: discover")]
    pub langs: Vec<String>,
    #[structopt(
        parse(from_os_str),
        long = "report",
        default_value = "reports/script_summary.csv"
    )]
    pub report: PathBuf,
}

#[derive(Debug, StructOpt)]
/// Split command and parameters.
pub struct Split {
    #[structopt(parse(from_os_str), long = "src", default_value = "dataset/processed")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), long = "dst", default_value = "dataset/splits")]
    pub dst: PathBuf,
    #[structopt(long = "langs", use_delimiter = true, help = "default: discover")]
    pub langs: Vec<String>,
    #[structopt(flatten)]
    pub params: SplitParams,
    #[structopt(long = "no-concat", help = "do not write dst/{train,dev,test}.jsonl")]
    pub no_concat: bool,
    #[structopt(
        parse(from_os_str),
        long = "report",
        default_value = "reports/split_summary.csv"
    )]
    pub report: PathBuf,
}

#[derive(Debug, StructOpt)]
/// Pipeline command and parameters.
pub struct Pipeline {
    #[structopt(
        parse(from_os_str),
        long = "processed",
        default_value = "dataset/processed"
    )]
    pub processed: PathBuf,
    #[structopt(parse(from_os_str), long = "splits", default_value = "dataset/splits")]
    pub splits: PathBuf,
    #[structopt(parse(from_os_str), long = "reports", default_value = "reports")]
    pub reports: PathBuf,
    #[structopt(long = "langs", use_delimiter = true, help = "default: discover")]
    pub langs: Vec<String>,
    #[structopt(flatten)]
    pub dedup: DedupParams,
    #[structopt(flatten)]
    pub split: SplitParams,
}

#[derive(Debug, StructOpt)]
/// Experiment command and parameters.
///
/// Sentences come from exactly one of `--sentences`, `--split-dir` or `--glossary`.
pub struct Experiment {
    #[structopt(parse(from_os_str), long = "model", default_value = "model.bin")]
    pub model: PathBuf,
    #[structopt(
        long = "threshold",
        help = "discard predictions below this probability",
        default_value = "0.0"
    )]
    pub threshold: f32,
    #[structopt(parse(from_os_str), long = "sentences", help = "{lang: [sentences]} JSON map")]
    pub sentences: Option<PathBuf>,
    #[structopt(parse(from_os_str), long = "split-dir", help = "split directory")]
    pub split_dir: Option<PathBuf>,
    #[structopt(long = "split", default_value = "test")]
    pub split: SplitLabel,
    #[structopt(parse(from_os_str), long = "glossary", help = "glossary control file")]
    pub glossary: Option<PathBuf>,
    #[structopt(long = "glossary-lang", default_value = "klingon")]
    pub glossary_lang: String,
    #[structopt(long = "langs", use_delimiter = true, help = "split-dir languages")]
    pub langs: Vec<String>,
    #[structopt(
        parse(from_os_str),
        long = "code-map",
        help = "extra {dataset code: model code} JSON map"
    )]
    pub code_map: Option<PathBuf>,
    #[structopt(long = "watched", default_value = "__label__tlh_Latn")]
    pub watched: String,
    #[structopt(long = "title", default_value = "Accuracy Table")]
    pub title: String,
    #[structopt(
        parse(from_os_str),
        long = "out",
        default_value = "experiment_results.json"
    )]
    pub out: PathBuf,
}

#[derive(Debug, StructOpt)]
pub struct Report {
    #[structopt(parse(from_os_str), required = true, help = "experiment results files")]
    pub results: Vec<PathBuf>,
    #[structopt(
        parse(from_os_str),
        long = "names",
        default_value = "language_names.json"
    )]
    pub names: PathBuf,
    #[structopt(
        parse(from_os_str),
        long = "categories",
        default_value = "language_categories.json"
    )]
    pub categories: PathBuf,
    #[structopt(
        parse(from_os_str),
        long = "out",
        default_value = "comprehensive_results.json"
    )]
    pub out: PathBuf,
}

#[derive(Debug, StructOpt)]
/// Download command and parameters.
pub struct DownloadModel {
    #[structopt(
        long = "url",
        default_value = "https://huggingface.co/cis-lmu/glotlid/resolve/main/model.bin"
    )]
    pub url: String,
    #[structopt(parse(from_os_str), long = "dst", default_value = "model.bin")]
    pub dst: PathBuf,
    #[structopt(long = "force", help = "download even if dst exists")]
    pub force: bool,
    #[structopt(long = "sha256", help = "expected checksum")]
    pub sha256: Option<String>,
}
