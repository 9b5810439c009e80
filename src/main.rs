//! # lidcorpus
//!
//! Builds a small, reproducible multilingual corpus (Wikipedia, Tatoeba, UDHR)
//! and benchmarks a language identification model on it.
//!
//! ## Getting started
//!
//! ```sh
//! lidcorpus tatoeba sentences.csv --langs am,ka,tok
//! lidcorpus udhr-xml --codes am,ka
//! lidcorpus pipeline --langs am,ka,tok
//! lidcorpus download-model
//! lidcorpus experiment --split-dir dataset/splits --split test --out low_resource_results.json
//! lidcorpus report low_resource_results.json major_languages_results.json
//! ```
//!
//! Every subcommand logs through `RUST_LOG` (e.g. `RUST_LOG=info`).
use std::collections::HashMap;
use std::path::Path;

use structopt::StructOpt;

use lidcorpus::download::Downloader;
use lidcorpus::error::Error;
use lidcorpus::experiment::{self, Comprehensive, Experiment};
use lidcorpus::identifiers::FastTextBuilder;
use lidcorpus::pipelines::{CorpusPipeline, Pipeline};
use lidcorpus::processing::{Cleaner, Dedup, Ratios, ScriptTagger, Splitter};
use lidcorpus::sources::collect::write_records;
use lidcorpus::sources::{jsonl, tatoeba, udhr, udhr_text, udhr_xml, wikipedia, HttpFetcher};

#[macro_use]
extern crate log;

mod cli;

fn main() -> Result<(), Error> {
    env_logger::init();

    let opt = cli::LidCorpus::from_args();
    debug!("cli args\n{:#?}", opt);

    match opt {
        cli::LidCorpus::WikiBuild(w) => {
            let mut builder = wikipedia::WikiBuilder::new(&w.dump, &w.lang);
            builder.samples = w.samples;
            builder.min_chars = w.min_chars;
            builder.max_chars = w.max_chars;
            builder.seed = w.seed;
            builder.with_hash = w.with_hash;
            let pointers = builder.build(wikipedia::read_dump(&w.dump_file)?)?;
            let out = w.out_dir.join(format!("{}.jsonl", w.lang));
            let n = write_records(&out, &pointers)?;
            info!("[{}] wrote {n} pointers to {out:?}", w.lang);
        }

        cli::LidCorpus::WikiFetch(w) => {
            let cleaner = Cleaner::new(w.form, w.min_chars, w.max_chars);
            let stats = wikipedia::fetch_manifest(
                &w.manifest,
                w.code.as_deref(),
                w.dumps.as_deref(),
                w.api,
                &w.prefix,
                &cleaner,
            )?;
            println!(
                "processed={} fetched={} missing={} hash_mismatches={}",
                stats.total, stats.fetched, stats.missing, stats.mismatches
            );
        }

        cli::LidCorpus::UdhrBuild(u) => {
            let pointers = udhr::build_pointers(&u.codes, &u.sources)?;
            let mut by_code: Vec<(String, Vec<udhr::UdhrPointer>)> = Vec::new();
            for p in pointers {
                match by_code.iter_mut().find(|(c, _)| *c == p.code) {
                    Some((_, group)) => group.push(p),
                    None => by_code.push((p.code.clone(), vec![p])),
                }
            }
            for (code, pointers) in by_code {
                let out = u.out_dir.join(format!("{code}.jsonl"));
                write_records(&out, &pointers)?;
                info!("[{code}] wrote {} pointers to {out:?}", pointers.len());
            }
        }

        cli::LidCorpus::UdhrFetch(u) => {
            let fetcher = HttpFetcher::new(lidcorpus::sources::fetch::TIMEOUT)?;
            let kept =
                udhr::fetch_manifest(&fetcher, &u.manifest, &u.prefix, u.min_chars, u.max_samples)?;
            for (code, n) in kept {
                println!("{code}\t{n}");
            }
        }

        cli::LidCorpus::UdhrXml(u) => {
            let mut x = udhr_xml::UdhrXml::new(&u.zip, &u.prefix);
            x.min_chars = u.min_chars;
            x.max_samples = u.max_samples;
            for (code, n) in x.run(&u.codes)? {
                println!("{code}\t{n}");
            }
        }

        cli::LidCorpus::UdhrText(u) => {
            let mut x = udhr_text::UdhrText::new(&u.dir);
            x.max_sentences = u.max_sentences;
            let counts = x.run(&u.out)?;
            println!("Extracted sentences for {} languages", counts.len());
            for (lang, n) in counts {
                println!("  {lang}: {n} sentences");
            }
        }

        cli::LidCorpus::Tatoeba(t) => {
            let mut conv = tatoeba::Tatoeba::new(&t.input, &t.prefix);
            conv.samples = t.samples;
            conv.min_chars = t.min_chars;
            conv.max_chars = t.max_chars;
            conv.summary_csv = Some(t.summary);
            conv.log_dir = Some(t.log_dir);
            conv.run(&t.langs)?;
        }

        cli::LidCorpus::Ingest(i) => {
            let mut ingest = jsonl::Ingest::new(&i.code, &i.source, &i.license, &i.prefix);
            ingest.domain = i.domain;
            ingest.cleaner = Cleaner::new(i.form, i.min_chars, i.max_chars);
            ingest.run(&i.input)?;
        }

        cli::LidCorpus::Dedup(d) => {
            let dst = d.dst.unwrap_or_else(|| d.src.clone());
            let mut dedup = Dedup::new(&d.src, &dst);
            dedup.sources = d.params.sources;
            dedup.near_dup = d.params.near_dup;
            dedup.ngram = d.params.ngram;
            dedup.threshold = d.params.threshold;
            dedup.report = Some(d.report);
            dedup.run(&d.langs)?;
        }

        cli::LidCorpus::Script(s) => {
            let mut tagger = ScriptTagger::new(&s.src);
            tagger.report = Some(s.report);
            tagger.run(&s.langs)?;
        }

        cli::LidCorpus::Split(s) => {
            let mut splitter = Splitter::new(&s.src, &s.dst);
            splitter.ratios = Ratios::new(s.params.train, s.params.dev, s.params.test)?;
            splitter.seed = s.params.seed;
            splitter.strict = s.params.strict;
            splitter.concat = !s.no_concat;
            splitter.report = Some(s.report);
            splitter.run(&s.langs)?;
        }

        cli::LidCorpus::Pipeline(p) => {
            let mut pipeline =
                CorpusPipeline::new(&p.processed, &p.splits, &p.reports).with_langs(&p.langs);
            pipeline.dedup.sources = p.dedup.sources;
            pipeline.dedup.near_dup = p.dedup.near_dup;
            pipeline.dedup.ngram = p.dedup.ngram;
            pipeline.dedup.threshold = p.dedup.threshold;
            pipeline.splitter.ratios = Ratios::new(p.split.train, p.split.dev, p.split.test)?;
            pipeline.splitter.seed = p.split.seed;
            pipeline.splitter.strict = p.split.strict;
            pipeline.run()?;
        }

        cli::LidCorpus::Experiment(e) => {
            let sentences = match (&e.sentences, &e.split_dir, &e.glossary) {
                (Some(path), None, None) => experiment::sentences::from_json(path)?,
                (None, Some(dir), None) => {
                    experiment::sentences::from_split_dir(dir, e.split, &e.langs)?
                }
                (None, None, Some(path)) => {
                    experiment::sentences::from_glossary(path, &e.glossary_lang)?
                }
                _ => {
                    return Err(Error::Custom(
                        "exactly one of --sentences, --split-dir or --glossary is required"
                            .to_string(),
                    ))
                }
            };

            let overrides = match &e.code_map {
                Some(path) => load_code_map(path)?,
                None => HashMap::new(),
            };
            let model = FastTextBuilder::default()
                .path(&e.model)
                .threshold(e.threshold)
                .build()?;
            let exp = Experiment {
                overrides,
                watched: e.watched,
            };
            exp.run(&model, &sentences, &e.title, &e.out)?;
        }

        cli::LidCorpus::Report(r) => {
            let report = Comprehensive::from_files(&r.results, &r.names, &r.categories)?;
            println!("{}", report.table());
            report.save(&r.out)?;
        }

        cli::LidCorpus::DownloadModel(d) => {
            let dl = Downloader::new(&d.url)?;
            dl.download_blocking(&d.dst, d.force, d.sha256.as_deref())?;
        }
    };
    Ok(())
}

/// Read a `{dataset code: model code}` JSON map.
fn load_code_map(path: &Path) -> Result<HashMap<String, String>, Error> {
    Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
}
