//! Model labels.
//!
//! Labels are `__label__<code>` or `__label__<code>_<Script>`,
//! `<Script>` being an ISO 15924 code.
use std::collections::HashSet;

use lazy_static::lazy_static;

pub const LABEL_PREFIX: &str = "__label__";

/// Default watched label: Klingon attracts a lot of misclassified low-resource text.
pub const WATCHED_LABEL: &str = "__label__tlh_Latn";

lazy_static! {
    /// ISO 15924 codes accepted as label suffixes.
    pub static ref SCRIPT_CODES: HashSet<&'static str> = [
        "Latn", "Cyrl", "Arab", "Deva", "Thai", "Hang", "Hira", "Kana",
        "Hans", "Hant", "Hani", "Jpan", "Ethi", "Grek", "Hebr", "Beng", "Gujr", "Guru",
        "Knda", "Mlym", "Orya", "Taml", "Telu", "Tibt", "Geor", "Armn",
        "Khmr", "Laoo", "Mymr", "Sinh", "Mong", "Copt", "Syrc", "Thaa",
        "Nkoo", "Vaii", "Bamu", "Lana", "Talu", "Bass", "Aghb", "Cakm",
        "Cham", "Dupl", "Egyp", "Elba", "Gran", "Hmng", "Khar", "Khoj",
        "Kits", "Lina", "Mahj", "Mani", "Mend", "Modi", "Mroo", "Mult",
        "Narb", "Nbat", "Nshu", "Orkh", "Osge", "Osma", "Palm", "Pauc",
        "Phag", "Phnx", "Plrd", "Rjng", "Rohg", "Saur", "Sgnw", "Shaw",
        "Shrd", "Sidd", "Sind", "Sogd", "Sogo", "Soyo", "Sund", "Sylo",
        "Tagb", "Takr", "Tale", "Tavt", "Tfng", "Tglg", "Tirh", "Ugar",
        "Wara", "Yiii", "Zanb", "Zinh", "Zmth", "Zsye", "Zsym", "Zxxx",
        "Zyyy", "Zzzz", "Cans",
    ]
    .into_iter()
    .collect();
}

/// Whether `label` designates `model_code`, with or without a known script suffix.
pub fn is_correct_label(label: &str, model_code: &str) -> bool {
    let rest = match label.strip_prefix(LABEL_PREFIX) {
        Some(r) => r,
        None => return false,
    };
    match rest.strip_prefix(model_code) {
        Some("") => true,
        Some(suffix) => suffix
            .strip_prefix('_')
            .map(|script| SCRIPT_CODES.contains(script))
            .unwrap_or(false),
        None => false,
    }
}
