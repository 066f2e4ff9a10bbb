//! Whisper-to-Omnilingual language normalization.
//!
//! Maps the identifiers OpenAI clients send (ISO 639-1 codes, English
//! names, regional aliases) to the `{iso639-3}_{Script}` tags the
//! Omnilingual-ASR models expect. Pure lookup, never fails: unknown input
//! falls back to [`FALLBACK_TAG`] with a diagnostic warning.

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::warn;

/// Tag used when the input cannot be resolved. A policy choice, not an
/// error: the LLM model cards tolerate a wrong hint better than none.
pub const FALLBACK_TAG: &str = "eng_Latn";

/// Whisper language codes, English names and aliases mapped to
/// Omnilingual-ASR v0.2.0 tags. Languages Whisper knows but the model
/// catalog lacks (Nynorsk, Sanskrit) are intentionally absent.
const ALIASES: &[(&str, &str)] = &[
    ("en", "eng_Latn"),
    ("english", "eng_Latn"),
    // Mandarin is the default for bare "zh"; other variants exist in the
    // catalog under their own tags.
    ("zh", "cmn_Hans"),
    ("chinese", "cmn_Hans"),
    ("mandarin", "cmn_Hans"),
    ("es", "spa_Latn"),
    ("spanish", "spa_Latn"),
    ("castilian", "spa_Latn"),
    ("fr", "fra_Latn"),
    ("french", "fra_Latn"),
    ("de", "deu_Latn"),
    ("german", "deu_Latn"),
    ("it", "ita_Latn"),
    ("italian", "ita_Latn"),
    ("pt", "por_Latn"),
    ("portuguese", "por_Latn"),
    ("ru", "rus_Cyrl"),
    ("russian", "rus_Cyrl"),
    ("ja", "jpn_Jpan"),
    ("japanese", "jpn_Jpan"),
    ("ko", "kor_Hang"),
    ("korean", "kor_Hang"),
    ("ar", "arb_Arab"),
    ("arabic", "arb_Arab"),
    ("hi", "hin_Deva"),
    ("hindi", "hin_Deva"),
    ("nl", "nld_Latn"),
    ("dutch", "nld_Latn"),
    ("flemish", "nld_Latn"),
    ("pl", "pol_Latn"),
    ("polish", "pol_Latn"),
    ("tr", "tur_Latn"),
    ("turkish", "tur_Latn"),
    ("vi", "vie_Latn"),
    ("vietnamese", "vie_Latn"),
    ("th", "tha_Thai"),
    ("thai", "tha_Thai"),
    ("id", "ind_Latn"),
    ("indonesian", "ind_Latn"),
    ("ms", "zsm_Latn"),
    ("malay", "zsm_Latn"),
    ("uk", "ukr_Cyrl"),
    ("ukrainian", "ukr_Cyrl"),
    ("cs", "ces_Latn"),
    ("czech", "ces_Latn"),
    ("sv", "swe_Latn"),
    ("swedish", "swe_Latn"),
    ("da", "dan_Latn"),
    ("danish", "dan_Latn"),
    ("fi", "fin_Latn"),
    ("finnish", "fin_Latn"),
    ("no", "nob_Latn"),
    ("norwegian", "nob_Latn"),
    ("el", "ell_Grek"),
    ("greek", "ell_Grek"),
    ("he", "heb_Hebr"),
    ("hebrew", "heb_Hebr"),
    ("hu", "hun_Latn"),
    ("hungarian", "hun_Latn"),
    ("ro", "ron_Latn"),
    ("romanian", "ron_Latn"),
    ("moldavian", "ron_Latn"),
    ("moldovan", "ron_Latn"),
    ("bg", "bul_Cyrl"),
    ("bulgarian", "bul_Cyrl"),
    ("sk", "slk_Latn"),
    ("slovak", "slk_Latn"),
    ("hr", "hrv_Latn"),
    ("croatian", "hrv_Latn"),
    ("sl", "slv_Latn"),
    ("slovenian", "slv_Latn"),
    ("sr", "srp_Cyrl"),
    ("serbian", "srp_Cyrl"),
    ("et", "ekk_Latn"),
    ("estonian", "ekk_Latn"),
    ("lv", "lav_Latn"),
    ("latvian", "lav_Latn"),
    ("lt", "lit_Latn"),
    ("lithuanian", "lit_Latn"),
    ("ca", "cat_Latn"),
    ("catalan", "cat_Latn"),
    ("valencian", "cat_Latn"),
    ("ta", "tam_Taml"),
    ("tamil", "tam_Taml"),
    ("ur", "urd_Arab"),
    ("urdu", "urd_Arab"),
    ("ml", "mal_Mlym"),
    ("malayalam", "mal_Mlym"),
    ("cy", "cym_Latn"),
    ("welsh", "cym_Latn"),
    ("te", "tel_Telu"),
    ("telugu", "tel_Telu"),
    ("fa", "fas_Arab"),
    ("persian", "fas_Arab"),
    ("bn", "ben_Beng"),
    ("bengali", "ben_Beng"),
    ("az", "aze_Latn"),
    ("azerbaijani", "aze_Latn"),
    ("kn", "kan_Knda"),
    ("kannada", "kan_Knda"),
    ("mk", "mkd_Cyrl"),
    ("macedonian", "mkd_Cyrl"),
    ("eu", "eus_Latn"),
    ("basque", "eus_Latn"),
    ("is", "isl_Latn"),
    ("icelandic", "isl_Latn"),
    ("hy", "hye_Armn"),
    ("armenian", "hye_Armn"),
    ("ne", "nep_Deva"),
    ("nepali", "nep_Deva"),
    ("mn", "khk_Cyrl"),
    ("mongolian", "khk_Cyrl"),
    ("bs", "bos_Latn"),
    ("bosnian", "bos_Latn"),
    ("kk", "kaz_Cyrl"),
    ("kazakh", "kaz_Cyrl"),
    ("sq", "als_Latn"),
    ("albanian", "als_Latn"),
    ("sw", "swh_Latn"),
    ("swahili", "swh_Latn"),
    ("gl", "glg_Latn"),
    ("galician", "glg_Latn"),
    ("mr", "mar_Deva"),
    ("marathi", "mar_Deva"),
    ("pa", "pan_Guru"),
    ("punjabi", "pan_Guru"),
    ("panjabi", "pan_Guru"),
    ("si", "sin_Sinh"),
    ("sinhala", "sin_Sinh"),
    ("sinhalese", "sin_Sinh"),
    ("km", "khm_Khmr"),
    ("khmer", "khm_Khmr"),
    ("yo", "yor_Latn"),
    ("yoruba", "yor_Latn"),
    ("so", "som_Latn"),
    ("somali", "som_Latn"),
    ("af", "afr_Latn"),
    ("afrikaans", "afr_Latn"),
    ("ka", "kat_Geor"),
    ("georgian", "kat_Geor"),
    ("be", "bel_Cyrl"),
    ("belarusian", "bel_Cyrl"),
    ("tg", "tgk_Cyrl"),
    ("tajik", "tgk_Cyrl"),
    ("sd", "snd_Arab"),
    ("sindhi", "snd_Arab"),
    ("gu", "guj_Gujr"),
    ("gujarati", "guj_Gujr"),
    ("am", "amh_Ethi"),
    ("amharic", "amh_Ethi"),
    ("lo", "lao_Laoo"),
    ("lao", "lao_Laoo"),
    ("uz", "uzn_Latn"),
    ("uzbek", "uzn_Latn"),
    ("ps", "pbt_Arab"),
    ("pashto", "pbt_Arab"),
    ("pushto", "pbt_Arab"),
    ("mt", "mlt_Latn"),
    ("maltese", "mlt_Latn"),
    ("my", "mya_Mymr"),
    ("myanmar", "mya_Mymr"),
    ("burmese", "mya_Mymr"),
    ("tl", "tgl_Latn"),
    ("tagalog", "tgl_Latn"),
    ("mg", "plt_Latn"),
    ("malagasy", "plt_Latn"),
    ("as", "asm_Beng"),
    ("assamese", "asm_Beng"),
    ("ln", "lin_Latn"),
    ("lingala", "lin_Latn"),
    ("ha", "hau_Latn"),
    ("hausa", "hau_Latn"),
    ("jw", "jav_Latn"),
    ("javanese", "jav_Latn"),
    ("su", "sun_Latn"),
    ("sundanese", "sun_Latn"),
    ("yue", "yue_Hant"),
    ("cantonese", "yue_Hant"),
    ("la", "lat_Latn"),
    ("latin", "lat_Latn"),
    ("mi", "mri_Latn"),
    ("maori", "mri_Latn"),
    ("br", "bre_Latn"),
    ("breton", "bre_Latn"),
    ("sn", "sna_Latn"),
    ("shona", "sna_Latn"),
    ("oc", "oci_Latn"),
    ("occitan", "oci_Latn"),
    ("yi", "ydd_Hebr"),
    ("yiddish", "ydd_Hebr"),
    ("fo", "fao_Latn"),
    ("faroese", "fao_Latn"),
    ("ht", "hat_Latn"),
    ("haitian creole", "hat_Latn"),
    ("tk", "tuk_Latn"),
    ("turkmen", "tuk_Latn"),
    ("lb", "ltg_Latn"),
    ("luxembourgish", "ltg_Latn"),
    ("bo", "bod_Tibt"),
    ("tibetan", "bod_Tibt"),
    ("tt", "tat_Cyrl"),
    ("tatar", "tat_Cyrl"),
    ("haw", "haw_Latn"),
    ("hawaiian", "haw_Latn"),
    ("ba", "bak_Cyrl"),
    ("bashkir", "bak_Cyrl"),
];

fn alias_table() -> &'static HashMap<&'static str, &'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| ALIASES.iter().copied().collect())
}

/// True when `tag` already has the canonical `xxx_Xxxx` two-part shape:
/// exactly one separator, both parts non-empty.
pub fn is_canonical(tag: &str) -> bool {
    let mut parts = tag.split('_');
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(code), Some(script), None) if !code.is_empty() && !script.is_empty()
    )
}

/// Normalize a client-supplied language identifier to an Omnilingual-ASR
/// tag. Total function: unknown input falls back to [`FALLBACK_TAG`].
pub fn normalize(language: &str) -> String {
    let lowered = language.to_lowercase();
    if let Some(tag) = alias_table().get(lowered.as_str()) {
        return (*tag).to_string();
    }

    if is_canonical(language) {
        return language.to_string();
    }

    warn!(language, "Unknown language, defaulting to {FALLBACK_TAG}");
    FALLBACK_TAG.to_string()
}
