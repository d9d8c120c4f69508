//! Query language detection backed by `whatlang`.

use super::{LanguageDetector, MLError};
use whatlang::{Detector, Lang};

/// Languages considered when none are configured.
pub const DEFAULT_DETECTION_LANGUAGES: &[&str] = &["de", "en", "fr", "es", "it"];

/// ISO 639-1 codes for the languages a course catalog is likely to see.
const ISO_639_1: &[(&str, Lang)] = &[
    ("de", Lang::Deu),
    ("en", Lang::Eng),
    ("fr", Lang::Fra),
    ("es", Lang::Spa),
    ("it", Lang::Ita),
    ("pt", Lang::Por),
    ("nl", Lang::Nld),
    ("pl", Lang::Pol),
    ("tr", Lang::Tur),
    ("ru", Lang::Rus),
    ("uk", Lang::Ukr),
    ("ar", Lang::Ara),
];

/// Detector built on the `whatlang` trigram models.
///
/// Detection is restricted to an allowlist that always contains the primary
/// language, so short queries cannot come back as an unrelated language.
/// Unreliable detections count as failures unless
/// [`allow_unreliable`](Self::allow_unreliable) is set; the lexical stage then
/// assumes the primary language.
#[derive(Debug, Clone)]
pub struct WhatlangDetector {
    detector: Detector,
    require_reliable: bool,
}

impl Default for WhatlangDetector {
    fn default() -> Self {
        Self {
            detector: Detector::with_allowlist(
                ISO_639_1
                    .iter()
                    .filter(|(code, _)| DEFAULT_DETECTION_LANGUAGES.contains(code))
                    .map(|(_, lang)| *lang)
                    .collect(),
            ),
            require_reliable: true,
        }
    }
}

impl WhatlangDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict detection to `languages` plus `primary`.
    ///
    /// Codes are ISO 639-1 (`de`) or ISO 639-3 (`deu`).
    pub fn for_languages<S: AsRef<str>>(primary: &str, languages: &[S]) -> Result<Self, MLError> {
        let mut allowed = vec![lang_from_code(primary)?];
        for code in languages {
            let lang = lang_from_code(code.as_ref())?;
            if !allowed.contains(&lang) {
                allowed.push(lang);
            }
        }

        Ok(Self {
            detector: Detector::with_allowlist(allowed),
            require_reliable: true,
        })
    }

    /// Report detections whatlang does not mark as reliable.
    pub fn allow_unreliable(mut self) -> Self {
        self.require_reliable = false;
        self
    }
}

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Option<String> {
        let info = self.detector.detect(text)?;
        if self.require_reliable && !info.is_reliable() {
            return None;
        }
        Some(code_for(info.lang()).to_string())
    }
}

fn lang_from_code(code: &str) -> Result<Lang, MLError> {
    let code = code.trim().to_lowercase();
    ISO_639_1
        .iter()
        .find(|(iso, _)| *iso == code)
        .map(|(_, lang)| *lang)
        .or_else(|| Lang::from_code(code.as_str()))
        .ok_or_else(|| MLError::configuration(format!("unknown language code '{code}'")))
}

fn code_for(lang: Lang) -> &'static str {
    ISO_639_1
        .iter()
        .find(|(_, known)| *known == lang)
        .map_or_else(|| lang.code(), |(code, _)| *code)
}
