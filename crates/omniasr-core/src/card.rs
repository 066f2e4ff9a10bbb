//! Omnilingual-ASR model card catalog.
//!
//! Cards follow the `omniASR_{family}_{size}[_v2]` convention, e.g.
//! `omniASR_CTC_1B_v2` or `omniASR_LLM_Unlimited_7B_v2`. The family
//! determines whether the model consumes a language hint and how much
//! audio it accepts per request.

use std::fmt;

/// Duration ceiling for every card except the Unlimited LLM variants.
pub const SHORT_FORM_MAX_SECS: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    /// wav2vec encoder, language-agnostic.
    Wav2Vec,
    /// Parallel CTC decoding, language-agnostic.
    Ctc,
    /// Autoregressive, language-conditioned.
    Llm,
    /// Language-conditioned without the short-form audio ceiling.
    LlmUnlimited,
    /// Card string we do not recognize; treated conservatively.
    Unknown,
}

/// A parsed model card. Parsing never fails: the gateway treats the
/// `model` form field as informational and unknown cards behave like the
/// most restrictive family.
#[derive(Debug, Clone)]
pub struct ModelCard {
    raw: String,
    family: ModelFamily,
}

impl ModelCard {
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split('_');
        let family = match (parts.next(), parts.next(), parts.next()) {
            (Some("omniASR"), Some("W2V"), _) => ModelFamily::Wav2Vec,
            (Some("omniASR"), Some("CTC"), _) => ModelFamily::Ctc,
            (Some("omniASR"), Some("LLM"), Some("Unlimited")) => ModelFamily::LlmUnlimited,
            (Some("omniASR"), Some("LLM"), _) => ModelFamily::Llm,
            _ => ModelFamily::Unknown,
        };
        Self {
            raw: raw.to_string(),
            family,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn family(&self) -> ModelFamily {
        self.family
    }

    /// LLM cards condition generation on an explicit language tag; the
    /// CTC and wav2vec cards ignore it.
    pub fn is_language_conditioned(&self) -> bool {
        matches!(self.family, ModelFamily::Llm | ModelFamily::LlmUnlimited)
    }

    /// Per-request audio ceiling, `None` for unlimited variants.
    pub fn max_audio_secs(&self) -> Option<f32> {
        match self.family {
            ModelFamily::LlmUnlimited => None,
            _ => Some(SHORT_FORM_MAX_SECS),
        }
    }
}

impl Default for ModelCard {
    fn default() -> Self {
        Self::parse("omniASR_CTC_1B_v2")
    }
}

impl fmt::Display for ModelCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_conditioning_by_family() {
        let cases = [
            ("omniASR_W2V_300M", false),
            ("omniASR_W2V_1B", false),
            ("omniASR_W2V_3B", false),
            ("omniASR_W2V_7B", false),
            ("omniASR_CTC_300M", false),
            ("omniASR_CTC_1B", false),
            ("omniASR_CTC_3B", false),
            ("omniASR_CTC_7B", false),
            ("omniASR_CTC_300M_v2", false),
            ("omniASR_CTC_1B_v2", false),
            ("omniASR_CTC_3B_v2", false),
            ("omniASR_CTC_7B_v2", false),
            ("omniASR_LLM_300M", true),
            ("omniASR_LLM_1B", true),
            ("omniASR_LLM_3B", true),
            ("omniASR_LLM_7B", true),
            ("omniASR_LLM_300M_v2", true),
            ("omniASR_LLM_1B_v2", true),
            ("omniASR_LLM_3B_v2", true),
            ("omniASR_LLM_7B_v2", true),
            ("omniASR_LLM_Unlimited_300M_v2", true),
            ("omniASR_LLM_Unlimited_1B_v2", true),
            ("omniASR_LLM_Unlimited_3B_v2", true),
            ("omniASR_LLM_Unlimited_7B_v2", true),
            ("omniASR_LLM_7B_ZS", true),
        ];
        for (raw, expected) in cases {
            assert_eq!(
                ModelCard::parse(raw).is_language_conditioned(),
                expected,
                "card {raw}"
            );
        }
    }

    #[test]
    fn audio_ceiling_by_family() {
        assert_eq!(
            ModelCard::parse("omniASR_CTC_1B_v2").max_audio_secs(),
            Some(SHORT_FORM_MAX_SECS)
        );
        assert_eq!(
            ModelCard::parse("omniASR_LLM_7B_v2").max_audio_secs(),
            Some(SHORT_FORM_MAX_SECS)
        );
        assert_eq!(
            ModelCard::parse("omniASR_LLM_Unlimited_1B_v2").max_audio_secs(),
            None
        );
    }

    #[test]
    fn unknown_cards_are_conservative() {
        let card = ModelCard::parse("whisper-1");
        assert_eq!(card.family(), ModelFamily::Unknown);
        assert!(!card.is_language_conditioned());
        assert_eq!(card.max_audio_secs(), Some(SHORT_FORM_MAX_SECS));
    }
}
