//! # Geração de Candidatos
//!
//! Para cada linha inicial da sentença, propõe zero ou mais spans cujo texto
//! existe no dicionário.
//!
//! ## Estratégias
//!
//! - **ExactToken**: consulta apenas o token da própria linha. No máximo um
//!   candidato por linha, cobrindo só ela.
//! - **LongestMatch**: monta chaves com 1..N tokens a partir da linha inicial
//!   e consulta da **mais longa** para a mais curta.
//!
//! ## Janela de busca (LongestMatch)
//!
//! ```text
//!   início         min_len            max_len
//!     |-------------|==================|
//!     comprimentos testados: max_len, max_len-1, ..., min_len+1
//! ```
//!
//! - `max_len` parte de `max_ne_len` e é encurtado pelo filtro de POS proibida
//!   e pelo fim da sentença.
//! - Se a janela chega ao último token e ele é `"."`, o ponto final fica de fora.
//! - `min_len` vem do filtro de POS obrigatória (o span precisa incluir o token exigido).

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::TaggerConfig;
use crate::dictionary::Dictionary;
use crate::resolver::OverlapPolicy;
use crate::sentence::SentenceBuffer;

/// Um casamento do dicionário projetado sobre os tokens `[begin, end]`.
///
/// Guarda apenas índices de linha; o texto continua no [`SentenceBuffer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeCandidate {
    /// Primeira linha do span.
    pub begin: usize,
    /// Última linha do span (inclusiva).
    pub end: usize,
    /// Ids de classe do dicionário.
    pub classes: Vec<usize>,
    /// Sempre 1.0: o casamento normalizado é exato.
    pub similarity: f64,
}

impl NeCandidate {
    pub fn new(begin: usize, end: usize, classes: Vec<usize>) -> Self {
        Self {
            begin,
            end,
            classes,
            similarity: 1.0,
        }
    }

    /// Número de tokens cobertos.
    pub fn len(&self) -> usize {
        self.end - self.begin + 1
    }

    pub fn overlaps(&self, other: &NeCandidate) -> bool {
        self.begin <= other.end && other.begin <= self.end
    }
}

/// Estratégia de casamento, escolhida uma única vez a partir da configuração.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    ExactToken,
    LongestMatch,
}

impl MatchStrategy {
    pub fn from_config(config: &TaggerConfig) -> Self {
        if config.token_mode() {
            MatchStrategy::ExactToken
        } else {
            MatchStrategy::LongestMatch
        }
    }
}

/// Gerador de candidatos ligado a um dicionário e a uma configuração.
pub struct CandidateGenerator<'a, D: Dictionary + ?Sized> {
    dict: &'a D,
    config: &'a TaggerConfig,
    strategy: MatchStrategy,
}

impl<'a, D: Dictionary + ?Sized> CandidateGenerator<'a, D> {
    pub fn new(dict: &'a D, config: &'a TaggerConfig) -> Self {
        Self {
            dict,
            config,
            strategy: MatchStrategy::from_config(config),
        }
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    /// Gera todos os candidatos da sentença, em ordem de linha inicial.
    pub fn generate(&self, sentence: &SentenceBuffer) -> Vec<NeCandidate> {
        let mut candidates = Vec::new();
        for start in 0..sentence.len() {
            match self.strategy {
                MatchStrategy::ExactToken => {
                    candidates.extend(self.find_exact(sentence, start));
                }
                MatchStrategy::LongestMatch => {
                    self.find_longest(sentence, start, &mut candidates);
                }
            }
        }
        candidates
    }

    fn find_exact(&self, sentence: &SentenceBuffer, start: usize) -> Option<NeCandidate> {
        let key = sentence.raw_token(start);
        let classes = self.dict.lookup(key, self.config.normalize)?;
        trace!(start, key, "casamento exato");
        Some(NeCandidate::new(start, start, classes.to_vec()))
    }

    fn find_longest(&self, sentence: &SentenceBuffer, start: usize, out: &mut Vec<NeCandidate>) {
        let Some((min_len, max_len)) = self.window(sentence, start) else {
            return;
        };

        for len in (min_len + 1..=max_len).rev() {
            let key = build_key(sentence, start, len);
            if let Some(classes) = self.dict.lookup(&key, self.config.normalize) {
                trace!(start, len, key = key.as_str(), "casamento no dicionário");
                out.push(NeCandidate::new(start, start + len - 1, classes.to_vec()));
                if self.config.overlap == OverlapPolicy::TagLongest {
                    break;
                }
            }
        }
    }

    /// Janela admissível `(min_len, max_len)`; `None` quando não há comprimento possível.
    fn window(&self, sentence: &SentenceBuffer, start: usize) -> Option<(usize, usize)> {
        let filter = &self.config.pos_filter;
        let max_ne_len = self.config.max_ne_len;

        let min_len = if filter.require_active() {
            filter.min_length(sentence, start, max_ne_len)?
        } else {
            0
        };

        let mut max_len = if filter.disallow_active() {
            filter.max_length(sentence, start, max_ne_len)
        } else {
            max_ne_len
        };
        max_len = max_len.min(sentence.len() - start);

        // O ponto final da sentença nunca entra num casamento.
        if start + max_len == sentence.len() && sentence.raw_token(sentence.len() - 1) == "." {
            max_len -= 1;
        }

        (max_len > min_len).then_some((min_len, max_len))
    }
}

/// Concatena `len` tokens a partir de `start`, com um espaço apenas entre
/// tokens cujos offsets não são contíguos.
pub fn build_key(sentence: &SentenceBuffer, start: usize, len: usize) -> String {
    let mut key = String::from(sentence.raw_token(start));
    for row in start + 1..start + len {
        if !sentence.is_contiguous(row - 1) {
            key.push(' ');
        }
        key.push_str(sentence.raw_token(row));
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{MemoryDictionary, NormalizeType};
    use crate::pos_filter::PosFilter;

    fn dict(entries: &[(&str, &str)]) -> MemoryDictionary {
        let mut d = MemoryDictionary::new(NormalizeType::NONE);
        for (surface, class) in entries {
            d.insert(surface, class);
        }
        d
    }

    fn spans(cands: &[NeCandidate]) -> Vec<(usize, usize)> {
        cands.iter().map(|c| (c.begin, c.end)).collect()
    }

    fn new_york() -> SentenceBuffer {
        SentenceBuffer::from_tokens(&[("New", "NNP"), ("York", "NNP"), ("is", "VBZ"), ("big", "JJ")])
    }

    #[test]
    fn test_build_key_respects_offsets() {
        let s = SentenceBuffer::from_tokens(&[("IL", "NN"), ("##-2", "NN"), ("receptor", "NN")]);
        assert_eq!(build_key(&s, 0, 1), "IL");
        assert_eq!(build_key(&s, 0, 2), "IL-2");
        assert_eq!(build_key(&s, 0, 3), "IL-2 receptor");
        assert_eq!(build_key(&s, 1, 2), "-2 receptor");
    }

    #[test]
    fn test_longest_match_prefers_longest() {
        let d = dict(&[("New York", "LOC"), ("York", "LOC"), ("New", "MISC")]);
        let config = TaggerConfig::default();
        let cands = CandidateGenerator::new(&d, &config).generate(&new_york());
        assert_eq!(spans(&cands), vec![(0, 1), (1, 1)]);
        assert_eq!(cands[0].classes, vec![0]);
        assert_eq!(cands[0].similarity, 1.0);
        assert_eq!(cands[0].len(), 2);
    }

    #[test]
    fn test_tag_all_records_every_length() {
        let d = dict(&[("New York", "LOC"), ("New", "MISC"), ("York", "LOC")]);
        let config = TaggerConfig::default().with_overlap(OverlapPolicy::TagAll);
        let cands = CandidateGenerator::new(&d, &config).generate(&new_york());
        assert_eq!(spans(&cands), vec![(0, 1), (0, 0), (1, 1)]);
    }

    #[test]
    fn test_exact_mode_ignores_multi_token_entries() {
        let d = dict(&[("New York", "LOC"), ("York", "LOC")]);
        let config = TaggerConfig::default().with_normalize(NormalizeType::TOKEN);
        let generator = CandidateGenerator::new(&d, &config);
        assert_eq!(generator.strategy(), MatchStrategy::ExactToken);
        assert_eq!(spans(&generator.generate(&new_york())), vec![(1, 1)]);
    }

    #[test]
    fn test_exact_mode_skips_pos_filter_and_final_period() {
        let s = SentenceBuffer::from_tokens(&[("a", "DT"), ("York", "NNP"), ("##.", ".")]);
        let d = dict(&[("York", "LOC"), (".", "PUNCT")]);
        let config = TaggerConfig::default()
            .with_normalize(NormalizeType::TOKEN)
            .with_pos_filter(PosFilter::new().require_exact(["NN"]).disallow_exact(["NNP"]));
        let cands = CandidateGenerator::new(&d, &config).generate(&s);
        assert_eq!(spans(&cands), vec![(1, 1), (2, 2)]);
        assert_eq!(cands[1].classes, vec![1]);
    }

    #[test]
    fn test_trailing_period_excluded() {
        let s = SentenceBuffer::from_tokens(&[("He", "PRP"), ("left", "VBD"), ("St", "NNP"), ("##.", ".")]);
        let d = dict(&[("St.", "LOC"), (".", "PUNCT")]);
        let config = TaggerConfig::default();
        assert!(CandidateGenerator::new(&d, &config).generate(&s).is_empty());

        let d = dict(&[("St", "LOC")]);
        assert_eq!(spans(&CandidateGenerator::new(&d, &config).generate(&s)), vec![(2, 2)]);
    }

    #[test]
    fn test_period_inside_sentence_is_searchable() {
        let s = SentenceBuffer::from_tokens(&[("St", "NNP"), ("##.", "."), ("Louis", "NNP"), ("won", "VBD")]);
        let d = dict(&[("St. Louis", "LOC")]);
        let config = TaggerConfig::default();
        assert_eq!(spans(&CandidateGenerator::new(&d, &config).generate(&s)), vec![(0, 2)]);
    }

    #[test]
    fn test_max_ne_len_bounds_window() {
        let d = dict(&[("New York", "LOC")]);
        let config = TaggerConfig::default().with_max_ne_len(1);
        assert!(CandidateGenerator::new(&d, &config).generate(&new_york()).is_empty());
    }

    #[test]
    fn test_required_pos_unsatisfiable() {
        let d = dict(&[("New York", "LOC"), ("big", "SIZE")]);
        let config = TaggerConfig::default().with_pos_filter(PosFilter::new().require_exact(["NN"]));
        assert!(CandidateGenerator::new(&d, &config).generate(&new_york()).is_empty());
    }

    #[test]
    fn test_required_pos_sets_min_length() {
        // Todo span precisa incluir o VBZ: "New" sozinho não serve, "York is" serve.
        let d = dict(&[("New", "X"), ("York is", "X"), ("is", "X")]);
        let config = TaggerConfig::default().with_pos_filter(PosFilter::new().require_exact(["VBZ"]));
        let cands = CandidateGenerator::new(&d, &config).generate(&new_york());
        assert_eq!(spans(&cands), vec![(1, 2), (2, 2)]);
    }

    #[test]
    fn test_disallowed_pos_sets_max_length() {
        let d = dict(&[("New York is big", "X"), ("New York", "LOC")]);
        let config = TaggerConfig::default().with_pos_filter(PosFilter::new().disallow_prefix(["VB"]));
        let cands = CandidateGenerator::new(&d, &config).generate(&new_york());
        assert_eq!(spans(&cands), vec![(0, 1)]);
    }

    #[test]
    fn test_empty_sentence() {
        let d = dict(&[("x", "X")]);
        let config = TaggerConfig::default();
        assert!(CandidateGenerator::new(&d, &config).generate(&SentenceBuffer::new()).is_empty());
    }

    #[test]
    fn test_overlaps() {
        let a = NeCandidate::new(0, 2, vec![0]);
        assert!(a.overlaps(&NeCandidate::new(2, 3, vec![0])));
        assert!(!a.overlaps(&NeCandidate::new(3, 3, vec![0])));
    }
}
