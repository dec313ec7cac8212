//! # Filtros de POS
//!
//! Limitam o tamanho das sequências candidatas a partir das etiquetas POS:
//!
//! - **Obrigatórias** (`require_*`): a sequência precisa conter ao menos um token
//!   com uma dessas etiquetas. Define o comprimento **mínimo**.
//! - **Proibidas** (`disallow_*`): a sequência não pode conter nenhum token com
//!   essas etiquetas. Define o comprimento **máximo**.
//!
//! As listas `*_prefix` casam por prefixo: `"NN"` aceita `"NNS"` e `"NNP"`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::sentence::SentenceBuffer;

/// Conjuntos de etiquetas POS que restringem os candidatos.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PosFilter {
    pub require_exact: HashSet<String>,
    pub require_prefix: Vec<String>,
    pub disallow_exact: HashSet<String>,
    pub disallow_prefix: Vec<String>,
}

impl PosFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_exact<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.require_exact.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn require_prefix<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.require_prefix.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn disallow_exact<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disallow_exact.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn disallow_prefix<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disallow_prefix.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn require_active(&self) -> bool {
        !self.require_exact.is_empty() || !self.require_prefix.is_empty()
    }

    pub fn disallow_active(&self) -> bool {
        !self.disallow_exact.is_empty() || !self.disallow_prefix.is_empty()
    }

    /// Deslocamento (relativo a `start`) do primeiro token com POS obrigatória.
    ///
    /// `None` quando nenhum token da janela satisfaz o filtro: o início `start`
    /// não pode gerar candidato.
    pub fn min_length(&self, sentence: &SentenceBuffer, start: usize, max_ne_len: usize) -> Option<usize> {
        let end = window_end(sentence, start, max_ne_len);
        (start..end)
            .find(|&row| matches_any(sentence.pos(row), &self.require_exact, &self.require_prefix))
            .map(|row| row - start)
    }

    /// Deslocamento do primeiro token com POS proibida; ele e tudo o que vem
    /// depois ficam fora da janela. Sem token proibido, devolve a janela inteira.
    pub fn max_length(&self, sentence: &SentenceBuffer, start: usize, max_ne_len: usize) -> usize {
        let end = window_end(sentence, start, max_ne_len);
        (start..end)
            .find(|&row| matches_any(sentence.pos(row), &self.disallow_exact, &self.disallow_prefix))
            .unwrap_or(end)
            - start
    }
}

fn window_end(sentence: &SentenceBuffer, start: usize, max_ne_len: usize) -> usize {
    start.saturating_add(max_ne_len).min(sentence.len())
}

fn matches_any(pos: &str, exact: &HashSet<String>, prefixes: &[String]) -> bool {
    exact.contains(pos) || prefixes.iter().any(|p| pos.starts_with(p.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence() -> SentenceBuffer {
        SentenceBuffer::from_tokens(&[
            ("the", "DT"),
            ("human", "JJ"),
            ("p53", "NN"),
            ("genes", "NNS"),
            ("are", "VBP"),
            ("mutated", "VBN"),
        ])
    }

    #[test]
    fn test_inactive_by_default() {
        let filter = PosFilter::new();
        assert!(!filter.require_active());
        assert!(!filter.disallow_active());
    }

    #[test]
    fn test_min_length_exact_and_prefix() {
        let s = sentence();
        let exact = PosFilter::new().require_exact(["NNS"]);
        assert!(exact.require_active());
        assert_eq!(exact.min_length(&s, 0, 10), Some(3));
        assert_eq!(exact.min_length(&s, 3, 10), Some(0));
        assert_eq!(exact.min_length(&s, 4, 10), None);

        let prefix = PosFilter::new().require_prefix(["NN"]);
        assert_eq!(prefix.min_length(&s, 0, 10), Some(2));
        assert_eq!(prefix.min_length(&s, 3, 10), Some(0));
    }

    #[test]
    fn test_min_length_limited_by_window() {
        let s = sentence();
        let filter = PosFilter::new().require_exact(["NN"]);
        assert_eq!(filter.min_length(&s, 0, 2), None);
        assert_eq!(filter.min_length(&s, 0, 3), Some(2));
    }

    #[test]
    fn test_max_length() {
        let s = sentence();
        let filter = PosFilter::new().disallow_prefix(["VB"]);
        assert!(filter.disallow_active());
        assert_eq!(filter.max_length(&s, 0, 10), 4);
        assert_eq!(filter.max_length(&s, 0, 3), 3);
        assert_eq!(filter.max_length(&s, 4, 10), 0);

        let exact = PosFilter::new().disallow_exact(["DT"]);
        assert_eq!(exact.max_length(&s, 1, 10), 5);
        assert_eq!(exact.max_length(&s, 0, 10), 0);
    }
}
