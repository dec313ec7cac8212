//! # Esquema BIO e Emissão de Rótulos
//!
//! Cada classe semântica do dicionário ganha **uma coluna própria** na tabela
//! da sentença. Dentro de cada coluna vale o esquema **BIO**:
//!
//! - `B-<classe>`: Begin — primeiro token da entidade
//! - `I-<classe>`: Inside — tokens seguintes da mesma entidade
//! - `O`: Outside — fora de qualquer entidade daquela classe
//!
//! Como as colunas são independentes, um token pode ser `B-Gene` numa coluna
//! e `O` (ou `I-Disease`) em outra.
//!
//! ## Exemplo
//!
//! ```text
//! New    B-LOC
//! York   I-LOC
//! is     O
//! big    O
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::candidate::{build_key, NeCandidate};
use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::sentence::SentenceBuffer;

pub const OUTSIDE: &str = "O";

/// Tag BIO de um token numa coluna de classe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag<'a> {
    /// **Begin**: início de uma entidade da classe.
    Begin(&'a str),
    /// **Inside**: continuação de uma entidade da classe.
    Inside(&'a str),
    /// **Outside**: fora de entidade.
    Outside,
}

impl<'a> Tag<'a> {
    /// Representação textual (ex: "B-Gene", "I-LOC", "O").
    pub fn label(&self) -> String {
        match self {
            Tag::Begin(class) => format!("B-{class}"),
            Tag::Inside(class) => format!("I-{class}"),
            Tag::Outside => OUTSIDE.to_string(),
        }
    }

    /// Nome da classe (se for B- ou I-).
    pub fn class_name(&self) -> Option<&'a str> {
        match self {
            Tag::Begin(c) | Tag::Inside(c) => Some(*c),
            Tag::Outside => None,
        }
    }

    /// Parseia um rótulo (ex: "B-LOC" → Begin("LOC")).
    pub fn from_label(s: &'a str) -> Option<Self> {
        if s == OUTSIDE {
            return Some(Tag::Outside);
        }
        let (prefix, class) = s.split_once('-')?;
        if class.is_empty() {
            return None;
        }
        match prefix {
            "B" => Some(Tag::Begin(class)),
            "I" => Some(Tag::Inside(class)),
            _ => None,
        }
    }

    /// Verifica se a transição `prev → next` é válida no esquema BIO:
    /// `I-X` só pode seguir `B-X` ou `I-X` (mesma classe).
    pub fn is_valid_transition(prev: &Tag, next: &Tag) -> bool {
        match next {
            Tag::Inside(class) => match prev {
                Tag::Begin(prev_class) | Tag::Inside(prev_class) => prev_class == class,
                Tag::Outside => false,
            },
            _ => true,
        }
    }
}

impl fmt::Display for Tag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Escreve os rótulos BIO dos candidatos selecionados na sentença.
///
/// 1. Acrescenta uma coluna `O` por classe do dicionário (apenas na primeira chamada).
/// 2. Para cada candidato selecionado e cada classe dele: se a linha `begin`
///    já tem rótulo diferente de `O` naquela coluna, o candidato é ignorado
///    para essa classe (quem escreve primeiro vence). Senão grava `B-` em
///    `begin` e `I-` até `end`.
///
/// Repetir a chamada com os mesmos candidatos não altera o resultado.
pub fn mark<D: Dictionary + ?Sized>(
    sentence: &mut SentenceBuffer,
    dict: &D,
    candidates: &[NeCandidate],
    selected: &[usize],
) -> Result<()> {
    let class_count = dict.class_count();
    let first_col = sentence.ensure_label_columns(class_count, OUTSIDE)?;

    for ne in selected.iter().filter_map(|&idx| candidates.get(idx)) {
        for &class_id in &ne.classes {
            let Some(class_name) = dict.class_name(class_id).filter(|_| class_id < class_count) else {
                warn!(class_id, class_count, "classe fora do dicionário; candidato ignorado");
                continue;
            };
            let col = first_col + class_id;

            let taken = sentence
                .row(ne.begin)
                .and_then(|r| r.get(col))
                .map_or(true, |label| label != OUTSIDE);
            if taken {
                continue;
            }

            for row in ne.begin..=ne.end {
                let tag = if row == ne.begin {
                    Tag::Begin(class_name)
                } else {
                    Tag::Inside(class_name)
                };
                if let Some(cell) = sentence.cell_mut(row, col) {
                    *cell = tag.label();
                }
            }
        }
    }
    Ok(())
}

/// Uma entidade reconstruída a partir de uma coluna de rótulos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledSpan {
    /// Nome da classe (ex: "LOC").
    pub class: String,
    /// Primeira linha (inclusiva).
    pub begin: usize,
    /// Última linha (inclusiva).
    pub end: usize,
    /// Texto reconstruído a partir dos tokens e offsets.
    pub text: String,
}

/// Reconstrói as entidades de todas as colunas de rótulos, classe por classe.
///
/// Implementa a máquina de estados do BIO:
/// - `B-X` abre uma entidade;
/// - `I-X` da **mesma** classe a estende;
/// - qualquer outra coisa a fecha.
pub fn labeled_spans<D: Dictionary + ?Sized>(sentence: &SentenceBuffer, dict: &D) -> Vec<LabeledSpan> {
    let Some(first_col) = sentence.label_col() else {
        return Vec::new();
    };

    let mut spans = Vec::new();
    for class_id in 0..dict.class_count() {
        let col = first_col + class_id;
        let mut row = 0;
        while row < sentence.len() {
            if let Tag::Begin(class) = tag_at(sentence, row, col) {
                let begin = row;
                let mut end = row;
                while end + 1 < sentence.len() && tag_at(sentence, end + 1, col) == Tag::Inside(class) {
                    end += 1;
                }
                spans.push(LabeledSpan {
                    class: class.to_string(),
                    begin,
                    end,
                    text: build_key(sentence, begin, end - begin + 1),
                });
                row = end + 1;
            } else {
                row += 1;
            }
        }
    }
    spans.sort_by_key(|s| (s.begin, s.end));
    spans
}

fn tag_at(sentence: &SentenceBuffer, row: usize, col: usize) -> Tag<'_> {
    Tag::from_label(sentence.field(row, col)).unwrap_or(Tag::Outside)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{MemoryDictionary, NormalizeType};

    fn labels(sentence: &SentenceBuffer, col: usize) -> Vec<String> {
        sentence.rows().iter().map(|r| r[col].clone()).collect()
    }

    fn dict() -> MemoryDictionary {
        let mut d = MemoryDictionary::new(NormalizeType::NONE);
        d.add_class("LOC");
        d.add_class("ORG");
        d
    }

    fn sentence() -> SentenceBuffer {
        SentenceBuffer::from_tokens(&[("New", "NNP"), ("York", "NNP"), ("Times", "NNP"), ("rocks", "VBZ")])
    }

    #[test]
    fn test_tag_labels() {
        assert_eq!(Tag::Outside.label(), "O");
        assert_eq!(Tag::Begin("Gene").label(), "B-Gene");
        assert_eq!(Tag::Inside("LOC").to_string(), "I-LOC");
    }

    #[test]
    fn test_tag_from_label() {
        assert_eq!(Tag::from_label("O"), Some(Tag::Outside));
        assert_eq!(Tag::from_label("B-LOC"), Some(Tag::Begin("LOC")));
        assert_eq!(Tag::from_label("I-Cell-line"), Some(Tag::Inside("Cell-line")));
        assert_eq!(Tag::from_label("X-LOC"), None);
        assert_eq!(Tag::from_label("B-"), None);
    }

    #[test]
    fn test_valid_transitions() {
        assert!(Tag::is_valid_transition(&Tag::Begin("PER"), &Tag::Inside("PER")));
        assert!(!Tag::is_valid_transition(&Tag::Outside, &Tag::Inside("PER")));
        assert!(!Tag::is_valid_transition(&Tag::Begin("ORG"), &Tag::Inside("PER")));
        assert!(Tag::is_valid_transition(&Tag::Inside("ORG"), &Tag::Begin("PER")));
    }

    #[test]
    fn test_mark_appends_one_column_per_class() {
        let mut s = sentence();
        let d = dict();
        mark(&mut s, &d, &[], &[]).unwrap();
        assert_eq!(s.row(0).unwrap().len(), 7);
        assert_eq!(labels(&s, 5), vec!["O"; 4]);
        assert_eq!(labels(&s, 6), vec!["O"; 4]);
    }

    #[test]
    fn test_mark_classes_are_independent() {
        let mut s = sentence();
        let d = dict();
        let cands = vec![
            NeCandidate::new(0, 1, vec![0]),
            NeCandidate::new(0, 2, vec![1]),
        ];
        mark(&mut s, &d, &cands, &[0, 1]).unwrap();
        assert_eq!(labels(&s, 5), vec!["B-LOC", "I-LOC", "O", "O"]);
        assert_eq!(labels(&s, 6), vec!["B-ORG", "I-ORG", "I-ORG", "O"]);
    }

    #[test]
    fn test_mark_first_writer_wins() {
        let mut s = sentence();
        let d = dict();
        let cands = vec![
            NeCandidate::new(0, 2, vec![0]),
            NeCandidate::new(0, 0, vec![0]),
            NeCandidate::new(1, 1, vec![0]),
        ];
        mark(&mut s, &d, &cands, &[0, 1, 2]).unwrap();
        assert_eq!(labels(&s, 5), vec!["B-LOC", "I-LOC", "I-LOC", "O"]);
    }

    #[test]
    fn test_mark_only_selected() {
        let mut s = sentence();
        let d = dict();
        let cands = vec![NeCandidate::new(0, 1, vec![0]), NeCandidate::new(3, 3, vec![0])];
        mark(&mut s, &d, &cands, &[1]).unwrap();
        assert_eq!(labels(&s, 5), vec!["O", "O", "O", "B-LOC"]);
    }

    #[test]
    fn test_mark_is_idempotent() {
        let d = dict();
        let cands = vec![
            NeCandidate::new(0, 1, vec![0, 1]),
            NeCandidate::new(1, 2, vec![1]),
            NeCandidate::new(3, 3, vec![0]),
        ];
        let selected = [0, 1, 2];

        let mut once = sentence();
        mark(&mut once, &d, &cands, &selected).unwrap();
        let mut twice = once.clone();
        mark(&mut twice, &d, &cands, &selected).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unknown_class_is_skipped() {
        let mut s = sentence();
        let d = dict();
        let cands = vec![NeCandidate::new(0, 0, vec![7, 0])];
        mark(&mut s, &d, &cands, &[0]).unwrap();
        assert_eq!(s.row(0).unwrap().len(), 7);
        assert_eq!(labels(&s, 5)[0], "B-LOC");
    }

    #[test]
    fn test_labeled_spans_roundtrip_columns() {
        let mut s = sentence();
        let d = dict();
        let cands = vec![NeCandidate::new(0, 1, vec![0]), NeCandidate::new(0, 2, vec![1])];
        mark(&mut s, &d, &cands, &[0, 1]).unwrap();

        let spans = labeled_spans(&s, &d);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].class, "LOC");
        assert_eq!(spans[0].text, "New York");
        assert_eq!((spans[1].begin, spans[1].end), (0, 2));
        assert_eq!(spans[1].text, "New York Times");
    }

    #[test]
    fn test_labeled_spans_before_marking() {
        assert!(labeled_spans(&sentence(), &dict()).is_empty());
    }
}
