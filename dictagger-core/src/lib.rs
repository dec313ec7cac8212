//! # dictagger-core — Marcação de Entidades Nomeadas por Dicionário
//!
//! Este crate acrescenta rótulos de entidades nomeadas a sentenças que já
//! foram tokenizadas e etiquetadas com POS, consultando um dicionário
//! (gazetteer) de formas de superfície conhecidas. É um estágio de
//! pós-processamento: a entrada e a saída são tabelas "um token por linha".
//!
//! ## Arquitetura
//!
//! 1.  **Buffer de Sentença** ([`sentence`]): lê uma unidade (sentença ou bloco de comentário).
//! 2.  **Candidatos** ([`candidate`]): para cada token inicial, busca exata
//!     (um token) ou o casamento mais longo (vários tokens), limitado pelos
//!     **filtros de POS** ([`pos_filter`]).
//! 3.  **Sobreposição** ([`resolver`]): escolhe quais candidatos serão marcados.
//! 4.  **Rótulos** ([`tagger`]): uma coluna BIO por classe do dicionário.
//!
//! O [`pipeline`] conecta as etapas; [`config`] reúne a configuração
//! imutável e [`dictionary`] define a fronteira com o dicionário.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use dictagger_core::{MemoryDictionary, NormalizeType, SentenceBuffer, SentenceTagger, TaggerConfig};
//!
//! let mut dict = MemoryDictionary::new(NormalizeType::NONE);
//! dict.insert("New York", "LOC");
//!
//! let config = TaggerConfig::default();
//! let tagger = SentenceTagger::new(&dict, &config).unwrap();
//!
//! let mut sentence = SentenceBuffer::from_tokens(&[
//!     ("New", "NNP"), ("York", "NNP"), ("is", "VBZ"), ("big", "JJ"),
//! ]);
//! tagger.tag(&mut sentence).unwrap();
//!
//! let labels: Vec<&str> = sentence.rows().iter().map(|r| r[5].as_str()).collect();
//! assert_eq!(labels, ["B-LOC", "I-LOC", "O", "O"]);
//! ```

pub mod candidate;
pub mod config;
pub mod demo;
pub mod dictionary;
pub mod error;
pub mod pipeline;
pub mod pos_filter;
pub mod resolver;
pub mod sentence;
pub mod tagger;

pub use candidate::{CandidateGenerator, MatchStrategy, NeCandidate};
pub use config::TaggerConfig;
pub use dictionary::{Dictionary, MemoryDictionary, NormalizeType};
pub use error::{Result, TaggerError};
pub use pipeline::{read_units, DocumentStats, SentenceTagger, TagOutcome};
pub use pos_filter::PosFilter;
pub use resolver::{resolve, OverlapPolicy};
pub use sentence::{ContentType, SentenceBuffer};
pub use tagger::{labeled_spans, mark, LabeledSpan, Tag};
