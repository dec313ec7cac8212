//! # Pipeline — Orquestrador da Marcação
//!
//! Conecta as etapas para cada sentença:
//!
//! 1. **Leitura** ([`SentenceBuffer::read`]): uma unidade por vez.
//! 2. **Candidatos** ([`CandidateGenerator`]): casamentos no dicionário por linha inicial.
//! 3. **Sobreposição** ([`resolve`]): quais candidatos serão marcados.
//! 4. **Rótulos** ([`mark`]): colunas BIO acrescentadas in-place.
//!
//! Blocos de comentário passam direto, sem marcação. Um erro de formato
//! (comentário e sentença misturados) interrompe o documento inteiro.

use std::io::{BufRead, Write};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::candidate::{CandidateGenerator, NeCandidate};
use crate::config::TaggerConfig;
use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::resolver::resolve;
use crate::sentence::{ContentType, SentenceBuffer};
use crate::tagger::mark;

/// Resultado da marcação de uma sentença: todos os candidatos e os índices
/// dos que foram selecionados.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagOutcome {
    pub candidates: Vec<NeCandidate>,
    pub selected: Vec<usize>,
}

impl TagOutcome {
    /// Candidatos selecionados, na ordem de seleção.
    pub fn selected_candidates(&self) -> impl Iterator<Item = &NeCandidate> {
        self.selected.iter().filter_map(|&i| self.candidates.get(i))
    }
}

/// Estatísticas de um documento processado por [`SentenceTagger::tag_document`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub sentences: usize,
    pub comments: usize,
    pub tokens: usize,
    pub candidates: usize,
    pub selected: usize,
    pub processing_ms: u64,
}

/// O marcador de sentenças.
///
/// Guarda apenas referências imutáveis ao dicionário e à configuração; todo
/// estado mutável pertence ao [`SentenceBuffer`] de cada sentença.
pub struct SentenceTagger<'a, D: Dictionary + ?Sized> {
    dict: &'a D,
    config: &'a TaggerConfig,
    generator: CandidateGenerator<'a, D>,
}

impl<'a, D: Dictionary + ?Sized> SentenceTagger<'a, D> {
    /// Valida a configuração e escolhe a estratégia de casamento.
    pub fn new(dict: &'a D, config: &'a TaggerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            dict,
            config,
            generator: CandidateGenerator::new(dict, config),
        })
    }

    /// Marca uma sentença in-place: gera candidatos, resolve sobreposições e
    /// acrescenta as colunas BIO. Blocos de comentário ficam intactos.
    pub fn tag(&self, sentence: &mut SentenceBuffer) -> Result<TagOutcome> {
        if sentence.content_type() == ContentType::Comment {
            return Ok(TagOutcome::default());
        }
        let candidates = self.generator.generate(sentence);
        let selected = resolve(&candidates, self.config.overlap);
        debug!(
            tokens = sentence.len(),
            candidates = candidates.len(),
            selected = selected.len(),
            "sentença marcada"
        );
        mark(sentence, self.dict, &candidates, &selected)?;
        Ok(TagOutcome {
            candidates,
            selected,
        })
    }

    /// Lê unidades do `reader` até o fim, marca as sentenças e escreve tudo
    /// no `writer`. Comentários são repassados sem alteração; linhas em
    /// branco extras são preservadas.
    pub fn tag_document<R: BufRead, W: Write>(&self, reader: &mut R, writer: &mut W) -> Result<DocumentStats> {
        let start = Instant::now();
        let mut stats = DocumentStats::default();
        let mut sentence = SentenceBuffer::new();

        while !reader.fill_buf()?.is_empty() {
            if sentence.read(reader, &self.config.multidoc_separator)? == 0 {
                writeln!(writer)?;
                continue;
            }
            let outcome = self.tag(&mut sentence)?;
            if sentence.content_type() == ContentType::Comment {
                stats.comments += 1;
            } else {
                stats.sentences += 1;
                stats.tokens += sentence.len();
                stats.candidates += outcome.candidates.len();
                stats.selected += outcome.selected.len();
            }
            sentence.write_to(writer)?;
        }
        writer.flush()?;

        stats.processing_ms = start.elapsed().as_millis() as u64;
        info!(
            sentences = stats.sentences,
            comments = stats.comments,
            tokens = stats.tokens,
            selected = stats.selected,
            ms = stats.processing_ms,
            "documento marcado"
        );
        Ok(stats)
    }
}

impl<'a, D: Dictionary + Sync + ?Sized> SentenceTagger<'a, D> {
    /// Marca várias sentenças em paralelo (rayon). Comentários são ignorados.
    ///
    /// A configuração e o dicionário são apenas lidos, então as sentenças
    /// são independentes. Para no primeiro erro.
    pub fn tag_batch(&self, sentences: &mut [SentenceBuffer]) -> Result<Vec<TagOutcome>> {
        sentences
            .par_iter_mut()
            .map(|sentence| self.tag(sentence))
            .collect()
    }
}

/// Lê todas as unidades não vazias de um leitor.
pub fn read_units<R: BufRead>(reader: &mut R, multidoc_separator: &str) -> Result<Vec<SentenceBuffer>> {
    let mut units = Vec::new();
    while !reader.fill_buf()?.is_empty() {
        let mut unit = SentenceBuffer::new();
        if unit.read(reader, multidoc_separator)? > 0 {
            units.push(unit);
        }
    }
    Ok(units)
}
