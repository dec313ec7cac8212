//! # Resolução de Sobreposição
//!
//! Decide quais candidatos serão efetivamente marcados quando seus spans
//! compartilham tokens.

use serde::{Deserialize, Serialize};

use crate::candidate::NeCandidate;

/// Política de resolução de sobreposição.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    /// **Mais longo, à esquerda**: seleção gulosa de spans disjuntos.
    /// O gerador para no primeiro (mais longo) casamento de cada início.
    #[default]
    TagLongest,
    /// **Todos**: cada casamento vira candidato e todos são selecionados; o
    /// emissor de rótulos arbitra conflitos (quem escreve primeiro vence).
    TagAll,
}

/// Seleciona candidatos, devolvendo índices na lista original.
///
/// Os candidatos chegam ordenados por `begin` (e, para o mesmo `begin`, do
/// mais longo para o mais curto); a lista não é reordenada aqui.
pub fn resolve(candidates: &[NeCandidate], policy: OverlapPolicy) -> Vec<usize> {
    let mut selected = Vec::with_capacity(candidates.len());
    let mut last_end: Option<usize> = None;

    for (idx, ne) in candidates.iter().enumerate() {
        let free = last_end.map_or(true, |end| ne.begin > end);
        match policy {
            OverlapPolicy::TagLongest if free => {
                selected.push(idx);
                last_end = Some(ne.end);
            }
            OverlapPolicy::TagLongest => {}
            OverlapPolicy::TagAll => {
                selected.push(idx);
                if free {
                    last_end = Some(ne.end);
                }
            }
        }
    }
    selected
}
