//! Tipos de erro do marcador por dicionário.

use thiserror::Error;

/// Resultado padrão das operações do crate.
pub type Result<T> = std::result::Result<T, TaggerError>;

/// Erros que interrompem a marcação.
///
/// Falhas "locais" (filtro de POS insatisfeito, janela vazia, chave ausente no
/// dicionário) **não** aparecem aqui: elas apenas significam "nenhum candidato".
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TaggerError {
    /// Comentários e sentenças misturados no mesmo bloco (sem linha em branco entre eles).
    #[error("formato de entrada: comentários e sentenças devem ser separados por uma linha em branco (linha {row} do bloco)")]
    MixedContent { row: usize },

    /// Uma linha da sentença tem número de colunas diferente das demais.
    #[error("linha {row} tem {found} colunas, esperado {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Linha da entrada que não é UTF-8 válido.
    #[error("linha {row} do bloco não é UTF-8 válido")]
    InvalidUtf8 { row: usize },

    /// Configuração inválida (ex: `max_ne_len == 0`, nome de normalização desconhecido).
    #[error("configuração inválida: {0}")]
    InvalidConfig(String),

    #[error("erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("erro de JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl TaggerError {
    /// Cria um erro de configuração.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        TaggerError::InvalidConfig(msg.into())
    }
}
