//! # Configuração do Marcador
//!
//! Toda a configuração é fixada **antes** da marcação e passada por referência
//! imutável para o [`SentenceTagger`](crate::pipeline::SentenceTagger). Como não
//! carrega estado por sentença, pode ser compartilhada entre threads.
//!
//! ## Exemplo (JSON)
//!
//! ```json
//! {
//!   "normalize": 1,
//!   "max_ne_len": 10,
//!   "overlap": "tag-longest",
//!   "pos_filter": { "require_prefix": ["NN"], "disallow_exact": ["VBZ"] },
//!   "multidoc_separator": "###"
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::dictionary::NormalizeType;
use crate::error::{Result, TaggerError};
use crate::pos_filter::PosFilter;
use crate::resolver::OverlapPolicy;

/// Tamanho máximo padrão (em tokens) de uma entidade.
pub const DEFAULT_MAX_NE_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggerConfig {
    /// Máscara de normalização repassada ao dicionário. O bit `TOKEN` escolhe
    /// a busca exata por token único.
    pub normalize: NormalizeType,
    /// Comprimento máximo (em tokens) de um candidato.
    pub max_ne_len: usize,
    pub overlap: OverlapPolicy,
    pub pos_filter: PosFilter,
    /// Prefixo das linhas de comentário/fronteira de documento (vazio = desligado).
    pub multidoc_separator: String,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            normalize: NormalizeType::NONE,
            max_ne_len: DEFAULT_MAX_NE_LEN,
            overlap: OverlapPolicy::TagLongest,
            pos_filter: PosFilter::default(),
            multidoc_separator: String::new(),
        }
    }
}

impl TaggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_normalize(mut self, normalize: NormalizeType) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_max_ne_len(mut self, max_ne_len: usize) -> Self {
        self.max_ne_len = max_ne_len;
        self
    }

    pub fn with_overlap(mut self, overlap: OverlapPolicy) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn with_pos_filter(mut self, pos_filter: PosFilter) -> Self {
        self.pos_filter = pos_filter;
        self
    }

    pub fn with_multidoc_separator(mut self, separator: impl Into<String>) -> Self {
        self.multidoc_separator = separator.into();
        self
    }

    /// Busca exata por token único?
    pub fn token_mode(&self) -> bool {
        self.normalize.contains(NormalizeType::TOKEN)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_ne_len == 0 {
            return Err(TaggerError::invalid_config("max_ne_len deve ser maior que zero"));
        }
        Ok(())
    }

    /// Lê e valida uma configuração em JSON. Campos ausentes assumem o padrão.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: TaggerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        TaggerConfig::from_json_str(&text)
    }
}
