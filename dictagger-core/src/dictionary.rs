//! # Dicionário (Gazetteer) e Normalização
//!
//! O marcador não conhece a estrutura interna do dicionário: ele só precisa
//! consultar uma chave normalizada e descobrir a quais classes semânticas ela
//! pertence. Essa fronteira é o trait [`Dictionary`].
//!
//! ## Normalização
//!
//! A consulta recebe uma máscara de bits ([`NormalizeType`]) que diz como a
//! chave deve ser canonizada antes da busca:
//!
//! | Bit      | Nome    | Efeito na chave                                   |
//! |----------|---------|---------------------------------------------------|
//! | `CASE`   | `case`  | minúsculas                                        |
//! | `NUMBER` | `num`   | todo dígito vira `0` ("IL-2" → "IL-0")            |
//! | `SYMBOL` | `sym`   | todo símbolo vira `_` ("IL-2" → "IL_2")           |
//! | `TOKEN`  | `token` | nenhum; seleciona a busca exata por token único   |
//!
//! [`MemoryDictionary`] é a implementação em memória usada pelos testes e pelo
//! servidor web.

use std::collections::HashMap;
use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TaggerError};

static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").expect("regex de dígito"));
static SYMBOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{Alphabetic}\p{Nd}\s]").expect("regex de símbolo"));

/// Máscara de normalização aplicada às chaves do dicionário.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizeType(u32);

impl NormalizeType {
    pub const NONE: NormalizeType = NormalizeType(0);
    pub const CASE: NormalizeType = NormalizeType(1);
    pub const NUMBER: NormalizeType = NormalizeType(1 << 1);
    pub const SYMBOL: NormalizeType = NormalizeType(1 << 2);
    /// Busca exata: cada token é consultado isoladamente.
    pub const TOKEN: NormalizeType = NormalizeType(1 << 3);

    const NAMES: [(&'static str, NormalizeType); 4] = [
        ("case", NormalizeType::CASE),
        ("num", NormalizeType::NUMBER),
        ("sym", NormalizeType::SYMBOL),
        ("token", NormalizeType::TOKEN),
    ];

    pub fn bits(self) -> u32 {
        self.0
    }

    /// Verdadeiro se todos os bits de `other` estão ligados.
    pub fn contains(self, other: NormalizeType) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }
}

impl BitOr for NormalizeType {
    type Output = NormalizeType;

    fn bitor(self, rhs: NormalizeType) -> NormalizeType {
        NormalizeType(self.0 | rhs.0)
    }
}

/// Parseia a lista separada por vírgulas (ex: `"case,num,token"`).
impl FromStr for NormalizeType {
    type Err = TaggerError;

    fn from_str(s: &str) -> Result<Self> {
        let mut mode = NormalizeType::NONE;
        for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if name == "none" {
                continue;
            }
            let bit = NormalizeType::NAMES
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, bit)| *bit)
                .ok_or_else(|| {
                    TaggerError::invalid_config(format!("tipo de normalização desconhecido: {name}"))
                })?;
            mode = mode | bit;
        }
        Ok(mode)
    }
}

impl fmt::Display for NormalizeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = NormalizeType::NAMES
            .iter()
            .filter(|(_, bit)| self.contains(*bit))
            .map(|(n, _)| *n)
            .collect();
        if names.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", names.join(","))
        }
    }
}

/// Canoniza uma chave segundo a máscara. O bit `TOKEN` não altera o texto.
pub fn normalize(key: &str, mode: NormalizeType) -> String {
    let mut out = if mode.contains(NormalizeType::CASE) {
        key.to_lowercase()
    } else {
        key.to_string()
    };
    if mode.contains(NormalizeType::NUMBER) {
        out = DIGIT.replace_all(&out, "0").into_owned();
    }
    if mode.contains(NormalizeType::SYMBOL) {
        out = SYMBOL.replace_all(&out, "_").into_owned();
    }
    out
}

/// Interface consumida pelo marcador.
///
/// Uma chave ausente é simplesmente `None`: para o gerador de candidatos isso
/// quer dizer "nenhum casamento neste comprimento", nunca um erro.
pub trait Dictionary {
    /// Classes associadas à chave (após normalização), ou `None`.
    fn lookup(&self, key: &str, normalize: NormalizeType) -> Option<&[usize]>;

    /// Número de classes semânticas (= colunas acrescentadas por sentença).
    fn class_count(&self) -> usize;

    /// Nome descritivo da classe (ex: "Gene", "Disease").
    fn class_name(&self, id: usize) -> Option<&str>;
}

/// Entrada de um gazetteer em JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GazetteerEntry {
    pub surface: String,
    pub classes: Vec<String>,
}

/// Formato JSON aceito por [`MemoryDictionary::from_json_str`].
///
/// ```json
/// {
///   "normalize": "case",
///   "classes": ["LOC", "ORG"],
///   "entries": [{ "surface": "New York", "classes": ["LOC"] }]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GazetteerSpec {
    pub normalize: String,
    /// Ordem explícita das classes; classes citadas só nas entradas vão para o fim.
    pub classes: Vec<String>,
    pub entries: Vec<GazetteerEntry>,
}

/// Dicionário em memória: chave normalizada → ids de classe.
#[derive(Debug, Clone, Default)]
pub struct MemoryDictionary {
    normalize: NormalizeType,
    classes: Vec<String>,
    entries: HashMap<String, Vec<usize>>,
}

impl MemoryDictionary {
    /// Cria um dicionário vazio cujas chaves são normalizadas com `normalize`.
    ///
    /// As consultas devem usar a mesma máscara (a menos do bit `TOKEN`).
    pub fn new(normalize: NormalizeType) -> Self {
        Self {
            normalize,
            classes: Vec::new(),
            entries: HashMap::new(),
        }
    }

    pub fn normalize_type(&self) -> NormalizeType {
        self.normalize
    }

    /// Registra uma classe e devolve seu id (idempotente).
    pub fn add_class(&mut self, name: &str) -> usize {
        if let Some(id) = self.classes.iter().position(|c| c == name) {
            return id;
        }
        self.classes.push(name.to_string());
        self.classes.len() - 1
    }

    /// Associa `surface` à classe `class_name`, criando a classe se necessário.
    pub fn insert(&mut self, surface: &str, class_name: &str) -> usize {
        let id = self.add_class(class_name);
        let key = normalize(surface, self.normalize);
        let ids = self.entries.entry(key).or_default();
        if let Err(pos) = ids.binary_search(&id) {
            ids.insert(pos, id);
        }
        id
    }

    /// Número de chaves distintas.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_spec(spec: GazetteerSpec) -> Result<Self> {
        let mut dict = MemoryDictionary::new(spec.normalize.parse()?);
        for class in &spec.classes {
            dict.add_class(class);
        }
        for entry in &spec.entries {
            if entry.classes.is_empty() {
                return Err(TaggerError::invalid_config(format!(
                    "entrada sem classe: {}",
                    entry.surface
                )));
            }
            for class in &entry.classes {
                dict.insert(&entry.surface, class);
            }
        }
        Ok(dict)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        MemoryDictionary::from_spec(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        MemoryDictionary::from_json_str(&text)
    }
}

impl Dictionary for MemoryDictionary {
    fn lookup(&self, key: &str, mode: NormalizeType) -> Option<&[usize]> {
        self.entries
            .get(&normalize(key, mode))
            .map(|ids| ids.as_slice())
    }

    fn class_count(&self) -> usize {
        self.classes.len()
    }

    fn class_name(&self, id: usize) -> Option<&str> {
        self.classes.get(id).map(|c| c.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_modes() {
        assert_eq!(normalize("IL-2", NormalizeType::NONE), "IL-2");
        assert_eq!(normalize("IL-2", NormalizeType::CASE), "il-2");
        assert_eq!(normalize("IL-2", NormalizeType::NUMBER), "IL-0");
        assert_eq!(normalize("IL-2", NormalizeType::SYMBOL), "IL_2");
        assert_eq!(
            normalize("IL-2 alpha", NormalizeType::CASE | NormalizeType::NUMBER | NormalizeType::SYMBOL),
            "il_0 alpha"
        );
        assert_eq!(normalize("York", NormalizeType::TOKEN), "York");
    }

    #[test]
    fn test_parse_normalize_names() {
        let mode: NormalizeType = "case, token".parse().unwrap();
        assert!(mode.contains(NormalizeType::CASE));
        assert!(mode.contains(NormalizeType::TOKEN));
        assert!(!mode.contains(NormalizeType::NUMBER));
        assert_eq!(mode.to_string(), "case,token");
        assert_eq!("".parse::<NormalizeType>().unwrap(), NormalizeType::NONE);
        assert_eq!("none".parse::<NormalizeType>().unwrap().to_string(), "none");
        assert!("fuzzy".parse::<NormalizeType>().is_err());
    }

    #[test]
    fn test_none_never_contained() {
        assert!(!NormalizeType::CASE.contains(NormalizeType::NONE));
    }

    #[test]
    fn test_memory_dictionary_multiple_classes() {
        let mut dict = MemoryDictionary::new(NormalizeType::CASE);
        dict.insert("p53", "Gene");
        dict.insert("P53", "Disease");
        dict.insert("p53", "Gene");

        assert_eq!(dict.class_count(), 2);
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.lookup("P53", NormalizeType::CASE), Some(&[0usize, 1][..]));
        assert_eq!(dict.class_name(1), Some("Disease"));
        assert_eq!(dict.class_name(2), None);
        assert!(dict.lookup("p54", NormalizeType::CASE).is_none());
    }

    #[test]
    fn test_dictionary_from_json() {
        let json = r#"{
            "normalize": "case",
            "classes": ["ORG", "LOC"],
            "entries": [
                { "surface": "New York", "classes": ["LOC"] },
                { "surface": "Acme", "classes": ["ORG", "MISC"] }
            ]
        }"#;
        let dict = MemoryDictionary::from_json_str(json).unwrap();
        assert_eq!(dict.class_count(), 3);
        assert_eq!(dict.class_name(0), Some("ORG"));
        assert_eq!(dict.class_name(2), Some("MISC"));
        assert_eq!(dict.lookup("new york", NormalizeType::CASE), Some(&[1usize][..]));
        assert_eq!(dict.lookup("ACME", NormalizeType::CASE), Some(&[0usize, 2][..]));
    }

    #[test]
    fn test_dictionary_entry_without_class_is_rejected() {
        let json = r#"{ "entries": [{ "surface": "x", "classes": [] }] }"#;
        assert!(matches!(
            MemoryDictionary::from_json_str(json),
            Err(TaggerError::InvalidConfig(_))
        ));
    }
}
