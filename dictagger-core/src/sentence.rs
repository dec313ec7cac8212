//! # Buffer de Sentença
//!
//! Guarda as linhas (tokens) de **uma** unidade de entrada: uma sentença já
//! tokenizada e etiquetada com POS, ou um bloco de comentário repassado sem
//! alteração.
//!
//! ## Formato de entrada (uma linha por token, separada por TAB)
//!
//! | Coluna | Conteúdo                          |
//! |--------|-----------------------------------|
//! | 0      | offset inicial (caracteres)       |
//! | 1      | offset final                      |
//! | 2      | token bruto                       |
//! | 3      | reservada                         |
//! | 4      | etiqueta POS                      |
//! | 5+     | features de estágios anteriores   |
//!
//! Uma linha em branco encerra a unidade. Uma linha que começa com o separador
//! de documentos (se configurado) é um comentário e vira uma linha de um só campo.

use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaggerError};

pub const BEG_COL: usize = 0;
pub const END_COL: usize = 1;
pub const RAW_TOKEN_COL: usize = 2;
pub const POS_COL: usize = 4;

/// Uma linha da tabela: os campos de um token.
pub type TokenRow = Vec<String>;

/// Tipo de conteúdo acumulado no buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    Uninitialized,
    Comment,
    Sentence,
}

/// Tabela de tokens de uma sentença, extensível por colunas.
///
/// Os candidatos e as seleções guardam apenas índices de linha; o conteúdo
/// vive somente aqui.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentenceBuffer {
    rows: Vec<TokenRow>,
    content_type: ContentType,
    /// Índice da primeira coluna de rótulos, depois que elas foram acrescentadas.
    label_col: Option<usize>,
}

impl SentenceBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrói uma sentença a partir de linhas já separadas em campos.
    pub fn from_rows(rows: Vec<TokenRow>) -> Self {
        let content_type = if rows.is_empty() {
            ContentType::Uninitialized
        } else {
            ContentType::Sentence
        };
        Self {
            rows,
            content_type,
            label_col: None,
        }
    }

    /// Constrói uma sentença a partir de pares `(token, POS)`, calculando os
    /// offsets como se os tokens estivessem separados por um espaço.
    ///
    /// Tokens colados ao anterior (pontuação) podem ser indicados com o prefixo
    /// `"##"`, que é removido: `[("IL", "NN"), ("##-2", "NN")]` gera "IL-2".
    pub fn from_tokens(tokens: &[(&str, &str)]) -> Self {
        let mut rows = Vec::with_capacity(tokens.len());
        let mut offset = 0usize;
        for (i, (text, pos)) in tokens.iter().enumerate() {
            let (text, glued) = match text.strip_prefix("##") {
                Some(rest) => (rest, true),
                None => (*text, false),
            };
            if i > 0 && !glued {
                offset += 1;
            }
            let begin = offset;
            offset += text.chars().count();
            rows.push(vec![
                begin.to_string(),
                offset.to_string(),
                text.to_string(),
                String::new(),
                pos.to_string(),
            ]);
        }
        SentenceBuffer::from_rows(rows)
    }

    /// Lê uma unidade (sentença ou bloco de comentário) do leitor.
    ///
    /// O buffer é limpo antes da leitura. Devolve o número de linhas lidas;
    /// `0` indica linha em branco isolada ou fim da entrada.
    ///
    /// # Erros
    /// [`TaggerError::MixedContent`] se comentários e tokens aparecerem no
    /// mesmo bloco. O chamador deve abortar o lote.
    ///
    /// [`TaggerError::InvalidUtf8`] se uma linha não for UTF-8 válido. A linha
    /// inteira é consumida antes do erro, então a leitura pode continuar no
    /// restante da unidade.
    pub fn read<R: BufRead>(&mut self, reader: &mut R, multidoc_separator: &str) -> Result<usize> {
        self.rows.clear();
        self.content_type = ContentType::Uninitialized;
        self.label_col = None;

        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            let text = std::str::from_utf8(&line)
                .map_err(|_| TaggerError::InvalidUtf8 { row: self.rows.len() })?
                .trim_end_matches(['\n', '\r']);
            if text.is_empty() {
                break;
            }

            if !multidoc_separator.is_empty() && text.starts_with(multidoc_separator) {
                self.set_content_type(ContentType::Comment)?;
                self.rows.push(vec![text.to_string()]);
                continue;
            }

            self.set_content_type(ContentType::Sentence)?;
            self.rows.push(text.split('\t').map(str::to_string).collect());
        }
        Ok(self.rows.len())
    }

    fn set_content_type(&mut self, kind: ContentType) -> Result<()> {
        match (self.content_type, kind) {
            (ContentType::Uninitialized, _) => {
                self.content_type = kind;
                Ok(())
            }
            (current, new) if current == new => Ok(()),
            _ => Err(TaggerError::MixedContent {
                row: self.rows.len(),
            }),
        }
    }

    /// Escreve as linhas separadas por TAB, seguidas de uma linha em branco.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        for row in &self.rows {
            writeln!(writer, "{}", row.join("\t"))?;
        }
        writeln!(writer)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn rows(&self) -> &[TokenRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&TokenRow> {
        self.rows.get(index)
    }

    /// Campo `col` da linha `row`; campos ausentes valem `""`.
    pub fn field(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn raw_token(&self, row: usize) -> &str {
        self.field(row, RAW_TOKEN_COL)
    }

    pub fn pos(&self, row: usize) -> &str {
        self.field(row, POS_COL)
    }

    pub fn begin_offset(&self, row: usize) -> &str {
        self.field(row, BEG_COL)
    }

    pub fn end_offset(&self, row: usize) -> &str {
        self.field(row, END_COL)
    }

    /// Verdadeiro se o token `row + 1` começa exatamente onde `row` termina.
    pub fn is_contiguous(&self, row: usize) -> bool {
        self.end_offset(row) == self.begin_offset(row + 1)
    }

    /// Coluna onde começam os rótulos (se já acrescentados).
    pub fn label_col(&self) -> Option<usize> {
        self.label_col
    }

    /// Acrescenta `count` colunas preenchidas com `fill` a todas as linhas e
    /// devolve o índice da primeira delas. Chamadas seguintes reaproveitam as
    /// colunas já criadas.
    ///
    /// # Erros
    /// [`TaggerError::RaggedRow`] se as linhas não tiverem todas o mesmo número de colunas.
    /// [`TaggerError::InvalidConfig`] se as colunas existentes forem de outro número de classes.
    pub fn ensure_label_columns(&mut self, count: usize, fill: &str) -> Result<usize> {
        if let Some(col) = self.label_col {
            let existing = self.rows.first().map_or(count, |r| r.len().saturating_sub(col));
            if existing != count {
                return Err(TaggerError::invalid_config(format!(
                    "sentença já tem {existing} colunas de rótulo, dicionário tem {count} classes"
                )));
            }
            return Ok(col);
        }
        let width = self.rows.first().map(Vec::len).unwrap_or(0);
        if let Some((row, r)) = self.rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(TaggerError::RaggedRow {
                row,
                expected: width,
                found: r.len(),
            });
        }
        for row in &mut self.rows {
            row.extend(std::iter::repeat(fill.to_string()).take(count));
        }
        self.label_col = Some(width);
        Ok(width)
    }

    /// Acesso mutável a uma célula (usado pelo emissor de rótulos).
    pub(crate) fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut String> {
        self.rows.get_mut(row).and_then(|r| r.get_mut(col))
    }
}
