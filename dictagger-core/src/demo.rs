//! # Dados de Demonstração
//!
//! Um gazetteer pequeno de domínio biomédico e um documento já tokenizado e
//! etiquetado (formato TAB), usados pelo servidor web quando nenhum
//! dicionário é configurado.

use crate::dictionary::{MemoryDictionary, NormalizeType};

/// Entradas `(forma de superfície, classe)` do gazetteer de demonstração.
pub const DEMO_ENTRIES: &[(&str, &str)] = &[
    ("p53", "Gene"),
    ("BRCA1", "Gene"),
    ("IL-2", "Gene"),
    ("IL-2 receptor", "Protein"),
    ("tumor necrosis factor", "Protein"),
    ("breast cancer", "Disease"),
    ("cancer", "Disease"),
    ("Li-Fraumeni syndrome", "Disease"),
    ("p53", "Disease"),
    ("T cells", "CellType"),
];

/// Documento de exemplo: um comentário de início de documento e duas sentenças.
pub const DEMO_DOCUMENT: &str = "\
-DOCSTART- demo
\n\
0\t8\tMutations\t\tNNS
9\t11\tin\t\tIN
12\t17\tBRCA1\t\tNN
18\t21\tand\t\tCC
22\t25\tp53\t\tNN
26\t31\tcause\t\tVBP
32\t38\tbreast\t\tNN
39\t45\tcancer\t\tNN
45\t46\t.\t\t.
\n\
47\t49\tIL\t\tNN
49\t51\t-2\t\tNN
52\t60\treceptor\t\tNN
61\t63\tis\t\tVBZ
64\t72\tupregulated\t\tVBN
73\t75\tin\t\tIN
76\t77\tT\t\tNN
78\t83\tcells\t\tNNS
83\t84\t.\t\t.
";

/// Separador de documentos usado em [`DEMO_DOCUMENT`].
pub const DEMO_SEPARATOR: &str = "-DOCSTART-";

/// Constrói o gazetteer de demonstração (sem normalização).
pub fn demo_dictionary() -> MemoryDictionary {
    let mut dict = MemoryDictionary::new(NormalizeType::NONE);
    for (surface, class) in DEMO_ENTRIES {
        dict.insert(surface, class);
    }
    dict
}
