//! Servidor web Axum que expõe o marcador de entidades por dicionário
//!
//! Variáveis de ambiente:
//! - `DICTAGGER_DICT`: gazetteer em JSON (padrão: gazetteer de demonstração)
//! - `DICTAGGER_CONFIG`: configuração do marcador em JSON
//! - `DICTAGGER_ADDR`: endereço de escuta (padrão `0.0.0.0:3000`)

use std::io::Cursor;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use dictagger_core::{
    demo::{demo_dictionary, DEMO_DOCUMENT, DEMO_SEPARATOR},
    labeled_spans, read_units, Dictionary, LabeledSpan, MemoryDictionary, NormalizeType,
    OverlapPolicy, SentenceTagger, TaggerConfig, TaggerError,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

/// Estado compartilhado da aplicação (somente leitura)
struct AppState {
    dict: MemoryDictionary,
    config: TaggerConfig,
}

#[derive(Deserialize)]
struct TagRequest {
    text: String,
    #[serde(default)]
    overlap: Option<OverlapPolicy>,
}

/// Entidade encontrada, com o índice da unidade (sentença) de origem
#[derive(Serialize)]
struct UnitSpan {
    unit: usize,
    #[serde(flatten)]
    span: LabeledSpan,
}

#[derive(Serialize)]
struct TagResponse {
    output: String,
    spans: Vec<UnitSpan>,
    units: usize,
    selected: usize,
    processing_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let state = Arc::new(load_state()?);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/tag", post(tag_handler))
        .route("/tag/raw", post(tag_raw_handler))
        .route("/classes", get(classes_handler))
        .route("/demo", get(demo_handler))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state);

    let addr = std::env::var("DICTAGGER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Marcador por dicionário iniciado em http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Carrega dicionário e configuração a partir do ambiente
fn load_state() -> Result<AppState, TaggerError> {
    let dict = match std::env::var("DICTAGGER_DICT") {
        Ok(path) => {
            let dict = MemoryDictionary::from_json_file(&path)?;
            info!("Dicionário {} carregado: {} chaves, {} classes", path, dict.len(), dict.class_count());
            dict
        }
        Err(_) => {
            warn!("DICTAGGER_DICT não definido; usando o gazetteer de demonstração");
            demo_dictionary()
        }
    };

    let config = match std::env::var("DICTAGGER_CONFIG") {
        Ok(path) => TaggerConfig::from_json_file(&path)?,
        Err(_) => TaggerConfig::default()
            .with_normalize(dict.normalize_type())
            .with_multidoc_separator(DEMO_SEPARATOR),
    };

    // A consulta precisa usar a mesma normalização com que as chaves foram gravadas.
    let lookup_bits = config.normalize.bits() & !NormalizeType::TOKEN.bits();
    if lookup_bits != dict.normalize_type().bits() {
        warn!(
            "normalização da configuração ({}) difere da do dicionário ({})",
            config.normalize,
            dict.normalize_type()
        );
    }

    info!(
        "Configuração: normalize={} max_ne_len={} overlap={:?}",
        config.normalize, config.max_ne_len, config.overlap
    );
    Ok(AppState { dict, config })
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Marca o texto recebido e devolve a tabela anotada e as entidades
async fn tag_handler(State(state): State<Arc<AppState>>, Json(req): Json<TagRequest>) -> Response {
    if req.text.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Texto vazio".to_string());
    }

    let mut config = state.config.clone();
    if let Some(overlap) = req.overlap {
        config.overlap = overlap;
    }

    // O marcador é síncrono: roda fora do runtime
    let state_for_thread = Arc::clone(&state);
    let result = tokio::task::spawn_blocking(move || run_tagging(&state_for_thread.dict, &config, &req.text)).await;

    match result {
        Ok(Ok(response)) => Json(response).into_response(),
        Ok(Err(err)) => {
            warn!("Entrada rejeitada: {}", err);
            error_response(StatusCode::BAD_REQUEST, err.to_string())
        }
        Err(err) => {
            error!("Falha na thread de marcação: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "falha interna".to_string())
        }
    }
}

fn run_tagging(dict: &MemoryDictionary, config: &TaggerConfig, text: &str) -> Result<TagResponse, TaggerError> {
    let start = Instant::now();
    let tagger = SentenceTagger::new(dict, config)?;

    let mut units = read_units(&mut Cursor::new(text), &config.multidoc_separator)?;
    let outcomes = tagger.tag_batch(&mut units)?;

    let mut output = Vec::new();
    for unit in &units {
        unit.write_to(&mut output)?;
    }

    let spans = units
        .iter()
        .enumerate()
        .flat_map(|(unit, sentence)| {
            labeled_spans(sentence, dict)
                .into_iter()
                .map(move |span| UnitSpan { unit, span })
        })
        .collect();

    let selected = outcomes.iter().map(|o| o.selected.len()).sum();
    info!("Marcadas {} unidades ({} candidatos selecionados)", units.len(), selected);

    Ok(TagResponse {
        output: String::from_utf8_lossy(&output).into_owned(),
        spans,
        units: units.len(),
        selected,
        processing_ms: start.elapsed().as_millis() as u64,
    })
}

/// Versão texto puro: recebe o documento TAB e devolve o documento anotado
async fn tag_raw_handler(State(state): State<Arc<AppState>>, body: String) -> Response {
    let result = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, TaggerError> {
        let tagger = SentenceTagger::new(&state.dict, &state.config)?;
        let mut output = Vec::new();
        tagger.tag_document(&mut Cursor::new(body.as_bytes()), &mut output)?;
        Ok(output)
    })
    .await;

    match result {
        Ok(Ok(output)) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            output,
        )
            .into_response(),
        Ok(Err(err)) => {
            warn!("Documento rejeitado: {}", err);
            error_response(StatusCode::BAD_REQUEST, err.to_string())
        }
        Err(err) => {
            error!("Falha na thread de marcação: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "falha interna".to_string())
        }
    }
}

/// Nomes das classes, na ordem das colunas de saída
async fn classes_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let names: Vec<&str> = (0..state.dict.class_count())
        .filter_map(|id| state.dict.class_name(id))
        .collect();
    Json(serde_json::json!(names))
}

/// Documento de demonstração no formato de entrada
async fn demo_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], DEMO_DOCUMENT)
}
