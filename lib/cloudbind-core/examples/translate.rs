#![allow(dead_code)]

//! A hand-written binding for a language translation service.
//!
//! Configure it with `LANGUAGE_TRANSLATOR_URL` and `LANGUAGE_TRANSLATOR_APIKEY`.

use cloudbind_core::{
    ApiClientError, Endpoint, EndpointParam, MultipartField, ServiceClient, ServiceClientBuilder,
    params,
};
use http::Method;
use serde::Deserialize;
use tracing::info;

const VERSION: &str = "2018-05-01";

const TRANSLATE: Endpoint = Endpoint {
    method: Method::POST,
    path: "/v3/translate",
    required: &["text"],
    params: &[
        EndpointParam::body_field("text"),
        EndpointParam::body_field("model_id"),
        EndpointParam::body_field("source"),
        EndpointParam::body_field("target"),
    ],
};

const LIST_MODELS: Endpoint = Endpoint {
    method: Method::GET,
    path: "/v3/models",
    required: &[],
    params: &[
        EndpointParam::query("source"),
        EndpointParam::query("target"),
        EndpointParam::query("default"),
    ],
};

const TRANSLATE_DOCUMENT: Endpoint = Endpoint {
    method: Method::POST,
    path: "/v3/documents",
    required: &["model_id"],
    params: &[
        EndpointParam::form_field("model_id"),
        EndpointParam::form_field("source"),
        EndpointParam::form_field("target"),
    ],
};

/// Typed methods over the generic service client.
#[derive(Debug, Clone)]
struct LanguageTranslator {
    client: ServiceClient,
}

impl LanguageTranslator {
    fn from_env() -> Result<Self, ApiClientError> {
        let client = ServiceClientBuilder::from_env("language_translator")
            .with_version(VERSION)
            .build()?;
        Ok(Self { client })
    }

    async fn translate(
        &self,
        text: &[&str],
        model_id: Option<&str>,
    ) -> Result<TranslationResult, ApiClientError> {
        self.client
            .invoke_with(&TRANSLATE, params! { "text" => text, "model_id" => model_id })
            .await?
            .as_json()
    }

    async fn list_models(&self, source: Option<&str>) -> Result<TranslationModels, ApiClientError> {
        self.client
            .invoke_with(&LIST_MODELS, params! { "source" => source })
            .await?
            .as_json()
    }

    async fn translate_document(
        &self,
        file: Vec<u8>,
        filename: &str,
        model_id: &str,
    ) -> Result<DocumentStatus, ApiClientError> {
        let file = MultipartField::bytes(file)
            .with_filename(filename)
            .with_content_type(mime::TEXT_PLAIN);
        self.client
            .invoke_with(&TRANSLATE_DOCUMENT, params! { "model_id" => model_id })
            .with_multipart_field("file", file)
            .await?
            .as_json()
    }
}

#[derive(Debug, Deserialize)]
struct TranslationResult {
    word_count: u32,
    character_count: u32,
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    translation: String,
}

#[derive(Debug, Deserialize)]
struct TranslationModels {
    models: Vec<TranslationModel>,
}

#[derive(Debug, Deserialize)]
struct TranslationModel {
    model_id: String,
    source: Option<String>,
    target: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DocumentStatus {
    document_id: String,
    status: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().pretty().init();

    let translator = LanguageTranslator::from_env()?;

    let models = translator.list_models(Some("en")).await?;
    info!(count = models.models.len(), "available models");

    let result = translator.translate(&["Hello, world"], Some("en-es")).await?;
    for translation in &result.translations {
        info!(translation = %translation.translation, "translated");
    }

    let status = translator
        .translate_document(b"Hello".to_vec(), "hello.txt", "en-es")
        .await?;
    info!(?status, "document submitted");

    Ok(())
}
