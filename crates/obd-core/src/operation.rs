//! Backend operations driven by a [`RequestController`](crate::RequestController)
//!
//! An operation knows how to issue one kind of call against a
//! [`DiagnosticsApi`] and how to word the notification for each outcome.

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::DiagnosticsApi;
use crate::error::{ApiError, ApiResult};
use crate::models::{CodeListEntry, CodeLookupQuery, DiagnosisRequest, DiagnosisResult, Notice};

/// One kind of backend request
#[async_trait]
pub trait Operation: Send + Sync + 'static {
    type Input: Send + 'static;
    type Output: Clone + Send + Sync + 'static;

    /// Name used in logs and notifications
    fn name(&self) -> &'static str;

    /// Issue the call. Dropping the returned future aborts it.
    async fn execute(&self, input: Self::Input) -> ApiResult<Self::Output>;

    fn success_notice(&self, output: &Self::Output) -> Notice;

    fn failure_notice(&self, error: &ApiError) -> Notice;
}

// =============================================================================
// Code Lookup
// =============================================================================

/// `GET /search_code`, resolving to the code description
#[derive(Clone)]
pub struct CodeLookupOp {
    api: Arc<dyn DiagnosticsApi>,
}

impl CodeLookupOp {
    pub fn new(api: Arc<dyn DiagnosticsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Operation for CodeLookupOp {
    type Input = CodeLookupQuery;
    type Output = String;

    fn name(&self) -> &'static str {
        "code_lookup"
    }

    async fn execute(&self, input: CodeLookupQuery) -> ApiResult<String> {
        self.api
            .search_code(&input.code)
            .await
            .map(|lookup| lookup.result)
    }

    fn success_notice(&self, output: &String) -> Notice {
        Notice::success("Código OBD2 encontrado!", output.clone())
    }

    fn failure_notice(&self, _error: &ApiError) -> Notice {
        Notice::error("Erro", "Erro ao buscar o código OBD2.")
    }
}

// =============================================================================
// Diagnosis Submission
// =============================================================================

/// `POST /diagnose`
#[derive(Clone)]
pub struct DiagnosisSubmissionOp {
    api: Arc<dyn DiagnosticsApi>,
}

impl DiagnosisSubmissionOp {
    pub fn new(api: Arc<dyn DiagnosticsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Operation for DiagnosisSubmissionOp {
    type Input = DiagnosisRequest;
    type Output = DiagnosisResult;

    fn name(&self) -> &'static str {
        "diagnosis"
    }

    async fn execute(&self, input: DiagnosisRequest) -> ApiResult<DiagnosisResult> {
        self.api.diagnose(&input).await
    }

    fn success_notice(&self, _output: &DiagnosisResult) -> Notice {
        Notice::success(
            "Diagnóstico Enviado!",
            "O diagnóstico foi enviado com sucesso.",
        )
    }

    fn failure_notice(&self, _error: &ApiError) -> Notice {
        Notice::error("Erro", "Erro ao enviar o diagnóstico.")
    }
}

// =============================================================================
// Code List
// =============================================================================

/// `GET /codes`, loaded once per activation of the code list view
#[derive(Clone)]
pub struct CodeListOp {
    api: Arc<dyn DiagnosticsApi>,
}

impl CodeListOp {
    pub fn new(api: Arc<dyn DiagnosticsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Operation for CodeListOp {
    type Input = ();
    type Output = Vec<CodeListEntry>;

    fn name(&self) -> &'static str {
        "code_list"
    }

    async fn execute(&self, _input: ()) -> ApiResult<Vec<CodeListEntry>> {
        self.api.list_codes().await
    }

    fn success_notice(&self, output: &Vec<CodeListEntry>) -> Notice {
        Notice::success(
            "Códigos OBD2 carregados",
            format!("{} código(s)", output.len()),
        )
    }

    fn failure_notice(&self, _error: &ApiError) -> Notice {
        Notice::error("Erro", "Erro ao buscar códigos OBD2.")
    }
}
