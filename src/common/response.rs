// src/common/response.rs

use serde::Serialize;
use utoipa::ToSchema;

/// Contrato de retorno de toda operação que altera estado: `{ success, message }`.
/// O chamador exibe `message` literalmente em caso de falha.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "Movimentação (Saida) registrada com sucesso!")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub data: Option<serde_json::Value>,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into(), data: None }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), data: None }
    }

    /// Anexa o registro criado/alterado. Falha de serialização não derruba a resposta.
    pub fn with_data<T: Serialize>(mut self, data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => self.data = Some(value),
            Err(e) => tracing::warn!("Falha ao serializar dados da resposta: {}", e),
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_is_omitted_when_absent() {
        let body = serde_json::to_value(ActionResult::ok("Registrado.")).unwrap();
        assert_eq!(body, serde_json::json!({ "success": true, "message": "Registrado." }));
    }

    #[test]
    fn data_is_attached() {
        let body = serde_json::to_value(ActionResult::ok("ok").with_data(&vec![1, 2])).unwrap();
        assert_eq!(body["data"], serde_json::json!([1, 2]));
    }
}
