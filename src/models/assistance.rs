// src/models/assistance.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "ticket_modality")]
pub enum TicketModality {
    Padrao,
    TrocaGarantida,
    TrocaImediata,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "ticket_status")]
pub enum TicketStatus {
    Triagem,
    EmTratativa,
    AguardandoChegada,
    AguardandoCliente,
    LogisticaReversa,
    Concluido,
    Cancelado,
}

/// Colunas de data que cada transição carimba.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionStamps {
    pub part_requested: bool,
    pub part_arrived: bool,
    pub customer_exchange: bool,
    pub sent_to_supplier: bool,
    pub concluded: bool,
}

impl TicketStatus {
    /// Texto que o cliente vê na página de acompanhamento.
    pub fn public_label(self) -> &'static str {
        match self {
            TicketStatus::Triagem => "Solicitação Recebida",
            TicketStatus::EmTratativa => "Em Tratativa com Fabricante",
            TicketStatus::AguardandoChegada => "Aguardando Peça",
            TicketStatus::AguardandoCliente => "Pronto para Retirada",
            TicketStatus::LogisticaReversa => "Em Processo de Devolução",
            TicketStatus::Concluido => "Finalizado",
            TicketStatus::Cancelado => "Cancelado",
        }
    }

    pub fn default_message(self) -> String {
        match self {
            TicketStatus::AguardandoCliente => "Peça chegou. Prazo de devolução iniciado.".into(),
            other => format!("Status alterado para {:?}", other),
        }
    }

    pub fn is_open(self) -> bool {
        !matches!(self, TicketStatus::Concluido | TicketStatus::Cancelado)
    }

    pub fn can_transition_to(self, next: TicketStatus) -> bool {
        use TicketStatus::*;
        match (self, next) {
            (from, Cancelado) => from.is_open(),
            (Triagem, EmTratativa)
            | (EmTratativa, AguardandoChegada)
            | (AguardandoChegada, AguardandoCliente)
            | (AguardandoCliente, Concluido)
            | (AguardandoCliente, LogisticaReversa)
            | (LogisticaReversa, Concluido) => true,
            _ => false,
        }
    }

    pub fn stamps(self) -> TransitionStamps {
        match self {
            TicketStatus::EmTratativa => TransitionStamps { part_requested: true, ..Default::default() },
            TicketStatus::AguardandoCliente => TransitionStamps { part_arrived: true, ..Default::default() },
            TicketStatus::LogisticaReversa => {
                TransitionStamps { customer_exchange: true, ..Default::default() }
            }
            TicketStatus::Concluido => TransitionStamps {
                concluded: true,
                sent_to_supplier: true,
                ..Default::default()
            },
            _ => TransitionStamps::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "timeline_kind")]
pub enum TimelineKind {
    Sistema,
    Alerta,
    MudancaStatus,
    Interacao,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssistanceTicket {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub store_id: Uuid,
    pub tracking_token: Uuid,
    pub customer_id: Uuid,
    pub original_sale_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub product_description: String,
    pub defect_description: String,
    pub contact_used: Option<String>,
    pub modality: TicketModality,
    pub status: TicketStatus,
    pub public_status: String,
    pub opened_at: DateTime<Utc>,
    pub part_requested_at: Option<DateTime<Utc>>,
    pub part_arrived_at: Option<DateTime<Utc>>,
    pub customer_exchange_at: Option<DateTime<Utc>>,
    pub sent_to_supplier_at: Option<DateTime<Utc>>,
    pub concluded_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub tenant_id: Uuid,
    pub kind: TimelineKind,
    pub message: String,
    pub actor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Chamado aberto, com o nome do cliente para a listagem.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketListEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub ticket: AssistanceTicket,
    pub customer_name: String,
    pub customer_phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    pub customer_id: Uuid,
    /// Telefone confirmado no balcão; atualiza o cadastro do cliente.
    pub updated_phone: Option<String>,
    pub product_id: Option<Uuid>,
    #[validate(length(min = 2, message = "Descrição do produto obrigatória"))]
    pub product_description: String,
    pub original_sale_id: Option<Uuid>,
    #[validate(length(min = 3, message = "Descreva o defeito"))]
    pub defect_description: String,
    pub modality: TicketModality,
    /// Funcionário que atendeu (responde pela baixa na troca imediata).
    pub employee_id: Uuid,
}

/// O que a página pública de acompanhamento mostra. Sem ids internos.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicTicket {
    pub status: TicketStatus,
    pub public_status: String,
    pub product_description: String,
    pub store_name: String,
    pub opened_at: DateTime<Utc>,
    pub part_requested_at: Option<DateTime<Utc>>,
    pub part_arrived_at: Option<DateTime<Utc>>,
    pub customer_exchange_at: Option<DateTime<Utc>>,
    pub sent_to_supplier_at: Option<DateTime<Utc>>,
    pub concluded_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::TicketStatus::*;
    use super::*;

    #[test]
    fn forward_path_is_allowed() {
        assert!(Triagem.can_transition_to(EmTratativa));
        assert!(EmTratativa.can_transition_to(AguardandoChegada));
        assert!(AguardandoChegada.can_transition_to(AguardandoCliente));
        assert!(AguardandoCliente.can_transition_to(Concluido));
        assert!(AguardandoCliente.can_transition_to(LogisticaReversa));
        assert!(LogisticaReversa.can_transition_to(Concluido));
    }

    #[test]
    fn skipping_or_going_back_is_rejected() {
        assert!(!Triagem.can_transition_to(AguardandoCliente));
        assert!(!AguardandoCliente.can_transition_to(EmTratativa));
        assert!(!Triagem.can_transition_to(Triagem));
    }

    #[test]
    fn cancel_only_from_open_states() {
        assert!(Triagem.can_transition_to(Cancelado));
        assert!(LogisticaReversa.can_transition_to(Cancelado));
        assert!(!Concluido.can_transition_to(Cancelado));
        assert!(!Cancelado.can_transition_to(Cancelado));
        assert!(!Cancelado.can_transition_to(Triagem));
    }

    #[test]
    fn concluding_stamps_supplier_and_conclusion() {
        let s = Concluido.stamps();
        assert!(s.concluded && s.sent_to_supplier);
        assert!(!s.part_arrived);
        assert_eq!(Cancelado.stamps(), TransitionStamps::default());
    }

    #[test]
    fn labels_and_messages() {
        assert_eq!(AguardandoCliente.public_label(), "Pronto para Retirada");
        assert_eq!(
            AguardandoCliente.default_message(),
            "Peça chegou. Prazo de devolução iniciado."
        );
        assert_eq!(EmTratativa.default_message(), "Status alterado para EmTratativa");
    }
}
