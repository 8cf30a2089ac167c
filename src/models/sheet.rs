// src/models/sheet.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

// Uma linha da planilha, exatamente como os cabeçalhos aparecem na primeira linha.
// Qualquer coluna ausente na linha vira `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RawRecord {
    #[serde(rename = "Date", default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "2024-04-01")]
    pub date: Option<String>,

    // A presença da linha já conta como uma venda; o valor não é usado.
    #[serde(rename = "Sales", default, skip_serializing_if = "Option::is_none")]
    pub sales: Option<String>,

    #[serde(rename = "Sales Person", default, skip_serializing_if = "Option::is_none")]
    pub sales_person: Option<String>,

    #[serde(rename = "Client", default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,

    #[serde(rename = "Revenue", default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "$1,250.00")]
    pub revenue: Option<String>,

    #[serde(rename = "State", default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl RawRecord {
    /// Monta o registro a partir do mapa cabeçalho -> valor de uma linha.
    /// Cabeçalhos desconhecidos são ignorados.
    pub fn from_columns(mut columns: HashMap<String, String>) -> Self {
        Self {
            date: columns.remove("Date"),
            sales: columns.remove("Sales"),
            sales_person: columns.remove("Sales Person"),
            client: columns.remove("Client"),
            revenue: columns.remove("Revenue"),
            state: columns.remove("State"),
        }
    }
}

// O contrato de entrada: `{ data: RawRecord[] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SheetPayload {
    pub data: Vec<RawRecord>,
}

// Resposta crua do endpoint `values.get` da API do Google Sheets.
#[derive(Debug, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}
