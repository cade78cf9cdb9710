//! Backend functions: stock catalog, discount table and order sink
//!
//! ```text
//! GET  {base}/api-estoque    → [{ id, nome, valor, quantidade }]
//! GET  {base}/api-descontos  → { "<label>": <percentage> }
//! POST {base}/api-pedidos    ← { nomeJogador, items, formaPagamento, valorTotal, dataJogo }
//! ```
//!
//! The backend is loose about types: ids and prices arrive as numbers or
//! strings. Everything is normalized here so the core only sees `Money`,
//! `DiscountRate` and `String` ids.

use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use courtside_core::validation::validate_catalog_price;
use courtside_core::{CatalogItem, DiscountRate, DiscountTable, LineItem, Money, OrderRequest};

use crate::config::ClientConfig;
use crate::http::HttpClient;
use crate::ClientResult;

/// The stock catalog, discount table and order sink.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Purchasable items.
    async fn catalog(&self) -> ClientResult<Vec<CatalogItem>>;

    /// Discount label → rate.
    async fn discounts(&self) -> ClientResult<DiscountTable>;

    /// Persists a finalized order.
    async fn post_order(&self, order: &OrderRequest) -> ClientResult<()>;
}

// =============================================================================
// Wire types
// =============================================================================

/// One entry of `api-estoque`.
#[derive(Debug, Deserialize)]
pub struct CatalogItemDto {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default)]
    pub nome: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub valor: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub quantidade: Option<Decimal>,
}

impl CatalogItemDto {
    /// Prices that are missing, unparseable or negative become zero.
    pub fn into_catalog_item(self) -> CatalogItem {
        let price = self
            .valor
            .and_then(Money::from_decimal_rounded)
            .unwrap_or_default();
        let price = match validate_catalog_price(price) {
            Ok(()) => price,
            Err(e) => {
                warn!(item = %self.nome, error = %e, "Catalog price rejected, using zero");
                Money::zero()
            }
        };
        let available_quantity = self
            .quantidade
            .and_then(|q| q.trunc().to_i64())
            .unwrap_or(0);

        CatalogItem {
            id: self.id,
            name: self.nome,
            price,
            available_quantity,
        }
    }
}

/// Line of an outgoing order.
#[derive(Debug, Serialize, PartialEq)]
pub struct OrderItemDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub nome: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub valor: Decimal,
}

/// Body of `api-pedidos`.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub nome_jogador: String,
    pub items: Vec<OrderItemDto>,
    pub forma_pagamento: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub valor_total: Decimal,
    /// Serialized as `null` when no game slot is set.
    pub data_jogo: Option<String>,
}

impl From<&LineItem> for OrderItemDto {
    fn from(item: &LineItem) -> Self {
        OrderItemDto {
            id: item.catalog_id.clone(),
            nome: item.name.clone(),
            valor: item.price.to_decimal(),
        }
    }
}

impl From<&OrderRequest> for OrderPayload {
    fn from(order: &OrderRequest) -> Self {
        OrderPayload {
            nome_jogador: order.customer_name.clone(),
            items: order.items.iter().map(OrderItemDto::from).collect(),
            forma_pagamento: order.tender.wire_name().to_string(),
            valor_total: order.total.to_decimal(),
            data_jogo: order.scheduled_date_time.clone(),
        }
    }
}

/// Builds the discount table from `{label: percentage}`.
///
/// Entries whose percentage is not a number in 0–100 are skipped.
pub fn discount_table(raw: serde_json::Map<String, Value>) -> DiscountTable {
    raw.into_iter()
        .filter_map(|(label, value)| {
            match decimal_from_value(&value).map(DiscountRate::from_decimal_percentage) {
                Some(Ok(rate)) => Some((label, rate)),
                _ => {
                    warn!(%label, %value, "Skipping discount with unusable percentage");
                    None
                }
            }
        })
        .collect()
}

// =============================================================================
// Lenient decoding
// =============================================================================

fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Value::String(s) => {
            let s = s.trim().replace(',', ".");
            Decimal::from_str(&s).ok()
        }
        _ => None,
    }
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decimal_from_value(&value))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

// =============================================================================
// HTTP implementation
// =============================================================================

/// `Backend` over the venue's HTTP functions.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: HttpClient,
    config: ClientConfig,
}

impl HttpBackend {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let http = HttpClient::new(config.base_url.clone(), config.timeout, &[])?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn catalog(&self) -> ClientResult<Vec<CatalogItem>> {
        let items: Vec<CatalogItemDto> = self.http.get(&self.config.catalog_path).await?;
        let items: Vec<CatalogItem> = items
            .into_iter()
            .map(CatalogItemDto::into_catalog_item)
            .collect();
        debug!(count = items.len(), "Catalog fetched");
        Ok(items)
    }

    async fn discounts(&self) -> ClientResult<DiscountTable> {
        let raw: serde_json::Map<String, Value> =
            self.http.get(&self.config.discounts_path).await?;
        let table = discount_table(raw);
        debug!(count = table.len(), "Discounts fetched");
        Ok(table)
    }

    async fn post_order(&self, order: &OrderRequest) -> ClientResult<()> {
        let payload = OrderPayload::from(order);
        self.http
            .post_json(&self.config.orders_path, &payload)
            .await?;
        info!(
            customer = %order.customer_name,
            tender = order.tender.wire_name(),
            total = %order.total,
            "Order posted"
        );
        Ok(())
    }
}
