//! # Catalog Commands
//!
//! Fetches the stock catalog and discount table when a board is mounted,
//! and lists them.

use serde::Serialize;
use tracing::{debug, error, info};

use courtside_core::{CatalogItem, DiscountRate};

use crate::error::ApiError;
use crate::state::{BoardState, RemoteState};

/// What a refresh installed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRefresh {
    pub items: usize,
    pub discounts: usize,
}

/// Catalog of the active board plus the discount table.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogView {
    pub items: Vec<CatalogItem>,
    pub discounts: Vec<(String, DiscountRate)>,
}

/// Fetches the catalog for the active board and the discount table.
///
/// Each list is replaced only when its fetch succeeds; a failed fetch
/// leaves the previous list in place and is reported after the other one
/// has been applied.
pub async fn refresh_catalog(
    boards: &BoardState,
    remote: &RemoteState,
) -> Result<CatalogRefresh, ApiError> {
    debug!("refresh_catalog command");
    let catalog = remote.backend().catalog().await;
    let discounts = remote.backend().discounts().await;

    let kind = boards.with_boards(|b| b.active());
    let mut failure: Option<ApiError> = None;
    let mut refresh = boards.with_boards(|b| CatalogRefresh {
        items: b.active_board().catalog().len(),
        discounts: b.discounts().len(),
    });

    match catalog {
        Ok(items) => {
            refresh.items = items.len();
            boards.with_board_mut(kind, |b| b.replace_catalog(items));
        }
        Err(e) => {
            error!(error = %e, "Catalog fetch failed");
            failure = Some(e.into());
        }
    }

    match discounts {
        Ok(table) => {
            refresh.discounts = table.len();
            boards.with_boards_mut(|b| b.set_discounts(table));
        }
        Err(e) => {
            error!(error = %e, "Discount fetch failed");
            failure.get_or_insert(e.into());
        }
    }

    if let Some(failure) = failure {
        return Err(failure);
    }

    info!(kind = %kind, items = refresh.items, discounts = refresh.discounts, "Catalog loaded");
    Ok(refresh)
}

/// Lists the active board's catalog and the discount table.
pub fn get_catalog(boards: &BoardState) -> CatalogView {
    boards.with_boards(|b| CatalogView {
        items: b.active_board().catalog().to_vec(),
        discounts: b
            .discounts()
            .iter()
            .map(|(label, rate)| (label.to_string(), rate))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{catalog_item, Harness};
    use crate::error::ErrorCode;
    use courtside_core::TicketKind;

    #[tokio::test]
    async fn test_refresh_installs_catalog_on_active_board() {
        let h = Harness::new();
        h.backend
            .set_catalog(vec![catalog_item("Coke", 500), catalog_item("Chips", 350)]);
        h.backend.set_discount("Member", 1000);

        let refresh = refresh_catalog(&h.boards, &h.remote).await.unwrap();
        assert_eq!(refresh, CatalogRefresh { items: 2, discounts: 1 });

        let view = get_catalog(&h.boards);
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.discounts[0].0, "Member");
        assert!(h
            .boards
            .with_board(TicketKind::WalkIn, |b| b.catalog().is_empty()));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_catalog() {
        let h = Harness::new();
        h.load_catalog(vec![catalog_item("Coke", 500)]);
        h.backend.set_failing(true);

        let err = refresh_catalog(&h.boards, &h.remote).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BackendError);
        assert_eq!(get_catalog(&h.boards).items.len(), 1);
    }
}
