use serde::Deserialize;
use serde_json::json;

use storefront_core::Entity;
use storefront_inventory::{
    Direction, InventoryTransaction, Product, Reservation, SizeStock, StockAlert, StockStatus,
};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    pub quantity: u32,
    pub operation: Direction,
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    #[serde(default)]
    pub unresolved: bool,
}

// -------------------------
// Response mapping
// -------------------------

pub fn size_to_json(size: &str, slot: &SizeStock) -> serde_json::Value {
    let status = StockStatus::of(slot.available());
    json!({
        "size": size,
        "stock": slot.stock(),
        "reserved": slot.reserved(),
        "available": slot.available(),
        "status": status,
        "purchasable": status.purchasable(),
        "unit_price_cents": slot.unit_price().cents(),
    })
}

pub fn product_to_json(p: &Product) -> serde_json::Value {
    let levels = p.levels();
    json!({
        "id": p.id(),
        "name": p.name(),
        "brand": p.brand(),
        "sku": p.sku(),
        "category": p.category(),
        "supplier": p.supplier(),
        "lead_time_days": p.lead_time_days(),
        "cost_price_cents": p.cost_price().cents(),
        "min_stock": levels.min_stock,
        "max_stock": levels.max_stock,
        "reorder_point": levels.reorder_point,
        "sizes": p
            .sizes()
            .map(|(label, slot)| size_to_json(label.as_str(), slot))
            .collect::<Vec<_>>(),
    })
}

pub fn reservation_to_json(r: &Reservation) -> serde_json::Value {
    json!({
        "id": r.id,
        "product_id": r.key.product,
        "size": r.key.size,
        "quantity": r.quantity,
        "state": r.state,
        "reserved_at": r.reserved_at,
        "expires_at": r.expires_at,
    })
}

pub fn transaction_to_json(t: &InventoryTransaction) -> serde_json::Value {
    json!({
        "id": t.id,
        "product_id": t.product,
        "size": t.size,
        "quantity": t.quantity,
        "operation": t.direction,
        "timestamp": t.occurred_at,
        "user": t.actor,
    })
}

/// Alert with its display text; `product_name` falls back to the id.
pub fn alert_to_json(a: &StockAlert, product_name: Option<&str>) -> serde_json::Value {
    json!({
        "id": a.id,
        "product_id": a.product,
        "size": a.size,
        "type": a.kind,
        "title": a.kind.title(),
        "message": a.message(product_name),
        "timestamp": a.created_at,
        "resolved": a.resolved,
    })
}
