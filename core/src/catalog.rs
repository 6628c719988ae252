//! Resource configurations for the dashboard's entities.

use crate::resource::{FieldKind, ResourceConfig};

/// Monthly sales goals.
pub fn metas() -> ResourceConfig {
    ResourceConfig::builder("product15")
        .required("vendedor", FieldKind::Text)
        .required("ano", FieldKind::Integer)
        .required("mes", FieldKind::Text)
        .decimal("meta")
        .decimal("alcanzado")
        .export_name("metas.xlsx")
        .build()
}

/// Sales review rows imported from the ERP.
pub fn sales_review() -> ResourceConfig {
    ResourceConfig::builder("ventas")
        .id_field("id_registro")
        .required("cliente", FieldKind::Text)
        .text("producto")
        .integer("cantidad")
        .decimal("total")
        .text("fecha")
        .export_name("ventas.xlsx")
        .build()
}

/// Inventory products.
pub fn products() -> ResourceConfig {
    ResourceConfig::builder("productos")
        .required("nombre", FieldKind::Text)
        .text("sku")
        .decimal("precio")
        .integer("stock")
        .export_name("productos.xlsx")
        .build()
}

/// Support tickets.
pub fn tickets() -> ResourceConfig {
    ResourceConfig::builder("tickets")
        .required("asunto", FieldKind::Text)
        .text("descripcion")
        .text("estado")
        .text("prioridad")
        .export_name("tickets.xlsx")
        .build()
}

/// Commerce-platform products proxied by the backend; listing only.
pub fn shopify_products() -> ResourceConfig {
    ResourceConfig::builder("shopify/products")
        .text("title")
        .text("vendor")
        .decimal("price")
        .read_only()
        .build()
}

pub fn all() -> Vec<ResourceConfig> {
    vec![metas(), sales_review(), products(), tickets(), shopify_products()]
}
