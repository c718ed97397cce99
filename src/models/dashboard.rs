// src/models/dashboard.rs

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// 1. Visão geral (cards do topo + gráficos)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub bags_by_status: BTreeMap<String, i64>,
    pub total_in_stock: i64, // Tudo que ainda não foi vendido
    pub monthly_revenue: Decimal,
    pub monthly_margin: Decimal,
    pub sales_count: i64, // Vendas do mês corrente
    pub recent_sales: Vec<RecentSale>,
    pub chart_data: Vec<MonthlyEntry>,
    pub platform_chart_data: Vec<PlatformEntry>,
    pub top_brands: Vec<BrandEntry>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

// 2. Últimas vendas
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentSale {
    pub id: Uuid,
    pub sale_price: Decimal,
    pub margin: Decimal,
    pub sale_date: NaiveDate,
    pub bag_brand: Option<String>,
    pub bag_model: Option<String>,
    pub bag_reference: Option<String>,
}

// 3. Gráfico mensal (últimos 6 meses)
#[derive(Debug, Serialize, FromRow)]
pub struct MonthlyRow {
    pub year: i32,
    pub month: i32,
    pub revenue: Decimal,
    pub margin: Decimal,
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct MonthlyEntry {
    pub month: String,
    pub revenue: Decimal,
    pub margin: Decimal,
}

// 4. Receita por plataforma
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct PlatformEntry {
    pub name: String,
    pub value: Decimal,
    pub count: i64,
}

// 5. Top marcas por receita
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct BrandEntry {
    pub brand: String,
    pub revenue: Decimal,
    pub margin: Decimal,
    pub count: i64,
}
