use log::info;
use serde::Serialize;
use serde_json::{json, Value};

use crate::aggregate::{
    self, rating_distribution, revenue_by_category, revenue_by_date, revenue_by_month,
    revenue_by_payment_type, revenue_by_region, revenue_by_region_and_category,
    revenue_by_seller, top_n, top_products, DailyRevenue, FormattedSummary, GroupTotal, Measure,
    MonthlyRevenue, PivotTable, RatingCount, RegionRevenue, SalesSummary,
};
use crate::chart::{ChartData, ChartType};
use crate::config::DashboardConfig;
use crate::data::SaleRecord;
use crate::error::Result;
use crate::filter::{apply_filters, FilterCriteria};

/// Rows kept by the top-N bar charts (regions, categories, sellers)
pub const TOP_N: usize = 7;
/// Rows kept by the best-selling products chart
pub const TOP_PRODUCTS: usize = 10;

/// Detail tables for a single seller.
///
/// A dashboard holds one per selected seller, ordered by seller name rather
/// than by selection order, since the selection is a set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SellerBreakdown {
    pub seller: String,
    pub summary: SalesSummary,
    pub metrics: FormattedSummary,
    pub by_category: Vec<GroupTotal>,
    pub by_payment_type: Vec<GroupTotal>,
    pub daily: Vec<DailyRevenue>,
}

pub fn seller_breakdown(records: &[SaleRecord], seller: &str, prefix: &str) -> SellerBreakdown {
    let sales = apply_filters(records, &FilterCriteria::new().with_seller(seller));
    let summary = aggregate::summary(&sales);
    SellerBreakdown {
        seller: seller.to_string(),
        metrics: summary.formatted(prefix),
        summary,
        by_category: revenue_by_category(&sales),
        by_payment_type: revenue_by_payment_type(&sales),
        daily: revenue_by_date(&sales),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub criteria: FilterCriteria,
    pub dataset_size: usize,
    pub summary: SalesSummary,
    pub metrics: FormattedSummary,
    pub revenue_by_region: Vec<RegionRevenue>,
    pub top_regions: Vec<RegionRevenue>,
    pub revenue_by_month: Vec<MonthlyRevenue>,
    pub top_categories: Vec<GroupTotal>,
    pub top_sellers_by_revenue: Vec<GroupTotal>,
    pub top_sellers_by_count: Vec<GroupTotal>,
    pub top_products: Vec<GroupTotal>,
    pub ratings: Vec<RatingCount>,
    pub region_category: PivotTable,
    /// One entry per selected seller, sorted by name
    pub seller_breakdowns: Vec<SellerBreakdown>,
    #[serde(skip)]
    config: DashboardConfig,
}

impl Dashboard {
    pub fn build(
        dataset: &[SaleRecord],
        criteria: &FilterCriteria,
        config: &DashboardConfig,
    ) -> Result<Self> {
        let records = apply_filters(dataset, criteria);
        let prefix = config.currency_prefix.as_str();
        let summary = aggregate::summary(&records);
        let regions = revenue_by_region(&records);
        let sellers = revenue_by_seller(&records);

        let dashboard = Self {
            criteria: criteria.clone(),
            dataset_size: dataset.len(),
            metrics: summary.formatted(prefix),
            summary,
            top_regions: top_n(&regions, Measure::Revenue, TOP_N),
            revenue_by_region: regions,
            revenue_by_month: revenue_by_month(&records),
            top_categories: top_n(
                &revenue_by_category(&records),
                Measure::Revenue,
                TOP_N,
            ),
            top_sellers_by_revenue: top_n(&sellers, Measure::Revenue, TOP_N),
            top_sellers_by_count: top_n(&sellers, Measure::Count, TOP_N),
            top_products: top_products(&records, TOP_PRODUCTS),
            ratings: rating_distribution(&records),
            region_category: revenue_by_region_and_category(&records)?,
            seller_breakdowns: criteria
                .sellers
                .iter()
                .map(|seller| seller_breakdown(&records, seller, prefix))
                .collect(),
            config: config.clone(),
        };

        info!(
            "Dashboard built from {} of {} records",
            dashboard.summary.sale_count, dashboard.dataset_size
        );
        Ok(dashboard)
    }

    /// Chart payloads for every table, rows capped at `max_chart_rows`
    pub fn charts(&self) -> Vec<ChartData> {
        let n = TOP_N;
        let mut charts = vec![
            ChartData::new(
                "Receita por Estado",
                ChartType::Map,
                "region",
                "revenue",
                &["region", "latitude", "longitude", "revenue"],
            )
            .with_rows(
                self.revenue_by_region
                    .iter()
                    .map(|r| {
                        vec![
                            json!(r.region),
                            json!(r.latitude),
                            json!(r.longitude),
                            json!(r.revenue),
                        ]
                    })
                    .collect(),
            ),
            ChartData::new(
                "Receita Mensal",
                ChartType::Line,
                "month_name",
                "revenue",
                &["month_name", "year", "revenue"],
            )
            .with_series("year")
            .with_rows(
                self.revenue_by_month
                    .iter()
                    .map(|m| vec![json!(m.month_name), json!(m.year), json!(m.revenue)])
                    .collect(),
            )
            .with_zero_based_y(),
            ChartData::new(
                "Top Receita por Estados",
                ChartType::Bar,
                "region",
                "revenue",
                &["region", "revenue"],
            )
            .with_rows(
                self.top_regions
                    .iter()
                    .map(|r| vec![json!(r.region), json!(r.revenue)])
                    .collect(),
            ),
            group_chart(
                format!("Top {n} Categorias com Maior Receita"),
                ChartType::Bar,
                "category",
                Measure::Revenue,
                &self.top_categories,
            ),
            group_chart(
                format!("Top {n} Vendedores por Receita"),
                ChartType::Bar,
                "seller",
                Measure::Revenue,
                &self.top_sellers_by_revenue,
            ),
            group_chart(
                format!("Top {n} Vendedores por Venda"),
                ChartType::Bar,
                "seller",
                Measure::Count,
                &self.top_sellers_by_count,
            ),
            group_chart(
                format!("Top {TOP_PRODUCTS} Produtos Mais Vendidos"),
                ChartType::Bar,
                "product",
                Measure::Count,
                &self.top_products,
            ),
            ChartData::new(
                "Distribuição das Avaliações",
                ChartType::Histogram,
                "rating",
                "count",
                &["rating", "count"],
            )
            .with_rows(
                self.ratings
                    .iter()
                    .map(|r| vec![json!(r.rating), json!(r.count)])
                    .collect(),
            ),
            heatmap_chart(&self.region_category),
        ];

        for breakdown in &self.seller_breakdowns {
            let seller = &breakdown.seller;
            charts.push(group_chart(
                format!("Vendas por Categoria - {seller}"),
                ChartType::Pie,
                "category",
                Measure::Revenue,
                &breakdown.by_category,
            ));
            charts.push(group_chart(
                format!("Vendas por Tipo de Pagamento - {seller}"),
                ChartType::Bar,
                "payment_type",
                Measure::Revenue,
                &breakdown.by_payment_type,
            ));
            charts.push(
                ChartData::new(
                    format!("Evolução das Vendas - {seller}"),
                    ChartType::Line,
                    "date",
                    "revenue",
                    &["date", "revenue"],
                )
                .with_rows(
                    breakdown
                        .daily
                        .iter()
                        .map(|d| vec![json!(d.date.to_string()), json!(d.revenue)])
                        .collect(),
                ),
            );
        }

        for chart in &mut charts {
            chart.apply_row_limit(self.config.max_chart_rows);
        }
        charts
    }
}

fn group_chart(
    title: String,
    chart_type: ChartType,
    key: &str,
    measure: Measure,
    rows: &[GroupTotal],
) -> ChartData {
    let y_field = match measure {
        Measure::Revenue => "revenue",
        Measure::Count => "count",
    };
    let value = |g: &GroupTotal| -> Value {
        match measure {
            Measure::Revenue => json!(g.revenue),
            Measure::Count => json!(g.count),
        }
    };
    ChartData::new(title, chart_type, key, y_field, &[key, y_field])
        .with_rows(rows.iter().map(|g| vec![json!(g.key), value(g)]).collect())
}

/// Long-form (row, column, value) rows of a pivot table
fn heatmap_chart(pivot: &PivotTable) -> ChartData {
    let rows = pivot
        .rows
        .iter()
        .zip(&pivot.values)
        .flat_map(|(row, values)| {
            pivot
                .columns
                .iter()
                .zip(values)
                .map(move |(column, value)| vec![json!(row), json!(column), json!(value)])
        })
        .collect();
    ChartData::new(
        "Mapa de Calor: Vendas por Estado e Categoria",
        ChartType::Heatmap,
        "category",
        "region",
        &["region", "category", "revenue"],
    )
    .with_rows(rows)
}
