use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SalesError;

/// One sale from the dataset. Immutable once loaded.
///
/// Field names follow the column headers of the source dataset, so rows
/// exported from it deserialize directly. The snake_case names are
/// accepted as aliases.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SaleRecord {
    #[serde(rename = "Vendedor", alias = "seller")]
    pub seller: String,
    #[serde(rename = "Categoria do Produto", alias = "category")]
    pub category: String,
    #[serde(rename = "Produto", alias = "product")]
    pub product: String,
    #[serde(rename = "Tipo de pagamento", alias = "payment_type")]
    pub payment_type: String,
    #[serde(rename = "Preço", alias = "price")]
    pub price: f64,
    #[serde(rename = "Frete", alias = "freight")]
    pub freight: f64,
    /// Accepts `dd/mm/yyyy` (dataset format) or ISO `yyyy-mm-dd`
    #[serde(
        rename = "Data da Compra",
        alias = "purchase_date",
        deserialize_with = "deserialize_date"
    )]
    pub purchase_date: NaiveDate,
    /// Region/state where the purchase was made
    #[serde(rename = "Local da compra", alias = "location")]
    pub location: String,
    #[serde(rename = "lat", alias = "latitude")]
    pub latitude: f64,
    #[serde(rename = "lon", alias = "longitude")]
    pub longitude: f64,
    #[serde(rename = "Avaliação da compra", alias = "rating")]
    pub rating: u8,
}

impl SaleRecord {
    /// Value of a categorical column, `None` for numeric and date columns
    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::Seller => Some(&self.seller),
            Field::Category => Some(&self.category),
            Field::Product => Some(&self.product),
            Field::PaymentType => Some(&self.payment_type),
            Field::Location => Some(&self.location),
            _ => None,
        }
    }

    /// Value of a numeric column, `None` for text and date columns
    pub fn number(&self, field: Field) -> Option<f64> {
        match field {
            Field::Price => Some(self.price),
            Field::Freight => Some(self.freight),
            Field::Latitude => Some(self.latitude),
            Field::Longitude => Some(self.longitude),
            Field::Rating => Some(f64::from(self.rating)),
            _ => None,
        }
    }
}

/// Parse a purchase date in either of the accepted formats
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid purchase date: {raw}")))
}

/// A column of the sales dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Seller,
    Category,
    Product,
    PaymentType,
    Price,
    Freight,
    PurchaseDate,
    Location,
    Latitude,
    Longitude,
    Rating,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::Seller,
        Field::Category,
        Field::Product,
        Field::PaymentType,
        Field::Price,
        Field::Freight,
        Field::PurchaseDate,
        Field::Location,
        Field::Latitude,
        Field::Longitude,
        Field::Rating,
    ];

    /// Numeric columns in dataset order
    pub const NUMERIC: [Field; 5] = [
        Field::Price,
        Field::Freight,
        Field::Latitude,
        Field::Longitude,
        Field::Rating,
    ];

    /// Column header as it appears in the dataset
    pub fn header(&self) -> &'static str {
        match self {
            Field::Seller => "Vendedor",
            Field::Category => "Categoria do Produto",
            Field::Product => "Produto",
            Field::PaymentType => "Tipo de pagamento",
            Field::Price => "Preço",
            Field::Freight => "Frete",
            Field::PurchaseDate => "Data da Compra",
            Field::Location => "Local da compra",
            Field::Latitude => "lat",
            Field::Longitude => "lon",
            Field::Rating => "Avaliação da compra",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Field::Seller => "seller",
            Field::Category => "category",
            Field::Product => "product",
            Field::PaymentType => "payment_type",
            Field::Price => "price",
            Field::Freight => "freight",
            Field::PurchaseDate => "purchase_date",
            Field::Location => "location",
            Field::Latitude => "latitude",
            Field::Longitude => "longitude",
            Field::Rating => "rating",
        }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(
            self,
            Field::Seller | Field::Category | Field::Product | Field::PaymentType | Field::Location
        )
    }

    pub fn is_numeric(&self) -> bool {
        Field::NUMERIC.contains(self)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for Field {
    type Err = SalesError;

    /// Accepts the dataset header or the snake_case name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.header() == s || f.name() == s)
            .ok_or_else(|| SalesError::UnknownColumn(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sale;

    #[test]
    fn parse_dataset_row() {
        let json = r#"{
            "Produto": "Modelagem preditiva",
            "Categoria do Produto": "livros",
            "Preço": 92.45,
            "Frete": 5.6096965236,
            "Data da Compra": "01/01/2020",
            "Vendedor": "Thiago Silva",
            "Local da compra": "BA",
            "Avaliação da compra": 1,
            "Tipo de pagamento": "cartao_credito",
            "lat": -13.29,
            "lon": -41.71
        }"#;
        let record: SaleRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.seller, "Thiago Silva");
        assert_eq!(record.location, "BA");
        assert_eq!(record.purchase_date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(record.rating, 1);
    }

    #[test]
    fn parse_snake_case_row() {
        let json = r#"{
            "product": "Celular",
            "category": "eletronicos",
            "price": 1200.0,
            "freight": 30.0,
            "purchase_date": "2021-03-15",
            "seller": "Ana",
            "location": "SP",
            "rating": 5,
            "payment_type": "boleto",
            "latitude": -22.19,
            "longitude": -48.79
        }"#;
        let record: SaleRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.purchase_date, NaiveDate::from_ymd_opt(2021, 3, 15).unwrap());
        assert_eq!(record.payment_type, "boleto");
    }

    #[test]
    fn reject_bad_date() {
        let json = r#"{
            "product": "x", "category": "x", "price": 1.0, "freight": 0.0,
            "purchase_date": "15.03.2021", "seller": "x", "location": "x",
            "rating": 1, "payment_type": "x", "latitude": 0.0, "longitude": 0.0
        }"#;
        assert!(serde_json::from_str::<SaleRecord>(json).is_err());
    }

    #[test]
    fn field_from_header_or_name() {
        assert_eq!("Preço".parse::<Field>().unwrap(), Field::Price);
        assert_eq!("payment_type".parse::<Field>().unwrap(), Field::PaymentType);
        assert!(matches!(
            "Quantidade".parse::<Field>(),
            Err(SalesError::UnknownColumn(name)) if name == "Quantidade"
        ));
    }

    #[test]
    fn column_accessors() {
        let record = sale("Ana", "livros", "Livro A", "boleto", 50.0, "2020-01-10", "SP");
        assert_eq!(record.text(Field::Seller), Some("Ana"));
        assert_eq!(record.text(Field::Price), None);
        assert_eq!(record.number(Field::Price), Some(50.0));
        assert_eq!(record.number(Field::PurchaseDate), None);
        assert!(Field::Location.is_categorical());
        assert!(!Field::PurchaseDate.is_categorical());
        assert!(!Field::PurchaseDate.is_numeric());
    }
}
