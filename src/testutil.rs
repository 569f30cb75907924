use crate::data::{parse_date, SaleRecord};

fn coordinates(location: &str) -> (f64, f64) {
    match location {
        "SP" => (-22.19, -48.79),
        "RJ" => (-22.25, -42.66),
        "MG" => (-18.10, -44.38),
        "BA" => (-13.29, -41.71),
        _ => (0.0, 0.0),
    }
}

pub fn sale(
    seller: &str,
    category: &str,
    product: &str,
    payment_type: &str,
    price: f64,
    date: &str,
    location: &str,
) -> SaleRecord {
    let (latitude, longitude) = coordinates(location);
    SaleRecord {
        seller: seller.to_string(),
        category: category.to_string(),
        product: product.to_string(),
        payment_type: payment_type.to_string(),
        price,
        freight: price / 10.0,
        purchase_date: parse_date(date).unwrap(),
        location: location.to_string(),
        latitude,
        longitude,
        rating: 5,
    }
}

pub fn rated(mut record: SaleRecord, rating: u8) -> SaleRecord {
    record.rating = rating;
    record
}

/// Ten sales over Jan, Mar and Apr 2020 (no sales in Feb).
///
/// Totals: price 4655, freight 465.5.
/// Region: SP 3000, MG 845, RJ 460, BA 350.
/// Category: eletronicos 3320, moveis 1150, livros 185.
/// Seller: Ana 1955 (4), Bruno 1640 (3), Carla 1060 (3).
pub fn sample_dataset() -> Vec<SaleRecord> {
    vec![
        rated(
            sale("Ana", "eletronicos", "Celular", "cartao_credito", 1500.0, "2020-01-05", "SP"),
            5,
        ),
        rated(sale("Bruno", "livros", "Livro A", "boleto", 40.0, "2020-01-12", "RJ"), 4),
        rated(sale("Ana", "livros", "Livro B", "boleto", 60.0, "2020-01-20", "SP"), 5),
        rated(sale("Carla", "moveis", "Mesa", "cartao_credito", 800.0, "2020-03-02", "MG"), 3),
        rated(sale("Bruno", "eletronicos", "Fone", "cupom", 200.0, "2020-03-15", "RJ"), 1),
        rated(sale("Ana", "moveis", "Cadeira", "cartao_debito", 350.0, "2020-03-15", "BA"), 4),
        rated(sale("Carla", "livros", "Livro A", "cartao_credito", 40.0, "2020-04-01", "SP"), 5),
        rated(
            sale("Bruno", "eletronicos", "Celular", "cartao_credito", 1400.0, "2020-04-18", "SP"),
            2,
        ),
        rated(sale("Ana", "livros", "Livro A", "boleto", 45.0, "2020-04-30", "MG"), 5),
        rated(sale("Carla", "eletronicos", "Fone", "cartao_debito", 220.0, "2020-04-30", "RJ"), 4),
    ]
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
