use crate::domain::cart::CartLine;
use crate::domain::product::Product;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct LineRecord<'a> {
    product_id: &'a str,
    name: &'a str,
    category: &'a str,
    unit_price: Decimal,
    quantity: u32,
    line_total: Decimal,
}

#[derive(Serialize)]
struct ProductRecord<'a> {
    id: &'a str,
    name: &'a str,
    category: &'a str,
    price: Decimal,
    stock: u32,
}

#[derive(Serialize)]
struct TotalsRecord {
    total_items: u64,
    subtotal: Decimal,
}

/// Writes cart contents and catalog listings as CSV.
pub struct CartWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CartWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_lines(&mut self, lines: &[CartLine]) -> Result<()> {
        for line in lines {
            self.writer.serialize(LineRecord {
                product_id: line.product_id.as_str(),
                name: &line.name,
                category: &line.category,
                unit_price: line.unit_price.value().normalize(),
                quantity: line.quantity.get(),
                line_total: line.line_total().normalize(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_totals(&mut self, total_items: u64, subtotal: Decimal) -> Result<()> {
        self.writer.serialize(TotalsRecord {
            total_items,
            subtotal: subtotal.normalize(),
        })?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_products(&mut self, products: &[Product]) -> Result<()> {
        for product in products {
            self.writer.serialize(ProductRecord {
                id: product.id.as_str(),
                name: &product.name,
                category: &product.category,
                price: product.price.value().normalize(),
                stock: product.quantity,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
