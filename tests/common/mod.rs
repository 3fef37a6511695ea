#![allow(dead_code)]

use assert_cmd::cargo_bin;
use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::process::Command;

/// A small catalog: Apple Pie is well stocked, Barfi is sold out.
pub const CATALOG: &str = "id,name,category,price,quantity\n\
                           A,Apple Pie,Bakery,2.50,10\n\
                           B,Barfi,Indian,4,0\n\
                           C,Chocolate Truffle,Chocolate,12,3\n";

pub fn write_catalog(path: &Path) -> Result<(), Error> {
    std::fs::write(path, CATALOG)
}

/// Builds the binary invocation with an isolated cart directory and none of
/// the caller's environment leaking in.
pub fn sweetcart(cart_dir: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin!("sweetcart"));
    for var in [
        "SWEETCART_CART_DIR",
        "SWEETCART_DB_PATH",
        "SWEETCART_API_URL",
        "SWEETCART_TOKEN",
        "SWEETCART_CATALOG",
        "SWEETCART_TIMEOUT_SECS",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.arg("--cart-dir").arg(cart_dir);
    cmd
}

pub fn generate_catalog_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["id", "name", "category", "price", "quantity"])?;

    for i in 1..=rows {
        wtr.write_record([
            format!("p{i}").as_str(),
            format!("Sweet {i}").as_str(),
            ["Bakery", "Indian", "Chocolate"][i % 3],
            format!("{}.{:02}", i % 50, i % 100).as_str(),
            (i % 7).to_string().as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
