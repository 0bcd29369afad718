//! Classification Example
//!
//! Shows how soil readings are graded against the agronomic reference bands,
//! and how to tighten a band for a crop that needs it.
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 02_classification
//! ```

use soilguard_core::{BandTable, ConfigError, Parameter, RangeClassifier, ReferenceBand};

fn main() {
    println!("SoilGuard Classification Example");
    println!("================================\n");

    let classifier = RangeClassifier::default();

    for parameter in Parameter::ALL {
        let band = classifier.table().get(parameter);
        println!(
            "{:<12} optimal {:>5.1}-{:<5.1} warning {:>5.1}-{:<5.1} {}",
            parameter.label(),
            band.optimal.0,
            band.optimal.1,
            band.warning.0,
            band.warning.1,
            parameter.unit(),
        );
    }

    println!("\nSample readings:");
    let samples = [
        ("moisture", 40.0),
        ("moisture", 36.0),
        ("moisture", 10.0),
        ("ph", 6.8),
        ("ec", 2.4),
        ("nitrogen", 29.0),
        ("salinity", 3.0),
    ];
    for (key, value) in samples {
        println!("  {:<10} {:>6.1} → {}", key, value, classifier.classify(value, key).as_str());
    }

    // Blueberries want acidic soil
    println!("\nCustom pH band for blueberries:");
    let table = BandTable::default()
        .with_band(Parameter::Ph, ReferenceBand::new((4.5, 5.5), (4.0, 6.0)));
    match RangeClassifier::new(table) {
        Ok(acidic) => {
            for value in [4.8, 5.8, 6.8] {
                println!("  pH {:.1} → {}", value, acidic.classify_parameter(value, Parameter::Ph).as_str());
            }
        }
        Err(e) => println!("  rejected: {}", e),
    }

    // A warning band that doesn't contain the optimal band is rejected
    let broken = BandTable::default()
        .with_band(Parameter::Ph, ReferenceBand::new((4.5, 5.5), (5.0, 6.0)));
    match RangeClassifier::new(broken) {
        Ok(_) => println!("\nunexpectedly accepted"),
        Err(e @ ConfigError::BandNotNested { .. }) => println!("\nRejected as expected: {}", e),
        Err(e) => println!("\nRejected: {}", e),
    }
}
