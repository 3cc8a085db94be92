use anyhow::Result;
use serde::Serialize;
use trippin_lib::types::{Airline, Person};
use trippin_lib::{scenarios, TripPinClient};

use crate::output::{
    print_airlines_table, print_counts_table, print_json, print_people_table, OutputFormat,
};

#[derive(Serialize)]
struct BatchOutput<'a> {
    people: PartOutput<'a, Person>,
    airlines: PartOutput<'a, Airline>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum PartOutput<'a, T> {
    Ok(&'a [T]),
    Err { error: String },
}

impl<'a, T> PartOutput<'a, T> {
    fn new(part: &'a Result<Vec<T>, trippin_lib::TripPinError>) -> Self {
        match part {
            Ok(items) => PartOutput::Ok(items),
            Err(e) => PartOutput::Err {
                error: e.to_string(),
            },
        }
    }
}

pub async fn run_batch(client: &TripPinClient, format: &OutputFormat) -> Result<()> {
    let outcome = scenarios::people_and_airlines(client).await?;
    match format {
        OutputFormat::Table => {
            match &outcome.people {
                Ok(people) => print_people_table(people),
                Err(e) => eprintln!("People part failed: {}", e),
            }
            match &outcome.airlines {
                Ok(airlines) => print_airlines_table(airlines),
                Err(e) => eprintln!("Airlines part failed: {}", e),
            }
        }
        OutputFormat::Json => print_json(&BatchOutput {
            people: PartOutput::new(&outcome.people),
            airlines: PartOutput::new(&outcome.airlines),
        }),
    }
    Ok(())
}

pub async fn run_counts(client: &TripPinClient, format: &OutputFormat) -> Result<()> {
    let counts = scenarios::entity_counts(client).await?;
    match format {
        OutputFormat::Table => print_counts_table(&counts),
        OutputFormat::Json => print_json(&counts),
    }
    Ok(())
}
