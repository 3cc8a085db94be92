use anyhow::Result;
use trippin_lib::{scenarios, validation, TripPinClient};

use super::people::NameArgs;
use crate::output::{print_json, print_people_table, print_trips_table, OutputFormat};

pub async fn run_my_trips(client: &TripPinClient, format: &OutputFormat) -> Result<()> {
    let me = scenarios::my_trips(client).await?;
    match format {
        OutputFormat::Table => {
            println!("{} {} ({})", me.first_name, me.last_name, me.user_name);
            print_trips_table(me.trips.as_loaded().unwrap_or_default());
        }
        OutputFormat::Json => print_json(&me),
    }
    Ok(())
}

pub async fn run_expanded(args: &NameArgs, client: &TripPinClient, format: &OutputFormat) -> Result<()> {
    let name = validation::validate_name(&args.name)?;
    let people = scenarios::people_with_trips(client, &name).await?;
    match format {
        OutputFormat::Table => {
            print_people_table(&people);
            for person in &people {
                println!("Trips of {}:", person.user_name);
                print_trips_table(person.trips.as_loaded().unwrap_or_default());
            }
        }
        OutputFormat::Json => print_json(&people),
    }
    Ok(())
}
