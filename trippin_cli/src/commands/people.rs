use anyhow::Result;
use clap::Args;
use trippin_lib::{scenarios, validation, TripPinClient};

use crate::output::{
    print_json, print_people_table, print_projection_table, print_user_names_table,
    projections_to_json, OutputFormat,
};

#[derive(Args)]
pub struct NameArgs {
    /// First name to match exactly
    #[arg(default_value = "Vincent")]
    pub name: String,
}

impl Default for NameArgs {
    fn default() -> Self {
        Self {
            name: "Vincent".to_string(),
        }
    }
}

#[derive(Args)]
pub struct SuffixArgs {
    /// Suffix the first name must end with
    #[arg(default_value = "Clyde")]
    pub suffix: String,
}

impl Default for SuffixArgs {
    fn default() -> Self {
        Self {
            suffix: "Clyde".to_string(),
        }
    }
}

#[derive(Args)]
pub struct UserNameArgs {
    /// User name key (e.g. russellwhyte)
    #[arg(default_value = "russellwhyte")]
    pub user_name: String,
}

impl Default for UserNameArgs {
    fn default() -> Self {
        Self {
            user_name: "russellwhyte".to_string(),
        }
    }
}

pub async fn run_people(client: &TripPinClient, format: &OutputFormat) -> Result<()> {
    let people = scenarios::people_by_first_name(client).await?;
    match format {
        OutputFormat::Table => print_people_table(&people),
        OutputFormat::Json => print_json(&people),
    }
    Ok(())
}

pub async fn run_named(args: &NameArgs, client: &TripPinClient, format: &OutputFormat) -> Result<()> {
    let name = validation::validate_name(&args.name)?;
    let people = scenarios::people_named(client, &name).await?;
    match format {
        OutputFormat::Table => print_people_table(&people),
        OutputFormat::Json => print_json(&people),
    }
    Ok(())
}

pub async fn run_suffix(args: &SuffixArgs, client: &TripPinClient, format: &OutputFormat) -> Result<()> {
    let suffix = validation::validate_name(&args.suffix)?;
    let people = scenarios::people_with_suffix(client, &suffix).await?;
    match format {
        OutputFormat::Table => print_people_table(&people),
        OutputFormat::Json => print_json(&people),
    }
    Ok(())
}

pub async fn run_person(
    args: &UserNameArgs,
    client: &TripPinClient,
    format: &OutputFormat,
) -> Result<()> {
    let user_name = validation::validate_user_name(&args.user_name)?;
    let person = scenarios::person(client, &user_name).await?;
    match format {
        OutputFormat::Table => print_people_table(std::slice::from_ref(&person)),
        OutputFormat::Json => print_json(&person),
    }
    Ok(())
}

pub async fn run_user_names(client: &TripPinClient, format: &OutputFormat) -> Result<()> {
    let names = scenarios::user_names(client).await?;
    match format {
        OutputFormat::Table => print_user_names_table(&names),
        OutputFormat::Json => print_json(&names),
    }
    Ok(())
}

pub async fn run_projection(
    args: &NameArgs,
    client: &TripPinClient,
    format: &OutputFormat,
) -> Result<()> {
    let name = validation::validate_name(&args.name)?;
    let rows = scenarios::male_people_named(client, &name).await?;
    match format {
        OutputFormat::Table => print_projection_table(&scenarios::NAME_PROJECTION, &rows),
        OutputFormat::Json => print_json(&projections_to_json(&rows)),
    }
    Ok(())
}
