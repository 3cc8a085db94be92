use tabled::builder::Builder;
use tabled::{Table, Tabled};
use trippin_lib::local::Projection;
use trippin_lib::scenarios::EntityCounts;
use trippin_lib::types::{Airline, Person, Trip};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Tabled)]
struct PersonRow {
    #[tabled(rename = "User Name")]
    user_name: String,
    #[tabled(rename = "First Name")]
    first_name: String,
    #[tabled(rename = "Last Name")]
    last_name: String,
    #[tabled(rename = "Gender")]
    gender: String,
    #[tabled(rename = "Emails")]
    emails: String,
    #[tabled(rename = "Trips")]
    trips: String,
}

#[derive(Tabled)]
struct TripRow {
    #[tabled(rename = "Id")]
    trip_id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Budget")]
    budget: String,
    #[tabled(rename = "Starts")]
    starts_at: String,
    #[tabled(rename = "Ends")]
    ends_at: String,
}

#[derive(Tabled)]
struct AirlineRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
}

#[derive(Tabled)]
struct UserNameRow {
    #[tabled(rename = "User Name")]
    user_name: String,
}

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Entity Set")]
    entity_set: String,
    #[tabled(rename = "Count")]
    count: u64,
}

// -- Row builders --

fn build_person_rows(people: &[Person]) -> Vec<PersonRow> {
    people
        .iter()
        .map(|p| PersonRow {
            user_name: p.user_name.clone(),
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            gender: p.gender.map(|g| g.to_string()).unwrap_or_default(),
            emails: p.emails.join(", "),
            trips: p
                .trips
                .as_loaded()
                .map(|trips| trips.len().to_string())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect()
}

fn build_trip_rows(trips: &[Trip]) -> Vec<TripRow> {
    trips
        .iter()
        .map(|t| TripRow {
            trip_id: t.trip_id,
            name: t.name.clone(),
            description: t.description.clone().unwrap_or_default(),
            budget: format_budget(t.budget),
            starts_at: t.starts_at.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            ends_at: t.ends_at.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
        })
        .collect()
}

fn build_airline_rows(airlines: &[Airline]) -> Vec<AirlineRow> {
    airlines
        .iter()
        .map(|a| AirlineRow {
            code: a.airline_code.clone(),
            name: a.name.clone(),
        })
        .collect()
}

fn build_count_rows(counts: &EntityCounts) -> Vec<CountRow> {
    vec![
        CountRow {
            entity_set: "People".to_string(),
            count: counts.people,
        },
        CountRow {
            entity_set: "Airlines".to_string(),
            count: counts.airlines,
        },
    ]
}

fn build_projection_table(fields: &[&str], rows: &[Projection]) -> Table {
    let mut builder = Builder::default();
    builder.push_record(fields.iter().map(|f| f.to_string()));
    for row in rows {
        builder.push_record(row.iter().map(|(_, value)| json_value_text(value)));
    }
    builder.build()
}

// -- Table output --

pub fn print_people_table(people: &[Person]) {
    println!("{}", Table::new(build_person_rows(people)));
}

pub fn print_trips_table(trips: &[Trip]) {
    println!("{}", Table::new(build_trip_rows(trips)));
}

pub fn print_airlines_table(airlines: &[Airline]) {
    println!("{}", Table::new(build_airline_rows(airlines)));
}

pub fn print_user_names_table(names: &[String]) {
    let rows: Vec<UserNameRow> = names
        .iter()
        .map(|n| UserNameRow {
            user_name: n.clone(),
        })
        .collect();
    println!("{}", Table::new(rows));
}

pub fn print_counts_table(counts: &EntityCounts) {
    println!("{}", Table::new(build_count_rows(counts)));
}

pub fn print_projection_table(fields: &[&str], rows: &[Projection]) {
    println!("{}", build_projection_table(fields, rows));
}

// -- JSON output --

pub fn projections_to_json(rows: &[Projection]) -> Vec<serde_json::Map<String, serde_json::Value>> {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect()
        })
        .collect()
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

fn format_budget(budget: f64) -> String {
    format!("${:.2}", budget)
}

fn json_value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
