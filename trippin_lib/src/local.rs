//! In-memory filtering, ordering and projection of materialized entities.
//!
//! These mirror what the service does for `$filter`, `$orderby` and
//! `$select`, so a query can be evaluated against a snapshot that was
//! already fetched. No network calls happen here.

use std::cmp::Ordering;

use serde::Serialize;
use trippin_api::types::Entity;
use trippin_api::{EntitySetQuery, Filter, OrderKey, SortDirection, Value};

use crate::error::TripPinError;

/// Field name and JSON value pairs, in the order they were requested.
pub type Projection = Vec<(&'static str, serde_json::Value)>;

/// Returns the entities the predicate accepts, keeping their order.
pub fn filter_local<'a, E: Entity>(entities: &'a [E], filter: &Filter) -> Vec<&'a E> {
    entities.iter().filter(|e| filter.matches(*e)).collect()
}

/// Stable sort by each key in turn; the first key is primary.
pub fn sort_local<E: Entity>(entities: &mut [E], keys: &[OrderKey]) {
    entities.sort_by(|a, b| compare_by_keys(a, b, keys));
}

fn compare_by_keys<E: Entity>(a: &E, b: &E, keys: &[OrderKey]) -> Ordering {
    for key in keys {
        let left = a.value(&key.field).unwrap_or(Value::Null);
        let right = b.value(&key.field).unwrap_or(Value::Null);
        let ord = match key.direction {
            SortDirection::Asc => left.compare(&right),
            SortDirection::Desc => right.compare(&left),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Applies a query's predicate, ordering, `$skip` and `$top` to an already
/// fetched snapshot.
///
/// For a stable snapshot this yields the same entities, in the same order,
/// as executing the query against the service. Projection is not applied.
pub fn evaluate<E>(entities: &[E], query: &EntitySetQuery<E>) -> Vec<E>
where
    E: trippin_api::types::EntitySet + Clone,
{
    let mut selected: Vec<E> = match query.predicate() {
        Some(filter) => filter_local(entities, filter).into_iter().cloned().collect(),
        None => entities.to_vec(),
    };
    sort_local(&mut selected, query.order_keys());
    let skip = query.offset().map_or(0, |n| usize::try_from(n).unwrap_or(usize::MAX));
    let take = query.limit().map_or(usize::MAX, |n| usize::try_from(n).unwrap_or(usize::MAX));
    selected.into_iter().skip(skip).take(take).collect()
}

/// Picks the named properties of an entity. Navigation properties that were
/// never loaded project as null.
pub fn project<E: Entity + Serialize>(entity: &E, fields: &[&str]) -> Result<Projection, TripPinError> {
    let json = serde_json::to_value(entity)?;
    fields
        .iter()
        .map(|field| {
            let property = E::property(field).ok_or_else(|| {
                TripPinError::InvalidInput(format!("{} has no property {}", E::TYPE_NAME, field))
            })?;
            let value = json.get(property.name).cloned().unwrap_or(serde_json::Value::Null);
            Ok((property.name, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use trippin_api::types::{Person, PersonGender};

    use super::*;

    fn person(user_name: &str, first: &str, last: &str, gender: PersonGender) -> Person {
        serde_json::from_value(serde_json::json!({
            "UserName": user_name,
            "FirstName": first,
            "LastName": last,
            "Gender": gender.to_string(),
        }))
        .unwrap()
    }

    fn people() -> Vec<Person> {
        vec![
            person("scottketchum", "Scott", "Ketchum", PersonGender::Male),
            person("vincentcalabrese", "Vincent", "Calabrese", PersonGender::Male),
            person("ronaldmundy", "Ronald", "Mundy", PersonGender::Male),
            person("elainestewart", "Elaine", "Stewart", PersonGender::Female),
            person("vincentbaker", "Vincent", "Baker", PersonGender::Female),
        ]
    }

    fn user_names(people: &[Person]) -> Vec<&str> {
        people.iter().map(|p| p.user_name.as_str()).collect()
    }

    #[test]
    fn test_filter_local_keeps_order() {
        let people = people();
        let hits = filter_local(&people, &Filter::eq("FirstName", "Vincent"));
        let names: Vec<&str> = hits.iter().map(|p| p.user_name.as_str()).collect();
        assert_eq!(names, vec!["vincentcalabrese", "vincentbaker"]);
    }

    #[test]
    fn test_filter_local_combined_predicate() {
        let people = people();
        let filter = Filter::eq("Gender", PersonGender::Male).and(Filter::eq("FirstName", "Vincent"));
        let hits = filter_local(&people, &filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].user_name, "vincentcalabrese");
    }

    #[test]
    fn test_sort_local_first_key_primary() {
        let mut people = people();
        let keys = [
            OrderKey { field: "FirstName".to_string(), direction: SortDirection::Asc },
            OrderKey { field: "LastName".to_string(), direction: SortDirection::Asc },
        ];
        sort_local(&mut people, &keys);
        assert_eq!(
            user_names(&people),
            vec!["elainestewart", "ronaldmundy", "scottketchum", "vincentbaker", "vincentcalabrese"]
        );
    }

    #[test]
    fn test_sort_local_descending_is_stable() {
        let mut people = people();
        let keys = [OrderKey { field: "FirstName".to_string(), direction: SortDirection::Desc }];
        sort_local(&mut people, &keys);
        assert_eq!(
            user_names(&people),
            vec!["vincentcalabrese", "vincentbaker", "scottketchum", "ronaldmundy", "elainestewart"]
        );
    }

    #[test]
    fn test_evaluate_matches_query() {
        let query = EntitySetQuery::<Person>::new()
            .filter(Filter::eq("FirstName", "Vincent"))
            .unwrap()
            .order_by("UserName")
            .unwrap();
        let result = evaluate(&people(), &query);
        assert_eq!(user_names(&result), vec!["vincentbaker", "vincentcalabrese"]);
    }

    #[test]
    fn test_evaluate_without_predicate_sorts_everything() {
        let query = EntitySetQuery::<Person>::new().order_by_desc("LastName").unwrap();
        let result = evaluate(&people(), &query);
        assert_eq!(result.len(), 5);
        assert_eq!(result[0].last_name, "Stewart");
    }

    #[test]
    fn test_evaluate_applies_skip_then_top() {
        let query = EntitySetQuery::<Person>::new()
            .order_by("UserName")
            .unwrap()
            .skip(1)
            .top(2);
        let result = evaluate(&people(), &query);
        assert_eq!(user_names(&result), vec!["ronaldmundy", "scottketchum"]);

        let past_end = EntitySetQuery::<Person>::new().skip(10);
        assert!(evaluate(&people(), &past_end).is_empty());
    }

    #[test]
    fn test_sort_local_by_gender_uses_member_value() {
        let mut people = people();
        let keys = [
            OrderKey { field: "Gender".to_string(), direction: SortDirection::Asc },
            OrderKey { field: "UserName".to_string(), direction: SortDirection::Asc },
        ];
        sort_local(&mut people, &keys);
        assert_eq!(
            user_names(&people),
            vec!["ronaldmundy", "scottketchum", "vincentcalabrese", "elainestewart", "vincentbaker"]
        );
    }

    #[test]
    fn test_project_picks_requested_fields_in_order() {
        let vincent = person("vincentcalabrese", "Vincent", "Calabrese", PersonGender::Male);
        let row = project(&vincent, &["UserName", "Gender", "FirstName"]).unwrap();
        let names: Vec<&str> = row.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["UserName", "Gender", "FirstName"]);
        assert_eq!(row[1].1, serde_json::json!("Male"));
        assert_eq!(row[2].1, serde_json::json!("Vincent"));
    }

    #[test]
    fn test_project_unloaded_navigation_is_null() {
        let vincent = person("vincentcalabrese", "Vincent", "Calabrese", PersonGender::Male);
        let row = project(&vincent, &["Trips"]).unwrap();
        assert_eq!(row[0].1, serde_json::Value::Null);
    }

    #[test]
    fn test_project_unknown_field() {
        let vincent = person("vincentcalabrese", "Vincent", "Calabrese", PersonGender::Male);
        let err = project(&vincent, &["MiddleName"]).unwrap_err();
        assert!(matches!(err, TripPinError::InvalidInput(_)));
    }
}
