use std::fmt;
use std::marker::PhantomData;

use crate::types::{EntitySet, PropertyKind};
use crate::Error;

use super::{
    common::{Query, SortDirection},
    filter::{scalar_property, Filter},
};

/// One `$orderby` key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderKey {
    pub field: String,
    pub direction: SortDirection,
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortDirection::Asc => write!(f, "{}", self.field),
            SortDirection::Desc => write!(f, "{} desc", self.field),
        }
    }
}

/// Pending request against the entity set of `E`.
///
/// Every refinement consumes the query and returns a new one; nothing is sent
/// until the query is handed to [`crate::Client`]. Property names are checked
/// against `E::PROPERTIES` as each refinement is applied, so an invalid query
/// can never be built.
///
/// Repeated refinements compose:
/// - `filter` conjoins with the existing predicate;
/// - `order_by` appends a key, the first-applied key being primary;
/// - `select` appends fields, skipping duplicates;
/// - `expand` records each navigation property once;
/// - `top` and `skip` keep the last value.
pub struct EntitySetQuery<E> {
    filter: Option<Filter>,
    order_by: Vec<OrderKey>,
    select: Vec<String>,
    expand: Vec<String>,
    top: Option<u64>,
    skip: Option<u64>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Default for EntitySetQuery<E> {
    fn default() -> Self {
        Self {
            filter: None,
            order_by: Vec::new(),
            select: Vec::new(),
            expand: Vec::new(),
            top: None,
            skip: None,
            _entity: PhantomData,
        }
    }
}

impl<E> Clone for EntitySetQuery<E> {
    fn clone(&self) -> Self {
        Self {
            filter: self.filter.clone(),
            order_by: self.order_by.clone(),
            select: self.select.clone(),
            expand: self.expand.clone(),
            top: self.top,
            skip: self.skip,
            _entity: PhantomData,
        }
    }
}

impl<E: EntitySet> fmt::Debug for EntitySetQuery<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitySetQuery")
            .field("entity_set", &E::NAME)
            .field("filter", &self.filter)
            .field("order_by", &self.order_by)
            .field("select", &self.select)
            .field("expand", &self.expand)
            .field("top", &self.top)
            .field("skip", &self.skip)
            .finish()
    }
}

impl<E: EntitySet> Query for EntitySetQuery<E> {
    fn resource_path(&self) -> String {
        E::NAME.to_string()
    }

    fn query_options(&self) -> Vec<(&'static str, String)> {
        let mut options = Vec::new();
        if let Some(filter) = &self.filter {
            options.push(("$filter", filter.to_string()));
        }
        if !self.order_by.is_empty() {
            let keys: Vec<String> = self.order_by.iter().map(|k| k.to_string()).collect();
            options.push(("$orderby", keys.join(",")));
        }
        if !self.select.is_empty() {
            // The key is required to materialize `E`, so a projection always carries it.
            let mut fields = self.select.clone();
            if !fields.iter().any(|f| f == E::KEY) {
                fields.push(E::KEY.to_string());
            }
            options.push(("$select", fields.join(",")));
        }
        if !self.expand.is_empty() {
            options.push(("$expand", self.expand.join(",")));
        }
        if let Some(top) = self.top {
            options.push(("$top", top.to_string()));
        }
        if let Some(skip) = self.skip {
            options.push(("$skip", skip.to_string()));
        }
        options
    }
}

impl<E: EntitySet> EntitySetQuery<E> {
    /// An unrefined query for every entity in the set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity_set(&self) -> &'static str {
        E::NAME
    }

    /// Adds a predicate, conjoined with any existing one.
    pub fn filter(mut self, filter: Filter) -> Result<Self, Error> {
        filter.validate::<E>()?;
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        Ok(self)
    }

    /// Appends an ascending sort key.
    pub fn order_by(self, field: &str) -> Result<Self, Error> {
        self.order_by_direction(field, SortDirection::Asc)
    }

    /// Appends a descending sort key.
    pub fn order_by_desc(self, field: &str) -> Result<Self, Error> {
        self.order_by_direction(field, SortDirection::Desc)
    }

    pub fn order_by_direction(mut self, field: &str, direction: SortDirection) -> Result<Self, Error> {
        scalar_property::<E>(field, "orderby")?;
        self.order_by.push(OrderKey {
            field: field.to_string(),
            direction,
        });
        Ok(self)
    }

    /// Projects the result onto the given structural properties.
    pub fn select<I, S>(mut self, fields: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for field in fields {
            let field = field.as_ref();
            let property = E::property(field)
                .ok_or_else(|| Error::invalid_field(E::TYPE_NAME, field, "unknown property"))?;
            if property.kind == PropertyKind::Navigation {
                return Err(Error::invalid_field(
                    E::TYPE_NAME,
                    field,
                    "navigation properties are expanded, not selected",
                ));
            }
            if !self.select.iter().any(|s| s == field) {
                self.select.push(field.to_string());
            }
        }
        Ok(self)
    }

    /// Eagerly includes a navigation property in the response.
    pub fn expand(mut self, navigation: &str) -> Result<Self, Error> {
        let property = E::property(navigation)
            .ok_or_else(|| Error::invalid_field(E::TYPE_NAME, navigation, "unknown property"))?;
        if property.kind != PropertyKind::Navigation {
            return Err(Error::invalid_field(
                E::TYPE_NAME,
                navigation,
                "only navigation properties can be expanded",
            ));
        }
        if !self.expand.iter().any(|s| s == navigation) {
            self.expand.push(navigation.to_string());
        }
        Ok(self)
    }

    /// Limits the number of returned entities.
    #[must_use]
    pub fn top(mut self, top: u64) -> Self {
        self.top = Some(top);
        self
    }

    /// Skips the first `skip` entities.
    #[must_use]
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn predicate(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn order_keys(&self) -> &[OrderKey] {
        &self.order_by
    }

    pub fn selected(&self) -> &[String] {
        &self.select
    }

    pub fn expanded(&self) -> &[String] {
        &self.expand
    }

    /// The `$top` value, if any.
    pub fn limit(&self) -> Option<u64> {
        self.top
    }

    /// The `$skip` value, if any.
    pub fn offset(&self) -> Option<u64> {
        self.skip
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use crate::{
        query::{EntitySetQuery, Filter, Query},
        types::Person,
    };

    #[test]
    fn test_entity_set_query() {
        let url = Url::parse("https://example.com/svc/People").unwrap();

        assert_eq!(
            EntitySetQuery::<Person>::new().add_to_url(&url).to_string(),
            "https://example.com/svc/People"
        );

        let query = EntitySetQuery::<Person>::new()
            .filter(Filter::eq("FirstName", "Vincent"))
            .unwrap()
            .order_by("UserName")
            .unwrap()
            .order_by_desc("LastName")
            .unwrap()
            .select(["FirstName", "LastName"])
            .unwrap()
            .expand("Trips")
            .unwrap()
            .top(5)
            .skip(10);
        let url = query.add_to_url(&url);
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("$filter".to_string(), "FirstName eq 'Vincent'".to_string()),
                ("$orderby".to_string(), "UserName,LastName desc".to_string()),
                ("$select".to_string(), "FirstName,LastName,UserName".to_string()),
                ("$expand".to_string(), "Trips".to_string()),
                ("$top".to_string(), "5".to_string()),
                ("$skip".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_refinement_leaves_original_usable() {
        let base = EntitySetQuery::<Person>::new()
            .filter(Filter::eq("FirstName", "Vincent"))
            .unwrap();
        let expanded = base.clone().expand("Trips").unwrap();
        assert!(base.expanded().is_empty());
        assert_eq!(expanded.expanded(), ["Trips".to_string()]);
        assert_eq!(base.predicate(), expanded.predicate());
    }

    #[test]
    fn test_paging_last_value_wins() {
        let query = EntitySetQuery::<Person>::new().top(5).skip(2).top(3);
        assert_eq!(query.limit(), Some(3));
        assert_eq!(query.offset(), Some(2));
        assert_eq!(EntitySetQuery::<Person>::new().limit(), None);
    }
}
