//! Shared query infrastructure: the [`Query`] trait and [`SortDirection`].

use url::Url;

/// Anything that can render itself as OData system query options.
pub trait Query {
    /// Relative path of the resource the query targets (e.g. "People").
    fn resource_path(&self) -> String;

    /// The system query options in render order, unencoded.
    fn query_options(&self) -> Vec<(&'static str, String)>;

    /// Appends this query's options to the given URL, returning the modified URL.
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        let options = self.query_options();
        if !options.is_empty() {
            url.query_pairs_mut().extend_pairs(options);
        }
        url
    }
}

/// Sort order for `$orderby` keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order. This is the default.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}
