//! Resource kinds, identifiers and parameter maps used by the panel API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Parameter mapping sent as a query string (GET) or JSON body (POST).
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Which family of billable services a client manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Virtual dedicated servers.
    Vds,
    /// Virtual hosting accounts.
    Vhost,
}

impl ResourceKind {
    /// Path segment under the API base URL.
    pub fn path(self) -> &'static str {
        match self {
            ResourceKind::Vds => "vds",
            ResourceKind::Vhost => "vhost",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vds" => Ok(ResourceKind::Vds),
            "vhost" => Ok(ResourceKind::Vhost),
            other => Err(format!("unknown resource kind: {other}")),
        }
    }
}

/// One service id, or an ordered list of them.
///
/// Lists travel as a single `elid` value joined with `", "`. Ids are opaque:
/// no dedup, no format checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceId {
    Single(String),
    List(Vec<String>),
}

impl ResourceId {
    /// The value placed in the `elid` query parameter, before URL-encoding.
    pub fn to_query_value(&self) -> String {
        match self {
            ResourceId::Single(id) => id.clone(),
            ResourceId::List(ids) => ids.join(", "),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_value())
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        ResourceId::Single(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        ResourceId::Single(id)
    }
}

macro_rules! resource_id_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ResourceId {
                fn from(id: $t) -> Self {
                    ResourceId::Single(id.to_string())
                }
            }
        )*
    };
}

resource_id_from_int!(i32, i64, u32, u64);

impl<T: ToString> From<Vec<T>> for ResourceId {
    fn from(ids: Vec<T>) -> Self {
        ResourceId::List(ids.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString> From<&[T]> for ResourceId {
    fn from(ids: &[T]) -> Self {
        ResourceId::List(ids.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString, const N: usize> From<[T; N]> for ResourceId {
    fn from(ids: [T; N]) -> Self {
        ResourceId::List(ids.iter().map(ToString::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_joins_with_comma_space_in_order() {
        let id = ResourceId::from(vec!["a", "b", "c"]);
        assert_eq!(id.to_query_value(), "a, b, c");
    }

    #[test]
    fn list_keeps_duplicates() {
        let id = ResourceId::from(["7", "7"]);
        assert_eq!(id.to_query_value(), "7, 7");
    }

    #[test]
    fn single_element_list_has_no_separator() {
        let id = ResourceId::from(vec![42]);
        assert_eq!(id.to_query_value(), "42");
    }

    #[test]
    fn single_string_is_passed_through() {
        let id = ResourceId::from("123, 456");
        assert_eq!(id, ResourceId::Single("123, 456".to_string()));
        assert_eq!(id.to_query_value(), "123, 456");
    }

    #[test]
    fn integers_convert() {
        assert_eq!(ResourceId::from(789u64).to_query_value(), "789");
        assert_eq!(ResourceId::from(&[1, 2][..]).to_query_value(), "1, 2");
    }

    #[test]
    fn kind_paths_and_parsing() {
        assert_eq!(ResourceKind::Vds.path(), "vds");
        assert_eq!(ResourceKind::Vhost.to_string(), "vhost");
        assert_eq!("VHOST".parse::<ResourceKind>().unwrap(), ResourceKind::Vhost);
        assert!("dns".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn kind_serde_names_match_paths() {
        assert_eq!(serde_json::to_value(ResourceKind::Vhost).unwrap(), "vhost");
        let kind: ResourceKind = serde_json::from_value(serde_json::json!("vds")).unwrap();
        assert_eq!(kind, ResourceKind::Vds);
        assert!(serde_json::from_value::<ResourceKind>(serde_json::json!("Vds")).is_err());
    }
}
