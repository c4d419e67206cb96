use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;
use crate::json_ext::Path;
use crate::json_ext::Value;

/// The result of one execution.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// The response data.
    #[serde(default)]
    pub data: Value,

    /// The errors raised while resolving, in the order they were reported.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<Error>,

    /// Every slot written during the execution, in write order.
    #[serde(skip)]
    pub assigned: Vec<Path>,
}

impl Response {
    /// Indices written directly below `parent`, in write order.
    pub fn assigned_indices(&self, parent: &Path) -> Vec<usize> {
        self.assigned
            .iter()
            .filter(|path| path.len() == parent.len() + 1 && path.starts_with(parent))
            .filter_map(Path::last_index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json_bytes::json;

    use super::*;
    use crate::json_ext::PathElement;

    #[test]
    fn assigned_indices_only_counts_direct_children() {
        let list = Path(vec![PathElement::Key("list".into())]);
        let response = Response {
            data: json!({}),
            errors: Vec::new(),
            assigned: vec![
                list.join(PathElement::Index(1)),
                list.join(PathElement::Index(0)).join(PathElement::Key("id".into())),
                list.join(PathElement::Index(0)),
                Path(vec![PathElement::Key("other".into()), PathElement::Index(3)]),
            ],
        };
        assert_eq!(response.assigned_indices(&list), vec![1, 0]);
    }

    #[test]
    fn serializes_without_empty_errors() {
        let response = Response {
            data: json!({ "list": [1, 2] }),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({ "data": { "list": [1, 2] } })
        );
    }
}
