use serde::{Deserialize, Serialize};

/// Optional display attributes carried by a node entry or an edge endpoint hint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAttributes {
    #[serde(default)]
    pub primary_label: Option<String>,
    #[serde(default)]
    pub secondary_label: Option<String>,
    #[serde(default)]
    pub type_identity: Option<String>,
    #[serde(default)]
    pub type_label: Option<String>,
}

impl NodeAttributes {
    pub fn with_primary_label(mut self, label: impl Into<String>) -> Self {
        self.primary_label = Some(label.into());
        self
    }

    pub fn with_secondary_label(mut self, label: impl Into<String>) -> Self {
        self.secondary_label = Some(label.into());
        self
    }

    pub fn with_type(mut self, identity: impl Into<String>, label: Option<String>) -> Self {
        self.type_identity = Some(identity.into());
        self.type_label = label;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.primary_label.is_none()
            && self.secondary_label.is_none()
            && self.type_identity.is_none()
            && self.type_label.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeEntry {
    #[serde(default)]
    pub identity: Option<String>,
    #[serde(flatten)]
    pub attributes: NodeAttributes,
    /// Marks the node as a class whose taps sample member instances.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub type_like: bool,
}

impl NodeEntry {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: Some(identity.into()),
            ..Self::default()
        }
    }

    pub fn with_attributes(mut self, attributes: NodeAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn type_like(mut self) -> Self {
        self.type_like = true;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeEntry {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hints: Option<NodeAttributes>,
    #[serde(default, alias = "destHints", skip_serializing_if = "Option::is_none")]
    pub destination_hints: Option<NodeAttributes>,
}

impl EdgeEntry {
    pub fn new(
        source: impl Into<String>,
        label: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            source: Some(source.into()),
            label: Some(label.into()),
            destination: Some(destination.into()),
            source_hints: None,
            destination_hints: None,
        }
    }

    pub fn with_source_hints(mut self, hints: NodeAttributes) -> Self {
        self.source_hints = Some(hints);
        self
    }

    pub fn with_destination_hints(mut self, hints: NodeAttributes) -> Self {
        self.destination_hints = Some(hints);
        self
    }
}

/// A group of entries delivered together by a data source.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    #[serde(default)]
    pub nodes: Vec<NodeEntry>,
    #[serde(default)]
    pub edges: Vec<EdgeEntry>,
}

impl Batch {
    pub fn from_nodes(nodes: Vec<NodeEntry>) -> Self {
        Self {
            nodes,
            edges: Vec::new(),
        }
    }

    pub fn from_edges(edges: Vec<EdgeEntry>) -> Self {
        Self {
            nodes: Vec::new(),
            edges,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len() + self.edges.len()
    }
}

/// Returns the value when it carries something other than whitespace.
pub(super) fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
