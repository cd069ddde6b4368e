use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use tracing::info;

use crate::error::SourceError;
use crate::model::{Batch, EdgeEntry, NodeAttributes, NodeEntry, RDF_TYPE};

use super::parse::{entries, take_array};
use super::{DataSource, ExpandKind, ExpandRequest, FetchRequest};

/// An in-memory graph loaded from a JSON document, answering expand requests
/// with rotating samples so repeated taps reveal different neighbors.
///
/// The document has the batch shape plus an optional `classes` list:
/// `{"nodes": [...], "edges": [...], "classes": ["..."]}`.
#[derive(Debug, Default)]
pub struct DatasetSource {
    attributes: HashMap<String, NodeAttributes>,
    outgoing: HashMap<String, Vec<(String, String)>>,
    members: HashMap<String, Vec<String>>,
    classes: Vec<String>,
    cursors: Mutex<HashMap<(ExpandKind, String), usize>>,
}

impl DatasetSource {
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            nodes = dataset.attributes.len(),
            classes = dataset.classes.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    pub fn from_json(raw: &str) -> Result<Self, SourceError> {
        let Value::Object(mut object) = serde_json::from_str::<Value>(raw)? else {
            return Err(SourceError::Shape("dataset must be a JSON object".to_owned()));
        };

        let nodes = entries::<NodeEntry>(take_array(&mut object, "nodes")?, "node");
        let edges = entries::<EdgeEntry>(take_array(&mut object, "edges")?, "edge");
        let classes = entries::<String>(take_array(&mut object, "classes")?, "class");

        Ok(Self::from_parts(nodes, edges, classes))
    }

    /// Indexes the entries. Incomplete entries are skipped; the first
    /// attribute set seen for an identity is kept.
    pub fn from_parts(
        nodes: impl IntoIterator<Item = NodeEntry>,
        edges: impl IntoIterator<Item = EdgeEntry>,
        classes: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut dataset = Self::default();
        let mut class_set = HashSet::new();
        let mut add_class = |dataset: &mut Self, class: &str| {
            if class_set.insert(class.to_owned()) {
                dataset.classes.push(class.to_owned());
            }
        };

        for class in classes {
            if !class.trim().is_empty() {
                add_class(&mut dataset, &class);
            }
        }

        for node in nodes {
            let Some(identity) = node.identity.filter(|id| !id.trim().is_empty()) else {
                continue;
            };
            if node.type_like {
                add_class(&mut dataset, &identity);
            }
            if let Some(class) = node.attributes.type_identity.clone() {
                dataset.add_member(&class, &identity);
                add_class(&mut dataset, &class);
            }
            dataset.attributes.entry(identity).or_insert(node.attributes);
        }

        for edge in edges {
            let (Some(source), Some(label), Some(destination)) =
                (edge.source, edge.label, edge.destination)
            else {
                continue;
            };
            if source.trim().is_empty() || label.trim().is_empty() || destination.trim().is_empty()
            {
                continue;
            }

            if let Some(hints) = edge.source_hints {
                dataset.attributes.entry(source.clone()).or_insert(hints);
            }
            if let Some(hints) = edge.destination_hints {
                dataset
                    .attributes
                    .entry(destination.clone())
                    .or_insert(hints);
            }
            if label == RDF_TYPE {
                dataset.add_member(&destination, &source);
                add_class(&mut dataset, &destination);
            }

            let neighbors = dataset.outgoing.entry(source).or_default();
            if !neighbors.iter().any(|(l, d)| *l == label && *d == destination) {
                neighbors.push((label, destination));
            }
        }

        dataset
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    fn add_member(&mut self, class: &str, member: &str) {
        let members = self.members.entry(class.to_owned()).or_default();
        if !members.iter().any(|existing| existing == member) {
            members.push(member.to_owned());
        }
    }

    fn knows(&self, identity: &str) -> bool {
        self.attributes.contains_key(identity)
            || self.outgoing.contains_key(identity)
            || self.members.contains_key(identity)
            || self.outgoing.values().flatten().any(|(_, d)| d == identity)
    }

    fn hints(&self, identity: &str) -> Option<NodeAttributes> {
        self.attributes
            .get(identity)
            .filter(|attributes| !attributes.is_empty())
            .cloned()
    }

    /// Up to `limit` items starting at this key's cursor, wrapping around.
    /// The cursor advances past what was returned.
    fn sample<'a, T>(&self, key: (ExpandKind, &str), items: &'a [T], limit: usize) -> Vec<&'a T> {
        if items.is_empty() || limit == 0 {
            return Vec::new();
        }

        let take = limit.min(items.len());
        let mut cursors = self.cursors.lock().unwrap_or_else(PoisonError::into_inner);
        let cursor = cursors.entry((key.0, key.1.to_owned())).or_insert(0);
        let start = *cursor % items.len();
        *cursor = (start + take) % items.len();

        items.iter().cycle().skip(start).take(take).collect()
    }

    fn relations(&self, identity: &str, limit: usize) -> Batch {
        let neighbors = self
            .outgoing
            .get(identity)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let source_hints = self.hints(identity);

        let edges = self
            .sample((ExpandKind::Relations, identity), neighbors, limit)
            .into_iter()
            .map(|(label, destination)| EdgeEntry {
                source: Some(identity.to_owned()),
                label: Some(label.clone()),
                destination: Some(destination.clone()),
                source_hints: source_hints.clone(),
                destination_hints: self.hints(destination),
            })
            .collect();
        Batch::from_edges(edges)
    }

    fn members(&self, class: &str, limit: usize) -> Batch {
        let members = self
            .members
            .get(class)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let class_hints = self.hints(class);

        let edges = self
            .sample((ExpandKind::Members, class), members, limit)
            .into_iter()
            .map(|member| EdgeEntry {
                source: Some(member.clone()),
                label: Some(RDF_TYPE.to_owned()),
                destination: Some(class.to_owned()),
                source_hints: self.hints(member),
                destination_hints: class_hints.clone(),
            })
            .collect();
        Batch::from_edges(edges)
    }

    fn class_nodes(&self) -> Batch {
        let nodes = self
            .classes
            .iter()
            .map(|class| {
                NodeEntry::new(class.clone())
                    .with_attributes(self.hints(class).unwrap_or_default())
                    .type_like()
            })
            .collect();
        Batch::from_nodes(nodes)
    }
}

impl DataSource for DatasetSource {
    fn fetch(&self, request: &FetchRequest) -> Result<Batch, SourceError> {
        match request {
            FetchRequest::Classes => Ok(self.class_nodes()),
            FetchRequest::Expand(ExpandRequest {
                identity,
                sample_limit,
                kind,
            }) => {
                if !self.knows(identity) {
                    return Err(SourceError::UnknownSubject(identity.clone()));
                }
                Ok(match kind {
                    ExpandKind::Relations => self.relations(identity, *sample_limit),
                    ExpandKind::Members => self.members(identity, *sample_limit),
                })
            }
        }
    }
}
