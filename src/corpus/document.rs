//! Serialized graph documents, one JSON file per asset.

use serde::{Deserialize, Serialize};

use super::{ConnectorDescriptor, ConnectorDirection};

/// One asset: a named collection of graphs plus template defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetDocument {
    pub name: String,
    #[serde(default)]
    pub graphs: Vec<GraphDocument>,
    /// Default connectors per signature, used when an instance has none.
    #[serde(default)]
    pub templates: Vec<TemplateDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDocument {
    pub name: String,
    #[serde(default = "default_editable")]
    pub editable: bool,
    #[serde(default)]
    pub nodes: Vec<NodeDocument>,
    #[serde(default)]
    pub links: Vec<LinkDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDocument {
    /// Instance id, unique inside its graph.
    pub id: String,
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub connectors: Vec<ConnectorDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorDocument {
    pub name: String,
    pub direction: ConnectorDirection,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default = "default_connectable")]
    pub connectable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDocument {
    pub signature: String,
    #[serde(default)]
    pub connectors: Vec<ConnectorDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDocument {
    pub node: String,
    pub connector: String,
}

/// A link from an output connector to an input connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkDocument {
    pub from: EndpointDocument,
    pub to: EndpointDocument,
}

fn default_editable() -> bool {
    true
}

fn default_connectable() -> bool {
    true
}

impl AssetDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn graph(mut self, graph: GraphDocument) -> Self {
        self.graphs.push(graph);
        self
    }

    pub fn template(mut self, template: TemplateDocument) -> Self {
        self.templates.push(template);
        self
    }
}

impl GraphDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            editable: true,
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    pub fn node(mut self, node: NodeDocument) -> Self {
        self.nodes.push(node);
        self
    }

    /// Link `from_node.from_connector` (output) to `to_node.to_connector` (input).
    pub fn link(
        mut self,
        from_node: &str,
        from_connector: &str,
        to_node: &str,
        to_connector: &str,
    ) -> Self {
        self.links.push(LinkDocument {
            from: EndpointDocument {
                node: from_node.to_string(),
                connector: from_connector.to_string(),
            },
            to: EndpointDocument {
                node: to_node.to_string(),
                connector: to_connector.to_string(),
            },
        });
        self
    }
}

impl NodeDocument {
    pub fn new(id: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            signature: signature.into(),
            title: None,
            connectors: Vec::new(),
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn input(self, name: &str, category: &str) -> Self {
        self.connector(ConnectorDocument::new(name, ConnectorDirection::Input, category))
    }

    pub fn output(self, name: &str, category: &str) -> Self {
        self.connector(ConnectorDocument::new(name, ConnectorDirection::Output, category))
    }

    pub fn connector(mut self, connector: ConnectorDocument) -> Self {
        self.connectors.push(connector);
        self
    }
}

impl ConnectorDocument {
    pub fn new(name: &str, direction: ConnectorDirection, category: &str) -> Self {
        Self {
            name: name.to_string(),
            direction,
            category: category.to_string(),
            detail: None,
            hidden: false,
            connectable: true,
        }
    }

    pub fn with_detail(mut self, detail: &str) -> Self {
        self.detail = Some(detail.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn not_connectable(mut self) -> Self {
        self.connectable = false;
        self
    }

    pub fn descriptor(&self) -> ConnectorDescriptor {
        ConnectorDescriptor {
            direction: self.direction,
            category: self.category.clone(),
            detail: self.detail.clone(),
        }
    }
}

impl TemplateDocument {
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            connectors: Vec::new(),
        }
    }

    pub fn connector(mut self, connector: ConnectorDocument) -> Self {
        self.connectors.push(connector);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_defaults_from_minimal_json() {
        let json = r#"{
            "name": "Door",
            "graphs": [{
                "name": "EventGraph",
                "nodes": [{
                    "id": "n1",
                    "signature": "BeginPlay",
                    "connectors": [{"name": "then", "direction": "output", "category": "exec"}]
                }]
            }]
        }"#;

        let asset: AssetDocument = serde_json::from_str(json).unwrap();
        let graph = &asset.graphs[0];
        assert!(graph.editable);
        assert!(graph.links.is_empty());
        let connector = &graph.nodes[0].connectors[0];
        assert!(!connector.hidden);
        assert!(connector.connectable);
        assert_eq!(connector.detail, None);
        assert!(asset.templates.is_empty());
    }

    #[test]
    fn test_builder_produces_links() {
        let graph = GraphDocument::new("g")
            .node(NodeDocument::new("a", "A").output("out", "int"))
            .node(NodeDocument::new("b", "B").input("in", "int"))
            .link("a", "out", "b", "in");

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.links[0].from.node, "a");
        assert_eq!(graph.links[0].to.connector, "in");
    }
}
