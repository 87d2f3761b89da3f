use std::fmt::Display;

use itertools::Itertools;

use crate::{
    alphabet::Alphabet,
    incremental::{GraphEdge, GraphView, NodeId},
    Show,
};

fn sanitize_dot_ident(name: &str) -> String {
    name.chars()
        .filter_map(|chr| match chr {
            c if c.is_alphanumeric() => Some(c),
            '|' | ':' | ',' | '-' => Some('_'),
            _ => None,
        })
        .join("")
}

fn escape_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Implementors can be turned into the DOT format of graphviz.
pub trait Dottable {
    /// The type of nodes.
    type Node: Copy;
    /// The type of edges.
    type Edge;

    /// Compute the graphviz representation, for more information on the DOT format,
    /// see the [graphviz documentation](https://graphviz.org/doc/info/lang.html).
    fn dot_representation(&self) -> String {
        let header = std::iter::once(format!(
            "digraph {} {{",
            self.dot_name().unwrap_or("A".to_string())
        ))
        .chain(self.dot_header_statements());

        let nodes = self.dot_nodes();

        let states = nodes.iter().map(|q| {
            format!(
                "{} [{}]",
                sanitize_dot_ident(&self.dot_state_ident(*q)),
                self.dot_state_attributes(*q)
                    .into_iter()
                    .map(|attr| attr.to_string())
                    .join(", ")
            )
        });

        let transitions = nodes.iter().flat_map(|q| {
            self.dot_edges_from(*q).into_iter().map(move |t| {
                format!(
                    "{} -> {} [{}]",
                    sanitize_dot_ident(&self.dot_state_ident(*q)),
                    sanitize_dot_ident(&self.dot_state_ident(self.dot_edge_target(&t))),
                    self.dot_transition_attributes(&t)
                        .into_iter()
                        .map(|attr| attr.to_string())
                        .join(", ")
                )
            })
        });

        let mut lines = header
            .chain(states)
            .chain(transitions)
            .chain(std::iter::once("}".to_string()));
        lines.join("\n")
    }

    /// Additional statements that are placed right after the opening of the graph.
    fn dot_header_statements(&self) -> Vec<String> {
        vec![]
    }

    /// The name of the graph.
    fn dot_name(&self) -> Option<String>;

    /// Lists the nodes that should be rendered, in the order in which they are emitted.
    fn dot_nodes(&self) -> Vec<Self::Node>;

    /// Lists the edges leaving the given node.
    fn dot_edges_from(&self, node: Self::Node) -> Vec<Self::Edge>;

    /// Returns the node that the given edge leads to.
    fn dot_edge_target(&self, edge: &Self::Edge) -> Self::Node;

    /// The identifier of a node in the generated output.
    fn dot_state_ident(&self, node: Self::Node) -> String;

    /// Attributes of the given node.
    fn dot_state_attributes(&self, _node: Self::Node) -> Vec<DotStateAttribute> {
        vec![]
    }

    /// Attributes of the given edge.
    fn dot_transition_attributes(&self, _edge: &Self::Edge) -> Vec<DotTransitionAttribute> {
        vec![]
    }

    /// Renders the graph as PNG by piping the DOT representation through the `dot` executable, which
    /// has to be installed. Only available on the `graphviz` crate feature.
    #[cfg(feature = "graphviz")]
    fn render(&self) -> Result<Vec<u8>, std::io::Error> {
        use std::{
            io::Write,
            process::{Command, Stdio},
        };

        let dot = self.dot_representation();
        tracing::trace!("rendering dot representation\n{dot}");

        let mut child = Command::new("dot")
            .arg("-Tpng")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(dot.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            tracing::error!("could not render, dot reported\n{stderr}");
            return Err(std::io::Error::other(stderr));
        }
        Ok(output.stdout)
    }

    /// Renders the graph as PNG into the file `filename`. The DOT representation is written to a
    /// temporary file first, which is then handed to the `dot` executable. Only available on the
    /// `graphviz` crate feature.
    #[cfg(feature = "graphviz")]
    fn render_to_file_name(&self, filename: &str) -> Result<(), std::io::Error> {
        use std::io::Write;

        let mut tempfile = tempfile::NamedTempFile::new()?;
        tempfile.write_all(self.dot_representation().as_bytes())?;

        let status = std::process::Command::new("dot")
            .arg("-Tpng")
            .arg("-o")
            .arg(filename)
            .arg(tempfile.path())
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(std::io::Error::other(format!(
                "dot process exited with status {status}"
            )))
        }
    }
}

impl<'a, A: Alphabet, Q: Show, C: Show> Dottable for GraphView<'a, A, Q, C> {
    type Node = NodeId;
    type Edge = GraphEdge<'a, A::Symbol, C>;

    fn dot_name(&self) -> Option<String> {
        Some("Tree".into())
    }

    fn dot_header_statements(&self) -> Vec<String> {
        let Some(root) = self.initial_node() else {
            return vec![];
        };
        vec![
            "__start0 [label=\"\", shape=none]".to_string(),
            format!("__start0 -> {}", sanitize_dot_ident(&self.dot_state_ident(root))),
        ]
    }

    fn dot_nodes(&self) -> Vec<NodeId> {
        self.nodes()
    }

    fn dot_edges_from(&self, node: NodeId) -> Vec<Self::Edge> {
        self.outgoing_edges(node)
    }

    fn dot_edge_target(&self, edge: &Self::Edge) -> NodeId {
        edge.target
    }

    fn dot_state_ident(&self, node: NodeId) -> String {
        node.show()
    }

    fn dot_state_attributes(&self, node: NodeId) -> Vec<DotStateAttribute> {
        let label = match self.node_color(node).map(|q| q.show()) {
            Some(color) if !color.is_empty() => format!("{} / {color}", node.show()),
            _ => node.show(),
        };
        vec![
            DotStateAttribute::Shape("circle".into()),
            DotStateAttribute::Label(label),
        ]
    }

    fn dot_transition_attributes(&self, edge: &Self::Edge) -> Vec<DotTransitionAttribute> {
        let color = edge.color.show();
        let label = if color.is_empty() {
            edge.symbol.show()
        } else {
            format!("{} / {color}", edge.symbol.show())
        };
        vec![DotTransitionAttribute::Label(label)]
    }
}

/// Attributes that can be attached to a node in the DOT output.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DotStateAttribute {
    /// The label of a node
    Label(String),
    /// The shape of a node
    Shape(String),
    /// The color of a node
    Color(String),
}

impl Display for DotStateAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DotStateAttribute::Label(s) => write!(f, "label=\"{}\"", escape_label(s)),
            DotStateAttribute::Shape(s) => write!(f, "shape=\"{}\"", escape_label(s)),
            DotStateAttribute::Color(c) => write!(f, "color=\"{}\"", escape_label(c)),
        }
    }
}

/// Attributes that can be attached to an edge in the DOT output.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DotTransitionAttribute {
    /// The label of an edge
    Label(String),
}

impl Display for DotTransitionAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DotTransitionAttribute::Label(lbl) => write!(f, "label=\"{}\"", escape_label(lbl)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::sanitize_dot_ident;

    #[test]
    fn identifiers_are_sanitized() {
        assert_eq!(sanitize_dot_ident("n12"), "n12");
        assert_eq!(sanitize_dot_ident("(q, 1)"), "q_1");
        assert_eq!(sanitize_dot_ident("a|b"), "a_b");
    }
}
