//! Corpus fixtures shared by the integration tests.

#![allow(dead_code)]

use nodesuggest::corpus::{AssetDocument, GraphDocument, MemoryCorpus, NodeDocument, NodeRef};
use nodesuggest::suggestion::SuggestionContext;

pub fn pass_through(id: &str, signature: &str) -> NodeDocument {
    NodeDocument::new(id, signature)
        .input("in", "exec")
        .output("out", "exec")
}

/// A -> B -> C
pub fn abc_asset() -> AssetDocument {
    AssetDocument::new("Abc").graph(
        GraphDocument::new("Main")
            .node(pass_through("a", "A"))
            .node(pass_through("b", "B"))
            .node(pass_through("c", "C"))
            .link("a", "out", "b", "in")
            .link("b", "out", "c", "in"),
    )
}

pub fn abc_corpus() -> MemoryCorpus {
    MemoryCorpus::from_assets([abc_asset()])
}

/// Graph `i` wires `P{i % producers} -> Hub -> Sink`.
pub fn hub_corpus(graphs: usize, producers: usize) -> MemoryCorpus {
    let mut asset = AssetDocument::new("Hub");
    for i in 0..graphs {
        let producer = format!("P{}", i % producers);
        asset = asset.graph(
            GraphDocument::new(format!("G{i}"))
                .node(pass_through("p", &producer))
                .node(pass_through("hub", "Hub"))
                .node(pass_through("sink", "Sink"))
                .link("p", "out", "hub", "in")
                .link("hub", "out", "sink", "in"),
        );
    }
    MemoryCorpus::from_assets([asset])
}

/// Graph `i` wires one `S` output into both `X` and `Y`.
pub fn fan_out_corpus(graphs: usize) -> MemoryCorpus {
    let mut asset = AssetDocument::new("Fan");
    for i in 0..graphs {
        asset = asset.graph(
            GraphDocument::new(format!("G{i}"))
                .node(pass_through("s", "S"))
                .node(pass_through("x", "X"))
                .node(pass_through("y", "Y"))
                .link("s", "out", "x", "in")
                .link("s", "out", "y", "in"),
        );
    }
    MemoryCorpus::from_assets([asset])
}

/// `len` distinct pass-through nodes wired in a line.
pub fn long_chain(len: usize) -> MemoryCorpus {
    let mut graph = GraphDocument::new("Chain");
    for i in 0..len {
        graph = graph.node(pass_through(&format!("n{i}"), &format!("N{i}")));
    }
    for i in 1..len {
        graph = graph.link(&format!("n{}", i - 1), "out", &format!("n{i}"), "in");
    }
    MemoryCorpus::from_assets([AssetDocument::new("Chain").graph(graph)])
}

pub fn node(corpus: &MemoryCorpus, graph: &str, id: &str) -> NodeRef {
    let graph = corpus.find_graph(graph).expect("graph exists");
    corpus.find_node(graph, id).expect("node exists")
}

pub fn query(corpus: &MemoryCorpus, graph: &str, id: &str, connector: &str) -> SuggestionContext {
    let owner = node(corpus, graph, id);
    let index = corpus
        .find_connector(owner, connector)
        .expect("connector exists");
    SuggestionContext::single(owner, index)
}
