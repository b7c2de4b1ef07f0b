//! Earth Engine expression graphs
//!
//! Computations are sent to the platform as a table of value nodes keyed by
//! id, with one id marked as the result. Nodes nest freely; a function body
//! must live in the table so it can be referenced by id.

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// A single value in an expression graph
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Constant(Value),
    Invocation {
        function: String,
        arguments: BTreeMap<String, Node>,
    },
    /// Reference to another entry of the value table
    ValueReference(String),
    /// Reference to an argument of the enclosing function definition
    ArgumentReference(String),
    FunctionDefinition {
        argument_names: Vec<String>,
        body: String,
    },
}

impl Node {
    pub fn constant(value: impl Into<Value>) -> Self {
        Node::Constant(value.into())
    }

    pub fn call(function: &str) -> Self {
        Node::Invocation {
            function: function.to_string(),
            arguments: BTreeMap::new(),
        }
    }

    pub fn argument(name: &str) -> Self {
        Node::ArgumentReference(name.to_string())
    }

    pub fn reference(id: &str) -> Self {
        Node::ValueReference(id.to_string())
    }

    pub fn function(argument_names: &[&str], body: &str) -> Self {
        Node::FunctionDefinition {
            argument_names: argument_names.iter().map(|s| s.to_string()).collect(),
            body: body.to_string(),
        }
    }

    /// Add a named argument to an invocation. No-op on other node kinds.
    pub fn with(mut self, name: &str, value: Node) -> Self {
        if let Node::Invocation { arguments, .. } = &mut self {
            arguments.insert(name.to_string(), value);
        }
        self
    }

    pub fn to_json(&self) -> Value {
        match self {
            Node::Constant(value) => json!({ "constantValue": value }),
            Node::Invocation {
                function,
                arguments,
            } => {
                let args: Map<String, Value> = arguments
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect();
                json!({
                    "functionInvocationValue": {
                        "functionName": function,
                        "arguments": args,
                    }
                })
            }
            Node::ValueReference(id) => json!({ "valueReference": id }),
            Node::ArgumentReference(name) => json!({ "argumentReference": name }),
            Node::FunctionDefinition {
                argument_names,
                body,
            } => json!({
                "functionDefinitionValue": {
                    "argumentNames": argument_names,
                    "body": body,
                }
            }),
        }
    }
}

/// Complete expression: value table plus the id of the result
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    values: BTreeMap<String, Node>,
    result: String,
}

impl Expression {
    /// Expression whose result is a single node
    pub fn new(result: Node) -> Self {
        let mut values = BTreeMap::new();
        values.insert("0".to_string(), result);
        Self {
            values,
            result: "0".to_string(),
        }
    }

    /// Add a supporting value (e.g. a function body) under `id`
    pub fn define(mut self, id: &str, node: Node) -> Self {
        self.values.insert(id.to_string(), node);
        self
    }

    pub fn result(&self) -> &Node {
        &self.values[&self.result]
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.values.get(id)
    }

    /// Request body for `value:compute`
    pub fn to_request_body(&self) -> Value {
        let values: Map<String, Value> = self
            .values
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        json!({
            "expression": {
                "result": self.result,
                "values": values,
            }
        })
    }
}

/// Invocations that recur across datasets
pub mod ops {
    use super::Node;
    use crate::geo::GeoPoint;

    pub fn point(p: GeoPoint) -> Node {
        Node::call("GeometryConstructors.Point").with("coordinates", Node::constant(vec![p.lon, p.lat]))
    }

    pub fn load_collection(id: &str) -> Node {
        Node::call("ImageCollection.load").with("id", Node::constant(id))
    }

    pub fn filter(collection: Node, filter: Node) -> Node {
        Node::call("Collection.filter")
            .with("collection", collection)
            .with("filter", filter)
    }

    /// Images whose `system:time_start` lies in `[start, end)`
    pub fn date_range(start: &str, end: &str) -> Node {
        Node::call("Filter.dateRangeContains")
            .with(
                "leftValue",
                Node::call("DateRange")
                    .with("start", Node::constant(start))
                    .with("end", Node::constant(end)),
            )
            .with("rightField", Node::constant("system:time_start"))
    }

    /// Images whose footprint intersects `geometry`
    pub fn bounds(geometry: Node) -> Node {
        Node::call("Filter.intersects")
            .with("leftField", Node::constant(".all"))
            .with("rightValue", geometry)
    }

    pub fn property_less_than(property: &str, value: f64) -> Node {
        Node::call("Filter.lessThan")
            .with("leftField", Node::constant(property))
            .with("rightValue", Node::constant(value))
    }

    pub fn mean_composite(collection: Node) -> Node {
        Node::call("reduce.mean").with("collection", collection)
    }

    /// Mean of `image` over `geometry` at `scale` meters per pixel
    pub fn reduce_region_mean(image: Node, geometry: Node, scale: f64) -> Node {
        Node::call("Image.reduceRegion")
            .with("image", image)
            .with("reducer", Node::call("Reducer.mean"))
            .with("geometry", geometry)
            .with("scale", Node::constant(scale))
    }
}
