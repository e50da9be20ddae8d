use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

pub type NodeId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    // Sources
    Constant,
    Input,
    Time,

    // Scalars / arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Abs,
    Sin,
    Cos,
    Tan,
    Min,
    Max,
    Oscillator, // sin(2π f t + phase)

    // Conditional
    GreaterThan,
    LessThan,
    If,

    // Ranges
    Clamp,
    Remap,

    // Vectors
    Vec3,
    Vec3Split,
    Vec3Add,
    Vec3Scale,
    Vec3Length,

    // Sinks
    Output,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Float(f64),
    Bool(bool),
    Vec3([f64; 3]),
}

impl Default for Value {
    fn default() -> Self {
        Value::Float(0.0)
    }
}

/// Which procedure input an `Input` node exposes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InputPort {
    X,
    Y,
    Z,
    Time,
    Param,
}

/// Which coordinate an `Output` node writes. `None` means the node takes a vector and
/// writes all three.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputPort {
    X,
    Y,
    Z,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NodeParams {
    pub value: Option<Value>,
    pub frequency: Option<f64>,
    pub phase: Option<f64>,
    pub port: Option<InputPort>,
    pub output: Option<OutputPort>,
    /// Parameter slot for `Input` nodes reading `InputPort::Param`.
    pub index: Option<usize>,
    pub in_min: Option<f64>,
    pub in_max: Option<f64>,
    pub out_min: Option<f64>,
    pub out_max: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputConnection {
    pub node_id: NodeId,
    #[serde(default = "default_output_key")]
    pub output_key: String,
}

fn default_output_key() -> String {
    "out".to_string()
}

impl InputConnection {
    pub fn new(node_id: impl Into<NodeId>) -> Self {
        Self {
            node_id: node_id.into(),
            output_key: default_output_key(),
        }
    }

    pub fn with_key(node_id: impl Into<NodeId>, output_key: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            output_key: output_key.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeSpec {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeType,
    #[serde(default)]
    pub params: NodeParams,
    #[serde(default)]
    pub inputs: HashMap<String, InputConnection>,
}

impl NodeSpec {
    pub fn new(id: impl Into<NodeId>, kind: NodeType) -> Self {
        Self {
            id: id.into(),
            kind,
            params: NodeParams::default(),
            inputs: HashMap::new(),
        }
    }

    pub fn with_params(mut self, params: NodeParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_input(mut self, key: &str, conn: InputConnection) -> Self {
        self.inputs.insert(key.to_string(), conn);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GraphSpec {
    pub nodes: Vec<NodeSpec>,
}
